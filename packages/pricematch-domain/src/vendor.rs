use strsim::levenshtein;

/// Minimum dictionary score for a fragment to resolve at all.
pub const MIN_ACCEPT_SCORE: f64 = 60.0;

/// Maximum edit ratio for a dictionary entry to count as a spelling variant.
pub const VARIANT_EDIT_RATIO: f64 = 0.2;

/// Scores a vendor fragment against one dictionary entry on the 0–100 scale.
/// Case-insensitive throughout; punctuation-insensitive at the 95 tier.
pub fn score(fragment: &str, entry: &str) -> f64 {
	let fragment = fragment.trim().to_lowercase();
	let entry = entry.trim().to_lowercase();

	if fragment.is_empty() || entry.is_empty() {
		return 0.0;
	}
	if fragment == entry {
		return 100.0;
	}
	if strip_punctuation(fragment.as_str()) == strip_punctuation(entry.as_str()) {
		return 95.0;
	}
	if entry.starts_with(fragment.as_str()) {
		return 90.0;
	}
	if fragment.starts_with(entry.as_str()) {
		return 85.0;
	}
	if entry.contains(fragment.as_str()) {
		return 70.0;
	}
	if fragment.contains(entry.as_str()) {
		return 65.0;
	}

	let max_len = fragment.chars().count().max(entry.chars().count());
	let similarity =
		(1.0 - levenshtein(fragment.as_str(), entry.as_str()) as f64 / max_len as f64) * 100.0;

	if similarity > 80.0 { similarity } else { 0.0 }
}

/// Resolves a fragment to the best dictionary entry, or `None` below the
/// acceptance threshold. Deterministic for a fixed dictionary snapshot: on a
/// score tie the earlier entry wins.
pub fn resolve(fragment: &str, dictionary: &[String]) -> Option<String> {
	if fragment.trim().is_empty() {
		return None;
	}

	let mut best: Option<(&String, f64)> = None;

	for entry in dictionary {
		let entry_score = score(fragment, entry);

		if entry_score >= 100.0 {
			return Some(entry.clone());
		}
		if best.map(|(_, score)| entry_score > score).unwrap_or(true) {
			best = Some((entry, entry_score));
		}
	}

	best.filter(|(_, score)| *score >= MIN_ACCEPT_SCORE).map(|(entry, _)| entry.clone())
}

/// Spelling/format variants of a resolved vendor used to widen retrieval:
/// case variants, separator variants, and dictionary entries that are close
/// misspellings or substring relatives.
pub fn variants(resolved: &str, dictionary: &[String]) -> Vec<String> {
	let resolved = resolved.trim();

	if resolved.is_empty() {
		return Vec::new();
	}

	let mut out = Vec::new();
	let mut push = |candidate: String| {
		if !candidate.is_empty() && !out.contains(&candidate) {
			out.push(candidate);
		}
	};

	push(resolved.to_string());
	push(resolved.to_uppercase());
	push(resolved.to_lowercase());
	push(title_case(resolved));
	push(resolved.replace(' ', ""));
	push(resolved.replace(' ', "-"));
	push(resolved.replace(' ', "."));

	let lowered = resolved.to_lowercase();

	for entry in dictionary {
		let entry_lowered = entry.to_lowercase();

		if entry_lowered == lowered {
			continue;
		}

		let max_len = lowered.chars().count().max(entry_lowered.chars().count());
		let edit_ratio =
			levenshtein(lowered.as_str(), entry_lowered.as_str()) as f64 / max_len as f64;

		if edit_ratio < VARIANT_EDIT_RATIO
			|| entry_lowered.contains(lowered.as_str())
			|| lowered.contains(entry_lowered.as_str())
		{
			push(entry.clone());
		}
	}

	out
}

fn strip_punctuation(text: &str) -> String {
	text.chars().filter(|ch| ch.is_alphanumeric()).collect()
}

fn title_case(text: &str) -> String {
	text.split_whitespace()
		.map(|word| {
			let mut chars = word.chars();

			match chars.next() {
				Some(first) => {
					first.to_uppercase().collect::<String>() + chars.as_str().to_lowercase().as_str()
				},
				None => String::new(),
			}
		})
		.collect::<Vec<_>>()
		.join(" ")
}
