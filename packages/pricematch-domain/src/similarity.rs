use std::collections::HashMap;

use strsim::{jaro_winkler, levenshtein};

const JARO_WEIGHT: f64 = 0.4;
const LEVENSHTEIN_WEIGHT: f64 = 0.3;
const COSINE_WEIGHT: f64 = 0.3;
const CONTAINMENT_BONUS: f64 = 0.25;

/// `1 - distance / max(len)`, on characters. Two empty strings are identical.
pub fn levenshtein_ratio(left: &str, right: &str) -> f64 {
	let max_len = left.chars().count().max(right.chars().count());

	if max_len == 0 {
		return 1.0;
	}

	1.0 - levenshtein(left, right) as f64 / max_len as f64
}

/// Cosine of the word-frequency vectors of the two strings.
pub fn cosine_token_overlap(left: &str, right: &str) -> f64 {
	let left_freq = token_frequencies(left);
	let right_freq = token_frequencies(right);

	if left_freq.is_empty() || right_freq.is_empty() {
		return 0.0;
	}

	let mut dot = 0.0;

	for (token, count) in &left_freq {
		if let Some(other) = right_freq.get(token) {
			dot += (*count as f64) * (*other as f64);
		}
	}

	let left_norm: f64 =
		left_freq.values().map(|count| (*count as f64) * (*count as f64)).sum::<f64>().sqrt();
	let right_norm: f64 =
		right_freq.values().map(|count| (*count as f64) * (*count as f64)).sum::<f64>().sqrt();

	if left_norm == 0.0 || right_norm == 0.0 {
		return 0.0;
	}

	dot / (left_norm * right_norm)
}

/// The blended per-field string similarity: Jaro-Winkler, Levenshtein ratio
/// and token cosine combined, plus a capped bump when one side contains the
/// other. Inputs are compared case-insensitively; result is in [0, 1].
pub fn blended(left: &str, right: &str) -> f64 {
	let left = left.trim().to_lowercase();
	let right = right.trim().to_lowercase();

	if left.is_empty() || right.is_empty() {
		return 0.0;
	}
	if left == right {
		return 1.0;
	}

	let base = JARO_WEIGHT * jaro_winkler(left.as_str(), right.as_str())
		+ LEVENSHTEIN_WEIGHT * levenshtein_ratio(left.as_str(), right.as_str())
		+ COSINE_WEIGHT * cosine_token_overlap(left.as_str(), right.as_str());
	let bonus = if left.contains(right.as_str()) || right.contains(left.as_str()) {
		CONTAINMENT_BONUS
	} else {
		0.0
	};

	(base + bonus).clamp(0.0, 1.0)
}

fn token_frequencies(text: &str) -> HashMap<&str, u32> {
	let mut out = HashMap::new();

	for token in text.split_whitespace() {
		*out.entry(token).or_insert(0) += 1;
	}

	out
}
