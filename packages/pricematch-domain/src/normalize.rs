use unicode_normalization::UnicodeNormalization;

/// UTF-8 text that was read back through Latin-1 by a scraper at some point.
/// Longest sequences first so shorter prefixes do not shadow them.
const MOJIBAKE: &[(&str, &str)] = &[
	("â€™", "’"),
	("â€˜", "‘"),
	("â€œ", "“"),
	("â€“", "–"),
	("â€”", "—"),
	("â€¦", "…"),
	("Ã©", "é"),
	("Ã¨", "è"),
	("Ãª", "ê"),
	("Ã«", "ë"),
	("Ã ", "à"),
	("Ã¢", "â"),
	("Ã´", "ô"),
	("Ã®", "î"),
	("Ã¯", "ï"),
	("Ã§", "ç"),
	("Ã¹", "ù"),
	("Ã»", "û"),
	("Ã¼", "ü"),
	("Ã‰", "É"),
	("Ã€", "À"),
	("Â°", "°"),
	("Â ", " "),
];

const NAMED_ENTITIES: &[(&str, &str)] = &[
	("lt", "<"),
	("gt", ">"),
	("quot", "\""),
	("apos", "'"),
	("nbsp", " "),
	("eacute", "é"),
	("egrave", "è"),
	("agrave", "à"),
	("ccedil", "ç"),
	("ocirc", "ô"),
	("ucirc", "û"),
	("uuml", "ü"),
	("ouml", "ö"),
	("deg", "°"),
	("amp", "&"),
];

/// Cleans a scraped free-text fragment (title, vendor, variation) into a
/// single canonical form: mojibake repair, NFC, HTML entity decoding, control
/// stripping, whitespace collapsing. Idempotent and total — undecodable
/// input degrades to best-effort substitution instead of erroring.
pub fn normalize(input: &str) -> String {
	let mut current = normalize_once(input);

	// Layered encodings ("&amp;eacute;", double mojibake) unwrap one level per
	// pass; iterate to the fixpoint so a second normalize is a no-op.
	for _ in 0..4 {
		let next = normalize_once(current.as_str());

		if next == current {
			break;
		}

		current = next;
	}

	current
}

fn normalize_once(input: &str) -> String {
	let mut text = input.to_string();

	for (broken, repaired) in MOJIBAKE {
		if text.contains(broken) {
			text = text.replace(broken, repaired);
		}
	}

	let text: String = text.nfc().collect();
	let text = decode_entities(text.as_str());
	let mut out = String::with_capacity(text.len());
	let mut pending_space = false;

	for ch in text.chars() {
		if ch.is_whitespace() || ch.is_control() {
			pending_space = true;

			continue;
		}
		if pending_space && !out.is_empty() {
			out.push(' ');
		}

		pending_space = false;

		out.push(ch);
	}

	out
}

fn decode_entities(input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	let mut rest = input;

	while let Some(start) = rest.find('&') {
		out.push_str(&rest[..start]);

		let tail = &rest[start..];
		let Some(end) = tail.find(';').filter(|end| *end > 1 && *end <= 10) else {
			out.push('&');

			rest = &tail[1..];

			continue;
		};
		let body = &tail[1..end];

		match decode_entity_body(body) {
			Some(decoded) => out.push_str(decoded.as_str()),
			None => out.push_str(&tail[..=end]),
		}

		rest = &tail[end + 1..];
	}

	out.push_str(rest);

	out
}

fn decode_entity_body(body: &str) -> Option<String> {
	if let Some(numeric) = body.strip_prefix('#') {
		let code = match numeric.strip_prefix(['x', 'X']) {
			Some(hex) => u32::from_str_radix(hex, 16).ok()?,
			None => numeric.parse::<u32>().ok()?,
		};

		// Undecodable code points are dropped rather than erroring.
		return Some(char::from_u32(code).map(String::from).unwrap_or_default());
	}

	NAMED_ENTITIES
		.iter()
		.find(|(name, _)| *name == body)
		.map(|(_, decoded)| (*decoded).to_string())
}
