use regex::Regex;
use serde::{Deserialize, Serialize};

/// Fragrance/cosmetic kinds with their catalog abbreviations.
const KIND_VOCABULARY: &[(&str, &[&str])] = &[
	("eau de parfum", &["edp", "eau de parfum", "parfum"]),
	("eau de toilette", &["edt", "eau de toilette"]),
	("eau de cologne", &["edc", "eau de cologne", "cologne"]),
	("serum", &["serum", "sérum"]),
	("cream", &["cream", "creme", "crème"]),
	("lotion", &["lotion"]),
	("gel", &["gel"]),
	("mask", &["mask", "masque"]),
	("oil", &["oil", "huile"]),
];

const COLOR_VOCABULARY: &[&str] = &[
	"noir", "black", "blanc", "white", "rouge", "red", "rose", "pink", "bleu", "blue", "beige",
	"nude", "gold", "or", "argent", "silver", "brun", "brown", "vert", "green", "violet", "purple",
];

const FINISH_VOCABULARY: &[&str] =
	&["mat", "matte", "satin", "satine", "brillant", "gloss", "glossy", "shimmer", "metallic", "nacre"];

/// Generic vocabulary scrubbed from the name part to isolate the product
/// name proper: kind words, filler nouns, units.
const NAME_NOISE: &[&str] = &[
	"edp", "edt", "edc", "eau", "de", "parfum", "toilette", "cologne", "spray", "vapo",
	"vaporisateur", "recharge", "refill", "coffret", "set", "ml", "gr", "g", "kg", "oz",
];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TitleComponents {
	pub vendor: String,
	pub name: String,
	pub kind: String,
	pub variation: String,
	pub color: String,
	pub finish: String,
	pub volumes: Vec<String>,
	pub capacities: Vec<String>,
}

/// Splits a normalized title into its components using the ordered
/// hyphen-delimited patterns `vendor - name - kind - variation`, then
/// three-part, two-part, and finally a bare first-token vendor. Always
/// returns a fully populated value; fields that matched nothing stay empty.
pub fn extract(title: &str) -> TitleComponents {
	let mut components = TitleComponents {
		volumes: extract_volumes(title),
		capacities: extract_capacities(title),
		color: match_vocabulary(title, COLOR_VOCABULARY),
		finish: match_vocabulary(title, FINISH_VOCABULARY),
		..TitleComponents::default()
	};
	let parts: Vec<&str> =
		title.split(" - ").map(str::trim).filter(|part| !part.is_empty()).collect();

	match parts.as_slice() {
		[] => {},
		[single] => {
			let mut tokens = single.split_whitespace();

			components.vendor = tokens.next().unwrap_or_default().to_string();
			components.name = clean_name(tokens.collect::<Vec<_>>().join(" ").as_str());
		},
		[vendor, name] => {
			components.vendor = (*vendor).to_string();
			components.name = clean_name(name);
		},
		[vendor, name, kind] => {
			components.vendor = (*vendor).to_string();
			components.name = clean_name(name);

			match canonical_kind(kind) {
				Some(kind) => components.kind = kind,
				None => components.variation = (*kind).to_string(),
			}
		},
		[vendor, name, kind, variation @ ..] => {
			components.vendor = (*vendor).to_string();
			components.name = clean_name(name);
			components.kind = canonical_kind(kind).unwrap_or_else(|| (*kind).to_string());
			components.variation = variation.join(" - ");
		},
	}

	if components.kind.is_empty()
		&& let Some(kind) = scan_kind(title)
	{
		components.kind = kind;
	}

	components
}

/// All `NNml` volumes in the text, in order of appearance.
pub fn extract_volumes(text: &str) -> Vec<String> {
	capture_all(text, r"(?i)(\d+)\s*ml\b")
}

/// All `NN g|kg|oz|l` capacities in the text, in order of appearance.
pub fn extract_capacities(text: &str) -> Vec<String> {
	capture_all(text, r"(?i)(\d+)\s*(?:g|kg|oz|l)\b")
}

pub fn canonical_kind(fragment: &str) -> Option<String> {
	let lowered = fragment.trim().to_lowercase();
	let stripped = strip_sizes(lowered.as_str());

	for (canonical, spellings) in KIND_VOCABULARY {
		if spellings.iter().any(|spelling| *spelling == stripped.as_str()) {
			return Some((*canonical).to_string());
		}
	}

	None
}

fn scan_kind(title: &str) -> Option<String> {
	let lowered = title.to_lowercase();

	// Multi-word spellings first so "eau de parfum" wins over "parfum".
	for (canonical, spellings) in KIND_VOCABULARY {
		for spelling in *spellings {
			if spelling.contains(' ') && lowered.contains(spelling) {
				return Some((*canonical).to_string());
			}
		}
	}

	for token in lowered.split_whitespace() {
		for (canonical, spellings) in KIND_VOCABULARY {
			if spellings.iter().any(|spelling| *spelling == token) {
				return Some((*canonical).to_string());
			}
		}
	}

	None
}

fn match_vocabulary(title: &str, vocabulary: &[&str]) -> String {
	let lowered = title.to_lowercase();

	lowered
		.split_whitespace()
		.find(|token| vocabulary.contains(token))
		.map(str::to_string)
		.unwrap_or_default()
}

fn clean_name(name: &str) -> String {
	let stripped = strip_sizes(name);
	let kept: Vec<&str> = stripped
		.split_whitespace()
		.filter(|token| {
			let lowered = token.to_lowercase();

			!NAME_NOISE.contains(&lowered.as_str())
		})
		.collect();

	kept.join(" ")
}

fn strip_sizes(text: &str) -> String {
	let Ok(re) = Regex::new(r"(?i)\d+\s*(?:ml|kg|gr|g|oz|l)\b") else {
		return text.trim().to_string();
	};

	re.replace_all(text, " ").split_whitespace().collect::<Vec<_>>().join(" ")
}

fn capture_all(text: &str, pattern: &str) -> Vec<String> {
	let Ok(re) = Regex::new(pattern) else { return Vec::new() };

	re.captures_iter(text).filter_map(|cap| cap.get(1)).map(|m| m.as_str().to_string()).collect()
}
