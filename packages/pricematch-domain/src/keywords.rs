use regex::Regex;

pub const MAX_KEYWORDS: usize = 10;

/// French and English function words seen in scraped titles.
const FUNCTION_WORDS: &[&str] = &[
	"les", "une", "des", "est", "aux", "par", "pour", "avec", "sans", "sur", "sous", "dans", "the",
	"and", "for", "with", "without", "from", "this", "that", "new", "our",
];

/// Product-domain nouns too generic to discriminate between listings.
const DOMAIN_WORDS: &[&str] = &[
	"creme", "serum", "lotion", "soin", "gel", "masque", "mask", "huile", "oil", "visage", "corps",
	"yeux", "levres", "peau", "cheveux", "homme", "femme", "men", "women", "face", "body", "skin",
	"hair", "care", "parfum", "toilette", "cologne", "eau", "spray", "vapo", "vaporisateur",
	"coffret", "set", "recharge", "refill", "edition", "collection",
];

/// Technical/formulation terms that match almost everything in the store.
const TECHNICAL_WORDS: &[&str] =
	&["spf", "collagene", "acide", "vitamine", "vitamin", "complex", "complexe", "formule", "formula"];

/// Significant search keywords from a normalized title: lowercase, split on
/// whitespace/hyphens, stop words and size/code tokens dropped, de-duplicated
/// in order, capped at [`MAX_KEYWORDS`].
pub fn extract_keywords(title: &str, vendor: Option<&str>) -> Vec<String> {
	let mut text = title.to_string();

	if let Some(vendor) = vendor.map(str::trim).filter(|vendor| !vendor.is_empty()) {
		// Case-insensitive removal of the vendor fragment before tokenizing.
		if let Ok(re) = Regex::new(format!("(?i){}", regex::escape(vendor)).as_str()) {
			text = re.replace_all(text.as_str(), " ").to_string();
		}
	}

	// Punctuation other than hyphens becomes a token boundary.
	let cleaned: String =
		text.chars().map(|ch| if ch.is_alphanumeric() || ch == '-' { ch } else { ' ' }).collect();
	let mut out = Vec::new();

	for raw in cleaned.split_whitespace().flat_map(|chunk| chunk.split('-')) {
		if raw.is_empty() || looks_like_product_code(raw) {
			continue;
		}

		let token = raw.to_lowercase();

		if !keep_token(token.as_str()) {
			continue;
		}
		if !out.contains(&token) {
			out.push(token);
		}
		if out.len() >= MAX_KEYWORDS {
			break;
		}
	}

	out
}

fn keep_token(token: &str) -> bool {
	if token.chars().count() < 3 {
		return false;
	}
	if FUNCTION_WORDS.contains(&token)
		|| DOMAIN_WORDS.contains(&token)
		|| TECHNICAL_WORDS.contains(&token)
	{
		return false;
	}
	if token.chars().all(|ch| ch.is_ascii_digit()) {
		return false;
	}

	!is_size_token(token)
}

/// `50ml`, `100g`, `30%` and friends.
fn is_size_token(token: &str) -> bool {
	let Ok(re) = Regex::new(r"^\d+(?:ml|gr|g|kg|oz|l|%)$") else { return false };

	re.is_match(token)
}

/// Upper-case alphanumeric references of length >= 4 with at least one digit
/// read as product codes, not words.
fn looks_like_product_code(raw: &str) -> bool {
	raw.chars().count() >= 4
		&& raw.chars().all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit())
		&& raw.chars().any(|ch| ch.is_ascii_digit())
}
