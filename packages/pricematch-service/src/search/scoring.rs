use crate::search::{ComponentScores, ProductQuery, retrieval::RetrievedCandidate};
use pricematch_config::{Matching, WeightProfile};
use pricematch_domain::{similarity, title};
use pricematch_storage::models::CompetitorListing;

/// A scored candidate before filtering: the listing, its per-field scores,
/// and the retrieval relevance carried through for the adaptive filter.
#[derive(Debug, Clone)]
pub struct ScoredHit {
	pub listing: CompetitorListing,
	pub component_scores: ComponentScores,
	pub similarity_score: f64,
	pub matched_keywords: u32,
	pub relevance: Option<f32>,
}

/// One resolved weight set. Weights come from the active named profile; the
/// built-in balanced profile is the fallback if configuration names a
/// missing one.
#[derive(Debug, Clone, Copy)]
pub struct Weights {
	pub name: f64,
	pub kind: f64,
	pub variation: f64,
	pub vendor: f64,
	pub volume: f64,
	pub exact_bonus: f64,
	pub exact_bonus_cap: f64,
	pub breadth_bonus: f64,
	pub breadth_floor: f64,
	pub empty_field_floor: f64,
}
impl Weights {
	pub fn balanced() -> Self {
		Self {
			name: 0.35,
			kind: 0.25,
			variation: 0.20,
			vendor: 0.15,
			volume: 0.05,
			exact_bonus: 0.12,
			exact_bonus_cap: 0.15,
			breadth_bonus: 0.06,
			breadth_floor: 0.75,
			empty_field_floor: 0.3,
		}
	}

	pub fn from_profile(profile: &WeightProfile) -> Self {
		Self {
			name: profile.name,
			kind: profile.kind,
			variation: profile.variation,
			vendor: profile.vendor,
			volume: profile.volume,
			exact_bonus: profile.exact_bonus,
			exact_bonus_cap: profile.exact_bonus_cap,
			breadth_bonus: profile.breadth_bonus,
			breadth_floor: profile.breadth_floor,
			empty_field_floor: profile.empty_field_floor,
		}
	}

	pub fn active(matching: &Matching) -> Self {
		match matching.profiles.get(&matching.profile) {
			Some(profile) => Self::from_profile(profile),
			None => {
				// Config validation rejects this; guard anyway for services
				// constructed without going through the loader.
				tracing::warn!(
					profile = %matching.profile,
					"Unknown weight profile; using the balanced weights."
				);

				Self::balanced()
			},
		}
	}
}

/// Computes the weighted composite similarity for one retrieved listing.
pub fn score(
	query: &ProductQuery,
	retrieved: RetrievedCandidate,
	weights: &Weights,
) -> ScoredHit {
	let listing = retrieved.listing;
	let floor = weights.empty_field_floor;
	let component_scores = ComponentScores {
		// An unnamed query must not score highly by accident, so the name
		// field has no empty-input floor.
		name: strict_field_score(query.product_name.as_str(), listing.name.as_str(), floor),
		kind: lenient_field_score(query.kind.as_str(), listing.kind.as_str(), floor),
		variation: lenient_field_score(
			query.variation.as_str(),
			listing.variation.as_str(),
			floor,
		),
		// Unresolved vendors score zero (scenario: vendor absent from the
		// dictionary drives ranking through the other fields).
		vendor: strict_field_score(query.vendor.as_str(), listing.vendor.as_str(), floor),
		volume: volume_score(&query.volumes, &listing),
	};
	let weighted = weights.name * component_scores.name
		+ weights.kind * component_scores.kind
		+ weights.variation * component_scores.variation
		+ weights.vendor * component_scores.vendor
		+ weights.volume * component_scores.volume;
	let bonuses = exact_bonus(query, &listing, weights) + breadth_bonus(&component_scores, weights);
	let similarity_score = (weighted + bonuses).min(1.0);

	ScoredHit {
		matched_keywords: matched_keywords(query, &listing),
		listing,
		component_scores,
		similarity_score,
		relevance: retrieved.relevance,
	}
}

/// Zero when the query side is empty; the floor when only the listing side
/// is empty.
fn strict_field_score(query_value: &str, listing_value: &str, floor: f64) -> f64 {
	if query_value.trim().is_empty() {
		return 0.0;
	}
	if listing_value.trim().is_empty() {
		return floor;
	}

	similarity::blended(query_value, listing_value)
}

/// The floor when either side is empty.
fn lenient_field_score(query_value: &str, listing_value: &str, floor: f64) -> f64 {
	if query_value.trim().is_empty() || listing_value.trim().is_empty() {
		return floor;
	}

	similarity::blended(query_value, listing_value)
}

/// Binary on requested volumes, neutral when none were requested.
fn volume_score(requested: &[String], listing: &CompetitorListing) -> f64 {
	if requested.is_empty() {
		return 0.5;
	}

	let listing_text = format!("{} {}", listing.name, listing.variation);
	let available = title::extract_volumes(listing_text.as_str());

	if requested.iter().any(|volume| available.contains(volume)) { 1.0 } else { 0.0 }
}

fn exact_bonus(query: &ProductQuery, listing: &CompetitorListing, weights: &Weights) -> f64 {
	let pairs = [
		(query.product_name.as_str(), listing.name.as_str()),
		(query.kind.as_str(), listing.kind.as_str()),
		(query.variation.as_str(), listing.variation.as_str()),
		(query.vendor.as_str(), listing.vendor.as_str()),
	];
	let mut bonus = 0.0;

	for (query_value, listing_value) in pairs {
		if !query_value.is_empty() && folded(query_value) == folded(listing_value) {
			bonus += weights.exact_bonus;
		}
	}

	bonus.min(weights.exact_bonus_cap)
}

/// Rewards broad agreement across fields over a single strong one.
fn breadth_bonus(scores: &ComponentScores, weights: &Weights) -> f64 {
	let strong = [scores.name, scores.kind, scores.variation, scores.vendor, scores.volume]
		.into_iter()
		.filter(|score| *score >= weights.breadth_floor)
		.count();

	if strong >= 2 { weights.breadth_bonus } else { 0.0 }
}

fn matched_keywords(query: &ProductQuery, listing: &CompetitorListing) -> u32 {
	if query.keywords.is_empty() {
		return 0;
	}

	let haystack = format!("{} {}", listing.name, listing.variation).to_lowercase();

	query.keywords.iter().filter(|keyword| haystack.contains(keyword.as_str())).count() as u32
}

/// Case- and space-insensitive comparison form for exact-match bonuses.
fn folded(value: &str) -> String {
	value.chars().filter(|ch| !ch.is_whitespace()).collect::<String>().to_lowercase()
}
