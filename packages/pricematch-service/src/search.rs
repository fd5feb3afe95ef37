mod cache;
mod filter;
mod query;
mod retrieval;
mod scoring;

pub use scoring::Weights;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{MatchService, ServiceResult};
use pricematch_domain::price::{self, PriceStatus};
use pricematch_domain::{normalize, vendor};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
	pub title: String,
	#[serde(default)]
	pub reference_price: Option<PriceInput>,
	#[serde(default)]
	pub site_filter: Option<Vec<i32>>,
}

/// Reference prices arrive as numbers from the catalog and as raw strings
/// from spreadsheet imports; both are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
	Number(f64),
	Text(String),
}
impl PriceInput {
	pub fn as_price(&self) -> f64 {
		match self {
			Self::Number(value) => *value,
			Self::Text(raw) => price::clean_price(raw),
		}
	}
}

/// Everything extracted from one search title. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductQuery {
	pub raw_title: String,
	pub normalized_title: String,
	pub reference_price: Option<f64>,
	/// Resolved against the vendor dictionary; empty when unknown.
	pub vendor: String,
	pub product_name: String,
	pub kind: String,
	pub variation: String,
	pub color: String,
	pub finish: String,
	pub volumes: Vec<String>,
	pub capacities: Vec<String>,
	pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
	pub name: f64,
	pub kind: f64,
	pub variation: f64,
	pub vendor: f64,
	pub volume: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchLevel {
	Excellent,
	VeryGood,
	Good,
	Medium,
	Weak,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
	pub listing_id: i64,
	pub name: String,
	pub vendor: String,
	pub kind: String,
	pub variation: String,
	pub price: f64,
	pub currency_unit: String,
	pub url: String,
	pub image_url: String,
	pub site_id: i32,
	pub site_name: String,
	#[serde(with = "crate::time_serde")]
	pub updated_at: time::OffsetDateTime,
	pub component_scores: ComponentScores,
	pub similarity_score: f64,
	pub match_level: MatchLevel,
	pub matched_keywords: u32,
	pub price_difference: Option<f64>,
	pub price_difference_percent: Option<f64>,
	pub price_status: Option<PriceStatus>,
	pub price_comparable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
	pub search_id: Uuid,
	pub query: ProductQuery,
	pub items: Vec<ScoredCandidate>,
	pub cached: bool,
	/// Empty on success; set when every retrieval strategy failed.
	pub error: String,
}
impl SearchResponse {
	fn empty(query: ProductQuery) -> Self {
		Self {
			search_id: Uuid::new_v4(),
			query,
			items: Vec::new(),
			cached: false,
			error: String::new(),
		}
	}
}

impl MatchService {
	/// Runs the full matching pipeline for one title. Fail-soft end to end: a
	/// broken store yields an empty ranked list with the error marker set,
	/// never an error to the caller.
	pub async fn search(&self, request: SearchRequest) -> ServiceResult<SearchResponse> {
		let normalized_title = normalize::normalize(request.title.as_str());
		let reference_price = request.reference_price.as_ref().map(PriceInput::as_price);
		let site_filter = request.site_filter.filter(|sites| !sites.is_empty());

		if normalized_title.is_empty() {
			return Ok(SearchResponse::empty(ProductQuery {
				raw_title: request.title,
				reference_price,
				..ProductQuery::default()
			}));
		}

		let dictionary = self.vendor_dictionary().await;
		let product_query =
			query::build(request.title, normalized_title, reference_price, &dictionary);
		let cache_key =
			cache::search_cache_key(&self.cfg, &product_query, site_filter.as_deref())?;
		let computed = self.ranked_items(&product_query, &dictionary, site_filter.as_deref());
		let remembered = cache::remember(
			self.stores.cache.as_ref(),
			self.cfg.cache.enabled,
			cache_key.as_str(),
			self.cfg.cache.results_ttl_secs,
			computed,
		)
		.await;

		match remembered {
			Ok((items, cached)) => Ok(SearchResponse {
				search_id: Uuid::new_v4(),
				query: product_query,
				items,
				cached,
				error: String::new(),
			}),
			Err(err) => {
				tracing::warn!(error = %err, "Search pipeline failed; returning an empty result.");

				Ok(SearchResponse {
					search_id: Uuid::new_v4(),
					query: product_query,
					items: Vec::new(),
					cached: false,
					error: err.to_string(),
				})
			},
		}
	}

	/// Retrieval, scoring, filtering and price classification for an already
	/// extracted query. Errors only when every retrieval strategy failed.
	async fn ranked_items(
		&self,
		product_query: &ProductQuery,
		dictionary: &[String],
		site_filter: Option<&[i32]>,
	) -> ServiceResult<Vec<ScoredCandidate>> {
		let vendor_variants = vendor::variants(product_query.vendor.as_str(), dictionary);
		let outcome = retrieval::run(
			self.stores.listings.as_ref(),
			&self.cfg.retrieval,
			product_query,
			&vendor_variants,
			site_filter,
		)
		.await;

		if outcome.all_failed() {
			return Err(crate::ServiceError::Storage {
				message: "All retrieval strategies failed.".to_string(),
			});
		}

		let weights = Weights::active(&self.cfg.matching);
		let hits: Vec<scoring::ScoredHit> = outcome
			.candidates
			.into_iter()
			.map(|retrieved| scoring::score(product_query, retrieved, &weights))
			.collect();
		let kept = filter::apply(&self.cfg.filter, hits, product_query.keywords.len());
		let items = kept
			.into_iter()
			.map(|hit| finalize(hit, product_query.reference_price))
			.collect();

		Ok(items)
	}

	/// The distinct-vendor dictionary, cached on the long TTL. A store
	/// failure resolves to an empty dictionary rather than failing the search.
	async fn vendor_dictionary(&self) -> Vec<String> {
		let computed = async { self.stores.listings.distinct_vendors().await };
		let remembered = cache::remember(
			self.stores.cache.as_ref(),
			self.cfg.cache.enabled,
			cache::VENDOR_DICTIONARY_CACHE_KEY,
			self.cfg.cache.vendors_ttl_secs,
			computed,
		)
		.await;

		match remembered {
			Ok((vendors, _)) => vendors,
			Err(err) => {
				tracing::warn!(error = %err, "Vendor dictionary unavailable; resolving without it.");

				Vec::new()
			},
		}
	}
}

fn finalize(hit: scoring::ScoredHit, reference_price: Option<f64>) -> ScoredCandidate {
	let listing = hit.listing;
	let comparison = reference_price.map(|reference| price::compare(reference, listing.price));

	ScoredCandidate {
		listing_id: listing.listing_id,
		name: listing.name,
		vendor: listing.vendor,
		kind: listing.kind,
		variation: listing.variation,
		price: listing.price,
		currency_unit: listing.currency_unit,
		url: listing.url,
		image_url: listing.image_url,
		site_id: listing.site_id,
		site_name: listing.site_name,
		updated_at: listing.updated_at,
		component_scores: hit.component_scores,
		similarity_score: hit.similarity_score,
		match_level: filter::match_level(hit.similarity_score),
		matched_keywords: hit.matched_keywords,
		price_difference: comparison.map(|comparison| comparison.difference),
		price_difference_percent: comparison.map(|comparison| comparison.difference_percent),
		price_status: comparison.map(|comparison| comparison.status),
		// A scraped price of zero is a parse failure upstream; the candidate
		// stays in the ranking but price classification is not meaningful.
		price_comparable: listing.price > 0.0,
	}
}
