use std::collections::HashSet;

use crate::{ListingStore, search::ProductQuery};
use pricematch_config::Retrieval;
use pricematch_storage::models::{CompetitorListing, FulltextHit};

/// One retrieved listing, with the store's raw full-text relevance when the
/// full-text strategy produced it.
#[derive(Debug, Clone)]
pub struct RetrievedCandidate {
	pub listing: CompetitorListing,
	pub relevance: Option<f32>,
}

#[derive(Debug, Default)]
pub struct RetrievalOutcome {
	pub candidates: Vec<RetrievedCandidate>,
	pub attempted: u32,
	pub failed: u32,
}
impl RetrievalOutcome {
	pub fn all_failed(&self) -> bool {
		self.attempted > 0 && self.attempted == self.failed
	}
}

struct Accumulator {
	candidates: Vec<RetrievedCandidate>,
	seen_ids: HashSet<i64>,
	seen_urls: HashSet<String>,
	cap: usize,
}
impl Accumulator {
	fn new(cap: usize) -> Self {
		Self { candidates: Vec::new(), seen_ids: HashSet::new(), seen_urls: HashSet::new(), cap }
	}

	fn absorb(&mut self, listing: CompetitorListing, relevance: Option<f32>) {
		if self.candidates.len() >= self.cap {
			return;
		}
		if !self.seen_ids.insert(listing.listing_id) {
			return;
		}
		if !listing.url.is_empty() && !self.seen_urls.insert(listing.url.clone()) {
			return;
		}

		self.candidates.push(RetrievedCandidate { listing, relevance });
	}

	fn len(&self) -> usize {
		self.candidates.len()
	}
}

/// Runs the ordered retrieval strategies, accumulating de-duplicated
/// candidates (key: listing id, then url) and stopping early once enough are
/// gathered. Every strategy is independently fail-soft: a store error is
/// logged and contributes nothing.
pub async fn run(
	listings: &dyn ListingStore,
	cfg: &Retrieval,
	query: &ProductQuery,
	vendor_variants: &[String],
	site_filter: Option<&[i32]>,
) -> RetrievalOutcome {
	let mut acc = Accumulator::new(cfg.max_candidates as usize);
	let mut attempted = 0_u32;
	let mut failed = 0_u32;
	let limit = i64::from(cfg.strategy_row_limit);
	let exclude_generic = cfg.variation_filter == "exclude_generic";

	if !vendor_variants.is_empty() && !query.keywords.is_empty() {
		attempted += 1;

		match listings
			.by_vendor_and_keywords(
				vendor_variants,
				&query.keywords,
				site_filter,
				exclude_generic,
				limit,
			)
			.await
		{
			Ok(rows) =>
				for listing in rows {
					acc.absorb(listing, None);
				},
			Err(err) => {
				failed += 1;

				tracing::warn!(error = %err, "Vendor+keyword retrieval strategy failed.");
			},
		}
	}

	if acc.len() < cfg.fulltext_below as usize && !query.keywords.is_empty() {
		let terms =
			&query.keywords[..query.keywords.len().min(cfg.max_fulltext_terms as usize)];

		attempted += 1;

		match listings.by_fulltext(terms, site_filter, limit).await {
			Ok(hits) =>
				for FulltextHit { listing, relevance } in hits {
					acc.absorb(listing, Some(relevance));
				},
			Err(err) => {
				failed += 1;

				tracing::warn!(error = %err, "Full-text retrieval strategy failed.");
			},
		}
	}

	if acc.len() < cfg.fallback_below as usize && !vendor_variants.is_empty() {
		attempted += 1;

		match listings.by_vendors(vendor_variants, site_filter, exclude_generic, limit).await {
			Ok(rows) =>
				for listing in rows {
					acc.absorb(listing, None);
				},
			Err(err) => {
				failed += 1;

				tracing::warn!(error = %err, "Vendor-only retrieval strategy failed.");
			},
		}
	}

	if acc.len() < cfg.fallback_below as usize
		&& (!query.kind.is_empty() || !query.color.is_empty() || !query.finish.is_empty())
	{
		attempted += 1;

		match listings
			.by_features(
				query.kind.as_str(),
				query.color.as_str(),
				query.finish.as_str(),
				site_filter,
				limit,
			)
			.await
		{
			Ok(rows) =>
				for listing in rows {
					acc.absorb(listing, None);
				},
			Err(err) => {
				failed += 1;

				tracing::warn!(error = %err, "Feature retrieval strategy failed.");
			},
		}
	}

	tracing::debug!(
		candidates = acc.len(),
		attempted,
		failed,
		"Retrieval strategies finished."
	);

	RetrievalOutcome { candidates: acc.candidates, attempted, failed }
}
