use std::cmp::Ordering;

use crate::search::{MatchLevel, scoring::ScoredHit};
use pricematch_config::Filter;

/// Thresholds and ranks scored candidates under the configured policy.
/// Survivors come back sorted by similarity descending, then matched
/// keywords, then recency; output is never larger than the input.
pub fn apply(cfg: &Filter, hits: Vec<ScoredHit>, keyword_count: usize) -> Vec<ScoredHit> {
	let mut kept = match cfg.policy.as_str() {
		"relative" => relative(cfg, hits),
		"adaptive" => adaptive(cfg, hits, keyword_count),
		_ => absolute(cfg, hits),
	};

	kept.sort_by(|left, right| {
		cmp_f64_desc(left.similarity_score, right.similarity_score)
			.then_with(|| right.matched_keywords.cmp(&left.matched_keywords))
			.then_with(|| right.listing.updated_at.cmp(&left.listing.updated_at))
			.then_with(|| left.listing.listing_id.cmp(&right.listing.listing_id))
	});

	kept
}

pub fn match_level(similarity_score: f64) -> MatchLevel {
	if similarity_score >= 0.9 {
		MatchLevel::Excellent
	} else if similarity_score >= 0.8 {
		MatchLevel::VeryGood
	} else if similarity_score >= 0.7 {
		MatchLevel::Good
	} else if similarity_score >= 0.6 {
		MatchLevel::Medium
	} else {
		MatchLevel::Weak
	}
}

fn absolute(cfg: &Filter, hits: Vec<ScoredHit>) -> Vec<ScoredHit> {
	hits.into_iter().filter(|hit| hit.similarity_score >= cfg.threshold).collect()
}

/// Keep candidates at or above both the mean score and a fraction of the
/// best score; adapts to how strong the candidate set is overall.
fn relative(cfg: &Filter, hits: Vec<ScoredHit>) -> Vec<ScoredHit> {
	if hits.is_empty() {
		return hits;
	}

	let total: f64 = hits.iter().map(|hit| hit.similarity_score).sum();
	let mean = total / hits.len() as f64;
	let best = hits.iter().map(|hit| hit.similarity_score).fold(0.0, f64::max);
	let cutoff = mean.max(best * cfg.relative_best_ratio);

	hits.into_iter().filter(|hit| hit.similarity_score >= cutoff).collect()
}

/// The full-text pathway: the strongest raw relevance picks a keep rate
/// bracket, and every survivor must also match at least the configured share
/// of the query's keywords.
fn adaptive(cfg: &Filter, mut hits: Vec<ScoredHit>, keyword_count: usize) -> Vec<ScoredHit> {
	if hits.is_empty() {
		return hits;
	}

	let best_relevance =
		hits.iter().filter_map(|hit| hit.relevance).fold(0.0_f32, f32::max);
	let keep_rate = if best_relevance >= 1_000.0 {
		0.8
	} else if best_relevance >= 500.0 {
		0.7
	} else if best_relevance >= 200.0 {
		0.6
	} else {
		0.5
	};
	let min_matched = (keyword_count as f64 * cfg.adaptive_keyword_ratio).ceil() as u32;

	hits.sort_by(|left, right| cmp_f64_desc(left.similarity_score, right.similarity_score));

	let keep = ((hits.len() as f64 * keep_rate).ceil() as usize).min(hits.len());

	hits.truncate(keep);
	hits.retain(|hit| keyword_count == 0 || hit.matched_keywords >= min_matched);

	hits
}

fn cmp_f64_desc(a: f64, b: f64) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}

#[cfg(test)]
mod tests {
	use time::OffsetDateTime;

	use super::{apply, match_level};
	use crate::search::{ComponentScores, MatchLevel, scoring::ScoredHit};
	use pricematch_config::Filter;
	use pricematch_storage::models::CompetitorListing;

	fn hit(listing_id: i64, similarity_score: f64, matched_keywords: u32) -> ScoredHit {
		ScoredHit {
			listing: CompetitorListing {
				listing_id,
				name: format!("listing-{listing_id}"),
				vendor: String::new(),
				kind: String::new(),
				variation: String::new(),
				price: 10.0,
				currency_unit: "EUR".to_string(),
				url: String::new(),
				image_url: String::new(),
				site_id: 1,
				site_name: String::new(),
				updated_at: OffsetDateTime::UNIX_EPOCH,
			},
			component_scores: ComponentScores::default(),
			similarity_score,
			matched_keywords,
			relevance: None,
		}
	}

	fn filter(policy: &str, threshold: f64) -> Filter {
		let raw = format!("policy = \"{policy}\"\nthreshold = {threshold}");

		toml::from_str(raw.as_str()).expect("Test filter config must parse.")
	}

	#[test]
	fn absolute_policy_drops_below_threshold() {
		let hits = vec![hit(1, 0.95, 2), hit(2, 0.65, 1), hit(3, 0.72, 0)];
		let kept = apply(&filter("absolute", 0.7), hits, 2);

		assert_eq!(kept.len(), 2);
		assert_eq!(kept[0].listing.listing_id, 1);
		assert_eq!(kept[1].listing.listing_id, 3);
	}

	#[test]
	fn output_is_sorted_non_increasing_and_never_grows() {
		let hits = vec![hit(1, 0.71, 0), hit(2, 0.99, 1), hit(3, 0.85, 2), hit(4, 0.2, 0)];
		let input_len = hits.len();
		let kept = apply(&filter("absolute", 0.5), hits, 2);

		assert!(kept.len() <= input_len);

		for pair in kept.windows(2) {
			assert!(pair[0].similarity_score >= pair[1].similarity_score);
		}
	}

	#[test]
	fn ties_break_on_matched_keywords() {
		let hits = vec![hit(1, 0.8, 1), hit(2, 0.8, 3)];
		let kept = apply(&filter("absolute", 0.5), hits, 3);

		assert_eq!(kept[0].listing.listing_id, 2);
	}

	#[test]
	fn relative_policy_keeps_the_strong_cluster() {
		// Mean 0.5, best 0.9 -> cutoff max(0.5, 0.54) = 0.54.
		let hits = vec![hit(1, 0.9, 0), hit(2, 0.6, 0), hit(3, 0.3, 0), hit(4, 0.2, 0)];
		let kept = apply(&filter("relative", 0.7), hits, 0);

		assert_eq!(kept.len(), 2);
		assert!(kept.iter().all(|hit| hit.similarity_score >= 0.54));
	}

	#[test]
	fn adaptive_policy_requires_half_the_keywords() {
		let hits = vec![hit(1, 0.9, 2), hit(2, 0.8, 0), hit(3, 0.7, 1), hit(4, 0.6, 2)];
		// 4 keywords -> survivors need >= 2 matched.
		let kept = apply(&filter("adaptive", 0.7), hits, 4);

		assert!(kept.iter().all(|hit| hit.matched_keywords >= 2));
		// Keep rate 0.5 with no relevance: top 2 by similarity, then the
		// keyword gate drops listing 2.
		assert_eq!(kept.len(), 1);
		assert_eq!(kept[0].listing.listing_id, 1);
	}

	#[test]
	fn empty_input_stays_empty() {
		for policy in ["absolute", "relative", "adaptive"] {
			assert!(apply(&filter(policy, 0.7), Vec::new(), 2).is_empty());
		}
	}

	#[test]
	fn match_levels_band_by_score() {
		assert_eq!(match_level(0.95), MatchLevel::Excellent);
		assert_eq!(match_level(0.9), MatchLevel::Excellent);
		assert_eq!(match_level(0.85), MatchLevel::VeryGood);
		assert_eq!(match_level(0.75), MatchLevel::Good);
		assert_eq!(match_level(0.65), MatchLevel::Medium);
		assert_eq!(match_level(0.2), MatchLevel::Weak);
	}
}
