use crate::{
	Result,
	db::Db,
	models::{CompetitorListing, FulltextHit},
};

const LISTING_COLUMNS: &str = "\
listing_id, name, vendor, kind, variation, price, currency_unit, url, image_url, site_id, \
site_name, updated_at";

/// Strategy 1: vendor variants AND a keyword hit on name or variation,
/// cheapest rows first.
pub async fn by_vendor_and_keywords(
	db: &Db,
	vendor_variants: &[String],
	keywords: &[String],
	site_filter: Option<&[i32]>,
	exclude_generic_variation: bool,
	limit: i64,
) -> Result<Vec<CompetitorListing>> {
	if vendor_variants.is_empty() || keywords.is_empty() {
		return Ok(Vec::new());
	}

	let sql = format!(
		"\
SELECT {LISTING_COLUMNS}
FROM competitor_listings
WHERE lower(vendor) = ANY($1)
	AND (name ILIKE ANY($2) OR variation ILIKE ANY($2))
	AND ($3::int4[] IS NULL OR site_id = ANY($3))
	AND ($4 = false OR lower(variation) <> 'standard')
ORDER BY price ASC
LIMIT $5"
	);
	let rows = sqlx::query_as::<_, CompetitorListing>(sql.as_str())
		.bind(lowered(vendor_variants))
		.bind(patterns(keywords))
		.bind(site_filter.map(<[i32]>::to_vec))
		.bind(exclude_generic_variation)
		.bind(limit)
		.fetch_all(&db.pool)
		.await?;

	Ok(rows)
}

/// Strategy 2: boolean full-text over (name, vendor, kind, variation) with
/// every term required and prefix-expanded, most relevant rows first.
pub async fn by_fulltext(
	db: &Db,
	terms: &[String],
	site_filter: Option<&[i32]>,
	limit: i64,
) -> Result<Vec<FulltextHit>> {
	let query = boolean_query(terms);

	if query.is_empty() {
		return Ok(Vec::new());
	}

	let sql = format!(
		"\
SELECT {LISTING_COLUMNS},
	ts_rank(
		to_tsvector('simple', name || ' ' || vendor || ' ' || kind || ' ' || variation),
		to_tsquery('simple', $1)
	) AS relevance
FROM competitor_listings
WHERE to_tsvector('simple', name || ' ' || vendor || ' ' || kind || ' ' || variation)
		@@ to_tsquery('simple', $1)
	AND ($2::int4[] IS NULL OR site_id = ANY($2))
ORDER BY relevance DESC
LIMIT $3"
	);
	let rows = sqlx::query_as::<_, FulltextHit>(sql.as_str())
		.bind(query)
		.bind(site_filter.map(<[i32]>::to_vec))
		.bind(limit)
		.fetch_all(&db.pool)
		.await?;

	Ok(rows)
}

/// Strategy 3: vendor variants alone, cheapest rows first.
pub async fn by_vendors(
	db: &Db,
	vendor_variants: &[String],
	site_filter: Option<&[i32]>,
	exclude_generic_variation: bool,
	limit: i64,
) -> Result<Vec<CompetitorListing>> {
	if vendor_variants.is_empty() {
		return Ok(Vec::new());
	}

	let sql = format!(
		"\
SELECT {LISTING_COLUMNS}
FROM competitor_listings
WHERE lower(vendor) = ANY($1)
	AND ($2::int4[] IS NULL OR site_id = ANY($2))
	AND ($3 = false OR lower(variation) <> 'standard')
ORDER BY price ASC
LIMIT $4"
	);
	let rows = sqlx::query_as::<_, CompetitorListing>(sql.as_str())
		.bind(lowered(vendor_variants))
		.bind(site_filter.map(<[i32]>::to_vec))
		.bind(exclude_generic_variation)
		.bind(limit)
		.fetch_all(&db.pool)
		.await?;

	Ok(rows)
}

/// Strategy 4: extracted feature fields — exact kind, color/finish somewhere
/// in the listing text.
pub async fn by_features(
	db: &Db,
	kind: &str,
	color: &str,
	finish: &str,
	site_filter: Option<&[i32]>,
	limit: i64,
) -> Result<Vec<CompetitorListing>> {
	if kind.is_empty() && color.is_empty() && finish.is_empty() {
		return Ok(Vec::new());
	}

	let sql = format!(
		"\
SELECT {LISTING_COLUMNS}
FROM competitor_listings
WHERE (
		($1 <> '' AND lower(kind) = $1)
		OR ($2 <> '' AND (name ILIKE '%' || $2 || '%' OR variation ILIKE '%' || $2 || '%'))
		OR ($3 <> '' AND (name ILIKE '%' || $3 || '%' OR variation ILIKE '%' || $3 || '%'))
	)
	AND ($4::int4[] IS NULL OR site_id = ANY($4))
ORDER BY price ASC
LIMIT $5"
	);
	let rows = sqlx::query_as::<_, CompetitorListing>(sql.as_str())
		.bind(kind.trim().to_lowercase())
		.bind(color.trim().to_lowercase())
		.bind(finish.trim().to_lowercase())
		.bind(site_filter.map(<[i32]>::to_vec))
		.bind(limit)
		.fetch_all(&db.pool)
		.await?;

	Ok(rows)
}

/// Renders the boolean-mode query: each term required, prefix-expanded.
/// Terms are reduced to their alphanumeric core so user text cannot inject
/// tsquery syntax.
pub fn boolean_query(terms: &[String]) -> String {
	let mut parts = Vec::new();

	for term in terms {
		let cleaned: String =
			term.chars().filter(|ch| ch.is_alphanumeric()).collect::<String>().to_lowercase();

		if cleaned.is_empty() {
			continue;
		}

		parts.push(format!("{cleaned}:*"));
	}

	parts.join(" & ")
}

fn lowered(values: &[String]) -> Vec<String> {
	values.iter().map(|value| value.to_lowercase()).collect()
}

fn patterns(keywords: &[String]) -> Vec<String> {
	keywords.iter().map(|keyword| format!("%{keyword}%")).collect()
}

#[cfg(test)]
mod tests {
	use super::boolean_query;

	#[test]
	fn boolean_query_requires_and_prefix_expands_each_term() {
		let terms = vec!["coco".to_string(), "mademoiselle".to_string()];

		assert_eq!(boolean_query(&terms), "coco:* & mademoiselle:*");
	}

	#[test]
	fn boolean_query_strips_tsquery_syntax() {
		let terms = vec!["c&c!".to_string(), "(rose)".to_string()];

		assert_eq!(boolean_query(&terms), "cc:* & rose:*");
	}

	#[test]
	fn boolean_query_of_nothing_is_empty() {
		assert_eq!(boolean_query(&[]), "");
		assert_eq!(boolean_query(&["!!".to_string()]), "");
	}
}
