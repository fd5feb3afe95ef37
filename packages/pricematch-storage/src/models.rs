use time::OffsetDateTime;

/// One scraped competitor listing. Read-only to the matching engine.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct CompetitorListing {
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
	pub updated_at: OffsetDateTime,
}

/// A full-text hit: the listing plus the store's raw relevance score, kept
/// for the adaptive filter bracket.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct FulltextHit {
	#[sqlx(flatten)]
	pub listing: CompetitorListing,
	pub relevance: f32,
}
