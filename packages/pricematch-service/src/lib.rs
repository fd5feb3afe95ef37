pub mod search;
pub mod time_serde;

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

use pricematch_config::Config;
use pricematch_storage::{
	cache as cache_store, db::Db, listings,
	models::{CompetitorListing, FulltextHit},
	vendors,
};

pub use search::{
	ComponentScores, MatchLevel, PriceInput, ProductQuery, ScoredCandidate, SearchRequest,
	SearchResponse,
};

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}

impl From<sqlx::Error> for ServiceError {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<pricematch_storage::Error> for ServiceError {
	fn from(err: pricematch_storage::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

/// Read-only access to the competitor listing store: the four retrieval
/// strategies plus the vendor dictionary source. Injected so tests can
/// substitute counting doubles.
pub trait ListingStore
where
	Self: Send + Sync,
{
	fn by_vendor_and_keywords<'a>(
		&'a self,
		vendor_variants: &'a [String],
		keywords: &'a [String],
		site_filter: Option<&'a [i32]>,
		exclude_generic_variation: bool,
		limit: i64,
	) -> BoxFuture<'a, ServiceResult<Vec<CompetitorListing>>>;

	fn by_fulltext<'a>(
		&'a self,
		terms: &'a [String],
		site_filter: Option<&'a [i32]>,
		limit: i64,
	) -> BoxFuture<'a, ServiceResult<Vec<FulltextHit>>>;

	fn by_vendors<'a>(
		&'a self,
		vendor_variants: &'a [String],
		site_filter: Option<&'a [i32]>,
		exclude_generic_variation: bool,
		limit: i64,
	) -> BoxFuture<'a, ServiceResult<Vec<CompetitorListing>>>;

	fn by_features<'a>(
		&'a self,
		kind: &'a str,
		color: &'a str,
		finish: &'a str,
		site_filter: Option<&'a [i32]>,
		limit: i64,
	) -> BoxFuture<'a, ServiceResult<Vec<CompetitorListing>>>;

	fn distinct_vendors<'a>(&'a self) -> BoxFuture<'a, ServiceResult<Vec<String>>>;
}

/// TTL key-value cache with atomic get/put. No request coalescing: concurrent
/// identical searches may both compute, which is acceptable because the
/// pipeline is deterministic for a fixed store snapshot.
pub trait CacheStore
where
	Self: Send + Sync,
{
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, ServiceResult<Option<Value>>>;

	fn put<'a>(&'a self, key: &'a str, value: Value, ttl_secs: i64)
	-> BoxFuture<'a, ServiceResult<()>>;
}

#[derive(Clone)]
pub struct Stores {
	pub listings: Arc<dyn ListingStore>,
	pub cache: Arc<dyn CacheStore>,
}
impl Stores {
	pub fn new(listings: Arc<dyn ListingStore>, cache: Arc<dyn CacheStore>) -> Self {
		Self { listings, cache }
	}

	pub fn postgres(db: Db) -> Self {
		let db = Arc::new(db);

		Self {
			listings: Arc::new(SqlListingStore { db: db.clone() }),
			cache: Arc::new(SqlCacheStore { db }),
		}
	}
}

pub struct MatchService {
	pub cfg: Config,
	pub stores: Stores,
}
impl MatchService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, stores: Stores::postgres(db) }
	}

	pub fn with_stores(cfg: Config, stores: Stores) -> Self {
		Self { cfg, stores }
	}
}

struct SqlListingStore {
	db: Arc<Db>,
}
impl ListingStore for SqlListingStore {
	fn by_vendor_and_keywords<'a>(
		&'a self,
		vendor_variants: &'a [String],
		keywords: &'a [String],
		site_filter: Option<&'a [i32]>,
		exclude_generic_variation: bool,
		limit: i64,
	) -> BoxFuture<'a, ServiceResult<Vec<CompetitorListing>>> {
		Box::pin(async move {
			Ok(listings::by_vendor_and_keywords(
				&self.db,
				vendor_variants,
				keywords,
				site_filter,
				exclude_generic_variation,
				limit,
			)
			.await?)
		})
	}

	fn by_fulltext<'a>(
		&'a self,
		terms: &'a [String],
		site_filter: Option<&'a [i32]>,
		limit: i64,
	) -> BoxFuture<'a, ServiceResult<Vec<FulltextHit>>> {
		Box::pin(async move { Ok(listings::by_fulltext(&self.db, terms, site_filter, limit).await?) })
	}

	fn by_vendors<'a>(
		&'a self,
		vendor_variants: &'a [String],
		site_filter: Option<&'a [i32]>,
		exclude_generic_variation: bool,
		limit: i64,
	) -> BoxFuture<'a, ServiceResult<Vec<CompetitorListing>>> {
		Box::pin(async move {
			Ok(listings::by_vendors(
				&self.db,
				vendor_variants,
				site_filter,
				exclude_generic_variation,
				limit,
			)
			.await?)
		})
	}

	fn by_features<'a>(
		&'a self,
		kind: &'a str,
		color: &'a str,
		finish: &'a str,
		site_filter: Option<&'a [i32]>,
		limit: i64,
	) -> BoxFuture<'a, ServiceResult<Vec<CompetitorListing>>> {
		Box::pin(async move {
			Ok(listings::by_features(&self.db, kind, color, finish, site_filter, limit).await?)
		})
	}

	fn distinct_vendors<'a>(&'a self) -> BoxFuture<'a, ServiceResult<Vec<String>>> {
		Box::pin(async move { Ok(vendors::distinct_vendors(&self.db).await?) })
	}
}

struct SqlCacheStore {
	db: Arc<Db>,
}
impl CacheStore for SqlCacheStore {
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, ServiceResult<Option<Value>>> {
		Box::pin(async move { Ok(cache_store::get(&self.db, key).await?) })
	}

	fn put<'a>(
		&'a self,
		key: &'a str,
		value: Value,
		ttl_secs: i64,
	) -> BoxFuture<'a, ServiceResult<()>> {
		Box::pin(async move { Ok(cache_store::put(&self.db, key, &value, ttl_secs).await?) })
	}
}
