use std::future::Future;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{CacheStore, ServiceError, ServiceResult, search::ProductQuery};
use pricematch_config::Config;

const SEARCH_CACHE_SCHEMA_VERSION: i32 = 1;

pub const VENDOR_DICTIONARY_CACHE_KEY: &str = "pricematch/vendor_dictionary/v1";

/// The search cache key covers everything that changes the ranked output:
/// the normalized query, the reference price, the site filter, and the
/// active scoring/filtering configuration.
pub fn search_cache_key(
	cfg: &Config,
	query: &ProductQuery,
	site_filter: Option<&[i32]>,
) -> ServiceResult<String> {
	let payload = serde_json::json!({
		"kind": "search",
		"schema_version": SEARCH_CACHE_SCHEMA_VERSION,
		"normalized_title": query.normalized_title,
		"reference_price": query.reference_price,
		"site_filter": site_filter,
		"profile": cfg.matching.profile,
		"filter_policy": cfg.filter.policy,
		"threshold": cfg.filter.threshold,
		"variation_filter": cfg.retrieval.variation_filter,
	});

	hash_cache_key(&payload)
}

pub fn decode_json<T>(value: Value, label: &str) -> ServiceResult<T>
where
	T: DeserializeOwned,
{
	serde_json::from_value(value)
		.map_err(|err| ServiceError::Storage { message: format!("Invalid {label} value: {err}") })
}

/// Cached value when present and unexpired, else the computed value, stored
/// best-effort. Cache failures degrade to a recompute, never to an error;
/// only `compute` itself can fail. The flag reports whether the cache served
/// the value.
pub async fn remember<T, Fut>(
	cache: &dyn CacheStore,
	enabled: bool,
	key: &str,
	ttl_secs: i64,
	compute: Fut,
) -> ServiceResult<(T, bool)>
where
	T: Serialize + DeserializeOwned,
	Fut: Future<Output = ServiceResult<T>>,
{
	if enabled {
		match cache.get(key).await {
			Ok(Some(value)) => match decode_json(value, "cache entry") {
				Ok(decoded) => return Ok((decoded, true)),
				Err(err) => {
					tracing::warn!(key, error = %err, "Discarding undecodable cache entry.");
				},
			},
			Ok(None) => {},
			Err(err) => {
				tracing::warn!(key, error = %err, "Cache read failed; recomputing.");
			},
		}
	}

	let computed = compute.await?;

	if enabled {
		match serde_json::to_value(&computed) {
			Ok(value) =>
				if let Err(err) = cache.put(key, value, ttl_secs).await {
					tracing::warn!(key, error = %err, "Cache write failed; result not stored.");
				},
			Err(err) => {
				tracing::warn!(key, error = %err, "Failed to encode cache payload.");
			},
		}
	}

	Ok((computed, false))
}

fn hash_cache_key(payload: &Value) -> ServiceResult<String> {
	let raw = serde_json::to_vec(payload).map_err(|err| ServiceError::Storage {
		message: format!("Failed to encode cache key payload: {err}"),
	})?;

	Ok(blake3::hash(&raw).to_hex().to_string())
}

#[cfg(test)]
mod tests {
	use super::search_cache_key;
	use crate::search::ProductQuery;

	fn config_toml(policy: &str) -> pricematch_config::Config {
		let raw = format!(
			r#"
[service]
http_bind = "127.0.0.1:8080"
log_level = "info"

[storage.postgres]
dsn            = "postgres://localhost/pricematch"
pool_max_conns = 1

[matching]
profile = "balanced"

[matching.profiles.balanced]
name      = 0.35
kind      = 0.25
variation = 0.20
vendor    = 0.15
volume    = 0.05

[retrieval]

[filter]
policy = "{policy}"

[cache]
enabled = true
"#
		);

		toml::from_str(raw.as_str()).expect("Test config must parse.")
	}

	#[test]
	fn key_depends_on_query_and_configuration() {
		let cfg = config_toml("absolute");
		let mut query = ProductQuery {
			normalized_title: "chanel coco mademoiselle".to_string(),
			reference_price: Some(120.0),
			..ProductQuery::default()
		};
		let base = search_cache_key(&cfg, &query, None).expect("Key must hash.");

		query.reference_price = Some(99.0);

		let other_price = search_cache_key(&cfg, &query, None).expect("Key must hash.");

		assert_ne!(base, other_price);

		query.reference_price = Some(120.0);

		let same_again = search_cache_key(&cfg, &query, None).expect("Key must hash.");

		assert_eq!(base, same_again);

		let with_sites = search_cache_key(&cfg, &query, Some(&[1, 2])).expect("Key must hash.");

		assert_ne!(base, with_sites);

		let relative = config_toml("relative");
		let other_policy = search_cache_key(&relative, &query, None).expect("Key must hash.");

		assert_ne!(base, other_policy);
	}
}
