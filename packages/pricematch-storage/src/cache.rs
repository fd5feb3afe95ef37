use serde_json::Value;

use crate::{Result, db::Db};

/// Unexpired payload for the key, if any.
pub async fn get(db: &Db, key: &str) -> Result<Option<Value>> {
	let payload = sqlx::query_scalar::<_, Value>(
		"\
SELECT payload
FROM search_cache
WHERE cache_key = $1
	AND expires_at > now()",
	)
	.bind(key)
	.fetch_optional(&db.pool)
	.await?;

	Ok(payload)
}

/// Upserts the payload with a fresh expiry. Last writer wins; acceptable
/// because identical keys carry identical deterministic payloads.
pub async fn put(db: &Db, key: &str, payload: &Value, ttl_secs: i64) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO search_cache (cache_key, payload, expires_at)
VALUES ($1, $2, now() + make_interval(secs => $3))
ON CONFLICT (cache_key) DO UPDATE
SET
	payload = EXCLUDED.payload,
	expires_at = EXCLUDED.expires_at",
	)
	.bind(key)
	.bind(payload)
	.bind(ttl_secs as f64)
	.execute(&db.pool)
	.await?;

	Ok(())
}

/// Drops expired rows; staleness is otherwise bounded only by the TTL.
pub async fn purge_expired(db: &Db) -> Result<u64> {
	let result =
		sqlx::query("DELETE FROM search_cache WHERE expires_at <= now()").execute(&db.pool).await?;

	Ok(result.rows_affected())
}
