use crate::{Result, db::Db};

/// Distinct vendor names across the whole listing store. Feeds the vendor
/// dictionary; callers cache the result behind the 24-hour TTL.
pub async fn distinct_vendors(db: &Db) -> Result<Vec<String>> {
	let rows = sqlx::query_scalar::<_, String>(
		"\
SELECT DISTINCT vendor
FROM competitor_listings
WHERE vendor <> ''
ORDER BY vendor",
	)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}
