use pricematch_config::Postgres;
use pricematch_storage::{cache, db::Db, listings, vendors};
use pricematch_testkit::TestDatabase;

async fn bootstrap(test_db: &TestDatabase) -> Db {
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	db
}

async fn seed(db: &Db) {
	let rows: [(&str, &str, &str, &str, f64, i32); 5] = [
		("Coco Mademoiselle Eau de Parfum 50ml", "Chanel", "eau de parfum", "", 115.0, 1),
		("Coco Mademoiselle Eau de Parfum 100ml", "CHANEL", "eau de parfum", "", 155.0, 2),
		("Rouge Allure Velvet", "Chanel", "lipstick", "Standard", 38.0, 1),
		("J'adore Eau de Parfum 50ml", "Dior", "eau de parfum", "", 109.0, 1),
		("Terracotta Bronzing Powder", "Guerlain", "powder", "Naturel", 52.0, 3),
	];

	for (idx, (name, vendor, kind, variation, price, site_id)) in rows.into_iter().enumerate() {
		sqlx::query(
			"\
INSERT INTO competitor_listings (name, vendor, kind, variation, price, url, site_id, site_name)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
		)
		.bind(name)
		.bind(vendor)
		.bind(kind)
		.bind(variation)
		.bind(price)
		.bind(format!("https://competitor.example/{idx}"))
		.bind(site_id)
		.bind(format!("site-{site_id}"))
		.execute(&db.pool)
		.await
		.expect("Failed to seed listing.");
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PRICEMATCH_PG_DSN to run."]
async fn vendor_and_keyword_strategy_orders_by_price() {
	let Some(base_dsn) = pricematch_testkit::env_dsn() else {
		eprintln!("Skipping vendor_and_keyword_strategy_orders_by_price; set PRICEMATCH_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;

	seed(&db).await;

	let variants = vec!["Chanel".to_string(), "CHANEL".to_string()];
	let keywords = vec!["mademoiselle".to_string()];
	let rows = listings::by_vendor_and_keywords(&db, &variants, &keywords, None, false, 100)
		.await
		.expect("Strategy 1 query failed.");

	assert_eq!(rows.len(), 2);
	assert!(rows[0].price <= rows[1].price);
	assert!(rows.iter().all(|row| row.vendor.to_lowercase() == "chanel"));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PRICEMATCH_PG_DSN to run."]
async fn site_filter_restricts_every_strategy() {
	let Some(base_dsn) = pricematch_testkit::env_dsn() else {
		eprintln!("Skipping site_filter_restricts_every_strategy; set PRICEMATCH_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;

	seed(&db).await;

	let variants = vec!["chanel".to_string()];
	let sites = [2];
	let rows = listings::by_vendors(&db, &variants, Some(&sites), false, 100)
		.await
		.expect("Strategy 3 query failed.");

	assert_eq!(rows.len(), 1);
	assert_eq!(rows[0].site_id, 2);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PRICEMATCH_PG_DSN to run."]
async fn generic_variation_filter_drops_standard_rows() {
	let Some(base_dsn) = pricematch_testkit::env_dsn() else {
		eprintln!("Skipping generic_variation_filter_drops_standard_rows; set PRICEMATCH_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;

	seed(&db).await;

	let variants = vec!["chanel".to_string()];
	let all = listings::by_vendors(&db, &variants, None, false, 100)
		.await
		.expect("Strategy 3 query failed.");
	let specific = listings::by_vendors(&db, &variants, None, true, 100)
		.await
		.expect("Strategy 3 query failed.");

	assert_eq!(all.len(), 3);
	assert_eq!(specific.len(), 2);
	assert!(specific.iter().all(|row| row.variation.to_lowercase() != "standard"));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PRICEMATCH_PG_DSN to run."]
async fn fulltext_strategy_requires_every_term() {
	let Some(base_dsn) = pricematch_testkit::env_dsn() else {
		eprintln!("Skipping fulltext_strategy_requires_every_term; set PRICEMATCH_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;

	seed(&db).await;

	let hits = listings::by_fulltext(
		&db,
		&["coco".to_string(), "mademoiselle".to_string()],
		None,
		100,
	)
	.await
	.expect("Full-text query failed.");

	assert_eq!(hits.len(), 2);
	assert!(hits.iter().all(|hit| hit.relevance > 0.0));
	assert!(hits.iter().all(|hit| hit.listing.name.contains("Coco Mademoiselle")));

	// Prefix expansion: a truncated term still matches.
	let hits = listings::by_fulltext(&db, &["mademois".to_string()], None, 100)
		.await
		.expect("Full-text prefix query failed.");

	assert_eq!(hits.len(), 2);

	// A term found nowhere is required, so nothing comes back.
	let hits = listings::by_fulltext(
		&db,
		&["coco".to_string(), "zzzznope".to_string()],
		None,
		100,
	)
	.await
	.expect("Full-text miss query failed.");

	assert!(hits.is_empty());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PRICEMATCH_PG_DSN to run."]
async fn feature_strategy_matches_kind_exactly() {
	let Some(base_dsn) = pricematch_testkit::env_dsn() else {
		eprintln!("Skipping feature_strategy_matches_kind_exactly; set PRICEMATCH_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;

	seed(&db).await;

	let rows = listings::by_features(&db, "eau de parfum", "", "", None, 100)
		.await
		.expect("Feature query failed.");

	assert_eq!(rows.len(), 3);
	assert!(rows.iter().all(|row| row.kind == "eau de parfum"));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set PRICEMATCH_PG_DSN to run."]
async fn distinct_vendors_and_cache_round_trip() {
	let Some(base_dsn) = pricematch_testkit::env_dsn() else {
		eprintln!("Skipping distinct_vendors_and_cache_round_trip; set PRICEMATCH_PG_DSN.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrap(&test_db).await;

	seed(&db).await;

	let vendors = vendors::distinct_vendors(&db).await.expect("Vendor query failed.");

	// Collation order is locale-dependent; assert membership, not order.
	assert_eq!(vendors.len(), 4);

	for vendor in ["CHANEL", "Chanel", "Dior", "Guerlain"] {
		assert!(vendors.contains(&vendor.to_string()), "missing vendor {vendor}");
	}

	let payload = serde_json::json!({"items": [1, 2, 3]});

	cache::put(&db, "test-key", &payload, 3_600).await.expect("Cache put failed.");

	let cached = cache::get(&db, "test-key").await.expect("Cache get failed.");

	assert_eq!(cached, Some(payload.clone()));

	// An expired entry is invisible to get and removed by purge.
	cache::put(&db, "expired-key", &payload, -1).await.expect("Cache put failed.");

	assert_eq!(cache::get(&db, "expired-key").await.expect("Cache get failed."), None);

	let purged = cache::purge_expired(&db).await.expect("Cache purge failed.");

	assert!(purged >= 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
