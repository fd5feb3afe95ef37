use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub matching: Matching,
	pub retrieval: Retrieval,
	pub filter: Filter,
	pub cache: Cache,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Matching {
	/// Name of the active entry in `profiles`.
	pub profile: String,
	pub profiles: HashMap<String, WeightProfile>,
}

/// One named scorer weight set. Component weights must sum to 1.
#[derive(Debug, Clone, Deserialize)]
pub struct WeightProfile {
	pub name: f64,
	pub kind: f64,
	pub variation: f64,
	pub vendor: f64,
	pub volume: f64,
	#[serde(default = "default_exact_bonus")]
	pub exact_bonus: f64,
	#[serde(default = "default_exact_bonus_cap")]
	pub exact_bonus_cap: f64,
	#[serde(default = "default_breadth_bonus")]
	pub breadth_bonus: f64,
	#[serde(default = "default_breadth_floor")]
	pub breadth_floor: f64,
	#[serde(default = "default_empty_field_floor")]
	pub empty_field_floor: f64,
}

#[derive(Debug, Deserialize)]
pub struct Retrieval {
	#[serde(default = "default_strategy_row_limit")]
	pub strategy_row_limit: u32,
	#[serde(default = "default_max_candidates")]
	pub max_candidates: u32,
	/// Run the full-text strategy when fewer candidates are accumulated.
	#[serde(default = "default_fulltext_below")]
	pub fulltext_below: u32,
	/// Run the vendor-only and feature strategies when fewer are accumulated.
	#[serde(default = "default_fallback_below")]
	pub fallback_below: u32,
	#[serde(default = "default_max_fulltext_terms")]
	pub max_fulltext_terms: u32,
	#[serde(default = "default_variation_filter")]
	pub variation_filter: String,
}

#[derive(Debug, Deserialize)]
pub struct Filter {
	/// One of `absolute`, `relative`, `adaptive`.
	pub policy: String,
	#[serde(default = "default_threshold")]
	pub threshold: f64,
	#[serde(default = "default_relative_best_ratio")]
	pub relative_best_ratio: f64,
	#[serde(default = "default_adaptive_keyword_ratio")]
	pub adaptive_keyword_ratio: f64,
}

#[derive(Debug, Deserialize)]
pub struct Cache {
	pub enabled: bool,
	#[serde(default = "default_results_ttl_secs")]
	pub results_ttl_secs: i64,
	#[serde(default = "default_vendors_ttl_secs")]
	pub vendors_ttl_secs: i64,
}

fn default_exact_bonus() -> f64 {
	0.12
}

fn default_exact_bonus_cap() -> f64 {
	0.15
}

fn default_breadth_bonus() -> f64 {
	0.06
}

fn default_breadth_floor() -> f64 {
	0.75
}

fn default_empty_field_floor() -> f64 {
	0.3
}

fn default_strategy_row_limit() -> u32 {
	100
}

fn default_max_candidates() -> u32 {
	150
}

fn default_fulltext_below() -> u32 {
	10
}

fn default_fallback_below() -> u32 {
	5
}

fn default_max_fulltext_terms() -> u32 {
	5
}

fn default_variation_filter() -> String {
	"off".to_string()
}

fn default_threshold() -> f64 {
	0.7
}

fn default_relative_best_ratio() -> f64 {
	0.6
}

fn default_adaptive_keyword_ratio() -> f64 {
	0.5
}

fn default_results_ttl_secs() -> i64 {
	3_600
}

fn default_vendors_ttl_secs() -> i64 {
	86_400
}
