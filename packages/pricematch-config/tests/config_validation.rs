use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use pricematch_config::{Config, Error};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_value() -> Value {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("pricematch_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load(value: &Value) -> Result<Config, Error> {
	let payload = toml::to_string(value).expect("Failed to render template config.");
	let path = write_temp_config(payload);
	let result = pricematch_config::load(&path);

	let _ = fs::remove_file(&path);

	result
}

fn set(value: &mut Value, path: &[&str], new_value: Value) {
	let mut current = value;

	for key in &path[..path.len() - 1] {
		current = current
			.as_table_mut()
			.and_then(|table| table.get_mut(*key))
			.expect("Template config must include the path.");
	}

	current
		.as_table_mut()
		.expect("Template config leaf parent must be a table.")
		.insert(path[path.len() - 1].to_string(), new_value);
}

fn validation_message(result: Result<Config, Error>) -> String {
	match result {
		Err(Error::Validation { message }) => message,
		other => panic!("Expected a validation error, got {other:?}."),
	}
}

#[test]
fn template_config_loads() {
	let cfg = load(&sample_value()).expect("Template config must validate.");

	assert_eq!(cfg.matching.profile, "balanced");
	assert_eq!(cfg.filter.policy, "absolute");
	assert_eq!(cfg.filter.threshold, 0.7);
	assert_eq!(cfg.retrieval.strategy_row_limit, 100);
	assert_eq!(cfg.cache.results_ttl_secs, 3_600);
	assert_eq!(cfg.cache.vendors_ttl_secs, 86_400);

	let profile =
		cfg.matching.profiles.get("balanced").expect("Balanced profile must be present.");

	assert_eq!(profile.name, 0.35);
	assert_eq!(profile.exact_bonus, 0.12);
	assert_eq!(profile.empty_field_floor, 0.3);
}

#[test]
fn unknown_profile_is_rejected() {
	let mut value = sample_value();

	set(&mut value, &["matching", "profile"], Value::String("aggressive".to_string()));

	let message = validation_message(load(&value));

	assert_eq!(message, "matching.profile \"aggressive\" has no entry under matching.profiles.");
}

#[test]
fn weights_must_sum_to_one() {
	let mut value = sample_value();

	set(&mut value, &["matching", "profiles", "balanced", "name"], Value::Float(0.9));

	let message = validation_message(load(&value));

	assert_eq!(message, "matching.profiles.balanced component weights must sum to 1.0.");
}

#[test]
fn weight_out_of_range_is_rejected() {
	let mut value = sample_value();

	set(&mut value, &["matching", "profiles", "balanced", "vendor"], Value::Float(1.5));

	let message = validation_message(load(&value));

	assert_eq!(message, "matching.profiles.balanced.vendor must be in the range 0.0-1.0.");
}

#[test]
fn unknown_filter_policy_is_rejected() {
	let mut value = sample_value();

	set(&mut value, &["filter", "policy"], Value::String("learned".to_string()));

	let message = validation_message(load(&value));

	assert_eq!(message, "filter.policy must be one of absolute, relative, or adaptive.");
}

#[test]
fn policy_is_case_normalized_before_validation() {
	let mut value = sample_value();

	set(&mut value, &["filter", "policy"], Value::String("Relative".to_string()));

	let cfg = load(&value).expect("Mixed-case policy must normalize and validate.");

	assert_eq!(cfg.filter.policy, "relative");
}

#[test]
fn unknown_variation_filter_is_rejected() {
	let mut value = sample_value();

	set(&mut value, &["retrieval", "variation_filter"], Value::String("always".to_string()));

	let message = validation_message(load(&value));

	assert_eq!(message, "retrieval.variation_filter must be one of off or exclude_generic.");
}

#[test]
fn threshold_out_of_range_is_rejected() {
	let mut value = sample_value();

	set(&mut value, &["filter", "threshold"], Value::Float(1.2));

	let message = validation_message(load(&value));

	assert_eq!(message, "filter.threshold must be in the range 0.0-1.0.");
}

#[test]
fn zero_ttl_is_rejected() {
	let mut value = sample_value();

	set(&mut value, &["cache", "results_ttl_secs"], Value::Integer(0));

	let message = validation_message(load(&value));

	assert_eq!(message, "cache.results_ttl_secs must be greater than zero.");
}

#[test]
fn zero_row_limit_is_rejected() {
	let mut value = sample_value();

	set(&mut value, &["retrieval", "strategy_row_limit"], Value::Integer(0));

	let message = validation_message(load(&value));

	assert_eq!(message, "retrieval.strategy_row_limit must be greater than zero.");
}

#[test]
fn missing_config_file_reports_read_error() {
	let result = pricematch_config::load(&PathBuf::from("/nonexistent/pricematch.toml"));

	assert!(matches!(result, Err(Error::ReadConfig { .. })));
}
