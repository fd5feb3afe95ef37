mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Cache, Config, Filter, Matching, Postgres, Retrieval, Service, Storage, WeightProfile,
};

use std::{fs, path::Path};

pub const FILTER_POLICIES: [&str; 3] = ["absolute", "relative", "adaptive"];
pub const VARIATION_FILTERS: [&str; 2] = ["off", "exclude_generic"];

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	let Some(profile) = cfg.matching.profiles.get(&cfg.matching.profile) else {
		return Err(Error::Validation {
			message: format!(
				"matching.profile {:?} has no entry under matching.profiles.",
				cfg.matching.profile
			),
		});
	};

	for (label, weight) in [
		("name", profile.name),
		("kind", profile.kind),
		("variation", profile.variation),
		("vendor", profile.vendor),
		("volume", profile.volume),
	] {
		if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
			return Err(Error::Validation {
				message: format!(
					"matching.profiles.{}.{label} must be in the range 0.0-1.0.",
					cfg.matching.profile
				),
			});
		}
	}

	let weight_sum =
		profile.name + profile.kind + profile.variation + profile.vendor + profile.volume;

	if (weight_sum - 1.0).abs() > 0.01 {
		return Err(Error::Validation {
			message: format!(
				"matching.profiles.{} component weights must sum to 1.0.",
				cfg.matching.profile
			),
		});
	}

	for (label, value) in [
		("exact_bonus", profile.exact_bonus),
		("exact_bonus_cap", profile.exact_bonus_cap),
		("breadth_bonus", profile.breadth_bonus),
		("breadth_floor", profile.breadth_floor),
		("empty_field_floor", profile.empty_field_floor),
	] {
		if !value.is_finite() || !(0.0..=1.0).contains(&value) {
			return Err(Error::Validation {
				message: format!(
					"matching.profiles.{}.{label} must be in the range 0.0-1.0.",
					cfg.matching.profile
				),
			});
		}
	}

	if cfg.retrieval.strategy_row_limit == 0 {
		return Err(Error::Validation {
			message: "retrieval.strategy_row_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.max_candidates == 0 {
		return Err(Error::Validation {
			message: "retrieval.max_candidates must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.max_fulltext_terms == 0 {
		return Err(Error::Validation {
			message: "retrieval.max_fulltext_terms must be greater than zero.".to_string(),
		});
	}
	if !VARIATION_FILTERS.contains(&cfg.retrieval.variation_filter.as_str()) {
		return Err(Error::Validation {
			message: "retrieval.variation_filter must be one of off or exclude_generic."
				.to_string(),
		});
	}
	if !FILTER_POLICIES.contains(&cfg.filter.policy.as_str()) {
		return Err(Error::Validation {
			message: "filter.policy must be one of absolute, relative, or adaptive.".to_string(),
		});
	}
	if !cfg.filter.threshold.is_finite() || !(0.0..=1.0).contains(&cfg.filter.threshold) {
		return Err(Error::Validation {
			message: "filter.threshold must be in the range 0.0-1.0.".to_string(),
		});
	}
	if !cfg.filter.relative_best_ratio.is_finite()
		|| !(0.0..=1.0).contains(&cfg.filter.relative_best_ratio)
	{
		return Err(Error::Validation {
			message: "filter.relative_best_ratio must be in the range 0.0-1.0.".to_string(),
		});
	}
	if !cfg.filter.adaptive_keyword_ratio.is_finite()
		|| !(0.0..=1.0).contains(&cfg.filter.adaptive_keyword_ratio)
	{
		return Err(Error::Validation {
			message: "filter.adaptive_keyword_ratio must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.cache.results_ttl_secs <= 0 {
		return Err(Error::Validation {
			message: "cache.results_ttl_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.cache.vendors_ttl_secs <= 0 {
		return Err(Error::Validation {
			message: "cache.vendors_ttl_secs must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.matching.profile = cfg.matching.profile.trim().to_string();
	cfg.filter.policy = cfg.filter.policy.trim().to_lowercase();
	cfg.retrieval.variation_filter = cfg.retrieval.variation_filter.trim().to_lowercase();
}
