use crate::search::ProductQuery;
use pricematch_domain::{keywords, title, vendor};

/// Builds the immutable [`ProductQuery`] for one search: component
/// extraction, vendor resolution against the dictionary snapshot, keyword
/// extraction. Pure given a fixed dictionary.
pub fn build(
	raw_title: String,
	normalized_title: String,
	reference_price: Option<f64>,
	dictionary: &[String],
) -> ProductQuery {
	let components = title::extract(normalized_title.as_str());
	let resolved_vendor =
		vendor::resolve(components.vendor.as_str(), dictionary).unwrap_or_default();
	let vendor_fragment =
		Some(components.vendor.as_str()).filter(|fragment| !fragment.is_empty());
	let keywords = keywords::extract_keywords(normalized_title.as_str(), vendor_fragment);

	ProductQuery {
		raw_title,
		normalized_title,
		reference_price,
		vendor: resolved_vendor,
		product_name: components.name,
		kind: components.kind,
		variation: components.variation,
		color: components.color,
		finish: components.finish,
		volumes: components.volumes,
		capacities: components.capacities,
		keywords,
	}
}
