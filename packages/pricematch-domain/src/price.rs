use serde::{Deserialize, Serialize};

/// How a candidate price sits relative to the reference price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceStatus {
	MuchCheaper,
	Cheaper,
	Same,
	SlightlyHigher,
	MuchHigher,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceComparison {
	pub difference: f64,
	pub difference_percent: f64,
	pub status: PriceStatus,
}

/// Parses a scraped price string: everything except digits, separators and a
/// sign is stripped, commas become decimal points, and when several points
/// remain only the last one separates decimals. Unparseable input is 0.0.
pub fn clean_price(raw: &str) -> f64 {
	let kept: String =
		raw.chars().filter(|ch| ch.is_ascii_digit() || matches!(ch, ',' | '.' | '-')).collect();
	let kept = kept.replace(',', ".");
	let dots = kept.matches('.').count();
	let cleaned = if dots > 1 {
		let Some(last) = kept.rfind('.') else { return 0.0 };
		let (head, tail) = kept.split_at(last);

		head.replace('.', "") + tail
	} else {
		kept
	};

	cleaned.parse::<f64>().unwrap_or(0.0)
}

/// Classifies a candidate price against the reference. Pure and monotonic in
/// the candidate price for a fixed reference: lowering the candidate price
/// never moves the status toward the "higher" buckets.
pub fn compare(reference: f64, candidate: f64) -> PriceComparison {
	let difference = reference - candidate;
	let difference_percent = if reference == 0.0 { 0.0 } else { difference / reference * 100.0 };
	let status = if candidate < 0.9 * reference {
		PriceStatus::MuchCheaper
	} else if candidate < reference {
		PriceStatus::Cheaper
	} else if candidate == reference {
		PriceStatus::Same
	} else if candidate <= 1.1 * reference {
		PriceStatus::SlightlyHigher
	} else {
		PriceStatus::MuchHigher
	};

	PriceComparison { difference, difference_percent, status }
}
