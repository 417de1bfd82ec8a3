//! Key normalization and value coercion
//!
//! The statistics tables name counties as free text ("Hennepin County") while
//! the boundary source uses the bare name ("Hennepin"). Everything is joined on
//! the canonical key produced here.

/// Suffix stripped from county names in the statistics tables
const COUNTY_SUFFIX: &str = " County";

/// Canonical county key: surrounding whitespace and any trailing " County"
/// removed.
///
/// Stripping repeats until the value is stable, so the function is idempotent.
pub fn canonical_county_key(raw: &str) -> String {
    let mut current = raw.trim();
    while let Some(rest) = current.strip_suffix(COUNTY_SUFFIX) {
        current = rest.trim();
    }
    current.to_string()
}

/// Parse a median income cell such as `"74,621"`.
///
/// Thousands separators are dropped before parsing. Anything that does not
/// parse to a finite number is treated as missing.
pub fn coerce_income(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    parse_finite(&cleaned)
}

/// Parse an unemployment rate cell such as `"3.2"`. Invalid entries are missing.
pub fn coerce_rate(raw: &str) -> Option<f64> {
    parse_finite(raw)
}

fn parse_finite(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
