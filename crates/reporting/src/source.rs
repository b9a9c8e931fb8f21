//! Traffic source normalization.

/// Bucket used when neither column names a source.
pub const OTHER_SOURCE: &str = "other";

/// `traffic_source` value whose real origin lives in `utm_source`.
pub const AD_TRAFFIC: &str = "ad";

/// Resolve the reporting source for one row: paid traffic is keyed by its
/// UTM source, everything else by its traffic source. Never returns an
/// empty key.
pub fn normalize_source(traffic_source: Option<&str>, utm_source: Option<&str>) -> String {
    let chosen = if traffic_source == Some(AD_TRAFFIC) {
        utm_source
    } else {
        traffic_source
    };
    chosen.unwrap_or(OTHER_SOURCE).to_string()
}
