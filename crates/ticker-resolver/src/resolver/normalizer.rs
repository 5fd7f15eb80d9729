//! Company-name normalization.
//!
//! Reduces a published listing name to the form used for equality,
//! substring and similarity comparisons.

/// Status markers that may lead a listing name: risk warnings (`*ST`, `ST`)
/// and first-day markers (`N` new listing, `C` recently listed).
/// At most one is stripped.
const STATUS_PREFIXES: [&str; 4] = ["*ST", "ST", "N", "C"];

/// Legal-entity suffixes, longest first. Only the first match is stripped.
const LEGAL_SUFFIXES: [&str; 10] = [
    "股份有限公司",
    "集团有限公司",
    "科技有限公司",
    "控股有限公司",
    "有限公司",
    "集团",
    "控股",
    "科技",
    "股份",
    "公司",
];

/// Maps a display name to its canonical comparison form.
///
/// A single pass strips one status prefix and one legal suffix, so
/// `"某某股份公司"` becomes `"某某股份"`, not `"某某"`.
///
/// ```
/// use ticker_resolver::resolver::normalize;
///
/// assert_eq!(normalize("*ST万科"), "万科");
/// assert_eq!(normalize("腾讯控股"), "腾讯");
/// assert_eq!(normalize("  中国平安 "), "中国平安");
/// ```
pub fn normalize(display_name: &str) -> String {
    let unprefixed = STATUS_PREFIXES
        .iter()
        .find_map(|prefix| display_name.strip_prefix(prefix))
        .unwrap_or(display_name)
        .trim();

    LEGAL_SUFFIXES
        .iter()
        .find_map(|suffix| unprefixed.strip_suffix(suffix))
        .unwrap_or(unprefixed)
        .trim()
        .to_string()
}
