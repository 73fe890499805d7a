//! Conversion of human-written release dates into compact anchor form.
//!
//! Patch headings carry the release date as `YYYYMMDD`, so the conversion
//! has to be reproducible: a date that cannot be parsed is an error, never a
//! silently substituted default.

use crate::error::{ReleaseNotesError, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static ORDINAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").expect("valid ordinal regex"));

/// Accepted layouts after ordinal suffixes and commas are removed. `%B`
/// also matches abbreviated month names when parsing.
const FORMATS: &[&str] = &[
    "%d %B %Y",
    "%B %d %Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%Y%m%d",
];

/// Parse a human date such as `1st January 2024` or `March 3, 2024`.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let cleaned = ORDINAL_SUFFIX.replace_all(input.trim(), "$1").replace(',', " ");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
        .ok_or_else(|| ReleaseNotesError::DateParse {
            input: input.to_string(),
        })
}

/// Convert a human date into `YYYYMMDD`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(convert_date("1st January 2024")?, "20240101");
/// ```
pub fn convert_date(input: &str) -> Result<String> {
    let date = parse_date(input)?;
    let compact = date.format("%Y%m%d").to_string();
    debug!(%input, %compact, "Converted date");
    Ok(compact)
}
