//! Parsers for user-supplied filter values
//!
//! These run once at startup; a malformed value is reported with usage
//! before any crawling begins.

use crate::ConfigError;

/// Parses a byte-size filter value like `500`, `64KB`, `2MB` or `1GB`
///
/// Bare numbers are bytes; suffixes are binary multiples. Matching is
/// case-insensitive.
pub fn parse_size(value: &str) -> Result<u64, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::InvalidSize("empty value".to_string()));
    }

    let upper = value.to_ascii_uppercase();
    let (digits, multiplier) = if let Some(d) = upper.strip_suffix("GB") {
        (d, 1024 * 1024 * 1024)
    } else if let Some(d) = upper.strip_suffix("MB") {
        (d, 1024 * 1024)
    } else if let Some(d) = upper.strip_suffix("KB") {
        (d, 1024)
    } else if let Some(d) = upper.strip_suffix('B') {
        (d, 1)
    } else {
        (upper.as_str(), 1)
    };

    let number: u64 = digits
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidSize(value.to_string()))?;

    number
        .checked_mul(multiplier)
        .ok_or_else(|| ConfigError::InvalidSize(value.to_string()))
}

/// Parses a comma-separated image type allow-list like `png,jpg,gif`
///
/// Each entry must name a known image format extension. Entries are
/// normalized to the format's canonical extension set, so `jpg` also
/// admits `jpeg` content.
pub fn parse_types(value: &str) -> Result<Vec<String>, ConfigError> {
    let mut types = Vec::new();

    for token in value.split(',') {
        let token = token.trim().to_ascii_lowercase();
        if token.is_empty() {
            continue;
        }

        let format = image::ImageFormat::from_extension(&token)
            .ok_or_else(|| ConfigError::InvalidType(token.clone()))?;

        for ext in format.extensions_str() {
            let ext = ext.to_string();
            if !types.contains(&ext) {
                types.push(ext);
            }
        }
    }

    if types.is_empty() {
        return Err(ConfigError::InvalidType("empty type list".to_string()));
    }

    Ok(types)
}
