//! Item filtering and content validation
//!
//! Two pure checks live here. `evaluate_item` rejects items on static
//! attributes before any network fetch. `validate_content` checks the
//! downloaded payload: byte-size bounds on the raw length first, then a
//! header-only decode for type, orientation and pixel-dimension
//! constraints when any of those are configured.

use crate::api::Item;
use crate::config::FilterConfig;
use std::fmt;
use std::io::Cursor;

/// Orientation class of an image, derived from its pixel dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
    Square,
}

impl Orientation {
    pub fn classify(width: u32, height: u32) -> Self {
        if height > width {
            Orientation::Portrait
        } else if width > height {
            Orientation::Landscape
        } else {
            Orientation::Square
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Portrait => write!(f, "portrait"),
            Orientation::Landscape => write!(f, "landscape"),
            Orientation::Square => write!(f, "square"),
        }
    }
}

/// Why an item or payload was rejected
///
/// Rejections are terminal for the item and logged, never surfaced as
/// errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    Meta,
    Nsfw,
    Score(i64),
    ByteSize(usize),
    Undecodable,
    Type(String),
    Orientation(Orientation),
    Width(u32),
    Height(u32),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Meta => write!(f, "meta item"),
            RejectReason::Nsfw => write!(f, "NSFW"),
            RejectReason::Score(score) => write!(f, "score {} below minimum", score),
            RejectReason::ByteSize(size) => write!(f, "byte size {} outside bounds", size),
            RejectReason::Undecodable => write!(f, "could not decode image header"),
            RejectReason::Type(t) => write!(f, "type {} not allowed", t),
            RejectReason::Orientation(o) => write!(f, "{} orientation disabled", o),
            RejectReason::Width(w) => write!(f, "width {} outside bounds", w),
            RejectReason::Height(h) => write!(f, "height {} outside bounds", h),
        }
    }
}

/// Checks an item's static attributes against the configured filters
///
/// Returns the first matching rejection, or `None` when the item passes.
pub fn evaluate_item(item: &Item, config: &FilterConfig) -> Option<RejectReason> {
    if item.is_meta {
        return Some(RejectReason::Meta);
    }
    if item.nsfw && !config.nsfw {
        return Some(RejectReason::Nsfw);
    }
    if let Some(min_score) = config.min_score {
        if item.score < min_score {
            return Some(RejectReason::Score(item.score));
        }
    }
    None
}

/// Validates a downloaded payload against the configured constraints
///
/// Byte-size bounds are checked on the raw payload length regardless of
/// whether the payload decodes. The header decode only happens when a
/// type, orientation or dimension constraint is configured.
pub fn validate_content(data: &[u8], config: &FilterConfig) -> Option<RejectReason> {
    let len = data.len();
    if config.min_size > 0 && (len as u64) < config.min_size {
        return Some(RejectReason::ByteSize(len));
    }
    if config.max_size > 0 && (len as u64) > config.max_size {
        return Some(RejectReason::ByteSize(len));
    }

    if !config.has_content_constraints() {
        return None;
    }

    let reader = match image::ImageReader::new(Cursor::new(data)).with_guessed_format() {
        Ok(reader) => reader,
        Err(_) => return Some(RejectReason::Undecodable),
    };

    let format = reader.format();

    if !config.allowed_types.is_empty() {
        let allowed = format.is_some_and(|f| {
            f.extensions_str()
                .iter()
                .any(|ext| config.allowed_types.iter().any(|t| t == ext))
        });
        if !allowed {
            let name = format
                .map(|f| f.extensions_str()[0].to_string())
                .unwrap_or_else(|| "unknown".to_string());
            return Some(RejectReason::Type(name));
        }
    }

    let (width, height) = match reader.into_dimensions() {
        Ok(dims) => dims,
        Err(_) => return Some(RejectReason::Undecodable),
    };

    let orientation = Orientation::classify(width, height);
    let disabled = match orientation {
        Orientation::Portrait => config.no_portrait,
        Orientation::Landscape => config.no_landscape,
        Orientation::Square => config.no_square,
    };
    if disabled {
        return Some(RejectReason::Orientation(orientation));
    }

    if config.min_width > 0 && width < config.min_width {
        return Some(RejectReason::Width(width));
    }
    if config.max_width > 0 && width > config.max_width {
        return Some(RejectReason::Width(width));
    }
    if config.min_height > 0 && height < config.min_height {
        return Some(RejectReason::Height(height));
    }
    if config.max_height > 0 && height > config.max_height {
        return Some(RejectReason::Height(height));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_item() -> Item {
        Item {
            id: "abc123".to_string(),
            title: "A Picture".to_string(),
            url: "https://example.com/a.png".to_string(),
            permalink: "/r/pics/abc123".to_string(),
            subreddit: "pics".to_string(),
            author: "tester".to_string(),
            created_utc: 1_600_000_000.0,
            domain: "example.com".to_string(),
            post_hint: "image".to_string(),
            is_meta: false,
            nsfw: false,
            score: 5,
        }
    }

    fn encode_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::new(width, height);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_meta_items_rejected() {
        let mut item = test_item();
        item.is_meta = true;
        assert_eq!(
            evaluate_item(&item, &FilterConfig::default()),
            Some(RejectReason::Meta)
        );
    }

    #[test]
    fn test_nsfw_rejected_unless_enabled() {
        let mut item = test_item();
        item.nsfw = true;

        assert_eq!(
            evaluate_item(&item, &FilterConfig::default()),
            Some(RejectReason::Nsfw)
        );

        let config = FilterConfig {
            nsfw: true,
            ..Default::default()
        };
        assert_eq!(evaluate_item(&item, &config), None);
    }

    #[test]
    fn test_score_minimum() {
        let item = test_item();

        let config = FilterConfig {
            min_score: Some(10),
            ..Default::default()
        };
        assert_eq!(evaluate_item(&item, &config), Some(RejectReason::Score(5)));

        let config = FilterConfig {
            min_score: Some(5),
            ..Default::default()
        };
        assert_eq!(evaluate_item(&item, &config), None);

        assert_eq!(evaluate_item(&item, &FilterConfig::default()), None);
    }

    #[test]
    fn test_orientation_classify() {
        assert_eq!(Orientation::classify(50, 100), Orientation::Portrait);
        assert_eq!(Orientation::classify(100, 50), Orientation::Landscape);
        assert_eq!(Orientation::classify(64, 64), Orientation::Square);
    }

    #[test]
    fn test_no_constraints_accepts_undecodable_payload() {
        let config = FilterConfig::default();
        assert_eq!(validate_content(b"not an image", &config), None);
    }

    #[test]
    fn test_byte_size_bounds_checked_on_raw_length() {
        let config = FilterConfig {
            min_size: 100,
            ..Default::default()
        };
        // Checked before any decode, so a short non-image payload rejects
        // on size rather than decodability.
        assert_eq!(
            validate_content(b"tiny", &config),
            Some(RejectReason::ByteSize(4))
        );

        let data = encode_png(10, 10);
        let config = FilterConfig {
            max_size: 10,
            ..Default::default()
        };
        assert_eq!(
            validate_content(&data, &config),
            Some(RejectReason::ByteSize(data.len()))
        );
    }

    #[test]
    fn test_no_landscape_rejects_wide_image() {
        let data = encode_png(100, 50);

        let config = FilterConfig {
            no_landscape: true,
            ..Default::default()
        };
        assert_eq!(
            validate_content(&data, &config),
            Some(RejectReason::Orientation(Orientation::Landscape))
        );

        // Same image passes when the orientation is not disabled
        assert_eq!(validate_content(&data, &FilterConfig::default()), None);
    }

    #[test]
    fn test_no_landscape_with_satisfied_dimension_bounds() {
        let data = encode_png(100, 50);

        let config = FilterConfig {
            no_landscape: true,
            min_width: 10,
            max_width: 200,
            min_height: 10,
            max_height: 200,
            ..Default::default()
        };
        assert_eq!(
            validate_content(&data, &config),
            Some(RejectReason::Orientation(Orientation::Landscape))
        );
    }

    #[test]
    fn test_dimension_bounds() {
        let data = encode_png(100, 50);

        let config = FilterConfig {
            min_width: 200,
            ..Default::default()
        };
        assert_eq!(
            validate_content(&data, &config),
            Some(RejectReason::Width(100))
        );

        let config = FilterConfig {
            max_height: 40,
            ..Default::default()
        };
        assert_eq!(
            validate_content(&data, &config),
            Some(RejectReason::Height(50))
        );

        // Max of 0 means unbounded
        let config = FilterConfig {
            min_width: 50,
            max_width: 0,
            ..Default::default()
        };
        assert_eq!(validate_content(&data, &config), None);
    }

    #[test]
    fn test_type_allow_list() {
        let data = encode_png(10, 10);

        let config = FilterConfig {
            allowed_types: vec!["png".to_string()],
            ..Default::default()
        };
        assert_eq!(validate_content(&data, &config), None);

        let config = FilterConfig {
            allowed_types: vec!["jpg".to_string(), "jpeg".to_string()],
            ..Default::default()
        };
        assert_eq!(
            validate_content(&data, &config),
            Some(RejectReason::Type("png".to_string()))
        );
    }

    #[test]
    fn test_undecodable_rejected_when_constraints_active() {
        let config = FilterConfig {
            no_portrait: true,
            ..Default::default()
        };
        assert_eq!(
            validate_content(b"not an image at all", &config),
            Some(RejectReason::Undecodable)
        );
    }
}
