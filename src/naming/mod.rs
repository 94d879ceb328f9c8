//! Destination naming
//!
//! Templates are parsed once at startup into a token list; an unknown
//! placeholder is a startup error, since a naming defect would affect
//! every item identically. Rendering is a pure, total function over a
//! typed context, so per-item naming cannot fail.

use crate::api::Item;
use crate::ConfigError;
use chrono::DateTime;
use std::path::Path;

/// Default template for single images
pub const DEFAULT_SINGLE_TEMPLATE: &str = "{source}/{timestamp}-{id}-{title}{ext}";

/// Default template for images inside albums
pub const DEFAULT_ALBUM_TEMPLATE: &str = "{source}/{timestamp}-{id}-{title}/{num}-{hash}{ext}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Source,
    Id,
    Title,
    Timestamp,
    Ext,
    Num,
    Hash,
}

/// A validated naming template
#[derive(Debug, Clone)]
pub struct NameTemplate {
    tokens: Vec<Token>,
}

impl NameTemplate {
    /// Parses a template string, rejecting unknown or unclosed placeholders
    pub fn parse(template: &str) -> Result<Self, ConfigError> {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars();

        while let Some(c) = chars.next() {
            if c != '{' {
                literal.push(c);
                continue;
            }

            if !literal.is_empty() {
                tokens.push(Token::Literal(std::mem::take(&mut literal)));
            }

            let mut name = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => name.push(c),
                    None => {
                        return Err(ConfigError::InvalidTemplate(format!(
                            "unclosed placeholder in {:?}",
                            template
                        )))
                    }
                }
            }

            tokens.push(match name.as_str() {
                "source" => Token::Source,
                "id" => Token::Id,
                "title" => Token::Title,
                "timestamp" => Token::Timestamp,
                "ext" => Token::Ext,
                "num" => Token::Num,
                "hash" => Token::Hash,
                other => {
                    return Err(ConfigError::InvalidTemplate(format!(
                        "unknown placeholder {{{}}}",
                        other
                    )))
                }
            });
        }

        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Ok(Self { tokens })
    }

    /// Renders the template over `context` into a destination path string
    pub fn render(&self, context: &NameContext) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Source => out.push_str(&context.source),
                Token::Id => out.push_str(&context.id),
                Token::Title => out.push_str(&slugify(&context.title)),
                Token::Timestamp => out.push_str(&context.timestamp),
                Token::Ext => out.push_str(&context.ext),
                Token::Num => out.push_str(&context.num.to_string()),
                Token::Hash => out.push_str(&context.hash),
            }
        }
        out
    }
}

/// Well-typed rendering context for a destination name
///
/// Identical contexts always render to identical paths.
#[derive(Debug, Clone)]
pub struct NameContext {
    pub source: String,
    pub id: String,
    pub title: String,
    /// Creation instant rendered as `YYYY-MM-DD-HH-MM-SS`
    pub timestamp: String,
    /// File extension including the leading dot
    pub ext: String,
    /// 1-based ordinal within an album; 0 for single images
    pub num: usize,
    /// Content identifier within an album; empty for single images
    pub hash: String,
}

impl NameContext {
    /// Context for a single image
    pub fn for_item(item: &Item, ext: &str) -> Self {
        Self {
            source: item.subreddit.clone(),
            id: item.id.clone(),
            title: item.title.clone(),
            timestamp: format_timestamp(item.created_utc),
            ext: ext.to_string(),
            num: 0,
            hash: String::new(),
        }
    }

    /// Context for one entry of an expanded album
    pub fn for_album_entry(item: &Item, hash: &str, ext: &str, num: usize) -> Self {
        Self {
            source: item.subreddit.clone(),
            id: item.id.clone(),
            title: item.title.clone(),
            timestamp: format_timestamp(item.created_utc),
            ext: ext.to_string(),
            num,
            hash: hash.to_string(),
        }
    }
}

fn format_timestamp(created_utc: f64) -> String {
    DateTime::from_timestamp(created_utc as i64, 0)
        .unwrap_or_default()
        .format("%Y-%m-%d-%H-%M-%S")
        .to_string()
}

/// Lowercases and joins alphanumeric runs with hyphens
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_separator = true;
        }
    }

    slug
}

/// Resolves the file extension for a downloaded payload
///
/// Starts from the URL path's extension and corrects it against the
/// response's declared content type: a missing or mismatching extension is
/// replaced by the content type's preferred one.
pub fn resolve_extension(url: &url::Url, content_type: Option<&str>) -> String {
    let mut ext = Path::new(url.path())
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    if let Some(content_type) = content_type {
        let essence = content_type.split(';').next().unwrap_or("").trim();
        if let Some(candidates) = mime_guess::get_mime_extensions_str(essence) {
            if !candidates.is_empty() {
                let matches = candidates.iter().any(|c| format!(".{}", c) == ext);
                if ext.is_empty() || !matches {
                    ext = format!(".{}", candidates[0]);
                }
            }
        }
    }

    ext
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_item() -> Item {
        Item {
            id: "abc123".to_string(),
            title: "Sunset Over The Bay!".to_string(),
            url: "https://example.com/a.png".to_string(),
            permalink: "/r/pics/abc123".to_string(),
            subreddit: "pics".to_string(),
            author: "tester".to_string(),
            created_utc: 1_600_000_000.0, // 2020-09-13 12:26:40 UTC
            domain: "example.com".to_string(),
            post_hint: "image".to_string(),
            is_meta: false,
            nsfw: false,
            score: 5,
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Sunset Over The Bay!"), "sunset-over-the-bay");
        assert_eq!(slugify("  a -- b  "), "a-b");
        assert_eq!(slugify("ALREADY-fine"), "already-fine");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_default_single_template_renders() {
        let template = NameTemplate::parse(DEFAULT_SINGLE_TEMPLATE).unwrap();
        let context = NameContext::for_item(&test_item(), ".png");

        assert_eq!(
            template.render(&context),
            "pics/2020-09-13-12-26-40-abc123-sunset-over-the-bay.png"
        );
    }

    #[test]
    fn test_default_album_template_renders() {
        let template = NameTemplate::parse(DEFAULT_ALBUM_TEMPLATE).unwrap();
        let context = NameContext::for_album_entry(&test_item(), "h4sh", ".jpg", 3);

        assert_eq!(
            template.render(&context),
            "pics/2020-09-13-12-26-40-abc123-sunset-over-the-bay/3-h4sh.jpg"
        );
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let template = NameTemplate::parse(DEFAULT_SINGLE_TEMPLATE).unwrap();
        let context = NameContext::for_item(&test_item(), ".png");

        assert_eq!(template.render(&context), template.render(&context));
    }

    #[test]
    fn test_unknown_placeholder_is_rejected() {
        let result = NameTemplate::parse("{source}/{bogus}");
        assert!(matches!(result, Err(ConfigError::InvalidTemplate(_))));
    }

    #[test]
    fn test_unclosed_placeholder_is_rejected() {
        let result = NameTemplate::parse("{source}/{id");
        assert!(matches!(result, Err(ConfigError::InvalidTemplate(_))));
    }

    #[test]
    fn test_resolve_extension_from_url() {
        let url = url::Url::parse("https://example.com/photo.png").unwrap();
        assert_eq!(resolve_extension(&url, None), ".png");
    }

    #[test]
    fn test_resolve_extension_from_content_type_when_missing() {
        let url = url::Url::parse("https://example.com/photo").unwrap();
        let ext = resolve_extension(&url, Some("image/png"));
        assert_eq!(ext, ".png");
    }

    #[test]
    fn test_resolve_extension_corrects_mismatch() {
        let url = url::Url::parse("https://example.com/photo.txt").unwrap();
        let ext = resolve_extension(&url, Some("image/png"));
        assert_eq!(ext, ".png");
    }

    #[test]
    fn test_resolve_extension_keeps_matching_url_ext() {
        let url = url::Url::parse("https://example.com/photo.jpg").unwrap();
        let ext = resolve_extension(&url, Some("image/jpeg"));
        assert_eq!(ext, ".jpg");
    }

    #[test]
    fn test_resolve_extension_ignores_content_type_parameters() {
        let url = url::Url::parse("https://example.com/photo").unwrap();
        let ext = resolve_extension(&url, Some("image/png; charset=binary"));
        assert_eq!(ext, ".png");
    }
}
