//! Content fetcher
//!
//! Performs the binary download for a single content URL and classifies
//! the HTTP outcome. Not-found responses, including the image host's
//! "removed" placeholder that arrives behind a redirect with status 200,
//! and other non-success statuses are skips rather than errors. When the
//! caller wants a content hash the payload is hashed while streaming in,
//! in a single pass.

use crate::api::IMAGE_HOST;
use crate::RipError;
use reqwest::Client;
use sha2::{Digest, Sha256};

/// Classified result of a content download
#[derive(Debug)]
pub enum FetchOutcome {
    /// HTTP 404, or the removed-content placeholder
    NotFound,

    /// Any other non-success status (≥ 300 after redirects)
    BadStatus(u16),

    /// Downloaded payload
    Payload {
        data: Vec<u8>,
        /// Declared content type, kept for extension resolution
        content_type: Option<String>,
        /// Hex SHA-256 of the payload, when requested
        hash: Option<String>,
    },
}

/// Downloads `url`, classifying the response
///
/// `compute_hash` enables single-pass hashing of the streamed payload for
/// hash dedup at the call site.
pub async fn fetch_content(
    client: &Client,
    url: &str,
    compute_hash: bool,
) -> Result<FetchOutcome, RipError> {
    let mut response = client.get(url).send().await.map_err(|e| RipError::Http {
        url: url.to_string(),
        source: e,
    })?;

    let status = response.status().as_u16();
    let final_url = response.url();

    let removed_placeholder =
        final_url.host_str() == Some(IMAGE_HOST) && final_url.path().ends_with("removed.png");
    if status == 404 || removed_placeholder {
        return Ok(FetchOutcome::NotFound);
    }
    if status >= 300 {
        return Ok(FetchOutcome::BadStatus(status));
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    let mut hasher = compute_hash.then(Sha256::new);
    let mut data = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(|e| RipError::Http {
        url: url.to_string(),
        source: e,
    })? {
        if let Some(hasher) = hasher.as_mut() {
            hasher.update(&chunk);
        }
        data.extend_from_slice(&chunk);
    }

    Ok(FetchOutcome::Payload {
        data,
        content_type,
        hash: hasher.map(|h| hex::encode(h.finalize())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_payload_with_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"image bytes".to_vec())
                    .insert_header("content-type", "image/png"),
            )
            .mount(&server)
            .await;

        let client = Client::new();
        let outcome = fetch_content(&client, &format!("{}/a.png", server.uri()), false)
            .await
            .unwrap();

        match outcome {
            FetchOutcome::Payload {
                data,
                content_type,
                hash,
            } => {
                assert_eq!(data, b"image bytes");
                assert_eq!(content_type.as_deref(), Some("image/png"));
                assert!(hash.is_none());
            }
            other => panic!("expected payload, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_hash_computed_when_requested() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"image bytes".to_vec()))
            .mount(&server)
            .await;

        let client = Client::new();
        let outcome = fetch_content(&client, &format!("{}/a.png", server.uri()), true)
            .await
            .unwrap();

        let expected = hex::encode(Sha256::digest(b"image bytes"));
        match outcome {
            FetchOutcome::Payload { hash, .. } => assert_eq!(hash.as_deref(), Some(&*expected)),
            other => panic!("expected payload, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_404_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = Client::new();
        let outcome = fetch_content(&client, &format!("{}/gone.png", server.uri()), false)
            .await
            .unwrap();

        assert!(matches!(outcome, FetchOutcome::NotFound));
    }

    #[tokio::test]
    async fn test_server_error_is_bad_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken.png"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = Client::new();
        let outcome = fetch_content(&client, &format!("{}/broken.png", server.uri()), false)
            .await
            .unwrap();

        assert!(matches!(outcome, FetchOutcome::BadStatus(503)));
    }
}
