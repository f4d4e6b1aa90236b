//! Entity tags and conditional requests
//!
//! Tags are the SHA-256 of the JSON representation, hex encoded. Reads honour
//! `If-None-Match` (weak comparison, 304), writes require a matching
//! `If-Match` (strong comparison, 428 when absent, 412 when stale).

use axum::http::header::{ETAG, IF_MATCH, IF_NONE_MATCH};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::error::ApiError;

/// Opaque tag, stored without quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Etag(String);

impl Etag {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(bytes)))
    }

    pub fn for_json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::from_bytes(&serde_json::to_vec(value)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Quoted strong tag, e.g. `"3f2a..."`.
    pub fn to_header_value(&self) -> HeaderValue {
        // hex digits and quotes are always valid header bytes
        HeaderValue::from_str(&format!("\"{}\"", self.0))
            .unwrap_or_else(|_| HeaderValue::from_static("\"\""))
    }

    /// `true` if any tag in `If-None-Match` matches, ignoring weakness.
    pub fn matches_if_none_match(&self, headers: &HeaderMap) -> bool {
        header_tags(headers, IF_NONE_MATCH.as_str())
            .any(|tag| tag.is_wildcard() || tag.opaque == self.0)
    }

    /// Guard a write: the client must send `If-Match` with the current tag.
    pub fn check_if_match(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        if !headers.contains_key(IF_MATCH) {
            return Err(ApiError::PreconditionRequired);
        }
        let matched = header_tags(headers, IF_MATCH.as_str())
            .any(|tag| tag.is_wildcard() || (!tag.weak && tag.opaque == self.0));
        if matched {
            Ok(())
        } else {
            Err(ApiError::PreconditionFailed)
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct EntityTag<'a> {
    weak: bool,
    opaque: &'a str,
}

impl EntityTag<'_> {
    fn is_wildcard(&self) -> bool {
        self.opaque == "*"
    }
}

fn parse_tag(raw: &str) -> Option<EntityTag<'_>> {
    let raw = raw.trim();
    if raw == "*" {
        return Some(EntityTag {
            weak: false,
            opaque: raw,
        });
    }
    let (weak, rest) = match raw.strip_prefix("W/") {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let opaque = rest.strip_prefix('"')?.strip_suffix('"')?;
    Some(EntityTag { weak, opaque })
}

fn header_tags<'a>(headers: &'a HeaderMap, name: &str) -> impl Iterator<Item = EntityTag<'a>> {
    headers
        .get_all(name)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(parse_tag)
}

/// Empty 304 carrying the current tag.
pub fn not_modified(tag: &Etag) -> Response {
    (StatusCode::NOT_MODIFIED, [(ETAG, tag.to_header_value())]).into_response()
}

/// Render `body` as JSON with an `ETag`, or 304 if the client's copy is current.
pub fn conditional_json<T: Serialize>(headers: &HeaderMap, body: T) -> Result<Response, ApiError> {
    let tag = Etag::for_json(&body).map_err(|e| ApiError::Internal(e.to_string()))?;
    if tag.matches_if_none_match(headers) {
        return Ok(not_modified(&tag));
    }
    Ok(([(ETAG, tag.to_header_value())], Json(body)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(name: &'static str, value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(name, HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn test_same_json_same_tag() {
        let a = Etag::for_json(&serde_json::json!({"item_id": 1, "field": 0})).unwrap();
        let b = Etag::for_json(&serde_json::json!({"item_id": 1, "field": 0})).unwrap();
        let c = Etag::for_json(&serde_json::json!({"item_id": 1, "field": 1})).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_parse_tag() {
        assert_eq!(
            parse_tag(" W/\"abc\" "),
            Some(EntityTag {
                weak: true,
                opaque: "abc"
            })
        );
        assert_eq!(
            parse_tag("\"abc\""),
            Some(EntityTag {
                weak: false,
                opaque: "abc"
            })
        );
        assert_eq!(parse_tag("abc"), None);
    }

    #[test]
    fn test_if_none_match_uses_weak_comparison() {
        let tag = Etag::from_bytes(b"body");
        let weak = format!("\"other\", W/\"{}\"", tag.as_str());
        assert!(tag.matches_if_none_match(&headers("if-none-match", &weak)));
        assert!(tag.matches_if_none_match(&headers("if-none-match", "*")));
        assert!(!tag.matches_if_none_match(&headers("if-none-match", "\"other\"")));
        assert!(!tag.matches_if_none_match(&HeaderMap::new()));
    }

    #[test]
    fn test_if_match_uses_strong_comparison() {
        let tag = Etag::from_bytes(b"body");
        let strong = format!("\"{}\"", tag.as_str());
        let weak = format!("W/\"{}\"", tag.as_str());

        assert!(tag.check_if_match(&headers("if-match", &strong)).is_ok());
        assert!(tag.check_if_match(&headers("if-match", "*")).is_ok());
        assert!(matches!(
            tag.check_if_match(&headers("if-match", &weak)),
            Err(ApiError::PreconditionFailed)
        ));
        assert!(matches!(
            tag.check_if_match(&HeaderMap::new()),
            Err(ApiError::PreconditionRequired)
        ));
    }

    #[test]
    fn test_conditional_json() {
        let body = serde_json::json!({"item_id": 1, "field": 0});
        let fresh = conditional_json(&HeaderMap::new(), &body).unwrap();
        assert_eq!(fresh.status(), StatusCode::OK);
        let etag = fresh.headers().get(ETAG).unwrap().to_str().unwrap().to_string();

        let cached = conditional_json(&headers("if-none-match", &etag), &body).unwrap();
        assert_eq!(cached.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(cached.headers().get(ETAG).unwrap(), etag.as_str());
    }
}
