//! Response construction shared by the Results handlers.
//!
//! Centralizes status/header/body assembly so each handler only decides
//! *what* to return: the negotiated format, the cache validators, and the
//! error payload shape all live here.

use actix_web::http::{StatusCode, header};
use actix_web::HttpResponse;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::domain::{DomainError, Message};

use super::error::{redact_if_internal, status_for};
use super::format::Format;

/// Cached reads must be revalidated against the `ETag` before reuse.
pub const MUST_REVALIDATE: &str = "must-revalidate";

/// The method listing never changes for a given path shape.
pub const PUBLIC_IMMUTABLE: &str = "public, immutable";

/// Non-standard "Content Returned" success status used by update responses.
/// Preserved verbatim as an observable contract.
pub const CONTENT_RETURNED_CODE: u16 = 209;

/// XML document element for success bodies; JSON ignores it.
const RESPONSE_ROOT: &str = "response";

pub(crate) fn content_returned_status() -> StatusCode {
    // 209 is within the valid status range, so the fallback arm is unreachable.
    StatusCode::from_u16(CONTENT_RETURNED_CODE).unwrap_or(StatusCode::OK)
}

/// Opaque validator derived from the response body.
pub(crate) fn etag_of(body: &str) -> String {
    format!("\"{}\"", hex::encode(Sha256::digest(body.as_bytes())))
}

/// 200 with `Cache-Control`/`ETag` validators.
pub(crate) fn ok_cached<T: Serialize>(
    format: Format,
    value: &T,
) -> Result<HttpResponse, DomainError> {
    let body = format.render(RESPONSE_ROOT, value)?;
    Ok(HttpResponse::Ok()
        .content_type(format.content_type())
        .insert_header((header::CACHE_CONTROL, MUST_REVALIDATE))
        .insert_header((header::ETAG, etag_of(&body)))
        .body(body))
}

/// 201 with a `Location` header pointing at the canonical resource URL.
pub(crate) fn created<T: Serialize>(
    format: Format,
    value: &T,
    location: String,
) -> Result<HttpResponse, DomainError> {
    let body = format.render(RESPONSE_ROOT, value)?;
    Ok(HttpResponse::Created()
        .content_type(format.content_type())
        .insert_header((header::LOCATION, location))
        .body(body))
}

/// 209 with the updated entity body.
pub(crate) fn content_returned<T: Serialize>(
    format: Format,
    value: &T,
) -> Result<HttpResponse, DomainError> {
    let body = format.render(RESPONSE_ROOT, value)?;
    Ok(HttpResponse::build(content_returned_status())
        .content_type(format.content_type())
        .body(body))
}

/// 204 with the `Allow` method listing.
pub(crate) fn options_allow(methods: &str) -> HttpResponse {
    HttpResponse::NoContent()
        .insert_header((header::ALLOW, methods))
        .insert_header((header::CACHE_CONTROL, PUBLIC_IMMUTABLE))
        .finish()
}

/// Render a domain failure as a `Message` body in the negotiated format.
pub(crate) fn error(format: Format, err: &DomainError) -> HttpResponse {
    let status = status_for(err.code());
    let redacted = redact_if_internal(err);
    let payload = Message::new(status.as_u16(), redacted.message());
    match format.render("message", &payload) {
        Ok(body) => HttpResponse::build(status)
            .content_type(format.content_type())
            .body(body),
        Err(render_err) => {
            tracing::error!(error = %render_err, "failed to render error payload");
            HttpResponse::build(status).finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    fn etag_is_deterministic_and_quoted() {
        let first = etag_of("payload");
        let second = etag_of("payload");
        assert_eq!(first, second);
        assert!(first.starts_with('"') && first.ends_with('"'));
        assert_ne!(first, etag_of("other payload"));
    }

    #[rstest]
    fn content_returned_status_is_209() {
        assert_eq!(content_returned_status().as_u16(), 209);
    }

    #[rstest]
    fn options_carries_allow_and_cache_headers() {
        let response = options_allow("GET, POST, OPTIONS");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let allow = response.headers().get(header::ALLOW).expect("allow header");
        assert_eq!(allow, "GET, POST, OPTIONS");
        let cache = response
            .headers()
            .get(header::CACHE_CONTROL)
            .expect("cache header");
        assert_eq!(cache, PUBLIC_IMMUTABLE);
    }

    #[actix_web::test]
    async fn error_renders_message_payload_in_json() {
        let err = DomainError::not_found("Not Found");
        let response = error(Format::Json, &err);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body()).await.expect("body bytes");
        let value: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(value["code"], 404);
        assert_eq!(value["message"], "Not Found");
    }

    #[actix_web::test]
    async fn error_renders_message_payload_in_xml() {
        let err = DomainError::forbidden("`Forbidden`: you don't have permission to access");
        let response = error(Format::Xml, &err);
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .expect("content type");
        assert_eq!(content_type, "application/xml");
        let body = to_bytes(response.into_body()).await.expect("body bytes");
        let text = String::from_utf8(body.to_vec()).expect("utf8 body");
        assert!(text.contains("<code>403</code>"), "body: {text}");
    }

    #[actix_web::test]
    async fn internal_errors_are_redacted_in_bodies() {
        let err = DomainError::internal("pool checkout timed out");
        let response = error(Format::Json, &err);
        let body = to_bytes(response.into_body()).await.expect("body bytes");
        let value: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(value["message"], "Internal Server Error");
    }
}
