//! Item response serialization, CORS headers, and error formatting.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;

use itemstack_model::envelope::ResponseEnvelope;
use itemstack_model::error::ItemError;

use crate::body::ItemResponseBody;

/// Content type for envelope responses.
pub const CONTENT_TYPE: &str = "application/json";

/// Methods advertised in preflight responses.
pub const ALLOWED_METHODS: &str = "OPTIONS, POST, GET, PUT, DELETE";

/// Preflight cache lifetime in seconds.
pub const PREFLIGHT_MAX_AGE: &str = "3600";

/// Characters escaped when an id is placed into a `Location` path segment.
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Serialize an error into an envelope JSON body.
///
/// ```json
/// { "data": null, "errorMessage": "item not found: 42" }
/// ```
#[must_use]
pub fn error_to_json(error: &ItemError) -> Vec<u8> {
    serde_json::to_vec(&ResponseEnvelope::<()>::error(error.message.clone()))
        .expect("JSON serialization of error envelope cannot fail")
}

/// Convert an `ItemError` into a complete HTTP error response.
#[must_use]
pub fn error_to_response(error: &ItemError) -> http::Response<ItemResponseBody> {
    http::Response::builder()
        .status(error.status_code)
        .header(http::header::CONTENT_TYPE, CONTENT_TYPE)
        .body(ItemResponseBody::from_json(error_to_json(error)))
        .expect("valid error response")
}

/// Build an envelope response carrying `data` with the given status.
pub fn envelope_response<T: Serialize>(
    status: http::StatusCode,
    data: T,
) -> Result<http::Response<ItemResponseBody>, ItemError> {
    let json = serde_json::to_vec(&ResponseEnvelope::data(data))
        .map_err(|e| ItemError::internal_error().with_source(e))?;

    Ok(http::Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, CONTENT_TYPE)
        .body(ItemResponseBody::from_json(json))
        .expect("valid envelope response"))
}

/// The path of a single item under `resource`.
#[must_use]
pub fn item_location(resource: &str, id: &str) -> String {
    format!(
        "/{}/{}",
        resource.trim_matches('/'),
        utf8_percent_encode(id, PATH_SEGMENT_ENCODE_SET)
    )
}

/// Attach a `Location` header pointing at the item.
#[must_use]
pub fn with_location(
    mut response: http::Response<ItemResponseBody>,
    resource: &str,
    id: &str,
) -> http::Response<ItemResponseBody> {
    if let Ok(hv) = http::HeaderValue::from_str(&item_location(resource, id)) {
        response.headers_mut().insert(http::header::LOCATION, hv);
    }
    response
}

/// Build the CORS preflight response. It has no body.
#[must_use]
pub fn preflight_response() -> http::Response<ItemResponseBody> {
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS)
        .header(http::header::ACCESS_CONTROL_MAX_AGE, PREFLIGHT_MAX_AGE)
        .body(ItemResponseBody::empty())
        .expect("valid preflight response")
}

/// Insert the CORS headers every response carries.
pub fn apply_cors_headers(headers: &mut http::HeaderMap, allowed_origin: &http::HeaderValue) {
    headers.insert(
        http::header::ACCESS_CONTROL_ALLOW_ORIGIN,
        allowed_origin.clone(),
    );
    headers.insert(
        http::header::ACCESS_CONTROL_ALLOW_HEADERS,
        http::HeaderValue::from_static("Content-Type"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use itemstack_model::Item;

    async fn body_json(resp: http::Response<ItemResponseBody>) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_should_format_error_envelope() {
        let resp = error_to_response(&ItemError::not_found("42"));
        assert_eq!(resp.status(), http::StatusCode::NOT_FOUND);
        assert_eq!(
            resp.headers().get(http::header::CONTENT_TYPE).unwrap(),
            CONTENT_TYPE
        );
        let json = body_json(resp).await;
        assert!(json["data"].is_null());
        assert_eq!(json["errorMessage"], "item not found: 42");
    }

    #[tokio::test]
    async fn test_should_build_created_envelope() {
        let item = Item {
            id: "7".to_owned(),
            description: "box".to_owned(),
            location: "A1".to_owned(),
            quantity: 3,
        };
        let resp = envelope_response(http::StatusCode::CREATED, &item).unwrap();
        let resp = with_location(resp, "items", &item.id);
        assert_eq!(resp.status(), http::StatusCode::CREATED);
        assert_eq!(resp.headers().get(http::header::LOCATION).unwrap(), "/items/7");
        let json = body_json(resp).await;
        assert_eq!(json["data"]["id"], "7");
        assert!(json["errorMessage"].is_null());
    }

    #[test]
    fn test_should_escape_id_in_location() {
        assert_eq!(item_location("/items/", "a b/c"), "/items/a%20b%2Fc");
    }

    #[test]
    fn test_should_build_preflight_without_body() {
        let resp = preflight_response();
        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get(http::header::ACCESS_CONTROL_ALLOW_METHODS)
                .unwrap(),
            ALLOWED_METHODS
        );
        assert_eq!(
            resp.headers().get(http::header::ACCESS_CONTROL_MAX_AGE).unwrap(),
            "3600"
        );
        assert!(resp.headers().get(http::header::CONTENT_TYPE).is_none());
        assert!(http_body::Body::is_end_stream(resp.body()));
    }

    #[test]
    fn test_should_apply_cors_headers() {
        let mut headers = http::HeaderMap::new();
        apply_cors_headers(
            &mut headers,
            &http::HeaderValue::from_static("https://app.example.com"),
        );
        assert_eq!(
            headers
                .get(http::header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "https://app.example.com"
        );
        assert_eq!(
            headers
                .get(http::header::ACCESS_CONTROL_ALLOW_HEADERS)
                .unwrap(),
            "Content-Type"
        );
    }
}
