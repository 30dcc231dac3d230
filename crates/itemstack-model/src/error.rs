//! ItemStack error types.
//!
//! Every client-visible failure is an [`ItemError`]. The error code decides
//! the HTTP status; the message becomes the envelope's `errorMessage`.

use std::fmt;

/// Well-known item API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ItemErrorCode {
    /// The request body is not valid JSON for the payload type.
    MalformedBody,
    /// The payload decoded but a required field is empty or zero.
    SchemaViolation,
    /// A mutating verb was sent without an item id in the path.
    MissingId,
    /// No item exists with the requested id.
    NotFound,
    /// The path does not address the item resource.
    RouteNotFound,
    /// The HTTP method is not supported by the resource.
    MethodNotAllowed,
    /// Any store or internal failure.
    InternalError,
}

impl ItemErrorCode {
    /// Returns the short error code string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedBody => "MalformedBody",
            Self::SchemaViolation => "SchemaViolation",
            Self::MissingId => "MissingId",
            Self::NotFound => "NotFound",
            Self::RouteNotFound => "RouteNotFound",
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::InternalError => "InternalError",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn default_status_code(&self) -> http::StatusCode {
        match self {
            Self::MalformedBody => http::StatusCode::UNPROCESSABLE_ENTITY,
            Self::SchemaViolation | Self::MissingId => http::StatusCode::BAD_REQUEST,
            Self::NotFound | Self::RouteNotFound => http::StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => http::StatusCode::METHOD_NOT_ALLOWED,
            Self::InternalError => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ItemErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client-visible item API error.
#[derive(Debug)]
pub struct ItemError {
    /// The error code.
    pub code: ItemErrorCode,
    /// Message placed in the response envelope.
    pub message: String,
    /// The HTTP status code.
    pub status_code: http::StatusCode,
    /// The underlying source error, if any. Never serialized.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemError({}): {}", self.code, self.message)
    }
}

impl std::error::Error for ItemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl ItemError {
    /// Create a new `ItemError` from an error code, using the status reason
    /// phrase as the message.
    #[must_use]
    pub fn new(code: ItemErrorCode) -> Self {
        let status_code = code.default_status_code();
        Self {
            message: status_code
                .canonical_reason()
                .unwrap_or_else(|| code.as_str())
                .to_owned(),
            status_code,
            code,
            source: None,
        }
    }

    /// Create a new `ItemError` with a custom message.
    #[must_use]
    pub fn with_message(code: ItemErrorCode, message: impl Into<String>) -> Self {
        Self {
            status_code: code.default_status_code(),
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Set the source error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // -- Convenience constructors --

    /// Body could not be decoded.
    #[must_use]
    pub fn malformed_body(message: impl Into<String>) -> Self {
        Self::with_message(ItemErrorCode::MalformedBody, message)
    }

    /// Required field missing or empty.
    #[must_use]
    pub fn schema_violation(field: &str) -> Self {
        Self::with_message(
            ItemErrorCode::SchemaViolation,
            format!("missing required field: {field}"),
        )
    }

    /// Id path parameter missing.
    #[must_use]
    pub fn missing_id() -> Self {
        Self::with_message(ItemErrorCode::MissingId, "missing item id in path")
    }

    /// Item not found.
    #[must_use]
    pub fn not_found(id: &str) -> Self {
        Self::with_message(ItemErrorCode::NotFound, format!("item not found: {id}"))
    }

    /// Path outside the item resource.
    #[must_use]
    pub fn route_not_found(path: &str) -> Self {
        Self::with_message(ItemErrorCode::RouteNotFound, format!("no route for {path}"))
    }

    /// Unsupported method.
    #[must_use]
    pub fn method_not_allowed(method: &http::Method) -> Self {
        Self::with_message(
            ItemErrorCode::MethodNotAllowed,
            format!("method not allowed: {method}"),
        )
    }

    /// Internal error. The message is opaque; attach the cause with
    /// [`ItemError::with_source`].
    #[must_use]
    pub fn internal_error() -> Self {
        Self::new(ItemErrorCode::InternalError)
    }
}
