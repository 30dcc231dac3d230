//! The uniform `{data, errorMessage}` response wrapper.

use serde::Serialize;

/// JSON body of every item API response except preflight.
///
/// Exactly one of `data` and `error_message` is populated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope<T> {
    pub data: Option<T>,
    pub error_message: Option<String>,
}

impl<T: Serialize> ResponseEnvelope<T> {
    /// Envelope carrying a successful payload.
    #[must_use]
    pub fn data(data: T) -> Self {
        Self {
            data: Some(data),
            error_message: None,
        }
    }
}

impl ResponseEnvelope<()> {
    /// Envelope carrying only an error message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error_message: Some(message.into()),
        }
    }
}
