//! Store error type and its mapping to client-visible errors.

use std::time::Duration;

use itemstack_model::error::ItemError;

/// Boxed transport or SDK error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Any failure of a store operation other than a missing item.
///
/// Absent keys and failed existence conditions are not errors; they are
/// reported as [`Lookup::NotFound`](crate::client::Lookup::NotFound).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store rejected or failed the request.
    #[error("{operation} failed: {detail}")]
    Backend {
        operation: &'static str,
        detail: String,
        #[source]
        source: BoxError,
    },

    /// A stored record could not be read back as an item.
    #[error("malformed item in table: {0}")]
    MalformedItem(String),

    /// The operation did not finish before the request deadline.
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// Enumeration needed more pages than allowed.
    #[error("scan exceeded {max_pages} pages")]
    PaginationLimitExceeded { max_pages: usize },

    /// The store returned the continuation token it was just given.
    #[error("scan stalled on continuation token {token}")]
    StalledPagination { token: String },
}

impl StoreError {
    /// Wrap a backend failure for `operation`.
    pub fn backend(
        operation: &'static str,
        detail: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Backend {
            operation,
            detail: detail.into(),
            source: Box::new(source),
        }
    }
}

/// Convert a store error into an opaque internal error carrying it as source.
#[must_use]
pub fn store_error_to_item_error(e: StoreError) -> ItemError {
    ItemError::internal_error().with_source(e)
}
