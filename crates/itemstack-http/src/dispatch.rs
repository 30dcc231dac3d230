//! Item handler trait and operation dispatch.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;

use itemstack_model::error::ItemError;
use itemstack_model::operations::ItemOperation;

use crate::body::ItemResponseBody;

/// Future returned by [`ItemHandler::handle_operation`].
pub type HandlerFuture =
    Pin<Box<dyn Future<Output = Result<http::Response<ItemResponseBody>, ItemError>> + Send>>;

/// Trait that the item business logic must implement.
///
/// The handler receives the routed operation, the id path parameter and the
/// raw body bytes, and returns a complete HTTP response. This trait is the
/// boundary between the HTTP transport layer and the item store.
pub trait ItemHandler: Send + Sync + 'static {
    /// Handle an item operation and produce an HTTP response.
    fn handle_operation(&self, op: ItemOperation, id: Option<String>, body: Bytes)
    -> HandlerFuture;
}

/// Dispatch an item operation to the handler.
pub async fn dispatch_operation<H: ItemHandler>(
    handler: &H,
    op: ItemOperation,
    id: Option<String>,
    body: Bytes,
) -> Result<http::Response<ItemResponseBody>, ItemError> {
    tracing::debug!(operation = %op, id = ?id, "dispatching item operation");
    handler.handle_operation(op, id, body).await
}

/// Default handler that fails every operation with an internal error.
#[derive(Debug, Clone, Default)]
pub struct NotImplementedHandler;

impl ItemHandler for NotImplementedHandler {
    fn handle_operation(
        &self,
        op: ItemOperation,
        _id: Option<String>,
        _body: Bytes,
    ) -> HandlerFuture {
        Box::pin(async move {
            tracing::warn!(operation = %op, "no item handler configured");
            Err(ItemError::internal_error())
        })
    }
}
