//! Item handler bridging HTTP to the store client.

use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use tracing::debug;

use itemstack_http::body::ItemResponseBody;
use itemstack_http::dispatch::{HandlerFuture, ItemHandler};
use itemstack_http::response::{envelope_response, with_location};
use itemstack_model::error::ItemError;
use itemstack_model::operations::ItemOperation;
use itemstack_model::{ITEM_PAYLOAD_SCHEMA, Item, ItemPayload, validate};

use crate::client::{ItemStoreClient, Lookup};
use crate::error::store_error_to_item_error;

/// Handler that bridges the HTTP layer to the [`ItemStoreClient`].
#[derive(Debug)]
pub struct ItemStoreHandler {
    client: Arc<ItemStoreClient>,
    resource: Arc<str>,
}

impl ItemStoreHandler {
    /// Create a new handler. `resource` is the path segment used to build
    /// `Location` headers.
    #[must_use]
    pub fn new(client: Arc<ItemStoreClient>, resource: &str) -> Self {
        Self {
            client,
            resource: Arc::from(resource.trim_matches('/')),
        }
    }
}

impl ItemHandler for ItemStoreHandler {
    fn handle_operation(
        &self,
        op: ItemOperation,
        id: Option<String>,
        body: Bytes,
    ) -> HandlerFuture {
        let client = Arc::clone(&self.client);
        let resource = Arc::clone(&self.resource);
        Box::pin(async move { dispatch(&client, &resource, op, id, &body).await })
    }
}

/// Run one routed operation against the store.
async fn dispatch(
    client: &ItemStoreClient,
    resource: &str,
    op: ItemOperation,
    id: Option<String>,
    body: &[u8],
) -> Result<http::Response<ItemResponseBody>, ItemError> {
    match op {
        ItemOperation::ListItems => {
            let items = client.list().await.map_err(store_error_to_item_error)?;
            envelope_response(StatusCode::OK, items)
        }
        ItemOperation::GetItem => {
            let id = require_id(id)?;
            let lookup = client.get(&id).await.map_err(store_error_to_item_error)?;
            found_or_404(lookup, &id, StatusCode::OK)
        }
        ItemOperation::CreateItem => {
            let payload = decode_payload(body)?;
            let item = client
                .insert(payload)
                .await
                .map_err(store_error_to_item_error)?;
            let id = item.id.clone();
            let response = envelope_response(StatusCode::CREATED, item)?;
            Ok(with_location(response, resource, &id))
        }
        ItemOperation::UpdateItem => {
            let id = require_id(id)?;
            let payload = decode_payload(body)?;
            let lookup = client
                .update(&id, payload)
                .await
                .map_err(store_error_to_item_error)?;
            let response = found_or_404(lookup, &id, StatusCode::OK)?;
            Ok(with_location(response, resource, &id))
        }
        ItemOperation::DeleteItem => {
            let id = require_id(id)?;
            let lookup = client
                .delete(&id)
                .await
                .map_err(store_error_to_item_error)?;
            found_or_404(lookup, &id, StatusCode::OK)
        }
        // Answered by the service before dispatch.
        ItemOperation::Preflight => Err(ItemError::internal_error()),
    }
}

fn require_id(id: Option<String>) -> Result<String, ItemError> {
    id.filter(|id| !id.is_empty())
        .ok_or_else(ItemError::missing_id)
}

/// Decode and validate a create/update body.
///
/// Bodies that are not JSON of the payload shape are rejected with 422. A
/// `null` body or field counts as empty, so it fails validation with 400
/// like any other payload with an empty required field.
fn decode_payload(body: &[u8]) -> Result<ItemPayload, ItemError> {
    let payload: ItemPayload = serde_json::from_slice::<Option<ItemPayload>>(body)
        .map_err(|e| {
            debug!(error = %e, "rejecting undecodable item body");
            ItemError::malformed_body(format!("invalid item body: {e}")).with_source(e)
        })?
        .unwrap_or_default();

    validate(&payload, ITEM_PAYLOAD_SCHEMA).map_err(|violation| {
        debug!(field = violation.field, "rejecting item payload");
        ItemError::schema_violation(violation.field)
    })?;
    Ok(payload)
}

fn found_or_404(
    lookup: Lookup<Item>,
    id: &str,
    status: StatusCode,
) -> Result<http::Response<ItemResponseBody>, ItemError> {
    match lookup {
        Lookup::Found(item) => envelope_response(status, item),
        Lookup::NotFound => Err(ItemError::not_found(id)),
    }
}
