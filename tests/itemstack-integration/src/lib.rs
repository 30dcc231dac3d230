//! Integration tests for ItemStack server.
//!
//! These tests require a running ItemStack server at `localhost:4566`.
//! They are marked `#[ignore]` so they don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! ITEMS_BACKEND=memory cargo run -p itemstack-server &
//! cargo test -p itemstack-integration -- --ignored
//! ```

use std::sync::Once;

use serde_json::{Value, json};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL for the server.
fn endpoint_url() -> String {
    std::env::var("ITEMS_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:4566".to_owned())
}

/// URL of the item collection.
#[must_use]
pub fn items_url() -> String {
    format!("{}/items", endpoint_url())
}

/// URL of a single item.
#[must_use]
pub fn item_url(id: &str) -> String {
    format!("{}/items/{id}", endpoint_url())
}

/// URL of an arbitrary path on the server.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", endpoint_url())
}

/// Create an HTTP client for the local server.
#[must_use]
pub fn http_client() -> reqwest::Client {
    init_tracing();
    reqwest::Client::new()
}

/// A payload with a unique description, so tests sharing a server can tell
/// their items apart.
#[must_use]
pub fn unique_payload(location: &str, quantity: i64) -> Value {
    let tag = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    json!({ "description": format!("test-{tag}"), "location": location, "quantity": quantity })
}

/// Create an item and return the `data` object of the response.
pub async fn create_item(client: &reqwest::Client, payload: &Value) -> Value {
    let resp = client
        .post(items_url())
        .json(payload)
        .send()
        .await
        .unwrap_or_else(|e| panic!("failed to create item: {e}"));
    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
    let body: Value = resp.json().await.expect("create response is JSON");
    body["data"].clone()
}

/// Delete an item, ignoring failures.
pub async fn cleanup_item(client: &reqwest::Client, id: &str) {
    let _ = client.delete(item_url(id)).send().await;
}

mod test_cors;
mod test_errors;
mod test_items;
