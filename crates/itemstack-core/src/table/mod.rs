//! Backing table abstraction.
//!
//! [`ItemTable`] exposes the logical primitives of a key-value/document
//! store keyed by item id: point get, one page of a full scan, unconditional
//! put, delete returning the prior value, and an update conditioned on the
//! key existing. The store client builds every item operation on top of
//! these, so swapping DynamoDB for the in-memory table changes nothing above
//! this seam.

mod dynamodb;
mod memory;

use std::fmt;

use async_trait::async_trait;

use itemstack_model::Item;

use crate::error::StoreError;

pub use dynamodb::DynamoDbTable;
pub use memory::MemoryTable;

/// Opaque cursor returned by a partial scan; pass it back to continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty token carries no position and ends pagination.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of a full-table scan.
#[derive(Debug, Clone, Default)]
pub struct ScanPage {
    /// Items in store order.
    pub items: Vec<Item>,
    /// Where the next page starts; `None` on the last page.
    pub next: Option<ContinuationToken>,
}

/// Outcome of a write conditioned on the key existing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionalWrite {
    /// The condition held; carries the item as stored after the write.
    Applied(Item),
    /// No item with the key existed; nothing was written.
    ConditionFailed,
}

/// Logical operations of the backing store.
///
/// Implementations must be safe to share across concurrent requests; each
/// call is atomic for the single item it touches.
#[async_trait]
pub trait ItemTable: Send + Sync + fmt::Debug {
    /// Table name, for logging.
    fn name(&self) -> &str;

    /// Fetch the item stored under `id`.
    async fn get_item(&self, id: &str) -> Result<Option<Item>, StoreError>;

    /// Fetch one page of the table, starting after `start`.
    async fn scan_page(
        &self,
        start: Option<&ContinuationToken>,
        limit: Option<u32>,
    ) -> Result<ScanPage, StoreError>;

    /// Write `item`, replacing any item with the same id.
    async fn put_item(&self, item: &Item) -> Result<(), StoreError>;

    /// Remove the item stored under `id`, returning it if it existed.
    async fn delete_item(&self, id: &str) -> Result<Option<Item>, StoreError>;

    /// Replace every attribute of `item.id` only if that id exists.
    async fn update_item_if_exists(&self, item: &Item) -> Result<ConditionalWrite, StoreError>;
}
