//! Item store client.
//!
//! [`ItemStoreClient`] implements every item operation on top of an
//! [`ItemTable`]. Operations addressed at one id return
//! `Result<Lookup<T>, StoreError>`: the three outcomes are found, not found,
//! and failed, and callers match on them exhaustively. Insert and list can
//! only succeed or fail.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use itemstack_model::{Item, ItemPayload};

use crate::config::ItemStoreConfig;
use crate::error::StoreError;
use crate::table::{ConditionalWrite, ContinuationToken, ItemTable};

/// Outcome of a store operation addressed at one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The item existed.
    Found(T),
    /// No item exists with the requested id.
    NotFound,
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::NotFound, Self::Found)
    }
}

/// Store client owning the table handle and the per-operation limits.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
#[derive(Debug)]
pub struct ItemStoreClient {
    table: Arc<dyn ItemTable>,
    scan_page_size: Option<u32>,
    max_scan_pages: usize,
    request_timeout: Duration,
}

impl ItemStoreClient {
    /// Create a client over `table` with limits taken from `config`.
    #[must_use]
    pub fn new(table: Arc<dyn ItemTable>, config: &ItemStoreConfig) -> Self {
        Self {
            table,
            scan_page_size: config.scan_page_size,
            max_scan_pages: config.max_scan_pages.max(1),
            request_timeout: config.request_timeout,
        }
    }

    /// Fetch one item by id.
    pub async fn get(&self, id: &str) -> Result<Lookup<Item>, StoreError> {
        let found = self
            .with_deadline("GetItem", self.table.get_item(id))
            .await?;
        debug!(table = self.table.name(), id, found = found.is_some(), "get item");
        Ok(found.into())
    }

    /// Enumerate every item, following continuation tokens until the store
    /// reports no more pages.
    ///
    /// Items are returned in store order. A failure on any page discards the
    /// pages already fetched.
    pub async fn list(&self) -> Result<Vec<Item>, StoreError> {
        self.with_deadline("Scan", self.scan_all()).await
    }

    async fn scan_all(&self) -> Result<Vec<Item>, StoreError> {
        let mut items = Vec::new();
        let mut token: Option<ContinuationToken> = None;

        for page_index in 0..self.max_scan_pages {
            let page = self
                .table
                .scan_page(token.as_ref(), self.scan_page_size)
                .await?;
            items.extend(page.items);

            match page.next.filter(|next| !next.is_empty()) {
                None => {
                    debug!(
                        table = self.table.name(),
                        pages = page_index + 1,
                        count = items.len(),
                        "listed items",
                    );
                    return Ok(items);
                }
                Some(next) if token.as_ref() == Some(&next) => {
                    return Err(StoreError::StalledPagination {
                        token: next.into_string(),
                    });
                }
                Some(next) => token = Some(next),
            }
        }

        Err(StoreError::PaginationLimitExceeded {
            max_pages: self.max_scan_pages,
        })
    }

    /// Store a new item under a freshly generated id and return it.
    pub async fn insert(&self, payload: ItemPayload) -> Result<Item, StoreError> {
        let item = Item::from_payload(uuid::Uuid::new_v4().to_string(), payload);
        self.with_deadline("PutItem", self.table.put_item(&item))
            .await?;
        info!(table = self.table.name(), id = %item.id, "created item");
        Ok(item)
    }

    /// Remove an item, returning the value it held.
    pub async fn delete(&self, id: &str) -> Result<Lookup<Item>, StoreError> {
        let removed = self
            .with_deadline("DeleteItem", self.table.delete_item(id))
            .await?;
        if removed.is_some() {
            info!(table = self.table.name(), id, "deleted item");
        } else {
            debug!(table = self.table.name(), id, "delete of missing item");
        }
        Ok(removed.into())
    }

    /// Replace the attributes of an existing item.
    ///
    /// Nothing is written when no item has `id`.
    pub async fn update(
        &self,
        id: &str,
        payload: ItemPayload,
    ) -> Result<Lookup<Item>, StoreError> {
        let item = Item::from_payload(id, payload);
        let write = self
            .with_deadline("UpdateItem", self.table.update_item_if_exists(&item))
            .await?;
        match write {
            ConditionalWrite::Applied(stored) => {
                info!(table = self.table.name(), id, "updated item");
                Ok(Lookup::Found(stored))
            }
            ConditionalWrite::ConditionFailed => {
                debug!(table = self.table.name(), id, "update of missing item");
                Ok(Lookup::NotFound)
            }
        }
    }

    async fn with_deadline<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.request_timeout, fut)
            .await
            .map_err(|_| StoreError::Timeout {
                operation,
                timeout: self.request_timeout,
            })?
    }
}
