//! In-process item table.

use std::collections::BTreeMap;
use std::ops::Bound;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use itemstack_model::Item;

use super::{ConditionalWrite, ContinuationToken, ItemTable, ScanPage};
use crate::error::StoreError;

/// Default number of items returned per scan page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// In-memory table ordered by id.
///
/// Scans page through the ids in ascending order, using the last id of a
/// page as its continuation token, so enumeration exercises the same
/// pagination loop as a remote store.
#[derive(Debug)]
pub struct MemoryTable {
    name: String,
    items: RwLock<BTreeMap<String, Item>>,
    page_size: usize,
}

impl MemoryTable {
    /// Create an empty table with the default page size.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_page_size(name, DEFAULT_PAGE_SIZE)
    }

    /// Create an empty table returning at most `page_size` items per scan.
    #[must_use]
    pub fn with_page_size(name: impl Into<String>, page_size: usize) -> Self {
        Self {
            name: name.into(),
            items: RwLock::new(BTreeMap::new()),
            page_size: page_size.max(1),
        }
    }

    /// Number of stored items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Whether the table holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

#[async_trait]
impl ItemTable for MemoryTable {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_item(&self, id: &str) -> Result<Option<Item>, StoreError> {
        Ok(self.items.read().get(id).cloned())
    }

    async fn scan_page(
        &self,
        start: Option<&ContinuationToken>,
        limit: Option<u32>,
    ) -> Result<ScanPage, StoreError> {
        let page_size = limit
            .and_then(|l| usize::try_from(l).ok())
            .map_or(self.page_size, |l| l.clamp(1, self.page_size));

        let lower = match start {
            Some(token) => Bound::Excluded(token.as_str()),
            None => Bound::Unbounded,
        };

        let items = self.items.read();
        let mut remaining = items.range::<str, _>((lower, Bound::Unbounded));
        let page: Vec<Item> = remaining.by_ref().take(page_size).map(|(_, v)| v.clone()).collect();
        let has_more = remaining.next().is_some();

        let next = if has_more {
            page.last().map(|item| ContinuationToken::new(item.id.clone()))
        } else {
            None
        };

        debug!(count = page.len(), has_more, "scanned memory table page");
        Ok(ScanPage { items: page, next })
    }

    async fn put_item(&self, item: &Item) -> Result<(), StoreError> {
        let replaced = self
            .items
            .write()
            .insert(item.id.clone(), item.clone())
            .is_some();
        debug!(id = %item.id, replaced, "put item");
        Ok(())
    }

    async fn delete_item(&self, id: &str) -> Result<Option<Item>, StoreError> {
        Ok(self.items.write().remove(id))
    }

    async fn update_item_if_exists(&self, item: &Item) -> Result<ConditionalWrite, StoreError> {
        let mut items = self.items.write();
        match items.get_mut(&item.id) {
            Some(stored) => {
                stored.clone_from(item);
                Ok(ConditionalWrite::Applied(stored.clone()))
            }
            None => Ok(ConditionalWrite::ConditionFailed),
        }
    }
}
