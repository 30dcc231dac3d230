//! Item store business logic for ItemStack.
//!
//! - [`table`]: the [`ItemTable`](table::ItemTable) seam with DynamoDB and
//!   in-memory implementations
//! - [`client`]: item operations with pagination and deadlines on top of a table
//! - [`handler`]: the [`ItemHandler`](itemstack_http::ItemHandler) that maps
//!   routed requests to client calls and client results to responses
//! - [`config`]: environment-driven configuration
#![allow(missing_docs, clippy::doc_markdown, clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod table;

pub use client::{ItemStoreClient, Lookup};
pub use config::{ItemStoreConfig, StoreBackend};
pub use error::StoreError;
pub use handler::ItemStoreHandler;
