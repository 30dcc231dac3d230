//! Model types for ItemStack.
//!
//! This crate holds everything that describes the item API independently of
//! transport and storage: the [`Item`] record and its request payload, the
//! uniform [`ResponseEnvelope`], the data-described validation schema, the
//! HTTP-facing error taxonomy, and the [`ItemOperation`] enum produced by
//! the router.
#![allow(clippy::module_name_repetitions)]
#![allow(missing_docs)]

pub mod envelope;
pub mod error;
pub mod item;
pub mod operations;
pub mod validation;

pub use envelope::ResponseEnvelope;
pub use error::{ItemError, ItemErrorCode};
pub use item::{Item, ItemPayload};
pub use operations::ItemOperation;
pub use validation::{FieldRule, ITEM_PAYLOAD_SCHEMA, SchemaViolation, validate};
