//! Item API HTTP service layer for ItemStack.
//!
//! This crate turns HTTP requests into item operations and item results back
//! into HTTP responses:
//!
//! - **Router**: Maps method + path shape to an [`ItemOperation`](itemstack_model::ItemOperation)
//! - **Handler trait**: Defines the boundary between HTTP and the item store
//! - **Service**: Hyper `Service` implementation with CORS and preflight handling
//! - **Response helpers**: Envelope serialization, `Location`, and error formatting
#![allow(missing_docs)]

pub mod body;
pub mod dispatch;
pub mod response;
pub mod router;
pub mod service;

pub use body::ItemResponseBody;
pub use dispatch::{ItemHandler, NotImplementedHandler};
pub use router::{ItemRouter, RoutingContext};
pub use service::{ItemHttpConfig, ItemHttpService};
