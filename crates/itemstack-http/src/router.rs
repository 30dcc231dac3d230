//! Item request router.
//!
//! The item API exposes a single resource collection, by default `/items`,
//! and its members `/items/{id}`. An operation is identified from the HTTP
//! method and whether the path carries an id segment:
//!
//! ```text
//! GET     /items        -> ListItems
//! GET     /items/{id}   -> GetItem
//! POST    /items        -> CreateItem
//! PUT     /items/{id}   -> UpdateItem
//! DELETE  /items/{id}   -> DeleteItem
//! OPTIONS /items[/{id}] -> Preflight
//! ```
//!
//! Unsupported methods are rejected before the path is looked at, so they
//! always yield 405.

use http::Method;
use percent_encoding::percent_decode_str;

use itemstack_model::error::ItemError;
use itemstack_model::operations::ItemOperation;

/// Resolves requests against the configured resource path.
#[derive(Debug, Clone)]
pub struct ItemRouter {
    /// Resource path without leading or trailing slashes (e.g. `items`).
    resource: String,
}

/// The result of routing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingContext {
    /// The identified operation.
    pub operation: ItemOperation,
    /// The percent-decoded id path parameter, if the path had one.
    pub id: Option<String>,
}

impl ItemRouter {
    /// Create a router for the given resource path.
    #[must_use]
    pub fn new(resource: &str) -> Self {
        Self {
            resource: resource.trim_matches('/').to_owned(),
        }
    }

    /// The resource path without surrounding slashes.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Resolve a method and URI path to a routing context.
    ///
    /// # Errors
    ///
    /// Returns `MethodNotAllowed` for methods outside the item API and
    /// `RouteNotFound` for paths outside the resource.
    pub fn resolve(&self, method: &Method, path: &str) -> Result<RoutingContext, ItemError> {
        let operation = match *method {
            Method::GET => ItemOperation::ListItems,
            Method::POST => ItemOperation::CreateItem,
            Method::PUT => ItemOperation::UpdateItem,
            Method::DELETE => ItemOperation::DeleteItem,
            Method::OPTIONS => ItemOperation::Preflight,
            _ => return Err(ItemError::method_not_allowed(method)),
        };

        let id = self
            .parse_path(path)
            .ok_or_else(|| ItemError::route_not_found(path))?;

        let operation = match (operation, &id) {
            (ItemOperation::ListItems, Some(_)) => ItemOperation::GetItem,
            (op, _) => op,
        };

        Ok(RoutingContext { operation, id })
    }

    /// Split a path into the optional id segment.
    ///
    /// Returns `None` when the path does not address the resource at all,
    /// `Some(None)` for the collection, and `Some(Some(id))` for a member.
    fn parse_path(&self, path: &str) -> Option<Option<String>> {
        let rest = path
            .strip_prefix('/')?
            .strip_prefix(self.resource.as_str())?
            .trim_end_matches('/');

        if rest.is_empty() {
            return Some(None);
        }

        let segment = rest.strip_prefix('/')?;
        if segment.contains('/') {
            return None;
        }

        let id = percent_decode_str(segment).decode_utf8().ok()?;
        Some(Some(id.into_owned()))
    }
}
