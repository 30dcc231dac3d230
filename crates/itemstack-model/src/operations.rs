//! Item API operation enum.

use std::fmt;

/// All operations the item API dispatches to a handler.
///
/// Preflight is answered by the HTTP layer itself and never reaches a
/// handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemOperation {
    /// `GET /items`
    ListItems,
    /// `GET /items/{id}`
    GetItem,
    /// `POST /items`
    CreateItem,
    /// `PUT /items/{id}`
    UpdateItem,
    /// `DELETE /items/{id}`
    DeleteItem,
    /// `OPTIONS /items[/{id}]`
    Preflight,
}

impl ItemOperation {
    /// Returns the operation name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListItems => "ListItems",
            Self::GetItem => "GetItem",
            Self::CreateItem => "CreateItem",
            Self::UpdateItem => "UpdateItem",
            Self::DeleteItem => "DeleteItem",
            Self::Preflight => "Preflight",
        }
    }

    /// Whether the operation decodes a request body.
    #[must_use]
    pub fn has_body(&self) -> bool {
        matches!(self, Self::CreateItem | Self::UpdateItem)
    }
}

impl fmt::Display for ItemOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
