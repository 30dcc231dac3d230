//! The item record and its create/update payload.

use serde::{Deserialize, Deserializer, Serialize};

/// A persisted item.
///
/// `id` is assigned by the store client on insert and never changes; it is
/// also the table's partition key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub description: String,
    pub location: String,
    pub quantity: i64,
}

impl Item {
    /// Build a full item from an id and a payload.
    #[must_use]
    pub fn from_payload(id: impl Into<String>, payload: ItemPayload) -> Self {
        Self {
            id: id.into(),
            description: payload.description,
            location: payload.location,
            quantity: payload.quantity,
        }
    }
}

/// Body of `POST` and `PUT` requests: every item attribute except `id`.
///
/// Absent and `null` fields decode to their empty value so that a missing
/// field is reported by validation rather than by the JSON decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemPayload {
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(deserialize_with = "null_as_default")]
    pub quantity: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
