//! Data-described payload validation.
//!
//! A schema is an ordered slice of [`FieldRule`]s. [`validate`] walks it in
//! order and reports the first field whose predicate fails, so the error a
//! client sees is deterministic.

use std::fmt;

use crate::item::ItemPayload;

/// One required-field rule: a field name and the predicate that must hold.
pub struct FieldRule<T> {
    pub name: &'static str,
    pub is_present: fn(&T) -> bool,
}

impl<T> fmt::Debug for FieldRule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRule").field("name", &self.name).finish()
    }
}

/// Every attribute of an item payload is required.
pub const ITEM_PAYLOAD_SCHEMA: &[FieldRule<ItemPayload>] = &[
    FieldRule {
        name: "description",
        is_present: |p| !p.description.is_empty(),
    },
    FieldRule {
        name: "location",
        is_present: |p| !p.location.is_empty(),
    },
    FieldRule {
        name: "quantity",
        is_present: |p| p.quantity != 0,
    },
];

/// The first schema field that failed its predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaViolation {
    pub field: &'static str,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing required field: {}", self.field)
    }
}

impl std::error::Error for SchemaViolation {}

/// Check `value` against `schema`, in schema order.
pub fn validate<T>(value: &T, schema: &[FieldRule<T>]) -> Result<(), SchemaViolation> {
    match schema.iter().find(|rule| !(rule.is_present)(value)) {
        Some(rule) => Err(SchemaViolation { field: rule.name }),
        None => Ok(()),
    }
}
