//! DynamoDB-backed item table.
//!
//! Items are stored one per row with `id` as the partition key:
//!
//! ```text
//! { "id": {"S": "..."}, "description": {"S": "..."},
//!   "location": {"S": "..."}, "quantity": {"N": "3"} }
//! ```
//!
//! Only key existence is used as a write condition. There is no version
//! attribute, so concurrent updates to the same id are last-writer-wins.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::BehaviorVersion;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use tracing::debug;

use itemstack_model::Item;

use super::{ConditionalWrite, ContinuationToken, ItemTable, ScanPage};
use crate::config::ItemStoreConfig;
use crate::error::StoreError;

const KEY_ATTRIBUTE: &str = "id";
const DESCRIPTION: &str = "description";
const LOCATION: &str = "location";
const QUANTITY: &str = "quantity";

/// Full-replacement update applied by [`DynamoDbTable::update_item_if_exists`].
const UPDATE_EXPRESSION: &str =
    "SET #description = :description, #location = :location, #quantity = :quantity";

/// Write only when the key already exists.
const EXISTS_CONDITION: &str = "attribute_exists(#id)";

type Attributes = HashMap<String, AttributeValue>;

/// Item table backed by a DynamoDB table.
#[derive(Debug, Clone)]
pub struct DynamoDbTable {
    client: Client,
    table_name: String,
}

impl DynamoDbTable {
    /// Wrap an existing SDK client.
    #[must_use]
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Build a client from the default AWS configuration chain, honoring the
    /// endpoint override in `config`.
    pub async fn connect(config: &ItemStoreConfig) -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config);
        if let Some(url) = &config.dynamodb_endpoint_url {
            builder = builder.endpoint_url(url);
        }
        Self::new(Client::from_conf(builder.build()), &config.table_name)
    }

    fn key(id: &str) -> Attributes {
        HashMap::from([(KEY_ATTRIBUTE.to_owned(), AttributeValue::S(id.to_owned()))])
    }
}

#[async_trait]
impl ItemTable for DynamoDbTable {
    fn name(&self) -> &str {
        &self.table_name
    }

    async fn get_item(&self, id: &str) -> Result<Option<Item>, StoreError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key(id)))
            .send()
            .await
            .map_err(|e| StoreError::backend("GetItem", DisplayErrorContext(&e).to_string(), e))?;

        output.item().map(item_from_attributes).transpose()
    }

    async fn scan_page(
        &self,
        start: Option<&ContinuationToken>,
        limit: Option<u32>,
    ) -> Result<ScanPage, StoreError> {
        let output = self
            .client
            .scan()
            .table_name(&self.table_name)
            .set_exclusive_start_key(start.map(|token| Self::key(token.as_str())))
            .set_limit(limit.and_then(|l| i32::try_from(l).ok()))
            .send()
            .await
            .map_err(|e| StoreError::backend("Scan", DisplayErrorContext(&e).to_string(), e))?;

        let items = output
            .items()
            .iter()
            .map(item_from_attributes)
            .collect::<Result<Vec<_>, _>>()?;
        let next = output
            .last_evaluated_key()
            .map(token_from_key)
            .transpose()?;

        debug!(
            table = %self.table_name,
            count = items.len(),
            has_more = next.is_some(),
            "scanned DynamoDB page",
        );
        Ok(ScanPage { items, next })
    }

    async fn put_item(&self, item: &Item) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item_to_attributes(item)))
            .send()
            .await
            .map_err(|e| StoreError::backend("PutItem", DisplayErrorContext(&e).to_string(), e))?;
        Ok(())
    }

    async fn delete_item(&self, id: &str) -> Result<Option<Item>, StoreError> {
        let output = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key(id)))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| {
                StoreError::backend("DeleteItem", DisplayErrorContext(&e).to_string(), e)
            })?;

        output.attributes().map(item_from_attributes).transpose()
    }

    async fn update_item_if_exists(&self, item: &Item) -> Result<ConditionalWrite, StoreError> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key(&item.id)))
            .update_expression(UPDATE_EXPRESSION)
            .condition_expression(EXISTS_CONDITION)
            .expression_attribute_names("#id", KEY_ATTRIBUTE)
            .expression_attribute_names("#description", DESCRIPTION)
            .expression_attribute_names("#location", LOCATION)
            .expression_attribute_names("#quantity", QUANTITY)
            .expression_attribute_values(
                ":description",
                AttributeValue::S(item.description.clone()),
            )
            .expression_attribute_values(":location", AttributeValue::S(item.location.clone()))
            .expression_attribute_values(":quantity", AttributeValue::N(item.quantity.to_string()))
            .return_values(ReturnValue::AllNew)
            .send()
            .await;

        match result {
            Ok(output) => {
                let stored = output
                    .attributes()
                    .map(item_from_attributes)
                    .transpose()?
                    .unwrap_or_else(|| item.clone());
                Ok(ConditionalWrite::Applied(stored))
            }
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception()) =>
            {
                Ok(ConditionalWrite::ConditionFailed)
            }
            Err(e) => Err(StoreError::backend(
                "UpdateItem",
                DisplayErrorContext(&e).to_string(),
                e,
            )),
        }
    }
}

/// Encode an item as DynamoDB attributes.
fn item_to_attributes(item: &Item) -> Attributes {
    HashMap::from([
        (KEY_ATTRIBUTE.to_owned(), AttributeValue::S(item.id.clone())),
        (DESCRIPTION.to_owned(), AttributeValue::S(item.description.clone())),
        (LOCATION.to_owned(), AttributeValue::S(item.location.clone())),
        (QUANTITY.to_owned(), AttributeValue::N(item.quantity.to_string())),
    ])
}

/// Decode DynamoDB attributes into an item.
///
/// The key must be present. Other absent attributes decode to their empty
/// value; present attributes of the wrong type are rejected.
fn item_from_attributes(attrs: &Attributes) -> Result<Item, StoreError> {
    let id = match attrs.get(KEY_ATTRIBUTE) {
        Some(AttributeValue::S(id)) if !id.is_empty() => id.clone(),
        _ => {
            return Err(StoreError::MalformedItem(format!(
                "missing string key attribute '{KEY_ATTRIBUTE}'"
            )));
        }
    };

    Ok(Item {
        description: string_attribute(attrs, DESCRIPTION, &id)?,
        location: string_attribute(attrs, LOCATION, &id)?,
        quantity: number_attribute(attrs, QUANTITY, &id)?,
        id,
    })
}

fn string_attribute(attrs: &Attributes, name: &str, id: &str) -> Result<String, StoreError> {
    match attrs.get(name) {
        None => Ok(String::new()),
        Some(AttributeValue::S(s)) => Ok(s.clone()),
        Some(_) => Err(StoreError::MalformedItem(format!(
            "item {id}: attribute '{name}' is not a string"
        ))),
    }
}

fn number_attribute(attrs: &Attributes, name: &str, id: &str) -> Result<i64, StoreError> {
    match attrs.get(name) {
        None => Ok(0),
        Some(AttributeValue::N(n)) => n.parse().map_err(|_| {
            StoreError::MalformedItem(format!(
                "item {id}: attribute '{name}' is not an integer: {n}"
            ))
        }),
        Some(_) => Err(StoreError::MalformedItem(format!(
            "item {id}: attribute '{name}' is not a number"
        ))),
    }
}

/// Turn a `LastEvaluatedKey` into a continuation token.
fn token_from_key(key: &Attributes) -> Result<ContinuationToken, StoreError> {
    match key.get(KEY_ATTRIBUTE) {
        Some(AttributeValue::S(id)) => Ok(ContinuationToken::new(id.clone())),
        _ => Err(StoreError::MalformedItem(format!(
            "LastEvaluatedKey without string '{KEY_ATTRIBUTE}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Item {
        Item {
            id: "0b7c".to_owned(),
            description: "box".to_owned(),
            location: "A1".to_owned(),
            quantity: 3,
        }
    }

    #[test]
    fn test_should_encode_quantity_as_number() {
        let attrs = item_to_attributes(&sample());
        assert_eq!(attrs.get(QUANTITY), Some(&AttributeValue::N("3".to_owned())));
        assert_eq!(attrs.get(KEY_ATTRIBUTE), Some(&AttributeValue::S("0b7c".to_owned())));
    }

    #[test]
    fn test_should_decode_encoded_item() {
        let decoded = item_from_attributes(&item_to_attributes(&sample())).unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn test_should_default_missing_non_key_attributes() {
        let attrs = DynamoDbTable::key("0b7c");
        let decoded = item_from_attributes(&attrs).unwrap();
        assert_eq!(decoded.id, "0b7c");
        assert!(decoded.description.is_empty());
        assert_eq!(decoded.quantity, 0);
    }

    #[test]
    fn test_should_reject_missing_key() {
        let mut attrs = item_to_attributes(&sample());
        attrs.remove(KEY_ATTRIBUTE);
        assert!(matches!(
            item_from_attributes(&attrs),
            Err(StoreError::MalformedItem(_))
        ));
    }

    #[test]
    fn test_should_reject_mistyped_attributes() {
        let mut attrs = item_to_attributes(&sample());
        attrs.insert(QUANTITY.to_owned(), AttributeValue::S("3".to_owned()));
        assert!(item_from_attributes(&attrs).is_err());

        let mut attrs = item_to_attributes(&sample());
        attrs.insert(QUANTITY.to_owned(), AttributeValue::N("3.5".to_owned()));
        assert!(item_from_attributes(&attrs).is_err());

        let mut attrs = item_to_attributes(&sample());
        attrs.insert(LOCATION.to_owned(), AttributeValue::Bool(true));
        assert!(item_from_attributes(&attrs).is_err());
    }

    #[test]
    fn test_should_read_token_from_last_evaluated_key() {
        let token = token_from_key(&DynamoDbTable::key("42")).unwrap();
        assert_eq!(token.as_str(), "42");
        assert!(token_from_key(&HashMap::new()).is_err());
    }
}
