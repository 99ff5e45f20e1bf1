use std::collections::HashMap;

use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use late_order_core::config::{require_setting, DDB_TABLE_NAME_ENV};
use late_order_core::order::LateOrder;
use late_order_core::window::{
    key_condition_expression, QueryWindow, LATE_ORDER_INDEX_NAME, PARTITION_PLACEHOLDER,
    SORT_END_PLACEHOLDER, SORT_START_PLACEHOLDER,
};

use crate::adapters::order_index::LateOrderIndex;

pub type Item = HashMap<String, AttributeValue>;

pub struct DynamoDbOrderIndex {
    pub table_name: Option<String>,
    pub client: aws_sdk_dynamodb::Client,
}

impl LateOrderIndex for DynamoDbOrderIndex {
    fn query_late_orders(&self, window: &QueryWindow) -> Result<Vec<LateOrder>, String> {
        let table_name = require_setting(self.table_name.as_deref(), DDB_TABLE_NAME_ENV)?;
        let table_name = table_name.to_string();
        let client = self.client.clone();
        let values = expression_values(window);

        let items = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let mut pages = client
                    .query()
                    .table_name(table_name.clone())
                    .index_name(LATE_ORDER_INDEX_NAME)
                    .key_condition_expression(key_condition_expression())
                    .set_expression_attribute_values(Some(values))
                    .into_paginator()
                    .items()
                    .send();

                let mut items = Vec::new();
                while let Some(item) = pages.next().await {
                    let item = item.map_err(|error| {
                        format!(
                            "failed to query late orders from {table_name}: {}",
                            DisplayErrorContext(&error)
                        )
                    })?;
                    items.push(item);
                }
                Ok::<_, String>(items)
            })
        })?;

        Ok(decode_orders(items))
    }
}

pub fn expression_values(window: &QueryWindow) -> Item {
    HashMap::from([
        (
            PARTITION_PLACEHOLDER.to_string(),
            AttributeValue::S(window.partition.clone()),
        ),
        (
            SORT_START_PLACEHOLDER.to_string(),
            AttributeValue::S(window.lower_bound.clone()),
        ),
        (
            SORT_END_PLACEHOLDER.to_string(),
            AttributeValue::S(window.upper_bound.clone()),
        ),
    ])
}

/// Decodes items one by one. An item that does not decode is logged and
/// skipped so the rest of the page is still reported.
pub fn decode_orders(items: Vec<Item>) -> Vec<LateOrder> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(position, item)| {
            let decoded: Result<LateOrder, _> = serde_dynamo::from_item(item);
            match decoded {
                Ok(order) => Some(order),
                Err(error) => {
                    tracing::warn!(
                        component = "late_order_monitor",
                        event = "order_decode_failed",
                        position,
                        error = %error,
                        "skipping undecodable order item"
                    );
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use aws_sdk_dynamodb::config::BehaviorVersion;
    use aws_sdk_dynamodb::primitives::Blob;
    use late_order_core::config::LateThreshold;
    use serde_json::json;

    use super::*;

    fn string_attr(value: &str) -> AttributeValue {
        AttributeValue::S(value.to_string())
    }

    fn alice_item() -> Item {
        HashMap::from([
            ("gsi1pk".to_string(), string_attr("order")),
            ("gsi1sk".to_string(), string_attr("OPEN#1699997300000")),
            ("createdBy".to_string(), string_attr("alice")),
            ("tableNumber".to_string(), AttributeValue::N("12".to_string())),
            (
                "items".to_string(),
                AttributeValue::L(vec![string_attr("burger"), string_attr("fries")]),
            ),
        ])
    }

    fn window() -> QueryWindow {
        let threshold = LateThreshold::from_minutes(30.0).expect("valid threshold");
        QueryWindow::at(1_700_000_000_000, threshold)
    }

    #[test]
    fn expression_values_bind_every_placeholder() {
        let values = expression_values(&window());

        assert_eq!(values.len(), 3);
        assert_eq!(values.get(":type"), Some(&string_attr("order")));
        assert_eq!(values.get(":sortStart"), Some(&string_attr("OPEN#0")));
        assert_eq!(
            values.get(":sortEnd"),
            Some(&string_attr("OPEN#1699998200000"))
        );
        let expression = key_condition_expression();
        for placeholder in values.keys() {
            assert!(expression.contains(placeholder.as_str()));
        }
    }

    #[test]
    fn decodes_items_in_returned_order() {
        let second: Item = HashMap::from([
            ("createdBy".to_string(), string_attr("bob")),
            ("tableNumber".to_string(), string_attr("4")),
            ("items".to_string(), string_attr("soup")),
        ]);

        let orders = decode_orders(vec![alice_item(), second]);

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].summary_line(), "alice: Table 12, order: burger,fries");
        assert_eq!(orders[0].items, Some(json!(["burger", "fries"])));
        assert_eq!(orders[1].summary_line(), "bob: Table 4, order: soup");
    }

    #[test]
    fn undecodable_item_is_skipped_without_losing_the_rest() {
        let binary_items: Item = HashMap::from([
            ("createdBy".to_string(), string_attr("mallory")),
            ("tableNumber".to_string(), AttributeValue::N("3".to_string())),
            (
                "items".to_string(),
                AttributeValue::B(Blob::new(vec![0xde, 0xad])),
            ),
        ]);

        let orders = decode_orders(vec![alice_item(), binary_items]);

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].summary_line(), "alice: Table 12, order: burger,fries");
    }

    #[test]
    fn null_attribute_decodes_as_present_null() {
        let item: Item = HashMap::from([
            ("createdBy".to_string(), AttributeValue::Null(true)),
            ("tableNumber".to_string(), AttributeValue::N("8".to_string())),
        ]);

        let orders = decode_orders(vec![item]);

        assert_eq!(orders[0].summary_line(), "null: Table 8, order: unknown");
    }

    #[test]
    fn empty_result_decodes_to_no_orders() {
        assert!(decode_orders(Vec::new()).is_empty());
    }

    #[test]
    fn missing_table_name_fails_the_query_before_any_request() {
        let config = aws_sdk_dynamodb::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .build();
        let index = DynamoDbOrderIndex {
            table_name: None,
            client: aws_sdk_dynamodb::Client::from_conf(config),
        };

        let error = index
            .query_late_orders(&window())
            .expect_err("query needs a table name");
        assert_eq!(error, "DDB_TABLE_NAME must be configured");
    }
}
