use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::window::OPEN_STATUS;

pub const NOTIFICATION_SUBJECT: &str = "One or more orders are running late";

const MISSING_ATTRIBUTE: &str = "unknown";

/// `STATUS#createdAtMillis`, the layout of the `gsi1sk` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSortKey {
    pub status: String,
    pub created_at_millis: i64,
}

impl OrderSortKey {
    pub fn open(created_at_millis: i64) -> Self {
        Self {
            status: OPEN_STATUS.to_string(),
            created_at_millis,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let (status, millis) = raw.split_once('#')?;
        if status.is_empty() {
            return None;
        }
        Some(Self {
            status: status.to_string(),
            created_at_millis: millis.parse().ok()?,
        })
    }
}

impl fmt::Display for OrderSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.status, self.created_at_millis)
    }
}

/// An order item as returned by the late-order index. Only the attributes
/// the notification needs are decoded; anything else on the item is ignored.
///
/// `None` means the attribute was absent; a DynamoDB `NULL` decodes to
/// `Some(Value::Null)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LateOrder {
    #[serde(rename = "createdBy", default, deserialize_with = "present")]
    pub created_by: Option<Value>,
    #[serde(rename = "tableNumber", default, deserialize_with = "present")]
    pub table_number: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub items: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gsi1sk: Option<String>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl LateOrder {
    pub fn summary_line(&self) -> String {
        format!(
            "{}: Table {}, order: {}",
            render_field(self.created_by.as_ref()),
            render_field(self.table_number.as_ref()),
            render_field(self.items.as_ref()),
        )
    }

    pub fn sort_key(&self) -> Option<OrderSortKey> {
        self.gsi1sk.as_deref().and_then(OrderSortKey::parse)
    }

    /// Milliseconds the order has been open at `now_millis`, when its sort
    /// key carries a creation time.
    pub fn open_for_millis(&self, now_millis: i64) -> Option<i64> {
        self.sort_key()
            .map(|key| now_millis.saturating_sub(key.created_at_millis))
    }
}

fn render_field(value: Option<&Value>) -> String {
    value.map_or_else(|| MISSING_ATTRIBUTE.to_string(), render_attribute)
}

/// Renders an attribute value the way it reads in a plain-text message.
pub fn render_attribute(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => render_number(number),
        Value::Array(values) => values
            .iter()
            .map(render_list_element)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

fn render_list_element(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => render_attribute(other),
    }
}

fn render_number(number: &serde_json::Number) -> String {
    match number.as_f64() {
        Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() < 1e15 => {
            (float as i64).to_string()
        }
        _ => number.to_string(),
    }
}

/// One summary line per order, in the order given.
pub fn format_late_orders(orders: &[LateOrder]) -> String {
    orders
        .iter()
        .map(LateOrder::summary_line)
        .collect::<Vec<_>>()
        .join("\n")
}
