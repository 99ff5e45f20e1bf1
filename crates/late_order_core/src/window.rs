use serde::Serialize;

use crate::config::LateThreshold;
use crate::order::OrderSortKey;

pub const LATE_ORDER_INDEX_NAME: &str = "gsi1pk-gsi1sk-index";
pub const PARTITION_KEY_ATTRIBUTE: &str = "gsi1pk";
pub const SORT_KEY_ATTRIBUTE: &str = "gsi1sk";
pub const ORDER_PARTITION_VALUE: &str = "order";
pub const OPEN_STATUS: &str = "OPEN";

pub const PARTITION_PLACEHOLDER: &str = ":type";
pub const SORT_START_PLACEHOLDER: &str = ":sortStart";
pub const SORT_END_PLACEHOLDER: &str = ":sortEnd";

/// Partition equality plus an inclusive sort-key range, bound through the
/// placeholders above.
pub fn key_condition_expression() -> String {
    format!(
        "{PARTITION_KEY_ATTRIBUTE} = {PARTITION_PLACEHOLDER} and \
         {SORT_KEY_ATTRIBUTE} between {SORT_START_PLACEHOLDER} and {SORT_END_PLACEHOLDER}"
    )
}

/// Newest creation time (epoch millis) an open order can have and still be late.
///
/// Clamped at zero so the window never inverts when the threshold reaches
/// back past the epoch.
pub fn late_threshold_millis(now_millis: i64, threshold: LateThreshold) -> i64 {
    now_millis.saturating_sub(threshold.millis()).max(0)
}

/// Sort-key range covering every open order created at or before the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryWindow {
    pub partition: String,
    pub lower_bound: String,
    pub upper_bound: String,
    pub threshold_millis: i64,
}

impl QueryWindow {
    pub fn at(now_millis: i64, threshold: LateThreshold) -> Self {
        let threshold_millis = late_threshold_millis(now_millis, threshold);
        Self {
            partition: ORDER_PARTITION_VALUE.to_string(),
            lower_bound: OrderSortKey::open(0).to_string(),
            upper_bound: OrderSortKey::open(threshold_millis).to_string(),
            threshold_millis,
        }
    }

    /// Key condition as DynamoDB evaluates it: string equality on the
    /// partition and an inclusive, byte-wise `BETWEEN` on the sort key.
    pub fn matches(&self, partition: &str, sort_key: &str) -> bool {
        partition == self.partition
            && sort_key >= self.lower_bound.as_str()
            && sort_key <= self.upper_bound.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;
    const MINUTE: i64 = 60_000;

    fn thirty_minutes() -> LateThreshold {
        LateThreshold::from_minutes(30.0).expect("valid threshold")
    }

    #[test]
    fn key_condition_targets_index_attributes() {
        assert_eq!(
            key_condition_expression(),
            "gsi1pk = :type and gsi1sk between :sortStart and :sortEnd"
        );
    }

    #[test]
    fn upper_bound_is_now_minus_threshold() {
        let window = QueryWindow::at(NOW, thirty_minutes());

        assert_eq!(window.threshold_millis, NOW - 30 * MINUTE);
        assert_eq!(window.upper_bound, format!("OPEN#{}", NOW - 30 * MINUTE));
        assert_eq!(window.lower_bound, "OPEN#0");
        assert_eq!(window.partition, "order");
    }

    #[test]
    fn lower_bound_does_not_depend_on_inputs() {
        let zero = LateThreshold::from_minutes(0.0).expect("valid threshold");
        assert_eq!(QueryWindow::at(NOW, zero).lower_bound, "OPEN#0");
        assert_eq!(QueryWindow::at(42, thirty_minutes()).lower_bound, "OPEN#0");
    }

    #[test]
    fn threshold_past_the_epoch_clamps_to_zero() {
        let window = QueryWindow::at(10 * MINUTE, thirty_minutes());
        assert_eq!(window.threshold_millis, 0);
        assert_eq!(window.upper_bound, "OPEN#0");
    }

    #[test]
    fn window_selects_only_old_open_orders() {
        let window = QueryWindow::at(NOW, thirty_minutes());
        let old_open = OrderSortKey::open(NOW - 45 * MINUTE).to_string();
        let fresh_open = OrderSortKey::open(NOW - 10 * MINUTE).to_string();
        let old_closed = format!("CLOSED#{}", NOW - 45 * MINUTE);

        assert!(window.matches("order", &old_open));
        assert!(!window.matches("order", &fresh_open));
        assert!(!window.matches("order", &old_closed));
        assert!(!window.matches("table", &old_open));
    }

    #[test]
    fn order_created_exactly_at_threshold_is_late() {
        let window = QueryWindow::at(NOW, thirty_minutes());
        let boundary = OrderSortKey::open(NOW - 30 * MINUTE).to_string();
        assert!(window.matches("order", &boundary));
    }
}
