use late_order_core::config::LateThreshold;
use late_order_core::order::{format_late_orders, LateOrder, NOTIFICATION_SUBJECT};
use late_order_core::window::QueryWindow;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adapters::notifier::LateOrderNotifier;
use crate::adapters::order_index::LateOrderIndex;

const COMPONENT: &str = "late_order_monitor";
const MILLIS_PER_MINUTE: i64 = 60_000;

/// Failures the monitor logs and then moves past.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    #[error("query error: {0}")]
    Query(String),

    #[error("publish error: {0}")]
    Publish(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Skipped,
    Published,
    QueryFailed,
    PublishFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitorOutcome {
    pub window: QueryWindow,
    pub late_orders: usize,
    pub notification: NotificationStatus,
}

/// Looks up open orders older than `threshold` and publishes one summary
/// for all of them.
///
/// Query and publish failures are logged and swallowed, so this never fails.
pub fn detect_and_notify(
    threshold: LateThreshold,
    now_millis: i64,
    index: &impl LateOrderIndex,
    notifier: &impl LateOrderNotifier,
) -> MonitorOutcome {
    let window = QueryWindow::at(now_millis, threshold);

    let late_orders = match index.query_late_orders(&window) {
        Ok(orders) => orders,
        Err(message) => {
            let error = MonitorError::Query(message);
            tracing::error!(
                component = COMPONENT,
                event = "query_failed",
                upper_bound = %window.upper_bound,
                error = %error,
                "late order query failed"
            );
            return MonitorOutcome {
                window,
                late_orders: 0,
                notification: NotificationStatus::QueryFailed,
            };
        }
    };

    log_late_orders(&late_orders, now_millis);

    if late_orders.is_empty() {
        tracing::info!(
            component = COMPONENT,
            event = "notification_skipped",
            upper_bound = %window.upper_bound,
            "no late orders"
        );
        return MonitorOutcome {
            window,
            late_orders: 0,
            notification: NotificationStatus::Skipped,
        };
    }

    let message = format_late_orders(&late_orders);
    let notification = match notifier.publish(NOTIFICATION_SUBJECT, &message) {
        Ok(()) => {
            tracing::info!(
                component = COMPONENT,
                event = "notification_published",
                late_orders = late_orders.len(),
                "late order notification published"
            );
            NotificationStatus::Published
        }
        Err(message) => {
            let error = MonitorError::Publish(message);
            tracing::error!(
                component = COMPONENT,
                event = "publish_failed",
                late_orders = late_orders.len(),
                error = %error,
                "late order notification failed"
            );
            NotificationStatus::PublishFailed
        }
    };

    MonitorOutcome {
        window,
        late_orders: late_orders.len(),
        notification,
    }
}

fn log_late_orders(orders: &[LateOrder], now_millis: i64) {
    let lines: Vec<String> = orders.iter().map(LateOrder::summary_line).collect();
    let oldest_open_minutes = orders
        .iter()
        .filter_map(|order| order.open_for_millis(now_millis))
        .max()
        .map(|millis| millis / MILLIS_PER_MINUTE);
    tracing::info!(
        component = COMPONENT,
        event = "late_orders_found",
        count = orders.len(),
        oldest_open_minutes,
        orders = ?lines,
        "late orders found"
    );
}
