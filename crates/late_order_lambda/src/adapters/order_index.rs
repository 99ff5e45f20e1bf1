use late_order_core::order::LateOrder;
use late_order_core::window::QueryWindow;

pub trait LateOrderIndex {
    fn query_late_orders(&self, window: &QueryWindow) -> Result<Vec<LateOrder>, String>;
}
