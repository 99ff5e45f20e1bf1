pub mod dynamodb;
pub mod notifier;
pub mod order_index;
pub mod sns;
