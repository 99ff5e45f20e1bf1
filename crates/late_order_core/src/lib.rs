//! Late-order detection domain primitives.
//!
//! This crate owns the threshold arithmetic, the index query window, order
//! record decoding and notification formatting. It intentionally excludes
//! AWS SDK and Lambda runtime concerns; those live in `late_order_lambda`.

pub mod config;
pub mod order;
pub mod window;
