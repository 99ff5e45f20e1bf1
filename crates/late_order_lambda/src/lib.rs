//! AWS-oriented adapters and handlers for the late-order monitor.
//!
//! This crate owns runtime integration details (the scheduled Lambda handler,
//! index query and topic publish adapters, and log setup). Threshold, window
//! and message rules come from `late_order_core`.

pub mod adapters;
pub mod handlers;
pub mod logging;
