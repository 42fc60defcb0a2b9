//! Route tables

pub mod inventory;
pub mod metrics;
