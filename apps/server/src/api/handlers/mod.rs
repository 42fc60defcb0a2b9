//! Request handlers

pub mod metrics;
pub mod search;
