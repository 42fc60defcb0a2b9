//! Cold-chain equipment inventory search
//!
//! Answers paged, sorted inventory searches restricted to the facilities and
//! programs a user holds a given right for:
//! - Per-user permission strings cached with ETag revalidation
//! - Scope resolution from permission strings
//! - Parameterized SQL search with a stable tiebreak ordering

#![allow(clippy::type_complexity)]

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod permissions;
pub mod request_context;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;
