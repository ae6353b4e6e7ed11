//! Data models for the metadata engine.
//!
//! This module re-exports all model types used throughout the crate.

pub mod driver_type;
pub mod query;
pub mod table;

// Re-export commonly used types
pub use driver_type::DriverType;
pub use query::{DEFAULT_LIMIT_END, DEFAULT_LIMIT_START, QueryData, QueryOption};
pub use table::{Column, Schema, Table};
