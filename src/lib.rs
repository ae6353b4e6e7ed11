//! DataStudio metadata drivers.
//!
//! Dialect-aware metadata layer for relational databases (MySQL, PostgreSQL, SQLite):
//! introspection query templates, a normalized table/column model, DDL / SELECT / preview
//! generation, column type normalization with Flink type mapping, and AST-based SQL rewriting
//! for tenant isolation and pagination.

pub mod commands;
pub mod config;
pub mod convert;
pub mod db;
pub mod driver;
pub mod error;
pub mod models;
pub mod query;
pub mod rewrite;

pub use config::Config;
pub use driver::{Driver, DriverRegistry};
pub use error::{MetadataError, MetadataResult};
