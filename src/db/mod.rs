//! Database access for live introspection.
//!
//! - `pool`: sqlx connection pools per dialect
//! - `types`: row decoding into JSON objects
//! - `inspector`: runs a driver's query templates and parses the results into the model

pub mod inspector;
pub mod pool;
pub mod types;

pub use inspector::MetadataInspector;
pub use pool::DbPool;
pub use types::{JsonRow, RowToJson};
