//! Schema registry for the Ahrefs API v2 client.
//!
//! Describes which tables exist, which columns each table exposes and where
//! they may be used (`select`, `where`, `having`), together with the
//! operation table the client's dispatcher checks `verb_noun` calls against.
//!
//! # Example
//!
//! ```
//! let schema = ahrefs_schema::builtin();
//!
//! let column = schema.column("refdomains_new_lost", "type").unwrap();
//! assert!(!column.usable_in_where);
//! assert!(column.usable_in_having);
//! ```

pub mod builtin;
pub mod error;
pub mod schema;

pub use builtin::{builtin, BUNDLED_SCHEMA, SUBSCRIPTION_INFO};
pub use error::{Result, SchemaError};
pub use schema::{ColumnSpec, Schema, TableSchema, ValueType};
