//! Fluent query builder and batch executor for the Ahrefs API v2.
//!
//! Queries are assembled with chained calls on an [`AhrefsClient`], checked
//! against the bundled [schema](ahrefs_schema::Schema), serialized into the
//! API's query-string dialect and sent either one at a time or as a
//! concurrent batch. Response bodies are returned as received.
//!
//! Every builder method also exists in `verb_noun` form through
//! [`AhrefsClient::call`], so `client.call("where_gt", ...)` and
//! `client.where_gt(...)` are the same operation.
//!
//! ```no_run
//! use ahrefs_api::{AhrefsClient, ClientConfig};
//!
//! # fn main() -> ahrefs_api::Result<()> {
//! let mut client = AhrefsClient::from_config(ClientConfig::load()?)?;
//! client
//!     .set_target("ahrefs.com")?
//!     .mode_domain()?
//!     .where_gt("date", "2013-11-24")?
//!     .prepare("refdomains_new_lost")?
//!     .prepare("ahrefs_rank")?;
//!
//! for (table, body) in client.run() {
//!     println!("{table}: {body}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod expr;
pub mod query;
pub mod value;

#[cfg(test)]
pub(crate) mod test_utils;

pub use client::{AhrefsClient, ClientBuilder, Dispatch};
pub use config::{ClientConfig, TransportSettings, DEFAULT_API_URL};
pub use dispatch::{Call, Command, Verb};
pub use error::{ApiError, Result};
pub use query::BatchResults;
pub use value::Value;
