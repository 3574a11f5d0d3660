//! The query under construction.
//!
//! - [`state`]: [`QueryState`], the accumulated wire parameters and raw filters.
//! - [`validate`]: schema checks run before a query leaves the client.
//! - [`batch`]: [`PreparedBatch`] and [`BatchResults`] for deferred, batched execution.

pub mod batch;
pub mod state;
pub mod validate;

pub use batch::{BatchResults, PreparedBatch};
pub use state::{QueryParams, QueryState};
pub use validate::{check_required, Validator};
