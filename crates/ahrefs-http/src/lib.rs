//! HTTP transport for the Ahrefs API v2 client.
//!
//! The client only needs one capability from the network layer: issue a batch
//! of GET/POST requests concurrently and report, for each of them, the body
//! and a [`RequestDiagnostic`] (URL, elapsed time, error). That capability is
//! the [`Transport`] trait; [`UreqTransport`] is the production
//! implementation.
//!
//! # Example
//!
//! ```no_run
//! use ahrefs_http::{HttpRequest, Transport, TransportOptions, UreqTransport};
//!
//! let transport = UreqTransport::new(TransportOptions::default())?;
//! let outcomes = transport.issue(vec![
//!     HttpRequest::get("http://apiv2.ahrefs.com/?from=subscription_info&token=XYZ"),
//! ])?;
//! for outcome in outcomes {
//!     println!("{} took {:.3}s", outcome.diagnostic.url, outcome.diagnostic.total_time_secs());
//! }
//! # Ok::<(), ahrefs_http::TransportError>(())
//! ```

pub mod error;
pub mod http_client;
pub mod transport;

pub use error::{Result, TransportError};
pub use http_client::TransportOptions;
pub use transport::{HttpRequest, RequestDiagnostic, RequestOutcome, Transport, UreqTransport};
