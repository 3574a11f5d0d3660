//! The transport capability and its ureq-backed implementation.
//!
//! A [`Transport`] takes a batch of requests, issues all of them without
//! waiting for earlier ones to finish, and hands back one
//! [`RequestOutcome`] per request once every request has settled. A failing
//! request never affects its siblings.

use std::{
    io::ErrorKind,
    time::{Duration, Instant},
};

use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use tracing::{debug, warn};
use ureq::{http::header::CONTENT_TYPE, Agent};

use crate::{
    error::{Result, TransportError},
    http_client::TransportOptions,
};

/// Upper bound on a single response body.
const MAX_BODY_SIZE: u64 = 512 * 1024 * 1024;

/// A single API call: GET, or POST when a body is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: None,
        }
    }

    /// A POST carrying `body` as `text/plain`.
    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: Some(body.into()),
        }
    }

    pub fn is_post(&self) -> bool {
        self.body.is_some()
    }
}

/// What is known about one request after it settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDiagnostic {
    pub url: String,
    pub total_time: Duration,
    /// HTTP status, when a response was received.
    pub status: Option<u16>,
    /// Transport failure (connect, timeout, protocol), if any.
    pub error: Option<String>,
}

impl RequestDiagnostic {
    pub fn total_time_secs(&self) -> f64 {
        self.total_time.as_secs_f64()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Body (when the request completed) plus diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    pub body: Option<String>,
    pub diagnostic: RequestDiagnostic,
}

impl RequestOutcome {
    pub fn completed(
        url: impl Into<String>,
        total_time: Duration,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        Self {
            body: Some(body.into()),
            diagnostic: RequestDiagnostic {
                url: url.into(),
                total_time,
                status: Some(status),
                error: None,
            },
        }
    }

    pub fn failed(url: impl Into<String>, total_time: Duration, error: impl Into<String>) -> Self {
        Self {
            body: None,
            diagnostic: RequestDiagnostic {
                url: url.into(),
                total_time,
                status: None,
                error: Some(error.into()),
            },
        }
    }
}

/// Anything that can issue a batch of requests concurrently and settle all of them.
///
/// Implementations return exactly one outcome per request, in request order.
/// `Err` is reserved for failures that prevent the whole batch from being
/// issued at all.
pub trait Transport: Send + Sync {
    fn issue(&self, requests: Vec<HttpRequest>) -> Result<Vec<RequestOutcome>>;
}

/// Production transport: a blocking ureq agent with each request of a batch
/// running on its own worker of a private tokio blocking pool.
///
/// `issue` blocks the calling thread until the batch settles. Inside a
/// multi-threaded tokio runtime the wait goes through `block_in_place`; inside
/// a current-thread runtime blocking is not possible and the batch fails with
/// [`TransportError::Batch`].
pub struct UreqTransport {
    agent: Agent,
    options: TransportOptions,
    runtime: Option<Runtime>,
}

impl UreqTransport {
    pub fn new(options: TransportOptions) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("ahrefs-http")
            .enable_all()
            .build()
            .map_err(TransportError::Runtime)?;

        Ok(Self {
            agent: options.build(),
            options,
            runtime: Some(runtime),
        })
    }

    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    fn settle(&self, runtime: &Runtime, requests: Vec<HttpRequest>) -> Vec<Sent> {
        let handles = requests
            .into_iter()
            .map(|request| {
                let agent = self.agent.clone();
                let low_speed_time = self.options.low_speed_time;
                let url = request.url.clone();
                let handle = runtime.spawn_blocking(move || send(&agent, low_speed_time, request));
                (url, handle)
            })
            .collect::<Vec<_>>();

        runtime.block_on(async move {
            let mut settled = Vec::with_capacity(handles.len());
            for (url, handle) in handles {
                let sent = match handle.await {
                    Ok(sent) => sent,
                    Err(err) => {
                        Sent {
                            outcome: RequestOutcome::failed(url, Duration::ZERO, err.to_string()),
                            unreachable: false,
                        }
                    }
                };
                settled.push(sent);
            }
            settled
        })
    }
}

impl Transport for UreqTransport {
    fn issue(&self, requests: Vec<HttpRequest>) -> Result<Vec<RequestOutcome>> {
        debug!(count = requests.len(), "issuing requests");
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let Some(runtime) = &self.runtime else {
            return Err(TransportError::Batch("transport runtime is shut down".into()));
        };

        let settled = match Handle::try_current() {
            Err(_) => self.settle(runtime, requests),
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| self.settle(runtime, requests))
            }
            Ok(_) => {
                return Err(TransportError::Batch(
                    "cannot block inside a current-thread tokio runtime".into(),
                ));
            }
        };

        if settled.iter().all(|sent| sent.unreachable) {
            let reason = settled
                .into_iter()
                .find_map(|sent| sent.outcome.diagnostic.error)
                .unwrap_or_default();
            warn!("no request of the batch reached the server: {}", reason);
            return Err(TransportError::Batch(reason));
        }

        Ok(settled.into_iter().map(|sent| sent.outcome).collect())
    }
}

impl Drop for UreqTransport {
    fn drop(&mut self) {
        // Blocking shutdown panics inside an async context.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// One settled request, plus whether it failed before reaching the server.
struct Sent {
    outcome: RequestOutcome,
    unreachable: bool,
}

fn send(agent: &Agent, low_speed_time: Duration, request: HttpRequest) -> Sent {
    let started = Instant::now();

    let response = match &request.body {
        Some(body) => agent
            .post(request.url.as_str())
            .header(CONTENT_TYPE, "text/plain")
            .config()
            .timeout_recv_body(Some(low_speed_time))
            .build()
            .send(body.as_str()),
        None => agent.get(request.url.as_str()).call(),
    };

    let result = response.and_then(|mut response| {
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_SIZE)
            .read_to_string()?;
        Ok((status, body))
    });

    let elapsed = started.elapsed();
    match result {
        Ok((status, body)) => {
            debug!(url = request.url.as_str(), status, "request completed");
            Sent {
                outcome: RequestOutcome::completed(request.url, elapsed, status, body),
                unreachable: false,
            }
        }
        Err(err) => {
            warn!(url = request.url.as_str(), "request failed: {}", err);
            Sent {
                unreachable: is_unreachable(&err),
                outcome: RequestOutcome::failed(request.url, elapsed, err.to_string()),
            }
        }
    }
}

/// Whether `err` means the server could not be reached at all.
fn is_unreachable(err: &ureq::Error) -> bool {
    match err {
        ureq::Error::HostNotFound
        | ureq::Error::ConnectionFailed
        | ureq::Error::Timeout(ureq::Timeout::Connect) => true,
        ureq::Error::Io(io) => {
            matches!(
                io.kind(),
                ErrorKind::ConnectionRefused | ErrorKind::AddrNotAvailable | ErrorKind::NotConnected
            )
        }
        _ => false,
    }
}
