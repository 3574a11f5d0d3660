//! Request execution over an injected [`Transport`].
//!
//! The executor turns built queries into request URLs, hands them to the
//! transport as one concurrent batch and maps the settled outcomes back to
//! bodies. Transport failures never propagate: a failed request yields an
//! empty body and a diagnostic record; a batch that could not be issued at
//! all yields empty bodies for every slot.

use std::time::Duration;

use ahrefs_http::{HttpRequest, RequestDiagnostic, RequestOutcome, Transport};
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};
use url::form_urlencoded::byte_serialize;

use crate::query::QueryParams;

pub struct Executor {
    api_url: String,
    token: String,
    transport: Box<dyn Transport>,
    diagnostics: Vec<RequestDiagnostic>,
    last_transport_error: Option<String>,
}

impl Executor {
    pub fn new(
        api_url: impl Into<String>,
        token: impl Into<String>,
        transport: Box<dyn Transport>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            token: token.into(),
            transport,
            diagnostics: Vec::new(),
            last_transport_error: None,
        }
    }

    /// Full request URL for `query`: `<api_url>/?<query>&token=<token>`.
    pub fn url(&self, query: &QueryParams) -> String {
        format!(
            "{}/?{}&token={}",
            self.api_url.trim_end_matches('/'),
            query.to_query_string(),
            byte_serialize(self.token.as_bytes()).collect::<String>()
        )
    }

    /// Issues every query concurrently and returns one body per query, in order.
    ///
    /// `post` turns the first request into a POST carrying that body.
    pub fn execute(&mut self, queries: &[QueryParams], mut post: Option<String>) -> Vec<String> {
        let requests: Vec<HttpRequest> = queries
            .iter()
            .map(|query| {
                let url = self.url(query);
                match post.take() {
                    Some(body) => HttpRequest::post(url, body),
                    None => HttpRequest::get(url),
                }
            })
            .collect();
        let urls: Vec<String> = requests.iter().map(|r| r.url.clone()).collect();

        debug!(count = requests.len(), "executing queries");
        self.last_transport_error = None;

        let outcomes = match self.transport.issue(requests) {
            Ok(outcomes) => settle(&urls, outcomes),
            Err(err) => {
                warn!("batch could not be issued: {}", err);
                let message = err.to_string();
                self.last_transport_error = Some(message.clone());
                urls.iter()
                    .map(|url| RequestOutcome::failed(url.as_str(), Duration::ZERO, message.as_str()))
                    .collect()
            }
        };

        let (bodies, diagnostics) = outcomes
            .into_iter()
            .map(|outcome| (outcome.body.unwrap_or_default(), outcome.diagnostic))
            .unzip();
        self.diagnostics = diagnostics;
        bodies
    }

    /// Diagnostics of the most recent execution, one per request.
    pub fn diagnostics(&self) -> &[RequestDiagnostic] {
        &self.diagnostics
    }

    /// Why the most recent batch could not be issued, if it could not.
    pub fn last_transport_error(&self) -> Option<&str> {
        self.last_transport_error.as_deref()
    }

    /// Emits the diagnostics of the most recent execution at info level.
    pub fn log_diagnostics(&self) {
        for diagnostic in &self.diagnostics {
            info!("API link: {}", diagnostic.url);
            info!("Execution time: {:.3} seconds.", diagnostic.total_time_secs());
            if let Some(error) = &diagnostic.error {
                info!("Error: {}", error);
            }
        }
    }
}

/// Pads or truncates `outcomes` so there is exactly one per URL.
fn settle(urls: &[String], mut outcomes: Vec<RequestOutcome>) -> Vec<RequestOutcome> {
    if outcomes.len() != urls.len() {
        warn!(
            expected = urls.len(),
            received = outcomes.len(),
            "transport returned a mismatched number of outcomes"
        );
    }
    outcomes.truncate(urls.len());
    for url in &urls[outcomes.len()..] {
        outcomes.push(RequestOutcome::failed(
            url.as_str(),
            Duration::ZERO,
            "no outcome reported",
        ));
    }
    outcomes
}

/// Adds the `stats` of an unfiltered baseline response to `primary` under
/// `originalStats`.
///
/// A primary body that is not a JSON object is returned unchanged; a
/// baseline without readable stats merges as `null`.
pub fn merge_original_stats(primary: &str, baseline: &str) -> String {
    let Ok(JsonValue::Object(mut map)) = serde_json::from_str::<JsonValue>(primary) else {
        return primary.to_string();
    };
    let stats = serde_json::from_str::<JsonValue>(baseline)
        .ok()
        .and_then(|mut value| value.get_mut("stats").map(JsonValue::take))
        .unwrap_or(JsonValue::Null);
    map.insert("originalStats".to_string(), stats);
    JsonValue::Object(map).to_string()
}
