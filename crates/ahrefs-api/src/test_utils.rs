use std::{
    net::TcpListener,
    sync::{Arc, Mutex},
    time::Duration,
};

use ahrefs_http::{HttpRequest, RequestOutcome, Result, Transport, TransportError};

#[derive(Default)]
struct FakeState {
    responses: Vec<(String, String)>,
    failures: Vec<(String, String)>,
    batch_failure: Option<String>,
    requests: Vec<HttpRequest>,
}

/// In-memory transport. Responses and failures are matched by URL substring;
/// unmatched requests answer `{}`.
#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, needle: &str, body: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .push((needle.to_string(), body.to_string()));
        self
    }

    pub fn fail(self, needle: &str, error: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .push((needle.to_string(), error.to_string()));
        self
    }

    pub fn fail_batch(self, reason: &str) -> Self {
        self.state.lock().unwrap().batch_failure = Some(reason.to_string());
        self
    }

    /// Every request issued so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

impl Transport for FakeTransport {
    fn issue(&self, requests: Vec<HttpRequest>) -> Result<Vec<RequestOutcome>> {
        let mut state = self.state.lock().unwrap();
        state.requests.extend(requests.iter().cloned());
        if let Some(reason) = &state.batch_failure {
            return Err(TransportError::Batch(reason.clone()));
        }

        let outcomes = requests
            .iter()
            .map(|request| {
                let url = request.url.as_str();
                if let Some((_, error)) = state.failures.iter().find(|(n, _)| url.contains(n.as_str())) {
                    return RequestOutcome::failed(url, Duration::from_millis(3), error.as_str());
                }
                let body = state
                    .responses
                    .iter()
                    .find(|(n, _)| url.contains(n.as_str()))
                    .map_or("{}", |(_, body)| body.as_str());
                RequestOutcome::completed(url, Duration::from_millis(3), 200, body)
            })
            .collect();
        Ok(outcomes)
    }
}

pub fn with_env<F>(vars: Vec<(&str, &str)>, f: F)
where
    F: FnOnce(),
{
    let old_vars: Vec<_> = vars
        .iter()
        .map(|(k, _)| (*k, std::env::var(k).ok()))
        .collect();

    for (key, value) in &vars {
        std::env::set_var(key, value);
    }

    f();

    for (key, old_value) in old_vars {
        match old_value {
            Some(v) => std::env::set_var(key, v),
            None => std::env::remove_var(key),
        }
    }
}

/// Runs `f` with each of `keys` removed from the environment.
pub fn without_env<F>(keys: &[&str], f: F)
where
    F: FnOnce(),
{
    let old_vars: Vec<_> = keys.iter().map(|k| (*k, std::env::var(k).ok())).collect();
    for key in keys {
        std::env::remove_var(key);
    }

    f();

    for (key, old_value) in old_vars {
        if let Some(v) = old_value {
            std::env::set_var(key, v);
        }
    }
}

/// Base URL of a local port nothing listens on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
