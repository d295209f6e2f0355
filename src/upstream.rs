// Outbound HTTP for every fetcher.
//
// One blocking request per call, no retries. Each request is bounded by a
// fixed timeout so a hung upstream cannot stall the refresh cycle.

use reqwest::blocking;
use serde_json::Value;
use std::time::Duration;

use crate::error::{BoardError, Result};

/// Seam between the fetchers and the network. Tests swap in canned bodies.
pub trait Upstream: Send + Sync {
    fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value>;
    fn get_bytes(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone)]
pub struct HttpUpstream {
    timeout: Duration,
}

impl Default for HttpUpstream {
    fn default() -> Self {
        HttpUpstream {
            timeout: Duration::from_secs(Self::REQUEST_TIMEOUT_SECS),
        }
    }
}

impl HttpUpstream {
    const REQUEST_TIMEOUT_SECS: u64 = 10;

    // The blocking client owns its own runtime, so it is built per call on the
    // calling (blocking) thread rather than stored.
    fn create_http_client(&self) -> Result<blocking::Client> {
        blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| {
                BoardError::UpstreamUnavailable(format!("Failed to create HTTP client: {}", e))
            })
    }

    fn send(&self, url: &str, query: &[(&str, &str)]) -> Result<blocking::Response> {
        let client = self.create_http_client()?;

        let response = client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| BoardError::UpstreamUnavailable(format!("GET {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(BoardError::UpstreamUnavailable(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        Ok(response)
    }
}

impl Upstream for HttpUpstream {
    fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<Value> {
        let body = self
            .send(url, query)?
            .text()
            .map_err(|e| BoardError::UpstreamUnavailable(format!("Failed to read response: {}", e)))?;

        serde_json::from_str(&body)
            .map_err(|e| BoardError::MalformedResponse(format!("Invalid JSON from {}: {}", url, e)))
    }

    fn get_bytes(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>> {
        let body = self
            .send(url, query)?
            .bytes()
            .map_err(|e| BoardError::UpstreamUnavailable(format!("Failed to read response: {}", e)))?;

        Ok(body.to_vec())
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Canned responses keyed by the value of one query parameter
    /// (`mapid`, `stpid`, ...). Unknown keys answer with a 503.
    #[derive(Default)]
    pub struct FakeUpstream {
        pub key_param: &'static str,
        pub json: HashMap<String, Result<Value>>,
        pub bytes: Option<Result<Vec<u8>>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeUpstream {
        pub fn keyed_by(key_param: &'static str) -> Self {
            FakeUpstream {
                key_param,
                ..Default::default()
            }
        }

        pub fn with_json(mut self, key: &str, body: Value) -> Self {
            self.json.insert(key.to_string(), Ok(body));
            self
        }

        pub fn with_error(mut self, key: &str, err: BoardError) -> Self {
            self.json.insert(key.to_string(), Err(err));
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().map(|c| c.len()).unwrap_or(0)
        }
    }

    impl Upstream for FakeUpstream {
        fn get_json(&self, _url: &str, query: &[(&str, &str)]) -> Result<Value> {
            let key = query
                .iter()
                .find(|(name, _)| *name == self.key_param)
                .map(|(_, value)| value.to_string())
                .unwrap_or_default();
            self.calls.lock().unwrap().push(key.clone());
            self.json
                .get(&key)
                .cloned()
                .unwrap_or_else(|| Err(BoardError::UpstreamUnavailable("HTTP 503".to_string())))
        }

        fn get_bytes(&self, url: &str, _query: &[(&str, &str)]) -> Result<Vec<u8>> {
            self.calls.lock().unwrap().push(url.to_string());
            self.bytes
                .clone()
                .unwrap_or_else(|| Err(BoardError::UpstreamUnavailable("HTTP 503".to_string())))
        }
    }
}
