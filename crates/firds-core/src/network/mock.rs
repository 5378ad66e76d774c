//! Test-only in-memory fetcher.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::client::{ClientError, ClientResult, Fetcher};

#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    bodies: HashMap<String, Vec<u8>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_body(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.insert(url.to_string(), body.into());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> ClientResult<Vec<u8>> {
        self.requests.lock().unwrap().push(url.to_string());
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| ClientError::Status {
                status: 404,
                url: url.to_string(),
            })
    }
}
