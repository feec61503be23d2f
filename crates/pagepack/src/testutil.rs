//! In-memory [`Fetch`] implementation for unit tests

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::FetchError;
use crate::fetch::Fetch;

/// Serves canned bodies by exact URL; everything else is a 404
pub(crate) struct StubFetch {
    pages: HashMap<String, Bytes>,
}

impl StubFetch {
    pub(crate) fn new() -> Self {
        Self {
            pages: HashMap::new(),
        }
    }

    pub(crate) fn with(mut self, url: &str, body: impl Into<Bytes>) -> Self {
        self.pages.insert(url.to_string(), body.into());
        self
    }
}

#[async_trait]
impl Fetch for StubFetch {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        match self.pages.get(url) {
            Some(body) => Ok(body.clone()),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
