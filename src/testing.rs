//! Fake vision provider for testing.
//!
//! Returns fixed labels (or a fixed error) so analysis and HTTP tests run
//! without network access or API keys.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::VisionError;
use crate::providers::VisionProvider;

#[derive(Debug)]
pub struct FakeProvider {
    result: Result<Vec<String>, VisionError>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl FakeProvider {
    /// A provider that detects `labels` in every image
    pub fn with_labels(labels: &[&str]) -> Self {
        Self {
            result: Ok(labels.iter().map(|l| l.to_string()).collect()),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A provider that fails every call with `error`
    pub fn failing(error: VisionError) -> Self {
        Self {
            result: Err(error),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Counter of `analyze` calls, readable after the provider is moved
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl VisionProvider for FakeProvider {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn analyze(&self, _image: &[u8]) -> Result<Vec<String>, VisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result.clone()
    }
}
