//! Session factory for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use acuarela::models::AppConfig;
use acuarela::services::{HttpAnalysisClient, SessionController};
use photo_normalize::{Normalize, NormalizeError, NormalizedPayload, Normalizer, RawImage};

/// Real normalizer that counts how often it runs
pub struct CountingNormalizer {
    inner: Normalizer,
    calls: AtomicUsize,
}

impl CountingNormalizer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Normalize for CountingNormalizer {
    fn normalize(&self, raw: &RawImage) -> Result<NormalizedPayload, NormalizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.normalize(raw)
    }
}

/// Session wired to a real HTTP client pointed at `endpoint`
pub struct TestSession {
    pub session: SessionController,
    pub normalizer: Arc<CountingNormalizer>,
}

impl TestSession {
    pub fn new(endpoint: &str) -> Self {
        Self::with_timeout(endpoint, Duration::from_secs(5))
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Self {
        let config = AppConfig {
            endpoint: endpoint.to_string(),
            timeout_secs: timeout.as_secs().max(1),
            ..Default::default()
        };
        let normalizer = Arc::new(CountingNormalizer {
            inner: Normalizer::new(config.normalizer_options()),
            calls: AtomicUsize::new(0),
        });
        let client = HttpAnalysisClient::new(endpoint, timeout).expect("Failed to build client");
        let session = SessionController::new(normalizer.clone(), Arc::new(client));

        Self {
            session,
            normalizer,
        }
    }
}
