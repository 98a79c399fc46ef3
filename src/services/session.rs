//! Session lifecycle: image selection, analysis, success, failure and retry.
//!
//! ```text
//!            select_image             analyze
//!   Idle ----------------> ImageSelected ------> Analyzing --+--> Success
//!    ^                                              ^         |
//!    |  clear_image (any state)                     | retry   +--> Failed
//!    +----------------------------------------------|-------------/ |
//!                                                   +---------------+
//! ```
//!
//! Every transition is published on a broadcast channel. A generation
//! counter ties each in-flight normalization or analysis to the state it
//! started from; results that come back after a newer `select_image` or
//! `clear_image` are dropped.

use photo_normalize::{Normalize, NormalizeError, NormalizedPayload, Normalizer, RawImage};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

use crate::error::AnalysisError;
use crate::models::{AppConfig, PaletteResult};
use crate::services::{HttpAnalysisClient, PaletteAnalyzer};

/// Lifecycle state of a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No image selected
    Idle,
    /// Payload ready, no result yet
    ImageSelected,
    /// Request in flight
    Analyzing,
    Success(PaletteResult),
    /// User-facing failure message
    Failed(String),
}

impl SessionState {
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::ImageSelected => "image_selected",
            SessionState::Analyzing => "analyzing",
            SessionState::Success(_) => "success",
            SessionState::Failed(_) => "failed",
        }
    }

    pub fn result(&self) -> Option<&PaletteResult> {
        match self {
            SessionState::Success(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SessionState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

struct SessionInner {
    state: SessionState,
    payload: Option<Arc<NormalizedPayload>>,
    generation: u64,
}

/// Owns the session state and drives the normalizer and analyzer.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Mutex<SessionInner>>,
    normalizer: Arc<dyn Normalize>,
    analyzer: Arc<dyn PaletteAnalyzer>,
    events: broadcast::Sender<SessionState>,
}

impl SessionController {
    pub fn new(normalizer: Arc<dyn Normalize>, analyzer: Arc<dyn PaletteAnalyzer>) -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                state: SessionState::Idle,
                payload: None,
                generation: 0,
            })),
            normalizer,
            analyzer,
            events,
        }
    }

    /// Production session: `image`-crate normalizer and HTTPS client.
    pub fn from_config(config: &AppConfig) -> Result<Self, AnalysisError> {
        let normalizer = Normalizer::new(config.normalizer_options());
        let analyzer = HttpAnalysisClient::from_config(config)?;
        Ok(Self::new(Arc::new(normalizer), Arc::new(analyzer)))
    }

    /// Receive every state published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionState> {
        self.events.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.lock().state.clone()
    }

    /// The current normalized payload, if any.
    pub fn payload(&self) -> Option<Arc<NormalizedPayload>> {
        self.lock().payload.clone()
    }

    /// True when `retry()` would issue a request.
    pub fn can_retry(&self) -> bool {
        let inner = self.lock();
        matches!(inner.state, SessionState::Failed(_)) && inner.payload.is_some()
    }

    /// Replace the current image. Any prior payload, result or error is
    /// cleared before normalization starts.
    pub async fn select_image(&self, raw: RawImage) -> SessionState {
        let generation = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.payload = None;
            self.transition(&mut inner, SessionState::Idle);
            inner.generation
        };

        tracing::debug!(mime = %raw.mime, bytes = raw.len(), "Normalizing selected image");

        let normalizer = self.normalizer.clone();
        let outcome = tokio::task::spawn_blocking(move || normalizer.normalize(&raw))
            .await
            .unwrap_or_else(|e| {
                Err(NormalizeError::Encode(format!(
                    "normalization task failed: {e}"
                )))
            });

        let mut inner = self.lock();
        if inner.generation != generation {
            tracing::debug!("Discarding normalization for a replaced image");
            return inner.state.clone();
        }

        match outcome {
            Ok(payload) => {
                inner.payload = Some(Arc::new(payload));
                self.transition(&mut inner, SessionState::ImageSelected);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Image normalization failed");
                self.transition(
                    &mut inner,
                    SessionState::Failed(format!("Could not process image: {e}")),
                );
            }
        }
        inner.state.clone()
    }

    /// Analyze the current payload.
    ///
    /// Accepted from `ImageSelected` or `Failed`; returns `None` without
    /// doing anything otherwise, or when no payload is held. The state moves
    /// to `Analyzing` before the request is sent.
    pub async fn analyze(&self) -> Option<SessionState> {
        let (generation, payload) = self.begin_analysis(|state| {
            matches!(state, SessionState::ImageSelected | SessionState::Failed(_))
        })?;
        Some(self.run_analysis(generation, payload).await)
    }

    /// Re-issue the request for the current payload after a failure.
    ///
    /// The image is not normalized again.
    pub async fn retry(&self) -> Option<SessionState> {
        let (generation, payload) =
            self.begin_analysis(|state| matches!(state, SessionState::Failed(_)))?;
        tracing::info!("Retrying analysis");
        Some(self.run_analysis(generation, payload).await)
    }

    /// Drop the payload, result and error and return to `Idle`.
    pub fn clear_image(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.payload = None;
        self.transition(&mut inner, SessionState::Idle);
    }

    fn begin_analysis(
        &self,
        accepts: impl Fn(&SessionState) -> bool,
    ) -> Option<(u64, Arc<NormalizedPayload>)> {
        let mut inner = self.lock();
        if !accepts(&inner.state) {
            tracing::debug!(state = inner.state.label(), "Ignoring analysis request");
            return None;
        }
        let Some(payload) = inner.payload.clone() else {
            tracing::debug!("Ignoring analysis request without a payload");
            return None;
        };

        inner.generation += 1;
        self.transition(&mut inner, SessionState::Analyzing);
        Some((inner.generation, payload))
    }

    async fn run_analysis(&self, generation: u64, payload: Arc<NormalizedPayload>) -> SessionState {
        let in_flight = InFlight {
            session: self,
            generation,
            settled: false,
        };
        let outcome = self.analyzer.analyze(&payload).await;
        in_flight.settle(outcome)
    }

    fn transition(&self, inner: &mut SessionInner, next: SessionState) {
        tracing::debug!(
            from = inner.state.label(),
            to = next.label(),
            generation = inner.generation,
            "Session transition"
        );
        inner.state = next;
        // No subscribers is fine
        let _ = self.events.send(inner.state.clone());
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An analysis request tied to the generation it started in.
///
/// Dropped unsettled (the caller abandoned the future), it fails the session
/// so it never stays in `Analyzing`.
struct InFlight<'a> {
    session: &'a SessionController,
    generation: u64,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, outcome: Result<PaletteResult, AnalysisError>) -> SessionState {
        self.settled = true;
        let mut inner = self.session.lock();

        if inner.generation != self.generation {
            tracing::debug!(
                request = self.generation,
                current = inner.generation,
                "Discarding stale analysis result"
            );
            return inner.state.clone();
        }

        let next = match outcome {
            Ok(result) => {
                tracing::info!(colors = result.colors.len(), "Analysis succeeded");
                SessionState::Success(result)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Analysis failed");
                SessionState::Failed(format!("Palette analysis failed: {e}"))
            }
        };
        self.session.transition(&mut inner, next);
        inner.state.clone()
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut inner = self.session.lock();
        if inner.generation == self.generation && inner.state == SessionState::Analyzing {
            tracing::warn!("Analysis abandoned before completion");
            self.session.transition(
                &mut inner,
                SessionState::Failed("Palette analysis was cancelled".to_string()),
            );
        }
    }
}
