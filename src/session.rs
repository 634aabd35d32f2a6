//! Observable state of one text-to-image form.
//!
//! A [`GenerationSession`] owns the prompt, the in-flight flags, the current
//! result URL and the current error message. It can be cloned and shared
//! with a renderer; all clones see the same state.

use crate::{
    error::{ImageGenError, Result},
    generator::{ImageClient, ImageExporter},
    models::{ExportedImage, RequestState, SessionSnapshot},
};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy)]
enum Slot {
    Request,
    Export,
}

/// Flips a slot back to idle when dropped, whether the call finished,
/// failed, panicked, or the future was dropped mid-await.
struct InFlightGuard {
    state: Arc<Mutex<SessionSnapshot>>,
    slot: Slot,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        match self.slot {
            Slot::Request => state.request = RequestState::Idle,
            Slot::Export => state.export = RequestState::Idle,
        }
    }
}

fn lock(state: &Mutex<SessionSnapshot>) -> MutexGuard<'_, SessionSnapshot> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone)]
pub struct GenerationSession {
    client: ImageClient,
    exporter: ImageExporter,
    state: Arc<Mutex<SessionSnapshot>>,
}

impl GenerationSession {
    pub fn new(client: ImageClient, exporter: ImageExporter) -> Self {
        Self {
            client,
            exporter,
            state: Arc::new(Mutex::new(SessionSnapshot::default())),
        }
    }

    pub fn set_prompt(&self, prompt: impl Into<String>) {
        lock(&self.state).prompt = prompt.into();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        lock(&self.state).clone()
    }

    pub fn is_in_flight(&self) -> bool {
        lock(&self.state).request.is_in_flight()
    }

    pub fn result(&self) -> Option<String> {
        lock(&self.state).result.clone()
    }

    pub fn error(&self) -> Option<String> {
        lock(&self.state).error.clone()
    }

    pub async fn submit(&self) -> Result<String> {
        self.submit_with_cancel(&CancellationToken::new()).await
    }

    /// Set the prompt and submit it in one step.
    pub async fn submit_prompt(&self, prompt: impl Into<String>) -> Result<String> {
        self.set_prompt(prompt);
        self.submit().await
    }

    /// Submit the current prompt.
    ///
    /// Returns [`ImageGenError::Busy`] without touching state if a request
    /// is already in flight, and [`ImageGenError::Validation`] for a blank
    /// prompt. Every other outcome is mirrored into the session: the URL
    /// into `result`, or the failure's user message into `error`.
    pub async fn submit_with_cancel(&self, cancel: &CancellationToken) -> Result<String> {
        let prompt = {
            let mut state = lock(&self.state);
            if state.request.is_in_flight() {
                log::warn!("Submission ignored: a request is already in flight");
                return Err(ImageGenError::Busy);
            }
            if state.prompt.trim().is_empty() {
                return Err(ImageGenError::Validation("Prompt must not be empty".into()));
            }
            state.request = RequestState::InFlight;
            state.result = None;
            state.error = None;
            state.prompt.clone()
        };
        let _guard = InFlightGuard {
            state: Arc::clone(&self.state),
            slot: Slot::Request,
        };

        let outcome = self.client.generate_with_cancel(&prompt, cancel).await;

        let mut state = lock(&self.state);
        match outcome {
            Ok(response) => {
                state.result = Some(response.url.clone());
                state.error = None;
                Ok(response.url)
            }
            Err(e) => {
                log::error!("Image generation failed: {:?}", e);
                state.result = None;
                state.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Download the current result to disk.
    ///
    /// `Ok(None)` when there is nothing to export; no request is made.
    /// A failed download sets `error` but keeps `result`. If a submission
    /// started or replaced the result while the download ran, the session
    /// belongs to that submission and the export leaves `error` alone.
    pub async fn export(&self) -> Result<Option<ExportedImage>> {
        let url = {
            let mut state = lock(&self.state);
            let Some(url) = state.result.clone() else {
                return Ok(None);
            };
            if state.export.is_in_flight() {
                return Err(ImageGenError::Busy);
            }
            state.export = RequestState::InFlight;
            url
        };
        let _guard = InFlightGuard {
            state: Arc::clone(&self.state),
            slot: Slot::Export,
        };

        let outcome = self.exporter.save(&url).await;

        let mut state = lock(&self.state);
        let current =
            !state.request.is_in_flight() && state.result.as_deref() == Some(url.as_str());
        if !current {
            log::debug!("Export of {} settled after the result changed", url);
        }
        match outcome {
            Ok(image) => {
                if current {
                    state.error = None;
                }
                Ok(Some(image))
            }
            Err(e) => {
                log::error!("Image export failed: {:?}", e);
                if current {
                    state.error = Some(e.user_message());
                }
                Err(e)
            }
        }
    }
}
