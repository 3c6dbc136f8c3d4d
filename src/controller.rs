//! The session state machine.
//!
//! [`SessionController`] owns all process-wide mutable state: the cached
//! session state, the save candidate and its trim range, the last-seen models
//! and the polling timer. Every transition is a round trip to the remote
//! service; the local state is only ever updated from the confirmed response,
//! so a rejected request leaves everything untouched. The service may also
//! clamp a request, in which case the returned state wins.
//!
//! UI-facing happenings (state changes, detected gestures, template list
//! refreshes, polling failures) are delivered as [`ControllerEvent`]s over an
//! unbounded channel handed out at construction.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{info, warn};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::{ClientError, Result};
use crate::poll::{PollContext, Poller, DEFAULT_POLL_PERIOD};
use crate::render::{Canvas, RenderConfig};
use crate::service::GestureService;
use crate::trim::{validate_save, TrimRange};
use crate::{Model, SessionState, Template, Trace};

/// Happenings the UI should react to.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// The confirmed session state changed.
    StateChanged(SessionState),
    /// The service matched a gesture during a poll; show a transient
    /// notification.
    GestureDetected(String),
    /// The template display list should be replaced with this list.
    TemplatesRefreshed(Vec<Template>),
    /// A poll fetch failed and the polling loop disabled itself.
    PollingFailed(String),
}

/// Client-side controller for one capture session.
///
/// Constructed when the UI mounts; dropping it cancels any active polling
/// timer.
pub struct SessionController<S: GestureService> {
    service: Arc<S>,
    state: SessionState,
    /// Baseline visualization toggle; polling runs while `Normal` iff set.
    visualize: bool,
    canvas: Arc<Mutex<Canvas>>,
    last_models: Arc<Mutex<Vec<Model>>>,
    poller: Poller,
    /// The trace captured when saving began. Trim only ever applies to this,
    /// never to anything fetched afterwards.
    save_candidate: Option<Trace>,
    trim: Option<TrimRange>,
    events: UnboundedSender<ControllerEvent>,
}

impl<S: GestureService> SessionController<S> {
    /// Create a controller with the default polling period.
    pub fn new(service: S, render: RenderConfig) -> (Self, UnboundedReceiver<ControllerEvent>) {
        Self::with_poll_period(service, render, DEFAULT_POLL_PERIOD)
    }

    /// Create a controller with a custom polling period.
    pub fn with_poll_period(
        service: S,
        render: RenderConfig,
        period: Duration,
    ) -> (Self, UnboundedReceiver<ControllerEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let controller = Self {
            service: Arc::new(service),
            state: SessionState::Normal,
            visualize: false,
            canvas: Arc::new(Mutex::new(Canvas::new(render))),
            last_models: Arc::new(Mutex::new(Vec::new())),
            poller: Poller::new(period),
            save_candidate: None,
            trim: None,
            events,
        };
        (controller, receiver)
    }

    // ========================================================================
    // State Machine
    // ========================================================================

    /// Fetch the current state from the service (initial load).
    pub async fn load(&mut self) -> Result<SessionState> {
        let state = self.service.session_state().await?;
        self.adopt_state(state);
        Ok(state)
    }

    /// Request the `Normal -> Recording` transition.
    ///
    /// On confirmation any stale save candidate is dropped and the polling
    /// loop is enabled.
    pub async fn start_recording(&mut self) -> Result<()> {
        let confirmed = self.service.request_transition(SessionState::Recording).await?;
        self.adopt_state(confirmed);

        if confirmed == SessionState::Recording {
            info!("[SessionController] recording started");
            self.save_candidate = None;
            self.trim = None;
            // models stashed by an earlier session must not feed this one's
            // stop decision
            if let Ok(mut last) = self.last_models.lock() {
                last.clear();
            }
            self.enable_poller();
        }
        Ok(())
    }

    /// Request the stop of a recording.
    ///
    /// With at least one model captured by the last poll this moves to
    /// `Saving`: polling stops, the first captured trace becomes the save
    /// candidate and the trim range seeds to its full length. With nothing
    /// captured the session returns straight to `Normal`.
    pub async fn stop_recording(&mut self) -> Result<()> {
        let captured: Option<Trace> = match self.last_models.lock() {
            Ok(models) => models.first().map(|m| m.trace.clone()),
            Err(_) => None,
        };

        let target = if captured.is_some() {
            SessionState::Saving
        } else {
            SessionState::Normal
        };

        let confirmed = self.service.request_transition(target).await?;
        self.adopt_state(confirmed);

        match confirmed {
            SessionState::Saving => {
                self.poller.disable();
                if let Some(trace) = captured {
                    info!(
                        "[SessionController] captured trace with {} points, entering save",
                        trace.len()
                    );
                    self.trim = Some(TrimRange::full(trace.len()));
                    self.save_candidate = Some(trace);
                    self.render_candidate();
                }
            }
            SessionState::Normal => {
                self.poller.disable();
                info!("[SessionController] nothing captured, back to normal");
                if self.visualize {
                    self.enable_poller();
                }
            }
            // clamped back into recording: the timer keeps running
            SessionState::Recording => {}
        }
        Ok(())
    }

    /// Discard the save candidate and return to `Normal`.
    pub async fn discard(&mut self) -> Result<()> {
        let confirmed = self.service.request_transition(SessionState::Normal).await?;
        self.adopt_state(confirmed);

        if confirmed == SessionState::Normal {
            self.save_candidate = None;
            self.trim = None;
            if self.visualize {
                self.enable_poller();
            }
        }
        Ok(())
    }

    /// Persist the trimmed save candidate as a named template.
    ///
    /// Validation runs before anything is sent: a bad name or range fails
    /// fast with a validation error and leaves the session in `Saving`. On
    /// success the session returns to `Normal` and the template list is
    /// refreshed.
    pub async fn save(&mut self, name: &str) -> Result<()> {
        let candidate_len = self
            .save_candidate
            .as_ref()
            .map(Trace::len)
            .ok_or_else(|| ClientError::validation("no captured trace to save"))?;
        let range = self
            .trim
            .ok_or_else(|| ClientError::validation("no trim range selected"))?;

        validate_save(name, range, candidate_len)?;

        self.service.create_template(name, range.start, range.end).await?;
        info!(
            "[SessionController] saved template '{}' ({}..{} of {})",
            name, range.start, range.end, candidate_len
        );

        let confirmed = self.service.request_transition(SessionState::Normal).await?;
        self.adopt_state(confirmed);
        // the candidate stays meaningful if the service clamped us back into
        // saving
        if confirmed == SessionState::Normal {
            self.save_candidate = None;
            self.trim = None;
            if self.visualize {
                self.enable_poller();
            }
        }

        self.refresh_templates().await?;
        Ok(())
    }

    /// Adopt a confirmed state, announcing the change.
    fn adopt_state(&mut self, state: SessionState) {
        if self.state != state {
            self.state = state;
            let _ = self.events.send(ControllerEvent::StateChanged(state));
        }
    }

    // ========================================================================
    // Trim Selector
    // ========================================================================

    /// Replace the trim range and redraw the restricted candidate.
    ///
    /// Only meaningful while saving; bounds are clamped into the candidate's
    /// length, mirroring the slider's domain.
    pub fn set_trim(&mut self, start: usize, end: usize) -> Result<()> {
        if self.state != SessionState::Saving {
            return Err(ClientError::validation("not in the saving state"));
        }
        let candidate = self
            .save_candidate
            .as_ref()
            .ok_or_else(|| ClientError::validation("no captured trace to trim"))?;

        let range = TrimRange::new(start, end).clamp_to(candidate.len());
        self.trim = Some(range);
        self.render_candidate();
        Ok(())
    }

    /// Redraw the save candidate restricted to the current trim range.
    fn render_candidate(&mut self) {
        let Some(candidate) = &self.save_candidate else {
            return;
        };
        let range = self.trim.unwrap_or_else(|| TrimRange::full(candidate.len()));
        let sliced = candidate.slice(range.start, range.end);

        if let Ok(mut canvas) = self.canvas.lock() {
            canvas.render_models(&[Model::new(sliced)]);
        }
    }

    // ========================================================================
    // Visualization
    // ========================================================================

    /// Enable baseline visualization: polls while the session is `Normal`.
    pub fn enable_visualization(&mut self) {
        self.visualize = true;
        if self.state == SessionState::Normal {
            self.enable_poller();
        }
    }

    /// Disable baseline visualization.
    pub fn disable_visualization(&mut self) {
        self.visualize = false;
        if self.state == SessionState::Normal {
            self.poller.disable();
        }
    }

    /// Wipe the drawing surface.
    pub fn clear_visualization(&mut self) {
        if let Ok(mut canvas) = self.canvas.lock() {
            canvas.clear();
        }
    }

    fn enable_poller(&mut self) {
        self.poller.enable(PollContext {
            service: Arc::clone(&self.service),
            canvas: Arc::clone(&self.canvas),
            last_models: Arc::clone(&self.last_models),
            events: self.events.clone(),
        });
    }

    // ========================================================================
    // Template Sync
    // ========================================================================

    /// Fetch the template list and announce it for display.
    pub async fn refresh_templates(&self) -> Result<Vec<Template>> {
        let templates = self.service.list_templates().await?;
        let _ = self
            .events
            .send(ControllerEvent::TemplatesRefreshed(templates.clone()));
        Ok(templates)
    }

    /// Delete a template, then refresh the display list.
    pub async fn delete_template(&self, id: u32) -> Result<()> {
        if let Err(err) = self.service.delete_template(id).await {
            warn!("[SessionController] delete of template {} failed: {}", id, err);
            return Err(err);
        }
        self.refresh_templates().await?;
        Ok(())
    }

    /// Bulk-populate the built-in templates, then refresh the display list.
    pub async fn add_builtin_templates(&self) -> Result<()> {
        self.service.add_builtin_templates().await?;
        self.refresh_templates().await?;
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The last confirmed session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the polling loop currently has an active timer.
    pub fn is_polling(&self) -> bool {
        self.poller.is_active()
    }

    /// The current trim range, while saving.
    pub fn trim_range(&self) -> Option<TrimRange> {
        self.trim
    }

    /// The trace captured when saving began, while saving.
    pub fn save_candidate(&self) -> Option<&Trace> {
        self.save_candidate.as_ref()
    }

    /// Shared handle to the drawing surface.
    pub fn canvas(&self) -> Arc<Mutex<Canvas>> {
        Arc::clone(&self.canvas)
    }
}

// ============================================================================
// Tests
// ============================================================================
