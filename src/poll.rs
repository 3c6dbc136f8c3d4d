//! Cancellable polling loop for live visualizer data.
//!
//! While enabled, a periodic task fetches one visualizer frame per tick,
//! renders it, and raises a notification per detected gesture. A transport
//! failure disables the loop (fail-closed, so a failing service is not
//! hammered); resuming takes an explicit re-enable.
//!
//! Disabling cancels the timer, not an in-flight fetch. Every enable bumps an
//! enablement epoch, and a fetch completion whose epoch no longer matches the
//! current one is dropped silently, so a stale fetch can never repaint the
//! surface after the loop was logically stopped.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::controller::ControllerEvent;
use crate::render::Canvas;
use crate::service::GestureService;
use crate::Model;

/// Default polling period.
pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_millis(50);

/// Everything one polling run needs: where to fetch from, where to draw,
/// where to stash the latest models, and where to surface events.
pub(crate) struct PollContext<S> {
    pub service: Arc<S>,
    pub canvas: Arc<Mutex<Canvas>>,
    pub last_models: Arc<Mutex<Vec<Model>>>,
    pub events: UnboundedSender<ControllerEvent>,
}

/// A cancellable periodic fetch task.
///
/// At most one timer is active at any time: enabling while already enabled
/// cancels the previous timer first (a reset, not a stacked duplicate), and
/// disabling while idle is a no-op.
pub struct Poller {
    period: Duration,
    epoch: Arc<AtomicU64>,
    active: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl Poller {
    /// Create an idle poller with the given tick period.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            epoch: Arc::new(AtomicU64::new(0)),
            active: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    /// Whether a timer is currently active.
    ///
    /// Turns false after [`disable`](Self::disable) and after the loop
    /// fail-closed on a transport error.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Start polling, cancelling any previous timer first.
    pub(crate) fn enable<S: GestureService>(&mut self, ctx: PollContext<S>) {
        self.disable();

        let my_epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.active.store(true, Ordering::SeqCst);

        let epoch = Arc::clone(&self.epoch);
        let active = Arc::clone(&self.active);
        let period = self.period;

        debug!("[Poller] enabled (epoch {}, period {:?})", my_epoch, period);

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let fetched = ctx.service.visualizer_frame().await;

                // A newer enable (or a disable) supersedes this run; drop the
                // result rather than repainting with stale data.
                if epoch.load(Ordering::SeqCst) != my_epoch {
                    debug!("[Poller] dropping stale fetch from epoch {}", my_epoch);
                    return;
                }

                match fetched {
                    Ok(frame) => {
                        if let Ok(mut canvas) = ctx.canvas.lock() {
                            canvas.render_models(&frame.models);
                        }
                        for gesture in &frame.detected {
                            debug!("[Poller] gesture detected: {}", gesture.name);
                            let _ = ctx
                                .events
                                .send(ControllerEvent::GestureDetected(gesture.name.clone()));
                        }
                        if let Ok(mut last) = ctx.last_models.lock() {
                            *last = frame.models;
                        }
                    }
                    Err(err) => {
                        warn!("[Poller] fetch failed, disabling: {}", err);
                        active.store(false, Ordering::SeqCst);
                        let _ = ctx
                            .events
                            .send(ControllerEvent::PollingFailed(err.to_string()));
                        return;
                    }
                }
            }
        }));
    }

    /// Stop polling. No-op when already idle.
    pub fn disable(&mut self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.active.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("[Poller] disabled");
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.disable();
    }
}
