//! Session composition root.
//!
//! Wires the command router, transcript store, speech channel, and poll
//! loops together, performs the one-time startup hydration, and exposes the
//! dispatch entry point. Hydration completes before the session handle
//! exists, so no user interaction can race it.

use crate::backend::{BackendClient, Notification};
use crate::capability::{Capability, CapabilityProbe, HardwarePort};
use crate::config::HudConfig;
use crate::error::Result;
use crate::history::{Message, SessionHistoryStore};
use crate::poll::{PollingHandles, PollingScheduler};
use crate::router::CommandRouter;
use crate::speech::{SpeechFeedbackChannel, SpeechSynth};
use crate::view::HudView;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// A running HUD session: hydrated transcript, live poll loops, and a
/// dispatch entry point. Dropping the session stops the poll loops.
pub struct HudSession {
    router: CommandRouter,
    store: Arc<SessionHistoryStore>,
    poller: Arc<PollingScheduler>,
    _handles: PollingHandles,
}

impl std::fmt::Debug for HudSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HudSession")
            .field("history_len", &self.store.len())
            .finish()
    }
}

impl HudSession {
    /// Start a session against the backend named in `config`.
    ///
    /// Pass `None` for `synth` when no synthesis backend exists; the probe
    /// additionally gates it, so a synth is only used when
    /// `Capability::SpeechSynthesis` is present.
    pub async fn start(
        config: HudConfig,
        view: Arc<dyn HudView>,
        probe: Arc<dyn CapabilityProbe>,
        hardware: Arc<dyn HardwarePort>,
        synth: Option<Arc<dyn SpeechSynth>>,
    ) -> Result<Self> {
        let backend = Arc::new(BackendClient::new(&config)?);
        Self::start_with_backend(config, backend, view, probe, hardware, synth).await
    }

    /// Start a session over an explicit backend client. Used by tests to
    /// point at a mock server; behavior is otherwise identical to
    /// [`HudSession::start`].
    pub async fn start_with_backend(
        config: HudConfig,
        backend: Arc<BackendClient>,
        view: Arc<dyn HudView>,
        probe: Arc<dyn CapabilityProbe>,
        hardware: Arc<dyn HardwarePort>,
        synth: Option<Arc<dyn SpeechSynth>>,
    ) -> Result<Self> {
        let synth = if probe.has(Capability::SpeechSynthesis) {
            synth
        } else {
            None
        };
        let speech = Arc::new(SpeechFeedbackChannel::new(synth, config.speech));
        let store = Arc::new(SessionHistoryStore::new(Arc::clone(&view)));

        // One-time hydration. A failure is not surfaced to the user; the
        // session simply starts with an empty transcript.
        match backend.history().await {
            Ok(history) => {
                info!("hydrated {} transcript messages", history.len());
                store.replace_all(history);
            }
            Err(e) => info!("starting with empty transcript: {e}"),
        }

        view.show_message(&config.greeting);
        speech.speak(&config.greeting);

        let poller = Arc::new(PollingScheduler::new(
            Arc::clone(&backend),
            Arc::clone(&view),
            Arc::clone(&speech),
            Arc::clone(&probe),
            Arc::clone(&hardware),
            Duration::from_millis(config.stats_interval_ms),
            Duration::from_millis(config.notifications_interval_ms),
            config.notification_shelf_capacity,
        ));
        let handles = poller.start();

        let router = CommandRouter::new(
            backend,
            Arc::clone(&store),
            speech,
            view,
            probe,
            hardware,
        );

        Ok(Self {
            router,
            store,
            poller,
            _handles: handles,
        })
    }

    /// Route one piece of user input (typed or transcribed).
    pub async fn dispatch(&self, text: &str) {
        self.router.dispatch(text).await;
    }

    /// Point-in-time copy of the session transcript, in display order.
    #[must_use]
    pub fn history_snapshot(&self) -> Vec<Message> {
        self.store.snapshot()
    }

    /// Point-in-time copy of the notification display list, newest first.
    #[must_use]
    pub fn notifications_snapshot(&self) -> Vec<Notification> {
        self.poller.shelf_snapshot()
    }
}
