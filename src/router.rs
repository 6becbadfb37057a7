//! Intent classification and command dispatch.
//!
//! Raw input (typed or transcribed speech) is classified against an
//! ordered keyword chain built once at construction; evaluation
//! short-circuits on the first match, so ties are impossible. Local intents
//! run entirely on-device; everything else goes to the backend as a chat
//! request.
//!
//! | Keywords | Intent |
//! |----------|--------|
//! | "scan", "camera", "vision" | `Scan` |
//! | "where am i", "location", "gps" | `Locate` |
//! | "upload", "file" | `UploadFile` |
//! | anything else | `Chat` |

use crate::backend::{BackendClient, ChatAction};
use crate::capability::{Capability, CapabilityProbe, HardwarePort};
use crate::history::{Sender, SessionHistoryStore};
use crate::speech::SpeechFeedbackChannel;
use crate::view::HudView;
use std::sync::Arc;
use tracing::{debug, warn};

/// Classified purpose of a raw input string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandIntent {
    /// Open the camera for a visual scan.
    Scan,
    /// Read and announce the current geolocation.
    Locate,
    /// Prompt for a file upload.
    UploadFile,
    /// Forward to the assistant backend.
    Chat,
}

struct IntentRule {
    intent: CommandIntent,
    keywords: &'static [&'static str],
}

/// Fixed degraded-mode line shown when the backend is unreachable. Never
/// persisted to history.
pub const DEGRADED_MESSAGE: &str = "Sir, connection to core is unstable.";

const SCAN_ACTIVE_MESSAGE: &str = "Visual scan mode active. Scanning for anomalies.";
const SCAN_ACTIVE_SPOKEN: &str = "Visual scan mode active, Sir.";
const CAMERA_OFFLINE_MESSAGE: &str = "Sir, the optical sensors are offline.";
const GPS_OFFLINE_MESSAGE: &str = "Sir, I'm unable to access the GPS satellites.";
const UPLOAD_OFFLINE_MESSAGE: &str = "Sir, I'm unable to receive files right now.";

/// Haptic pulse fired when an assistant reply lands.
const REPLY_VIBRATION_MS: u64 = 50;

/// Routes user input to a local action or a backend chat request.
pub struct CommandRouter {
    rules: Vec<IntentRule>,
    backend: Arc<BackendClient>,
    store: Arc<SessionHistoryStore>,
    speech: Arc<SpeechFeedbackChannel>,
    view: Arc<dyn HudView>,
    probe: Arc<dyn CapabilityProbe>,
    hardware: Arc<dyn HardwarePort>,
}

impl CommandRouter {
    /// Build a router with the full precedence chain:
    /// Scan > Locate > UploadFile > Chat fallback.
    pub fn new(
        backend: Arc<BackendClient>,
        store: Arc<SessionHistoryStore>,
        speech: Arc<SpeechFeedbackChannel>,
        view: Arc<dyn HudView>,
        probe: Arc<dyn CapabilityProbe>,
        hardware: Arc<dyn HardwarePort>,
    ) -> Self {
        let rules = vec![
            IntentRule {
                intent: CommandIntent::Scan,
                keywords: &["scan", "camera", "vision"],
            },
            IntentRule {
                intent: CommandIntent::Locate,
                keywords: &["where am i", "location", "gps"],
            },
            IntentRule {
                intent: CommandIntent::UploadFile,
                keywords: &["upload", "file"],
            },
        ];
        Self {
            rules,
            backend,
            store,
            speech,
            view,
            probe,
            hardware,
        }
    }

    /// Classify input text. Case-insensitive substring matching, first
    /// matching rule wins, `Chat` when nothing matches.
    #[must_use]
    pub fn classify(&self, text: &str) -> CommandIntent {
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|keyword| lowered.contains(keyword)))
            .map_or(CommandIntent::Chat, |rule| rule.intent)
    }

    /// Dispatch one piece of user input.
    ///
    /// Empty or whitespace-only input is a no-op, not an error. The user's
    /// utterance is always recorded to history before the branch runs.
    /// Failures are consumed here; dispatch never fails the session.
    pub async fn dispatch(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        self.store.append(Sender::User, text);

        match self.classify(text) {
            CommandIntent::Scan => self.scan_action().await,
            CommandIntent::Locate => self.locate_action().await,
            CommandIntent::UploadFile => self.upload_action().await,
            CommandIntent::Chat => self.chat(text).await,
        }
    }

    async fn chat(&self, text: &str) {
        match self.backend.chat(text).await {
            Ok(reply) => {
                self.store.append(Sender::Assistant, &reply.response);
                self.speech.speak(&reply.response);

                if self.probe.has(Capability::Vibration)
                    && let Err(e) = self.hardware.vibrate(REPLY_VIBRATION_MS).await
                {
                    debug!("haptic pulse failed: {e}");
                }

                // Display-and-speak happens before any triggered action.
                match reply.action {
                    Some(ChatAction::OpenCamera) => self.scan_action().await,
                    Some(ChatAction::RequestLocation) => self.locate_action().await,
                    None => {}
                }
            }
            Err(e) => {
                warn!("chat request degraded: {e}");
                self.view.show_message(DEGRADED_MESSAGE);
            }
        }
    }

    async fn scan_action(&self) {
        if !self.probe.has(Capability::Camera) {
            self.apologize(CAMERA_OFFLINE_MESSAGE);
            return;
        }
        match self.hardware.open_camera().await {
            Ok(()) => {
                self.view.toggle_panel("camera", true);
                self.view.show_message(SCAN_ACTIVE_MESSAGE);
                self.speech.speak(SCAN_ACTIVE_SPOKEN);
            }
            Err(e) => {
                warn!("camera unavailable: {e}");
                self.view.toggle_panel("camera", false);
                self.apologize(CAMERA_OFFLINE_MESSAGE);
            }
        }
    }

    async fn locate_action(&self) {
        if !self.probe.has(Capability::Geolocation) {
            self.apologize(GPS_OFFLINE_MESSAGE);
            return;
        }
        match self.hardware.current_location().await {
            Ok(fix) => {
                self.view.set_location_text(&format!(
                    "GPS: {:.4}, {:.4}",
                    fix.latitude, fix.longitude
                ));
                self.view.show_message(&format!(
                    "Sir, coordinates secured: {:.4}, {:.4}",
                    fix.latitude, fix.longitude
                ));
                self.speech.speak(&format!(
                    "Coordinates secured, Sir. We are currently at {:.2} degrees latitude.",
                    fix.latitude
                ));
            }
            Err(e) => {
                warn!("geolocation unavailable: {e}");
                self.apologize(GPS_OFFLINE_MESSAGE);
            }
        }
    }

    async fn upload_action(&self) {
        match self.hardware.select_file().await {
            Ok(Some(name)) => {
                self.view.show_message(&format!(
                    "Sir, I've received the file: {name}. Commencing analysis..."
                ));
            }
            Ok(None) => debug!("file prompt dismissed"),
            Err(e) => {
                warn!("file picker unavailable: {e}");
                self.apologize(UPLOAD_OFFLINE_MESSAGE);
            }
        }
    }

    fn apologize(&self, line: &str) {
        self.view.show_message(line);
        self.speech.speak(line);
    }
}
