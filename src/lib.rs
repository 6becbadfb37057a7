//! Vigil: client-side command dispatch and session orchestration for an
//! ambient assistant HUD.
//!
//! User input (typed or transcribed speech) flows through an ordered intent
//! classifier to either a local hardware action or a remote assistant
//! backend, while two independent poll loops keep ambient state (system
//! stats, notifications) fresh.
//!
//! # Architecture
//!
//! The engine is built from small components wired together by
//! [`HudSession`]:
//! - **CommandRouter**: classifies input and executes the matching branch
//! - **BackendClient**: typed wrapper over the backend's four REST operations
//! - **SessionHistoryStore**: append-only session transcript
//! - **SpeechFeedbackChannel**: serialized speech output, newest utterance wins
//! - **PollingScheduler**: fixed-interval stats and notification refresh
//! - **CapabilityProbe / HardwarePort**: feature detection and device access
//!
//! Presentation (theming, layout, audio ambience) lives behind the
//! [`view::HudView`] trait and is out of scope here.

pub mod backend;
pub mod capability;
pub mod config;
pub mod error;
pub mod history;
pub mod poll;
pub mod router;
pub mod session;
pub mod speech;
pub mod test_utils;
pub mod view;

pub use backend::BackendClient;
pub use config::HudConfig;
pub use error::{HudError, Result};
pub use router::{CommandIntent, CommandRouter};
pub use session::HudSession;
