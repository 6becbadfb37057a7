//! Test doubles for the presentation, speech, and hardware seams.
//!
//! Public so embedders can exercise their wiring in environments without a
//! display, audio stack, or real sensors; the crate's own tests use the
//! same fakes.

use crate::backend::Notification;
use crate::capability::{GeoFix, HardwarePort};
use crate::config::SpeechTuning;
use crate::error::{HudError, Result};
use crate::speech::SpeechSynth;
use crate::view::HudView;
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// One recorded presentation call.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Message(String),
    Bar(String, f32),
    Location(String),
    Notification(Notification),
    Panel(String, bool),
}

/// View that records every call for later assertions.
#[derive(Debug, Default)]
pub struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    /// All recorded events, in call order.
    #[must_use]
    pub fn events(&self) -> Vec<ViewEvent> {
        locked(&self.events).clone()
    }

    /// Texts of all `show_message` calls, in call order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ViewEvent::Message(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Last value pushed to the named stat bar, if any.
    #[must_use]
    pub fn bar(&self, name: &str) -> Option<f32> {
        self.events()
            .into_iter()
            .rev()
            .find_map(|event| match event {
                ViewEvent::Bar(bar, percent) if bar == name => Some(percent),
                _ => None,
            })
    }

    /// All notifications forwarded to the view, in call order.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ViewEvent::Notification(item) => Some(item),
                _ => None,
            })
            .collect()
    }
}

impl HudView for RecordingView {
    fn show_message(&self, text: &str) {
        locked(&self.events).push(ViewEvent::Message(text.to_owned()));
    }

    fn update_bar(&self, name: &str, percent: f32) {
        locked(&self.events).push(ViewEvent::Bar(name.to_owned(), percent));
    }

    fn set_location_text(&self, text: &str) {
        locked(&self.events).push(ViewEvent::Location(text.to_owned()));
    }

    fn prepend_notification(&self, item: &Notification) {
        locked(&self.events).push(ViewEvent::Notification(item.clone()));
    }

    fn toggle_panel(&self, name: &str, visible: bool) {
        locked(&self.events).push(ViewEvent::Panel(name.to_owned(), visible));
    }
}

#[derive(Debug, Clone, Copy)]
enum SynthMode {
    /// Complete immediately.
    Instant,
    /// Render for the given duration, honoring cancellation.
    Delay(Duration),
    /// Render until cancelled.
    Hold,
}

/// Synthesis port that records which utterances started and which played to
/// completion. A cancelled utterance appears in `started` but not
/// `finished`.
#[derive(Debug)]
pub struct ScriptedSynth {
    mode: SynthMode,
    started: Mutex<Vec<String>>,
    finished: Mutex<Vec<String>>,
}

impl ScriptedSynth {
    /// Synth whose utterances complete immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::with_mode(SynthMode::Instant)
    }

    /// Synth whose utterances take `delay` to render.
    #[must_use]
    pub fn with_delay(delay: Duration) -> Self {
        Self::with_mode(SynthMode::Delay(delay))
    }

    /// Synth whose utterances render until cancelled.
    #[must_use]
    pub fn hold() -> Self {
        Self::with_mode(SynthMode::Hold)
    }

    fn with_mode(mode: SynthMode) -> Self {
        Self {
            mode,
            started: Mutex::new(Vec::new()),
            finished: Mutex::new(Vec::new()),
        }
    }

    /// Utterances that began rendering, in order.
    #[must_use]
    pub fn started(&self) -> Vec<String> {
        locked(&self.started).clone()
    }

    /// Utterances that played to completion, in order.
    #[must_use]
    pub fn finished(&self) -> Vec<String> {
        locked(&self.finished).clone()
    }
}

impl Default for ScriptedSynth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynth for ScriptedSynth {
    async fn utter(
        &self,
        text: &str,
        _tuning: SpeechTuning,
        cancel: CancellationToken,
    ) -> Result<()> {
        locked(&self.started).push(text.to_owned());

        match self.mode {
            SynthMode::Instant => {}
            SynthMode::Delay(delay) => {
                tokio::select! {
                    () = cancel.cancelled() => return Ok(()),
                    () = tokio::time::sleep(delay) => {}
                }
            }
            SynthMode::Hold => {
                cancel.cancelled().await;
                return Ok(());
            }
        }

        if cancel.is_cancelled() {
            return Ok(());
        }
        locked(&self.finished).push(text.to_owned());
        Ok(())
    }
}

/// Hardware port with scripted sensor readings and a call log.
///
/// Readings left unscripted behave as denied permissions.
#[derive(Debug)]
pub struct ScriptedHardware {
    location: Option<GeoFix>,
    battery: Option<f32>,
    file: Option<String>,
    camera_works: bool,
    calls: Mutex<Vec<String>>,
}

impl ScriptedHardware {
    /// Hardware with a working camera and no scripted sensor readings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            location: None,
            battery: None,
            file: None,
            camera_works: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script a geolocation reading.
    #[must_use]
    pub fn with_location(mut self, fix: GeoFix) -> Self {
        self.location = Some(fix);
        self
    }

    /// Script a local battery percentage.
    #[must_use]
    pub fn with_battery(mut self, percent: f32) -> Self {
        self.battery = Some(percent);
        self
    }

    /// Script the file the user picks.
    #[must_use]
    pub fn with_file(mut self, name: &str) -> Self {
        self.file = Some(name.to_owned());
        self
    }

    /// Make camera opens fail as denied.
    #[must_use]
    pub fn with_broken_camera(mut self) -> Self {
        self.camera_works = false;
        self
    }

    /// Device calls made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        locked(&self.calls).clone()
    }

    fn record(&self, call: impl Into<String>) {
        locked(&self.calls).push(call.into());
    }
}

impl Default for ScriptedHardware {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HardwarePort for ScriptedHardware {
    async fn open_camera(&self) -> Result<()> {
        self.record("open_camera");
        if self.camera_works {
            Ok(())
        } else {
            Err(HudError::CapabilityDenied(
                "camera permission denied".to_owned(),
            ))
        }
    }

    async fn current_location(&self) -> Result<GeoFix> {
        self.record("current_location");
        self.location.ok_or_else(|| {
            HudError::CapabilityDenied("geolocation permission denied".to_owned())
        })
    }

    async fn battery_level(&self) -> Result<f32> {
        self.record("battery_level");
        self.battery
            .ok_or_else(|| HudError::CapabilityDenied("no battery sensor".to_owned()))
    }

    async fn vibrate(&self, millis: u64) -> Result<()> {
        self.record(format!("vibrate:{millis}"));
        Ok(())
    }

    async fn select_file(&self) -> Result<Option<String>> {
        self.record("select_file");
        Ok(self.file.clone())
    }
}
