//! Hardware capability detection and side-effecting device access.
//!
//! The probe answers "is this feature available at all"; the [`HardwarePort`]
//! performs the actual device calls. Keeping them separate lets dispatch
//! logic run against substitute implementations in environments without
//! real hardware.

use crate::error::{HudError, Result};
use async_trait::async_trait;
use std::collections::HashSet;

/// A hardware or platform feature the HUD may rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    SpeechRecognition,
    SpeechSynthesis,
    Geolocation,
    Camera,
    Vibration,
    Battery,
    Notifications,
}

impl Capability {
    /// Every capability the probe can be asked about.
    pub const ALL: [Capability; 7] = [
        Capability::SpeechRecognition,
        Capability::SpeechSynthesis,
        Capability::Geolocation,
        Capability::Camera,
        Capability::Vibration,
        Capability::Battery,
        Capability::Notifications,
    ];
}

/// Uniform presence check for platform features.
///
/// Pure query with no side effects, re-evaluated on each call; the probe
/// does not cache even though capabilities are assumed stable for the
/// session.
pub trait CapabilityProbe: Send + Sync {
    /// Whether the given capability is available right now.
    fn has(&self, capability: Capability) -> bool;
}

/// Probe backed by a fixed capability set.
///
/// The default substitutable implementation for embedders and tests.
#[derive(Debug, Clone, Default)]
pub struct FixedCapabilities {
    present: HashSet<Capability>,
}

impl FixedCapabilities {
    /// Probe that reports every capability present.
    #[must_use]
    pub fn all() -> Self {
        Self {
            present: Capability::ALL.iter().copied().collect(),
        }
    }

    /// Probe that reports no capability present.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Probe that reports exactly the given capabilities present.
    pub fn with(capabilities: impl IntoIterator<Item = Capability>) -> Self {
        Self {
            present: capabilities.into_iter().collect(),
        }
    }
}

impl CapabilityProbe for FixedCapabilities {
    fn has(&self, capability: Capability) -> bool {
        self.present.contains(&capability)
    }
}

/// A geolocation reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoFix {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// Side-effect port for local device access.
///
/// Every call is asynchronous and may suspend the calling flow (permission
/// prompts, sensor warm-up) without blocking other flows. Denied permission
/// surfaces as [`HudError::CapabilityDenied`].
#[async_trait]
pub trait HardwarePort: Send + Sync {
    /// Open the camera for a visual scan.
    async fn open_camera(&self) -> Result<()>;

    /// Read the current geolocation.
    async fn current_location(&self) -> Result<GeoFix>;

    /// Read the local battery charge as a percentage (0–100).
    async fn battery_level(&self) -> Result<f32>;

    /// Fire a haptic pulse of the given duration.
    async fn vibrate(&self, millis: u64) -> Result<()>;

    /// Prompt the user to pick a file. `None` means the prompt was dismissed.
    async fn select_file(&self) -> Result<Option<String>>;
}

/// Hardware port for headless environments: every device call is denied.
#[derive(Debug, Clone, Copy, Default)]
pub struct InertHardware;

#[async_trait]
impl HardwarePort for InertHardware {
    async fn open_camera(&self) -> Result<()> {
        Err(HudError::CapabilityDenied("no camera attached".to_owned()))
    }

    async fn current_location(&self) -> Result<GeoFix> {
        Err(HudError::CapabilityDenied(
            "no geolocation source".to_owned(),
        ))
    }

    async fn battery_level(&self) -> Result<f32> {
        Err(HudError::CapabilityDenied("no battery sensor".to_owned()))
    }

    async fn vibrate(&self, _millis: u64) -> Result<()> {
        Err(HudError::CapabilityDenied("no haptic motor".to_owned()))
    }

    async fn select_file(&self) -> Result<Option<String>> {
        Err(HudError::CapabilityDenied("no file picker".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn fixed_probe_reports_configured_set() {
        let probe = FixedCapabilities::with([Capability::Camera, Capability::Battery]);
        assert!(probe.has(Capability::Camera));
        assert!(probe.has(Capability::Battery));
        assert!(!probe.has(Capability::Geolocation));
        assert!(!probe.has(Capability::SpeechSynthesis));
    }

    #[test]
    fn all_and_none_cover_every_capability() {
        let everything = FixedCapabilities::all();
        let nothing = FixedCapabilities::none();
        for capability in Capability::ALL {
            assert!(everything.has(capability));
            assert!(!nothing.has(capability));
        }
    }

    #[tokio::test]
    async fn inert_hardware_denies_every_call() {
        let hardware = InertHardware;
        assert!(matches!(
            hardware.open_camera().await,
            Err(HudError::CapabilityDenied(_))
        ));
        assert!(matches!(
            hardware.current_location().await,
            Err(HudError::CapabilityDenied(_))
        ));
        assert!(matches!(
            hardware.battery_level().await,
            Err(HudError::CapabilityDenied(_))
        ));
    }
}
