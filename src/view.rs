//! Presentation collaborator interface.
//!
//! The core never touches layout or styling; everything visual goes through
//! this small, stable surface. Implementations are expected to be cheap and
//! non-blocking since they are called from dispatch and poll paths.

use crate::backend::Notification;

/// Rendering collaborator consumed (never produced) by the core.
pub trait HudView: Send + Sync {
    /// Display a transient message on the HUD.
    fn show_message(&self, text: &str);

    /// Update a named stat bar ("cpu", "ram", "battery") to a percentage.
    fn update_bar(&self, name: &str, percent: f32);

    /// Update the sensor-suite location readout.
    fn set_location_text(&self, text: &str);

    /// Prepend a notification to the display list.
    fn prepend_notification(&self, item: &Notification);

    /// Show or hide a named panel.
    fn toggle_panel(&self, name: &str, visible: bool);
}

/// View that discards everything. For headless sessions and benchmarks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullView;

impl HudView for NullView {
    fn show_message(&self, _text: &str) {}
    fn update_bar(&self, _name: &str, _percent: f32) {}
    fn set_location_text(&self, _text: &str) {}
    fn prepend_notification(&self, _item: &Notification) {}
    fn toggle_panel(&self, _name: &str, _visible: bool) {}
}
