//! Host map service.

use serde::Serialize;

/// The map a layer is mounted on.
///
/// `trigger_repaint` only schedules a frame; calling it several times
/// before the next frame is harmless.
pub trait MapHost {
    fn zoom(&self) -> f64;

    /// Canvas size in pixels.
    fn size(&self) -> (u32, u32);

    fn bearing(&self) -> f64;

    fn pitch(&self) -> f64;

    fn trigger_repaint(&self);
}

/// Camera state read once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ViewState {
    pub zoom: f64,
    pub width: u32,
    pub height: u32,
    pub bearing: f64,
    pub pitch: f64,
}

impl ViewState {
    pub fn capture(host: &dyn MapHost) -> Self {
        let (width, height) = host.size();
        Self {
            zoom: host.zoom(),
            width,
            height,
            bearing: host.bearing(),
            pitch: host.pitch(),
        }
    }

    /// Scale factor between world units and tiles at this zoom.
    pub fn zoom_factor(&self) -> f64 {
        2f64.powf(self.zoom)
    }
}
