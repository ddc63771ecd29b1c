//! Screen-to-device coordinate translation

use super::discovery::TouchDeviceInfo;
use serde::{Deserialize, Serialize};

/// Display size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    /// Used when the device cannot report its size
    pub const DEFAULT: ScreenSize = ScreenSize {
        width: 1080,
        height: 1920,
    };

    /// `None` unless both dimensions are positive
    pub fn new(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn scale(position: f64, extent: u32, min: i32, max: i32) -> i32 {
    let ratio = position / f64::from(extent.max(1));
    // NaN would otherwise survive the clamp and cast to 0
    let normalized = if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    };
    let span = f64::from(max) - f64::from(min);
    (f64::from(min) + normalized * span).round() as i32
}

/// Map screen pixel coordinates onto the device's native axis ranges.
///
/// Coordinates outside the screen are clamped to its edges.
pub fn translate(x: f64, y: f64, screen: ScreenSize, device: &TouchDeviceInfo) -> (i32, i32) {
    (
        scale(x, screen.width, device.min_x, device.max_x),
        scale(y, screen.height, device.min_y, device.max_y),
    )
}
