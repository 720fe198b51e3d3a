//! Zoom and pan state.

use super::transform::{ScreenPoint, ScreenVector, WorldPoint, to_world};

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.25;
/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 3.0;
/// Multiplier applied by the zoom-in button.
pub const BUTTON_ZOOM_IN: f64 = 1.25;
/// Multiplier applied by the zoom-out button.
pub const BUTTON_ZOOM_OUT: f64 = 0.8;
/// Additive zoom change per modified wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 0.1;

/// Clamp a requested zoom into `[MIN_ZOOM, MAX_ZOOM]`.
pub fn clamp_zoom(zoom: f64) -> f64 {
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// The mapping between world and screen space.
///
/// `zoom` is kept inside `[MIN_ZOOM, MAX_ZOOM]` by every mutation, so the
/// transform never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    zoom: f64,
    pan: ScreenVector,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: ScreenVector::ZERO,
        }
    }
}

impl Viewport {
    /// Build a viewport, clamping the zoom.
    pub fn new(zoom: f64, pan: ScreenVector) -> Self {
        let zoom = if zoom.is_nan() { 1.0 } else { clamp_zoom(zoom) };
        Self { zoom, pan }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> ScreenVector {
        self.pan
    }

    /// Set the zoom factor. Returns `false` when the clamped value equals the
    /// current zoom, in which case nothing changed.
    pub fn set_zoom(&mut self, target: f64) -> bool {
        if target.is_nan() {
            return false;
        }
        let zoom = clamp_zoom(target);
        if zoom == self.zoom {
            return false;
        }
        self.zoom = zoom;
        true
    }

    pub fn set_pan(&mut self, pan: ScreenVector) {
        self.pan = pan;
    }

    /// Zoom so that the world point currently under `anchor` stays there.
    pub fn zoom_about_screen_point(&mut self, anchor: ScreenPoint, zoom: f64) -> bool {
        let world = to_world(anchor, self);
        self.zoom_keeping(anchor, world, zoom)
    }

    /// Zoom so that `world` ends up under `anchor`.
    ///
    /// Pinch gestures call this with a world point frozen at gesture start.
    pub fn zoom_keeping(&mut self, anchor: ScreenPoint, world: WorldPoint, zoom: f64) -> bool {
        if !self.set_zoom(zoom) {
            return false;
        }
        self.pan = ScreenVector::new(anchor.x - world.x * self.zoom, anchor.y - world.y * self.zoom);
        true
    }

    /// One zoom-in button step about `anchor`.
    pub fn zoom_in(&mut self, anchor: ScreenPoint) -> bool {
        self.zoom_about_screen_point(anchor, self.zoom * BUTTON_ZOOM_IN)
    }

    /// One zoom-out button step about `anchor`.
    pub fn zoom_out(&mut self, anchor: ScreenPoint) -> bool {
        self.zoom_about_screen_point(anchor, self.zoom * BUTTON_ZOOM_OUT)
    }

    /// Modified wheel zoom. Scrolling up (negative `delta_y`) zooms in.
    pub fn wheel_zoom(&mut self, anchor: ScreenPoint, delta_y: f64) -> bool {
        if delta_y == 0.0 {
            return false;
        }
        let step = if delta_y < 0.0 {
            WHEEL_ZOOM_STEP
        } else {
            -WHEEL_ZOOM_STEP
        };
        self.zoom_about_screen_point(anchor, self.zoom + step)
    }

    /// Back to zoom 1 with no pan.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Zoom as a whole percentage, for display.
    pub fn percent(&self) -> i32 {
        (self.zoom * 100.0).round() as i32
    }
}
