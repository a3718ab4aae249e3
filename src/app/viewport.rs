use eframe::egui::{Vec2, vec2};

const ZOOM_FLOOR: f32 = 1e-3;
const WHEEL_ZOOM_OUT: f32 = 0.9;
const WHEEL_ZOOM_IN: f32 = 1.1;
const BUTTON_ZOOM_STEP: f32 = 1.1;
const BUTTON_ZOOM_MIN: f32 = 0.5;
const BUTTON_ZOOM_MAX: f32 = 3.0;

/// Pan/zoom transform between canvas-local screen coordinates and world
/// coordinates: `screen = world * zoom + pan`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Viewport {
    zoom: f32,
    pan: Vec2,
    zoom_min: f32,
    zoom_max: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.1, 5.0)
    }
}

impl Viewport {
    pub(crate) fn new(zoom_min: f32, zoom_max: f32) -> Self {
        let zoom_min = if zoom_min.is_finite() {
            zoom_min.max(ZOOM_FLOOR)
        } else {
            ZOOM_FLOOR
        };
        let zoom_max = if zoom_max.is_finite() {
            zoom_max.max(ZOOM_FLOOR)
        } else {
            zoom_min
        };
        let (zoom_min, zoom_max) = if zoom_min <= zoom_max {
            (zoom_min, zoom_max)
        } else {
            (zoom_max, zoom_min)
        };

        Self {
            zoom: 1.0_f32.clamp(zoom_min, zoom_max),
            pan: Vec2::ZERO,
            zoom_min,
            zoom_max,
        }
    }

    pub(crate) fn zoom(&self) -> f32 {
        self.zoom
    }

    pub(crate) fn pan(&self) -> Vec2 {
        self.pan
    }

    pub(crate) fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.pan) / self.zoom
    }

    pub(crate) fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world * self.zoom + self.pan
    }

    pub(crate) fn zoom_by(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.zoom = (self.zoom * factor).clamp(self.zoom_min, self.zoom_max);
    }

    /// Positive deltas scroll away from the canvas and zoom out.
    pub(crate) fn wheel(&mut self, delta_y: f32) {
        if delta_y > 0.0 {
            self.zoom_by(WHEEL_ZOOM_OUT);
        } else {
            self.zoom_by(WHEEL_ZOOM_IN);
        }
    }

    fn button_bounds(&self) -> (f32, f32) {
        let low = BUTTON_ZOOM_MIN.clamp(self.zoom_min, self.zoom_max);
        let high = BUTTON_ZOOM_MAX.clamp(self.zoom_min, self.zoom_max);
        (low, high)
    }

    pub(crate) fn zoom_in_button(&mut self) {
        let (low, high) = self.button_bounds();
        self.zoom = (self.zoom * BUTTON_ZOOM_STEP).clamp(low, high);
    }

    pub(crate) fn zoom_out_button(&mut self) {
        let (low, high) = self.button_bounds();
        self.zoom = (self.zoom / BUTTON_ZOOM_STEP).clamp(low, high);
    }

    pub(crate) fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    pub(crate) fn reset(&mut self) {
        self.zoom = 1.0_f32.clamp(self.zoom_min, self.zoom_max);
        self.pan = vec2(0.0, 0.0);
    }
}
