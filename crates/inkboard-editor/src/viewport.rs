//! Pan/zoom view onto the scene.
//!
//! The view is a uniform scale plus a translation:
//! `screen = scene * zoom + offset`.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    zoom: f64,
    offset_x: f64,
    offset_y: f64,
    min_zoom: f64,
    max_zoom: f64,
}

const DEFAULT_MIN_ZOOM: f64 = 0.1;
const DEFAULT_MAX_ZOOM: f64 = 10.0;

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM)
    }
}

impl Viewport {
    /// Bounds that are not finite and positive fall back to the defaults;
    /// swapped bounds are reordered.
    pub fn new(min_zoom: f64, max_zoom: f64) -> Self {
        let usable = |z: f64| z.is_finite() && z > 0.0;
        let min = if usable(min_zoom) { min_zoom } else { DEFAULT_MIN_ZOOM };
        let max = if usable(max_zoom) { max_zoom } else { DEFAULT_MAX_ZOOM };
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        if (min, max) != (min_zoom, max_zoom) {
            log::warn!("viewport: zoom bounds [{min_zoom}, {max_zoom}] adjusted to [{min}, {max}]");
        }
        Self {
            zoom: 1.0_f64.clamp(min, max),
            offset_x: 0.0,
            offset_y: 0.0,
            min_zoom: min,
            max_zoom: max,
        }
    }

    pub fn zoom_bounds(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn offset(&self) -> (f64, f64) {
        (self.offset_x, self.offset_y)
    }

    /// Affine coefficients `[a, b, c, d, e, f]`, canvas-2D order.
    pub fn transform(&self) -> [f64; 6] {
        [self.zoom, 0.0, 0.0, self.zoom, self.offset_x, self.offset_y]
    }

    /// A NaN request keeps the current zoom.
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return self.zoom;
        }
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    pub fn to_scene(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.offset_x) / self.zoom, (y - self.offset_y) / self.zoom)
    }

    pub fn to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.zoom + self.offset_x, y * self.zoom + self.offset_y)
    }

    /// Set the zoom (clamped) keeping the scene point under screen point
    /// (`x`, `y`) fixed. Returns the zoom actually applied.
    pub fn zoom_to_point(&mut self, x: f64, y: f64, zoom: f64) -> f64 {
        let (sx, sy) = self.to_scene(x, y);
        self.zoom = self.clamp_zoom(zoom);
        self.offset_x = x - sx * self.zoom;
        self.offset_y = y - sy * self.zoom;
        self.zoom
    }

    /// Wheel zoom: `zoom * base^delta_y`, anchored at the pointer.
    pub fn wheel_zoom(&mut self, x: f64, y: f64, delta_y: f64, base: f64) -> f64 {
        let zoom = self.zoom * base.powf(delta_y);
        self.zoom_to_point(x, y, zoom)
    }

    /// Translate the view by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }
}
