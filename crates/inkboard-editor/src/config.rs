use serde::Deserialize;

/// Startup settings for an editor session. Every field has a default, so a
/// partial (or empty) JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Brush size in screen pixels.
    pub brush_size: f64,
    pub brush_color: String,
    /// Longest side, in screen pixels, of a freshly placed icon.
    pub icon_max_size: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom multiplier per unit of wheel delta.
    pub wheel_zoom_base: f64,
    pub icons_selectable: bool,
    pub lines_selectable: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            canvas_height: 600.0,
            brush_size: 5.0,
            brush_color: "#ffffff".to_string(),
            icon_max_size: 100.0,
            min_zoom: 0.1,
            max_zoom: 10.0,
            wheel_zoom_base: 0.999,
            icons_selectable: true,
            lines_selectable: true,
        }
    }
}
