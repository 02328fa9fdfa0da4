use serde::{Deserialize, Serialize};

/// Neutral fill used when a polygon carries no color.
pub const DEFAULT_COLOR: &str = "#cccccc";

/// How polygon rings are split into triangles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriangulationMode {
    /// Triangles `(0, i, i + 1)` around vertex 0. Only correct for rings that
    /// vertex 0 can fully see (convex rings among them).
    #[default]
    Fan,
    /// Ear clipping; correct for any simple ring.
    #[serde(alias = "earcut")]
    EarClip,
}

impl TriangulationMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fan" => Some(TriangulationMode::Fan),
            "earcut" | "earclip" | "ear_clip" => Some(TriangulationMode::EarClip),
            _ => None,
        }
    }
}

/// Viewer-wide settings. Every field has a default so partial JSON works.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// URL of the section data document.
    pub data_url: String,
    /// Plan view size in px.
    pub plan_width: f64,
    pub plan_height: f64,
    /// Inset between the plan edge and the scaled data, in px.
    pub plan_margin: f64,
    /// Cumulative zoom limits relative to the base scale.
    pub zoom_min: f64,
    pub zoom_max: f64,
    /// Divisor applied to raw 3D coordinates before rendering.
    pub world_scale: f64,
    pub grid_divisions: u32,
    pub default_color: String,
    pub triangulation: TriangulationMode,
    /// Whether borehole positions count toward the plan extent.
    pub include_boreholes: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            data_url: "CS Example Data File.json".to_string(),
            plan_width: 500.0,
            plan_height: 500.0,
            plan_margin: 50.0,
            zoom_min: 0.5,
            zoom_max: 5.0,
            world_scale: 5.0,
            grid_divisions: 10,
            default_color: DEFAULT_COLOR.to_string(),
            triangulation: TriangulationMode::Fan,
            include_boreholes: true,
        }
    }
}

impl ViewerConfig {
    pub fn from_json(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Zoom limits, swapped into order if configured backwards.
    pub fn zoom_range(&self) -> (f64, f64) {
        if self.zoom_min <= self.zoom_max {
            (self.zoom_min, self.zoom_max)
        } else {
            (self.zoom_max, self.zoom_min)
        }
    }
}
