/// DOM element ids the viewer binds to.
pub const SECTION_SELECT_ID: &str = "sectionSelect";
pub const PLAN_CANVAS_ID: &str = "viewer2D";
pub const SCENE_CANVAS_ID: &str = "viewer3D";
pub const INFO_ID: &str = "polygonInfo";
pub const LEGEND_BODY_SELECTOR: &str = "#legendTable tbody";
pub const STATUS_ID: &str = "status";
pub const FILE_INPUT_ID: &str = "file";
pub const EXPORT_SVG_ID: &str = "exportSvg";
pub const EXPORT_PNG_ID: &str = "exportPng";
pub const RESET_VIEW_ID: &str = "resetView";

/// Wheel zoom factor is `exp(-deltaY * WHEEL_ZOOM_RATE)`.
pub const WHEEL_ZOOM_RATE: f64 = 0.002;
/// Borehole marker radius on the plan canvas (px).
pub const BOREHOLE_RADIUS_PX: f64 = 5.0;
/// Hit radius around a borehole marker (px).
pub const BOREHOLE_PICK_PX: f64 = 8.0;
/// Distance from the press point within which a release counts as a click (px).
pub const CLICK_SLOP_PX: f64 = 3.0;
/// Orbit rotation per dragged pixel (radians).
pub const ORBIT_RAD_PER_PX: f64 = 0.005;
/// Grid line colors: center lines, then the rest.
pub const GRID_CENTER_COLOR: &str = "#444444";
pub const GRID_COLOR: &str = "#888888";
