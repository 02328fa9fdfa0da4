//! Geometry pipeline for geological cross-section viewers.
//!
//! A data document is normalized into [`Dataset`] sections. A section is then
//! prepared either as a [`PlanView`] (extent, linear scales, triangulated
//! shapes) or as a [`SceneView`] (world-space meshes, grid). Pan and zoom go
//! through [`ViewTransform`] and never touch the prepared topology.

pub mod axis;
pub mod color;
pub mod config;
pub mod error;
pub mod extent;
pub mod legend;
pub mod model;
pub mod plan;
pub mod scale;
pub mod scene;
pub mod triangulate;
pub mod view;

pub use axis::{Tick, axis_ticks, plan_axes};
pub use color::{Rgb, normalize_color};
pub use config::{DEFAULT_COLOR, TriangulationMode, ViewerConfig};
pub use error::{Diagnostic, Error, Result, Space};
pub use extent::{Bounds3, Extent, PlanExtent};
pub use legend::{InfoPanel, LegendEntry, build_legend};
pub use model::{Borehole, Dataset, Point, Point3, Polygon, Section};
pub use plan::{Highlight, Outline, PlanShape, PlanView};
pub use scale::{LinearScale, PlanScales};
pub use scene::{GridHelper, Lighting, Mesh, OrbitCamera, SceneView, painter_faces};
pub use triangulate::{Triangulator, fan_triangulate};
pub use view::{DragTracker, Gesture, ViewSession, ViewTransform, compose};
