use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, Window};

use section_core::{
    Dataset, DragTracker, Highlight, Lighting, OrbitCamera, PlanView, SceneView, ViewSession,
    ViewerConfig,
};

/// Where the data document is in its lifecycle.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

/// A pointer press on the scene canvas. `pan` is set for right or
/// shift-drag.
#[derive(Clone, Copy, Debug)]
pub struct OrbitDrag {
    pub last: (f64, f64),
    pub pan: bool,
}

/// Global application state stored behind an `Rc<RefCell<_>>` so it can be
/// shared across the WASM callbacks.
pub struct State {
    pub window: Window,
    pub document: Document,
    pub plan_canvas: HtmlCanvasElement,
    pub plan_ctx: CanvasRenderingContext2d,
    pub scene_canvas: HtmlCanvasElement,
    pub scene_ctx: CanvasRenderingContext2d,
    pub cfg: ViewerConfig,
    pub load: LoadState,
    pub dataset: Dataset,
    /// `None` when the current section has no plan extent.
    pub plan: Option<PlanView>,
    pub scene: Option<SceneView>,
    pub session: ViewSession,
    pub highlight: Highlight,
    pub camera: OrbitCamera,
    pub lighting: Lighting,
    pub plan_drag: Option<DragTracker>,
    pub orbit_drag: Option<OrbitDrag>,
    /// Set when the scene canvas needs a repaint on the next frame.
    pub scene_dirty: bool,
}

impl State {
    pub fn current_section(&self) -> Option<&section_core::Section> {
        self.dataset.section(&self.session.section)
    }
}
