//! Browser front end: a 2D plan canvas and a 3D scene canvas for one
//! selected cross-section, plus legend, info panel and exports.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlElement, HtmlSelectElement};

use section_core::{
    Dataset, Error, Highlight, Lighting, OrbitCamera, PlanView, SceneView, TriangulationMode,
    ViewSession, ViewerConfig,
};
use section_svg::{build_section_svg, render_png};

mod canvas;
mod constants;
mod dom;
mod plan_view;
mod scene_view;
mod state;
mod upload;
mod utils;

use canvas::init_canvas;
use constants::{
    EXPORT_PNG_ID, EXPORT_SVG_ID, PLAN_CANVAS_ID, RESET_VIEW_ID, SCENE_CANVAS_ID,
    SECTION_SELECT_ID,
};
use plan_view::draw_plan;
use state::{LoadState, State};
use utils::{asset_url, fetch_text_with_fallbacks, get_query_param};

/// Defaults overridden by `?data=`, `?tri=` query parameters.
fn config_from_query(search: &str) -> ViewerConfig {
    let mut cfg = ViewerConfig::default();
    if let Some(d) = get_query_param(search, "data").filter(|d| !d.is_empty()) {
        cfg.data_url = d;
    }
    if let Some(t) = get_query_param(search, "tri") {
        match TriangulationMode::parse(&t) {
            Some(mode) => cfg.triangulation = mode,
            None => log::warn!("unknown triangulation mode {t:?}, using fan"),
        }
    }
    cfg
}

/// Put the viewer into the load-error state and blank both views.
pub(crate) fn fail(s: &mut State, e: Error) {
    log::error!("{e}");
    s.load = LoadState::Failed(e.to_string());
    s.dataset = Dataset::default();
    s.plan = None;
    s.scene = None;
    s.highlight = Highlight::default();
    dom::update_status(&s.document, &s.load, None);
    dom::show_info(&s.document, None);
    dom::render_legend(&s.document, &s.dataset, &s.cfg.default_color);
    let _ = dom::populate_sections(&s.document, &s.dataset, "");
    draw_plan(s);
    s.scene_dirty = true;
}

/// Replace the dataset from document text and show `initial` (or the first
/// section).
pub(crate) fn load_dataset(s: &mut State, text: &str, initial: Option<&str>) {
    let dataset = match Dataset::from_json(text) {
        Ok(ds) => ds,
        Err(e) => return fail(s, e),
    };
    log::info!("loaded {} sections", dataset.sections.len());
    s.dataset = dataset;
    s.load = LoadState::Ready;
    dom::render_legend(&s.document, &s.dataset, &s.cfg.default_color);

    let name = initial
        .filter(|n| s.dataset.section(n).is_some())
        .map(str::to_string)
        .or_else(|| s.dataset.first_section().map(|sec| sec.name.clone()));
    let Some(name) = name else {
        fail(s, Error::Load("document has no sections".into()));
        return;
    };
    if let Err(e) = dom::populate_sections(&s.document, &s.dataset, &name) {
        log::warn!("could not fill section list: {e:?}");
    }
    select_section(s, &name);
}

/// Show a section from scratch: fresh transform, camera and highlight.
pub(crate) fn select_section(s: &mut State, name: &str) {
    let Some(section) = s.dataset.section(name) else {
        log::warn!("{}", Error::SectionNotFound(name.to_string()));
        return;
    };
    s.session = ViewSession::new(name, s.cfg.zoom_range());
    s.camera = OrbitCamera::default();
    s.plan_drag = None;
    s.orbit_drag = None;

    let mut note = None;
    s.plan = match PlanView::prepare(section, &s.cfg) {
        Ok(view) => Some(view),
        Err(e) => {
            note = Some(match e.diagnostic() {
                Some(d) => d.to_string(),
                None => {
                    log::warn!("{e}");
                    e.to_string()
                }
            });
            None
        }
    };
    s.scene = match SceneView::prepare(section, &s.cfg) {
        Ok(scene) => Some(scene),
        Err(e) => {
            log::warn!("{e}");
            None
        }
    };
    s.highlight = Highlight::new(s.plan.as_ref().map_or(0, |p| p.shapes.len()));

    let skipped = s.plan.as_ref().map_or(0, |p| p.diagnostics.len())
        + s.scene.as_ref().map_or(0, |sc| sc.diagnostics.len());
    if note.is_none() && skipped > 0 {
        note = Some(format!("{skipped} issue(s) in {name}, see console"));
    }
    dom::update_status(&s.document, &s.load, note.as_deref());
    dom::show_info(&s.document, None);
    draw_plan(s);
    s.scene_dirty = true;
}

fn export_file_stem(section: &str) -> String {
    let stem: String = section
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "section".to_string()
    } else {
        stem
    }
}

/// SVG of the plan as currently panned and zoomed.
fn current_svg(s: &State) -> Option<(String, u32, u32)> {
    let view = s.plan.as_ref()?;
    let section = s.current_section()?;
    Some(build_section_svg(view, section, &s.cfg, &s.session.transform))
}

fn export_svg(s: &State) -> Result<(), JsValue> {
    let Some((svg, _, _)) = current_svg(s) else {
        return Ok(());
    };
    let name = format!("{}.svg", export_file_stem(&s.session.section));
    utils::save_text_as_file(&s.document, &name, &svg)
}

fn export_png(s: &State) -> Result<(), JsValue> {
    let Some((svg, w_px, h_px)) = current_svg(s) else {
        return Ok(());
    };
    // No font database in the browser; the PNG carries geometry only.
    let bytes = render_png(&svg, w_px, h_px, usvg::fontdb::Database::new())
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let name = format!("{}.png", export_file_stem(&s.session.section));
    utils::save_bytes_as_file(&s.document, &name, &bytes)
}

fn on_click(
    state: &Rc<RefCell<State>>,
    id: &str,
    f: impl Fn(&mut State) + 'static,
) -> Result<(), JsValue> {
    let doc = state.borrow().document.clone();
    let Some(btn) = doc.get_element_by_id(id) else {
        return Ok(());
    };
    let btn: HtmlElement = btn.dyn_into()?;
    let st = state.clone();
    let onclick = Closure::<dyn FnMut()>::wrap(Box::new(move || {
        f(&mut st.borrow_mut());
    }));
    btn.set_onclick(Some(onclick.as_ref().unchecked_ref()));
    onclick.forget();
    Ok(())
}

fn attach_ui(state: Rc<RefCell<State>>) -> Result<(), JsValue> {
    let doc = state.borrow().document.clone();
    upload::attach_file_input(state.clone())?;
    plan_view::attach_plan_events(state.clone())?;
    scene_view::attach_scene_events(state.clone())?;

    if let Some(sel) = doc.get_element_by_id(SECTION_SELECT_ID) {
        let sel: HtmlSelectElement = sel.dyn_into()?;
        let st = state.clone();
        let sel_read = sel.clone();
        let onchange = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            select_section(&mut st.borrow_mut(), &sel_read.value());
        }));
        sel.set_onchange(Some(onchange.as_ref().unchecked_ref()));
        onchange.forget();
    }

    on_click(&state, RESET_VIEW_ID, |s| {
        s.session.reset();
        s.camera = OrbitCamera::default();
        draw_plan(s);
        s.scene_dirty = true;
    })?;
    on_click(&state, EXPORT_SVG_ID, |s| {
        if let Err(e) = export_svg(s) {
            log::error!("SVG export failed: {e:?}");
        }
    })?;
    on_click(&state, EXPORT_PNG_ID, |s| {
        if let Err(e) = export_png(s) {
            log::error!("PNG export failed: {e:?}");
        }
    })?;
    Ok(())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let search = window.location().search().unwrap_or_default();
    let level = get_query_param(&search, "log")
        .and_then(|l| l.parse::<log::Level>().ok())
        .unwrap_or(log::Level::Info);
    // A second init (hot reload) keeps the first logger.
    let _ = console_log::init_with_level(level);

    let cfg = config_from_query(&search);
    let (plan_canvas, plan_ctx) = init_canvas(&document, PLAN_CANVAS_ID)?;
    plan_canvas.set_width(cfg.plan_width.round().max(1.0) as u32);
    plan_canvas.set_height(cfg.plan_height.round().max(1.0) as u32);
    let (scene_canvas, scene_ctx) = init_canvas(&document, SCENE_CANVAS_ID)?;

    let state = Rc::new(RefCell::new(State {
        window: window.clone(),
        document,
        plan_canvas,
        plan_ctx,
        scene_canvas,
        scene_ctx,
        session: ViewSession::new("", cfg.zoom_range()),
        cfg,
        load: LoadState::Loading,
        dataset: Dataset::default(),
        plan: None,
        scene: None,
        highlight: Highlight::default(),
        camera: OrbitCamera::default(),
        lighting: Lighting::default(),
        plan_drag: None,
        orbit_drag: None,
        scene_dirty: true,
    }));

    {
        let s = state.borrow();
        dom::update_status(&s.document, &s.load, None);
    }
    attach_ui(state.clone())?;
    scene_view::start_animation(state.clone());

    let initial = get_query_param(&search, "section");
    let url = state.borrow().cfg.data_url.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let fetched = fetch_text_with_fallbacks(&window, &[&asset_url(&url), &url]).await;
        let mut s = state.borrow_mut();
        match fetched {
            Ok(text) => load_dataset(&mut s, &text, initial.as_deref()),
            Err(e) => fail(&mut s, Error::Load(e)),
        }
    });
    Ok(())
}
