//! 3D canvas: a software painter's-algorithm renderer with an orbit camera.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, MouseEvent, WheelEvent};

use section_core::painter_faces;

use crate::canvas::{line, set_fill_style, set_stroke_style};
use crate::constants::{GRID_CENTER_COLOR, GRID_COLOR, ORBIT_RAD_PER_PX, WHEEL_ZOOM_RATE};
use crate::state::{OrbitDrag, State};
use crate::utils::sync_canvas_size;

pub fn draw_scene(s: &State) {
    sync_canvas_size(&s.window, &s.scene_canvas);
    let ctx = &s.scene_ctx;
    let w = s.scene_canvas.width() as f64;
    let h = s.scene_canvas.height() as f64;
    set_fill_style(ctx, "#ffffff");
    ctx.fill_rect(0.0, 0.0, w, h);
    let Some(scene) = &s.scene else {
        return;
    };

    ctx.set_line_width(1.0);
    let divisions = scene.grid.divisions as usize;
    for (j, (a, b)) in scene.grid.lines().into_iter().enumerate() {
        let (Some(pa), Some(pb)) = (s.camera.project(a, w, h), s.camera.project(b, w, h)) else {
            continue;
        };
        // Two lines per division step; the middle step is the center cross.
        let color = if 2 * (j / 2) == divisions {
            GRID_CENTER_COLOR
        } else {
            GRID_COLOR
        };
        set_stroke_style(ctx, color);
        line(ctx, pa.screen, pb.screen);
    }

    ctx.set_line_width(0.5);
    for face in painter_faces(&scene.meshes, &s.camera, &s.lighting, w, h) {
        let [a, b, c] = face.points;
        let fill = face.fill.to_hex();
        ctx.begin_path();
        ctx.move_to(a.x, a.y);
        ctx.line_to(b.x, b.y);
        ctx.line_to(c.x, c.y);
        ctx.close_path();
        set_fill_style(ctx, &fill);
        ctx.fill();
        // Same-color hairline hides seams between adjacent triangles.
        set_stroke_style(ctx, &fill);
        ctx.stroke();
    }
}

pub fn attach_scene_events(state: Rc<RefCell<State>>) -> Result<(), JsValue> {
    let canvas = state.borrow().scene_canvas.clone();

    {
        let st = state.clone();
        let mousedown = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            st.borrow_mut().orbit_drag = Some(OrbitDrag {
                last: (e.client_x() as f64, e.client_y() as f64),
                pan: e.button() == 2 || e.shift_key(),
            });
        }));
        canvas.add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())?;
        mousedown.forget();
    }

    {
        let st = state.clone();
        let mousemove = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            let mut s = st.borrow_mut();
            let Some(drag) = s.orbit_drag else {
                return;
            };
            let p = (e.client_x() as f64, e.client_y() as f64);
            let (dx, dy) = (p.0 - drag.last.0, p.1 - drag.last.1);
            if drag.pan {
                s.camera.pan(dx, dy);
            } else {
                s.camera.rotate(-dx * ORBIT_RAD_PER_PX, dy * ORBIT_RAD_PER_PX);
            }
            s.orbit_drag = Some(OrbitDrag { last: p, ..drag });
            s.scene_dirty = true;
        }));
        canvas.add_event_listener_with_callback("mousemove", mousemove.as_ref().unchecked_ref())?;
        mousemove.forget();
    }

    {
        let st = state.clone();
        let release = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |_e: MouseEvent| {
            st.borrow_mut().orbit_drag = None;
        }));
        canvas.add_event_listener_with_callback("mouseup", release.as_ref().unchecked_ref())?;
        canvas.add_event_listener_with_callback("mouseleave", release.as_ref().unchecked_ref())?;
        release.forget();
    }

    {
        let st = state.clone();
        let wheel = Closure::<dyn FnMut(WheelEvent)>::wrap(Box::new(move |e: WheelEvent| {
            e.prevent_default();
            let mut s = st.borrow_mut();
            s.camera.dolly((e.delta_y() * WHEEL_ZOOM_RATE).exp());
            s.scene_dirty = true;
        }));
        canvas.add_event_listener_with_callback("wheel", wheel.as_ref().unchecked_ref())?;
        wheel.forget();
    }

    {
        // Right-drag pans; keep the browser menu out of the way.
        let contextmenu = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |e: Event| {
            e.prevent_default();
        }));
        canvas
            .add_event_listener_with_callback("contextmenu", contextmenu.as_ref().unchecked_ref())?;
        contextmenu.forget();
    }

    {
        let st = state.clone();
        let window = state.borrow().window.clone();
        let onresize = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            st.borrow_mut().scene_dirty = true;
        }));
        window.add_event_listener_with_callback("resize", onresize.as_ref().unchecked_ref())?;
        onresize.forget();
    }

    Ok(())
}

/// Repaint the scene on animation frames where something changed.
pub fn start_animation(state: Rc<RefCell<State>>) {
    type RafClosure = Closure<dyn FnMut(f64)>;
    let f: Rc<RefCell<Option<RafClosure>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    let window = state.borrow().window.clone();
    let win = window.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
        {
            let mut s = state.borrow_mut();
            if s.scene_dirty {
                s.scene_dirty = false;
                draw_scene(&s);
            }
        }
        if let Some(cb) = f.borrow().as_ref() {
            let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(cb) = g.borrow().as_ref() {
        let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
