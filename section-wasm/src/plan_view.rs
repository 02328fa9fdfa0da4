//! 2D plan canvas: drawing and pointer interaction.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, MouseEvent, WheelEvent};

use section_core::{
    DragTracker, Gesture, InfoPanel, Outline, PlanView, Point, ViewTransform, plan_axes,
};

use crate::canvas::{fill_triangles, line, set_fill_style, set_stroke_style, stroke_ring};
use crate::constants::{BOREHOLE_PICK_PX, BOREHOLE_RADIUS_PX, CLICK_SLOP_PX, WHEEL_ZOOM_RATE};
use crate::dom::show_info;
use crate::state::State;
use crate::utils::event_canvas_coords;

pub fn draw_plan(s: &State) {
    let ctx = &s.plan_ctx;
    let w = s.plan_canvas.width() as f64;
    let h = s.plan_canvas.height() as f64;
    set_fill_style(ctx, "#ffffff");
    ctx.fill_rect(0.0, 0.0, w, h);

    let Some(view) = &s.plan else {
        set_fill_style(ctx, "#666666");
        ctx.set_font("14px sans-serif");
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        let _ = ctx.fill_text("No 2D data for this section", w / 2.0, h / 2.0);
        return;
    };
    let t = &s.session.transform;
    let m = s.cfg.plan_margin;

    ctx.save();
    ctx.begin_path();
    ctx.rect(m, m, (w - 2.0 * m).max(0.0), (h - 2.0 * m).max(0.0));
    ctx.clip();
    for shape in &view.shapes {
        fill_triangles(ctx, &shape.triangles(&view.scales, t), &shape.color);
    }
    // Outlines after all fills so a selected stroke is never painted over.
    for (i, shape) in view.shapes.iter().enumerate() {
        let outline = s.highlight.outlines.get(i).copied().unwrap_or(Outline::Normal);
        let (color, width) = outline.stroke();
        stroke_ring(ctx, &view.screen_ring(shape, t), color, width);
    }
    draw_boreholes(s, ctx, view, t);
    ctx.restore();

    draw_axes(ctx, view, t, w, h, m);
}

fn draw_boreholes(s: &State, ctx: &CanvasRenderingContext2d, view: &PlanView, t: &ViewTransform) {
    let Some(section) = s.current_section() else {
        return;
    };
    ctx.set_font("11px sans-serif");
    ctx.set_text_align("center");
    ctx.set_text_baseline("bottom");
    ctx.set_line_width(2.0);
    for (i, b) in section.boreholes.iter().enumerate() {
        let Some(p) = view.borehole_screen(i, t) else {
            continue;
        };
        ctx.begin_path();
        let _ = ctx.arc(p.x, p.y, BOREHOLE_RADIUS_PX, 0.0, std::f64::consts::TAU);
        set_fill_style(ctx, "#ffffff");
        ctx.fill();
        set_stroke_style(ctx, "#1f4e9c");
        ctx.stroke();
        if let Some(name) = &b.name {
            set_fill_style(ctx, "#1f4e9c");
            let _ = ctx.fill_text(name, p.x, p.y - BOREHOLE_RADIUS_PX - 3.0);
        }
    }
}

fn draw_axes(
    ctx: &CanvasRenderingContext2d,
    view: &PlanView,
    t: &ViewTransform,
    w: f64,
    h: f64,
    m: f64,
) {
    let (x_ticks, y_ticks) = plan_axes(&view.scales, t);
    let axis_y = h - m;
    ctx.set_line_width(1.0);
    set_stroke_style(ctx, "#000000");
    set_fill_style(ctx, "#000000");
    ctx.set_font("10px sans-serif");
    line(ctx, Point::from((m, axis_y)), Point::from((w - m, axis_y)));
    line(ctx, Point { x: m, y: m }, Point { x: m, y: axis_y });

    ctx.set_text_align("center");
    ctx.set_text_baseline("top");
    for tick in x_ticks.iter().filter(|k| k.offset >= m - 0.5 && k.offset <= w - m + 0.5) {
        line(
            ctx,
            Point::from((tick.offset, axis_y)),
            Point::from((tick.offset, axis_y + 6.0)),
        );
        let _ = ctx.fill_text(&tick.label, tick.offset, axis_y + 8.0);
    }
    ctx.set_text_align("right");
    ctx.set_text_baseline("middle");
    for tick in y_ticks.iter().filter(|k| k.offset >= m - 0.5 && k.offset <= h - m + 0.5) {
        line(
            ctx,
            Point::from((m - 6.0, tick.offset)),
            Point::from((m, tick.offset)),
        );
        let _ = ctx.fill_text(&tick.label, m - 9.0, tick.offset);
    }
}

/// Hover: outlines and borehole info. Click: select a polygon or show a borehole.
fn pick(s: &mut State, p: Point, clicked: bool) {
    let t = s.session.transform;
    let Some(view) = &s.plan else {
        return;
    };
    let borehole = view.pick_borehole(p, &t, BOREHOLE_PICK_PX);
    let shape = view.pick_shape(p, &t);
    let polygon = shape.map(|i| view.shapes[i].polygon);

    let mut redraw = s.highlight.hover(shape);
    if let Some(section) = s.dataset.section(&s.session.section) {
        if let Some(b) = borehole.and_then(|i| section.boreholes.get(i)) {
            show_info(&s.document, Some(&InfoPanel::borehole(b)));
        } else if clicked && let Some(poly) = polygon.and_then(|i| section.polygons.get(i)) {
            s.highlight.click(shape);
            show_info(&s.document, Some(&InfoPanel::polygon(poly)));
            redraw = true;
        }
    }
    if redraw {
        draw_plan(s);
    }
}

pub fn attach_plan_events(state: Rc<RefCell<State>>) -> Result<(), JsValue> {
    let canvas = state.borrow().plan_canvas.clone();

    {
        let st = state.clone();
        let mousedown = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            let mut s = st.borrow_mut();
            let p = event_canvas_coords(&e, &s.plan_canvas);
            s.plan_drag = Some(DragTracker::press(p, CLICK_SLOP_PX));
        }));
        canvas.add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())?;
        mousedown.forget();
    }

    {
        let st = state.clone();
        let mousemove = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            let mut s = st.borrow_mut();
            let p = event_canvas_coords(&e, &s.plan_canvas);
            match s.plan_drag {
                Some(mut drag) => {
                    let pan = drag.move_to(p);
                    s.plan_drag = Some(drag);
                    if let Some(g) = pan {
                        s.session.handle(g);
                        draw_plan(&s);
                    }
                }
                None => pick(&mut s, p, false),
            }
        }));
        canvas.add_event_listener_with_callback("mousemove", mousemove.as_ref().unchecked_ref())?;
        mousemove.forget();
    }

    {
        let st = state.clone();
        let mouseup = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            let mut s = st.borrow_mut();
            let p = event_canvas_coords(&e, &s.plan_canvas);
            if let Some(drag) = s.plan_drag.take()
                && drag.is_click()
            {
                pick(&mut s, p, true);
            }
        }));
        canvas.add_event_listener_with_callback("mouseup", mouseup.as_ref().unchecked_ref())?;
        mouseup.forget();
    }

    {
        let st = state.clone();
        let mouseleave = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |_e: MouseEvent| {
            let mut s = st.borrow_mut();
            s.plan_drag = None;
            if s.highlight.hover(None) {
                draw_plan(&s);
            }
        }));
        canvas
            .add_event_listener_with_callback("mouseleave", mouseleave.as_ref().unchecked_ref())?;
        mouseleave.forget();
    }

    {
        let st = state.clone();
        let wheel = Closure::<dyn FnMut(WheelEvent)>::wrap(Box::new(move |e: WheelEvent| {
            e.prevent_default();
            let mut s = st.borrow_mut();
            if s.plan.is_none() {
                return;
            }
            let focal = event_canvas_coords(&e, &s.plan_canvas);
            let factor = (-e.delta_y() * WHEEL_ZOOM_RATE).exp();
            s.session.handle(Gesture::Zoom { factor, focal });
            draw_plan(&s);
        }));
        canvas.add_event_listener_with_callback("wheel", wheel.as_ref().unchecked_ref())?;
        wheel.forget();
    }

    Ok(())
}
