use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use section_core::Point;

// Non-deprecated helpers to set canvas styles via property assignment.
pub fn set_fill_style(ctx: &CanvasRenderingContext2d, color: &str) {
    let _ = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str("fillStyle"),
        &JsValue::from_str(color),
    );
}

pub fn set_stroke_style(ctx: &CanvasRenderingContext2d, color: &str) {
    let _ = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str("strokeStyle"),
        &JsValue::from_str(color),
    );
}

pub fn init_canvas(
    document: &Document,
    id: &str,
) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
    let cv = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("canvas #{id} not found")))?
        .dyn_into::<HtmlCanvasElement>()?;
    let ctx = cv
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2D context not available"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    Ok((cv, ctx))
}

/// Fill each triangle on its own, so overlapping or out-of-ring triangles
/// show exactly what the triangulation produced.
pub fn fill_triangles(ctx: &CanvasRenderingContext2d, tris: &[[Point; 3]], color: &str) {
    set_fill_style(ctx, color);
    // Same-color hairline hides anti-aliasing seams between neighbors.
    set_stroke_style(ctx, color);
    ctx.set_line_width(0.5);
    for [a, b, c] in tris {
        ctx.begin_path();
        ctx.move_to(a.x, a.y);
        ctx.line_to(b.x, b.y);
        ctx.line_to(c.x, c.y);
        ctx.close_path();
        ctx.fill();
        ctx.stroke();
    }
}

pub fn stroke_ring(ctx: &CanvasRenderingContext2d, ring: &[Point], color: &str, width: f64) {
    let Some((first, rest)) = ring.split_first() else {
        return;
    };
    ctx.begin_path();
    ctx.move_to(first.x, first.y);
    for p in rest {
        ctx.line_to(p.x, p.y);
    }
    ctx.close_path();
    ctx.set_line_width(width);
    set_stroke_style(ctx, color);
    ctx.stroke();
}

pub fn line(ctx: &CanvasRenderingContext2d, a: Point, b: Point) {
    ctx.begin_path();
    ctx.move_to(a.x, a.y);
    ctx.line_to(b.x, b.y);
    ctx.stroke();
}
