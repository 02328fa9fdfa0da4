use crate::scale::{LinearScale, PlanScales};
use crate::view::ViewTransform;

/// Default tick density of the plan axes.
pub const TICK_COUNT: usize = 10;

#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub value: f64,
    /// Screen position along the axis, px.
    pub offset: f64,
    pub label: String,
}

/// Label a tick with just enough decimals for the tick spacing.
pub fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step > 0.0 && step.is_finite() {
        (-step.log10().floor()).max(0.0) as usize
    } else {
        0
    };
    let s = format!("{:.*}", decimals, value);
    // Avoid "-0" for values that round to zero.
    if s.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        s.trim_start_matches('-').to_string()
    } else {
        s
    }
}

pub fn axis_ticks(scale: &LinearScale, count: usize) -> Vec<Tick> {
    let values = scale.ticks(count);
    let step = match values.as_slice() {
        [a, b, ..] => b - a,
        _ => 1.0,
    };
    values
        .into_iter()
        .map(|v| Tick {
            value: v,
            offset: scale.apply(v),
            label: format_tick(v, step),
        })
        .collect()
}

/// Bottom and left axis ticks for what is visible under `t`.
pub fn plan_axes(scales: &PlanScales, t: &ViewTransform) -> (Vec<Tick>, Vec<Tick>) {
    let visible = scales.visible(t);
    (
        axis_ticks(&visible.x, TICK_COUNT),
        axis_ticks(&visible.y, TICK_COUNT),
    )
}
