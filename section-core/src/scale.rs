use crate::config::ViewerConfig;
use crate::extent::{Extent, PlanExtent};
use crate::model::Point;
use crate::view::ViewTransform;

/// Affine map from a domain interval onto a range interval.
///
/// The range may run backwards (`r0 > r1`), which is how the vertical axis
/// puts larger elevations nearer the top of the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: Extent, range: (f64, f64)) -> Self {
        LinearScale {
            domain: (domain.min, domain.max),
            range,
        }
    }

    /// Map a domain value. Exact at both domain ends; a zero-width domain maps
    /// everything to the middle of the range.
    pub fn apply(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span == 0.0 {
            return (r0 + r1) / 2.0;
        }
        let t = (v - d0) / span;
        r0 * (1.0 - t) + r1 * t
    }

    /// Map a range value back into the domain.
    pub fn invert(&self, r: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = r1 - r0;
        if span == 0.0 {
            return (d0 + d1) / 2.0;
        }
        let t = (r - r0) / span;
        d0 * (1.0 - t) + d1 * t
    }

    /// The same scale seen through a post-hoc `r * k + t` on the range.
    pub fn transformed(&self, k: f64, t: f64) -> Self {
        LinearScale {
            domain: self.domain,
            range: (self.range.0 * k + t, self.range.1 * k + t),
        }
    }

    /// Domain that is visible in the original range once `r * k + t` applies.
    /// Axis labels are generated from this.
    pub fn rescaled(&self, k: f64, t: f64) -> Self {
        let (r0, r1) = self.range;
        LinearScale {
            domain: (self.invert((r0 - t) / k), self.invert((r1 - t) / k)),
            range: self.range,
        }
    }

    /// Round tick values inside the domain, spaced 1, 2 or 5 times a power of ten.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (a, b) = self.domain;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        if count == 0 || !lo.is_finite() || !hi.is_finite() {
            return Vec::new();
        }
        if lo == hi {
            return vec![lo];
        }
        let step = tick_step(lo, hi, count);
        if step <= 0.0 || !step.is_finite() {
            return Vec::new();
        }
        let start = (lo / step).ceil() as i64;
        let stop = (hi / step).floor() as i64;
        (start..=stop).map(|i| i as f64 * step).collect()
    }
}

fn tick_step(lo: f64, hi: f64, count: usize) -> f64 {
    let raw = (hi - lo) / count as f64;
    let power = 10f64.powf(raw.log10().floor());
    let error = raw / power;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * power
}

/// The pair of base scales for a section's plan view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanScales {
    pub x: LinearScale,
    pub y: LinearScale,
}

impl PlanScales {
    /// Horizontal maps onto `[margin, width - margin]`, vertical onto the
    /// inverted `[height - margin, margin]`.
    pub fn from_extent(extent: &PlanExtent, cfg: &ViewerConfig) -> Self {
        let m = cfg.plan_margin;
        PlanScales {
            x: LinearScale::new(extent.x, (m, cfg.plan_width - m)),
            y: LinearScale::new(extent.y, (cfg.plan_height - m, m)),
        }
    }

    pub fn project(&self, p: Point) -> Point {
        Point {
            x: self.x.apply(p.x),
            y: self.y.apply(p.y),
        }
    }

    /// Base projection followed by the view transform.
    pub fn project_through(&self, p: Point, t: &ViewTransform) -> Point {
        t.apply(self.project(p))
    }

    /// Screen position back into data coordinates.
    pub fn unproject(&self, screen: Point, t: &ViewTransform) -> Point {
        let base = t.invert(screen);
        Point {
            x: self.x.invert(base.x),
            y: self.y.invert(base.y),
        }
    }

    /// Scales whose domains cover what is visible under `t`, for axis labels.
    pub fn visible(&self, t: &ViewTransform) -> Self {
        PlanScales {
            x: self.x.rescaled(t.k, t.x),
            y: self.y.rescaled(t.k, t.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scale(d: (f64, f64), r: (f64, f64)) -> LinearScale {
        LinearScale {
            domain: d,
            range: r,
        }
    }

    #[test]
    fn exact_at_domain_ends() {
        let cases = [
            scale((0.1, 0.7), (50.0, 450.0)),
            scale((-1234.5, 987.25), (450.0, 50.0)),
            scale((3.0, 9.0), (0.1, 0.3)),
        ];
        for s in cases {
            assert_eq!(s.apply(s.domain.0), s.range.0);
            assert_eq!(s.apply(s.domain.1), s.range.1);
        }
    }

    #[test]
    fn monotonic_in_range_direction() {
        let up = scale((0.0, 100.0), (50.0, 450.0));
        let down = scale((0.0, 100.0), (450.0, 50.0));
        let mut prev_up = f64::NEG_INFINITY;
        let mut prev_down = f64::INFINITY;
        for i in 0..=100 {
            let v = i as f64;
            assert!(up.apply(v) > prev_up);
            assert!(down.apply(v) < prev_down);
            prev_up = up.apply(v);
            prev_down = down.apply(v);
        }
    }

    #[test]
    fn zero_width_domain_maps_to_midpoint() {
        let s = scale((5.0, 5.0), (50.0, 450.0));
        assert_eq!(s.apply(5.0), 250.0);
        assert_eq!(s.apply(-100.0), 250.0);
    }

    #[test]
    fn invert_round_trips() {
        let s = scale((-20.0, 80.0), (450.0, 50.0));
        assert_relative_eq!(s.invert(s.apply(13.7)), 13.7, epsilon = 1e-9);
    }

    #[test]
    fn transformed_and_rescaled_agree() {
        let s = scale((0.0, 100.0), (50.0, 450.0));
        let (k, t) = (2.0, -30.0);
        let moved = s.transformed(k, t);
        assert_relative_eq!(moved.apply(40.0), s.apply(40.0) * k + t, epsilon = 1e-9);
        // A screen position read through the rescaled domain lands on the same datum.
        let visible = s.rescaled(k, t);
        assert_relative_eq!(visible.invert(moved.apply(40.0)), 40.0, epsilon = 1e-9);
    }

    #[test]
    fn nice_ticks() {
        let s = scale((0.0, 100.0), (0.0, 1.0));
        assert_eq!(
            s.ticks(10),
            vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0]
        );
        let s = scale((-3.2, 7.9), (0.0, 1.0));
        assert_eq!(s.ticks(5), vec![-2.0, 0.0, 2.0, 4.0, 6.0]);
        let reversed = scale((7.9, -3.2), (0.0, 1.0));
        assert_eq!(reversed.ticks(5), s.ticks(5));
        assert_eq!(scale((2.0, 2.0), (0.0, 1.0)).ticks(5), vec![2.0]);
    }

    #[test]
    fn plan_scales_invert_vertical_axis() {
        let extent = PlanExtent {
            x: Extent::of([0.0, 10.0]).unwrap(),
            y: Extent::of([0.0, 10.0]).unwrap(),
        };
        let scales = PlanScales::from_extent(&extent, &ViewerConfig::default());
        assert_eq!(
            scales.project(Point { x: 0.0, y: 0.0 }),
            Point { x: 50.0, y: 450.0 }
        );
        assert_eq!(
            scales.project(Point { x: 10.0, y: 10.0 }),
            Point { x: 450.0, y: 50.0 }
        );
    }
}
