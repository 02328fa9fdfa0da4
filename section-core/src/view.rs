//! Cumulative pan/zoom state for an open section.
//!
//! The transform is a plain value. Gesture handlers hand the current value to
//! [`compose`] and store what comes back; nothing is mutated behind closures.

use crate::model::Point;

/// Uniform scale `k` followed by translation `(x, y)`, in screen px.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        k: 1.0,
        x: 0.0,
        y: 0.0,
    };

    pub fn apply(&self, p: Point) -> Point {
        Point {
            x: p.x * self.k + self.x,
            y: p.y * self.k + self.y,
        }
    }

    pub fn invert(&self, p: Point) -> Point {
        Point {
            x: (p.x - self.x) / self.k,
            y: (p.y - self.y) / self.k,
        }
    }

    /// Scale by `factor` about `focal` (screen px) and clamp the cumulative
    /// scale to `[min_k, max_k]`. The focal point stays where it is on screen.
    pub fn zoomed(self, factor: f64, focal: Point, (min_k, max_k): (f64, f64)) -> Self {
        if !factor.is_finite() || factor <= 0.0 {
            return self;
        }
        let k = (self.k * factor).clamp(min_k, max_k);
        let ratio = k / self.k;
        ViewTransform {
            k,
            x: focal.x - (focal.x - self.x) * ratio,
            y: focal.y - (focal.y - self.y) * ratio,
        }
    }

    pub fn panned(self, dx: f64, dy: f64) -> Self {
        ViewTransform {
            k: self.k,
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Normalized input from the renderer's gesture callbacks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    /// Scroll or pinch: multiply the scale by `factor` around `focal`.
    Zoom { factor: f64, focal: Point },
    /// Pointer moved by `(dx, dy)` since the previous sample.
    Drag { dx: f64, dy: f64 },
}

/// Fold one gesture into the transform.
pub fn compose(t: ViewTransform, gesture: Gesture, zoom_range: (f64, f64)) -> ViewTransform {
    match gesture {
        Gesture::Zoom { factor, focal } => t.zoomed(factor, focal, zoom_range),
        Gesture::Drag { dx, dy } => t.panned(dx, dy),
    }
}

/// One pointer press, tracked until release. Movement that stays within
/// `slop` of the press point is a click; past it the whole offset since
/// the press is released as drag deltas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragTracker {
    press: Point,
    last: Point,
    slop: f64,
    dragging: bool,
}

impl DragTracker {
    pub fn press(at: Point, slop: f64) -> Self {
        DragTracker {
            press: at,
            last: at,
            slop,
            dragging: false,
        }
    }

    /// Feed a pointer sample. Returns the pan to apply, if any.
    pub fn move_to(&mut self, p: Point) -> Option<Gesture> {
        if !self.dragging {
            if (p.x - self.press.x).hypot(p.y - self.press.y) <= self.slop {
                return None;
            }
            self.dragging = true;
        }
        let gesture = Gesture::Drag {
            dx: p.x - self.last.x,
            dy: p.y - self.last.y,
        };
        self.last = p;
        Some(gesture)
    }

    pub fn is_click(&self) -> bool {
        !self.dragging
    }
}

/// Pan/zoom state of the section currently on screen.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewSession {
    pub section: String,
    pub transform: ViewTransform,
    zoom_range: (f64, f64),
}

impl ViewSession {
    pub fn new(section: impl Into<String>, zoom_range: (f64, f64)) -> Self {
        ViewSession {
            section: section.into(),
            transform: ViewTransform::IDENTITY,
            zoom_range,
        }
    }

    pub fn handle(&mut self, gesture: Gesture) -> ViewTransform {
        self.transform = compose(self.transform, gesture, self.zoom_range);
        self.transform
    }

    pub fn reset(&mut self) {
        self.transform = ViewTransform::IDENTITY;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const RANGE: (f64, f64) = (0.5, 5.0);

    #[test]
    fn zoom_then_drag_equals_composed_transform() {
        let origin = Point { x: 0.0, y: 0.0 };
        let (dx, dy) = (13.0, -7.5);
        let mut session = ViewSession::new("S", RANGE);
        session.handle(Gesture::Zoom {
            factor: 2.0,
            focal: origin,
        });
        session.handle(Gesture::Drag { dx, dy });

        let base = Point { x: 120.0, y: 310.0 };
        let got = session.transform.apply(base);
        assert_relative_eq!(got.x, base.x * 2.0 + dx);
        assert_relative_eq!(got.y, base.y * 2.0 + dy);
    }

    #[test]
    fn zoom_is_clamped() {
        let focal = Point { x: 250.0, y: 250.0 };
        let mut t = ViewTransform::IDENTITY;
        for factor in [3.0, 3.0, 3.0, 0.01, 0.2, 1.7, 100.0, 1e-9] {
            t = compose(t, Gesture::Zoom { factor, focal }, RANGE);
            assert!(t.k >= 0.5 && t.k <= 5.0, "k = {}", t.k);
        }
        let t = ViewTransform::IDENTITY.zoomed(50.0, focal, RANGE);
        assert_eq!(t.k, 5.0);
    }

    #[test]
    fn focal_point_stays_put() {
        let focal = Point { x: 180.0, y: 90.0 };
        let t = ViewTransform::IDENTITY
            .panned(20.0, 10.0)
            .zoomed(1.5, focal, RANGE);
        let before = ViewTransform::IDENTITY.panned(20.0, 10.0).invert(focal);
        let after = t.apply(before);
        assert_relative_eq!(after.x, focal.x, epsilon = 1e-9);
        assert_relative_eq!(after.y, focal.y, epsilon = 1e-9);
    }

    #[test]
    fn drags_accumulate() {
        let t = [(1.0, 2.0), (3.0, -1.0), (-0.5, 0.5)]
            .into_iter()
            .fold(ViewTransform::IDENTITY, |t, (dx, dy)| {
                compose(t, Gesture::Drag { dx, dy }, RANGE)
            });
        assert_eq!(t, ViewTransform::IDENTITY.panned(3.5, 1.5));
    }

    #[test]
    fn invalid_factor_is_ignored() {
        let t = ViewTransform::IDENTITY.panned(4.0, 4.0);
        let focal = Point::default();
        assert_eq!(t.zoomed(f64::NAN, focal, RANGE), t);
        assert_eq!(t.zoomed(-2.0, focal, RANGE), t);
    }

    #[test]
    fn drag_past_slop_pans_by_full_pointer_offset() {
        let mut drag = DragTracker::press(Point { x: 100.0, y: 100.0 }, 3.0);
        assert_eq!(drag.move_to(Point { x: 102.0, y: 100.0 }), None);
        assert!(drag.is_click());

        let mut t = ViewTransform::IDENTITY;
        for p in [(110.0, 100.0), (110.0, 96.0)] {
            if let Some(g) = drag.move_to(Point::from(p)) {
                t = compose(t, g, RANGE);
            }
        }
        assert!(!drag.is_click());
        assert_eq!(t, ViewTransform::IDENTITY.panned(10.0, -4.0));
    }

    #[test]
    fn jitter_inside_slop_stays_a_click() {
        let mut drag = DragTracker::press(Point { x: 10.0, y: 10.0 }, 3.0);
        for p in [(11.0, 10.0), (12.0, 11.0), (9.0, 9.0)] {
            assert_eq!(drag.move_to(Point::from(p)), None);
        }
        assert!(drag.is_click());
    }

    #[test]
    fn reset_returns_to_identity() {
        let mut s = ViewSession::new("S", RANGE);
        s.handle(Gesture::Drag { dx: 5.0, dy: 5.0 });
        s.reset();
        assert_eq!(s.transform, ViewTransform::IDENTITY);
    }
}
