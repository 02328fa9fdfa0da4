use crate::error::{Error, Result};
use crate::model::{Point3, Section};

/// Closed interval `[min, max]` along one axis. Always `min <= max`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    /// Bounding interval of the finite values, or `None` if there are none.
    pub fn of<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values.into_iter().filter(|v| v.is_finite()) {
            min = min.min(v);
            max = max.max(v);
        }
        if min <= max { Some(Extent { min, max }) } else { None }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// Horizontal and vertical extents of a section's plan coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanExtent {
    pub x: Extent,
    pub y: Extent,
}

impl PlanExtent {
    /// Scan every 2D vertex, plus borehole positions when requested.
    ///
    /// An empty section is a "no data" condition: the caller gets
    /// [`Error::EmptyExtent`] and must not build a scale. The matching
    /// diagnostic is logged and available from [`Error::diagnostic`].
    pub fn compute(section: &Section, include_boreholes: bool) -> Result<Self> {
        let vertices = section.polygons.iter().flat_map(|p| p.points_2d.iter());
        let holes = section
            .boreholes
            .iter()
            .filter(|_| include_boreholes);
        let xs = vertices
            .clone()
            .map(|p| p.x)
            .chain(holes.clone().map(|b| b.x));
        let ys = vertices.map(|p| p.y).chain(holes.map(|b| b.elevation));
        match (Extent::of(xs), Extent::of(ys)) {
            (Some(x), Some(y)) => Ok(PlanExtent { x, y }),
            _ => {
                let err = Error::EmptyExtent(section.name.clone());
                if let Some(d) = err.diagnostic() {
                    d.emit();
                }
                Err(err)
            }
        }
    }
}

/// Axis-aligned box in scene (world) coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds3 {
    pub x: Extent,
    pub y: Extent,
    pub z: Extent,
}

impl Bounds3 {
    pub fn of<'a, I: IntoIterator<Item = &'a Point3>>(points: I) -> Option<Self> {
        let pts: Vec<&Point3> = points.into_iter().collect();
        Some(Bounds3 {
            x: Extent::of(pts.iter().map(|p| p.x))?,
            y: Extent::of(pts.iter().map(|p| p.y))?,
            z: Extent::of(pts.iter().map(|p| p.z))?,
        })
    }

    pub fn center(&self) -> Point3 {
        Point3 {
            x: self.x.center(),
            y: self.y.center(),
            z: self.z.center(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Diagnostic, Space};
    use crate::model::{Borehole, Point, Polygon};

    fn section(points: &[(f64, f64)], boreholes: &[(f64, f64)]) -> Section {
        Section {
            name: "S".into(),
            polygons: vec![Polygon {
                points_2d: points.iter().map(|&p| Point::from(p)).collect(),
                ..Default::default()
            }],
            boreholes: boreholes
                .iter()
                .map(|&(x, elevation)| Borehole {
                    x,
                    elevation,
                    ..Default::default()
                })
                .collect(),
        }
    }

    #[test]
    fn extent_ignores_non_finite() {
        let e = Extent::of([3.0, f64::NAN, -1.0, f64::INFINITY, 2.0]).unwrap();
        assert_eq!((e.min, e.max), (-1.0, 3.0));
        assert!(Extent::of([f64::NAN]).is_none());
        assert!(Extent::of(std::iter::empty()).is_none());
    }

    #[test]
    fn single_value_gives_zero_width() {
        let e = Extent::of([4.0, 4.0]).unwrap();
        assert_eq!(e.width(), 0.0);
        assert_eq!(e.center(), 4.0);
    }

    #[test]
    fn plan_extent_includes_boreholes_on_request() {
        let s = section(&[(0.0, 0.0), (10.0, 5.0), (2.0, 8.0)], &[(20.0, -3.0)]);
        let without = PlanExtent::compute(&s, false).unwrap();
        assert_eq!((without.x.min, without.x.max), (0.0, 10.0));
        assert_eq!(without.y, Extent { min: 0.0, max: 8.0 });
        let with = PlanExtent::compute(&s, true).unwrap();
        assert_eq!((with.x.min, with.x.max), (0.0, 20.0));
        assert_eq!((with.y.min, with.y.max), (-3.0, 8.0));
    }

    #[test]
    fn empty_section_has_no_extent() {
        let s = Section {
            name: "empty".into(),
            ..Default::default()
        };
        let err = PlanExtent::compute(&s, true).unwrap_err();
        assert!(matches!(&err, Error::EmptyExtent(name) if name == "empty"));
        assert_eq!(
            err.diagnostic(),
            Some(Diagnostic::EmptyExtent {
                section: "empty".into(),
                space: Space::Plan,
            })
        );
    }

    #[test]
    fn bounds3_center() {
        let pts = [Point3::from((0.0, -2.0, 4.0)), Point3::from((10.0, 2.0, 8.0))];
        let b = Bounds3::of(&pts).unwrap();
        assert_eq!(b.center(), Point3::from((5.0, 0.0, 6.0)));
    }
}
