//! 2D plan view of one section.
//!
//! Shapes keep data coordinates and fixed triangle indices. Screen positions
//! are recomputed from the base scales and the current [`ViewTransform`] on
//! every redraw, so pan/zoom never re-triangulates.

use geo::Contains;
use geo_types::{Coord, LineString, Polygon as GeoPolygon};

use crate::color::normalize_color_or;
use crate::config::ViewerConfig;
use crate::error::{Diagnostic, Error, Result, Space};
use crate::extent::PlanExtent;
use crate::model::{Point, Section};
use crate::scale::PlanScales;
use crate::triangulate::Triangulator;
use crate::view::ViewTransform;

/// One renderable polygon in data coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanShape {
    /// Index of the source polygon in its section.
    pub polygon: usize,
    pub points: Vec<Point>,
    pub indices: Vec<u32>,
    pub color: String,
}

impl PlanShape {
    /// Screen-space triangles under the given scales and transform.
    pub fn triangles(&self, scales: &PlanScales, t: &ViewTransform) -> Vec<[Point; 3]> {
        let screen: Vec<Point> = self
            .points
            .iter()
            .map(|p| scales.project_through(*p, t))
            .collect();
        self.indices
            .chunks_exact(3)
            .map(|tri| {
                [
                    screen[tri[0] as usize],
                    screen[tri[1] as usize],
                    screen[tri[2] as usize],
                ]
            })
            .collect()
    }

    fn contains(&self, p: Point) -> bool {
        let ring: LineString<f64> = self
            .points
            .iter()
            .map(|q| Coord { x: q.x, y: q.y })
            .collect();
        GeoPolygon::new(ring, vec![]).contains(&Coord { x: p.x, y: p.y })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlanView {
    pub section: String,
    pub extent: PlanExtent,
    pub scales: PlanScales,
    pub shapes: Vec<PlanShape>,
    /// Borehole positions as `(x, elevation)`, indexed like the section's boreholes.
    pub boreholes: Vec<Point>,
    pub diagnostics: Vec<Diagnostic>,
}

impl PlanView {
    /// Extent, base scales and triangulation for a section.
    ///
    /// Fails with [`Error::EmptyExtent`] when nothing has coordinates.
    /// Polygons with fewer than three vertices are skipped with a diagnostic.
    pub fn prepare(section: &Section, cfg: &ViewerConfig) -> Result<Self> {
        let extent = PlanExtent::compute(section, cfg.include_boreholes)?;
        let scales = PlanScales::from_extent(&extent, cfg);
        let triangulator = Triangulator::new(cfg.triangulation);

        let mut shapes = Vec::with_capacity(section.polygons.len());
        let mut diagnostics = Vec::new();
        for (i, poly) in section.polygons.iter().enumerate() {
            match triangulator.plan(&poly.points_2d) {
                Ok(tri) => {
                    if tri.fell_back {
                        diagnostics.push(Diagnostic::TriangulationFallback {
                            section: section.name.clone(),
                            polygon: i,
                        });
                    }
                    shapes.push(PlanShape {
                        polygon: i,
                        points: poly.points_2d.clone(),
                        indices: tri.indices,
                        color: normalize_color_or(poly.color.as_deref(), &cfg.default_color),
                    });
                }
                Err(Error::InsufficientVertices(count)) => {
                    diagnostics.push(Diagnostic::InsufficientVertices {
                        section: section.name.clone(),
                        polygon: i,
                        count,
                        space: Space::Plan,
                    });
                }
                Err(e) => return Err(e),
            }
        }
        for d in &diagnostics {
            d.emit();
        }
        log::debug!(
            "prepared plan for {}: {} shapes, {} boreholes",
            section.name,
            shapes.len(),
            section.boreholes.len()
        );

        Ok(PlanView {
            section: section.name.clone(),
            extent,
            scales,
            shapes,
            boreholes: section
                .boreholes
                .iter()
                .map(|b| Point {
                    x: b.x,
                    y: b.elevation,
                })
                .collect(),
            diagnostics,
        })
    }

    pub fn screen_ring(&self, shape: &PlanShape, t: &ViewTransform) -> Vec<Point> {
        shape
            .points
            .iter()
            .map(|p| self.scales.project_through(*p, t))
            .collect()
    }

    pub fn borehole_screen(&self, index: usize, t: &ViewTransform) -> Option<Point> {
        self.boreholes
            .get(index)
            .map(|p| self.scales.project_through(*p, t))
    }

    /// Topmost polygon under a screen position. Later polygons draw on top.
    pub fn pick_polygon(&self, screen: Point, t: &ViewTransform) -> Option<usize> {
        self.pick_shape(screen, t).map(|i| self.shapes[i].polygon)
    }

    /// Like [`PlanView::pick_polygon`] but returns the index into `shapes`.
    pub fn pick_shape(&self, screen: Point, t: &ViewTransform) -> Option<usize> {
        let p = self.scales.unproject(screen, t);
        self.shapes.iter().rposition(|s| s.contains(p))
    }

    /// Nearest borehole marker within `radius` screen px.
    pub fn pick_borehole(&self, screen: Point, t: &ViewTransform, radius: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for i in 0..self.boreholes.len() {
            if let Some(q) = self.borehole_screen(i, t) {
                let d = ((q.x - screen.x).powi(2) + (q.y - screen.y).powi(2)).sqrt();
                if d <= radius && best.is_none_or(|(_, bd)| d < bd) {
                    best = Some((i, d));
                }
            }
        }
        best.map(|(i, _)| i)
    }
}

/// Outline state of a drawn polygon.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Outline {
    #[default]
    Normal,
    Selected,
    /// The pointer left the polygon since the last click.
    Visited,
}

impl Outline {
    /// Stroke color and width in px.
    pub fn stroke(self) -> (&'static str, f64) {
        match self {
            Outline::Normal => ("#000000", 1.0),
            Outline::Selected => ("#ff0000", 3.0),
            Outline::Visited => ("#ffff00", 1.0),
        }
    }
}

/// Click/hover outline bookkeeping for the shapes of one [`PlanView`],
/// indexed like `PlanView::shapes`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Highlight {
    pub outlines: Vec<Outline>,
    hovered: Option<usize>,
}

impl Highlight {
    pub fn new(shapes: usize) -> Self {
        Highlight {
            outlines: vec![Outline::Normal; shapes],
            hovered: None,
        }
    }

    /// A click resets every outline, then selects the clicked shape if any.
    pub fn click(&mut self, shape: Option<usize>) {
        self.outlines.fill(Outline::Normal);
        if let Some(o) = shape.and_then(|i| self.outlines.get_mut(i)) {
            *o = Outline::Selected;
        }
    }

    /// Track the shape under the pointer. Leaving a shape marks it visited.
    /// Returns true when an outline changed.
    pub fn hover(&mut self, shape: Option<usize>) -> bool {
        if shape == self.hovered {
            return false;
        }
        let left = std::mem::replace(&mut self.hovered, shape);
        match left.and_then(|i| self.outlines.get_mut(i)) {
            Some(o) => {
                *o = Outline::Visited;
                true
            }
            None => false,
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.outlines.iter().position(|o| *o == Outline::Selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Borehole, Polygon};
    use crate::view::Gesture;

    fn section() -> Section {
        let square = |x0: f64, y0: f64, w: f64| Polygon {
            points_2d: vec![
                Point::from((x0, y0)),
                Point::from((x0 + w, y0)),
                Point::from((x0 + w, y0 + w)),
                Point::from((x0, y0 + w)),
            ],
            color: Some("aa0000".into()),
            ..Default::default()
        };
        Section {
            name: "S".into(),
            polygons: vec![
                square(0.0, 0.0, 10.0),
                Polygon {
                    points_2d: vec![Point::from((1.0, 1.0)), Point::from((2.0, 2.0))],
                    ..Default::default()
                },
                square(2.0, 2.0, 2.0),
            ],
            boreholes: vec![Borehole {
                name: Some("BH".into()),
                x: 5.0,
                elevation: 5.0,
                depth: None,
            }],
        }
    }

    #[test]
    fn skips_short_polygons_and_keeps_the_rest() {
        let view = PlanView::prepare(&section(), &ViewerConfig::default()).unwrap();
        assert_eq!(view.shapes.len(), 2);
        assert_eq!(view.shapes[0].polygon, 0);
        assert_eq!(view.shapes[1].polygon, 2);
        assert_eq!(view.shapes[0].color, "#aa0000");
        assert_eq!(
            view.diagnostics,
            vec![Diagnostic::InsufficientVertices {
                section: "S".into(),
                polygon: 1,
                count: 2,
                space: Space::Plan,
            }]
        );
    }

    #[test]
    fn empty_section_aborts() {
        let s = Section {
            name: "E".into(),
            ..Default::default()
        };
        let err = PlanView::prepare(&s, &ViewerConfig::default()).unwrap_err();
        assert!(matches!(
            err.diagnostic(),
            Some(Diagnostic::EmptyExtent {
                space: Space::Plan,
                ..
            })
        ));
    }

    #[test]
    fn transform_moves_points_not_topology() {
        let view = PlanView::prepare(&section(), &ViewerConfig::default()).unwrap();
        let indices_before: Vec<Vec<u32>> = view.shapes.iter().map(|s| s.indices.clone()).collect();

        let t = crate::view::compose(
            ViewTransform::IDENTITY,
            Gesture::Zoom {
                factor: 2.0,
                focal: Point::default(),
            },
            (0.5, 5.0),
        );
        let base = view.screen_ring(&view.shapes[0], &ViewTransform::IDENTITY);
        let zoomed = view.screen_ring(&view.shapes[0], &t);
        for (b, z) in base.iter().zip(&zoomed) {
            assert_eq!(z.x, b.x * 2.0);
            assert_eq!(z.y, b.y * 2.0);
        }
        let indices_after: Vec<Vec<u32>> = view.shapes.iter().map(|s| s.indices.clone()).collect();
        assert_eq!(indices_before, indices_after);
        assert_eq!(view.shapes[0].triangles(&view.scales, &t).len(), 2);
    }

    #[test]
    fn picks_topmost_polygon_and_borehole() {
        let view = PlanView::prepare(&section(), &ViewerConfig::default()).unwrap();
        let t = ViewTransform::IDENTITY.panned(15.0, -4.0);
        let inner = view.scales.project_through(Point::from((3.0, 3.0)), &t);
        assert_eq!(view.pick_polygon(inner, &t), Some(2));
        let outer = view.scales.project_through(Point::from((8.0, 8.0)), &t);
        assert_eq!(view.pick_polygon(outer, &t), Some(0));
        let outside = view.scales.project_through(Point::from((20.0, 8.0)), &t);
        assert_eq!(view.pick_polygon(outside, &t), None);

        let bh = view.borehole_screen(0, &t).unwrap();
        let near = Point::from((bh.x + 3.0, bh.y));
        let far = Point::from((bh.x + 30.0, bh.y));
        assert_eq!(view.pick_borehole(near, &t, 6.0), Some(0));
        assert_eq!(view.pick_borehole(far, &t, 6.0), None);
    }

    #[test]
    fn click_selects_and_leaving_marks_visited() {
        let mut h = Highlight::new(3);
        h.hover(Some(1));
        h.click(Some(1));
        assert_eq!(h.selected(), Some(1));
        assert_eq!(h.outlines[1].stroke(), ("#ff0000", 3.0));

        assert!(h.hover(Some(2)));
        assert_eq!(h.outlines[1], Outline::Visited);
        assert!(h.hover(None));
        assert_eq!(
            h.outlines,
            vec![Outline::Normal, Outline::Visited, Outline::Visited]
        );
        assert!(!h.hover(None));

        h.click(None);
        assert_eq!(h.outlines, vec![Outline::Normal; 3]);
        assert_eq!(h.selected(), None);
    }
}
