//! Polygon ring triangulation.
//!
//! The default is a fan around vertex 0, which assumes vertex 0 can see every
//! other vertex of the ring. Concave rings where that fails come out with
//! overlapping or flipped triangles. [`TriangulationMode::EarClip`] is the
//! opt-in alternative for such data.

use crate::config::TriangulationMode;
use crate::error::{Error, Result};
use crate::model::{Point, Point3};

/// Fan indices for a ring of `n` vertices: `(0, i, i + 1)` for `i` in `1..n-1`.
pub fn fan_triangulate(n: usize) -> Result<Vec<u32>> {
    if n < 3 {
        return Err(Error::InsufficientVertices(n));
    }
    let mut indices = Vec::with_capacity((n - 2) * 3);
    for i in 1..(n - 1) as u32 {
        indices.extend_from_slice(&[0, i, i + 1]);
    }
    Ok(indices)
}

/// Ear clipping of a planar ring given as flat `[x0, y0, x1, y1, ...]`.
fn ear_clip_flat(coords: &[f64]) -> Result<Vec<u32>> {
    let n = coords.len() / 2;
    if n < 3 {
        return Err(Error::InsufficientVertices(n));
    }
    let indices = earcutr::earcut(coords, &[], 2)
        .map_err(|e| Error::Triangulation(format!("{:?}", e)))?;
    if indices.is_empty() {
        return Err(Error::Triangulation("ring has no area".to_string()));
    }
    Ok(indices.into_iter().map(|i| i as u32).collect())
}

pub fn ear_clip_2d(points: &[Point]) -> Result<Vec<u32>> {
    let flat: Vec<f64> = points.iter().flat_map(|p| [p.x, p.y]).collect();
    ear_clip_flat(&flat)
}

/// Ear clipping of a 3D ring after dropping the axis its plane faces most.
pub fn ear_clip_3d(points: &[Point3]) -> Result<Vec<u32>> {
    if points.len() < 3 {
        return Err(Error::InsufficientVertices(points.len()));
    }
    let n = newell_normal(points);
    let (ax, ay, az) = (n[0].abs(), n[1].abs(), n[2].abs());
    let flat: Vec<f64> = if az >= ax && az >= ay {
        points.iter().flat_map(|p| [p.x, p.y]).collect()
    } else if ay >= ax {
        points.iter().flat_map(|p| [p.x, p.z]).collect()
    } else {
        points.iter().flat_map(|p| [p.y, p.z]).collect()
    };
    ear_clip_flat(&flat)
}

/// Area-weighted normal of a (possibly slightly non-planar) ring.
pub fn newell_normal(points: &[Point3]) -> [f64; 3] {
    let mut n = [0.0; 3];
    let len = points.len();
    for i in 0..len {
        let a = points[i];
        let b = points[(i + 1) % len];
        n[0] += (a.y - b.y) * (a.z + b.z);
        n[1] += (a.z - b.z) * (a.x + b.x);
        n[2] += (a.x - b.x) * (a.y + b.y);
    }
    n
}

/// Applies the configured [`TriangulationMode`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Triangulator {
    pub mode: TriangulationMode,
}

/// Indices plus whether ear clipping had to fall back to the fan.
#[derive(Clone, Debug, PartialEq)]
pub struct Triangulation {
    pub indices: Vec<u32>,
    pub fell_back: bool,
}

impl Triangulator {
    pub fn new(mode: TriangulationMode) -> Self {
        Triangulator { mode }
    }

    pub fn plan(&self, points: &[Point]) -> Result<Triangulation> {
        self.run(points.len(), || ear_clip_2d(points))
    }

    pub fn scene(&self, points: &[Point3]) -> Result<Triangulation> {
        self.run(points.len(), || ear_clip_3d(points))
    }

    fn run<F>(&self, n: usize, ear_clip: F) -> Result<Triangulation>
    where
        F: FnOnce() -> Result<Vec<u32>>,
    {
        let fan = || {
            fan_triangulate(n).map(|indices| Triangulation {
                indices,
                fell_back: false,
            })
        };
        match self.mode {
            TriangulationMode::Fan => fan(),
            TriangulationMode::EarClip => match ear_clip() {
                Ok(indices) => Ok(Triangulation {
                    indices,
                    fell_back: false,
                }),
                Err(Error::InsufficientVertices(n)) => Err(Error::InsufficientVertices(n)),
                Err(_) => fan().map(|t| Triangulation {
                    fell_back: true,
                    ..t
                }),
            },
        }
    }
}
