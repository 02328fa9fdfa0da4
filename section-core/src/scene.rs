//! 3D scene of one section: per-polygon meshes, a floor grid and an orbit
//! camera that projects world points onto a viewport.

use crate::color::{Rgb, normalize_color_or};
use crate::config::ViewerConfig;
use crate::error::{Diagnostic, Error, Result, Space};
use crate::extent::{Bounds3, Extent};
use crate::model::{Point, Point3, Section};
use crate::triangulate::Triangulator;

fn sub(a: Point3, b: Point3) -> Point3 {
    Point3 {
        x: a.x - b.x,
        y: a.y - b.y,
        z: a.z - b.z,
    }
}

fn add(a: Point3, b: Point3) -> Point3 {
    Point3 {
        x: a.x + b.x,
        y: a.y + b.y,
        z: a.z + b.z,
    }
}

fn scale(a: Point3, s: f64) -> Point3 {
    Point3 {
        x: a.x * s,
        y: a.y * s,
        z: a.z * s,
    }
}

fn cross(a: Point3, b: Point3) -> Point3 {
    Point3 {
        x: a.y * b.z - a.z * b.y,
        y: a.z * b.x - a.x * b.z,
        z: a.x * b.y - a.y * b.x,
    }
}

fn dot(a: Point3, b: Point3) -> f64 {
    a.x * b.x + a.y * b.y + a.z * b.z
}

fn normalize(p: Point3) -> Point3 {
    let len = dot(p, p).sqrt();
    if len == 0.0 { p } else { scale(p, 1.0 / len) }
}

/// Per-vertex normals: sum of the (area-weighted) face normals around each
/// vertex, following the triangle winding.
pub fn vertex_normals(positions: &[Point3], indices: &[u32]) -> Vec<Point3> {
    let mut normals = vec![Point3::default(); positions.len()];
    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let n = cross(
            sub(positions[i1], positions[i0]),
            sub(positions[i2], positions[i0]),
        );
        for i in [i0, i1, i2] {
            normals[i] = add(normals[i], n);
        }
    }
    normals.into_iter().map(normalize).collect()
}

/// Mesh handed to the renderer: one per polygon, one color, drawn double-sided.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub polygon: usize,
    pub positions: Vec<Point3>,
    pub normals: Vec<Point3>,
    pub indices: Vec<u32>,
    pub color: String,
    pub double_sided: bool,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Square floor grid centered under the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridHelper {
    pub center: Point3,
    pub size: f64,
    pub divisions: u32,
}

impl GridHelper {
    /// Sized to the larger of the XZ widths, sitting at the lowest Y.
    /// Without bounds the grid covers `[-50, 50]` on X and Z at `y = 0`.
    pub fn for_bounds(bounds: Option<&Bounds3>, divisions: u32) -> Self {
        let (x, z, floor) = match bounds {
            Some(b) => (b.x, b.z, b.y.min),
            None => {
                let d = Extent {
                    min: -50.0,
                    max: 50.0,
                };
                (d, d, 0.0)
            }
        };
        GridHelper {
            center: Point3 {
                x: x.center(),
                y: floor,
                z: z.center(),
            },
            size: x.width().max(z.width()),
            divisions: divisions.max(1),
        }
    }

    /// Line segments of the grid, `divisions + 1` along each axis.
    pub fn lines(&self) -> Vec<(Point3, Point3)> {
        let half = self.size / 2.0;
        let step = self.size / self.divisions as f64;
        let c = self.center;
        let mut out = Vec::with_capacity(2 * (self.divisions as usize + 1));
        for i in 0..=self.divisions {
            let k = -half + step * i as f64;
            out.push((
                Point3::from((c.x - half, c.y, c.z + k)),
                Point3::from((c.x + half, c.y, c.z + k)),
            ));
            out.push((
                Point3::from((c.x + k, c.y, c.z - half)),
                Point3::from((c.x + k, c.y, c.z + half)),
            ));
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneView {
    pub section: String,
    pub meshes: Vec<Mesh>,
    pub bounds: Option<Bounds3>,
    pub grid: GridHelper,
    pub diagnostics: Vec<Diagnostic>,
}

/// Raw data coordinates into world units: scaled down, Y flipped.
pub fn to_world(p: Point3, world_scale: f64) -> Point3 {
    Point3 {
        x: p.x / world_scale,
        y: -p.y / world_scale,
        z: p.z / world_scale,
    }
}

impl SceneView {
    /// Meshes for every polygon with at least three 3D vertices. A section
    /// without any still gets a default grid so the viewport is not blank.
    pub fn prepare(section: &Section, cfg: &ViewerConfig) -> Result<Self> {
        let triangulator = Triangulator::new(cfg.triangulation);
        let world_scale = if cfg.world_scale > 0.0 { cfg.world_scale } else { 1.0 };
        let mut meshes = Vec::new();
        let mut diagnostics = Vec::new();

        for (i, poly) in section.polygons.iter().enumerate() {
            let tri = match triangulator.scene(&poly.points_3d) {
                Ok(t) => t,
                Err(Error::InsufficientVertices(count)) => {
                    diagnostics.push(Diagnostic::InsufficientVertices {
                        section: section.name.clone(),
                        polygon: i,
                        count,
                        space: Space::Scene,
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };
            if tri.fell_back {
                diagnostics.push(Diagnostic::TriangulationFallback {
                    section: section.name.clone(),
                    polygon: i,
                });
            }
            let positions: Vec<Point3> = poly
                .points_3d
                .iter()
                .map(|p| to_world(*p, world_scale))
                .collect();
            let normals = vertex_normals(&positions, &tri.indices);
            meshes.push(Mesh {
                polygon: i,
                positions,
                normals,
                indices: tri.indices,
                color: normalize_color_or(poly.color.as_deref(), &cfg.default_color),
                double_sided: true,
            });
        }

        let bounds = Bounds3::of(meshes.iter().flat_map(|m| m.positions.iter()));
        if bounds.is_none() {
            diagnostics.push(Diagnostic::EmptyExtent {
                section: section.name.clone(),
                space: Space::Scene,
            });
            diagnostics.push(Diagnostic::DefaultGridBounds(section.name.clone()));
        }
        let grid = GridHelper::for_bounds(bounds.as_ref(), cfg.grid_divisions);
        for d in &diagnostics {
            d.emit();
        }

        Ok(SceneView {
            section: section.name.clone(),
            meshes,
            bounds,
            grid,
            diagnostics,
        })
    }
}

/// Scene lighting: ambient plus one directional light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lighting {
    pub ambient: f64,
    pub directional: f64,
    /// Direction from the scene toward the light.
    pub direction: Point3,
}

impl Default for Lighting {
    fn default() -> Self {
        Lighting {
            ambient: 0.5,
            directional: 1.0,
            direction: normalize(Point3 {
                x: 100.0,
                y: 100.0,
                z: 100.0,
            }),
        }
    }
}

impl Lighting {
    /// Lambert shade of a double-sided face: the side facing the light is lit.
    pub fn shade(&self, color: Rgb, normal: Point3) -> Rgb {
        let lambert = dot(normalize(normal), self.direction).abs();
        color.shade(self.ambient + self.directional * lambert)
    }
}

/// Camera orbiting a target point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    pub target: Point3,
    pub radius: f64,
    /// Rotation about the vertical axis, radians.
    pub yaw: f64,
    /// Elevation above the horizontal plane, radians.
    pub pitch: f64,
    /// Vertical field of view, degrees.
    pub fov: f64,
    pub near: f64,
    pub far: f64,
}

const MAX_PITCH: f64 = std::f64::consts::FRAC_PI_2 - 0.01;

/// A world point placed on the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub screen: Point,
    /// Distance along the view direction; larger is farther away.
    pub depth: f64,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::looking_at(
            Point3 {
                x: 0.0,
                y: 100.0,
                z: 800.0,
            },
            Point3::default(),
        )
    }
}

impl OrbitCamera {
    pub fn looking_at(position: Point3, target: Point3) -> Self {
        let d = sub(position, target);
        let radius = dot(d, d).sqrt().max(1e-6);
        OrbitCamera {
            target,
            radius,
            yaw: d.x.atan2(d.z),
            pitch: (d.y / radius).clamp(-1.0, 1.0).asin(),
            fov: 75.0,
            near: 0.1,
            far: 5000.0,
        }
    }

    pub fn position(&self) -> Point3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        add(
            self.target,
            Point3 {
                x: self.radius * cp * sy,
                y: self.radius * sp,
                z: self.radius * cp * cy,
            },
        )
    }

    pub fn rotate(&mut self, d_yaw: f64, d_pitch: f64) {
        self.yaw += d_yaw;
        self.pitch = (self.pitch + d_pitch).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Move toward (`factor < 1`) or away from the target.
    pub fn dolly(&mut self, factor: f64) {
        if factor.is_finite() && factor > 0.0 {
            self.radius = (self.radius * factor).clamp(self.near * 10.0, self.far * 0.9);
        }
    }

    /// Slide the target across the view plane by screen-proportional amounts.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let (right, up, _) = self.basis();
        let s = self.radius * 0.002;
        self.target = add(self.target, add(scale(right, -dx * s), scale(up, dy * s)));
    }

    fn basis(&self) -> (Point3, Point3, Point3) {
        let forward = normalize(sub(self.target, self.position()));
        let world_up = Point3 {
            x: 0.0,
            y: 1.0,
            z: 0.0,
        };
        let right = normalize(cross(forward, world_up));
        let up = cross(right, forward);
        (right, up, forward)
    }

    /// Perspective projection onto a `width` x `height` viewport. Points
    /// outside the near/far planes yield `None`.
    pub fn project(&self, p: Point3, width: f64, height: f64) -> Option<Projected> {
        let (right, up, forward) = self.basis();
        let rel = sub(p, self.position());
        let depth = dot(rel, forward);
        if depth < self.near || depth > self.far {
            return None;
        }
        let f = (height / 2.0) / (self.fov.to_radians() / 2.0).tan();
        Some(Projected {
            screen: Point {
                x: width / 2.0 + dot(rel, right) * f / depth,
                y: height / 2.0 - dot(rel, up) * f / depth,
            },
            depth,
        })
    }
}

/// A triangle ready for painter's-algorithm drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct Face {
    pub points: [Point; 3],
    pub depth: f64,
    pub fill: Rgb,
}

/// Project, light and depth-sort every triangle of the meshes, farthest first.
pub fn painter_faces(
    meshes: &[Mesh],
    camera: &OrbitCamera,
    lighting: &Lighting,
    width: f64,
    height: f64,
) -> Vec<Face> {
    let mut faces = Vec::new();
    for mesh in meshes {
        let base = Rgb::parse(&mesh.color).unwrap_or(Rgb::GRAY);
        for tri in mesh.indices.chunks_exact(3) {
            let v = [
                mesh.positions[tri[0] as usize],
                mesh.positions[tri[1] as usize],
                mesh.positions[tri[2] as usize],
            ];
            let projected: Option<Vec<Projected>> =
                v.iter().map(|p| camera.project(*p, width, height)).collect();
            let Some(pr) = projected else { continue };
            let normal = cross(sub(v[1], v[0]), sub(v[2], v[0]));
            faces.push(Face {
                points: [pr[0].screen, pr[1].screen, pr[2].screen],
                depth: (pr[0].depth + pr[1].depth + pr[2].depth) / 3.0,
                fill: lighting.shade(base, normal),
            });
        }
    }
    faces.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    faces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Polygon;
    use approx::assert_relative_eq;

    fn p3(x: f64, y: f64, z: f64) -> Point3 {
        Point3 { x, y, z }
    }

    #[test]
    fn normals_of_planar_square() {
        let pos = vec![p3(0.0, 0.0, 0.0), p3(1.0, 0.0, 0.0), p3(1.0, 1.0, 0.0), p3(0.0, 1.0, 0.0)];
        let n = vertex_normals(&pos, &[0, 1, 2, 0, 2, 3]);
        for v in n {
            assert_relative_eq!(v.z, 1.0);
            assert_relative_eq!(v.x, 0.0);
        }
        // Reversed winding flips the normal.
        let n = vertex_normals(&pos, &[0, 2, 1, 0, 3, 2]);
        assert_relative_eq!(n[0].z, -1.0);
    }

    #[test]
    fn prepare_scales_flips_and_colors() {
        let section = Section {
            name: "S".into(),
            polygons: vec![
                Polygon {
                    points_3d: vec![p3(0.0, 10.0, 0.0), p3(50.0, 10.0, 0.0), p3(50.0, 20.0, 25.0)],
                    color: Some("00ff00".into()),
                    ..Default::default()
                },
                Polygon {
                    points_3d: vec![p3(0.0, 0.0, 0.0)],
                    ..Default::default()
                },
            ],
            boreholes: vec![],
        };
        let scene = SceneView::prepare(&section, &ViewerConfig::default()).unwrap();
        assert_eq!(scene.meshes.len(), 1);
        let m = &scene.meshes[0];
        assert_eq!(m.positions[1], p3(10.0, -2.0, 0.0));
        assert_eq!(m.color, "#00ff00");
        assert!(m.double_sided);
        assert_eq!(m.indices, vec![0, 1, 2]);
        assert_eq!(m.positions.len(), 3);
        assert!(matches!(
            scene.diagnostics.as_slice(),
            [Diagnostic::InsufficientVertices {
                polygon: 1,
                count: 1,
                space: Space::Scene,
                ..
            }]
        ));

        let b = scene.bounds.unwrap();
        assert_eq!(scene.grid.center, p3(5.0, b.y.min, 2.5));
        assert_eq!(scene.grid.size, 10.0);
        assert_eq!(b.y.min, -4.0);
    }

    #[test]
    fn empty_scene_uses_default_grid() {
        let section = Section {
            name: "E".into(),
            ..Default::default()
        };
        let scene = SceneView::prepare(&section, &ViewerConfig::default()).unwrap();
        assert!(scene.meshes.is_empty());
        assert_eq!(scene.grid.center, Point3::default());
        assert_eq!(scene.grid.size, 100.0);
        assert!(scene.diagnostics.contains(&Diagnostic::DefaultGridBounds("E".into())));
        assert_eq!(scene.grid.lines().len(), 22);
    }

    #[test]
    fn default_camera_matches_start_position() {
        let cam = OrbitCamera::default();
        let pos = cam.position();
        assert_relative_eq!(pos.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(pos.y, 100.0, epsilon = 1e-9);
        assert_relative_eq!(pos.z, 800.0, epsilon = 1e-9);
        // The target sits in the middle of the viewport.
        let c = cam.project(Point3::default(), 800.0, 500.0).unwrap();
        assert_relative_eq!(c.screen.x, 400.0, epsilon = 1e-9);
        assert_relative_eq!(c.screen.y, 250.0, epsilon = 1e-9);
    }

    #[test]
    fn camera_clamps_pitch_and_dolly() {
        let mut cam = OrbitCamera::default();
        cam.rotate(0.3, 10.0);
        assert!(cam.pitch < std::f64::consts::FRAC_PI_2);
        cam.dolly(1e-9);
        assert!(cam.radius >= cam.near * 10.0);
        cam.dolly(1e9);
        assert!(cam.radius <= cam.far);
        // Points behind the camera are not drawn.
        let behind = scale(sub(cam.position(), cam.target), 2.0);
        assert!(cam.project(add(cam.target, behind), 800.0, 500.0).is_none());
    }

    #[test]
    fn faces_sorted_far_to_near() {
        let mesh = |z: f64, polygon: usize| Mesh {
            polygon,
            positions: vec![p3(0.0, 0.0, z), p3(10.0, 0.0, z), p3(0.0, 10.0, z)],
            normals: vec![],
            indices: vec![0, 1, 2],
            color: "#ff0000".into(),
            double_sided: true,
        };
        let meshes = vec![mesh(100.0, 0), mesh(-100.0, 1)];
        let faces = painter_faces(
            &meshes,
            &OrbitCamera::default(),
            &Lighting::default(),
            800.0,
            500.0,
        );
        assert_eq!(faces.len(), 2);
        assert!(faces[0].depth > faces[1].depth);
    }

    #[test]
    fn lighting_is_two_sided() {
        let light = Lighting::default();
        let c = Rgb {
            r: 100,
            g: 100,
            b: 100,
        };
        let front = light.shade(c, light.direction);
        assert_eq!(front, light.shade(c, scale(light.direction, -1.0)));
        assert_eq!(front.to_hex(), "#969696");
    }
}
