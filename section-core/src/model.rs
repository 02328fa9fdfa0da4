use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Diagnostic, Space};

/// Basic two dimensional point used for plan geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl From<(f64, f64)> for Point {
    fn from(v: (f64, f64)) -> Self {
        Point { x: v.0, y: v.1 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<(f64, f64, f64)> for Point3 {
    fn from(v: (f64, f64, f64)) -> Self {
        Point3 {
            x: v.0,
            y: v.1,
            z: v.2,
        }
    }
}

// Raw document shapes, mirroring the data file field names.

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawVertex {
    #[serde(default)]
    pub vertex: Option<Vec<Option<f64>>>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPolygon {
    #[serde(default, rename = "points2D")]
    pub points_2d: Option<Vec<RawVertex>>,
    #[serde(default, rename = "points3D")]
    pub points_3d: Option<Vec<RawVertex>>,
    pub color: Option<String>,
    pub symbol: Option<String>,
    pub symbol_description: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawBorehole {
    #[serde(alias = "boreholeName")]
    pub name: Option<String>,
    #[serde(alias = "position")]
    pub x: Option<f64>,
    #[serde(alias = "z")]
    pub elevation: Option<f64>,
    pub depth: Option<f64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSection {
    pub section_name: String,
    #[serde(default)]
    pub polygons: Vec<RawPolygon>,
    #[serde(default)]
    pub boreholes: Option<Vec<RawBorehole>>,
}

/// Top-level data document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDataset {
    #[serde(default)]
    pub polygons_by_section: Vec<RawSection>,
}

// Validated domain entities.

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    pub points_2d: Vec<Point>,
    pub points_3d: Vec<Point3>,
    /// Color exactly as found in the document.
    pub color: Option<String>,
    pub symbol: Option<String>,
    pub symbol_description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Borehole {
    pub name: Option<String>,
    pub x: f64,
    pub elevation: f64,
    pub depth: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Section {
    pub name: String,
    pub polygons: Vec<Polygon>,
    pub boreholes: Vec<Borehole>,
}

/// All sections of a loaded document, in document order.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub sections: Vec<Section>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Dataset {
    /// Parse a data document and normalize it in one pass.
    pub fn from_json(text: &str) -> crate::Result<Self> {
        let raw: RawDataset = serde_json::from_str(text)?;
        Ok(Self::from_raw(raw))
    }

    pub fn from_raw(raw: RawDataset) -> Self {
        let mut diagnostics = Vec::new();
        let mut seen = HashSet::new();
        let mut sections = Vec::with_capacity(raw.polygons_by_section.len());
        for rs in raw.polygons_by_section {
            if !seen.insert(rs.section_name.clone()) {
                diagnostics.push(Diagnostic::DuplicateSection(rs.section_name));
                continue;
            }
            sections.push(normalize_section(rs, &mut diagnostics));
        }
        for d in &diagnostics {
            d.emit();
        }
        Dataset {
            sections,
            diagnostics,
        }
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    pub fn first_section(&self) -> Option<&Section> {
        self.sections.first()
    }
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

fn coords<const N: usize>(v: &RawVertex) -> Option<[f64; N]> {
    let raw = v.vertex.as_ref()?;
    if raw.len() < N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, c) in out.iter_mut().zip(raw.iter()) {
        *slot = finite(*c)?;
    }
    Some(out)
}

fn normalize_section(rs: RawSection, diagnostics: &mut Vec<Diagnostic>) -> Section {
    let name = rs.section_name;
    let mut polygons = Vec::with_capacity(rs.polygons.len());
    for (pi, rp) in rs.polygons.into_iter().enumerate() {
        let mut points_2d = Vec::new();
        for (vi, v) in rp.points_2d.iter().flatten().enumerate() {
            match coords::<2>(v) {
                Some([x, y]) => points_2d.push(Point { x, y }),
                None => diagnostics.push(Diagnostic::InvalidVertex {
                    section: name.clone(),
                    polygon: pi,
                    vertex: vi,
                    space: Space::Plan,
                }),
            }
        }
        let mut points_3d = Vec::new();
        for (vi, v) in rp.points_3d.iter().flatten().enumerate() {
            match coords::<3>(v) {
                Some([x, y, z]) => points_3d.push(Point3 { x, y, z }),
                None => diagnostics.push(Diagnostic::InvalidVertex {
                    section: name.clone(),
                    polygon: pi,
                    vertex: vi,
                    space: Space::Scene,
                }),
            }
        }
        polygons.push(Polygon {
            points_2d,
            points_3d,
            color: rp.color,
            symbol: rp.symbol,
            symbol_description: rp.symbol_description,
        });
    }

    let mut boreholes = Vec::new();
    for (bi, rb) in rs.boreholes.unwrap_or_default().into_iter().enumerate() {
        match (finite(rb.x), finite(rb.elevation)) {
            (Some(x), Some(elevation)) => boreholes.push(Borehole {
                name: rb.name,
                x,
                elevation,
                depth: finite(rb.depth),
            }),
            _ => diagnostics.push(Diagnostic::InvalidBorehole {
                section: name.clone(),
                borehole: bi,
            }),
        }
    }

    Section {
        name,
        polygons,
        boreholes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
      "polygonsBySection": [
        {
          "sectionName": "A-A'",
          "polygons": [
            {
              "points2D": [{"vertex":[0,0]},{"vertex":[10,0]},{"vertex":[10,10]}],
              "points3D": [{"vertex":[0,0,0]},{"vertex":[1,null,2]},{"vertex":[5]}],
              "color": "ff0000",
              "symbol": "Qal"
            }
          ],
          "boreholes": [
            {"name":"BH-1","x":5,"elevation":12.5,"depth":30},
            {"boreholeName":"BH-2","position":7}
          ]
        },
        { "sectionName": "A-A'", "polygons": [] },
        { "sectionName": "B-B'" }
      ]
    }"#;

    #[test]
    fn normalizes_document() {
        let ds = Dataset::from_json(DOC).unwrap();
        assert_eq!(ds.section_names().collect::<Vec<_>>(), vec!["A-A'", "B-B'"]);

        let a = ds.section("A-A'").unwrap();
        let p = &a.polygons[0];
        assert_eq!(p.points_2d.len(), 3);
        assert_eq!(p.points_3d, vec![Point3::from((0.0, 0.0, 0.0))]);
        assert_eq!(p.color.as_deref(), Some("ff0000"));
        assert_eq!(p.symbol_description, None);

        assert_eq!(a.boreholes.len(), 1);
        assert_eq!(a.boreholes[0].name.as_deref(), Some("BH-1"));
        assert_eq!(a.boreholes[0].depth, Some(30.0));

        assert!(ds.section("B-B'").unwrap().polygons.is_empty());
    }

    #[test]
    fn collects_diagnostics() {
        let ds = Dataset::from_json(DOC).unwrap();
        let invalid_vertices = ds
            .diagnostics
            .iter()
            .filter(|d| {
                matches!(
                    d,
                    Diagnostic::InvalidVertex {
                        space: Space::Scene,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(invalid_vertices, 2);
        assert!(ds.diagnostics.contains(&Diagnostic::DuplicateSection("A-A'".into())));
        assert!(ds.diagnostics.contains(&Diagnostic::InvalidBorehole {
            section: "A-A'".into(),
            borehole: 1
        }));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            Dataset::from_json("{ not json"),
            Err(crate::Error::Parse(_))
        ));
    }
}
