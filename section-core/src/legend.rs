use std::collections::HashSet;

use crate::color::normalize_color_or;
use crate::model::{Borehole, Dataset, Polygon};

pub const NO_DATA: &str = "No data";
pub const UNKNOWN_MATERIAL: &str = "Unknown Material";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegendEntry {
    pub color: String,
    pub description: String,
}

/// One row per distinct fill color across the whole dataset, in first-seen
/// order. The first polygon seen with a color names it.
pub fn build_legend(dataset: &Dataset, default_color: &str) -> Vec<LegendEntry> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for poly in dataset.sections.iter().flat_map(|s| s.polygons.iter()) {
        let color = normalize_color_or(poly.color.as_deref(), default_color);
        if seen.insert(color.clone()) {
            out.push(LegendEntry {
                color,
                description: poly
                    .symbol_description
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_MATERIAL.to_string()),
            });
        }
    }
    out
}

/// Labelled values shown in the detail panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InfoPanel {
    pub title: &'static str,
    pub rows: Vec<(&'static str, String)>,
}

fn or_no_data(v: Option<&str>) -> String {
    v.map(str::to_string).unwrap_or_else(|| NO_DATA.to_string())
}

fn num_or_no_data(v: Option<f64>) -> String {
    v.map(|n| format!("{n}")).unwrap_or_else(|| NO_DATA.to_string())
}

impl InfoPanel {
    pub fn polygon(p: &Polygon) -> Self {
        InfoPanel {
            title: "Polygon Info",
            rows: vec![
                ("Symbol", or_no_data(p.symbol.as_deref())),
                (
                    "Symbol Description",
                    or_no_data(p.symbol_description.as_deref()),
                ),
            ],
        }
    }

    pub fn borehole(b: &Borehole) -> Self {
        InfoPanel {
            title: "Borehole Info",
            rows: vec![
                ("Name", or_no_data(b.name.as_deref())),
                ("Elevation", num_or_no_data(Some(b.elevation))),
                ("Depth", num_or_no_data(b.depth)),
            ],
        }
    }

    pub fn to_html(&self) -> String {
        let mut html = format!("<h3>{}</h3>", escape_html(self.title));
        for (label, value) in &self.rows {
            html.push_str(&format!(
                "<p><b>{}:</b> {}</p>",
                escape_html(label),
                escape_html(value)
            ));
        }
        html
    }
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Section;

    fn poly(color: Option<&str>, desc: Option<&str>) -> Polygon {
        Polygon {
            color: color.map(Into::into),
            symbol_description: desc.map(Into::into),
            ..Default::default()
        }
    }

    #[test]
    fn legend_dedupes_by_normalized_color() {
        let ds = Dataset {
            sections: vec![
                Section {
                    name: "A".into(),
                    polygons: vec![poly(Some("ff0000"), Some("Clay")), poly(None, None)],
                    boreholes: vec![],
                },
                Section {
                    name: "B".into(),
                    polygons: vec![
                        poly(Some("#ff0000"), Some("Not clay")),
                        poly(Some("00ff00"), None),
                    ],
                    boreholes: vec![],
                },
            ],
            diagnostics: vec![],
        };
        let legend = build_legend(&ds, "#cccccc");
        assert_eq!(
            legend,
            vec![
                LegendEntry {
                    color: "#ff0000".into(),
                    description: "Clay".into(),
                },
                LegendEntry {
                    color: "#cccccc".into(),
                    description: UNKNOWN_MATERIAL.into(),
                },
                LegendEntry {
                    color: "#00ff00".into(),
                    description: UNKNOWN_MATERIAL.into(),
                },
            ]
        );
    }

    #[test]
    fn info_defaults_to_no_data() {
        let panel = InfoPanel::polygon(&poly(None, Some("Sand & <gravel>")));
        assert_eq!(panel.rows[0], ("Symbol", NO_DATA.to_string()));
        assert_eq!(
            panel.to_html(),
            "<h3>Polygon Info</h3><p><b>Symbol:</b> No data</p>\
             <p><b>Symbol Description:</b> Sand &amp; &lt;gravel&gt;</p>"
        );

        let bh = InfoPanel::borehole(&Borehole {
            name: None,
            x: 0.0,
            elevation: 12.5,
            depth: None,
        });
        assert_eq!(
            bh.rows,
            vec![
                ("Name", NO_DATA.to_string()),
                ("Elevation", "12.5".to_string()),
                ("Depth", NO_DATA.to_string()),
            ]
        );
    }
}
