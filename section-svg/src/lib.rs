//! Static SVG/PNG rendering of a section plan view.

use std::sync::Arc;

use png::{BitDepth, ColorType, Compression, Encoder, Filter};
use section_core::legend::escape_html;
use section_core::{Point, PlanView, Section, ViewTransform, ViewerConfig, plan_axes};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("SVG parse error: {0}")]
    Svg(String),

    #[error("pixmap alloc failed for {0}x{1}")]
    Pixmap(u32, u32),

    #[error("png encode: {0}")]
    Png(#[from] png::EncodingError),
}

/// Borehole marker radius in px.
const BOREHOLE_R: f64 = 5.0;

fn svg_escape(s: &str) -> String {
    escape_html(s)
}

fn points_attr(pts: &[Point]) -> String {
    pts.iter()
        .map(|p| format!("{:.2},{:.2}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the plan SVG for a prepared view. Returns the SVG text and its
/// pixel size.
pub fn build_section_svg(
    view: &PlanView,
    section: &Section,
    cfg: &ViewerConfig,
    t: &ViewTransform,
) -> (String, u32, u32) {
    let w = cfg.plan_width.max(1.0);
    let h = cfg.plan_height.max(1.0);
    let m = cfg.plan_margin;
    let w_px = w.round() as u32;
    let h_px = h.round() as u32;

    let mut s = String::new();
    s.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    s.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w_px}\" height=\"{h_px}\" viewBox=\"0 0 {w_px} {h_px}\" font-family=\"sans-serif\" font-size=\"10\">\n"
    ));
    s.push_str(&format!(
        "<rect x=\"0\" y=\"0\" width=\"{w_px}\" height=\"{h_px}\" fill=\"#ffffff\"/>\n"
    ));
    s.push_str(&format!(
        "<title>{}</title>\n",
        svg_escape(&view.section)
    ));

    // Data clipped to the plot area so zoomed content stays off the axes.
    s.push_str(&format!(
        "<clipPath id=\"plot\"><rect x=\"{m}\" y=\"{m}\" width=\"{:.2}\" height=\"{:.2}\"/></clipPath>\n",
        (w - 2.0 * m).max(0.0),
        (h - 2.0 * m).max(0.0)
    ));
    s.push_str("<g clip-path=\"url(#plot)\">\n");
    for shape in &view.shapes {
        let ring = view.screen_ring(shape, t);
        s.push_str(&format!(
            "<polygon points=\"{}\" fill=\"{}\" stroke=\"#000000\" stroke-width=\"1\"/>\n",
            points_attr(&ring),
            svg_escape(&shape.color)
        ));
    }
    for (i, b) in section.boreholes.iter().enumerate() {
        let Some(p) = view.borehole_screen(i, t) else {
            continue;
        };
        s.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{BOREHOLE_R}\" fill=\"#ffffff\" stroke=\"#1f4e9c\" stroke-width=\"2\"/>\n",
            p.x, p.y
        ));
        if let Some(name) = &b.name {
            s.push_str(&format!(
                "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" fill=\"#1f4e9c\">{}</text>\n",
                p.x,
                p.y - BOREHOLE_R - 3.0,
                svg_escape(name)
            ));
        }
    }
    s.push_str("</g>\n");

    // Axes: bottom at y = h - m, left at x = m.
    let (x_ticks, y_ticks) = plan_axes(&view.scales, t);
    let axis_y = h - m;
    s.push_str(&format!(
        "<g stroke=\"#000000\" fill=\"none\"><line x1=\"{m}\" y1=\"{axis_y}\" x2=\"{:.2}\" y2=\"{axis_y}\"/><line x1=\"{m}\" y1=\"{m}\" x2=\"{m}\" y2=\"{axis_y}\"/></g>\n",
        w - m
    ));
    for tick in x_ticks.iter().filter(|k| k.offset >= m - 0.5 && k.offset <= w - m + 0.5) {
        s.push_str(&format!(
            "<line x1=\"{x:.2}\" y1=\"{axis_y}\" x2=\"{x:.2}\" y2=\"{:.2}\" stroke=\"#000000\"/><text x=\"{x:.2}\" y=\"{:.2}\" text-anchor=\"middle\" fill=\"#000000\">{}</text>\n",
            axis_y + 6.0,
            axis_y + 18.0,
            svg_escape(&tick.label),
            x = tick.offset
        ));
    }
    for tick in y_ticks.iter().filter(|k| k.offset >= m - 0.5 && k.offset <= h - m + 0.5) {
        s.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{y:.2}\" x2=\"{m}\" y2=\"{y:.2}\" stroke=\"#000000\"/><text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"end\" fill=\"#000000\">{}</text>\n",
            m - 6.0,
            m - 9.0,
            tick.offset + 3.0,
            svg_escape(&tick.label),
            y = tick.offset
        ));
    }
    s.push_str("</svg>\n");
    (s, w_px, h_px)
}

/// Rasterize SVG text. Text renders only when `fontdb` has a face for it.
pub fn render_png(
    svg: &str,
    w_px: u32,
    h_px: u32,
    fontdb: usvg::fontdb::Database,
) -> Result<Vec<u8>, ExportError> {
    let mut opt = usvg::Options::default();
    let mut fontdb = fontdb;
    let family_name = fontdb
        .faces()
        .next()
        .and_then(|face| face.families.first().map(|(n, _)| n.clone()));
    if let Some(name) = family_name {
        fontdb.set_sans_serif_family(name);
    } else {
        log::warn!("no fonts loaded, PNG export will have no labels");
    }
    opt.fontdb = Arc::new(fontdb);
    let tree =
        usvg::Tree::from_str(svg, &opt).map_err(|e| ExportError::Svg(format!("{e:?}")))?;
    let mut pixmap =
        tiny_skia::Pixmap::new(w_px, h_px).ok_or(ExportError::Pixmap(w_px, h_px))?;
    let mut pm = pixmap.as_mut();
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pm);
    encode_rgba_to_png_bytes(pixmap.width(), pixmap.height(), pixmap.data())
}

/// RGBA to PNG bytes with fixed filter/compression, so equal input gives
/// byte-identical output.
pub fn encode_rgba_to_png_bytes(
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    {
        let mut enc = Encoder::new(&mut buf, width, height);
        enc.set_color(ColorType::Rgba);
        enc.set_depth(BitDepth::Eight);
        enc.set_filter(Filter::NoFilter);
        enc.set_compression(Compression::Balanced);
        let mut writer = enc.write_header()?;
        writer.write_image_data(rgba)?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use section_core::{Borehole, Polygon};

    fn section() -> Section {
        let ring = |pts: &[(f64, f64)]| -> Vec<Point> {
            pts.iter().map(|&p| Point::from(p)).collect()
        };
        Section {
            name: "A<1>".into(),
            polygons: vec![
                Polygon {
                    points_2d: ring(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]),
                    color: Some("ff0000".into()),
                    ..Default::default()
                },
                Polygon {
                    points_2d: ring(&[(0.0, 0.0), (5.0, 5.0)]),
                    ..Default::default()
                },
                Polygon {
                    points_2d: ring(&[(0.0, 5.0), (10.0, 5.0), (10.0, 10.0), (0.0, 10.0)]),
                    ..Default::default()
                },
            ],
            boreholes: vec![Borehole {
                name: Some("BH-1".into()),
                x: 5.0,
                elevation: 8.0,
                depth: Some(3.0),
            }],
        }
    }

    #[test]
    fn one_polygon_element_per_renderable_polygon() {
        let cfg = ViewerConfig::default();
        let s = section();
        let view = PlanView::prepare(&s, &cfg).unwrap();
        let (svg, w, h) = build_section_svg(&view, &s, &cfg, &ViewTransform::IDENTITY);
        assert_eq!((w, h), (500, 500));
        assert_eq!(svg.matches("<polygon ").count(), 2);
        assert!(svg.contains("fill=\"#ff0000\""));
        assert!(svg.contains("fill=\"#cccccc\""));
        assert!(svg.contains("<title>A&lt;1&gt;</title>"));
        assert!(svg.contains(">BH-1</text>"));
        assert!(svg.contains("points=\"50.00,450.00 450.00,450.00 450.00,50.00\""));
    }

    #[test]
    fn encoder_writes_rgba8_header() {
        let rgba = [255u8, 0, 0, 255, 0, 0, 255, 255];
        let bytes = encode_rgba_to_png_bytes(2, 1, &rgba).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(&bytes[12..16], b"IHDR");
        assert_eq!(&bytes[16..20], &2u32.to_be_bytes());
        assert_eq!(&bytes[20..24], &1u32.to_be_bytes());
        // bit depth 8, color type 6 (RGBA)
        assert_eq!(&bytes[24..26], &[8, 6]);
        assert_eq!(encode_rgba_to_png_bytes(2, 1, &rgba).unwrap(), bytes);
    }

    #[test]
    fn svg_parses_and_rasterizes() {
        let cfg = ViewerConfig {
            plan_width: 120.0,
            plan_height: 80.0,
            plan_margin: 10.0,
            ..Default::default()
        };
        let s = section();
        let view = PlanView::prepare(&s, &cfg).unwrap();
        let (svg, w, h) = build_section_svg(&view, &s, &cfg, &ViewTransform::IDENTITY);
        let a = render_png(&svg, w, h, usvg::fontdb::Database::new()).unwrap();
        let b = render_png(&svg, w, h, usvg::fontdb::Database::new()).unwrap();
        assert_eq!(&a[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(a, b);
    }
}
