use std::env;
use std::fs;
use std::path::Path;

use section_core::{Dataset, Error, PlanView, TriangulationMode, ViewTransform, ViewerConfig};
use section_svg::{build_section_svg, render_png};

const USAGE: &str = "Usage: section-export <data.json> <output.(svg|png)> [section] [--ear-clip]";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let ear_clip = match args.iter().position(|a| a == "--ear-clip") {
        Some(i) => {
            args.remove(i);
            true
        }
        None => false,
    };
    if args.len() < 2 {
        eprintln!("{USAGE}");
        std::process::exit(2);
    }
    let input = &args[0];
    let output = &args[1];

    let cfg = ViewerConfig {
        triangulation: if ear_clip {
            TriangulationMode::EarClip
        } else {
            TriangulationMode::Fan
        },
        ..Default::default()
    };

    let txt = fs::read_to_string(input)?;
    let dataset = Dataset::from_json(&txt)?;
    let section = match args.get(2) {
        Some(name) => dataset
            .section(name)
            .ok_or_else(|| Error::SectionNotFound(name.clone()))?,
        None => dataset
            .first_section()
            .ok_or_else(|| Error::Load("document has no sections".into()))?,
    };
    log::info!("exporting section {} from {input}", section.name);

    let view = PlanView::prepare(section, &cfg)?;
    let (svg, w_px, h_px) = build_section_svg(&view, section, &cfg, &ViewTransform::IDENTITY);

    let ext = Path::new(output)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("svg") => fs::write(output, svg)?,
        Some("png") => {
            let mut fontdb = usvg::fontdb::Database::new();
            fontdb.load_system_fonts();
            let bytes = render_png(&svg, w_px, h_px, fontdb)?;
            fs::write(output, bytes)?;
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }
    log::info!("wrote {output} ({w_px}x{h_px})");
    Ok(())
}
