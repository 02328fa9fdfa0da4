//! Text panels around the canvases: status line, info panel, legend table
//! and the section dropdown.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlOptionElement, HtmlSelectElement};

use section_core::legend::escape_html;
use section_core::{Dataset, InfoPanel, build_legend};

use crate::constants::{INFO_ID, LEGEND_BODY_SELECTOR, SECTION_SELECT_ID, STATUS_ID};
use crate::state::LoadState;

pub fn update_status(document: &Document, load: &LoadState, note: Option<&str>) {
    let Some(el) = document.get_element_by_id(STATUS_ID) else {
        return;
    };
    let text = match (load, note) {
        (LoadState::Loading, _) => "Loading…".to_string(),
        (LoadState::Failed(msg), _) => format!("Failed to load data: {msg}"),
        (LoadState::Ready, Some(n)) => n.to_string(),
        (LoadState::Ready, None) => String::new(),
    };
    el.set_text_content(Some(&text));
    let _ = el.set_attribute(
        "class",
        if matches!(load, LoadState::Failed(_)) {
            "error"
        } else {
            ""
        },
    );
}

pub fn show_info(document: &Document, panel: Option<&InfoPanel>) {
    if let Some(el) = document.get_element_by_id(INFO_ID) {
        el.set_inner_html(&panel.map(InfoPanel::to_html).unwrap_or_default());
    }
}

/// Rebuild the legend table body from every section of the dataset.
pub fn render_legend(document: &Document, dataset: &Dataset, default_color: &str) {
    let Ok(Some(body)) = document.query_selector(LEGEND_BODY_SELECTOR) else {
        return;
    };
    let mut html = String::new();
    for entry in build_legend(dataset, default_color) {
        html.push_str(&format!(
            "<tr><td style=\"background: {}; width: 50px;\"></td><td>{}</td></tr>",
            escape_html(&entry.color),
            escape_html(&entry.description)
        ));
    }
    body.set_inner_html(&html);
}

/// Replace the dropdown options with the dataset's section names.
pub fn populate_sections(
    document: &Document,
    dataset: &Dataset,
    selected: &str,
) -> Result<(), JsValue> {
    let Some(sel) = document.get_element_by_id(SECTION_SELECT_ID) else {
        return Ok(());
    };
    let sel: HtmlSelectElement = sel.dyn_into()?;
    sel.set_inner_html("");
    for name in dataset.section_names() {
        let opt = HtmlOptionElement::new_with_text_and_value(name, name)?;
        opt.set_selected(name == selected);
        sel.append_child(&opt)?;
    }
    Ok(())
}
