use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, FileReader, HtmlInputElement};

use section_core::Error;

use crate::constants::FILE_INPUT_ID;
use crate::state::State;
use crate::{fail, load_dataset};

// Wires up the file input handler for loading a local data document.
pub fn attach_file_input(state: Rc<RefCell<State>>) -> Result<(), JsValue> {
    let doc: Document = state.borrow().document.clone();
    let Some(input) = doc.get_element_by_id(FILE_INPUT_ID) else {
        return Ok(());
    };
    let input: HtmlInputElement = input.dyn_into()?;
    let st = state.clone();
    let input_for_closure = input.clone();
    let onchange = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |_e: Event| {
        let Some(file) = input_for_closure.files().and_then(|files| files.item(0)) else {
            log::info!("no file selected");
            return;
        };
        let reader = match FileReader::new() {
            Ok(r) => r,
            Err(e) => {
                log::error!("FileReader unavailable: {e:?}");
                return;
            }
        };
        let st2 = st.clone();
        let reader_for_closure = reader.clone();
        let name = file.name();
        let onload = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |_ev: Event| {
            let text = reader_for_closure
                .result()
                .ok()
                .and_then(|r| r.as_string())
                .unwrap_or_default();
            let mut s = st2.borrow_mut();
            if text.is_empty() {
                fail(&mut s, Error::Load(format!("{name} is empty or unreadable")));
                return;
            }
            log::info!("loading {name} ({} bytes)", text.len());
            load_dataset(&mut s, &text, None);
        }));
        reader.set_onload(Some(onload.as_ref().unchecked_ref()));
        if let Err(e) = reader.read_as_text(&file) {
            log::error!("failed to read file: {e:?}");
        }
        onload.forget();
    }));
    input.set_onchange(Some(onchange.as_ref().unchecked_ref()));
    onchange.forget();
    Ok(())
}
