//! WebAssembly bindings for Histograph
//!
//! Browser-facing wrappers around document layout and connection checks.
//! Failures surface as JavaScript exceptions.

use wasm_bindgen::prelude::*;

use crate::core::{Connection, Direction, NodeKind};

/// Initialize WASM module
///
/// Installs the panic hook and routes tracing output to the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use crate::core::logging::init_logging;
    let _ = init_logging(Some("info"), None);
}

/// Lay out a JSON graph document
///
/// `direction` is "TB", "TD" or "LR"; an empty string keeps the document's
/// own direction.
#[wasm_bindgen]
pub fn layout_document(json: &str, direction: &str) -> Result<String, JsValue> {
    let direction = if direction.trim().is_empty() {
        None
    } else {
        Some(direction.parse::<Direction>().map_err(|e| JsValue::from_str(&e))?)
    };
    crate::layout_document(json, direction).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}

/// Returns false for connections the canvas must refuse
#[wasm_bindgen]
pub fn is_valid_connection(source: &str, target: &str) -> bool {
    crate::canvas::is_valid_connection(&Connection::new(source, target))
}

/// JSON array of node kind tags, in toolbar order
#[wasm_bindgen]
pub fn node_kinds() -> Result<String, JsValue> {
    let kinds: Vec<&str> = NodeKind::ALL.iter().map(|k| k.as_str()).collect();
    serde_json::to_string(&kinds).map_err(|e| JsValue::from_str(&e.to_string()))
}
