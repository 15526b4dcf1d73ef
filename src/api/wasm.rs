//! WASM bindings. Values cross the boundary as `JsValue` via
//! serde-wasm-bindgen; typed errors become `js_sys::Error` values carrying
//! the display string.

use crate::api::dto::ExpeditionRequest;
use crate::api::runner;
use crate::config::{game_data, GameData};
use wasm_bindgen::prelude::*;

fn to_js_error(message: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&message.to_string()).into()
}

/// Initialise logging for the browser console. Safe to call repeatedly.
#[wasm_bindgen(js_name = initExpeditionEngine)]
pub fn init_expedition_engine() {
    let _ = console_log::init_with_level(log::Level::Info);
    // Booting with malformed tables is a refusal, not a warning.
    game_data()
        .validate()
        .expect("static game tables are malformed");
}

/// Run one expedition calculation.
#[wasm_bindgen(js_name = calculateExpedition)]
pub fn calculate_expedition(request: JsValue) -> Result<JsValue, JsValue> {
    let request: ExpeditionRequest =
        serde_wasm_bindgen::from_value(request).map_err(to_js_error)?;
    let report = runner::calculate(&request).map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&report).map_err(to_js_error)
}

/// Run one calculation against a table override bundle instead of the
/// built-in defaults. The override is validated on every call.
#[wasm_bindgen(js_name = calculateExpeditionWithTables)]
pub fn calculate_expedition_with_tables(
    tables_json: &str,
    request: JsValue,
) -> Result<JsValue, JsValue> {
    let data = GameData::import_from_json(tables_json).map_err(to_js_error)?;
    let request: ExpeditionRequest =
        serde_wasm_bindgen::from_value(request).map_err(to_js_error)?;
    let report = runner::calculate_with_data(&data, &request).map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&report).map_err(to_js_error)
}

/// Export the active game tables as JSON (for tuning UIs).
#[wasm_bindgen(js_name = exportGameData)]
pub fn export_game_data() -> Result<String, JsValue> {
    game_data().export_to_json().map_err(to_js_error)
}

/// Validate a game-table override bundle without installing it.
#[wasm_bindgen(js_name = validateGameData)]
pub fn validate_game_data(json: &str) -> Result<(), JsValue> {
    GameData::import_from_json(json)
        .map(|_| ())
        .map_err(to_js_error)
}
