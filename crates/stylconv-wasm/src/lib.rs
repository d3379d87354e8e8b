//! WASM bindings for stylconv.
//!
//! Exposes `convert()`, `convertMany()`, `convertTree()` and `version()` to
//! JavaScript via wasm-bindgen. Conversion failures are thrown as JS errors.

use stylconv_codegen::{ConvertError, ConvertOptions, Dialect};
use stylconv_parser::Stylesheet;
use wasm_bindgen::prelude::*;

/// Convert Stylus source to the target dialect (default `scss`).
///
/// Anything that is not a string is returned unchanged.
#[wasm_bindgen]
pub fn convert(input: JsValue, target: Option<String>) -> Result<JsValue, JsError> {
    let Some(source) = input.as_string() else {
        return Ok(input);
    };
    let output = convert_source(&source, target.as_deref()).map_err(to_js_error)?;
    Ok(JsValue::from_str(&output))
}

/// Convert every string of an array; other items pass through unchanged.
#[wasm_bindgen(js_name = convertMany)]
pub fn convert_many(inputs: js_sys::Array, target: Option<String>) -> Result<js_sys::Array, JsError> {
    let results = js_sys::Array::new();
    for input in inputs.iter() {
        results.push(&convert(input, target.clone())?);
    }
    Ok(results)
}

/// Convert an already-parsed tree (a plain object tagged with `__type`).
#[wasm_bindgen(js_name = convertTree)]
pub fn convert_tree(tree: JsValue, target: Option<String>) -> Result<String, JsError> {
    let sheet: Stylesheet = serde_wasm_bindgen::from_value(tree)
        .map_err(|e| JsError::new(&format!("Invalid tree: {e}")))?;
    let options = options(target.as_deref()).map_err(to_js_error)?;
    stylconv_codegen::convert_stylesheet(&sheet, &options).map_err(to_js_error)
}

/// Get the converter version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn options(target: Option<&str>) -> Result<ConvertOptions, ConvertError> {
    let dialect = match target {
        Some(name) => name.parse::<Dialect>()?,
        None => Dialect::default(),
    };
    Ok(ConvertOptions {
        dialect,
        ..ConvertOptions::default()
    })
}

fn convert_source(source: &str, target: Option<&str>) -> Result<String, ConvertError> {
    let options = options(target)?;
    stylconv_codegen::convert(source, &options)
}

fn to_js_error(e: ConvertError) -> JsError {
    JsError::new(&e.to_string())
}
