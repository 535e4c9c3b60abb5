// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use wasm_bindgen::prelude::*;

pub fn getf(target: &JsValue, field: &str) -> Result<JsValue, JsValue> {
    js_sys::Reflect::get(target, &JsValue::from_str(field))
}

pub fn stringify(x: &JsValue) -> String {
    js_sys::JSON::stringify(x)
        .map(String::from)
        .unwrap_or_else(|_| format!("{x:?}"))
}

/// Reads the `code` and `message` of a JavaScript error object, such as the errors
/// raised by EIP-1193 providers.
pub fn error_parts(error: &JsValue) -> (Option<i64>, String) {
    let code = getf(error, "code")
        .ok()
        .and_then(|code| code.as_f64())
        .map(|code| code as i64);
    let message = getf(error, "message")
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| stringify(error));
    (code, message)
}
