// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The wallet injected by a browser extension as `window.ethereum`.

use nft_indexer::{
    wallet::{WalletProvider, REQUEST_ACCOUNTS},
    WalletError,
};
use serde::Serialize;
use wasm_bindgen::{prelude::*, JsCast as _};

use crate::js_utils::{error_parts, getf};

#[wasm_bindgen(typescript_custom_section)]
const EIP1193_PROVIDER_INTERFACE: &'static str = r#"
export interface IEip1193Provider {
  request(args: { method: string; params?: unknown[] }): Promise<unknown>;
}"#;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(typescript_type = "IEip1193Provider")]
    pub type Eip1193Provider;

    #[wasm_bindgen(catch, method)]
    async fn request(this: &Eip1193Provider, args: JsValue) -> Result<JsValue, JsValue>;
}

#[derive(Serialize)]
struct RequestArguments<'a> {
    method: &'a str,
}

/// An EIP-1193 provider found on the page.
pub struct BrowserWallet(Eip1193Provider);

impl BrowserWallet {
    /// Returns the provider at `window.ethereum`, if a wallet extension installed one.
    pub fn detect() -> Option<Self> {
        let window = web_sys::window()?;
        let ethereum = getf(&window, "ethereum").ok()?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return None;
        }
        Some(BrowserWallet(ethereum.unchecked_into()))
    }
}

impl WalletProvider for BrowserWallet {
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        let args = serde_wasm_bindgen::to_value(&RequestArguments {
            method: REQUEST_ACCOUNTS,
        })
        .map_err(|error| WalletError::Transport(error.to_string()))?;
        let accounts = self.0.request(args).await.map_err(|error| {
            match error_parts(&error) {
                (Some(code), message) => WalletError::Rejected { code, message },
                (None, message) => WalletError::Transport(message),
            }
        })?;
        serde_wasm_bindgen::from_value(accounts)
            .map_err(|error| WalletError::MalformedResponse(error.to_string()))
    }
}
