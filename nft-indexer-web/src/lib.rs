// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
The browser front end of the NFT indexer.

[`IndexerApp`] owns the indexer view and draws every new view state into a root element
of the page. The page itself provides the controls and calls the exported methods.
 */

#![cfg(target_arch = "wasm32")]
// We sometimes need functions in this module to be async in order to
// ensure the generated code will return a `Promise`.
#![allow(clippy::unused_async)]

mod dom;
mod js_utils;
mod tracing;
mod wallet;

use nft_indexer::{
    config::IndexerConfig,
    render::render,
    view::IndexerView,
    wallet::{WalletConnector, WalletOutcome},
    Network,
};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element};

pub use crate::wallet::BrowserWallet;

type JsResult<T> = Result<T, JsError>;

fn document() -> JsResult<Document> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsError::new("no document to render into"))
}

fn draw(document: &Document, root: &Element, view: &IndexerView<IndexerConfig>) -> JsResult<()> {
    dom::render_page(document, root, &render(&view.snapshot()))
        .map_err(|error| JsError::new(&js_utils::stringify(&error)))
}

/// The NFT indexer, bound to an element of the page.
#[wasm_bindgen]
pub struct IndexerApp {
    view: IndexerView<IndexerConfig>,
    connector: WalletConnector<BrowserWallet>,
    document: Document,
    root: Element,
}

#[wasm_bindgen]
impl IndexerApp {
    /// Creates the app and draws the initial page into the element `root_id`.
    ///
    /// Mumbai uses `goerli_key` unless `mumbai_key` is given.
    ///
    /// # Errors
    /// If there is no element `root_id`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        goerli_key: String,
        mumbai_key: Option<String>,
        root_id: &str,
    ) -> JsResult<IndexerApp> {
        let document = document()?;
        let root = document
            .get_element_by_id(root_id)
            .ok_or_else(|| JsError::new(&format!("no element with id `{root_id}`")))?;
        let mut config = IndexerConfig::new(goerli_key);
        config.mumbai_api_key = mumbai_key.filter(|key| !key.is_empty());
        let view = IndexerView::with_config(config, Network::default())?;
        let connector = WalletConnector::new(BrowserWallet::detect());
        if !connector.has_provider() {
            ::tracing::info!("no browser wallet detected");
        }
        let app = IndexerApp {
            view,
            connector,
            document,
            root,
        };
        app.render()?;
        app.redraw_on_change();
        Ok(app)
    }

    fn redraw_on_change(&self) {
        let mut updates = self.view.subscribe();
        let document = self.document.clone();
        let root = self.root.clone();
        wasm_bindgen_futures::spawn_local(async move {
            while updates.changed().await.is_ok() {
                let page = render(&updates.borrow_and_update());
                if let Err(error) = dom::render_page(&document, &root, &page) {
                    ::tracing::error!(error = %js_utils::stringify(&error), "failed to draw the page");
                }
            }
        });
    }

    /// Selects the network named by `value`; anything but `MUMBAI` selects Goerli.
    /// Returns the value of the selected network.
    #[wasm_bindgen(js_name = selectNetwork)]
    pub fn select_network(&self, value: &str) -> JsResult<String> {
        let network = self.view.select_network(value)?;
        Ok(network.selector_value().to_string())
    }

    /// The value of the selected network.
    #[wasm_bindgen(getter)]
    pub fn network(&self) -> String {
        self.view.network().selector_value().to_string()
    }

    /// Lists the NFTs owned by `address`. The page is redrawn as results arrive.
    ///
    /// # Errors
    /// If the address is blank or the NFTs could not be listed.
    #[wasm_bindgen]
    pub async fn query(&self, address: String) -> JsResult<()> {
        self.view.fetch_owned_nfts(&address).await?;
        Ok(())
    }

    /// Connects to the browser wallet and lists the NFTs of its first account.
    /// Resolves to the account, or to `undefined` if no account could be used.
    ///
    /// # Errors
    /// If the NFTs of the account could not be listed.
    #[wasm_bindgen(js_name = connectWallet)]
    pub async fn connect_wallet(&self) -> JsResult<Option<String>> {
        match self.connector.connect_and_fetch(&self.view).await {
            WalletOutcome::Connected { account, query } => {
                query?;
                Ok(Some(account))
            }
            WalletOutcome::NoProvider | WalletOutcome::NoAccounts => Ok(None),
            WalletOutcome::Rejected(error) => {
                ::tracing::debug!(%error, "wallet connection refused");
                Ok(None)
            }
        }
    }

    /// Whether a browser wallet was found.
    #[wasm_bindgen(getter, js_name = hasWallet)]
    pub fn has_wallet(&self) -> bool {
        self.connector.has_provider()
    }

    /// Redraws the page from the current state.
    #[wasm_bindgen]
    pub fn render(&self) -> JsResult<()> {
        draw(&self.document, &self.root, &self.view)
    }

    /// The current page as a plain object, for pages that draw it themselves.
    #[wasm_bindgen]
    pub fn page(&self) -> JsResult<JsValue> {
        Ok(serde_wasm_bindgen::to_value(&render(&self.view.snapshot()))?)
    }
}

#[wasm_bindgen(start)]
pub fn main() {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    crate::tracing::init();
}
