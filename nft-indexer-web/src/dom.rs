// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Draws a [`Page`] into the document. Text coming from the API is only ever set as
//! text content or attribute values.

use nft_indexer::render::{Body, Page, TileStatus, TileView};
use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

fn element(document: &Document, tag: &str, class: &str) -> Result<Element, JsValue> {
    let element = document.create_element(tag)?;
    element.set_class_name(class);
    Ok(element)
}

fn text(document: &Document, tag: &str, class: &str, content: &str) -> Result<Element, JsValue> {
    let element = element(document, tag, class)?;
    element.set_text_content(Some(content));
    Ok(element)
}

fn tile(document: &Document, view: &TileView) -> Result<Element, JsValue> {
    let tile = element(document, "div", "nft-tile")?;
    let status = match view.status {
        TileStatus::Pending => "pending",
        TileStatus::Loaded => "loaded",
        TileStatus::Failed => "failed",
    };
    tile.set_attribute("data-status", status)?;
    tile.set_attribute(
        "title",
        &format!("{} #{}", view.contract_address, view.token_id),
    )?;

    let image = element(document, "img", "nft-image")?;
    image.set_attribute("src", &view.image_url)?;
    image.set_attribute("alt", &view.name)?;
    image.set_attribute("loading", "lazy")?;
    tile.append_child(&image)?;

    tile.append_child(&text(document, "p", "nft-name", &format!("Name: {}", view.name))?)?;
    Ok(tile)
}

/// Replaces the children of `root` with `page`.
pub fn render_page(document: &Document, root: &Element, page: &Page) -> Result<(), JsValue> {
    root.set_text_content(None);

    let header = element(document, "header", "nft-header")?;
    header.append_child(&text(document, "span", "nft-wallet", &page.wallet)?)?;
    header.append_child(&text(
        document,
        "span",
        "nft-network",
        page.network.label(),
    )?)?;
    if let Some(results) = page.results_network.filter(|results| *results != page.network) {
        header.append_child(&text(
            document,
            "span",
            "nft-results-network",
            &format!("Results from {}", results.label()),
        )?)?;
    }
    root.append_child(&header)?;

    match &page.body {
        Body::Prompt(prompt) => {
            root.append_child(&text(document, "p", "nft-prompt", prompt)?)?;
        }
        Body::Error(error) => {
            root.append_child(&text(document, "p", "nft-error", error)?)?;
        }
        Body::Grid(tiles) if tiles.is_empty() => {
            root.append_child(&text(document, "p", "nft-empty", "No NFTs found.")?)?;
        }
        Body::Grid(tiles) => {
            root.append_child(&text(document, "h2", "nft-title", "Here are your NFTs:")?)?;
            let grid = element(document, "div", "nft-grid")?;
            for view in tiles {
                grid.append_child(&tile(document, view)?)?;
            }
            root.append_child(&grid)?;
        }
    }

    if let Some(more) = page.more_available {
        root.append_child(&text(
            document,
            "p",
            "nft-more",
            &format!("... and {more} more not listed"),
        )?)?;
    }
    Ok(())
}
