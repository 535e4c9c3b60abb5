// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Turns a [`ViewState`] into what is shown to the user.

use std::fmt;

use serde::Serialize;

use crate::{
    network::Network,
    state::{MetadataState, QueryState, ViewState},
};

/// Shown until a query has produced results.
pub const QUERY_PROMPT: &str = "Please make a query! The query may take a few seconds...";

/// The name of a tile whose metadata has no title.
pub const NO_NAME: &str = "No Name";

/// The name of a tile whose metadata is still being fetched.
pub const LOADING_NAME: &str = "Loading...";

/// The image of a tile whose metadata has no image.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/200";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TileStatus {
    Pending,
    Loaded,
    Failed,
}

/// One cell of the grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TileView {
    pub name: String,
    pub image_url: String,
    pub status: TileStatus,
    pub contract_address: String,
    pub token_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum Body {
    Prompt(String),
    Error(String),
    Grid(Vec<TileView>),
}

/// Everything shown on the page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page {
    pub wallet: String,
    /// The selected network.
    pub network: Network,
    /// The network the grid was listed on. It differs from `network` when the
    /// selection changed after the query.
    pub results_network: Option<Network>,
    pub body: Body,
    /// Set when the API reports more NFTs than were listed.
    pub more_available: Option<u64>,
}

/// Renders `state`. This is a pure function of the snapshot.
pub fn render(state: &ViewState) -> Page {
    let mut more_available = None;
    let mut results_network = None;
    let body = match &state.query {
        QueryState::Idle | QueryState::Loading { .. } => Body::Prompt(QUERY_PROMPT.to_string()),
        QueryState::Failed { error, .. } => Body::Error(format!("The query failed: {error}")),
        QueryState::Loaded {
            network,
            tiles,
            total_count,
            ..
        } => {
            results_network = Some(*network);
            if let Some(total) = *total_count {
                let listed = tiles.len() as u64;
                if total > listed {
                    more_available = Some(total - listed);
                }
            }
            Body::Grid(
                tiles
                    .iter()
                    .map(|tile| {
                        let (name, image_url, status) = match &tile.metadata {
                            MetadataState::Pending => {
                                (LOADING_NAME, PLACEHOLDER_IMAGE, TileStatus::Pending)
                            }
                            MetadataState::Loaded(metadata) => (
                                metadata.title().unwrap_or(NO_NAME),
                                metadata.image().unwrap_or(PLACEHOLDER_IMAGE),
                                TileStatus::Loaded,
                            ),
                            MetadataState::Failed(_) => {
                                (NO_NAME, PLACEHOLDER_IMAGE, TileStatus::Failed)
                            }
                        };
                        TileView {
                            name: name.to_string(),
                            image_url: image_url.to_string(),
                            status,
                            contract_address: tile.owned.contract_address.clone(),
                            token_id: tile.owned.token_id.clone(),
                        }
                    })
                    .collect(),
            )
        }
    };
    Page {
        wallet: state.wallet.label().to_string(),
        network: state.network,
        results_network,
        body,
        more_available,
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Wallet: {}", self.wallet)?;
        writeln!(f, "Network: {}", self.network)?;
        if let Some(results) = self.results_network.filter(|results| *results != self.network) {
            writeln!(f, "Results from: {results}")?;
        }
        writeln!(f)?;
        match &self.body {
            Body::Prompt(text) | Body::Error(text) => writeln!(f, "{text}")?,
            Body::Grid(tiles) if tiles.is_empty() => writeln!(f, "No NFTs found.")?,
            Body::Grid(tiles) => {
                writeln!(f, "Here are your NFTs:")?;
                for (index, tile) in tiles.iter().enumerate() {
                    let marker = match tile.status {
                        TileStatus::Pending => " (loading)",
                        TileStatus::Loaded => "",
                        TileStatus::Failed => " (metadata unavailable)",
                    };
                    writeln!(f, "{:>4}. Name: {}{}", index + 1, tile.name, marker)?;
                    writeln!(f, "      Image: {}", tile.image_url)?;
                    writeln!(
                        f,
                        "      Token: {} #{}",
                        tile.contract_address, tile.token_id
                    )?;
                }
            }
        }
        if let Some(more) = self.more_available {
            writeln!(f, "... and {more} more not listed")?;
        }
        Ok(())
    }
}
