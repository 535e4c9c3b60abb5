// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The networks the indexer can be pointed at.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two supported test networks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    /// Ethereum Goerli. This is the first network and the fallback for unknown
    /// selections.
    #[default]
    Goerli,
    /// Polygon Mumbai.
    Mumbai,
}

impl Network {
    /// All supported networks, in selector order.
    pub const ALL: [Network; 2] = [Network::Goerli, Network::Mumbai];

    /// Resolves a selector value. Anything that is not recognized falls back to the
    /// first network.
    pub fn from_selection(selection: &str) -> Self {
        let normalized = selection.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "goerli" | "eth-goerli" | "eth_goerli" => Network::Goerli,
            "mumbai" | "polygon-mumbai" | "matic-mumbai" | "matic_mumbai" => Network::Mumbai,
            _ => {
                tracing::debug!(%selection, "unknown network selection, using {}", Network::ALL[0]);
                Network::ALL[0]
            }
        }
    }

    /// The value used by selectors (radio buttons, CLI flags).
    pub fn selector_value(&self) -> &'static str {
        match self {
            Network::Goerli => "GOERLI",
            Network::Mumbai => "MUMBAI",
        }
    }

    /// The human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Network::Goerli => "Goerli",
            Network::Mumbai => "Mumbai",
        }
    }

    /// The Alchemy host serving this network.
    pub fn alchemy_host(&self) -> &'static str {
        match self {
            Network::Goerli => "eth-goerli.g.alchemy.com",
            Network::Mumbai => "polygon-mumbai.g.alchemy.com",
        }
    }

    /// The base URL of the NFT API for this network, without the API key.
    pub fn default_api_url(&self) -> String {
        format!("https://{}/nft/v2", self.alchemy_host())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
