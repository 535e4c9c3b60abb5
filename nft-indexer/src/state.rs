// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The view model of the indexer and the reducer that updates it.
//!
//! Every change to a [`ViewState`] goes through [`ViewState::apply`] with a discrete
//! [`Action`]. Query-related actions carry the [`Generation`] of the query that produced
//! them, and actions from any other generation than the current one are dropped. This is
//! what keeps a slow, superseded query from overwriting the results of a newer one.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    data_types::{NftMetadata, OwnedNft},
    network::Network,
    util::short_address,
};

/// Identifies a query. Each new query gets a higher value, and so does a network change
/// that drops a running listing.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a wallet account is connected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub enum WalletStatus {
    #[default]
    NotConnected,
    Connected {
        account: String,
        /// The shortened account, e.g. `0x123...bcdef`.
        display: String,
    },
}

impl WalletStatus {
    pub fn label(&self) -> &str {
        match self {
            WalletStatus::NotConnected => "Not connected",
            WalletStatus::Connected { display, .. } => display,
        }
    }
}

/// The metadata of one tile.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum MetadataState {
    Pending,
    Loaded(NftMetadata),
    Failed(String),
}

/// An owned NFT together with its metadata.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NftTile {
    pub owned: OwnedNft,
    pub metadata: MetadataState,
}

impl NftTile {
    fn pending(owned: OwnedNft) -> Self {
        NftTile {
            owned,
            metadata: MetadataState::Pending,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub enum QueryState {
    #[default]
    Idle,
    Loading {
        address: String,
    },
    Loaded {
        address: String,
        network: Network,
        tiles: Vec<NftTile>,
        /// The number of NFTs the API reports for the address, across all pages.
        total_count: Option<u64>,
    },
    Failed {
        address: String,
        error: String,
    },
}

/// A discrete change to the view state.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    NetworkChanged(Network),
    WalletConnected {
        account: String,
    },
    QueryStarted {
        generation: Generation,
        address: String,
    },
    OwnedNftsLoaded {
        generation: Generation,
        nfts: Vec<OwnedNft>,
        total_count: Option<u64>,
    },
    MetadataLoaded {
        generation: Generation,
        index: usize,
        result: Result<NftMetadata, String>,
    },
    QueryFailed {
        generation: Generation,
        error: String,
    },
}

/// A snapshot of everything the renderer needs.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ViewState {
    pub network: Network,
    pub wallet: WalletStatus,
    pub generation: Generation,
    pub query: QueryState,
}

impl ViewState {
    pub fn new(network: Network) -> Self {
        ViewState {
            network,
            ..ViewState::default()
        }
    }

    /// Whether the owned NFTs of the last query are available.
    pub fn has_results(&self) -> bool {
        matches!(self.query, QueryState::Loaded { .. })
    }

    pub fn tiles(&self) -> &[NftTile] {
        match &self.query {
            QueryState::Loaded { tiles, .. } => tiles,
            _ => &[],
        }
    }

    /// Applies `action` and returns whether anything changed.
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::NetworkChanged(network) => {
                if network == self.network {
                    return false;
                }
                self.network = network;
                // A listing still running against the previous network is dropped. Loaded
                // results keep their client, so their metadata still arrives.
                if matches!(self.query, QueryState::Loading { .. }) {
                    self.generation = self.generation.next();
                    self.query = QueryState::Idle;
                }
                true
            }
            Action::WalletConnected { account } => {
                let display = short_address(&account);
                let wallet = WalletStatus::Connected { account, display };
                if wallet == self.wallet {
                    return false;
                }
                self.wallet = wallet;
                true
            }
            Action::QueryStarted {
                generation,
                address,
            } => {
                if generation <= self.generation {
                    trace!(%generation, current = %self.generation, "ignoring stale query start");
                    return false;
                }
                self.generation = generation;
                self.query = QueryState::Loading { address };
                true
            }
            Action::OwnedNftsLoaded {
                generation,
                nfts,
                total_count,
            } => {
                if !self.is_current(generation) {
                    return false;
                }
                let QueryState::Loading { address } = &mut self.query else {
                    return false;
                };
                self.query = QueryState::Loaded {
                    address: std::mem::take(address),
                    network: self.network,
                    tiles: nfts.into_iter().map(NftTile::pending).collect(),
                    total_count,
                };
                true
            }
            Action::MetadataLoaded {
                generation,
                index,
                result,
            } => {
                if !self.is_current(generation) {
                    return false;
                }
                let QueryState::Loaded { tiles, .. } = &mut self.query else {
                    return false;
                };
                let Some(tile) = tiles.get_mut(index) else {
                    return false;
                };
                if tile.metadata != MetadataState::Pending {
                    return false;
                }
                tile.metadata = match result {
                    Ok(metadata) => MetadataState::Loaded(metadata),
                    Err(error) => MetadataState::Failed(error),
                };
                true
            }
            Action::QueryFailed { generation, error } => {
                if !self.is_current(generation) {
                    return false;
                }
                let QueryState::Loading { address } = &mut self.query else {
                    return false;
                };
                self.query = QueryState::Failed {
                    address: std::mem::take(address),
                    error,
                };
                true
            }
        }
    }

    fn is_current(&self, generation: Generation) -> bool {
        if generation != self.generation {
            trace!(%generation, current = %self.generation, "ignoring stale query update");
            return false;
        }
        true
    }
}
