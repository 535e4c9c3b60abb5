// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The indexer view: the network selector, the API client it configures, and the
//! queries that fill the view state.

use std::sync::Arc;

use futures::stream::{self, StreamExt as _};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::{
    client::{ClientFactory, NftApi as _},
    config::{IndexerConfig, DEFAULT_MAX_PAGES, DEFAULT_METADATA_CONCURRENCY},
    data_types::OwnedNft,
    error::IndexerError,
    network::Network,
    state::{Action, Generation, ViewState},
};

/// How queries are run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryOptions {
    /// The maximal number of owned-NFT pages fetched for a single query.
    pub max_pages: usize,
    /// The maximal number of metadata requests in flight for a single query.
    pub metadata_concurrency: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions {
            max_pages: DEFAULT_MAX_PAGES,
            metadata_concurrency: DEFAULT_METADATA_CONCURRENCY,
        }
    }
}

impl From<&IndexerConfig> for QueryOptions {
    fn from(config: &IndexerConfig) -> Self {
        QueryOptions {
            max_pages: config.max_pages.max(1),
            metadata_concurrency: config.metadata_concurrency.max(1),
        }
    }
}

/// How a query ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryOutcome {
    /// All owned NFTs were listed and every metadata request has finished.
    Completed {
        generation: Generation,
        tiles: usize,
        failed_metadata: usize,
    },
    /// A newer query or a network change took over before this one finished. Its
    /// remaining results were dropped.
    Superseded { generation: Generation },
}

/// Holds the API client for the selected network and publishes the view state.
///
/// All updates to the state go through [`ViewState::apply`]; readers either take a
/// [`snapshot`](Self::snapshot) or [`subscribe`](Self::subscribe) to changes.
pub struct IndexerView<F: ClientFactory> {
    factory: F,
    client: watch::Sender<Arc<F::Client>>,
    state: watch::Sender<ViewState>,
    options: QueryOptions,
}

impl IndexerView<IndexerConfig> {
    /// Creates a view backed by the Alchemy API, as configured by `config`.
    pub fn with_config(config: IndexerConfig, network: Network) -> Result<Self, IndexerError> {
        let options = QueryOptions::from(&config);
        Self::new(config, network, options)
    }
}

impl<F: ClientFactory> IndexerView<F> {
    pub fn new(factory: F, network: Network, options: QueryOptions) -> Result<Self, IndexerError> {
        let client = Arc::new(factory.build(network)?);
        Ok(IndexerView {
            factory,
            client: watch::Sender::new(client),
            state: watch::Sender::new(ViewState::new(network)),
            options,
        })
    }

    pub fn network(&self) -> Network {
        self.state.borrow().network
    }

    /// The client for the selected network.
    pub fn client(&self) -> Arc<F::Client> {
        self.client.borrow().clone()
    }

    /// A copy of the current view state.
    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Returns a receiver that is notified of every change to the view state.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    /// Applies `action` to the view state. Returns whether the state changed.
    pub fn dispatch(&self, action: Action) -> bool {
        self.state.send_if_modified(|state| state.apply(action))
    }

    /// Switches to the network named by `selection` and rebuilds the client.
    /// Unrecognized selections fall back to the first network. No request is made.
    pub fn select_network(&self, selection: &str) -> Result<Network, IndexerError> {
        let network = Network::from_selection(selection);
        if network != self.network() {
            let client = self.factory.build(network)?;
            self.client.send_replace(Arc::new(client));
            info!(%network, "switched network");
        }
        self.dispatch(Action::NetworkChanged(network));
        Ok(network)
    }

    /// Starts a new query generation for `address`.
    fn begin_query(&self, address: &str) -> Generation {
        let mut generation = Generation::default();
        self.state.send_modify(|state| {
            generation = state.generation.next();
            state.apply(Action::QueryStarted {
                generation,
                address: address.to_string(),
            });
        });
        generation
    }

    /// Lists the NFTs owned by `address` on the selected network, then fetches the
    /// metadata of each of them concurrently. Results are published to the view state
    /// as they arrive.
    ///
    /// A failure to list the NFTs fails the query. A failed metadata request only fails
    /// its own tile.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_owned_nfts(&self, address: &str) -> Result<QueryOutcome, IndexerError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(IndexerError::BlankAddress);
        }
        let client = self.client();
        let generation = self.begin_query(address);

        let (nfts, total_count) = match self.list_owned_nfts(&client, address).await {
            Ok(listing) => listing,
            Err(error) => {
                warn!(%address, %error, "failed to list owned NFTs");
                self.dispatch(Action::QueryFailed {
                    generation,
                    error: error.to_string(),
                });
                return Err(error);
            }
        };
        let tiles = nfts.len();
        info!(%address, %generation, tiles, "listed owned NFTs");
        if !self.dispatch(Action::OwnedNftsLoaded {
            generation,
            nfts: nfts.clone(),
            total_count,
        }) {
            debug!(%generation, "query superseded before its NFTs were listed");
            return Ok(QueryOutcome::Superseded { generation });
        }

        let mut metadata = stream::iter(nfts.into_iter().enumerate())
            .map(|(index, nft)| {
                let client = &client;
                async move {
                    let result = client
                        .get_nft_metadata(&nft.contract_address, &nft.token_id)
                        .await;
                    (index, nft, result)
                }
            })
            .buffer_unordered(self.options.metadata_concurrency);

        let mut failed_metadata = 0;
        while let Some((index, nft, result)) = metadata.next().await {
            let result = result.map_err(|error| {
                warn!(
                    contract = %nft.contract_address,
                    token_id = %nft.token_id,
                    %error,
                    "failed to fetch NFT metadata"
                );
                failed_metadata += 1;
                error.to_string()
            });
            if !self.dispatch(Action::MetadataLoaded {
                generation,
                index,
                result,
            }) {
                debug!(%generation, "query superseded while fetching metadata");
                return Ok(QueryOutcome::Superseded { generation });
            }
        }
        Ok(QueryOutcome::Completed {
            generation,
            tiles,
            failed_metadata,
        })
    }

    /// Follows the listing's page keys, up to the configured number of pages.
    async fn list_owned_nfts(
        &self,
        client: &F::Client,
        address: &str,
    ) -> Result<(Vec<OwnedNft>, Option<u64>), IndexerError> {
        let mut nfts = Vec::new();
        let mut total_count = None;
        let mut page_key = None;
        for _ in 0..self.options.max_pages {
            let page = client
                .get_nfts_for_owner(address, page_key.as_deref())
                .await?;
            nfts.extend(page.owned_nfts);
            total_count = total_count.or(page.total_count);
            match page.page_key {
                Some(next) => page_key = Some(next),
                None => break,
            }
        }
        Ok((nfts, total_count))
    }
}
