// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-memory stand-ins for the indexing API and for wallets.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use serde_json::json;
use tokio::sync::{oneshot, Mutex};

use crate::{
    client::{ClientFactory, NftApi},
    data_types::{NftMetadata, OwnedNft, OwnedNftsPage},
    error::{IndexerError, WalletError},
    network::Network,
    wallet::WalletProvider,
};

pub fn sample_nft(contract_address: &str, token_id: &str) -> OwnedNft {
    OwnedNft {
        contract_address: contract_address.to_string(),
        token_id: token_id.to_string(),
        token_type: Some("ERC721".to_string()),
        balance: Some("1".to_string()),
    }
}

pub fn sample_metadata(title: &str, image: &str) -> NftMetadata {
    NftMetadata {
        title: Some(title.to_string()),
        raw_metadata: Some(json!({ "name": title, "image": image })),
        ..NftMetadata::default()
    }
}

/// The data served by [`MockNftApi`], shared by the clients of every network.
#[derive(Default)]
pub struct MockIndex {
    owners: HashMap<(Network, String), Vec<OwnedNft>>,
    metadata: HashMap<(String, String), NftMetadata>,
    failing_owners: HashSet<String>,
    failing_metadata: HashSet<(String, String)>,
    page_size: Option<usize>,
    gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    metadata_gates: Mutex<HashMap<(String, String), oneshot::Receiver<()>>>,
    listing_requests: AtomicUsize,
    metadata_requests: AtomicUsize,
    metadata_in_flight: AtomicUsize,
    max_metadata_in_flight: AtomicUsize,
}

impl MockIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the NFTs of `owner` on `network`, with their metadata if any.
    pub fn with_nfts(
        mut self,
        network: Network,
        owner: &str,
        nfts: Vec<(OwnedNft, Option<NftMetadata>)>,
    ) -> Self {
        let mut owned = Vec::new();
        for (nft, metadata) in nfts {
            if let Some(metadata) = metadata {
                self.metadata.insert(
                    (nft.contract_address.clone(), nft.token_id.clone()),
                    metadata,
                );
            }
            owned.push(nft);
        }
        self.owners.insert((network, owner.to_string()), owned);
        self
    }

    /// Makes every listing of `owner` fail with an HTTP 500.
    pub fn with_failing_owner(mut self, owner: &str) -> Self {
        self.failing_owners.insert(owner.to_string());
        self
    }

    /// Makes the metadata request of one token fail with an HTTP 502.
    pub fn with_failing_metadata(mut self, contract_address: &str, token_id: &str) -> Self {
        self.failing_metadata
            .insert((contract_address.to_string(), token_id.to_string()));
        self
    }

    /// Splits listings into pages of `page_size` NFTs.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size.max(1));
        self
    }

    /// Holds the next listing of `owner` until the returned sender fires or is dropped.
    pub async fn hold_listing(&self, owner: &str) -> oneshot::Sender<()> {
        let (sender, receiver) = oneshot::channel();
        self.gates.lock().await.insert(owner.to_string(), receiver);
        sender
    }

    /// Holds the next metadata request of one token until the returned sender fires or
    /// is dropped.
    pub async fn hold_metadata(
        &self,
        contract_address: &str,
        token_id: &str,
    ) -> oneshot::Sender<()> {
        let (sender, receiver) = oneshot::channel();
        self.metadata_gates.lock().await.insert(
            (contract_address.to_string(), token_id.to_string()),
            receiver,
        );
        sender
    }

    pub fn listing_requests(&self) -> usize {
        self.listing_requests.load(Ordering::SeqCst)
    }

    pub fn metadata_requests(&self) -> usize {
        self.metadata_requests.load(Ordering::SeqCst)
    }

    /// The largest number of metadata requests that were running at the same time.
    pub fn max_metadata_in_flight(&self) -> usize {
        self.max_metadata_in_flight.load(Ordering::SeqCst)
    }
}

/// Counts a metadata request as running until dropped, including when the caller
/// abandons it.
struct InFlight<'a>(&'a MockIndex);

impl<'a> InFlight<'a> {
    fn start(index: &'a MockIndex) -> Self {
        let running = index.metadata_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        index
            .max_metadata_in_flight
            .fetch_max(running, Ordering::SeqCst);
        Self(index)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.metadata_in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A client of the [`MockIndex`] for one network.
#[derive(Clone)]
pub struct MockNftApi {
    network: Network,
    index: Arc<MockIndex>,
}

impl MockNftApi {
    pub fn network(&self) -> Network {
        self.network
    }
}

impl NftApi for MockNftApi {
    async fn get_nfts_for_owner(
        &self,
        owner: &str,
        page_key: Option<&str>,
    ) -> Result<OwnedNftsPage, IndexerError> {
        self.index.listing_requests.fetch_add(1, Ordering::SeqCst);
        let gate = self.index.gates.lock().await.remove(owner);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.index.failing_owners.contains(owner) {
            return Err(IndexerError::HttpStatus {
                method: "getNFTs",
                status: 500,
                body: "mock failure".to_string(),
            });
        }
        let nfts = self
            .index
            .owners
            .get(&(self.network, owner.to_string()))
            .cloned()
            .unwrap_or_default();
        let total_count = Some(nfts.len() as u64);
        let start = page_key.and_then(|key| key.parse().ok()).unwrap_or(0);
        let Some(page_size) = self.index.page_size else {
            return Ok(OwnedNftsPage {
                owned_nfts: nfts,
                page_key: None,
                total_count,
            });
        };
        let end = (start + page_size).min(nfts.len());
        Ok(OwnedNftsPage {
            owned_nfts: nfts.get(start..end).unwrap_or_default().to_vec(),
            page_key: (end < nfts.len()).then(|| end.to_string()),
            total_count,
        })
    }

    async fn get_nft_metadata(
        &self,
        contract_address: &str,
        token_id: &str,
    ) -> Result<NftMetadata, IndexerError> {
        self.index.metadata_requests.fetch_add(1, Ordering::SeqCst);
        let _running = InFlight::start(&self.index);
        let key = (contract_address.to_string(), token_id.to_string());
        let gate = self.index.metadata_gates.lock().await.remove(&key);
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        // Lets the other requests of the same batch start before this one returns.
        tokio::task::yield_now().await;
        if self.index.failing_metadata.contains(&key) {
            return Err(IndexerError::HttpStatus {
                method: "getNFTMetadata",
                status: 502,
                body: "mock failure".to_string(),
            });
        }
        Ok(self.index.metadata.get(&key).cloned().unwrap_or_default())
    }
}

/// Builds [`MockNftApi`] clients and counts how many were built.
pub struct MockFactory {
    index: Arc<MockIndex>,
    builds: AtomicUsize,
}

impl MockFactory {
    pub fn new(index: MockIndex) -> Self {
        Self {
            index: Arc::new(index),
            builds: AtomicUsize::new(0),
        }
    }

    pub fn index(&self) -> &Arc<MockIndex> {
        &self.index
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl ClientFactory for MockFactory {
    type Client = MockNftApi;

    fn build(&self, network: Network) -> Result<MockNftApi, IndexerError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        Ok(MockNftApi {
            network,
            index: self.index.clone(),
        })
    }
}

/// A wallet with a fixed answer.
pub struct MockWallet {
    answer: Result<Vec<String>, (i64, String)>,
    requests: AtomicUsize,
}

impl MockWallet {
    pub fn with_accounts(accounts: &[&str]) -> Self {
        Self {
            answer: Ok(accounts.iter().map(|account| account.to_string()).collect()),
            requests: AtomicUsize::new(0),
        }
    }

    /// A wallet whose user declines every request.
    pub fn rejecting() -> Self {
        Self {
            answer: Err((
                WalletError::USER_REJECTED,
                "User rejected the request.".to_string(),
            )),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.answer
            .clone()
            .map_err(|(code, message)| WalletError::Rejected { code, message })
    }
}
