// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration of the indexing API client.

use std::{num::ParseIntError, time::Duration};

use url::Url;

use crate::{error::IndexerError, network::Network};

/// The default number of metadata requests in flight for a single query.
pub const DEFAULT_METADATA_CONCURRENCY: usize = 16;

/// The default number of owned-NFT pages fetched for a single query.
pub const DEFAULT_MAX_PAGES: usize = 1;

/// The default HTTP request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How to reach the indexing API.
#[derive(Clone, Debug)]
pub struct IndexerConfig {
    /// The API key used for [`Network::Goerli`].
    pub goerli_api_key: String,
    /// The API key used for [`Network::Mumbai`]. When absent, the Goerli key is used.
    pub mumbai_api_key: Option<String>,
    /// Replaces the per-network Alchemy URL, e.g. to go through a proxy.
    pub api_url: Option<Url>,
    /// Ignored in the browser, where the `fetch` API has no timeout.
    pub request_timeout: Duration,
    /// The maximal number of owned-NFT pages fetched for a single query.
    pub max_pages: usize,
    /// The maximal number of metadata requests in flight for a single query.
    pub metadata_concurrency: usize,
}

impl IndexerConfig {
    pub fn new(goerli_api_key: impl Into<String>) -> Self {
        Self {
            goerli_api_key: goerli_api_key.into(),
            mumbai_api_key: None,
            api_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_pages: DEFAULT_MAX_PAGES,
            metadata_concurrency: DEFAULT_METADATA_CONCURRENCY,
        }
    }

    pub fn with_mumbai_api_key(mut self, key: impl Into<String>) -> Self {
        self.mumbai_api_key = Some(key.into());
        self
    }

    pub fn with_api_url(mut self, api_url: Url) -> Self {
        self.api_url = Some(api_url);
        self
    }

    /// Returns the API key to use for `network`.
    pub fn api_key(&self, network: Network) -> &str {
        match network {
            Network::Goerli => &self.goerli_api_key,
            Network::Mumbai => self
                .mumbai_api_key
                .as_deref()
                .unwrap_or(&self.goerli_api_key),
        }
    }

    /// Returns `true` if `network` has no key of its own and borrows the Goerli key.
    pub fn uses_shared_key(&self, network: Network) -> bool {
        network == Network::Mumbai && self.mumbai_api_key.is_none()
    }

    /// Returns the base URL of the NFT API for `network`, API key included.
    pub fn endpoint(&self, network: Network) -> Result<Url, IndexerError> {
        let mut url = match &self.api_url {
            Some(url) => url.clone(),
            None => Url::parse(&network.default_api_url())?,
        };
        if url.cannot_be_a_base() {
            return Err(IndexerError::InvalidBaseUrl(url.to_string()));
        }
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(self.api_key(network));
        }
        Ok(url)
    }
}

/// Command-line and environment options for the indexing API client.
#[derive(Clone, Debug, clap::Args)]
pub struct IndexerOptions {
    /// The Alchemy API key used for Goerli.
    #[arg(long, env = "ALCHEMY_KEY_ETH", hide_env_values = true)]
    pub goerli_api_key: String,

    /// The Alchemy API key used for Mumbai. Defaults to the Goerli key.
    #[arg(long, env = "ALCHEMY_KEY_MUMBAI", hide_env_values = true)]
    pub mumbai_api_key: Option<String>,

    /// Replaces the Alchemy NFT API URL of every network. The API key is appended
    /// as a path segment.
    #[arg(long, env = "NFT_INDEXER_API_URL")]
    pub api_url: Option<Url>,

    /// Timeout for each HTTP request, in milliseconds.
    #[arg(
        long = "request-timeout-ms",
        default_value = "10000",
        value_parser = parse_millis
    )]
    pub request_timeout: Duration,

    /// The maximal number of owned-NFT pages fetched for a single query.
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: usize,

    /// The maximal number of metadata requests in flight for a single query.
    #[arg(long, default_value_t = DEFAULT_METADATA_CONCURRENCY)]
    pub metadata_concurrency: usize,
}

impl From<IndexerOptions> for IndexerConfig {
    fn from(options: IndexerOptions) -> Self {
        IndexerConfig {
            goerli_api_key: options.goerli_api_key,
            mumbai_api_key: options.mumbai_api_key.filter(|key| !key.is_empty()),
            api_url: options.api_url,
            request_timeout: options.request_timeout,
            max_pages: options.max_pages.max(1),
            metadata_concurrency: options.metadata_concurrency.max(1),
        }
    }
}

fn parse_millis(s: &str) -> Result<Duration, ParseIntError> {
    Ok(Duration::from_millis(s.parse()?))
}
