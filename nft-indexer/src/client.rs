// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Access to the Alchemy NFT API.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::{
    config::IndexerConfig,
    data_types::{GetNftsReply, NftMetadata, OwnedNftsPage},
    error::IndexerError,
    network::Network,
    util::AutoTraits,
};

/// The queries the indexer needs from an NFT API.
#[allow(async_fn_in_trait)]
#[cfg_attr(not(web), trait_variant::make(Send))]
pub trait NftApi {
    /// Lists the NFTs owned by `owner`, starting at `page_key` if given.
    async fn get_nfts_for_owner(
        &self,
        owner: &str,
        page_key: Option<&str>,
    ) -> Result<OwnedNftsPage, IndexerError>;

    /// Fetches the metadata of a single token.
    async fn get_nft_metadata(
        &self,
        contract_address: &str,
        token_id: &str,
    ) -> Result<NftMetadata, IndexerError>;
}

/// Builds the API client for a network. Called on every network change.
pub trait ClientFactory {
    type Client: NftApi + AutoTraits;

    fn build(&self, network: Network) -> Result<Self::Client, IndexerError>;
}

fn reqwest_client(config: &IndexerConfig) -> Result<reqwest::Client, IndexerError> {
    let builder = reqwest::ClientBuilder::new();

    #[cfg(not(target_arch = "wasm32"))]
    let builder = builder.timeout(config.request_timeout);
    #[cfg(target_arch = "wasm32")]
    let _ = config;

    Ok(builder.build()?)
}

/// A client of the Alchemy NFT API (v2 REST surface) for one network.
#[derive(Clone, Debug)]
pub struct AlchemyClient {
    http: reqwest::Client,
    endpoint: Url,
    network: Network,
}

impl AlchemyClient {
    /// Creates a client for `network`. No request is made.
    pub fn new(config: &IndexerConfig, network: Network) -> Result<Self, IndexerError> {
        Ok(Self {
            http: reqwest_client(config)?,
            endpoint: config.endpoint(network)?,
            network,
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    fn method_url(&self, method: &str) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(method);
        }
        url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        method: &'static str,
        query: &[(&str, &str)],
    ) -> Result<T, IndexerError> {
        debug!(network = %self.network, method, "sending API request");
        let response = self
            .http
            .get(self.method_url(method))
            .query(query)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|error| format!("Could not get response text: {error}"));
            return Err(IndexerError::HttpStatus {
                method,
                status: status.as_u16(),
                body,
            });
        }
        let value: Value = response.json().await?;
        if let Some(message) = hard_error_message(&value) {
            return Err(IndexerError::Api { method, message });
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// Returns the message of an error object in an API reply.
///
/// A plain string under `error` is a soft error attached to token metadata and is kept
/// in the record instead.
fn hard_error_message(value: &Value) -> Option<String> {
    let error = value.get("error")?.as_object()?;
    Some(
        error
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| Value::Object(error.clone()).to_string(), str::to_string),
    )
}

impl NftApi for AlchemyClient {
    async fn get_nfts_for_owner(
        &self,
        owner: &str,
        page_key: Option<&str>,
    ) -> Result<OwnedNftsPage, IndexerError> {
        let mut query = vec![("owner", owner), ("withMetadata", "false")];
        if let Some(page_key) = page_key {
            query.push(("pageKey", page_key));
        }
        let reply: GetNftsReply = self.get("getNFTs", &query).await?;
        Ok(reply.into())
    }

    async fn get_nft_metadata(
        &self,
        contract_address: &str,
        token_id: &str,
    ) -> Result<NftMetadata, IndexerError> {
        self.get(
            "getNFTMetadata",
            &[("contractAddress", contract_address), ("tokenId", token_id)],
        )
        .await
    }
}

impl ClientFactory for IndexerConfig {
    type Client = AlchemyClient;

    fn build(&self, network: Network) -> Result<AlchemyClient, IndexerError> {
        if self.uses_shared_key(network) {
            warn!("no API key configured for {network}, using the Goerli key");
        }
        AlchemyClient::new(self, network)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{hard_error_message, AlchemyClient};
    use crate::{config::IndexerConfig, network::Network};

    #[test]
    fn test_method_url() {
        let config = IndexerConfig::new("eth-key");
        let client = AlchemyClient::new(&config, Network::Goerli).unwrap();
        assert_eq!(
            client.method_url("getNFTs").as_str(),
            "https://eth-goerli.g.alchemy.com/nft/v2/eth-key/getNFTs"
        );
    }

    #[test]
    fn test_hard_errors_only() {
        let reply = json!({ "error": { "code": 429, "message": "rate limited" } });
        assert_eq!(hard_error_message(&reply).as_deref(), Some("rate limited"));

        let reply = json!({ "title": "", "error": "Malformed token uri" });
        assert_eq!(hard_error_message(&reply), None);

        let reply = json!({ "error": { "code": -32602 } });
        assert_eq!(
            hard_error_message(&reply).as_deref(),
            Some(r#"{"code":-32602}"#)
        );
    }
}
