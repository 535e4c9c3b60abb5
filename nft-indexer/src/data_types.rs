// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The records exchanged with the indexing API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An NFT held by the queried address, as listed by the API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedNft {
    pub contract_address: String,
    pub token_id: String,
    pub token_type: Option<String>,
    pub balance: Option<String>,
}

/// One page of the owned-NFT listing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedNftsPage {
    pub owned_nfts: Vec<OwnedNft>,
    /// Set when more pages are available.
    pub page_key: Option<String>,
    pub total_count: Option<u64>,
}

/// The token URI of an NFT, as resolved by the API.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUri {
    #[serde(default)]
    pub raw: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
}

/// The metadata of a single token.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// The metadata document as published by the token contract. Its shape is not
    /// standardized, so it is kept as free-form JSON.
    #[serde(default, rename = "metadata")]
    pub raw_metadata: Option<Value>,
    #[serde(default)]
    pub token_uri: Option<TokenUri>,
    /// Set by the API when it could not fetch or parse the metadata document.
    #[serde(default)]
    pub error: Option<String>,
}

impl NftMetadata {
    /// The title, if present and not empty.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|title| !title.is_empty())
    }

    /// The `image` entry of the raw metadata, if present and not empty.
    pub fn image(&self) -> Option<&str> {
        self.raw_metadata
            .as_ref()?
            .get("image")?
            .as_str()
            .filter(|image| !image.is_empty())
    }
}

/// The reply of `getNFTs`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GetNftsReply {
    #[serde(default)]
    owned_nfts: Vec<AlchemyOwnedNft>,
    #[serde(default)]
    page_key: Option<String>,
    #[serde(default)]
    total_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct AlchemyOwnedNft {
    contract: AlchemyContract,
    id: AlchemyTokenId,
    #[serde(default)]
    balance: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlchemyContract {
    address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlchemyTokenId {
    token_id: String,
    #[serde(default)]
    token_metadata: Option<AlchemyTokenMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlchemyTokenMetadata {
    #[serde(default)]
    token_type: Option<String>,
}

impl From<AlchemyOwnedNft> for OwnedNft {
    fn from(nft: AlchemyOwnedNft) -> Self {
        OwnedNft {
            contract_address: nft.contract.address,
            token_id: nft.id.token_id,
            token_type: nft.id.token_metadata.and_then(|metadata| metadata.token_type),
            balance: nft.balance,
        }
    }
}

impl From<GetNftsReply> for OwnedNftsPage {
    fn from(reply: GetNftsReply) -> Self {
        OwnedNftsPage {
            owned_nfts: reply.owned_nfts.into_iter().map(OwnedNft::from).collect(),
            page_key: reply.page_key.filter(|key| !key.is_empty()),
            total_count: reply.total_count,
        }
    }
}
