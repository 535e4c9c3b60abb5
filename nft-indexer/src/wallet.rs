// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Connecting to a wallet to query the NFTs of its first account.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::{
    client::ClientFactory,
    error::{IndexerError, WalletError},
    state::Action,
    view::{IndexerView, QueryOutcome},
};

/// The method asking a wallet for access to its accounts.
pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";

/// A wallet able to grant access to its accounts, e.g. an EIP-1193 provider.
#[allow(async_fn_in_trait)]
#[cfg_attr(not(web), trait_variant::make(Send))]
pub trait WalletProvider {
    /// Asks for access to the wallet's accounts. The user may be prompted.
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError>;
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// A wallet reachable over HTTP JSON-RPC, such as a desktop wallet exposing a local
/// endpoint or a development node.
pub struct JsonRpcWalletProvider {
    url: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl JsonRpcWalletProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        let response: JsonRpcResponse = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if let Some(error) = response.error {
            return Err(WalletError::Rejected {
                code: error.code,
                message: error.message,
            });
        }
        response
            .result
            .ok_or_else(|| WalletError::MalformedResponse(format!("no result for `{method}`")))
    }
}

impl WalletProvider for JsonRpcWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        let result = self.call(REQUEST_ACCOUNTS, json!([])).await?;
        serde_json::from_value(result)
            .map_err(|error| WalletError::MalformedResponse(error.to_string()))
    }
}

/// What happened when connecting to the wallet.
#[derive(Debug)]
pub enum WalletOutcome {
    /// There is no wallet to connect to.
    NoProvider,
    /// The wallet refused access or could not be reached.
    Rejected(WalletError),
    /// Access was granted but the wallet has no account.
    NoAccounts,
    /// The first account was queried. A failed query is also recorded in the view
    /// state.
    Connected {
        account: String,
        query: Result<QueryOutcome, IndexerError>,
    },
}

/// Connects to an optional wallet provider and feeds its first account to the indexer.
pub struct WalletConnector<P> {
    provider: Option<P>,
}

impl<P: WalletProvider> WalletConnector<P> {
    pub fn new(provider: Option<P>) -> Self {
        Self { provider }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Requests account access, then queries the NFTs of the first account.
    ///
    /// A missing provider or a refused connection is only logged, and the view state is
    /// left as it was.
    #[instrument(level = "debug", skip_all)]
    pub async fn connect_and_fetch<F: ClientFactory>(&self, view: &IndexerView<F>) -> WalletOutcome {
        let Some(provider) = &self.provider else {
            warn!("You should install a wallet!");
            return WalletOutcome::NoProvider;
        };
        let accounts = match provider.request_accounts().await {
            Ok(accounts) => accounts,
            Err(error) => {
                warn!(%error, "could not connect to the wallet");
                return WalletOutcome::Rejected(error);
            }
        };
        let Some(account) = accounts.into_iter().next() else {
            warn!("the wallet did not grant access to any account");
            return WalletOutcome::NoAccounts;
        };
        info!(%account, "wallet connected");
        view.dispatch(Action::WalletConnected {
            account: account.clone(),
        });
        let query = view.fetch_owned_nfts(&account).await;
        WalletOutcome::Connected { account, query }
    }
}
