// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Errors raised while talking to the indexing API.
#[derive(Debug, Error)]
pub enum IndexerError {
    /// The address is empty once surrounding whitespace is removed.
    #[error("the address to query is empty")]
    BlankAddress,

    /// The API answered with a non-success HTTP status.
    #[error("{method} failed with HTTP status {status}: {body}")]
    HttpStatus {
        method: &'static str,
        status: u16,
        body: String,
    },

    /// The API answered successfully but reported an error in the body.
    #[error("{method} returned an error: {message}")]
    Api {
        method: &'static str,
        message: String,
    },

    /// URL parsing error
    #[error(transparent)]
    UrlParseError(#[from] url::ParseError),

    /// The configured API URL cannot carry path segments.
    #[error("the API URL `{0}` cannot be used as a base URL")]
    InvalidBaseUrl(String),

    /// Reqwest error
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    /// `serde_json` error
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
}

/// Errors raised by a wallet provider.
#[derive(Debug, Error)]
pub enum WalletError {
    /// The provider refused the request, e.g. the user declined the connection.
    ///
    /// Code `4001` is the EIP-1193 "user rejected request" code.
    #[error("the wallet rejected the request ({code}): {message}")]
    Rejected { code: i64, message: String },

    /// The provider could not be reached.
    #[error("wallet transport error: {0}")]
    Transport(String),

    /// The provider answered with something that is not a list of accounts.
    #[error("malformed wallet response: {0}")]
    MalformedResponse(String),

    /// Reqwest error
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
}

impl WalletError {
    /// The EIP-1193 code for a request the user declined.
    pub const USER_REJECTED: i64 = 4001;

    /// Returns `true` if the user declined the request.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, WalletError::Rejected { code, .. } if *code == Self::USER_REJECTED)
    }
}
