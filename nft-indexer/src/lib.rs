// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! This crate looks up the NFTs owned by an address through the Alchemy NFT API and
//! turns the answers into a renderable grid of tiles.
//!
//! The entry point is [`view::IndexerView`], which holds the API client for the selected
//! [`network::Network`], runs queries and publishes immutable [`state::ViewState`]
//! snapshots. [`render::render`] turns a snapshot into a [`render::Page`].

pub mod client;
pub mod config;
pub mod data_types;
pub mod error;
pub mod network;
pub mod render;
pub mod state;
pub mod util;
pub mod view;
pub mod wallet;

#[cfg(not(target_arch = "wasm32"))]
pub mod tracing;

/// Helper types for tests.
#[cfg(with_testing)]
pub mod test_utils;

pub use crate::{
    error::{IndexerError, WalletError},
    network::Network,
};
