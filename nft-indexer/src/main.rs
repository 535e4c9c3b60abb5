// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! CLI tool listing the NFTs owned by an address.

use anyhow::{Context as _, Result};
use clap::Parser;
use nft_indexer::{
    config::{IndexerConfig, IndexerOptions},
    render::render,
    view::{IndexerView, QueryOutcome},
    wallet::{JsonRpcWalletProvider, WalletConnector, WalletOutcome},
    Network,
};

/// NFT Indexer CLI
#[derive(Parser, Debug)]
#[command(name = "nft-indexer", version)]
struct Cli {
    /// The network to query: `GOERLI` or `MUMBAI`. Anything else selects Goerli.
    #[arg(long, global = true, default_value = "GOERLI")]
    network: String,

    /// How the result page is printed.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(flatten)]
    options: IndexerOptions,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// List the NFTs owned by an address
    Query {
        /// The owner address
        #[arg(long)]
        address: String,
    },
    /// Connect to a JSON-RPC wallet and list the NFTs of its first account
    Connect {
        /// URL of the wallet's JSON-RPC endpoint (e.g. http://localhost:8545)
        #[arg(long)]
        wallet_rpc: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    nft_indexer::tracing::init("nft-indexer");
    let cli = Cli::parse();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(cli.run())
}

impl Cli {
    async fn run(self) -> Result<()> {
        let network = Network::from_selection(&self.network);
        let config = IndexerConfig::from(self.options);
        let view = IndexerView::with_config(config, network)
            .context("failed to create the indexer client")?;

        match self.command {
            Command::Query { address } => {
                let outcome = view.fetch_owned_nfts(&address).await;
                report_query(outcome)?;
            }
            Command::Connect { wallet_rpc } => {
                let connector = WalletConnector::new(wallet_rpc.map(JsonRpcWalletProvider::new));
                match connector.connect_and_fetch(&view).await {
                    WalletOutcome::NoProvider => {
                        anyhow::bail!("no wallet to connect to; pass --wallet-rpc")
                    }
                    WalletOutcome::Rejected(error) => {
                        return Err(error).context("the wallet connection failed");
                    }
                    WalletOutcome::NoAccounts => anyhow::bail!("the wallet has no account"),
                    WalletOutcome::Connected { account, query } => {
                        eprintln!("Connected to {account}");
                        report_query(query)?;
                    }
                }
            }
        }

        let page = render(&view.snapshot());
        match self.format {
            OutputFormat::Text => print!("{page}"),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&page)?),
        }
        Ok(())
    }
}

/// Listing failures are already part of the rendered page, so only a blank address is
/// an error here.
fn report_query(outcome: Result<QueryOutcome, nft_indexer::IndexerError>) -> Result<()> {
    match outcome {
        Ok(QueryOutcome::Completed {
            tiles,
            failed_metadata,
            ..
        }) if failed_metadata > 0 => {
            eprintln!("Metadata could not be fetched for {failed_metadata} of {tiles} NFTs");
        }
        Ok(_) => {}
        Err(error @ nft_indexer::IndexerError::BlankAddress) => return Err(error.into()),
        Err(_) => {}
    }
    Ok(())
}
