// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

#![cfg(with_testing)]

use assert_matches::assert_matches;
use nft_indexer::{
    render::{render, Body, TileStatus, NO_NAME, PLACEHOLDER_IMAGE, QUERY_PROMPT},
    state::{MetadataState, QueryState, WalletStatus},
    test_utils::{sample_metadata, sample_nft, MockFactory, MockIndex, MockWallet},
    view::{IndexerView, QueryOptions, QueryOutcome},
    wallet::{WalletConnector, WalletOutcome},
    IndexerError, Network, WalletError,
};

const OWNER: &str = "0x8ba1f109551bd432803012645ac136ddd64dba72";
const OTHER_OWNER: &str = "0x71c7656ec7ab88b098defb751b7401b5f6d8976f";

fn three_nfts() -> MockIndex {
    MockIndex::new().with_nfts(
        Network::Goerli,
        OWNER,
        vec![
            (
                sample_nft("0xaaa", "1"),
                Some(sample_metadata("First", "https://img.test/1.png")),
            ),
            (sample_nft("0xaaa", "2"), None),
            (
                sample_nft("0xbbb", "7"),
                Some(sample_metadata("Third", "https://img.test/7.png")),
            ),
        ],
    )
}

fn view_over(index: MockIndex, options: QueryOptions) -> IndexerView<MockFactory> {
    IndexerView::new(MockFactory::new(index), Network::Goerli, options)
        .expect("mock clients always build")
}

#[test_log::test(tokio::test)]
async fn test_query_fills_one_tile_per_owned_nft() -> anyhow::Result<()> {
    let view = view_over(three_nfts(), QueryOptions::default());

    let outcome = view.fetch_owned_nfts(OWNER).await?;
    assert_matches!(
        outcome,
        QueryOutcome::Completed {
            tiles: 3,
            failed_metadata: 0,
            ..
        }
    );

    let state = view.snapshot();
    assert!(state.has_results());
    let tokens = state
        .tiles()
        .iter()
        .map(|tile| tile.owned.token_id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(tokens, ["1", "2", "7"]);

    let Body::Grid(tiles) = render(&state).body else {
        panic!("expected a grid");
    };
    assert_eq!(tiles[0].name, "First");
    assert_eq!(tiles[0].image_url, "https://img.test/1.png");
    assert_eq!(tiles[1].name, NO_NAME);
    assert_eq!(tiles[1].image_url, PLACEHOLDER_IMAGE);
    assert_eq!(tiles[2].name, "Third");
    assert!(tiles.iter().all(|tile| tile.status == TileStatus::Loaded));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_address_is_trimmed_and_blank_addresses_are_rejected() -> anyhow::Result<()> {
    let factory = MockFactory::new(three_nfts());
    let index = factory.index().clone();
    let view = IndexerView::new(factory, Network::Goerli, QueryOptions::default())?;

    assert_matches!(
        view.fetch_owned_nfts("   ").await,
        Err(IndexerError::BlankAddress)
    );
    assert_eq!(index.listing_requests(), 0);
    assert_eq!(view.snapshot().query, QueryState::Idle);

    view.fetch_owned_nfts(&format!("  {OWNER}\n")).await?;
    assert_eq!(view.snapshot().tiles().len(), 3);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_failed_metadata_only_fails_its_tile() -> anyhow::Result<()> {
    let index = three_nfts().with_failing_metadata("0xbbb", "7");
    let view = view_over(index, QueryOptions::default());

    let outcome = view.fetch_owned_nfts(OWNER).await?;
    assert_matches!(
        outcome,
        QueryOutcome::Completed {
            tiles: 3,
            failed_metadata: 1,
            ..
        }
    );

    let state = view.snapshot();
    assert_matches!(state.tiles()[0].metadata, MetadataState::Loaded(_));
    assert_matches!(state.tiles()[2].metadata, MetadataState::Failed(_));

    let Body::Grid(tiles) = render(&state).body else {
        panic!("expected a grid");
    };
    assert_eq!(tiles[0].name, "First");
    assert_eq!(tiles[2].status, TileStatus::Failed);
    assert_eq!(tiles[2].name, NO_NAME);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_failed_listing_is_shown_instead_of_the_grid() {
    let view = view_over(
        MockIndex::new().with_failing_owner(OWNER),
        QueryOptions::default(),
    );

    let result = view.fetch_owned_nfts(OWNER).await;
    assert_matches!(result, Err(IndexerError::HttpStatus { status: 500, .. }));

    let state = view.snapshot();
    assert!(!state.has_results());
    assert_matches!(&state.query, QueryState::Failed { address, .. } if address == OWNER);
    assert_matches!(
        render(&state).body,
        Body::Error(message) if message.starts_with("The query failed:")
    );
}

#[test_log::test(tokio::test)]
async fn test_owner_without_nfts_gets_an_empty_grid() -> anyhow::Result<()> {
    let view = view_over(three_nfts(), QueryOptions::default());

    view.fetch_owned_nfts(OTHER_OWNER).await?;
    let state = view.snapshot();
    assert!(state.has_results());
    assert_eq!(render(&state).body, Body::Grid(Vec::new()));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_prompt_is_shown_before_any_query() {
    let view = view_over(three_nfts(), QueryOptions::default());
    let page = render(&view.snapshot());
    assert_eq!(page.body, Body::Prompt(QUERY_PROMPT.to_string()));
    assert_eq!(page.wallet, "Not connected");
}

#[test_log::test(tokio::test)]
async fn test_superseded_query_does_not_overwrite_newer_results() -> anyhow::Result<()> {
    let index = three_nfts().with_nfts(
        Network::Goerli,
        OTHER_OWNER,
        vec![(
            sample_nft("0xccc", "42"),
            Some(sample_metadata("Newer", "https://img.test/42.png")),
        )],
    );
    let factory = MockFactory::new(index);
    let index = factory.index().clone();
    let view = IndexerView::new(factory, Network::Goerli, QueryOptions::default())?;

    let gate = index.hold_listing(OWNER).await;
    let slow = view.fetch_owned_nfts(OWNER);
    let fast = async {
        let outcome = view.fetch_owned_nfts(OTHER_OWNER).await;
        gate.send(()).ok();
        outcome
    };
    let (slow, fast) = tokio::join!(slow, fast);

    assert_matches!(slow?, QueryOutcome::Superseded { .. });
    assert_matches!(fast?, QueryOutcome::Completed { tiles: 1, .. });

    let state = view.snapshot();
    assert_matches!(&state.query, QueryState::Loaded { address, .. } if address == OTHER_OWNER);
    assert_eq!(state.tiles().len(), 1);
    assert_eq!(state.tiles()[0].owned.token_id, "42");
    Ok(())
}

fn numbered_nfts(owner: &str, count: usize) -> MockIndex {
    let nfts = (0..count)
        .map(|token| {
            let title = format!("Token {token}");
            let image = format!("https://img.test/{token}.png");
            (
                sample_nft("0xddd", &token.to_string()),
                Some(sample_metadata(&title, &image)),
            )
        })
        .collect();
    MockIndex::new().with_nfts(Network::Goerli, owner, nfts)
}

#[test_log::test(tokio::test)]
async fn test_superseded_query_stops_fetching_metadata() -> anyhow::Result<()> {
    let index = numbered_nfts(OWNER, 5).with_nfts(
        Network::Goerli,
        OTHER_OWNER,
        vec![(sample_nft("0xccc", "42"), None)],
    );
    let factory = MockFactory::new(index);
    let index = factory.index().clone();
    let options = QueryOptions {
        metadata_concurrency: 1,
        ..QueryOptions::default()
    };
    let view = IndexerView::new(factory, Network::Goerli, options)?;

    let gate = index.hold_metadata("0xddd", "0").await;
    let slow = view.fetch_owned_nfts(OWNER);
    let fast = async {
        view.subscribe()
            .wait_for(|state| state.has_results())
            .await?;
        let outcome = view.fetch_owned_nfts(OTHER_OWNER).await?;
        gate.send(()).ok();
        anyhow::Ok(outcome)
    };
    let (slow, fast) = tokio::join!(slow, fast);

    assert_matches!(slow?, QueryOutcome::Superseded { .. });
    assert_matches!(fast?, QueryOutcome::Completed { tiles: 1, .. });
    // One request for the held token, one for the newer query. The four remaining
    // tokens of the superseded query are never requested.
    assert_eq!(index.metadata_requests(), 2);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_metadata_requests_respect_the_concurrency_limit() -> anyhow::Result<()> {
    let factory = MockFactory::new(numbered_nfts(OWNER, 6));
    let index = factory.index().clone();
    let options = QueryOptions {
        metadata_concurrency: 2,
        ..QueryOptions::default()
    };
    let view = IndexerView::new(factory, Network::Goerli, options)?;

    let outcome = view.fetch_owned_nfts(OWNER).await?;
    assert_matches!(outcome, QueryOutcome::Completed { tiles: 6, .. });
    assert_eq!(index.metadata_requests(), 6);
    assert_eq!(index.max_metadata_in_flight(), 2);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_listing_follows_page_keys_up_to_the_limit() -> anyhow::Result<()> {
    let index = || {
        let nfts = (1..=5)
            .map(|token| (sample_nft("0xddd", &token.to_string()), None))
            .collect();
        MockIndex::new()
            .with_nfts(Network::Goerli, OWNER, nfts)
            .with_page_size(2)
    };

    let single_page = view_over(index(), QueryOptions::default());
    single_page.fetch_owned_nfts(OWNER).await?;
    assert_eq!(single_page.snapshot().tiles().len(), 2);
    assert_eq!(render(&single_page.snapshot()).more_available, Some(3));

    let options = QueryOptions {
        max_pages: 10,
        ..QueryOptions::default()
    };
    let all_pages = view_over(index(), options);
    all_pages.fetch_owned_nfts(OWNER).await?;
    let state = all_pages.snapshot();
    let tokens = state
        .tiles()
        .iter()
        .map(|tile| tile.owned.token_id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(tokens, ["1", "2", "3", "4", "5"]);
    assert_eq!(render(&state).more_available, None);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_select_network_rebuilds_the_client() -> anyhow::Result<()> {
    let index = three_nfts().with_nfts(
        Network::Mumbai,
        OWNER,
        vec![(sample_nft("0xeee", "9"), None)],
    );
    let factory = MockFactory::new(index);
    let view = IndexerView::new(factory, Network::Goerli, QueryOptions::default())?;
    assert_eq!(view.client().network(), Network::Goerli);

    assert_eq!(view.select_network("MUMBAI")?, Network::Mumbai);
    assert_eq!(view.network(), Network::Mumbai);
    assert_eq!(view.client().network(), Network::Mumbai);

    view.fetch_owned_nfts(OWNER).await?;
    assert_eq!(view.snapshot().tiles().len(), 1);

    // Unknown selections fall back to Goerli.
    assert_eq!(view.select_network("ropsten")?, Network::Goerli);
    assert_eq!(view.client().network(), Network::Goerli);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_reselecting_the_same_network_keeps_the_client() -> anyhow::Result<()> {
    let factory = MockFactory::new(three_nfts());
    let view = IndexerView::new(factory, Network::Goerli, QueryOptions::default())?;
    let before = view.client();

    view.select_network("GOERLI")?;
    assert!(std::sync::Arc::ptr_eq(&before, &view.client()));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_network_change_keeps_loaded_results() -> anyhow::Result<()> {
    let view = view_over(three_nfts(), QueryOptions::default());
    view.fetch_owned_nfts(OWNER).await?;

    view.select_network("MUMBAI")?;
    let state = view.snapshot();
    assert_eq!(state.network, Network::Mumbai);
    assert_matches!(
        &state.query,
        QueryState::Loaded { network: Network::Goerli, .. }
    );
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_network_change_drops_a_running_listing() -> anyhow::Result<()> {
    let factory = MockFactory::new(three_nfts());
    let index = factory.index().clone();
    let view = IndexerView::new(factory, Network::Goerli, QueryOptions::default())?;

    let gate = index.hold_listing(OWNER).await;
    let query = view.fetch_owned_nfts(OWNER);
    let switch = async {
        view.subscribe()
            .wait_for(|state| matches!(state.query, QueryState::Loading { .. }))
            .await?;
        view.select_network("MUMBAI")?;
        gate.send(()).ok();
        anyhow::Ok(())
    };
    let (outcome, switched) = tokio::join!(query, switch);
    switched?;

    assert_matches!(outcome?, QueryOutcome::Superseded { .. });
    let state = view.snapshot();
    assert_eq!(state.network, Network::Mumbai);
    assert_matches!(state.query, QueryState::Idle);
    assert_eq!(index.metadata_requests(), 0);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_network_change_lets_loaded_results_finish() -> anyhow::Result<()> {
    let factory = MockFactory::new(three_nfts());
    let index = factory.index().clone();
    let view = IndexerView::new(factory, Network::Goerli, QueryOptions::default())?;

    let gate = index.hold_metadata("0xaaa", "1").await;
    let query = view.fetch_owned_nfts(OWNER);
    let switch = async {
        view.subscribe()
            .wait_for(|state| state.has_results())
            .await?;
        view.select_network("MUMBAI")?;
        gate.send(()).ok();
        anyhow::Ok(())
    };
    let (outcome, switched) = tokio::join!(query, switch);
    switched?;

    assert_matches!(
        outcome?,
        QueryOutcome::Completed {
            tiles: 3,
            failed_metadata: 0,
            ..
        }
    );
    let state = view.snapshot();
    assert_eq!(state.network, Network::Mumbai);
    assert_matches!(
        &state.query,
        QueryState::Loaded { network: Network::Goerli, .. }
    );
    assert!(state
        .tiles()
        .iter()
        .all(|tile| matches!(tile.metadata, MetadataState::Loaded(_))));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_connect_without_wallet_changes_nothing() {
    let factory = MockFactory::new(three_nfts());
    let index = factory.index().clone();
    let view = IndexerView::new(factory, Network::Goerli, QueryOptions::default())
        .expect("mock clients always build");
    let connector = WalletConnector::<MockWallet>::new(None);

    assert!(!connector.has_provider());
    assert_matches!(
        connector.connect_and_fetch(&view).await,
        WalletOutcome::NoProvider
    );
    assert_eq!(view.snapshot().wallet, WalletStatus::NotConnected);
    assert_eq!(index.listing_requests(), 0);
}

#[test_log::test(tokio::test)]
async fn test_rejected_connection_changes_nothing() {
    let view = view_over(three_nfts(), QueryOptions::default());
    let connector = WalletConnector::new(Some(MockWallet::rejecting()));

    let outcome = connector.connect_and_fetch(&view).await;
    assert_matches!(
        outcome,
        WalletOutcome::Rejected(error) if error.is_user_rejection()
    );
    assert_eq!(view.snapshot().wallet, WalletStatus::NotConnected);
    assert_eq!(view.snapshot().query, QueryState::Idle);
}

#[test_log::test(tokio::test)]
async fn test_wallet_without_accounts_changes_nothing() {
    let view = view_over(three_nfts(), QueryOptions::default());
    let connector = WalletConnector::new(Some(MockWallet::with_accounts(&[])));

    assert_matches!(
        connector.connect_and_fetch(&view).await,
        WalletOutcome::NoAccounts
    );
    assert_eq!(render(&view.snapshot()).wallet, "Not connected");
}

#[test_log::test(tokio::test)]
async fn test_connect_queries_the_first_account() -> anyhow::Result<()> {
    let view = view_over(three_nfts(), QueryOptions::default());
    let wallet = MockWallet::with_accounts(&[OWNER, OTHER_OWNER]);
    let connector = WalletConnector::new(Some(wallet));

    let outcome = connector.connect_and_fetch(&view).await;
    let (account, query) = match outcome {
        WalletOutcome::Connected { account, query } => (account, query),
        other => panic!("expected a connection, got {other:?}"),
    };
    assert_eq!(account, OWNER);
    assert_matches!(query?, QueryOutcome::Completed { tiles: 3, .. });

    let page = render(&view.snapshot());
    assert_eq!(page.wallet, "0x8ba...dba72");
    assert_matches!(page.body, Body::Grid(tiles) if tiles.len() == 3);
    Ok(())
}

#[test]
fn test_rejection_code() {
    let error = WalletError::Rejected {
        code: WalletError::USER_REJECTED,
        message: "denied".to_string(),
    };
    assert!(error.is_user_rejection());
    assert!(!WalletError::Transport("offline".to_string()).is_user_rejection());
}
