mod utils;
use utils::TestSetupBuilder;

use banko::game::{GameState, GameSubscription};
use futures::StreamExt;
use std::time::Duration;
use tokio::time::timeout;

/// Pulls snapshots until one reaches `revision`
async fn next_at(subscription: &mut GameSubscription, revision: u64) -> GameState {
    loop {
        let state = timeout(Duration::from_secs(1), subscription.next())
            .await
            .expect("snapshot should arrive")
            .expect("subscription should be open");
        if state.revision >= revision {
            return state;
        }
    }
}

#[tokio::test]
async fn watcher_sees_initial_state_then_every_write() {
    let setup = TestSetupBuilder::new()
        .with_two_players()
        .with_rolls(vec![(2, 3)])
        .build()
        .await;
    let mut subscription = setup.service.watch_game(&setup.join_code).await.unwrap();
    assert_eq!(subscription.join_code(), &setup.join_code);

    let initial = subscription.next().await.unwrap();
    assert_eq!(initial, setup.game().await);

    let rolled = setup.roll().await;
    let seen = next_at(&mut subscription, rolled.revision).await;
    assert_eq!(seen.revision, rolled.revision);
    assert_eq!(seen.round, rolled.round);

    let banked = setup.bank(&["alice"]).await;
    let seen = next_at(&mut subscription, banked.revision).await;
    assert_eq!(seen.players, banked.players);
    assert_eq!(seen.current_player, banked.current_player);
}

#[tokio::test]
async fn snapshots_pair_round_with_matching_points() {
    let setup = TestSetupBuilder::new()
        .with_three_players()
        .with_rolls(vec![(2, 3)])
        .build()
        .await;
    let mut subscription = setup.service.watch_game(&setup.join_code).await.unwrap();
    subscription.next().await.unwrap();

    setup.roll().await;
    setup.bank(&["alice"]).await;
    setup.bank(&["bob"]).await;
    let last = setup.bank(&["charlie"]).await;

    // A pot that has been banked must already show up in players' points
    let mut previous = 0;
    loop {
        let state = next_at(&mut subscription, previous + 1).await;
        assert!(state.revision > previous, "revisions only move forward");
        let round = state.round.as_ref().unwrap();
        for player in &state.players {
            let banked = !round.is_active(&player.name) || round.round_num == 2;
            if banked {
                assert_eq!(player.points, 5, "{} banked in this snapshot", player.name);
            } else {
                assert_eq!(player.points, 0);
            }
        }
        previous = state.revision;
        if state.revision == last.revision {
            break;
        }
    }
}

#[tokio::test]
async fn deleting_the_game_ends_subscriptions() {
    let setup = TestSetupBuilder::new()
        .with_two_players()
        .with_end_round(1)
        .with_rolls(vec![(2, 3)])
        .build()
        .await;
    let stream = setup
        .service
        .watch_game(&setup.join_code)
        .await
        .unwrap()
        .into_stream();

    setup.roll().await;
    setup.bank(&["alice", "bob"]).await;
    setup
        .service
        .delete_game(&setup.join_code, "alice")
        .await
        .unwrap();

    let snapshots: Vec<GameState> = timeout(Duration::from_secs(1), stream.collect())
        .await
        .expect("stream should end once the game is deleted");
    let last = snapshots.last().unwrap();
    assert!(last.is_over());
    assert_eq!(last.players.iter().map(|p| p.points).sum::<i64>(), 10);
}

#[tokio::test]
async fn watching_a_missing_game_fails() {
    let setup = TestSetupBuilder::new().build().await;
    setup.service.get_game(&setup.join_code).await.unwrap();

    let missing = "ZZZZ9".parse().unwrap();
    assert!(setup.service.watch_game(&missing).await.is_err());
}
