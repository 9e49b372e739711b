mod utils;
use utils::{assert_points, assert_round, TestSetupBuilder};

use banko::game::{GameError, GameStore, Setting, SettingName};
use banko::AppError;
use uuid::Uuid;

#[tokio::test]
async fn two_player_single_round_game_runs_to_deletion() {
    let setup = TestSetupBuilder::new()
        .with_two_players()
        .with_end_round(1)
        .with_rolls(vec![(3, 4)])
        .build()
        .await;

    // A seven on an early roll is worth 70
    let game = setup.roll_manual(7).await;
    assert_round(&game, 1, 70, 2);
    assert_eq!(game.current_player, "bob");

    // Alice banks while it is Bob's turn; Bob keeps the dice
    let game = setup.bank(&["alice"]).await;
    assert_points(&game, &[("alice", 70), ("bob", 0)]);
    assert_eq!(game.current_player, "bob");
    assert_eq!(
        game.round.as_ref().unwrap().active_ordered_player_names,
        vec!["bob".to_string()]
    );

    let game = setup.roll().await;
    assert_round(&game, 1, 140, 3);
    assert_eq!(game.current_player, "bob");

    let game = setup.bank(&["bob"]).await;
    assert_points(&game, &[("alice", 70), ("bob", 140)]);
    assert!(game.is_over(), "one round game should be over after round one");

    let result = setup
        .service
        .roll_dice(&setup.join_code, "alice", None, None)
        .await;
    assert!(matches!(
        result,
        Err(AppError::PreconditionViolation(GameError::GameOver))
    ));

    let game = setup
        .service
        .finish_game(&setup.join_code, "alice")
        .await
        .unwrap();
    assert!(game.finished);

    setup
        .service
        .delete_game(&setup.join_code, "alice")
        .await
        .unwrap();
    assert!(matches!(
        setup.service.get_game(&setup.join_code).await,
        Err(AppError::NotFound(_))
    ));
    assert!(!setup.store.exists(&setup.join_code).await.unwrap());
}

#[tokio::test]
async fn doubles_after_third_roll_double_the_pot() {
    let setup = TestSetupBuilder::new()
        .with_two_players()
        .with_rolls(vec![(6, 6), (6, 6), (6, 6), (3, 3)])
        .build()
        .await;

    for _ in 0..3 {
        setup.roll().await;
    }
    assert_round(&setup.game().await, 1, 36, 4);

    let game = setup.roll().await;
    assert_round(&game, 1, 72, 5);
    assert_eq!(game.round.as_ref().unwrap().die_one, 3);
    assert_eq!(game.round.as_ref().unwrap().die_two, 3);
}

#[tokio::test]
async fn keypad_thirteen_doubles_the_pot_only_after_third_roll() {
    let setup = TestSetupBuilder::new().with_two_players().build().await;

    let early = setup
        .service
        .roll_dice(&setup.join_code, "alice", Some(13), None)
        .await;
    assert!(matches!(
        early,
        Err(AppError::PreconditionViolation(GameError::InvalidManualValue {
            value: 13,
            roll: 1
        }))
    ));

    setup.roll_manual(10).await;
    setup.roll_manual(10).await;
    setup.roll_manual(12).await;

    let game = setup.roll_manual(13).await;
    assert_round(&game, 1, 64, 5);
    // Keypad entries carry no dice faces
    assert_eq!(game.round.as_ref().unwrap().die_one, 0);
}

#[tokio::test]
async fn seven_after_third_roll_busts_and_resets_round() {
    let setup = TestSetupBuilder::new()
        .with_three_players()
        .with_rolls(vec![(2, 3), (2, 3), (2, 3), (3, 4)])
        .build()
        .await;

    setup.roll().await;
    let game = setup.bank(&["alice"]).await;
    assert_eq!(game.current_player, "bob");

    setup.roll().await;
    setup.roll().await;
    let before = setup.game().await;
    assert_eq!(before.current_player, "bob");
    assert_round(&before, 1, 15, 4);

    let game = setup.roll().await;
    assert_round(&game, 2, 0, 1);
    let round = game.round.as_ref().unwrap();
    assert_eq!(
        round.active_ordered_player_names,
        vec!["alice".to_string(), "bob".to_string(), "charlie".to_string()]
    );
    assert_eq!((round.die_one, round.die_two), (3, 4));
    assert_eq!(game.current_player, "charlie");
    // Banked points survive the bust, the unbanked pot is lost
    assert_points(&game, &[("alice", 5), ("bob", 0), ("charlie", 0)]);
}

#[tokio::test]
async fn banking_together_matches_banking_one_at_a_time() {
    let together = TestSetupBuilder::new()
        .with_three_players()
        .with_rolls(vec![(2, 3)])
        .build()
        .await;
    together.roll().await;
    let together = together.bank(&["alice", "bob", "charlie"]).await;

    let one_by_one = TestSetupBuilder::new()
        .with_three_players()
        .with_rolls(vec![(2, 3)])
        .build()
        .await;
    one_by_one.roll().await;
    one_by_one.bank(&["alice"]).await;
    one_by_one.bank(&["bob"]).await;
    let one_by_one = one_by_one.bank(&["charlie"]).await;

    for game in [&together, &one_by_one] {
        assert_points(game, &[("alice", 5), ("bob", 5), ("charlie", 5)]);
        assert_round(game, 2, 0, 1);
    }
}

#[tokio::test]
async fn duplicate_bankers_are_paid_once() {
    let setup = TestSetupBuilder::new()
        .with_two_players()
        .with_rolls(vec![(2, 3)])
        .build()
        .await;
    setup.roll().await;

    let game = setup.bank(&["alice", "alice"]).await;
    assert_points(&game, &[("alice", 5)]);
}

#[tokio::test]
async fn total_points_never_decrease_over_a_full_game() {
    let setup = TestSetupBuilder::new()
        .with_three_players()
        .with_end_round(3)
        .with_seed(7)
        .build()
        .await;

    let mut last_total = 0;
    for _ in 0..500 {
        let game = setup.game().await;
        if game.is_over() {
            break;
        }

        let round = game.round.as_ref().unwrap();
        let game = if round.current_roll > 4 && round.current_points > 0 {
            let current = game.current_player.clone();
            setup.bank(&[current.as_str()]).await
        } else {
            setup.roll().await
        };

        let total = game.total_points();
        assert!(total >= last_total, "total went from {last_total} to {total}");
        last_total = total;
    }

    assert!(setup.game().await.is_over());
}

#[tokio::test]
async fn host_control_off_limits_host_to_local_players() {
    let setup = TestSetupBuilder::new()
        .with_two_players()
        .unstarted()
        .build()
        .await;
    setup
        .service
        .add_local_player(&setup.join_code, "alice", "grandpa")
        .await
        .unwrap();
    setup
        .service
        .update_setting(
            &setup.join_code,
            "alice",
            Setting::flag(SettingName::HostControl, false),
        )
        .await
        .unwrap();
    setup
        .service
        .start_game(&setup.join_code, "alice")
        .await
        .unwrap();

    setup.roll().await;
    let result = setup
        .service
        .roll_dice(&setup.join_code, "alice", None, None)
        .await;
    assert!(matches!(
        result,
        Err(AppError::PreconditionViolation(GameError::NotAuthorized { .. }))
    ));

    setup
        .service
        .roll_dice(&setup.join_code, "bob", None, None)
        .await
        .unwrap();
    let game = setup
        .service
        .roll_dice(&setup.join_code, "alice", None, None)
        .await
        .unwrap();
    assert_eq!(game.current_player, "alice");
}

#[tokio::test]
async fn retried_roll_is_applied_once() {
    let setup = TestSetupBuilder::new()
        .with_two_players()
        .with_rolls(vec![(2, 3)])
        .build()
        .await;
    let action_id = Some(Uuid::new_v4());

    let first = setup
        .service
        .roll_dice(&setup.join_code, "alice", None, action_id)
        .await
        .unwrap();
    let replay = setup
        .service
        .roll_dice(&setup.join_code, "alice", None, action_id)
        .await
        .unwrap();

    assert_eq!(replay.revision, first.revision);
    assert_round(&replay, 1, 5, 2);
}

#[tokio::test]
async fn late_joiner_waits_for_next_round() {
    let setup = TestSetupBuilder::new()
        .with_two_players()
        .with_rolls(vec![(2, 3)])
        .build()
        .await;
    let game = setup
        .service
        .join_game(&setup.join_code, "dave")
        .await
        .unwrap();
    assert!(game.ordered_player_names.contains(&"dave".to_string()));
    assert!(!game.round.as_ref().unwrap().is_active("dave"));

    setup.roll().await;
    let game = setup.bank(&["alice", "bob"]).await;
    assert!(game.round.as_ref().unwrap().is_active("dave"));
}

#[tokio::test]
async fn delete_is_rejected_until_game_is_over() {
    let setup = TestSetupBuilder::new().with_two_players().build().await;

    let result = setup.service.delete_game(&setup.join_code, "alice").await;
    assert!(matches!(
        result,
        Err(AppError::PreconditionViolation(GameError::GameNotOver))
    ));
    assert!(setup.service.get_game(&setup.join_code).await.is_ok());
}
