use banko::game::GameState;

/// Asserts each named player's banked total
pub fn assert_points(game: &GameState, expected: &[(&str, i64)]) {
    for (name, points) in expected {
        let player = game
            .player(name)
            .unwrap_or_else(|| panic!("{name} should be in the game"));
        assert_eq!(player.points, *points, "points for {name}");
    }
}

/// Asserts round number, pot and roll index of the current round
pub fn assert_round(game: &GameState, round_num: u32, current_points: i64, current_roll: u32) {
    let round = game.round.as_ref().expect("game should be started");
    assert_eq!(round.round_num, round_num, "round number");
    assert_eq!(round.current_points, current_points, "pot");
    assert_eq!(round.current_roll, current_roll, "roll index");
}
