use std::sync::Arc;
use std::time::Duration;

use banko::game::{
    DiceRoller, GameService, GameState, GameStore, InMemoryGameStore, JoinCode,
    RandomJoinCodeGenerator, ScriptedDiceRoller, SeededDiceRoller, ServiceOptions,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub store: Arc<InMemoryGameStore>,
    pub service: GameService,
    pub join_code: JoinCode,
    pub players: Vec<String>,
}

pub struct TestSetupBuilder {
    players: Vec<String>,
    end_round_num: u32,
    dice: Arc<dyn DiceRoller>,
    start: bool,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            players: vec!["alice".to_string()],
            end_round_num: 10,
            dice: Arc::new(ScriptedDiceRoller::new([(1, 2)])),
            start: true,
        }
    }

    /// First name hosts the game, the rest join from their own devices
    pub fn with_players(mut self, players: Vec<&str>) -> Self {
        self.players = players.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_two_players(self) -> Self {
        self.with_players(vec!["alice", "bob"])
    }

    pub fn with_three_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "charlie"])
    }

    pub fn with_end_round(mut self, end_round_num: u32) -> Self {
        self.end_round_num = end_round_num;
        self
    }

    pub fn with_rolls(mut self, rolls: Vec<(u8, u8)>) -> Self {
        self.dice = Arc::new(ScriptedDiceRoller::new(rolls));
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.dice = Arc::new(SeededDiceRoller::new(seed));
        self
    }

    /// Leave the game in its lobby instead of starting round one
    pub fn unstarted(mut self) -> Self {
        self.start = false;
        self
    }

    pub async fn build(self) -> TestSetup {
        let store = Arc::new(InMemoryGameStore::new());
        let options = ServiceOptions {
            end_round_num: self.end_round_num,
            retry_backoff: Duration::from_millis(1),
            ..ServiceOptions::default()
        };
        let service = GameService::new(
            Arc::clone(&store) as Arc<dyn GameStore>,
            self.dice,
            Arc::new(RandomJoinCodeGenerator::new()),
            options,
        );

        let host = &self.players[0];
        let game = service.create_game(host).await.unwrap();
        let join_code = game.join_code.clone();

        for player in &self.players[1..] {
            service.join_game(&join_code, player).await.unwrap();
        }
        if self.start {
            service.start_game(&join_code, host).await.unwrap();
        }

        TestSetup {
            store,
            service,
            join_code,
            players: self.players,
        }
    }
}

impl TestSetup {
    pub fn host(&self) -> &str {
        &self.players[0]
    }

    pub async fn game(&self) -> GameState {
        self.service.get_game(&self.join_code).await.unwrap()
    }

    /// The current player rolls for themselves
    pub async fn roll(&self) -> GameState {
        let current = self.game().await.current_player;
        self.service
            .roll_dice(&self.join_code, &current, None, None)
            .await
            .unwrap()
    }

    /// The current player types a total into the keypad
    pub async fn roll_manual(&self, value: u8) -> GameState {
        let current = self.game().await.current_player;
        self.service
            .roll_dice(&self.join_code, &current, Some(value), None)
            .await
            .unwrap()
    }

    /// The host banks on behalf of `bankers`
    pub async fn bank(&self, bankers: &[&str]) -> GameState {
        let bankers: Vec<String> = bankers.iter().map(|b| b.to_string()).collect();
        self.service
            .bank(&self.join_code, self.host(), &bankers, None)
            .await
            .unwrap()
    }
}
