use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// Face values of a single throw of two dice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceRoll {
    pub die_one: u8,
    pub die_two: u8,
}

impl DiceRoll {
    pub fn new(die_one: u8, die_two: u8) -> Self {
        Self { die_one, die_two }
    }

    pub fn total(&self) -> u8 {
        self.die_one + self.die_two
    }

    pub fn is_double(&self) -> bool {
        self.die_one == self.die_two
    }
}

fn roll_with<R: Rng + ?Sized>(rng: &mut R) -> DiceRoll {
    DiceRoll::new(rng.random_range(1..=6), rng.random_range(1..=6))
}

/// Source of dice throws. Swapped for a deterministic roller in tests.
pub trait DiceRoller: Send + Sync {
    fn roll(&self) -> DiceRoll;
}

/// Rolls with the thread-local RNG
pub struct RandomDiceRoller;

impl RandomDiceRoller {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RandomDiceRoller {
    fn default() -> Self {
        Self::new()
    }
}

impl DiceRoller for RandomDiceRoller {
    fn roll(&self) -> DiceRoll {
        roll_with(&mut rand::rng())
    }
}

/// Reproducible rolls from a seeded RNG
pub struct SeededDiceRoller {
    rng: Mutex<StdRng>,
}

impl SeededDiceRoller {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl DiceRoller for SeededDiceRoller {
    fn roll(&self) -> DiceRoll {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        roll_with(&mut *rng)
    }
}

/// Plays back a fixed list of rolls, then falls back to the last one given.
pub struct ScriptedDiceRoller {
    rolls: Mutex<VecDeque<DiceRoll>>,
    last: DiceRoll,
}

impl ScriptedDiceRoller {
    pub fn new(rolls: impl IntoIterator<Item = (u8, u8)>) -> Self {
        let rolls: VecDeque<DiceRoll> = rolls
            .into_iter()
            .map(|(a, b)| DiceRoll::new(a, b))
            .collect();
        let last = rolls.back().copied().unwrap_or(DiceRoll::new(1, 2));
        Self {
            rolls: Mutex::new(rolls),
            last,
        }
    }
}

impl DiceRoller for ScriptedDiceRoller {
    fn roll(&self) -> DiceRoll {
        self.rolls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(self.last)
    }
}
