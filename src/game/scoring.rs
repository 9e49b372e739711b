use super::dice::DiceRoll;

/// Rolls within a round that are safe: a seven pays instead of busting.
pub const SAFE_ROLLS: u32 = 3;
/// Flat award for a seven during the safe rolls.
pub const SAFE_SEVEN_BONUS: i64 = 70;
/// Manual keypad value meaning "doubles", since a total cannot express it.
pub const MANUAL_DOUBLES: u8 = 13;

/// What the player reported for this roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollInput {
    Dice(DiceRoll),
    /// A total entered by hand from physical dice
    Manual(u8),
}

impl RollInput {
    /// Faces to record on the round; manual entries record zeros.
    pub fn recorded_faces(&self) -> (u8, u8) {
        match self {
            RollInput::Dice(roll) => (roll.die_one, roll.die_two),
            RollInput::Manual(_) => (0, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollScore {
    /// Points added to the pot; zero means the round busted
    pub points_awarded: i64,
    pub bust: bool,
}

/// Scores one roll.
///
/// `roll_index` is the 1-based roll count in the round before this roll and
/// `pot` is the round's current points. On doubles after the safe rolls the
/// award equals the pot, so adding it doubles the pot.
pub fn score_roll(roll_index: u32, input: RollInput, pot: i64) -> RollScore {
    let (total, doubles) = match input {
        RollInput::Dice(roll) => (roll.total(), roll.is_double()),
        RollInput::Manual(value) => (value, value == MANUAL_DOUBLES),
    };

    if roll_index <= SAFE_ROLLS {
        let points_awarded = if total == 7 {
            SAFE_SEVEN_BONUS
        } else {
            i64::from(total)
        };
        return RollScore {
            points_awarded,
            bust: false,
        };
    }

    if total == 7 {
        RollScore {
            points_awarded: 0,
            bust: true,
        }
    } else if doubles {
        RollScore {
            points_awarded: pot,
            bust: false,
        }
    } else {
        RollScore {
            points_awarded: i64::from(total),
            bust: false,
        }
    }
}

/// Whether a hand-entered value is one the keypad offers at this roll.
///
/// During the safe rolls any total 2-12 is accepted. Afterwards 2 and 12 can
/// only come from doubles, so they must be entered as 13.
pub fn is_valid_manual_value(roll_index: u32, value: u8) -> bool {
    if roll_index <= SAFE_ROLLS {
        (2..=12).contains(&value)
    } else {
        (3..=11).contains(&value) || value == MANUAL_DOUBLES
    }
}
