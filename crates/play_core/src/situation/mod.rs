//! Game situation input and its derived keys.
//!
//! ## Components
//!
//! - `GameSituation`: raw snapshot handed in by the game loop
//! - `classifier`: down/distance keys and field position bands
//! - `context`: live-game context flags

pub mod classifier;
pub mod context;

pub use classifier::{DistanceBucket, FieldPositionBand, SituationClassifier, SituationKey};
pub use context::{ContextFlag, ContextFlags};

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::limits::ConfigurationLimits;
use crate::error::{PlayCallError, Result};

/// Quarter number used for overtime
pub const OVERTIME_QUARTER: u8 = 5;

/// Snapshot of the game at the moment a play is called.
///
/// Field position runs from 0 (offense's own goal line) to 100 (opponent's
/// goal line). Score differential is offense minus defense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct GameSituation {
    #[validate(range(min = 1, max = 4))]
    pub down: u8,
    #[validate(range(min = 0, max = 100))]
    pub yards_to_go: i32,
    #[validate(range(min = 0, max = 100))]
    pub field_position: i32,
    #[validate(range(min = 1, max = 5))]
    pub quarter: u8,
    #[validate(range(max = 900))]
    pub time_remaining_in_quarter: u32,
    #[serde(default)]
    pub score_differential: i32,
    #[serde(default = "default_timeouts")]
    #[validate(range(max = 3))]
    pub offense_timeouts: u8,
    #[serde(default = "default_timeouts")]
    #[validate(range(max = 3))]
    pub defense_timeouts: u8,
}

fn default_timeouts() -> u8 {
    3
}

impl GameSituation {
    /// First quarter, full clock, tied game, all timeouts left
    pub fn new(down: u8, yards_to_go: i32, field_position: i32) -> Self {
        Self {
            down,
            yards_to_go,
            field_position,
            quarter: 1,
            time_remaining_in_quarter: 900,
            score_differential: 0,
            offense_timeouts: default_timeouts(),
            defense_timeouts: default_timeouts(),
        }
    }

    pub fn with_clock(mut self, quarter: u8, time_remaining_in_quarter: u32) -> Self {
        self.quarter = quarter;
        self.time_remaining_in_quarter = time_remaining_in_quarter;
        self
    }

    pub fn with_score(mut self, score_differential: i32) -> Self {
        self.score_differential = score_differential;
        self
    }

    pub fn with_timeouts(mut self, offense: u8, defense: u8) -> Self {
        self.offense_timeouts = offense;
        self.defense_timeouts = defense;
        self
    }

    /// Fourth quarter or overtime
    pub fn is_final_quarter_or_overtime(&self) -> bool {
        self.quarter >= 4
    }

    /// Quarter whose expiry ends a half (2nd, 4th or overtime)
    pub fn is_end_of_half_quarter(&self) -> bool {
        matches!(self.quarter, 2 | 4 | OVERTIME_QUARTER)
    }

    pub fn is_fourth_down(&self) -> bool {
        self.down == 4
    }

    /// Range-checks every field, reporting all violations at once
    pub fn validate_situation(&self) -> Result<()> {
        self.validate().map_err(|errors| {
            let mut fields: Vec<String> = errors
                .field_errors()
                .into_iter()
                .map(|(field, errs)| {
                    let codes: Vec<String> = errs.iter().map(|e| e.code.to_string()).collect();
                    format!("{} ({})", field, codes.join(", "))
                })
                .collect();
            fields.sort();
            PlayCallError::InvalidSituation(format!("out of range: {}", fields.join("; ")))
        })
    }
}

/// A validated situation together with everything derived from it once per
/// call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifiedSituation {
    pub situation: GameSituation,
    pub key: SituationKey,
    pub band: FieldPositionBand,
    pub flags: ContextFlags,
}

impl ClassifiedSituation {
    pub fn classify(situation: &GameSituation, limits: &ConfigurationLimits) -> Result<Self> {
        situation.validate_situation()?;
        let classifier =
            SituationClassifier::new(limits.yardage.clone(), limits.field_position.clone());
        Ok(Self {
            situation: *situation,
            key: classifier.classify(situation.down, situation.yards_to_go)?,
            band: classifier.band(situation.field_position),
            flags: ContextFlags::detect(situation, limits),
        })
    }
}
