//! Context flag detection
//!
//! Flags are a pure function of the game situation and the configured
//! thresholds. Several can be active at once.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::GameSituation;
use crate::config::limits::ConfigurationLimits;

/// Derived live-game condition.
///
/// Declaration order is the fixed evaluation order used by every layer that
/// walks the active flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextFlag {
    Desperation,
    ProtectLead,
    TwoMinuteDrill,
    Blowout,
    CloseGame,
    RedZone,
    GoalLine,
    /// From field goal range up to the red zone, exclusive (60..=79 by default)
    FieldGoalRange,
    DeepTerritory,
}

impl ContextFlag {
    pub const EVALUATION_ORDER: [ContextFlag; 9] = [
        ContextFlag::Desperation,
        ContextFlag::ProtectLead,
        ContextFlag::TwoMinuteDrill,
        ContextFlag::Blowout,
        ContextFlag::CloseGame,
        ContextFlag::RedZone,
        ContextFlag::GoalLine,
        ContextFlag::FieldGoalRange,
        ContextFlag::DeepTerritory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContextFlag::Desperation => "desperation",
            ContextFlag::ProtectLead => "protect_lead",
            ContextFlag::TwoMinuteDrill => "two_minute_drill",
            ContextFlag::Blowout => "blowout",
            ContextFlag::CloseGame => "close_game",
            ContextFlag::RedZone => "red_zone",
            ContextFlag::GoalLine => "goal_line",
            ContextFlag::FieldGoalRange => "field_goal_range",
            ContextFlag::DeepTerritory => "deep_territory",
        }
    }

    fn bit(&self) -> u16 {
        1 << (*self as u16)
    }
}

impl fmt::Display for ContextFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of active context flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ContextFlags {
    bits: u16,
}

impl ContextFlags {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_flags(flags: &[ContextFlag]) -> Self {
        let mut set = Self::empty();
        for flag in flags {
            set.insert(*flag);
        }
        set
    }

    pub fn insert(&mut self, flag: ContextFlag) {
        self.bits |= flag.bit();
    }

    pub fn contains(&self, flag: ContextFlag) -> bool {
        self.bits & flag.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Active flags in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = ContextFlag> + '_ {
        ContextFlag::EVALUATION_ORDER.into_iter().filter(move |f| self.contains(*f))
    }

    /// Detects every flag that holds for `situation`
    pub fn detect(situation: &GameSituation, limits: &ConfigurationLimits) -> Self {
        let clock = &limits.clock;
        let score = &limits.score;
        let field = &limits.field_position;

        let diff = situation.score_differential;
        let seconds = situation.time_remaining_in_quarter;
        let late_game = situation.is_final_quarter_or_overtime();

        let mut flags = Self::empty();

        if late_game && diff <= -score.desperation_deficit && seconds < clock.desperation_seconds {
            flags.insert(ContextFlag::Desperation);
        }
        if late_game && diff >= score.protect_lead_margin && seconds < clock.protect_lead_seconds {
            flags.insert(ContextFlag::ProtectLead);
        }
        if situation.is_end_of_half_quarter() && seconds <= clock.two_minute_seconds {
            flags.insert(ContextFlag::TwoMinuteDrill);
        }
        if diff.abs() >= score.blowout_margin {
            flags.insert(ContextFlag::Blowout);
        }
        if diff.abs() <= score.close_game_margin {
            flags.insert(ContextFlag::CloseGame);
        }

        let fp = situation.field_position;
        if fp >= field.red_zone_min {
            flags.insert(ContextFlag::RedZone);
        }
        if fp >= field.goal_line_min {
            flags.insert(ContextFlag::GoalLine);
        }
        if fp >= field.field_goal_range_min && fp < field.red_zone_min {
            flags.insert(ContextFlag::FieldGoalRange);
        }
        if fp <= field.deep_territory_max {
            flags.insert(ContextFlag::DeepTerritory);
        }

        flags
    }
}

impl fmt::Display for ContextFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|flag| flag.as_str()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

impl Serialize for ContextFlags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for ContextFlags {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let flags = Vec::<ContextFlag>::deserialize(deserializer)?;
        Ok(Self::from_flags(&flags))
    }
}
