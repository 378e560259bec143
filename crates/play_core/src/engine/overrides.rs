//! Hard rules that rewrite the distribution before normalization.
//!
//! Rules run in fixed priority order and each one sees the output of the
//! previous one:
//!
//! 1. Safety: no punt at or inside the safety zone
//! 2. Game-winning field goal on the final play of a one-score game
//! 3. Clock exhaustion at the end of a half

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::config::limits::ConfigurationLimits;
use crate::situation::GameSituation;
use crate::tendency::{PlayType, ProbabilityDistribution};

/// An override that fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOverride {
    SafetyNoPunt,
    GameWinningFieldGoal,
    ClockExpiredNoPunt,
    ClockExpiredNoFieldGoal,
}

impl DecisionOverride {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionOverride::SafetyNoPunt => "safety_no_punt",
            DecisionOverride::GameWinningFieldGoal => "game_winning_field_goal",
            DecisionOverride::ClockExpiredNoPunt => "clock_expired_no_punt",
            DecisionOverride::ClockExpiredNoFieldGoal => "clock_expired_no_field_goal",
        }
    }
}

impl fmt::Display for DecisionOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct DecisionOverrideManager<'a> {
    limits: &'a ConfigurationLimits,
}

impl<'a> DecisionOverrideManager<'a> {
    pub fn new(limits: &'a ConfigurationLimits) -> Self {
        Self { limits }
    }

    pub fn apply(
        &self,
        distribution: &mut ProbabilityDistribution,
        situation: &GameSituation,
    ) -> Vec<DecisionOverride> {
        let mut fired = Vec::new();

        if self.apply_safety(distribution, situation) {
            fired.push(DecisionOverride::SafetyNoPunt);
        }

        if self.is_game_winning_kick(situation) {
            let (min, max) = (self.limits.probability.min_probability, self.limits.probability.max_probability);
            distribution.remove_and_redistribute(PlayType::Punt);
            distribution.remove(PlayType::FieldGoal);
            // Every other candidate starts at the floor so normalization
            // leaves the kick at max
            let count = distribution.len() as f64;
            let spare = (1.0 - max - count * min).max(0.0);
            let positive = distribution.positive_total();
            for v in distribution.values_mut() {
                let share = if positive > 0.0 { v.max(0.0) / positive } else { 1.0 / count };
                *v = min + spare * share;
            }
            distribution.set(PlayType::FieldGoal, max);
            fired.push(DecisionOverride::GameWinningFieldGoal);
        }

        if situation.time_remaining_in_quarter == 0 && situation.is_end_of_half_quarter() {
            if distribution.remove_and_redistribute(PlayType::Punt).is_some() {
                fired.push(DecisionOverride::ClockExpiredNoPunt);
            }
            let trailing_beyond_kick =
                situation.score_differential < -self.limits.score.field_goal_points;
            if situation.is_final_quarter_or_overtime()
                && trailing_beyond_kick
                && distribution.remove_and_redistribute(PlayType::FieldGoal).is_some()
            {
                fired.push(DecisionOverride::ClockExpiredNoFieldGoal);
            }
        }

        if !fired.is_empty() {
            debug!("overrides {:?} -> {}", fired, distribution);
        }
        fired
    }

    fn apply_safety(&self, distribution: &mut ProbabilityDistribution, situation: &GameSituation) -> bool {
        situation.field_position <= self.limits.field_position.safety_zone_max
            && distribution.remove_and_redistribute(PlayType::Punt).is_some()
    }

    fn is_game_winning_kick(&self, situation: &GameSituation) -> bool {
        let diff = situation.score_differential;
        self.limits.field_position.field_goal_makeable(situation.field_position)
            && (-self.limits.score.field_goal_points..=0).contains(&diff)
            && situation.is_final_quarter_or_overtime()
            && situation.time_remaining_in_quarter <= self.limits.clock.final_play_seconds
    }
}
