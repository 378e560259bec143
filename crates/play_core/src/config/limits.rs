//! Process-wide tuning limits
//!
//! Every threshold the pipeline compares against lives here instead of being
//! a magic number at the call site. Limits can be selected via presets or the
//! environment.
//!
//! ## Environment Variables
//!
//! - `PLAYCALL_LIMITS_PROFILE`: Select preset (nfl, high_variance)

use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;
use validator::Validate;

/// All limits used by the decision pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ConfigurationLimits {
    /// Down-and-distance bucketing
    #[validate]
    pub yardage: YardageThresholds,
    /// Field position bands and kicking geometry
    #[validate]
    pub field_position: FieldPositionThresholds,
    /// Game clock thresholds (seconds)
    #[validate]
    pub clock: ClockThresholds,
    /// Score margin thresholds (points)
    #[validate]
    pub score: ScoreThresholds,
    /// Per-rule and per-layer modifier caps
    #[validate]
    pub modifiers: ModifierCaps,
    /// Final distribution bounds
    #[validate]
    pub probability: ProbabilityBounds,
}

impl Default for ConfigurationLimits {
    fn default() -> Self {
        Self::nfl()
    }
}

impl ConfigurationLimits {
    /// NFL-average tuning (default)
    pub fn nfl() -> Self {
        Self {
            yardage: YardageThresholds::default(),
            field_position: FieldPositionThresholds::default(),
            clock: ClockThresholds::default(),
            score: ScoreThresholds::default(),
            modifiers: ModifierCaps::default(),
            probability: ProbabilityBounds::default(),
        }
    }

    /// Wider modifier caps and a tighter probability band, so calls stay
    /// less predictable while archetypes pull harder.
    pub fn high_variance() -> Self {
        Self {
            modifiers: ModifierCaps { max_situation_modifier: 0.35, max_layer_modifier: 0.70 },
            probability: ProbabilityBounds {
                min_probability: 0.03,
                max_probability: 0.90,
                ..ProbabilityBounds::default()
            },
            ..Self::nfl()
        }
    }

    /// Named preset, case-insensitive. An empty name is `nfl`.
    pub fn from_profile(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "" | "nfl" => Some(Self::nfl()),
            "high_variance" => Some(Self::high_variance()),
            _ => None,
        }
    }

    /// Load from environment variable PLAYCALL_LIMITS_PROFILE or use default
    pub fn from_env_or_default() -> Self {
        let profile = env::var("PLAYCALL_LIMITS_PROFILE").unwrap_or_default();
        Self::from_profile(&profile).unwrap_or_else(|| {
            warn!("unknown limits profile '{}', using nfl", profile);
            Self::nfl()
        })
    }

    /// Range checks from the derive plus the cross-field checks the derive
    /// cannot express. Returns one message per problem.
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if let Err(errors) = self.validate() {
            issues.push(format!("limits out of range: {}", errors));
        }

        let y = &self.yardage;
        if y.short_max >= y.medium_max {
            issues.push(format!(
                "yardage bands overlap: short_max {} must be below medium_max {}",
                y.short_max, y.medium_max
            ));
        }

        let fp = &self.field_position;
        if fp.safety_zone_max > fp.deep_territory_max {
            issues.push(format!(
                "safety zone ({}) must sit inside deep territory ({})",
                fp.safety_zone_max, fp.deep_territory_max
            ));
        }
        if fp.deep_territory_max >= fp.field_goal_range_min {
            issues.push(format!(
                "deep territory ({}) overlaps field goal range ({})",
                fp.deep_territory_max, fp.field_goal_range_min
            ));
        }
        if fp.field_goal_range_min >= fp.red_zone_min {
            issues.push(format!(
                "field goal range ({}) must start before the red zone ({})",
                fp.field_goal_range_min, fp.red_zone_min
            ));
        }
        if fp.red_zone_min > fp.goal_line_min {
            issues.push(format!(
                "red zone ({}) must start at or before the goal line zone ({})",
                fp.red_zone_min, fp.goal_line_min
            ));
        }

        let m = &self.modifiers;
        if !m.max_situation_modifier.is_finite() || m.max_situation_modifier < 0.0 {
            issues.push(format!("max_situation_modifier must be non-negative, got {}", m.max_situation_modifier));
        }
        if !m.max_layer_modifier.is_finite() || m.max_layer_modifier < m.max_situation_modifier {
            issues.push(format!(
                "max_layer_modifier ({}) must be at least max_situation_modifier ({})",
                m.max_layer_modifier, m.max_situation_modifier
            ));
        }

        let p = &self.probability;
        if !p.min_probability.is_finite() || !p.max_probability.is_finite() {
            issues.push("probability bounds must be finite".to_string());
        } else {
            if p.min_probability <= 0.0 || p.min_probability >= p.max_probability {
                issues.push(format!(
                    "probability bounds inverted: min {} max {}",
                    p.min_probability, p.max_probability
                ));
            }
            // Four candidates at most, at least two on every situation.
            if p.min_probability * 4.0 > 1.0 || p.max_probability * 2.0 < 1.0 {
                issues.push(format!(
                    "probability bounds [{}, {}] cannot hold a distribution of 2-4 candidates",
                    p.min_probability, p.max_probability
                ));
            }
        }
        if !(p.sum_epsilon.is_finite() && p.sum_epsilon > 0.0) {
            issues.push(format!("sum_epsilon must be positive, got {}", p.sum_epsilon));
        }

        issues
    }
}

/// Distance buckets: short <= short_max, medium <= medium_max, long otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct YardageThresholds {
    #[validate(range(min = 0, max = 99))]
    pub short_max: i32,
    #[validate(range(min = 1, max = 99))]
    pub medium_max: i32,
}

impl Default for YardageThresholds {
    fn default() -> Self {
        Self { short_max: 3, medium_max: 7 }
    }
}

/// Field position thresholds (0 = own goal line, 100 = opponent goal line)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct FieldPositionThresholds {
    /// Punting is never allowed at or inside this line
    #[validate(range(min = 0, max = 100))]
    pub safety_zone_max: i32,
    #[validate(range(min = 0, max = 100))]
    pub deep_territory_max: i32,
    /// Field goal range is [field_goal_range_min, red_zone_min)
    #[validate(range(min = 0, max = 100))]
    pub field_goal_range_min: i32,
    #[validate(range(min = 0, max = 100))]
    pub red_zone_min: i32,
    #[validate(range(min = 0, max = 100))]
    pub goal_line_min: i32,
    /// Longest kick (yards) treated as makeable
    #[validate(range(min = 10, max = 80))]
    pub max_field_goal_distance: i32,
    /// End zone depth plus holder spot, added to the line of scrimmage
    #[validate(range(min = 0, max = 30))]
    pub snap_offset: i32,
}

impl Default for FieldPositionThresholds {
    fn default() -> Self {
        Self {
            safety_zone_max: 5,
            deep_territory_max: 20,
            field_goal_range_min: 60,
            red_zone_min: 80,
            goal_line_min: 95,
            max_field_goal_distance: 50,
            snap_offset: 17,
        }
    }
}

impl FieldPositionThresholds {
    /// Kick distance in yards from the given field position
    pub fn field_goal_distance(&self, field_position: i32) -> i32 {
        (100 - field_position) + self.snap_offset
    }

    pub fn field_goal_makeable(&self, field_position: i32) -> bool {
        self.field_goal_distance(field_position) <= self.max_field_goal_distance
    }
}

/// Clock thresholds in seconds remaining in the current quarter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ClockThresholds {
    #[validate(range(min = 0, max = 900))]
    pub two_minute_seconds: u32,
    #[validate(range(min = 0, max = 900))]
    pub desperation_seconds: u32,
    #[validate(range(min = 0, max = 900))]
    pub protect_lead_seconds: u32,
    /// A kick snapped with this much time left is the last play
    #[validate(range(min = 0, max = 60))]
    pub final_play_seconds: u32,
}

impl Default for ClockThresholds {
    fn default() -> Self {
        Self {
            two_minute_seconds: 120,
            desperation_seconds: 480,
            protect_lead_seconds: 360,
            final_play_seconds: 5,
        }
    }
}

/// Score margin thresholds in points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ScoreThresholds {
    #[validate(range(min = 1, max = 100))]
    pub desperation_deficit: i32,
    #[validate(range(min = 1, max = 100))]
    pub protect_lead_margin: i32,
    #[validate(range(min = 0, max = 100))]
    pub close_game_margin: i32,
    #[validate(range(min = 1, max = 100))]
    pub blowout_margin: i32,
    #[validate(range(min = 1, max = 8))]
    pub field_goal_points: i32,
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self {
            desperation_deficit: 14,
            protect_lead_margin: 10,
            close_game_margin: 3,
            blowout_margin: 21,
            field_goal_points: 3,
        }
    }
}

/// Modifier caps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ModifierCaps {
    /// Any single rule component is clamped to +/- this value
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_situation_modifier: f64,
    /// Cumulative delta of one layer, per play type
    #[validate(range(min = 0.0, max = 2.0))]
    pub max_layer_modifier: f64,
}

impl Default for ModifierCaps {
    fn default() -> Self {
        Self { max_situation_modifier: 0.30, max_layer_modifier: 0.60 }
    }
}

/// Bounds enforced on the final distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProbabilityBounds {
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_probability: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_probability: f64,
    #[validate(range(min = 0.0, max = 0.01))]
    pub sum_epsilon: f64,
}

impl Default for ProbabilityBounds {
    fn default() -> Self {
        Self { min_probability: 0.01, max_probability: 0.95, sum_epsilon: 1e-6 }
    }
}

impl ProbabilityBounds {
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min_probability, self.max_probability)
    }
}
