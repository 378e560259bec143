//! Coaching archetypes
//!
//! Offensive archetypes describe a play caller's philosophy; defensive
//! archetypes describe the scheme the offense is facing. Both are closed
//! enums whose default modifier tables are built by exhaustive `match`, so a
//! new archetype cannot be added without giving it a table.

pub mod defense;
pub mod offense;

pub use defense::{DefensiveArchetypeCounter, DefensiveCounterTable};
pub use offense::{OffensiveArchetypeModifier, OffensiveModifierTable};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::config::limits::FieldPositionThresholds;
use crate::error::{ArchetypeKind, PlayCallError};
use crate::situation::{ClassifiedSituation, ContextFlag, DistanceBucket};
use crate::tendency::TendencyDeltas;

/// Offensive play-calling philosophy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OffensiveArchetype {
    Conservative,
    Aggressive,
    WestCoast,
    RunHeavy,
    AirRaid,
    #[default]
    Balanced,
}

impl OffensiveArchetype {
    pub const ALL: [OffensiveArchetype; 6] = [
        OffensiveArchetype::Conservative,
        OffensiveArchetype::Aggressive,
        OffensiveArchetype::WestCoast,
        OffensiveArchetype::RunHeavy,
        OffensiveArchetype::AirRaid,
        OffensiveArchetype::Balanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OffensiveArchetype::Conservative => "conservative",
            OffensiveArchetype::Aggressive => "aggressive",
            OffensiveArchetype::WestCoast => "west_coast",
            OffensiveArchetype::RunHeavy => "run_heavy",
            OffensiveArchetype::AirRaid => "air_raid",
            OffensiveArchetype::Balanced => "balanced",
        }
    }

    /// Parses `key`, falling back to Balanced with a warning
    pub fn resolve_or_balanced(key: &str) -> (Self, Option<PlayCallError>) {
        match key.parse() {
            Ok(archetype) => (archetype, None),
            Err(err) => {
                warn!("{}; using balanced", err);
                (OffensiveArchetype::Balanced, Some(err))
            }
        }
    }
}

impl fmt::Display for OffensiveArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OffensiveArchetype {
    type Err = PlayCallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_key(s);
        OffensiveArchetype::ALL
            .into_iter()
            .find(|a| a.as_str().replace('_', "") == normalized)
            .ok_or_else(|| PlayCallError::UnknownArchetype {
                kind: ArchetypeKind::Offensive,
                key: s.to_string(),
            })
    }
}

/// Defensive scheme the offense is facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DefensiveArchetype {
    BlitzHeavy,
    RunStuffing,
    ZoneCoverage,
    ManCoverage,
    BendDontBreak,
    #[default]
    Balanced,
}

impl DefensiveArchetype {
    pub const ALL: [DefensiveArchetype; 6] = [
        DefensiveArchetype::BlitzHeavy,
        DefensiveArchetype::RunStuffing,
        DefensiveArchetype::ZoneCoverage,
        DefensiveArchetype::ManCoverage,
        DefensiveArchetype::BendDontBreak,
        DefensiveArchetype::Balanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DefensiveArchetype::BlitzHeavy => "blitz_heavy",
            DefensiveArchetype::RunStuffing => "run_stuffing",
            DefensiveArchetype::ZoneCoverage => "zone_coverage",
            DefensiveArchetype::ManCoverage => "man_coverage",
            DefensiveArchetype::BendDontBreak => "bend_dont_break",
            DefensiveArchetype::Balanced => "balanced",
        }
    }

    /// Parses `key`, falling back to Balanced with a warning
    pub fn resolve_or_balanced(key: &str) -> (Self, Option<PlayCallError>) {
        match key.parse() {
            Ok(archetype) => (archetype, None),
            Err(err) => {
                warn!("{}; using balanced", err);
                (DefensiveArchetype::Balanced, Some(err))
            }
        }
    }
}

impl fmt::Display for DefensiveArchetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DefensiveArchetype {
    type Err = PlayCallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_key(s);
        DefensiveArchetype::ALL
            .into_iter()
            .find(|a| a.as_str().replace('_', "") == normalized)
            .ok_or_else(|| PlayCallError::UnknownArchetype {
                kind: ArchetypeKind::Defensive,
                key: s.to_string(),
            })
    }
}

/// "West Coast", "west_coast", "WestCoast" and "west-coast" all match
fn normalize_key(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' ' | '\''))
        .flat_map(char::to_lowercase)
        .collect()
}

/// When a named custom tendency contributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "when", rename_all = "snake_case")]
pub enum TendencyCondition {
    Always,
    OnDown { down: u8 },
    /// Fourth down, not long, and outside deep territory
    FourthDownConvertible,
    WithFlag { flag: ContextFlag },
}

impl TendencyCondition {
    pub fn holds(&self, call: &ClassifiedSituation, field: &FieldPositionThresholds) -> bool {
        match self {
            TendencyCondition::Always => true,
            TendencyCondition::OnDown { down } => call.key.down() == *down,
            TendencyCondition::FourthDownConvertible => {
                call.key.is_fourth_down()
                    && call.key.distance() != DistanceBucket::Long
                    && call.situation.field_position > field.deep_territory_max
            }
            TendencyCondition::WithFlag { flag } => call.flags.contains(*flag),
        }
    }
}

/// A named, conditional tendency an archetype always carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedTendency {
    pub name: String,
    pub condition: TendencyCondition,
    pub deltas: TendencyDeltas,
}

impl NamedTendency {
    pub fn new(name: &str, condition: TendencyCondition, deltas: TendencyDeltas) -> Self {
        Self { name: name.to_string(), condition, deltas }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::limits::ConfigurationLimits;
    use crate::situation::GameSituation;

    #[test]
    fn test_offensive_parsing_is_lenient() {
        assert_eq!("West Coast".parse::<OffensiveArchetype>().unwrap(), OffensiveArchetype::WestCoast);
        assert_eq!("air_raid".parse::<OffensiveArchetype>().unwrap(), OffensiveArchetype::AirRaid);
        assert_eq!("RunHeavy".parse::<OffensiveArchetype>().unwrap(), OffensiveArchetype::RunHeavy);
        assert_eq!("bend-dont-break".parse::<DefensiveArchetype>().unwrap(), DefensiveArchetype::BendDontBreak);
        assert_eq!("Bend Don't Break".parse::<DefensiveArchetype>().unwrap(), DefensiveArchetype::BendDontBreak);
    }

    #[test]
    fn test_unknown_archetype_falls_back_to_balanced() {
        let (offense, err) = OffensiveArchetype::resolve_or_balanced("wishbone");
        assert_eq!(offense, OffensiveArchetype::Balanced);
        assert_eq!(
            err,
            Some(PlayCallError::UnknownArchetype {
                kind: ArchetypeKind::Offensive,
                key: "wishbone".into()
            })
        );

        let (defense, err) = DefensiveArchetype::resolve_or_balanced("46");
        assert_eq!(defense, DefensiveArchetype::Balanced);
        assert!(err.unwrap().is_recoverable());

        let (defense, err) = DefensiveArchetype::resolve_or_balanced("blitz_heavy");
        assert_eq!(defense, DefensiveArchetype::BlitzHeavy);
        assert!(err.is_none());
    }

    #[test]
    fn test_round_trip_names() {
        for a in OffensiveArchetype::ALL {
            assert_eq!(a.to_string().parse::<OffensiveArchetype>().unwrap(), a);
        }
        for d in DefensiveArchetype::ALL {
            assert_eq!(d.to_string().parse::<DefensiveArchetype>().unwrap(), d);
        }
    }

    #[test]
    fn test_fourth_down_convertible_condition() {
        let limits = ConfigurationLimits::default();
        let classify = |s: GameSituation| ClassifiedSituation::classify(&s, &limits).unwrap();
        let cond = TendencyCondition::FourthDownConvertible;
        let field = &limits.field_position;

        assert!(cond.holds(&classify(GameSituation::new(4, 2, 40)), field));
        assert!(cond.holds(&classify(GameSituation::new(4, 6, 55)), field));
        assert!(!cond.holds(&classify(GameSituation::new(4, 12, 55)), field));
        assert!(!cond.holds(&classify(GameSituation::new(4, 1, 15)), field));
        assert!(!cond.holds(&classify(GameSituation::new(3, 1, 50)), field));
    }

    #[test]
    fn test_condition_serialization_shape() {
        let json = serde_json::to_string(&TendencyCondition::OnDown { down: 3 }).unwrap();
        assert_eq!(json, r#"{"when":"on_down","down":3}"#);
        let back: TendencyCondition = serde_json::from_str(r#"{"when":"always"}"#).unwrap();
        assert_eq!(back, TendencyCondition::Always);
    }
}
