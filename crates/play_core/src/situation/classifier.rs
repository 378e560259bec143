//! Down/distance and field position bucketing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::limits::{FieldPositionThresholds, YardageThresholds};
use crate::error::{PlayCallError, Result};

/// Distance bucket for the yards still needed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceBucket {
    Short,
    Medium,
    Long,
}

impl DistanceBucket {
    pub const ALL: [DistanceBucket; 3] =
        [DistanceBucket::Short, DistanceBucket::Medium, DistanceBucket::Long];

    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceBucket::Short => "short",
            DistanceBucket::Medium => "medium",
            DistanceBucket::Long => "long",
        }
    }
}

/// Discrete down-and-distance bucket, rendered as `"3rd_and_long"`.
///
/// First down with a long bucket is the ordinary series start and renders as
/// `"1st_and_10"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SituationKey {
    down: u8,
    distance: DistanceBucket,
}

impl SituationKey {
    pub const FIRST_AND_SHORT: SituationKey = SituationKey { down: 1, distance: DistanceBucket::Short };
    pub const FIRST_AND_MEDIUM: SituationKey = SituationKey { down: 1, distance: DistanceBucket::Medium };
    pub const FIRST_AND_10: SituationKey = SituationKey { down: 1, distance: DistanceBucket::Long };
    pub const SECOND_AND_SHORT: SituationKey = SituationKey { down: 2, distance: DistanceBucket::Short };
    pub const SECOND_AND_MEDIUM: SituationKey = SituationKey { down: 2, distance: DistanceBucket::Medium };
    pub const SECOND_AND_LONG: SituationKey = SituationKey { down: 2, distance: DistanceBucket::Long };
    pub const THIRD_AND_SHORT: SituationKey = SituationKey { down: 3, distance: DistanceBucket::Short };
    pub const THIRD_AND_MEDIUM: SituationKey = SituationKey { down: 3, distance: DistanceBucket::Medium };
    pub const THIRD_AND_LONG: SituationKey = SituationKey { down: 3, distance: DistanceBucket::Long };
    pub const FOURTH_AND_SHORT: SituationKey = SituationKey { down: 4, distance: DistanceBucket::Short };
    pub const FOURTH_AND_MEDIUM: SituationKey = SituationKey { down: 4, distance: DistanceBucket::Medium };
    pub const FOURTH_AND_LONG: SituationKey = SituationKey { down: 4, distance: DistanceBucket::Long };

    pub fn new(down: u8, distance: DistanceBucket) -> Result<Self> {
        if !(1..=4).contains(&down) {
            return Err(PlayCallError::InvalidSituation(format!("down must be 1-4, got {}", down)));
        }
        Ok(Self { down, distance })
    }

    pub fn down(&self) -> u8 {
        self.down
    }

    pub fn distance(&self) -> DistanceBucket {
        self.distance
    }

    pub fn is_fourth_down(&self) -> bool {
        self.down == 4
    }

    /// Every key the classifier can produce
    pub fn all() -> [SituationKey; 12] {
        [
            Self::FIRST_AND_SHORT,
            Self::FIRST_AND_MEDIUM,
            Self::FIRST_AND_10,
            Self::SECOND_AND_SHORT,
            Self::SECOND_AND_MEDIUM,
            Self::SECOND_AND_LONG,
            Self::THIRD_AND_SHORT,
            Self::THIRD_AND_MEDIUM,
            Self::THIRD_AND_LONG,
            Self::FOURTH_AND_SHORT,
            Self::FOURTH_AND_MEDIUM,
            Self::FOURTH_AND_LONG,
        ]
    }

    fn ordinal(down: u8) -> &'static str {
        match down {
            1 => "1st",
            2 => "2nd",
            3 => "3rd",
            _ => "4th",
        }
    }
}

impl fmt::Display for SituationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.down == 1 && self.distance == DistanceBucket::Long {
            return f.write_str("1st_and_10");
        }
        write!(f, "{}_and_{}", Self::ordinal(self.down), self.distance.as_str())
    }
}

impl FromStr for SituationKey {
    type Err = PlayCallError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || PlayCallError::InvalidSituation(format!("unknown situation key '{}'", s));
        let (ordinal, bucket) = s.split_once("_and_").ok_or_else(invalid)?;
        let down = match ordinal {
            "1st" => 1,
            "2nd" => 2,
            "3rd" => 3,
            "4th" => 4,
            _ => return Err(invalid()),
        };
        let distance = match (down, bucket) {
            (1, "10") => DistanceBucket::Long,
            (_, "short") => DistanceBucket::Short,
            (_, "medium") => DistanceBucket::Medium,
            (d, "long") if d != 1 => DistanceBucket::Long,
            _ => return Err(invalid()),
        };
        SituationKey::new(down, distance)
    }
}

impl TryFrom<String> for SituationKey {
    type Error = PlayCallError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SituationKey> for String {
    fn from(key: SituationKey) -> Self {
        key.to_string()
    }
}

/// Field position band used by archetype field-position modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldPositionBand {
    /// At or inside the deep territory line
    OwnDeep,
    /// Own side of midfield, outside deep territory
    OwnTerritory,
    /// Opponent side, short of field goal range
    Midfield,
    FieldGoalRange,
    RedZone,
    GoalLine,
}

impl FieldPositionBand {
    pub const ALL: [FieldPositionBand; 6] = [
        FieldPositionBand::OwnDeep,
        FieldPositionBand::OwnTerritory,
        FieldPositionBand::Midfield,
        FieldPositionBand::FieldGoalRange,
        FieldPositionBand::RedZone,
        FieldPositionBand::GoalLine,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldPositionBand::OwnDeep => "own_deep",
            FieldPositionBand::OwnTerritory => "own_territory",
            FieldPositionBand::Midfield => "midfield",
            FieldPositionBand::FieldGoalRange => "field_goal_range",
            FieldPositionBand::RedZone => "red_zone",
            FieldPositionBand::GoalLine => "goal_line",
        }
    }
}

impl fmt::Display for FieldPositionBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reduces raw down/distance/field position into discrete keys
#[derive(Debug, Clone)]
pub struct SituationClassifier {
    yardage: YardageThresholds,
    field: FieldPositionThresholds,
}

impl SituationClassifier {
    pub fn new(yardage: YardageThresholds, field: FieldPositionThresholds) -> Self {
        Self { yardage, field }
    }

    pub fn classify(&self, down: u8, yards_to_go: i32) -> Result<SituationKey> {
        if yards_to_go < 0 {
            return Err(PlayCallError::InvalidSituation(format!(
                "yards_to_go must be non-negative, got {}",
                yards_to_go
            )));
        }
        SituationKey::new(down, self.bucket(yards_to_go))
    }

    pub fn bucket(&self, yards_to_go: i32) -> DistanceBucket {
        if yards_to_go <= self.yardage.short_max {
            DistanceBucket::Short
        } else if yards_to_go <= self.yardage.medium_max {
            DistanceBucket::Medium
        } else {
            DistanceBucket::Long
        }
    }

    pub fn band(&self, field_position: i32) -> FieldPositionBand {
        let f = &self.field;
        if field_position >= f.goal_line_min {
            FieldPositionBand::GoalLine
        } else if field_position >= f.red_zone_min {
            FieldPositionBand::RedZone
        } else if field_position >= f.field_goal_range_min {
            FieldPositionBand::FieldGoalRange
        } else if field_position >= 50 {
            FieldPositionBand::Midfield
        } else if field_position > f.deep_territory_max {
            FieldPositionBand::OwnTerritory
        } else {
            FieldPositionBand::OwnDeep
        }
    }
}

impl Default for SituationClassifier {
    fn default() -> Self {
        Self::new(YardageThresholds::default(), FieldPositionThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_buckets() {
        let c = SituationClassifier::default();
        assert_eq!(c.classify(1, 10).unwrap().to_string(), "1st_and_10");
        assert_eq!(c.classify(3, 8).unwrap().to_string(), "3rd_and_long");
        assert_eq!(c.classify(3, 7).unwrap().to_string(), "3rd_and_medium");
        assert_eq!(c.classify(2, 4).unwrap().to_string(), "2nd_and_medium");
        assert_eq!(c.classify(4, 3).unwrap().to_string(), "4th_and_short");
        assert_eq!(c.classify(4, 0).unwrap().to_string(), "4th_and_short");
        assert_eq!(c.classify(1, 2).unwrap().to_string(), "1st_and_short");
        assert_eq!(c.classify(1, 25).unwrap().to_string(), "1st_and_10");
    }

    #[test]
    fn test_invalid_down_and_distance() {
        let c = SituationClassifier::default();
        assert!(matches!(c.classify(0, 10), Err(PlayCallError::InvalidSituation(_))));
        assert!(matches!(c.classify(5, 10), Err(PlayCallError::InvalidSituation(_))));
        assert!(matches!(c.classify(2, -1), Err(PlayCallError::InvalidSituation(_))));
    }

    #[test]
    fn test_key_round_trips_through_string() {
        for key in SituationKey::all() {
            let parsed: SituationKey = key.to_string().parse().unwrap();
            assert_eq!(parsed, key);
        }
        assert_eq!(SituationKey::all().len(), 12);
    }

    #[test]
    fn test_rejects_malformed_keys() {
        assert!("1st_and_long".parse::<SituationKey>().is_err());
        assert!("5th_and_short".parse::<SituationKey>().is_err());
        assert!("2nd_and_10".parse::<SituationKey>().is_err());
        assert!("goal_to_go".parse::<SituationKey>().is_err());
    }

    #[test]
    fn test_key_serializes_as_string() {
        let key: SituationKey = "3rd_and_long".parse().unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"3rd_and_long\"");
        let back: SituationKey = serde_json::from_str("\"4th_and_medium\"").unwrap();
        assert_eq!(back.down(), 4);
        assert_eq!(back.distance(), DistanceBucket::Medium);
    }

    #[test]
    fn test_field_position_bands() {
        let c = SituationClassifier::default();
        assert_eq!(c.band(0), FieldPositionBand::OwnDeep);
        assert_eq!(c.band(20), FieldPositionBand::OwnDeep);
        assert_eq!(c.band(21), FieldPositionBand::OwnTerritory);
        assert_eq!(c.band(40), FieldPositionBand::OwnTerritory);
        assert_eq!(c.band(50), FieldPositionBand::Midfield);
        assert_eq!(c.band(60), FieldPositionBand::FieldGoalRange);
        assert_eq!(c.band(79), FieldPositionBand::FieldGoalRange);
        assert_eq!(c.band(80), FieldPositionBand::RedZone);
        assert_eq!(c.band(94), FieldPositionBand::RedZone);
        assert_eq!(c.band(95), FieldPositionBand::GoalLine);
        assert_eq!(c.band(100), FieldPositionBand::GoalLine);
    }
}
