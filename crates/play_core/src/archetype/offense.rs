//! Offensive philosophy modifiers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::{NamedTendency, OffensiveArchetype, TendencyCondition};
use crate::config::limits::ConfigurationLimits;
use crate::situation::{ClassifiedSituation, ContextFlag, FieldPositionBand, SituationKey};
use crate::tendency::{ModifierLayer, ProbabilityDistribution, TendencyDeltas};

/// Everything one offensive archetype adds to the base prior
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffensiveModifierTable {
    pub situation_modifiers: BTreeMap<SituationKey, TendencyDeltas>,
    pub field_position_modifiers: BTreeMap<FieldPositionBand, TendencyDeltas>,
    pub game_situation_modifiers: BTreeMap<ContextFlag, TendencyDeltas>,
    pub custom_tendencies: Vec<NamedTendency>,
}

impl OffensiveModifierTable {
    /// Table that changes nothing
    pub const fn neutral() -> Self {
        Self {
            situation_modifiers: BTreeMap::new(),
            field_position_modifiers: BTreeMap::new(),
            game_situation_modifiers: BTreeMap::new(),
            custom_tendencies: Vec::new(),
        }
    }

    /// Default table for `archetype`
    pub fn for_archetype(archetype: OffensiveArchetype) -> Self {
        let d = TendencyDeltas::NONE;
        match archetype {
            OffensiveArchetype::Conservative => Self {
                situation_modifiers: BTreeMap::from([
                    (SituationKey::FOURTH_AND_SHORT, d.go_for_it(-0.15).punt(0.08).field_goal(0.07)),
                    (SituationKey::FOURTH_AND_MEDIUM, d.go_for_it(-0.10).punt(0.05).field_goal(0.05)),
                    (SituationKey::FOURTH_AND_LONG, d.go_for_it(-0.05).punt(0.05)),
                    (SituationKey::THIRD_AND_LONG, d.run(0.05).pass(-0.05)),
                ]),
                field_position_modifiers: BTreeMap::from([
                    (FieldPositionBand::OwnDeep, d.punt(0.10).run(0.05).pass(-0.05)),
                    (FieldPositionBand::OwnTerritory, d.punt(0.08).field_goal(0.04).go_for_it(-0.04)),
                    (FieldPositionBand::FieldGoalRange, d.field_goal(0.10).go_for_it(-0.05)),
                ]),
                game_situation_modifiers: BTreeMap::from([(
                    ContextFlag::ProtectLead,
                    d.run(0.10).pass(-0.10),
                )]),
                custom_tendencies: vec![NamedTendency::new(
                    "ball_control",
                    TendencyCondition::Always,
                    d.run(0.05).pass(-0.05),
                )],
            },
            OffensiveArchetype::Aggressive => Self {
                situation_modifiers: BTreeMap::from([
                    (SituationKey::FOURTH_AND_SHORT, d.go_for_it(0.20).punt(-0.10).field_goal(-0.10)),
                    (SituationKey::FOURTH_AND_MEDIUM, d.go_for_it(0.12).punt(-0.08).field_goal(-0.04)),
                    (SituationKey::SECOND_AND_SHORT, d.pass(0.08).run(-0.08)),
                ]),
                field_position_modifiers: BTreeMap::from([
                    (FieldPositionBand::RedZone, d.pass(0.10).run(-0.05)),
                    (FieldPositionBand::GoalLine, d.pass(0.05)),
                    (FieldPositionBand::Midfield, d.go_for_it(0.05).punt(-0.05)),
                    (FieldPositionBand::OwnTerritory, d.go_for_it(0.05).punt(-0.05)),
                ]),
                game_situation_modifiers: BTreeMap::from([
                    (ContextFlag::TwoMinuteDrill, d.pass(0.05)),
                    (ContextFlag::Desperation, d.go_for_it(0.05)),
                ]),
                custom_tendencies: vec![NamedTendency::new(
                    "fourth_down_conviction",
                    TendencyCondition::FourthDownConvertible,
                    d.field_goal(-0.05).go_for_it(0.05),
                )],
            },
            OffensiveArchetype::WestCoast => Self {
                situation_modifiers: BTreeMap::from([
                    (SituationKey::THIRD_AND_MEDIUM, d.pass(0.05).run(-0.03)),
                    (SituationKey::SECOND_AND_LONG, d.pass(0.04)),
                ]),
                field_position_modifiers: BTreeMap::from([(FieldPositionBand::RedZone, d.pass(0.05))]),
                game_situation_modifiers: BTreeMap::from([(ContextFlag::TwoMinuteDrill, d.pass(0.05))]),
                custom_tendencies: vec![NamedTendency::new(
                    "short_passing_game",
                    TendencyCondition::Always,
                    d.pass(0.08).run(-0.05),
                )],
            },
            OffensiveArchetype::RunHeavy => Self {
                situation_modifiers: BTreeMap::from([
                    (SituationKey::FIRST_AND_SHORT, d.run(0.08)),
                    (SituationKey::SECOND_AND_SHORT, d.run(0.08)),
                    (SituationKey::THIRD_AND_SHORT, d.run(0.10).pass(-0.10)),
                    (SituationKey::FOURTH_AND_SHORT, d.run(0.12).pass(-0.05)),
                ]),
                field_position_modifiers: BTreeMap::from([
                    (FieldPositionBand::GoalLine, d.run(0.10).pass(-0.05)),
                    (FieldPositionBand::RedZone, d.run(0.05)),
                ]),
                game_situation_modifiers: BTreeMap::from([(ContextFlag::ProtectLead, d.run(0.05))]),
                custom_tendencies: vec![NamedTendency::new(
                    "power_emphasis",
                    TendencyCondition::Always,
                    d.run(0.15).pass(-0.15),
                )],
            },
            OffensiveArchetype::AirRaid => Self {
                situation_modifiers: BTreeMap::from([
                    (SituationKey::THIRD_AND_LONG, d.pass(0.08).run(-0.08)),
                    (SituationKey::SECOND_AND_LONG, d.pass(0.06)),
                ]),
                field_position_modifiers: BTreeMap::from([(FieldPositionBand::Midfield, d.pass(0.05))]),
                game_situation_modifiers: BTreeMap::from([(ContextFlag::TwoMinuteDrill, d.pass(0.08))]),
                custom_tendencies: vec![NamedTendency::new(
                    "vertical_passing",
                    TendencyCondition::Always,
                    d.pass(0.15).run(-0.12),
                )],
            },
            OffensiveArchetype::Balanced => Self::neutral(),
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.situation_modifiers.is_empty()
            && self.field_position_modifiers.is_empty()
            && self.game_situation_modifiers.is_empty()
            && self.custom_tendencies.is_empty()
    }

    /// Non-finite deltas and malformed conditions, one message each
    pub fn issues(&self, archetype: OffensiveArchetype) -> Vec<String> {
        let mut issues = Vec::new();
        let mut check = |source: String, deltas: &TendencyDeltas| {
            if !deltas.is_finite() {
                issues.push(format!("{} offense {} has a non-finite delta", archetype, source));
            }
        };
        for (key, deltas) in &self.situation_modifiers {
            check(format!("situation {}", key), deltas);
        }
        for (band, deltas) in &self.field_position_modifiers {
            check(format!("band {}", band), deltas);
        }
        for (flag, deltas) in &self.game_situation_modifiers {
            check(format!("flag {}", flag), deltas);
        }
        for tendency in &self.custom_tendencies {
            check(format!("tendency {}", tendency.name), &tendency.deltas);
        }
        for tendency in &self.custom_tendencies {
            if let TendencyCondition::OnDown { down } = tendency.condition {
                if !(1..=4).contains(&down) {
                    issues.push(format!(
                        "{} offense tendency {} keys on down {}",
                        archetype, tendency.name, down
                    ));
                }
            }
        }
        issues
    }
}

/// Applies one offensive table as a single clamped modifier layer.
///
/// Push order: custom tendencies, situation, field position band, then game
/// flags in evaluation order.
pub struct OffensiveArchetypeModifier<'a> {
    limits: &'a ConfigurationLimits,
}

impl<'a> OffensiveArchetypeModifier<'a> {
    pub fn new(limits: &'a ConfigurationLimits) -> Self {
        Self { limits }
    }

    /// Adds the table's deltas to `distribution` and returns the rules that
    /// fired
    pub fn apply(
        &self,
        distribution: &mut ProbabilityDistribution,
        table: &OffensiveModifierTable,
        call: &ClassifiedSituation,
    ) -> Vec<String> {
        let mut layer = ModifierLayer::for_situation(&self.limits.modifiers, call.key);

        for tendency in &table.custom_tendencies {
            if tendency.condition.holds(call, &self.limits.field_position) {
                layer.push(format!("custom:{}", tendency.name), &tendency.deltas);
            }
        }
        if let Some(deltas) = table.situation_modifiers.get(&call.key) {
            layer.push(format!("situation:{}", call.key), deltas);
        }
        if let Some(deltas) = table.field_position_modifiers.get(&call.band) {
            layer.push(format!("band:{}", call.band), deltas);
        }
        for flag in call.flags.iter() {
            if let Some(deltas) = table.game_situation_modifiers.get(&flag) {
                layer.push(format!("game:{}", flag), deltas);
            }
        }

        layer.apply_to(distribution);
        debug!("offense layer {:?} -> {}", layer.applied(), distribution);
        layer.applied().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::situation::GameSituation;
    use crate::tendency::{BaseTendencyTable, PlayType};

    fn run_layer(
        archetype: OffensiveArchetype,
        situation: GameSituation,
    ) -> (ProbabilityDistribution, ProbabilityDistribution, Vec<String>) {
        let limits = ConfigurationLimits::default();
        let call = ClassifiedSituation::classify(&situation, &limits).unwrap();
        let base = BaseTendencyTable::nfl_default().lookup(call.key).unwrap().clone();
        let mut dist = base.clone();
        let table = OffensiveModifierTable::for_archetype(archetype);
        let applied = OffensiveArchetypeModifier::new(&limits).apply(&mut dist, &table, &call);
        (base, dist, applied)
    }

    #[test]
    fn test_balanced_is_neutral() {
        assert!(OffensiveModifierTable::for_archetype(OffensiveArchetype::Balanced).is_neutral());
        let (base, after, applied) = run_layer(OffensiveArchetype::Balanced, GameSituation::new(4, 2, 40));
        assert_eq!(base, after);
        assert!(applied.is_empty());
    }

    #[test]
    fn test_fourth_down_go_for_it_ordering() {
        let situation = GameSituation::new(4, 2, 40);
        let (base, aggressive, _) = run_layer(OffensiveArchetype::Aggressive, situation);
        let (_, conservative, _) = run_layer(OffensiveArchetype::Conservative, situation);

        assert!(aggressive.go_for_it_probability() > base.go_for_it_probability());
        assert!(conservative.go_for_it_probability() < base.go_for_it_probability());
        assert!(conservative.get(PlayType::Punt) > base.get(PlayType::Punt));
        assert!(aggressive.get(PlayType::FieldGoal) < base.get(PlayType::FieldGoal));
    }

    #[test]
    fn test_run_heavy_goal_line_stack() {
        let (_, after, applied) = run_layer(OffensiveArchetype::RunHeavy, GameSituation::new(4, 1, 97));
        assert!((after.get(PlayType::Run) - 0.67).abs() < 1e-9);
        assert!((after.get(PlayType::Pass) + 0.10).abs() < 1e-9);
        assert_eq!(applied, ["custom:power_emphasis", "situation:4th_and_short", "band:goal_line"]);
    }

    #[test]
    fn test_go_for_it_has_no_effect_before_fourth_down() {
        // Aggressive's midfield rule is pure go-for-it/punt
        let (base, after, applied) = run_layer(OffensiveArchetype::Aggressive, GameSituation::new(1, 10, 55));
        assert_eq!(base, after);
        assert_eq!(applied, ["band:midfield"]);
    }

    #[test]
    fn test_game_flags_follow_evaluation_order() {
        let late = GameSituation::new(2, 6, 30).with_clock(4, 100).with_score(-17);
        let (_, _, applied) = run_layer(OffensiveArchetype::Aggressive, late);
        assert_eq!(applied, ["band:own_territory", "game:desperation", "game:two_minute_drill"]);
    }

    #[test]
    fn test_air_raid_third_and_long() {
        let (_, after, _) = run_layer(OffensiveArchetype::AirRaid, GameSituation::new(3, 12, 30));
        assert!((after.get(PlayType::Pass) - 0.98).abs() < 1e-9);
        assert!((after.get(PlayType::Run) - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_default_tables_are_clean() {
        for archetype in OffensiveArchetype::ALL {
            let table = OffensiveModifierTable::for_archetype(archetype);
            assert!(table.issues(archetype).is_empty(), "{}", archetype);
        }
    }

    #[test]
    fn test_non_finite_delta_reported() {
        let mut table = OffensiveModifierTable::for_archetype(OffensiveArchetype::WestCoast);
        table.custom_tendencies[0].deltas.pass = f64::NAN;
        table.custom_tendencies.push(NamedTendency::new(
            "fifth_down",
            TendencyCondition::OnDown { down: 5 },
            TendencyDeltas::NONE.run(0.01),
        ));
        let issues = table.issues(OffensiveArchetype::WestCoast);
        assert_eq!(issues.len(), 2, "{:?}", issues);
        assert!(issues[0].contains("short_passing_game"));
    }
}
