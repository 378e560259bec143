//! Live-game context layer
//!
//! Runs after both archetype layers. The highest-priority superseding flag
//! first pulls the distribution back toward the base prior, then every
//! active flag's deltas are added as one clamped layer, then per-flag
//! ceilings are enforced.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::limits::ModifierCaps;
use crate::situation::{ClassifiedSituation, ContextFlag};
use crate::tendency::{ModifierLayer, PlayType, ProbabilityDistribution, TendencyDeltas};

/// Partial supersession of archetype effects by a game-state flag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Supersede {
    /// Highest priority wins when several superseding flags are active
    pub priority: u8,
    /// Share of the archetype layers' net effect that survives (0..=1)
    pub archetype_retention: f64,
}

/// What one context flag does to the distribution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextRule {
    pub deltas: TendencyDeltas,
    pub supersede: Option<Supersede>,
    /// Upper bound per play type, applied after the deltas
    pub ceilings: BTreeMap<PlayType, f64>,
}

impl ContextRule {
    fn new(deltas: TendencyDeltas) -> Self {
        Self { deltas, ..Self::default() }
    }

    fn superseding(mut self, priority: u8, archetype_retention: f64) -> Self {
        self.supersede = Some(Supersede { priority, archetype_retention });
        self
    }

    fn ceiling(mut self, play: PlayType, max: f64) -> Self {
        self.ceilings.insert(play, max);
        self
    }
}

/// Context flag -> rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextModifierTable {
    rules: BTreeMap<ContextFlag, ContextRule>,
}

impl ContextModifierTable {
    pub fn new(rules: BTreeMap<ContextFlag, ContextRule>) -> Self {
        Self { rules }
    }

    pub fn nfl_default() -> Self {
        let d = TendencyDeltas::NONE;
        let rules = BTreeMap::from([
            (
                ContextFlag::Desperation,
                ContextRule::new(d.pass(0.25).go_for_it(0.15).field_goal(-0.30).punt(-0.30))
                    .superseding(3, 0.5)
                    .ceiling(PlayType::Punt, 0.02),
            ),
            (
                ContextFlag::ProtectLead,
                ContextRule::new(d.run(0.20).field_goal(0.10).go_for_it(-0.15).pass(-0.10))
                    .superseding(2, 0.6),
            ),
            (
                ContextFlag::TwoMinuteDrill,
                ContextRule::new(d.pass(0.30).run(-0.15)).superseding(1, 0.75),
            ),
            (ContextFlag::Blowout, ContextRule::new(d.run(0.05).pass(-0.05))),
            (ContextFlag::CloseGame, ContextRule::new(d.field_goal(0.05).go_for_it(-0.05))),
            (ContextFlag::RedZone, ContextRule::new(d.punt(-0.25).run(0.02))),
            (
                ContextFlag::GoalLine,
                ContextRule::new(d.punt(-0.30).run(0.10).pass(-0.05)).ceiling(PlayType::Punt, 0.01),
            ),
            (ContextFlag::FieldGoalRange, ContextRule::new(d.field_goal(0.15).punt(-0.20))),
            (ContextFlag::DeepTerritory, ContextRule::new(d.punt(0.10).go_for_it(-0.10).field_goal(-0.20))),
        ]);
        Self { rules }
    }

    pub fn get(&self, flag: ContextFlag) -> Option<&ContextRule> {
        self.rules.get(&flag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ContextFlag, &ContextRule)> {
        self.rules.iter()
    }

    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for (flag, rule) in &self.rules {
            if !rule.deltas.is_finite() {
                issues.push(format!("context rule {} has a non-finite delta", flag));
            }
            if let Some(s) = rule.supersede {
                if !(0.0..=1.0).contains(&s.archetype_retention) {
                    issues.push(format!(
                        "context rule {} retention {} outside [0, 1]",
                        flag, s.archetype_retention
                    ));
                }
            }
            for (play, max) in &rule.ceilings {
                if !(0.0..=1.0).contains(max) {
                    issues.push(format!("context rule {} ceiling for {} is {}", flag, play, max));
                }
            }
        }
        issues
    }
}

impl Default for ContextModifierTable {
    fn default() -> Self {
        Self::nfl_default()
    }
}

/// Applies the context layer for one call
pub struct ContextualAdjuster<'a> {
    table: &'a ContextModifierTable,
    caps: &'a ModifierCaps,
}

impl<'a> ContextualAdjuster<'a> {
    pub fn new(table: &'a ContextModifierTable, caps: &'a ModifierCaps) -> Self {
        Self { table, caps }
    }

    /// Highest-priority superseding flag among the active ones. Ties go to
    /// the flag evaluated first.
    pub fn superseding_flag(&self, call: &ClassifiedSituation) -> Option<(ContextFlag, Supersede)> {
        let mut best: Option<(ContextFlag, Supersede)> = None;
        for flag in call.flags.iter() {
            let Some(s) = self.table.get(flag).and_then(|rule| rule.supersede) else {
                continue;
            };
            match best {
                Some((_, b)) if b.priority >= s.priority => {}
                _ => best = Some((flag, s)),
            }
        }
        best
    }

    /// Adjusts `distribution` in place; `baseline` is the base prior for the
    /// situation. Returns the rules that fired.
    pub fn apply(
        &self,
        distribution: &mut ProbabilityDistribution,
        call: &ClassifiedSituation,
        baseline: &ProbabilityDistribution,
    ) -> Vec<String> {
        let mut applied = Vec::new();

        if let Some((flag, s)) = self.superseding_flag(call) {
            let pulled: Vec<(PlayType, f64)> = distribution
                .iter()
                .map(|(play, v)| {
                    let base = baseline.get(play);
                    (play, base + s.archetype_retention * (v - base))
                })
                .collect();
            for (play, v) in pulled {
                distribution.set(play, v);
            }
            applied.push(format!("supersede:{}", flag));
        }

        let mut layer = ModifierLayer::for_situation(self.caps, call.key);
        for flag in call.flags.iter() {
            if let Some(rule) = self.table.get(flag) {
                layer.push(format!("context:{}", flag), &rule.deltas);
            }
        }
        layer.apply_to(distribution);
        applied.extend(layer.applied().iter().cloned());

        for flag in call.flags.iter() {
            let Some(rule) = self.table.get(flag) else {
                continue;
            };
            for (play, max) in &rule.ceilings {
                if distribution.contains(*play) && distribution.get(*play) > *max {
                    distribution.set(*play, *max);
                    applied.push(format!("ceiling:{}:{}", flag, play));
                }
            }
        }

        debug!("context layer {:?} -> {}", applied, distribution);
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::limits::ConfigurationLimits;
    use crate::situation::GameSituation;
    use crate::tendency::BaseTendencyTable;

    fn adjust(
        situation: GameSituation,
        start: Option<ProbabilityDistribution>,
    ) -> (ProbabilityDistribution, Vec<String>) {
        let limits = ConfigurationLimits::default();
        let call = ClassifiedSituation::classify(&situation, &limits).unwrap();
        let base = BaseTendencyTable::nfl_default().lookup(call.key).unwrap().clone();
        let mut dist = start.unwrap_or_else(|| base.clone());
        let table = ContextModifierTable::nfl_default();
        let applied = ContextualAdjuster::new(&table, &limits.modifiers).apply(&mut dist, &call, &base);
        (dist, applied)
    }

    #[test]
    fn test_default_table_covers_every_flag() {
        let table = ContextModifierTable::nfl_default();
        for flag in ContextFlag::EVALUATION_ORDER {
            assert!(table.get(flag).is_some(), "{}", flag);
        }
        assert!(table.issues().is_empty());
    }

    #[test]
    fn test_desperation_supersedes_and_caps_punt() {
        let situation = GameSituation::new(4, 6, 45).with_clock(4, 300).with_score(-16);
        let (dist, applied) = adjust(situation, None);
        assert_eq!(applied[0], "supersede:desperation");
        assert!(applied.contains(&"context:desperation".to_string()));
        assert!(applied.contains(&"ceiling:desperation:punt".to_string()));
        assert!((dist.get(PlayType::Punt) - 0.02).abs() < 1e-12);
        // 0.20 + 0.25 + 0.075
        assert!((dist.get(PlayType::Pass) - 0.525).abs() < 1e-9);
    }

    #[test]
    fn test_retention_pulls_archetype_effect_toward_base() {
        // Two-minute drill keeps 75% of the archetype shift
        let situation = GameSituation::new(2, 5, 40).with_clock(2, 100).with_score(-7);
        let shifted = ProbabilityDistribution::from_entries([(PlayType::Run, 0.25), (PlayType::Pass, 0.75)]);
        let (dist, applied) = adjust(situation, Some(shifted));
        assert_eq!(applied, ["supersede:two_minute_drill", "context:two_minute_drill"]);
        // base run .45: .45 + .75 * (.25 - .45) = .30, then -.15
        assert!((dist.get(PlayType::Run) - 0.15).abs() < 1e-9);
        assert!((dist.get(PlayType::Pass) - 1.00).abs() < 1e-9);
    }

    #[test]
    fn test_highest_priority_flag_supersedes() {
        let limits = ConfigurationLimits::default();
        let table = ContextModifierTable::nfl_default();
        let adjuster = ContextualAdjuster::new(&table, &limits.modifiers);

        let both = GameSituation::new(1, 10, 30).with_clock(4, 100).with_score(-20);
        let call = ClassifiedSituation::classify(&both, &limits).unwrap();
        assert!(call.flags.contains(ContextFlag::TwoMinuteDrill));
        let (flag, s) = adjuster.superseding_flag(&call).unwrap();
        assert_eq!(flag, ContextFlag::Desperation);
        assert_eq!(s.archetype_retention, 0.5);

        let calm = GameSituation::new(1, 10, 30);
        let call = ClassifiedSituation::classify(&calm, &limits).unwrap();
        assert!(adjuster.superseding_flag(&call).is_none());
    }

    #[test]
    fn test_goal_line_clamps_punt_to_ceiling() {
        let (dist, applied) = adjust(GameSituation::new(4, 1, 97), None);
        // RedZone and GoalLine together exceed the rule cap but not the layer cap
        assert!((dist.get(PlayType::Punt) - (0.25 - 0.55)).abs() < 1e-9);
        assert!(!applied.iter().any(|a| a.starts_with("ceiling")));
        assert_eq!(applied, ["context:close_game", "context:red_zone", "context:goal_line"]);
    }

    #[test]
    fn test_first_down_ignores_kick_deltas() {
        let (dist, _) = adjust(GameSituation::new(1, 10, 70), None);
        assert!(!dist.contains(PlayType::FieldGoal));
        assert!(!dist.contains(PlayType::Punt));
    }

    #[test]
    fn test_bad_retention_reported() {
        let mut rules: BTreeMap<_, _> =
            ContextModifierTable::nfl_default().iter().map(|(f, r)| (*f, r.clone())).collect();
        if let Some(rule) = rules.get_mut(&ContextFlag::ProtectLead) {
            rule.supersede = Some(Supersede { priority: 2, archetype_retention: 1.5 });
        }
        let issues = ContextModifierTable::new(rules).issues();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("protect_lead"));
    }
}
