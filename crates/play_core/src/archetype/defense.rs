//! Defensive scheme counters.
//!
//! A counter only sees the distribution handed to it and the situation key;
//! it never reads the offensive tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::DefensiveArchetype;
use crate::config::limits::ModifierCaps;
use crate::situation::SituationKey;
use crate::tendency::{ModifierLayer, ProbabilityDistribution, TendencyDeltas};

/// How the offense adjusts against one defensive scheme
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefensiveCounterTable {
    /// Applied in every situation
    pub base: TendencyDeltas,
    pub by_situation: BTreeMap<SituationKey, TendencyDeltas>,
}

impl DefensiveCounterTable {
    pub const fn neutral() -> Self {
        Self { base: TendencyDeltas::NONE, by_situation: BTreeMap::new() }
    }

    pub fn for_archetype(archetype: DefensiveArchetype) -> Self {
        let d = TendencyDeltas::NONE;
        match archetype {
            // Pressure leaves the middle open for quick throws
            DefensiveArchetype::BlitzHeavy => Self {
                base: d.pass(0.05).run(-0.02),
                by_situation: BTreeMap::from([(SituationKey::THIRD_AND_LONG, d.pass(0.04).run(-0.04))]),
            },
            DefensiveArchetype::RunStuffing => Self {
                base: d.pass(0.08).run(-0.10),
                by_situation: BTreeMap::from([
                    (SituationKey::FOURTH_AND_SHORT, d.run(-0.05).pass(0.03)),
                    (SituationKey::THIRD_AND_SHORT, d.run(-0.05).pass(0.05)),
                ]),
            },
            DefensiveArchetype::ZoneCoverage => Self { base: d.run(0.05).pass(-0.03), by_situation: BTreeMap::new() },
            DefensiveArchetype::ManCoverage => Self {
                base: d.pass(0.04),
                by_situation: BTreeMap::from([(SituationKey::THIRD_AND_MEDIUM, d.pass(0.03))]),
            },
            DefensiveArchetype::BendDontBreak => Self {
                base: d.run(0.05).pass(-0.02),
                by_situation: BTreeMap::from([(SituationKey::FOURTH_AND_SHORT, d.go_for_it(0.05))]),
            },
            DefensiveArchetype::Balanced => Self::neutral(),
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.base.is_zero() && self.by_situation.is_empty()
    }

    pub fn issues(&self, archetype: DefensiveArchetype) -> Vec<String> {
        let mut issues = Vec::new();
        if !self.base.is_finite() {
            issues.push(format!("{} defense base counter has a non-finite delta", archetype));
        }
        for (key, deltas) in &self.by_situation {
            if !deltas.is_finite() {
                issues.push(format!("{} defense counter for {} has a non-finite delta", archetype, key));
            }
        }
        issues
    }
}

/// Applies a defensive counter table as one clamped layer (base, then the
/// situation entry)
pub struct DefensiveArchetypeCounter<'a> {
    caps: &'a ModifierCaps,
}

impl<'a> DefensiveArchetypeCounter<'a> {
    pub fn new(caps: &'a ModifierCaps) -> Self {
        Self { caps }
    }

    pub fn apply(
        &self,
        distribution: &mut ProbabilityDistribution,
        table: &DefensiveCounterTable,
        key: SituationKey,
    ) -> Vec<String> {
        let mut layer = ModifierLayer::for_situation(self.caps, key);
        layer.push("counter:base", &table.base);
        if let Some(deltas) = table.by_situation.get(&key) {
            layer.push(format!("counter:{}", key), deltas);
        }
        layer.apply_to(distribution);
        debug!("defense layer {:?} -> {}", layer.applied(), distribution);
        layer.applied().to_vec()
    }
}
