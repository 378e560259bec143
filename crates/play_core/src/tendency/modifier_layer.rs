use super::{PlayType, ProbabilityDistribution, TendencyDeltas};
use crate::config::limits::ModifierCaps;
use crate::situation::SituationKey;

/// Accumulates the deltas of one modifier layer.
///
/// Every rule component is clamped to `rule_cap` when it is pushed and the
/// running total of each play type is clamped to `layer_cap` after every
/// push, so push order decides which rule saturates first.
#[derive(Clone, Debug)]
pub struct ModifierLayer {
    rule_cap: f64,
    layer_cap: f64,
    fourth_down: bool,
    totals: [f64; 4],
    applied: Vec<String>,
}

impl ModifierLayer {
    pub fn new(rule_cap: f64, layer_cap: f64, fourth_down: bool) -> Self {
        Self { rule_cap, layer_cap, fourth_down, totals: [0.0; 4], applied: Vec::new() }
    }

    /// Layer sized by the configured caps for one situation
    pub fn for_situation(caps: &ModifierCaps, key: SituationKey) -> Self {
        Self::new(caps.max_situation_modifier, caps.max_layer_modifier, key.is_fourth_down())
    }

    pub fn push(&mut self, source: impl Into<String>, deltas: &TendencyDeltas) {
        if deltas.is_zero() {
            return;
        }
        for (play, delta) in deltas.resolve(self.fourth_down, self.rule_cap) {
            let slot = &mut self.totals[Self::slot(play)];
            *slot = (*slot + delta).clamp(-self.layer_cap, self.layer_cap);
        }
        self.applied.push(source.into());
    }

    pub fn total(&self, play: PlayType) -> f64 {
        self.totals[Self::slot(play)]
    }

    /// Names of the rules that contributed, in push order
    pub fn applied(&self) -> &[String] {
        &self.applied
    }

    pub fn apply_to(&self, distribution: &mut ProbabilityDistribution) {
        for play in PlayType::ALL {
            distribution.add(play, self.total(play));
        }
    }

    fn slot(play: PlayType) -> usize {
        match play {
            PlayType::Run => 0,
            PlayType::Pass => 1,
            PlayType::Punt => 2,
            PlayType::FieldGoal => 3,
        }
    }
}
