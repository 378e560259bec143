//! Play-calling pipeline
//!
//! ## Pipeline
//!
//! ```text
//! GameSituation -> classify -> base prior -> offense layer -> defense layer
//!     -> context layer -> overrides -> normalize -> draw
//! ```
//!
//! Every stage is synchronous and reads only the immutable configuration,
//! so one engine can serve any number of threads. Each call owns its RNG.

pub mod context_adjuster;
pub mod overrides;
pub mod probability_validator;
pub mod selector;

pub use context_adjuster::{ContextModifierTable, ContextRule, ContextualAdjuster, Supersede};
pub use overrides::{DecisionOverride, DecisionOverrideManager};
pub use probability_validator::ProbabilityValidator;
pub use selector::PlaySelector;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::archetype::{
    DefensiveArchetype, DefensiveArchetypeCounter, DefensiveCounterTable, OffensiveArchetype,
    OffensiveArchetypeModifier, OffensiveModifierTable,
};
use crate::config::{ConfigurationStore, DEFAULT_CONFIG};
use crate::error::{ArchetypeKind, PlayCallError, Result};
use crate::situation::{ClassifiedSituation, ContextFlags, FieldPositionBand, GameSituation, SituationKey};
use crate::tendency::{PlayType, ProbabilityDistribution};

/// Batches at or below this size are evaluated on the calling thread
const PARALLEL_BATCH_THRESHOLD: usize = 32;

/// Distribution after every stage, plus the rules each stage fired
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTrace {
    pub base: ProbabilityDistribution,
    pub after_offense: ProbabilityDistribution,
    pub after_defense: ProbabilityDistribution,
    pub after_context: ProbabilityDistribution,
    pub after_overrides: ProbabilityDistribution,
    pub offense_rules: Vec<String>,
    pub defense_rules: Vec<String>,
    pub context_rules: Vec<String>,
    pub overrides: Vec<DecisionOverride>,
}

/// Final distribution for one situation, before the draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub situation_key: SituationKey,
    pub field_position_band: FieldPositionBand,
    pub flags: ContextFlags,
    pub offense: OffensiveArchetype,
    pub defense: DefensiveArchetype,
    /// Normalized: sums to 1.0, every entry inside the probability bounds
    pub distribution: ProbabilityDistribution,
    /// Recoverable problems hit while evaluating
    pub warnings: Vec<String>,
    /// The layered distribution was degenerate and the base prior was used
    pub fallback_used: bool,
    pub trace: DecisionTrace,
}

impl Evaluation {
    pub fn probability(&self, play: PlayType) -> f64 {
        self.distribution.get(play)
    }
}

/// A drawn play and the evaluation it was drawn from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayCallDecision {
    pub play: PlayType,
    #[serde(flatten)]
    pub evaluation: Evaluation,
}

/// One entry of a batch call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub situation: GameSituation,
    #[serde(default)]
    pub offense: OffensiveArchetype,
    #[serde(default)]
    pub defense: DefensiveArchetype,
}

impl DecisionRequest {
    pub fn new(situation: GameSituation, offense: OffensiveArchetype, defense: DefensiveArchetype) -> Self {
        Self { situation, offense, defense }
    }
}

/// Stateless play caller over a validated configuration
#[derive(Debug, Clone)]
pub struct PlayCallEngine {
    config: ConfigurationStore,
}

impl PlayCallEngine {
    /// Validates `config`; an engine never runs on a store that failed
    pub fn new(config: ConfigurationStore) -> Result<Self> {
        config.validate_configuration()?;
        Ok(Self { config })
    }

    /// Engine over the process-wide default store
    pub fn with_defaults() -> Result<Self> {
        Self::new(DEFAULT_CONFIG.clone())
    }

    pub fn config(&self) -> &ConfigurationStore {
        &self.config
    }

    /// Runs every layer and normalizes, without drawing
    pub fn evaluate(
        &self,
        situation: &GameSituation,
        offense: OffensiveArchetype,
        defense: DefensiveArchetype,
    ) -> Result<Evaluation> {
        self.evaluate_with_warnings(situation, offense, defense, Vec::new())
    }

    /// Like [`evaluate`](Self::evaluate) with archetypes given by name.
    /// Unknown names fall back to Balanced and are reported as warnings.
    pub fn evaluate_named(&self, situation: &GameSituation, offense: &str, defense: &str) -> Result<Evaluation> {
        let mut warnings = Vec::new();
        let (offense, err) = OffensiveArchetype::resolve_or_balanced(offense);
        warnings.extend(err.map(|e| e.to_string()));
        let (defense, err) = DefensiveArchetype::resolve_or_balanced(defense);
        warnings.extend(err.map(|e| e.to_string()));
        self.evaluate_with_warnings(situation, offense, defense, warnings)
    }

    pub fn decide<R: Rng + ?Sized>(
        &self,
        situation: &GameSituation,
        offense: OffensiveArchetype,
        defense: DefensiveArchetype,
        rng: &mut R,
    ) -> Result<PlayCallDecision> {
        let evaluation = self.evaluate(situation, offense, defense)?;
        self.draw(evaluation, rng)
    }

    pub fn decide_named<R: Rng + ?Sized>(
        &self,
        situation: &GameSituation,
        offense: &str,
        defense: &str,
        rng: &mut R,
    ) -> Result<PlayCallDecision> {
        let evaluation = self.evaluate_named(situation, offense, defense)?;
        self.draw(evaluation, rng)
    }

    /// Decides every request. Request `i` draws from
    /// [`request_rng(seed, i)`](Self::request_rng), so the output matches a
    /// sequential loop regardless of thread count.
    pub fn decide_batch(&self, requests: &[DecisionRequest], seed: u64) -> Vec<Result<PlayCallDecision>> {
        let decide_one = |(index, request): (usize, &DecisionRequest)| {
            let mut rng = Self::request_rng(seed, index);
            self.decide(&request.situation, request.offense, request.defense, &mut rng)
        };

        if requests.len() > PARALLEL_BATCH_THRESHOLD {
            requests.par_iter().enumerate().map(decide_one).collect()
        } else {
            requests.iter().enumerate().map(decide_one).collect()
        }
    }

    /// Independent stream for the `index`-th request of a batch
    pub fn request_rng(seed: u64, index: usize) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(index as u64);
        rng
    }

    fn draw<R: Rng + ?Sized>(&self, evaluation: Evaluation, rng: &mut R) -> Result<PlayCallDecision> {
        let play = PlaySelector::new(&self.config.limits.probability)
            .select(&evaluation.distribution, rng)
            .ok_or_else(|| PlayCallError::DegenerateDistribution {
                situation: evaluation.situation_key,
                reason: "no candidate plays".to_string(),
            })?;
        debug!("{} ({}): {} from {}", evaluation.situation_key, evaluation.offense, play, evaluation.distribution);
        Ok(PlayCallDecision { play, evaluation })
    }

    fn offense_table(&self, archetype: OffensiveArchetype, warnings: &mut Vec<String>) -> &OffensiveModifierTable {
        if let Some(table) = self.config.offense.get(&archetype) {
            return table;
        }
        let err = PlayCallError::UnknownArchetype {
            kind: ArchetypeKind::Offensive,
            key: archetype.to_string(),
        };
        warn!("{} has no configured table; using balanced", err);
        warnings.push(err.to_string());
        static NEUTRAL: OffensiveModifierTable = OffensiveModifierTable::neutral();
        self.config.offense.get(&OffensiveArchetype::Balanced).unwrap_or(&NEUTRAL)
    }

    fn defense_table(&self, archetype: DefensiveArchetype, warnings: &mut Vec<String>) -> &DefensiveCounterTable {
        if let Some(table) = self.config.defense.get(&archetype) {
            return table;
        }
        let err = PlayCallError::UnknownArchetype {
            kind: ArchetypeKind::Defensive,
            key: archetype.to_string(),
        };
        warn!("{} has no configured table; using balanced", err);
        warnings.push(err.to_string());
        static NEUTRAL: DefensiveCounterTable = DefensiveCounterTable::neutral();
        self.config.defense.get(&DefensiveArchetype::Balanced).unwrap_or(&NEUTRAL)
    }

    fn evaluate_with_warnings(
        &self,
        situation: &GameSituation,
        offense: OffensiveArchetype,
        defense: DefensiveArchetype,
        mut warnings: Vec<String>,
    ) -> Result<Evaluation> {
        let limits = &self.config.limits;
        let call = ClassifiedSituation::classify(situation, limits)?;
        let base = self.config.base_table.lookup(call.key)?.clone();
        debug!("{} at {} flags {}: base {}", call.key, situation.field_position, call.flags, base);

        let mut dist = base.clone();
        let offense_table = self.offense_table(offense, &mut warnings);
        let offense_rules = OffensiveArchetypeModifier::new(limits).apply(&mut dist, offense_table, &call);
        let after_offense = dist.clone();

        let defense_table = self.defense_table(defense, &mut warnings);
        let defense_rules =
            DefensiveArchetypeCounter::new(&limits.modifiers).apply(&mut dist, defense_table, call.key);
        let after_defense = dist.clone();

        let context_rules =
            ContextualAdjuster::new(&self.config.context, &limits.modifiers).apply(&mut dist, &call, &base);
        let after_context = dist.clone();

        let override_manager = DecisionOverrideManager::new(limits);
        let overrides = override_manager.apply(&mut dist, situation);
        let after_overrides = dist.clone();

        let selector = PlaySelector::new(&limits.probability);
        let (distribution, fallback_used) = match selector.normalize(&dist, call.key) {
            Ok(normalized) => (normalized, false),
            Err(err) => {
                warn!("{}; falling back to base tendency", err);
                warnings.push(err.to_string());
                let mut fallback = base.clone();
                override_manager.apply(&mut fallback, situation);
                (selector.normalize(&fallback, call.key)?, true)
            }
        };

        Ok(Evaluation {
            situation_key: call.key,
            field_position_band: call.band,
            flags: call.flags,
            offense,
            defense,
            distribution,
            warnings,
            fallback_used,
            trace: DecisionTrace {
                base,
                after_offense,
                after_defense,
                after_context,
                after_overrides,
                offense_rules,
                defense_rules,
                context_rules,
                overrides,
            },
        })
    }
}
