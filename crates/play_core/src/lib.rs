//! # play_core - Deterministic Football Play-Calling Engine
//!
//! Given a game situation (down, distance, field position, clock, score) this
//! library picks one play type (run, pass, punt, field goal) by layering
//! coaching philosophy, the opposing defensive scheme and live game context
//! over NFL-average priors, then drawing from the result with a seeded RNG.
//!
//! ## Features
//! - Same situation, archetypes and seed = same call
//! - Every stage of a decision is traceable
//! - Parallel batch evaluation with per-request RNG streams
//! - Tables configurable through JSON or YAML and validated up front
//!
//! ```
//! use play_core::{DefensiveArchetype, GameSituation, OffensiveArchetype, PlayCallEngine};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let engine = PlayCallEngine::with_defaults().unwrap();
//! let situation = GameSituation::new(4, 2, 40);
//! let mut rng = ChaCha8Rng::seed_from_u64(7);
//! let decision = engine
//!     .decide(&situation, OffensiveArchetype::Aggressive, DefensiveArchetype::Balanced, &mut rng)
//!     .unwrap();
//! assert!(decision.evaluation.distribution.contains(decision.play));
//! ```

pub mod archetype;
pub mod config;
pub mod engine;
pub mod error;
pub mod situation;
pub mod tendency;

pub use archetype::{DefensiveArchetype, OffensiveArchetype};
pub use config::{ConfigurationLimits, ConfigurationStore, DEFAULT_CONFIG};
pub use engine::{
    DecisionOverride, DecisionRequest, DecisionTrace, Evaluation, PlayCallDecision, PlayCallEngine,
};
pub use error::{ArchetypeKind, PlayCallError, Result};
pub use situation::{ContextFlag, ContextFlags, FieldPositionBand, GameSituation, SituationKey};
pub use tendency::{PlayType, ProbabilityDistribution, TendencyDeltas};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
