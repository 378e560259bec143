//! Configuration store
//!
//! Holds every tunable table the pipeline reads: limits, base priors,
//! archetype tables and context rules. A store is built once, validated once
//! and then only read. Parsing helpers take text from whatever loader the
//! host uses; the core never touches the filesystem.
//!
//! ## Environment Variables
//!
//! - `PLAYCALL_LIMITS_PROFILE`: limits preset for the process-wide default
//!   store (see [`limits::ConfigurationLimits::from_env_or_default`])

pub mod limits;

pub use limits::ConfigurationLimits;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::archetype::{
    DefensiveArchetype, DefensiveCounterTable, OffensiveArchetype, OffensiveModifierTable,
};
use crate::engine::context_adjuster::ContextModifierTable;
use crate::error::{PlayCallError, Result};
use crate::tendency::BaseTendencyTable;

/// Process-wide default store, built on first use
pub static DEFAULT_CONFIG: Lazy<ConfigurationStore> = Lazy::new(ConfigurationStore::from_env_or_default);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationStore {
    #[serde(default)]
    pub limits: ConfigurationLimits,
    #[serde(default)]
    pub base_table: BaseTendencyTable,
    #[serde(default = "default_offense_tables")]
    pub offense: BTreeMap<OffensiveArchetype, OffensiveModifierTable>,
    #[serde(default = "default_defense_tables")]
    pub defense: BTreeMap<DefensiveArchetype, DefensiveCounterTable>,
    #[serde(default)]
    pub context: ContextModifierTable,
}

fn default_offense_tables() -> BTreeMap<OffensiveArchetype, OffensiveModifierTable> {
    OffensiveArchetype::ALL
        .into_iter()
        .map(|a| (a, OffensiveModifierTable::for_archetype(a)))
        .collect()
}

fn default_defense_tables() -> BTreeMap<DefensiveArchetype, DefensiveCounterTable> {
    DefensiveArchetype::ALL
        .into_iter()
        .map(|a| (a, DefensiveCounterTable::for_archetype(a)))
        .collect()
}

impl Default for ConfigurationStore {
    fn default() -> Self {
        Self::nfl_default()
    }
}

impl ConfigurationStore {
    /// NFL limits with every built-in table
    pub fn nfl_default() -> Self {
        Self::with_limits(ConfigurationLimits::nfl())
    }

    /// Built-in tables with the limits preset named by the environment
    pub fn from_env_or_default() -> Self {
        Self::with_limits(ConfigurationLimits::from_env_or_default())
    }

    pub fn with_limits(limits: ConfigurationLimits) -> Self {
        Self {
            limits,
            base_table: BaseTendencyTable::nfl_default(),
            offense: default_offense_tables(),
            defense: default_defense_tables(),
            context: ContextModifierTable::nfl_default(),
        }
    }

    /// Parses a store from JSON. Omitted sections take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parses a store from YAML. Omitted sections take their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Checks every table and threshold, collecting all problems before
    /// failing. Pure: calling it again on the same store gives the same
    /// answer.
    pub fn validate_configuration(&self) -> Result<()> {
        let mut issues = self.limits.issues();
        issues.extend(self.base_table.issues(self.limits.probability.sum_epsilon));

        if !self.offense.contains_key(&OffensiveArchetype::Balanced) {
            issues.push("offense table for balanced is required as the fallback".to_string());
        }
        for (archetype, table) in &self.offense {
            issues.extend(table.issues(*archetype));
        }

        if !self.defense.contains_key(&DefensiveArchetype::Balanced) {
            issues.push("defense table for balanced is required as the fallback".to_string());
        }
        for (archetype, table) in &self.defense {
            issues.extend(table.issues(*archetype));
        }

        issues.extend(self.context.issues());

        if !issues.is_empty() {
            return Err(PlayCallError::ConfigurationValidation { issues });
        }

        info!(
            "Configuration validated: {} base situations, {} offensive and {} defensive archetypes",
            self.base_table.len(),
            self.offense.len(),
            self.defense.len()
        );
        Ok(())
    }
}
