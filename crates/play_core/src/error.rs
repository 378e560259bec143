use thiserror::Error;

use crate::situation::SituationKey;

/// Which side of the ball an archetype key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchetypeKind {
    Offensive,
    Defensive,
}

impl std::fmt::Display for ArchetypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchetypeKind::Offensive => write!(f, "offensive"),
            ArchetypeKind::Defensive => write!(f, "defensive"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlayCallError {
    #[error("Invalid situation: {0}")]
    InvalidSituation(String),

    #[error("Unknown {kind} archetype: {key}")]
    UnknownArchetype { kind: ArchetypeKind, key: String },

    #[error("Degenerate distribution for {situation}: {reason}")]
    DegenerateDistribution { situation: SituationKey, reason: String },

    #[error("Configuration validation failed: {}", .issues.join("; "))]
    ConfigurationValidation { issues: Vec<String> },

    #[error("Configuration parse error: {0}")]
    ConfigurationParse(String),
}

impl PlayCallError {
    /// Recoverable errors are surfaced as warnings on a decision instead of
    /// aborting it.
    pub fn is_recoverable(&self) -> bool {
        match self {
            PlayCallError::UnknownArchetype { .. } => true,
            PlayCallError::DegenerateDistribution { .. } => true,
            PlayCallError::InvalidSituation(_) => false,
            PlayCallError::ConfigurationValidation { .. } => false,
            PlayCallError::ConfigurationParse(_) => false,
        }
    }
}

impl From<serde_json::Error> for PlayCallError {
    fn from(err: serde_json::Error) -> Self {
        PlayCallError::ConfigurationParse(err.to_string())
    }
}

impl From<serde_yaml::Error> for PlayCallError {
    fn from(err: serde_yaml::Error) -> Self {
        PlayCallError::ConfigurationParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlayCallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        let unknown =
            PlayCallError::UnknownArchetype { kind: ArchetypeKind::Offensive, key: "wing_t".into() };
        assert!(unknown.is_recoverable());
        assert!(!PlayCallError::InvalidSituation("down 7".into()).is_recoverable());
        assert!(!PlayCallError::ConfigurationValidation { issues: vec![] }.is_recoverable());
    }

    #[test]
    fn test_validation_message_lists_issues() {
        let err = PlayCallError::ConfigurationValidation {
            issues: vec!["a broken".into(), "b broken".into()],
        };
        assert_eq!(err.to_string(), "Configuration validation failed: a broken; b broken");
    }

    #[test]
    fn test_unknown_archetype_message() {
        let err =
            PlayCallError::UnknownArchetype { kind: ArchetypeKind::Defensive, key: "46".into() };
        assert_eq!(err.to_string(), "Unknown defensive archetype: 46");
    }
}
