//! NFL-average play-call priors per down-and-distance bucket.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{PlayType, ProbabilityDistribution};
use crate::error::{PlayCallError, Result};
use crate::situation::SituationKey;

/// Base prior for every situation key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseTendencyTable {
    entries: BTreeMap<SituationKey, ProbabilityDistribution>,
}

/// (key, run, pass, punt, field goal); zero punt/FG means "not a candidate"
const NFL_PRIORS: [(SituationKey, f64, f64, f64, f64); 12] = [
    (SituationKey::FIRST_AND_SHORT, 0.60, 0.40, 0.0, 0.0),
    (SituationKey::FIRST_AND_MEDIUM, 0.52, 0.48, 0.0, 0.0),
    (SituationKey::FIRST_AND_10, 0.45, 0.55, 0.0, 0.0),
    (SituationKey::SECOND_AND_SHORT, 0.58, 0.42, 0.0, 0.0),
    (SituationKey::SECOND_AND_MEDIUM, 0.45, 0.55, 0.0, 0.0),
    (SituationKey::SECOND_AND_LONG, 0.35, 0.65, 0.0, 0.0),
    (SituationKey::THIRD_AND_SHORT, 0.55, 0.45, 0.0, 0.0),
    (SituationKey::THIRD_AND_MEDIUM, 0.30, 0.70, 0.0, 0.0),
    (SituationKey::THIRD_AND_LONG, 0.25, 0.75, 0.0, 0.0),
    (SituationKey::FOURTH_AND_SHORT, 0.30, 0.15, 0.25, 0.30),
    (SituationKey::FOURTH_AND_MEDIUM, 0.10, 0.20, 0.45, 0.25),
    (SituationKey::FOURTH_AND_LONG, 0.05, 0.15, 0.55, 0.25),
];

impl BaseTendencyTable {
    pub fn new(entries: BTreeMap<SituationKey, ProbabilityDistribution>) -> Self {
        Self { entries }
    }

    /// League-average priors. Downs 1-3 only offer run and pass.
    pub fn nfl_default() -> Self {
        let mut entries = BTreeMap::new();
        for (key, run, pass, punt, field_goal) in NFL_PRIORS {
            let mut dist =
                ProbabilityDistribution::from_entries([(PlayType::Run, run), (PlayType::Pass, pass)]);
            if punt > 0.0 {
                dist.set(PlayType::Punt, punt);
            }
            if field_goal > 0.0 {
                dist.set(PlayType::FieldGoal, field_goal);
            }
            entries.insert(key, dist);
        }
        Self { entries }
    }

    pub fn lookup(&self, key: SituationKey) -> Result<&ProbabilityDistribution> {
        self.entries.get(&key).ok_or_else(|| PlayCallError::DegenerateDistribution {
            situation: key,
            reason: "no base tendency configured".to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SituationKey, &ProbabilityDistribution)> {
        self.entries.iter()
    }

    /// Coverage and well-formedness problems, one message each
    pub fn issues(&self, sum_epsilon: f64) -> Vec<String> {
        let mut issues = Vec::new();
        for key in SituationKey::all() {
            let Some(dist) = self.entries.get(&key) else {
                issues.push(format!("base tendency missing for {}", key));
                continue;
            };
            if dist.len() < 2 {
                issues.push(format!("base tendency for {} needs at least two candidates", key));
            }
            if let Some((play, value)) =
                dist.iter().find(|(_, v)| !v.is_finite() || *v < 0.0 || *v > 1.0)
            {
                issues.push(format!("base tendency for {} has {} = {}", key, play, value));
                continue;
            }
            let total = dist.total();
            if (total - 1.0).abs() > sum_epsilon {
                issues.push(format!("base tendency for {} sums to {:.6}", key, total));
            }
        }
        issues
    }
}

impl Default for BaseTendencyTable {
    fn default() -> Self {
        Self::nfl_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> SituationKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_default_table_is_complete_and_clean() {
        let table = BaseTendencyTable::nfl_default();
        assert_eq!(table.len(), 12);
        assert!(table.issues(1e-6).is_empty(), "{:?}", table.issues(1e-6));
    }

    #[test]
    fn test_known_priors() {
        let table = BaseTendencyTable::nfl_default();
        let first = table.lookup(key("1st_and_10")).unwrap();
        assert_eq!(first.get(PlayType::Run), 0.45);
        assert_eq!(first.get(PlayType::Pass), 0.55);

        let third_long = table.lookup(key("3rd_and_long")).unwrap();
        assert_eq!(third_long.get(PlayType::Pass), 0.75);

        let fourth_short = table.lookup(key("4th_and_short")).unwrap();
        assert_eq!(fourth_short.get(PlayType::FieldGoal), 0.30);
        assert_eq!(fourth_short.get(PlayType::Punt), 0.25);
    }

    #[test]
    fn test_only_fourth_down_offers_kicks() {
        let table = BaseTendencyTable::nfl_default();
        for (key, dist) in table.iter() {
            assert_eq!(dist.contains(PlayType::Punt), key.is_fourth_down(), "{}", key);
            assert_eq!(dist.contains(PlayType::FieldGoal), key.is_fourth_down(), "{}", key);
        }
    }

    #[test]
    fn test_missing_and_malformed_entries_reported() {
        let mut entries: BTreeMap<_, _> =
            BaseTendencyTable::nfl_default().iter().map(|(k, v)| (*k, v.clone())).collect();
        entries.remove(&key("2nd_and_short"));
        entries.insert(
            key("3rd_and_short"),
            ProbabilityDistribution::from_entries([(PlayType::Run, 0.7), (PlayType::Pass, 0.7)]),
        );
        entries.insert(key("1st_and_short"), ProbabilityDistribution::from_entries([(PlayType::Run, 1.0)]));

        let issues = BaseTendencyTable::new(entries).issues(1e-6);
        assert!(issues.iter().any(|i| i.contains("missing for 2nd_and_short")));
        assert!(issues.iter().any(|i| i.contains("3rd_and_short sums to")));
        assert!(issues.iter().any(|i| i.contains("1st_and_short needs at least two")));
    }

    #[test]
    fn test_lookup_miss_is_degenerate() {
        let table = BaseTendencyTable::new(BTreeMap::new());
        assert!(matches!(
            table.lookup(key("1st_and_10")),
            Err(PlayCallError::DegenerateDistribution { .. })
        ));
    }
}
