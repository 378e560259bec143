//! Play types, probability distributions and additive tendency deltas.

pub mod base_table;
pub mod modifier_layer;

pub use base_table::BaseTendencyTable;
pub use modifier_layer::ModifierLayer;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::PlayCallError;

/// The closed set of play calls the engine can return.
///
/// Declaration order is the iteration order of every distribution and
/// therefore the order of the cumulative draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayType {
    Run,
    Pass,
    Punt,
    FieldGoal,
}

impl PlayType {
    pub const ALL: [PlayType; 4] = [PlayType::Run, PlayType::Pass, PlayType::Punt, PlayType::FieldGoal];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayType::Run => "run",
            PlayType::Pass => "pass",
            PlayType::Punt => "punt",
            PlayType::FieldGoal => "field_goal",
        }
    }

    /// Run or pass: the offense keeps the ball and tries to convert.
    pub fn is_scrimmage(&self) -> bool {
        matches!(self, PlayType::Run | PlayType::Pass)
    }
}

impl fmt::Display for PlayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayType {
    type Err = PlayCallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "run" => Ok(PlayType::Run),
            "pass" => Ok(PlayType::Pass),
            "punt" => Ok(PlayType::Punt),
            "field_goal" | "fieldgoal" | "fg" => Ok(PlayType::FieldGoal),
            other => Err(PlayCallError::InvalidSituation(format!("unknown play type '{}'", other))),
        }
    }
}

/// Play type -> probability.
///
/// Only candidates are stored. A play type that is absent is not available
/// in this situation and reads as exactly 0.0. Values may leave [0, 1] while
/// modifier layers run; the selector restores the invariant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProbabilityDistribution {
    entries: BTreeMap<PlayType, f64>,
}

impl ProbabilityDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (PlayType, f64)>,
    {
        Self { entries: entries.into_iter().collect() }
    }

    /// Probability of `play`, 0.0 when it is not a candidate
    pub fn get(&self, play: PlayType) -> f64 {
        self.entries.get(&play).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, play: PlayType) -> bool {
        self.entries.contains_key(&play)
    }

    pub fn set(&mut self, play: PlayType, value: f64) {
        self.entries.insert(play, value);
    }

    /// Adds `delta` to an existing candidate. Non-candidates stay absent.
    pub fn add(&mut self, play: PlayType, delta: f64) {
        if let Some(v) = self.entries.get_mut(&play) {
            *v += delta;
        }
    }

    pub fn remove(&mut self, play: PlayType) -> Option<f64> {
        self.entries.remove(&play)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayType, f64)> + '_ {
        self.entries.iter().map(|(p, v)| (*p, *v))
    }

    pub fn candidates(&self) -> impl Iterator<Item = PlayType> + '_ {
        self.entries.keys().copied()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut f64> {
        self.entries.values_mut()
    }

    pub fn total(&self) -> f64 {
        self.entries.values().sum()
    }

    /// Sum of the positive parts, used when mass is moved between entries
    pub fn positive_total(&self) -> f64 {
        self.entries.values().map(|v| v.max(0.0)).sum()
    }

    /// Probability of keeping the ball on offense (run + pass)
    pub fn go_for_it_probability(&self) -> f64 {
        self.get(PlayType::Run) + self.get(PlayType::Pass)
    }

    /// Removes `play` and hands its positive mass to the remaining entries in
    /// proportion to their positive mass (evenly when none has any).
    pub fn remove_and_redistribute(&mut self, play: PlayType) -> Option<f64> {
        let removed = self.entries.remove(&play)?;
        let mass = removed.max(0.0);
        if self.entries.is_empty() || mass == 0.0 {
            return Some(removed);
        }

        let positive = self.positive_total();
        let count = self.entries.len() as f64;
        for v in self.entries.values_mut() {
            let share = if positive > 0.0 { v.max(0.0) / positive } else { 1.0 / count };
            *v += mass * share;
        }
        Some(removed)
    }

    /// Most likely play, ties broken by declaration order
    pub fn most_likely(&self) -> Option<PlayType> {
        let mut best: Option<(PlayType, f64)> = None;
        for (play, value) in self.iter() {
            match best {
                Some((_, b)) if b >= value => {}
                _ => best = Some((play, value)),
            }
        }
        best.map(|(p, _)| p)
    }
}

impl fmt::Display for ProbabilityDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> =
            self.iter().map(|(p, v)| format!("{}={:.3}", p, v)).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// Additive deltas a single rule contributes.
///
/// `go_for_it` is a fourth-down attempt tendency: it is split evenly between
/// Run and Pass on fourth down and ignored on other downs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TendencyDeltas {
    pub run: f64,
    pub pass: f64,
    pub punt: f64,
    pub field_goal: f64,
    pub go_for_it: f64,
}

impl TendencyDeltas {
    pub const NONE: TendencyDeltas =
        TendencyDeltas { run: 0.0, pass: 0.0, punt: 0.0, field_goal: 0.0, go_for_it: 0.0 };

    pub fn run(mut self, v: f64) -> Self {
        self.run = v;
        self
    }

    pub fn pass(mut self, v: f64) -> Self {
        self.pass = v;
        self
    }

    pub fn punt(mut self, v: f64) -> Self {
        self.punt = v;
        self
    }

    pub fn field_goal(mut self, v: f64) -> Self {
        self.field_goal = v;
        self
    }

    pub fn go_for_it(mut self, v: f64) -> Self {
        self.go_for_it = v;
        self
    }

    pub fn is_finite(&self) -> bool {
        [self.run, self.pass, self.punt, self.field_goal, self.go_for_it]
            .iter()
            .all(|v| v.is_finite())
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::NONE
    }

    /// Per-play deltas after clamping every component to +/- `cap`
    pub fn resolve(&self, fourth_down: bool, cap: f64) -> [(PlayType, f64); 4] {
        let c = |v: f64| v.clamp(-cap, cap);
        let attempt = if fourth_down { c(self.go_for_it) / 2.0 } else { 0.0 };
        [
            (PlayType::Run, c(self.run) + attempt),
            (PlayType::Pass, c(self.pass) + attempt),
            (PlayType::Punt, c(self.punt)),
            (PlayType::FieldGoal, c(self.field_goal)),
        ]
    }
}
