//! Clamp-and-renormalize, then a single weighted draw.

use rand::Rng;

use super::probability_validator::ProbabilityValidator;
use crate::config::limits::ProbabilityBounds;
use crate::error::{PlayCallError, Result};
use crate::situation::SituationKey;
use crate::tendency::{PlayType, ProbabilityDistribution};

pub struct PlaySelector<'a> {
    bounds: &'a ProbabilityBounds,
}

impl<'a> PlaySelector<'a> {
    pub fn new(bounds: &'a ProbabilityBounds) -> Self {
        Self { bounds }
    }

    /// Returns a distribution with every entry inside the bounds and a sum of
    /// 1.0.
    ///
    /// Entries are clamped, then rescaled. An entry the rescale would push
    /// out of bounds is pinned to the bound it crossed and the rest are
    /// rescaled over what is left, until nothing moves. Candidates are never
    /// added or removed.
    pub fn normalize(
        &self,
        distribution: &ProbabilityDistribution,
        key: SituationKey,
    ) -> Result<ProbabilityDistribution> {
        let degenerate = |reason: &str| PlayCallError::DegenerateDistribution {
            situation: key,
            reason: reason.to_string(),
        };

        if distribution.is_empty() {
            return Err(degenerate("no candidate plays"));
        }
        if distribution.iter().any(|(_, v)| !v.is_finite()) {
            return Err(degenerate("non-finite probability"));
        }
        if distribution.positive_total() <= 0.0 {
            return Err(degenerate("no positive probability mass"));
        }

        let (min, max) = (self.bounds.min_probability, self.bounds.max_probability);
        let raw: Vec<(PlayType, f64)> =
            distribution.iter().map(|(play, v)| (play, self.bounds.clamp(v))).collect();
        let mut pinned: Vec<Option<f64>> = vec![None; raw.len()];

        // Each pass pins at least one entry, so len + 1 passes always suffice.
        for _ in 0..=raw.len() {
            let pinned_total: f64 = pinned.iter().flatten().sum();
            let free_total: f64 =
                raw.iter().zip(&pinned).filter(|(_, p)| p.is_none()).map(|((_, v), _)| v).sum();

            if free_total <= 0.0 {
                if (pinned_total - 1.0).abs() > self.bounds.sum_epsilon {
                    return Err(degenerate("probability bounds cannot be satisfied"));
                }
                break;
            }

            let scale = (1.0 - pinned_total) / free_total;
            let mut over = Vec::new();
            let mut under = Vec::new();
            for (i, (_, v)) in raw.iter().enumerate() {
                if pinned[i].is_some() {
                    continue;
                }
                let scaled = v * scale;
                if scaled > max {
                    over.push(i);
                } else if scaled < min {
                    under.push(i);
                }
            }

            // Pin the upper crossings first: they free mass for the rest.
            let (crossed, bound) = if !over.is_empty() { (over, max) } else { (under, min) };
            if !crossed.is_empty() {
                for i in crossed {
                    pinned[i] = Some(bound);
                }
                continue;
            }

            let result = ProbabilityDistribution::from_entries(
                raw.iter().enumerate().map(|(i, (play, v))| (*play, pinned[i].unwrap_or(v * scale))),
            );
            return self.checked(result, key);
        }

        let result = ProbabilityDistribution::from_entries(
            raw.iter().enumerate().map(|(i, (play, v))| (*play, pinned[i].unwrap_or(*v))),
        );
        self.checked(result, key)
    }

    fn checked(&self, distribution: ProbabilityDistribution, key: SituationKey) -> Result<ProbabilityDistribution> {
        ProbabilityValidator::from_bounds(self.bounds)
            .validate(&distribution)
            .map_err(|reason| PlayCallError::DegenerateDistribution { situation: key, reason })?;
        Ok(distribution)
    }

    /// Inverse-CDF draw in play type order from one uniform sample
    pub fn select<R: Rng + ?Sized>(&self, distribution: &ProbabilityDistribution, rng: &mut R) -> Option<PlayType> {
        let draw = rng.gen::<f64>();
        let mut cumulative = 0.0;
        let mut last = None;
        for (play, p) in distribution.iter() {
            cumulative += p;
            if draw < cumulative {
                return Some(play);
            }
            last = Some(play);
        }
        // Rounding left the cumulative sum a hair under the draw
        last
    }
}
