//! Discrete probability mass functions and the primitive operations every
//! engine builds on: convolution, percentile extraction, expectation,
//! weighted mixing and tail conditional expectations.
//!
//! Probability convention, fixed once for the whole crate: percentile
//! lookups walk the cumulative distribution; the `*Prob` fields attached to
//! scenario quadruples carry the mass of the quartile bucket, never the
//! cumulative.

use crate::config::MASS_WARN_TOLERANCE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A finite sparse PMF over integers. Entries sum to 1 within 1e-9 unless
/// the PMF is empty; zero-probability entries are dropped eagerly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pmf {
    map: BTreeMap<i64, f64>,
}

impl Pmf {
    pub fn new() -> Pmf {
        Pmf::default()
    }

    /// The degenerate distribution at `value`.
    pub fn delta(value: i64) -> Pmf {
        let mut map = BTreeMap::new();
        map.insert(value, 1.0);
        Pmf { map }
    }

    /// `{0: 1-p, 1: p}`.
    pub fn bernoulli(p: f64) -> Pmf {
        let mut pmf = Pmf::new();
        pmf.add_mass(0, 1.0 - p);
        pmf.add_mass(1, p);
        pmf
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn add_mass(&mut self, value: i64, p: f64) {
        if p <= 0.0 {
            return;
        }
        *self.map.entry(value).or_insert(0.0) += p;
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.map.iter().map(|(v, p)| (*v, *p))
    }

    pub fn get(&self, value: i64) -> f64 {
        self.map.get(&value).copied().unwrap_or(0.0)
    }

    pub fn support_len(&self) -> usize {
        self.map.len()
    }

    pub fn total_mass(&self) -> f64 {
        self.map.values().sum()
    }

    pub fn min_value(&self) -> Option<i64> {
        self.map.keys().next().copied()
    }

    pub fn max_value(&self) -> Option<i64> {
        self.map.keys().next_back().copied()
    }

    pub fn expectation(&self) -> f64 {
        self.iter().map(|(v, p)| v as f64 * p).sum()
    }

    /// Rescale so the mass sums to 1. Logs when the deviation exceeded the
    /// warning tolerance; empty PMFs are left empty.
    pub fn normalize(&mut self) {
        let mass = self.total_mass();
        if mass <= 0.0 {
            self.map.clear();
            return;
        }
        if (mass - 1.0).abs() > MASS_WARN_TOLERANCE {
            log::warn!("renormalising PMF with mass {:.9}", mass);
        }
        for p in self.map.values_mut() {
            *p /= mass;
        }
    }

    /// Renormalise only when accumulated float error pushed the mass out of
    /// tolerance. Logged as a numerical warning; the calculation continues.
    pub fn renormalize_if_drifted(&mut self) {
        if self.is_empty() {
            return;
        }
        let mass = self.total_mass();
        if (mass - 1.0).abs() > MASS_WARN_TOLERANCE {
            log::warn!("PMF mass drifted to {:.9}, renormalising", mass);
            for p in self.map.values_mut() {
                *p /= mass;
            }
        }
    }

    /// Sum of two independent variables. Either side being empty yields the
    /// other side unchanged, so an identity element exists for folds.
    pub fn convolve(&self, other: &Pmf) -> Pmf {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        let mut out = Pmf::new();
        for (a, pa) in self.iter() {
            for (b, pb) in other.iter() {
                out.add_mass(a + b, pa * pb);
            }
        }
        out
    }

    /// Convolve a sequence of PMFs. Empty input gives the delta at 0.
    pub fn convolve_all<'a, I: IntoIterator<Item = &'a Pmf>>(pmfs: I) -> Pmf {
        let mut acc = Pmf::delta(0);
        for pmf in pmfs {
            acc = acc.convolve(pmf);
        }
        acc
    }

    /// Smallest value whose cumulative mass reaches `q`. Falls back to the
    /// maximum support when rounding keeps the cumulative short of `q`.
    pub fn percentile(&self, q: f64) -> i64 {
        let mut cumulative = 0.0;
        for (value, p) in self.iter() {
            cumulative += p;
            if cumulative >= q - 1e-12 {
                return value;
            }
        }
        self.max_value().unwrap_or(0)
    }

    /// Map every value through `f`, merging collisions. Used for the
    /// grenade shift (`v -> max(0, v - 3G)`).
    pub fn map_values(&self, f: impl Fn(i64) -> i64) -> Pmf {
        let mut out = Pmf::new();
        for (value, p) in self.iter() {
            out.add_mass(f(value), p);
        }
        out
    }

    /// Linear mixture `P(x) = sum w_i * P_i(x)`. Weights are taken as-is;
    /// callers pass weights summing to 1.
    pub fn mix<'a, I: IntoIterator<Item = (f64, &'a Pmf)>>(parts: I) -> Pmf {
        let mut out = Pmf::new();
        for (weight, pmf) in parts {
            for (value, p) in pmf.iter() {
                out.add_mass(value, weight * p);
            }
        }
        out
    }

    /// Conditional expectation of the lowest `fraction` of probability mass,
    /// splitting the boundary entry.
    pub fn tail_expectation_low(&self, fraction: f64) -> f64 {
        if self.is_empty() || fraction <= 0.0 {
            return 0.0;
        }
        let mut remaining = fraction;
        let mut weighted = 0.0;
        for (value, p) in self.iter() {
            let take = p.min(remaining);
            weighted += value as f64 * take;
            remaining -= take;
            if remaining <= 1e-12 {
                break;
            }
        }
        weighted / (fraction - remaining.max(0.0)).max(1e-12)
    }

    /// Conditional expectation of the highest `fraction` of probability mass.
    pub fn tail_expectation_high(&self, fraction: f64) -> f64 {
        if self.is_empty() || fraction <= 0.0 {
            return 0.0;
        }
        let mut remaining = fraction;
        let mut weighted = 0.0;
        for (value, p) in self.iter().collect::<Vec<_>>().into_iter().rev() {
            let take = p.min(remaining);
            weighted += value as f64 * take;
            remaining -= take;
            if remaining <= 1e-12 {
                break;
            }
        }
        weighted / (fraction - remaining.max(0.0)).max(1e-12)
    }
}

impl FromIterator<(i64, f64)> for Pmf {
    fn from_iter<T: IntoIterator<Item = (i64, f64)>>(iter: T) -> Self {
        let mut pmf = Pmf::new();
        for (value, p) in iter {
            pmf.add_mass(value, p);
        }
        pmf
    }
}

/// The four scenarios extracted from a PMF in the damage direction, plus
/// the quartile bucket masses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioQuadruple {
    pub optimist: i64,
    pub average: i64,
    pub pessimist: i64,
    pub worst: i64,
    pub optimist_prob: f64,
    pub average_prob: f64,
    pub pessimist_prob: f64,
    pub worst_prob: f64,
}

impl ScenarioQuadruple {
    /// Extract in the damage direction: optimist is the good (low) quartile.
    /// `higher_is_better` mirrors the whole extraction (optimist becomes the
    /// high quartile, worst the minimum) by negating the support.
    pub fn extract(pmf: &Pmf, higher_is_better: bool) -> ScenarioQuadruple {
        if pmf.is_empty() {
            return ScenarioQuadruple::default();
        }

        if higher_is_better {
            let negated = pmf.map_values(|v| -v);
            let mirrored = ScenarioQuadruple::extract(&negated, false);
            return ScenarioQuadruple {
                optimist: -mirrored.optimist,
                average: -mirrored.average,
                pessimist: -mirrored.pessimist,
                worst: -mirrored.worst,
                ..mirrored
            };
        }

        let p25 = pmf.percentile(0.25);
        let p50 = pmf.percentile(0.50);
        let p75 = pmf.percentile(0.75);
        let max = pmf.max_value().unwrap_or(0);

        // Bucket masses: [min..p25], (p25..p50], (p50..p75], (p75..max].
        let mut buckets = [0.0f64; 4];
        for (value, p) in pmf.iter() {
            let idx = if value <= p25 {
                0
            } else if value <= p50 {
                1
            } else if value <= p75 {
                2
            } else {
                3
            };
            buckets[idx] += p;
        }

        ScenarioQuadruple {
            optimist: p25,
            average: p50,
            pessimist: p75,
            worst: max,
            optimist_prob: buckets[0],
            average_prob: buckets[1],
            pessimist_prob: buckets[2],
            worst_prob: buckets[3],
        }
    }

    /// Extract with the worst case taken from a separate exclusion-aware
    /// distribution (the mutual-exclusivity variant).
    pub fn extract_with_worst(pmf: &Pmf, worst_pmf: &Pmf) -> ScenarioQuadruple {
        let mut quadruple = ScenarioQuadruple::extract(pmf, false);
        if let Some(worst) = worst_pmf.max_value() {
            quadruple.worst = worst;
        }
        quadruple
    }
}
