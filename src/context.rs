//! Per-calculation state. One `CalcContext` is created at the start of a
//! calculation and dropped at return; nothing here outlives a run and
//! nothing here is global.

use crate::config::GameData;
use crate::enums::{EventName, SectorType};
use crate::error_handling::ConfigError;
use crate::model::Loadout;
use crate::modifiers;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, HashMap};

pub struct CalcContext<'a> {
    pub data: &'a GameData,
    /// Sector-type probability cache. The loadout is not part of the key:
    /// one calculation runs with one loadout.
    probability_cache: HashMap<SectorType, BTreeMap<EventName, f64>>,
    binomial_memo: HashMap<(u64, u64), f64>,
    pub rng: SmallRng,
}

impl<'a> CalcContext<'a> {
    pub fn new(data: &'a GameData, seed: u64) -> CalcContext<'a> {
        CalcContext {
            data,
            probability_cache: HashMap::new(),
            binomial_memo: HashMap::new(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Normalised event probabilities for a sector under the run's loadout,
    /// memoised per sector type.
    pub fn probabilities(
        &mut self,
        sector: SectorType,
        loadout: &Loadout,
    ) -> Result<&BTreeMap<EventName, f64>, ConfigError> {
        if !self.probability_cache.contains_key(&sector) {
            let probabilities = modifiers::event_probabilities(self.data, sector, loadout)?;
            self.probability_cache.insert(sector, probabilities);
        }
        Ok(&self.probability_cache[&sector])
    }

    /// Memoised binomial coefficient as f64 (values can exceed u64 for the
    /// planet sizes the sampler allows).
    pub fn binomial(&mut self, n: u64, k: u64) -> f64 {
        if k > n {
            return 0.0;
        }
        let k = k.min(n - k);
        if k == 0 {
            return 1.0;
        }
        if let Some(cached) = self.binomial_memo.get(&(n, k)) {
            return *cached;
        }
        let mut result = 1.0;
        for i in 0..k {
            result = result * (n - i) as f64 / (i + 1) as f64;
        }
        self.binomial_memo.insert((n, k), result);
        result
    }
}
