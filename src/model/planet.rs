use crate::enums::SectorType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An expedition target: the landing site plus every other sector in input
/// order. LANDING is held apart because it is always visited and never
/// enters movement sampling.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Planet {
    pub sectors: Vec<SectorType>,
}

impl Planet {
    /// Normalise an input sector list: exactly one LANDING is kept out of
    /// the roaming list. An absent LANDING is implied and added.
    pub fn from_sectors(input: &[SectorType]) -> Planet {
        let sectors = input
            .iter()
            .copied()
            .filter(|s| *s != SectorType::Landing)
            .collect();
        Planet { sectors }
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    /// Number of sectors the team can roam to (LANDING excluded).
    pub fn roaming_count(&self) -> usize {
        self.sectors.len()
    }

    /// Full visit list for the unsampled pipeline: LANDING first, then the
    /// roaming sectors in input order.
    pub fn full_visit_list(&self) -> Vec<SectorType> {
        let mut list = Vec::with_capacity(self.sectors.len() + 1);
        list.push(SectorType::Landing);
        list.extend(self.sectors.iter().copied());
        list
    }

    pub fn has_sector(&self, sector: SectorType) -> bool {
        self.sectors.contains(&sector)
    }

    /// Multiset view of the roaming sectors, ordered by type.
    pub fn type_counts(&self) -> BTreeMap<SectorType, usize> {
        let mut counts = BTreeMap::new();
        for sector in &self.sectors {
            *counts.entry(*sector).or_insert(0) += 1;
        }
        counts
    }
}

/// One size-K sub-multiset of the roaming sectors together with its
/// noncentral hypergeometric probability. Lives for a single calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorComposition {
    pub counts: BTreeMap<SectorType, usize>,
    pub probability: f64,
}

impl SectorComposition {
    /// Expand to a visit list, appending the always-included LANDING first.
    pub fn visit_list(&self) -> Vec<SectorType> {
        let mut list = vec![SectorType::Landing];
        for (sector, count) in &self.counts {
            for _ in 0..*count {
                list.push(*sector);
            }
        }
        list
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landing_is_held_apart() {
        let planet = Planet::from_sectors(&[
            SectorType::Landing,
            SectorType::Forest,
            SectorType::Forest,
            SectorType::Desert,
        ]);
        assert_eq!(planet.roaming_count(), 3);
        let list = planet.full_visit_list();
        assert_eq!(list[0], SectorType::Landing);
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn implicit_landing() {
        let planet = Planet::from_sectors(&[SectorType::Ocean]);
        assert_eq!(planet.full_visit_list()[0], SectorType::Landing);
    }

    #[test]
    fn type_counts_form_a_multiset() {
        let planet = Planet::from_sectors(&[
            SectorType::Forest,
            SectorType::Desert,
            SectorType::Forest,
        ]);
        let counts = planet.type_counts();
        assert_eq!(counts[&SectorType::Forest], 2);
        assert_eq!(counts[&SectorType::Desert], 1);
    }

    #[test]
    fn composition_expansion_appends_landing() {
        let mut counts = BTreeMap::new();
        counts.insert(SectorType::Forest, 2);
        let composition = SectorComposition {
            counts,
            probability: 1.0,
        };
        let list = composition.visit_list();
        assert_eq!(
            list,
            vec![SectorType::Landing, SectorType::Forest, SectorType::Forest]
        );
        assert_eq!(composition.total(), 2);
    }
}
