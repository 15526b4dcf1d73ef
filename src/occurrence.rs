//! Occurrence counting: how many visited sectors fire a given event type.
//! Each sector position contributes an independent Bernoulli; the combined
//! count is their exact convolution.

use crate::context::CalcContext;
use crate::distribution::{Pmf, ScenarioQuadruple};
use crate::enums::{EventName, SectorType};
use crate::error_handling::ConfigError;
use crate::model::Loadout;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One sector position that can fire the event, used later by the path
/// sampler to attribute individual occurrences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceSource {
    pub sector_type: SectorType,
    pub sector_index: usize,
    pub probability: f64,
}

/// Combined occurrence distribution plus its scenarios.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub pmf: Pmf,
    pub scenarios: ScenarioQuadruple,
    pub max_possible: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OccurrenceResult {
    pub occurrence: Occurrence,
    pub sources: Vec<OccurrenceSource>,
}

/// Count occurrences of `event` across the visited sectors.
pub fn calculate_for_type(
    ctx: &mut CalcContext<'_>,
    sectors: &[SectorType],
    loadout: &Loadout,
    event: EventName,
) -> Result<OccurrenceResult, ConfigError> {
    let mut sources = Vec::new();
    let mut pmf = Pmf::delta(0);

    for (index, sector) in sectors.iter().enumerate() {
        let p = ctx
            .probabilities(*sector, loadout)?
            .get(&event)
            .copied()
            .unwrap_or(0.0);
        if p > 0.0 {
            sources.push(OccurrenceSource {
                sector_type: *sector,
                sector_index: index,
                probability: p,
            });
            pmf = pmf.convolve(&Pmf::bernoulli(p));
        }
    }

    pmf.renormalize_if_drifted();
    let scenarios = ScenarioQuadruple::extract(&pmf, false);
    let max_possible = sources.len();
    Ok(OccurrenceResult {
        occurrence: Occurrence {
            pmf,
            scenarios,
            max_possible,
        },
        sources,
    })
}

/// Convolve per-type occurrence PMFs into one "any of these events
/// anywhere" count. Used to derive the scenario probabilities for damage.
pub fn combine_occurrences(per_type: &BTreeMap<EventName, Pmf>) -> Pmf {
    Pmf::convolve_all(per_type.values())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::game_data;

    #[test]
    fn empty_sector_list_gives_zero_occurrences() {
        let mut ctx = CalcContext::new(game_data(), 0);
        let result = calculate_for_type(
            &mut ctx,
            &[],
            &Loadout::default(),
            EventName::FightFixed(8),
        )
        .unwrap();
        assert_eq!(result.occurrence.pmf.get(0), 1.0);
        assert_eq!(result.occurrence.max_possible, 0);
        assert!(result.sources.is_empty());
    }

    #[test]
    fn support_is_bounded_by_sector_count() {
        let mut ctx = CalcContext::new(game_data(), 0);
        let sectors = [SectorType::Forest, SectorType::Forest, SectorType::Desert];
        let result =
            calculate_for_type(&mut ctx, &sectors, &Loadout::default(), EventName::Harvest(1))
                .unwrap();
        assert_eq!(result.occurrence.max_possible, 2);
        assert_eq!(result.occurrence.pmf.max_value(), Some(2));
        assert!((result.occurrence.pmf.total_mass() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn sources_carry_positions_and_probabilities() {
        let mut ctx = CalcContext::new(game_data(), 0);
        let sectors = [SectorType::Desert, SectorType::Forest];
        let result = calculate_for_type(
            &mut ctx,
            &sectors,
            &Loadout::default(),
            EventName::FightFixed(8),
        )
        .unwrap();
        assert_eq!(result.sources.len(), 1);
        assert_eq!(result.sources[0].sector_index, 1);
        assert_eq!(result.sources[0].sector_type, SectorType::Forest);
        assert!(result.sources[0].probability > 0.0);
    }

    #[test]
    fn two_identical_sectors_convolve() {
        let mut ctx = CalcContext::new(game_data(), 0);
        let sectors = [SectorType::Forest, SectorType::Forest];
        let result = calculate_for_type(
            &mut ctx,
            &sectors,
            &Loadout::default(),
            EventName::FightFixed(8),
        )
        .unwrap();
        // FOREST fires FIGHT_8 with weight 2 out of 12.
        let p = 2.0 / 12.0;
        let expected_both = p * p;
        assert!((result.occurrence.pmf.get(2) - expected_both).abs() < 1e-12);
        assert!((result.occurrence.pmf.get(0) - (1.0 - p) * (1.0 - p)).abs() < 1e-12);
    }

    #[test]
    fn combine_occurrences_adds_counts() {
        let mut per_type = BTreeMap::new();
        per_type.insert(EventName::FightFixed(8), Pmf::bernoulli(0.5));
        per_type.insert(EventName::FightFixed(10), Pmf::bernoulli(0.5));
        let combined = combine_occurrences(&per_type);
        assert!((combined.get(2) - 0.25).abs() < 1e-12);
        assert!((combined.get(1) - 0.5).abs() < 1e-12);
    }
}
