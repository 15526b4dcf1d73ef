//! Loadout-driven transformation of sector weight tables and the
//! normalisation into per-sector event probabilities.
//!
//! The applicator never mutates the base tables: it builds a fresh weight
//! map per call. Removed events are deleted outright (not zeroed) so the
//! normalisation below never sees them.

use crate::config::{GameData, RuleSource};
use crate::enums::{EventName, SectorType};
use crate::error_handling::ConfigError;
use crate::model::Loadout;
use std::collections::BTreeMap;

fn rule_source_active(source: &RuleSource, loadout: &Loadout) -> bool {
    match source {
        RuleSource::Ability(ability) => loadout.has_ability(*ability),
        RuleSource::Item(item) => loadout.has_item(*item),
        RuleSource::Project(project) => loadout.has_project(*project),
    }
}

/// Apply the team's loadout to a sector's base weight table.
///
/// Rule order: ability removals, item removals, then weight scaling.
/// Removal is set-based (a second copy of the same ability changes
/// nothing); scaling rules fire exactly once per active source.
pub fn modified_weights(
    data: &GameData,
    sector: SectorType,
    loadout: &Loadout,
) -> Result<BTreeMap<EventName, u32>, ConfigError> {
    let config = data.sector_config(sector)?;
    let mut weights: BTreeMap<EventName, u32> = config
        .exploration_events
        .iter()
        .map(|(event, weight)| (*event, *weight))
        .collect();

    for rule in &data.removal_rules {
        if !rule_source_active(&rule.source, loadout) {
            continue;
        }
        if let Some(target) = rule.sector {
            if target != sector {
                continue;
            }
        }
        weights.retain(|event, _| !rule.events.matches(*event));
    }

    for rule in &data.weight_scale_rules {
        if rule.sector != sector || !rule_source_active(&rule.source, loadout) {
            continue;
        }
        if let Some(weight) = weights.get_mut(&rule.event) {
            *weight *= rule.factor;
        }
    }

    Ok(weights)
}

/// Normalised event probabilities for one sector. An emptied weight table
/// yields an empty map, not an error.
pub fn event_probabilities(
    data: &GameData,
    sector: SectorType,
    loadout: &Loadout,
) -> Result<BTreeMap<EventName, f64>, ConfigError> {
    let weights = modified_weights(data, sector, loadout)?;
    let total: u64 = weights.values().map(|w| *w as u64).sum();
    if total == 0 {
        return Ok(BTreeMap::new());
    }
    Ok(weights
        .into_iter()
        .map(|(event, weight)| (event, weight as f64 / total as f64))
        .collect())
}
