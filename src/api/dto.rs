//! Request and report shapes crossing the WASM/JavaScript boundary.

use crate::config::DEFAULT_HEALTH;
use crate::distribution::Pmf;
use crate::engines::ScenarioInstances;
use crate::enums::{EventName, Mode, SectorType};
use crate::mixing::{MixedDamage, MixedOccurrence, SectorBreakdownEntry};
use crate::model::{SectorComposition, Toggles};
use crate::participation::ParticipationStatus;
use crate::resources::ResourceOutlook;
use crate::spreader::Effect;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Request
// ============================================================================

fn default_health() -> i32 {
    DEFAULT_HEALTH
}

/// One crew member as sent by the UI: slot strings, unknown entries are
/// dropped during parsing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
    pub id: u32,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default = "default_health")]
    pub max_health: i32,
}

/// The single entry point's input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExpeditionRequest {
    pub sectors: Vec<SectorType>,
    #[serde(default)]
    pub team: Vec<PlayerDto>,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub toggles: Toggles,
    /// Derived from mode + SPRINT when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movement_capacity: Option<u32>,
    /// Seed for explanation-path sampling only; scenario values are exact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

// ============================================================================
// Report
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesReport {
    pub fruits: ResourceOutlook,
    pub steaks: ResourceOutlook,
    pub fuel: ResourceOutlook,
    pub oxygen: ResourceOutlook,
    pub artefacts: ResourceOutlook,
    pub map_fragments: ResourceOutlook,
}

/// Occurrence scenarios for one event type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceReport {
    pub pessimist: f64,
    pub average: f64,
    pub optimist: f64,
    pub pmf: Pmf,
}

impl From<&MixedOccurrence> for OccurrenceReport {
    fn from(mixed: &MixedOccurrence) -> Self {
        OccurrenceReport {
            pessimist: mixed.scenarios.pessimist,
            average: mixed.scenarios.average,
            optimist: mixed.scenarios.optimist,
            pmf: mixed.pmf.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageReport {
    pub optimist: f64,
    pub average: f64,
    pub pessimist: f64,
    pub worst_case: f64,
    pub optimist_prob: f64,
    pub average_prob: f64,
    pub pessimist_prob: f64,
    pub worst_case_prob: f64,
    pub distribution: Pmf,
}

impl From<&MixedDamage> for DamageReport {
    fn from(mixed: &MixedDamage) -> Self {
        DamageReport {
            optimist: mixed.scenarios.optimist,
            average: mixed.scenarios.average,
            pessimist: mixed.scenarios.pessimist,
            worst_case: mixed.scenarios.worst_case,
            optimist_prob: mixed.scenarios.optimist_prob,
            average_prob: mixed.scenarios.average_prob,
            pessimist_prob: mixed.scenarios.pessimist_prob,
            worst_case_prob: mixed.scenarios.worst_case_prob,
            distribution: mixed.distribution.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatReport {
    pub occurrence: BTreeMap<EventName, OccurrenceReport>,
    pub damage: DamageReport,
    pub damage_instances: ScenarioInstances,
    pub fighting_power: i64,
    pub grenade_count: usize,
    pub player_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDamageReport {
    pub occurrence: OccurrenceReport,
    pub damage: DamageReport,
    pub damage_instances: ScenarioInstances,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegativeEventReport {
    pub pessimist: f64,
    pub average: f64,
    pub optimist: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthByScenario {
    pub optimist: Vec<i32>,
    pub average: Vec<i32>,
    pub pessimist: Vec<i32>,
    pub worst_case: Vec<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectsByScenario {
    pub optimist: Vec<Vec<Effect>>,
    pub average: Vec<Vec<Effect>>,
    pub pessimist: Vec<Vec<Effect>>,
    pub worst_case: Vec<Vec<Effect>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingReport {
    pub enabled: bool,
    pub composition_count: usize,
    pub compositions: Vec<SectorComposition>,
}

/// The single entry point's result bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpeditionReport {
    pub resources: ResourcesReport,
    pub combat: CombatReport,
    pub event_damage: EventDamageReport,
    pub negative_events: BTreeMap<EventName, NegativeEventReport>,
    pub sector_breakdown: BTreeMap<SectorType, SectorBreakdownEntry>,
    pub health_by_scenario: HealthByScenario,
    pub effects_by_scenario: EffectsByScenario,
    pub participation_status: Vec<ParticipationStatus>,
    #[serde(rename = "_sampling", skip_serializing_if = "Option::is_none")]
    pub sampling: Option<SamplingReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_parses_with_defaults() {
        let request: ExpeditionRequest = serde_json::from_str(
            r#"{"sectors": ["LANDING", "FOREST"], "team": [{"id": 1}]}"#,
        )
        .unwrap();
        assert_eq!(request.sectors.len(), 2);
        assert_eq!(request.team[0].max_health, DEFAULT_HEALTH);
        assert_eq!(request.mode, Mode::Icarus);
        assert!(!request.toggles.oxygenless_planet);
        assert!(request.movement_capacity.is_none());
    }

    #[test]
    fn request_rejects_unknown_sectors() {
        let result: Result<ExpeditionRequest, _> =
            serde_json::from_str(r#"{"sectors": ["ATLANTIS"]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn sampling_block_serialises_with_underscore_name() {
        let report = ExpeditionReport {
            sampling: Some(SamplingReport {
                enabled: true,
                composition_count: 0,
                compositions: Vec::new(),
            }),
            ..ExpeditionReport::default()
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"_sampling\""));

        let quiet = ExpeditionReport::default();
        let json = serde_json::to_string(&quiet).unwrap();
        assert!(!json.contains("_sampling"));
    }
}
