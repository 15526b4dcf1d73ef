//! Damage engines. `fight` and `event` share one convolution pipeline:
//! a per-sector damage PMF callback (normal and worst-case variants) is
//! convolved across the visited sectors, with optional post-processing of
//! the combined distributions.

pub mod event;
pub mod fight;

use crate::distribution::Pmf;
use crate::enums::{EventName, ScenarioKind, SectorType};
use serde::{Deserialize, Serialize};

/// Discriminates how the spreader disperses an instance onto players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageInstanceType {
    /// Total fight damage, split evenly across participants.
    #[serde(rename = "COMBINED")]
    Combined,
    #[serde(rename = "TIRED_2")]
    Tired2,
    #[serde(rename = "ACCIDENT_3_5")]
    Accident35,
    #[serde(rename = "DISASTER_3_5")]
    Disaster35,
}

impl DamageInstanceType {
    pub fn from_event(event: EventName) -> Option<DamageInstanceType> {
        match event {
            EventName::Tired2 => Some(DamageInstanceType::Tired2),
            EventName::Accident35 => Some(DamageInstanceType::Accident35),
            EventName::Disaster35 => Some(DamageInstanceType::Disaster35),
            _ => None,
        }
    }

    pub fn affects_all(&self) -> bool {
        matches!(
            self,
            DamageInstanceType::Tired2 | DamageInstanceType::Disaster35
        )
    }
}

/// Attribution of one instance back to a source sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageSource {
    pub sector_type: SectorType,
    pub sector_index: usize,
    pub probability: f64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub zero_damage: bool,
}

/// One damage contribution handed to the spreader. Constructed per scenario
/// during a calculation, discarded after rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageInstance {
    pub event_type: DamageInstanceType,
    pub count: usize,
    pub damage_per_instance: i64,
    pub sources: Vec<DamageSource>,
}

/// Damage instances grouped by scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioInstances {
    pub optimist: Vec<DamageInstance>,
    pub average: Vec<DamageInstance>,
    pub pessimist: Vec<DamageInstance>,
    pub worst_case: Vec<DamageInstance>,
}

impl ScenarioInstances {
    pub fn get(&self, kind: ScenarioKind) -> &Vec<DamageInstance> {
        match kind {
            ScenarioKind::Optimist => &self.optimist,
            ScenarioKind::Average => &self.average,
            ScenarioKind::Pessimist => &self.pessimist,
            ScenarioKind::WorstCase => &self.worst_case,
        }
    }

    pub fn set(&mut self, kind: ScenarioKind, instances: Vec<DamageInstance>) {
        match kind {
            ScenarioKind::Optimist => self.optimist = instances,
            ScenarioKind::Average => self.average = instances,
            ScenarioKind::Pessimist => self.pessimist = instances,
            ScenarioKind::WorstCase => self.worst_case = instances,
        }
    }
}

/// Combined damage distributions: the plain convolution and the
/// mutual-exclusivity worst-case variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DamagePipelineOutput {
    pub pmf: Pmf,
    pub worst_pmf: Pmf,
}

/// Convolve per-sector (normal, worst-case) PMF pairs, then post-process
/// both combined distributions with `post` (identity when `None`).
pub fn run_pipeline<E>(
    sectors: &[SectorType],
    mut per_sector: impl FnMut(usize, SectorType) -> Result<(Pmf, Pmf), E>,
    post: Option<&dyn Fn(Pmf) -> Pmf>,
) -> Result<DamagePipelineOutput, E> {
    let mut pmf = Pmf::delta(0);
    let mut worst_pmf = Pmf::delta(0);
    for (index, sector) in sectors.iter().enumerate() {
        let (normal, worst) = per_sector(index, *sector)?;
        pmf = pmf.convolve(&normal);
        worst_pmf = worst_pmf.convolve(&worst);
    }
    if let Some(post) = post {
        pmf = post(pmf);
        worst_pmf = post(worst_pmf);
    }
    pmf.renormalize_if_drifted();
    worst_pmf.renormalize_if_drifted();
    Ok(DamagePipelineOutput { pmf, worst_pmf })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_convolves_both_variants() {
        let sectors = [SectorType::Forest, SectorType::Desert];
        let output = run_pipeline(
            &sectors,
            |index, _| {
                if index == 0 {
                    Ok::<_, ()>((Pmf::bernoulli(0.5), Pmf::delta(1)))
                } else {
                    Ok((Pmf::delta(2), Pmf::delta(0)))
                }
            },
            None,
        )
        .unwrap();
        assert!((output.pmf.get(2) - 0.5).abs() < 1e-12);
        assert!((output.pmf.get(3) - 0.5).abs() < 1e-12);
        assert_eq!(output.worst_pmf.get(1), 1.0);
    }

    #[test]
    fn post_processing_applies_to_both() {
        let sectors = [SectorType::Forest];
        let shift = |pmf: Pmf| pmf.map_values(|v| (v - 1).max(0));
        let output = run_pipeline(
            &sectors,
            |_, _| Ok::<_, ()>((Pmf::delta(3), Pmf::delta(5))),
            Some(&shift),
        )
        .unwrap();
        assert_eq!(output.pmf.get(2), 1.0);
        assert_eq!(output.worst_pmf.get(4), 1.0);
    }

    #[test]
    fn instance_source_serialises_zero_damage_only_when_set() {
        let source = DamageSource {
            sector_type: SectorType::Forest,
            sector_index: 0,
            probability: 0.5,
            zero_damage: false,
        };
        let json = serde_json::to_string(&source).unwrap();
        assert!(!json.contains("zeroDamage"));
    }
}
