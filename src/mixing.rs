//! Probability mixing over sector compositions. Each retained composition
//! runs the full pipeline; distributions mix linearly, scenario scalars
//! become probability-weighted means, and explanation instances come from
//! the composition that best matches each mixed scenario value.

use crate::distribution::{Pmf, ScenarioQuadruple};
use crate::engines::event::EventDamageResult;
use crate::engines::fight::FightResult;
use crate::engines::ScenarioInstances;
use crate::enums::{EventName, ScenarioKind, SectorType};
use crate::resources::{ResourceKind, ResourceOutlook};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything one pipeline run produces before spreading, for one fixed
/// visit list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutput {
    pub visit_list: Vec<SectorType>,
    pub resources: BTreeMap<ResourceKind, ResourceOutlook>,
    pub fight: FightResult,
    pub event_damage: EventDamageResult,
    pub negative: BTreeMap<EventName, crate::occurrence::Occurrence>,
}

/// Scenario quadruple after mixing: weighted means are real-valued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixedScenarios {
    pub optimist: f64,
    pub average: f64,
    pub pessimist: f64,
    pub worst_case: f64,
    pub optimist_prob: f64,
    pub average_prob: f64,
    pub pessimist_prob: f64,
    pub worst_case_prob: f64,
}

impl From<ScenarioQuadruple> for MixedScenarios {
    fn from(q: ScenarioQuadruple) -> Self {
        MixedScenarios {
            optimist: q.optimist as f64,
            average: q.average as f64,
            pessimist: q.pessimist as f64,
            worst_case: q.worst as f64,
            optimist_prob: q.optimist_prob,
            average_prob: q.average_prob,
            pessimist_prob: q.pessimist_prob,
            worst_case_prob: q.worst_prob,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixedOccurrence {
    pub pmf: Pmf,
    pub scenarios: MixedScenarios,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MixedDamage {
    pub scenarios: MixedScenarios,
    pub distribution: Pmf,
    pub worst_distribution: Pmf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorBreakdownEntry {
    pub count: usize,
    pub expected_count: f64,
    pub events: BTreeMap<EventName, f64>,
}

/// The mixed (or single-run) pipeline view the report is assembled from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MixedOutput {
    pub resources: BTreeMap<ResourceKind, ResourceOutlook>,
    pub fight_occurrences: BTreeMap<EventName, MixedOccurrence>,
    pub fight_damage: MixedDamage,
    pub fight_instances: ScenarioInstances,
    pub event_occurrence: MixedOccurrence,
    pub event_damage: MixedDamage,
    pub event_instances: ScenarioInstances,
    pub negative: BTreeMap<EventName, MixedOccurrence>,
    pub sector_breakdown: BTreeMap<SectorType, SectorBreakdownEntry>,
}

fn weighted_scenarios(parts: &[(f64, ScenarioQuadruple)]) -> MixedScenarios {
    let mut mixed = MixedScenarios::default();
    for (weight, q) in parts {
        mixed.optimist += weight * q.optimist as f64;
        mixed.average += weight * q.average as f64;
        mixed.pessimist += weight * q.pessimist as f64;
        mixed.worst_case += weight * q.worst as f64;
        mixed.optimist_prob += weight * q.optimist_prob;
        mixed.average_prob += weight * q.average_prob;
        mixed.pessimist_prob += weight * q.pessimist_prob;
        mixed.worst_case_prob += weight * q.worst_prob;
    }
    mixed
}

fn scenario_value(q: &ScenarioQuadruple, kind: ScenarioKind) -> i64 {
    match kind {
        ScenarioKind::Optimist => q.optimist,
        ScenarioKind::Average => q.average,
        ScenarioKind::Pessimist => q.pessimist,
        ScenarioKind::WorstCase => q.worst,
    }
}

fn mixed_value(m: &MixedScenarios, kind: ScenarioKind) -> f64 {
    match kind {
        ScenarioKind::Optimist => m.optimist,
        ScenarioKind::Average => m.average,
        ScenarioKind::Pessimist => m.pessimist,
        ScenarioKind::WorstCase => m.worst_case,
    }
}

/// For each scenario, adopt the instances of the composition whose scenario
/// value matches the mixed value exactly (most probable on ties) or sits
/// closest to it.
fn pick_instances(
    parts: &[(f64, &ScenarioQuadruple, &ScenarioInstances)],
    mixed: &MixedScenarios,
) -> ScenarioInstances {
    let mut picked = ScenarioInstances::default();
    for kind in ScenarioKind::ALL {
        let target = mixed_value(mixed, kind);
        let mut best: Option<(f64, f64, &ScenarioInstances)> = None;
        for (weight, quadruple, instances) in parts {
            let distance = (scenario_value(quadruple, kind) as f64 - target).abs();
            let better = match best {
                None => true,
                Some((best_distance, best_weight, _)) => {
                    distance < best_distance - 1e-9
                        || (distance < best_distance + 1e-9 && *weight > best_weight)
                }
            };
            if better {
                best = Some((distance, *weight, *instances));
            }
        }
        if let Some((_, _, instances)) = best {
            picked.set(kind, instances.get(kind).clone());
        }
    }
    picked
}

fn mix_occurrence_maps<F>(
    outputs: &[(f64, PipelineOutput)],
    select: F,
) -> BTreeMap<EventName, MixedOccurrence>
where
    F: Fn(&PipelineOutput) -> BTreeMap<EventName, (Pmf, ScenarioQuadruple)>,
{
    let per_output: Vec<(f64, BTreeMap<EventName, (Pmf, ScenarioQuadruple)>)> = outputs
        .iter()
        .map(|(weight, output)| (*weight, select(output)))
        .collect();

    let mut keys: Vec<EventName> = Vec::new();
    for (_, map) in &per_output {
        for key in map.keys() {
            if !keys.contains(key) {
                keys.push(*key);
            }
        }
    }
    keys.sort();

    let zero = Pmf::delta(0);
    keys.into_iter()
        .map(|event| {
            let pmf = Pmf::mix(per_output.iter().map(|(weight, map)| {
                (*weight, map.get(&event).map(|(pmf, _)| pmf).unwrap_or(&zero))
            }));
            let scenarios = weighted_scenarios(
                &per_output
                    .iter()
                    .map(|(weight, map)| {
                        (
                            *weight,
                            map.get(&event)
                                .map(|(_, q)| *q)
                                .unwrap_or_default(),
                        )
                    })
                    .collect::<Vec<_>>(),
            );
            (event, MixedOccurrence { pmf, scenarios })
        })
        .collect()
}

fn sector_breakdown(
    outputs: &[(f64, PipelineOutput)],
    event_tables: &BTreeMap<SectorType, BTreeMap<EventName, f64>>,
) -> BTreeMap<SectorType, SectorBreakdownEntry> {
    let mut breakdown: BTreeMap<SectorType, SectorBreakdownEntry> = BTreeMap::new();
    for (weight, output) in outputs {
        let mut counts: BTreeMap<SectorType, usize> = BTreeMap::new();
        for sector in &output.visit_list {
            *counts.entry(*sector).or_insert(0) += 1;
        }
        for (sector, count) in counts {
            let entry = breakdown.entry(sector).or_default();
            entry.count = entry.count.max(count);
            entry.expected_count += weight * count as f64;
        }
    }
    for (sector, entry) in breakdown.iter_mut() {
        if let Some(events) = event_tables.get(sector) {
            entry.events = events.clone();
        }
    }
    breakdown
}

/// Convert a single pipeline run without mixing (the single-composition
/// shortcut: scenario integers survive exactly).
pub fn from_single(
    output: &PipelineOutput,
    event_tables: &BTreeMap<SectorType, BTreeMap<EventName, f64>>,
) -> MixedOutput {
    let single = [(1.0, output.clone())];
    mix(&single, event_tables)
}

/// Probability-mix pipeline runs. With one composition of weight 1 the
/// result equals that run's direct view.
pub fn mix(
    outputs: &[(f64, PipelineOutput)],
    event_tables: &BTreeMap<SectorType, BTreeMap<EventName, f64>>,
) -> MixedOutput {
    let mut resources = BTreeMap::new();
    for resource in ResourceKind::ALL {
        let zero = Pmf::delta(0);
        let distribution = Pmf::mix(outputs.iter().map(|(weight, output)| {
            (
                *weight,
                output
                    .resources
                    .get(&resource)
                    .and_then(|o| o.distribution.as_ref())
                    .unwrap_or(&zero),
            )
        }));
        let mut outlook = ResourceOutlook {
            distribution: Some(distribution),
            ..ResourceOutlook::default()
        };
        for (weight, output) in outputs {
            if let Some(part) = output.resources.get(&resource) {
                outlook.pessimist += weight * part.pessimist;
                outlook.average += weight * part.average;
                outlook.optimist += weight * part.optimist;
            }
        }
        resources.insert(resource, outlook);
    }

    let fight_occurrences = mix_occurrence_maps(outputs, |output| {
        output
            .fight
            .occurrences
            .iter()
            .map(|(event, result)| {
                (
                    *event,
                    (result.occurrence.pmf.clone(), result.occurrence.scenarios),
                )
            })
            .collect()
    });

    let negative = mix_occurrence_maps(outputs, |output| {
        output
            .negative
            .iter()
            .map(|(event, occurrence)| (*event, (occurrence.pmf.clone(), occurrence.scenarios)))
            .collect()
    });

    let fight_scenarios = weighted_scenarios(
        &outputs
            .iter()
            .map(|(weight, output)| (*weight, output.fight.scenarios))
            .collect::<Vec<_>>(),
    );
    let fight_damage = MixedDamage {
        scenarios: fight_scenarios,
        distribution: Pmf::mix(
            outputs
                .iter()
                .map(|(weight, output)| (*weight, &output.fight.damage_pmf)),
        ),
        worst_distribution: Pmf::mix(
            outputs
                .iter()
                .map(|(weight, output)| (*weight, &output.fight.worst_pmf)),
        ),
    };
    let fight_instances = pick_instances(
        &outputs
            .iter()
            .map(|(weight, output)| (*weight, &output.fight.scenarios, &output.fight.instances))
            .collect::<Vec<_>>(),
        &fight_scenarios,
    );

    let event_scenarios = weighted_scenarios(
        &outputs
            .iter()
            .map(|(weight, output)| (*weight, output.event_damage.scenarios))
            .collect::<Vec<_>>(),
    );
    let event_damage = MixedDamage {
        scenarios: event_scenarios,
        distribution: Pmf::mix(
            outputs
                .iter()
                .map(|(weight, output)| (*weight, &output.event_damage.damage_pmf)),
        ),
        worst_distribution: Pmf::mix(
            outputs
                .iter()
                .map(|(weight, output)| (*weight, &output.event_damage.worst_pmf)),
        ),
    };
    let event_instances = pick_instances(
        &outputs
            .iter()
            .map(|(weight, output)| {
                (
                    *weight,
                    &output.event_damage.scenarios,
                    &output.event_damage.instances,
                )
            })
            .collect::<Vec<_>>(),
        &event_scenarios,
    );

    let event_occurrence = {
        let pmf = Pmf::mix(
            outputs
                .iter()
                .map(|(weight, output)| (*weight, &output.event_damage.combined_occurrence)),
        );
        let scenarios = weighted_scenarios(
            &outputs
                .iter()
                .map(|(weight, output)| {
                    (
                        *weight,
                        ScenarioQuadruple::extract(&output.event_damage.combined_occurrence, false),
                    )
                })
                .collect::<Vec<_>>(),
        );
        MixedOccurrence { pmf, scenarios }
    };

    MixedOutput {
        resources,
        fight_occurrences,
        fight_damage,
        fight_instances,
        event_occurrence,
        event_damage,
        event_instances,
        negative,
        sector_breakdown: sector_breakdown(outputs, event_tables),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadruple(o: i64, a: i64, p: i64, w: i64) -> ScenarioQuadruple {
        ScenarioQuadruple {
            optimist: o,
            average: a,
            pessimist: p,
            worst: w,
            optimist_prob: 0.25,
            average_prob: 0.25,
            pessimist_prob: 0.25,
            worst_prob: 0.25,
        }
    }

    fn output_with_fight(q: ScenarioQuadruple, pmf: Pmf, visit: Vec<SectorType>) -> PipelineOutput {
        PipelineOutput {
            visit_list: visit,
            fight: FightResult {
                scenarios: q,
                damage_pmf: pmf.clone(),
                worst_pmf: pmf,
                ..FightResult::default()
            },
            ..PipelineOutput::default()
        }
    }

    #[test]
    fn single_composition_is_the_identity() {
        let output = output_with_fight(
            quadruple(0, 1, 2, 5),
            Pmf::bernoulli(0.5),
            vec![SectorType::Landing, SectorType::Forest],
        );
        let mixed = from_single(&output, &BTreeMap::new());
        assert_eq!(mixed.fight_damage.scenarios.average, 1.0);
        assert_eq!(mixed.fight_damage.scenarios.worst_case, 5.0);
        assert_eq!(mixed.fight_damage.distribution, output.fight.damage_pmf);
    }

    #[test]
    fn distributions_mix_linearly() {
        let a = output_with_fight(quadruple(0, 0, 0, 0), Pmf::delta(0), vec![SectorType::Landing]);
        let b = output_with_fight(
            quadruple(4, 4, 4, 4),
            Pmf::delta(4),
            vec![SectorType::Landing],
        );
        let mixed = mix(&[(0.75, a), (0.25, b)], &BTreeMap::new());
        assert!((mixed.fight_damage.distribution.get(0) - 0.75).abs() < 1e-12);
        assert!((mixed.fight_damage.distribution.get(4) - 0.25).abs() < 1e-12);
        assert!((mixed.fight_damage.scenarios.average - 1.0).abs() < 1e-12);
    }

    #[test]
    fn instances_come_from_the_best_matching_composition() {
        let mut instances_a = ScenarioInstances::default();
        instances_a.set(
            ScenarioKind::WorstCase,
            vec![crate::engines::DamageInstance {
                event_type: crate::engines::DamageInstanceType::Combined,
                count: 1,
                damage_per_instance: 0,
                sources: Vec::new(),
            }],
        );
        let mut a = output_with_fight(quadruple(0, 0, 0, 0), Pmf::delta(0), vec![]);
        a.fight.instances = instances_a;

        let mut instances_b = ScenarioInstances::default();
        instances_b.set(
            ScenarioKind::WorstCase,
            vec![crate::engines::DamageInstance {
                event_type: crate::engines::DamageInstanceType::Combined,
                count: 1,
                damage_per_instance: 8,
                sources: Vec::new(),
            }],
        );
        let mut b = output_with_fight(quadruple(8, 8, 8, 8), Pmf::delta(8), vec![]);
        b.fight.instances = instances_b;

        // Mixed worst = 0.9*0 + 0.1*8 = 0.8: composition A (worst 0) is
        // closest.
        let mixed = mix(&[(0.9, a), (0.1, b)], &BTreeMap::new());
        assert_eq!(mixed.fight_instances.worst_case[0].damage_per_instance, 0);
    }

    #[test]
    fn exact_match_prefers_the_most_probable_composition() {
        // Both compositions share the worst value 4, so the mixed value
        // matches both exactly; the heavier composition must win.
        let mark = |damage: i64| {
            let mut instances = ScenarioInstances::default();
            instances.set(
                ScenarioKind::WorstCase,
                vec![crate::engines::DamageInstance {
                    event_type: crate::engines::DamageInstanceType::Combined,
                    count: 1,
                    damage_per_instance: damage,
                    sources: Vec::new(),
                }],
            );
            instances
        };
        let mut a = output_with_fight(quadruple(4, 4, 4, 4), Pmf::delta(4), vec![]);
        a.fight.instances = mark(100);
        let mut b = output_with_fight(quadruple(4, 4, 4, 4), Pmf::delta(4), vec![]);
        b.fight.instances = mark(200);

        let mixed = mix(&[(0.2, a), (0.8, b)], &BTreeMap::new());
        assert_eq!(mixed.fight_instances.worst_case[0].damage_per_instance, 200);
    }

    #[test]
    fn occurrence_maps_union_over_compositions() {
        let mut a = output_with_fight(quadruple(0, 0, 0, 0), Pmf::delta(0), vec![]);
        a.fight.occurrences.insert(
            crate::enums::EventName::FightFixed(8),
            crate::occurrence::OccurrenceResult {
                occurrence: crate::occurrence::Occurrence {
                    pmf: Pmf::bernoulli(0.5),
                    scenarios: quadruple(0, 0, 1, 1),
                    max_possible: 1,
                },
                sources: Vec::new(),
            },
        );
        let b = output_with_fight(quadruple(0, 0, 0, 0), Pmf::delta(0), vec![]);

        let mixed = mix(&[(0.5, a), (0.5, b)], &BTreeMap::new());
        let occurrence = &mixed.fight_occurrences[&crate::enums::EventName::FightFixed(8)];
        // Composition B contributes a certain zero for the missing type.
        assert!((occurrence.pmf.get(0) - 0.75).abs() < 1e-12);
        assert!((occurrence.pmf.get(1) - 0.25).abs() < 1e-12);
        assert!((occurrence.scenarios.pessimist - 0.5).abs() < 1e-12);
    }

    #[test]
    fn breakdown_tracks_expected_and_nominal_counts() {
        let a = output_with_fight(
            quadruple(0, 0, 0, 0),
            Pmf::delta(0),
            vec![SectorType::Landing, SectorType::Forest, SectorType::Forest],
        );
        let b = output_with_fight(
            quadruple(0, 0, 0, 0),
            Pmf::delta(0),
            vec![SectorType::Landing, SectorType::Forest],
        );
        let mixed = mix(&[(0.5, a), (0.5, b)], &BTreeMap::new());
        let forest = &mixed.sector_breakdown[&SectorType::Forest];
        assert_eq!(forest.count, 2);
        assert!((forest.expected_count - 1.5).abs() < 1e-12);
        let landing = &mixed.sector_breakdown[&SectorType::Landing];
        assert_eq!(landing.count, 1);
        assert!((landing.expected_count - 1.0).abs() < 1e-12);
    }
}
