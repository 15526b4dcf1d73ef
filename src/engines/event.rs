//! Damage-event engine: fatigue, accidents and disasters. Tracks team-total
//! damage for convolution; per-player attribution is deferred to the
//! spreader via damage instances.

use super::{
    run_pipeline, DamageInstance, DamageInstanceType, DamageSource, ScenarioInstances,
};
use crate::comparator::{ComparisonResult, WorstKind};
use crate::context::CalcContext;
use crate::distribution::{Pmf, ScenarioQuadruple};
use crate::enums::{EventName, ScenarioKind, SectorType};
use crate::error_handling::ConfigError;
use crate::model::Loadout;
use crate::occurrence::{self, OccurrenceResult};
use crate::path::{self, OutcomeMenu, PathOutcome};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDamageResult {
    pub occurrences: BTreeMap<EventName, OccurrenceResult>,
    pub combined_occurrence: Pmf,
    pub damage_pmf: Pmf,
    pub worst_pmf: Pmf,
    pub scenarios: ScenarioQuadruple,
    pub instances: ScenarioInstances,
}

/// Team cost of one event roll: spread events multiply by the headcount,
/// single-target events do not.
fn team_cost(event: EventName, base: i64, participants: usize) -> i64 {
    if event.affects_all() {
        base * participants as i64
    } else {
        base
    }
}

/// One sector's team-damage PMF. Variable events spread their sub-support
/// uniformly; residual mass sits on zero.
fn sector_event_pmf(
    probabilities: &BTreeMap<EventName, f64>,
    participants: usize,
) -> Pmf {
    let mut pmf = Pmf::new();
    let mut damaging_mass = 0.0;
    for (event, p) in probabilities {
        if let Some((low, high)) = event.damage_range() {
            let values = (high - low + 1) as f64;
            for base in low..=high {
                pmf.add_mass(team_cost(*event, base, participants), *p / values);
            }
            damaging_mass += *p;
        }
    }
    pmf.add_mass(0, 1.0 - damaging_mass);
    pmf
}

/// Worst-case variant of one sector: the configured worst event fires with
/// certainty at its full sub-support.
fn sector_worst_pmf(worst_event: EventName, participants: usize) -> Pmf {
    let (low, high) = worst_event
        .damage_range()
        .expect("worst event must be a damage event");
    let values = (high - low + 1) as f64;
    let mut pmf = Pmf::new();
    for base in low..=high {
        pmf.add_mass(team_cost(worst_event, base, participants), 1.0 / values);
    }
    pmf
}

fn sector_event_menu(
    probabilities: &BTreeMap<EventName, f64>,
    participants: usize,
) -> OutcomeMenu {
    let mut menu = Vec::new();
    let mut damaging_mass = 0.0;
    for (event, p) in probabilities {
        if let Some((low, high)) = event.damage_range() {
            let values = (high - low + 1) as f64;
            for base in low..=high {
                menu.push(PathOutcome {
                    event: Some(*event),
                    damage: team_cost(*event, base, participants),
                    probability: *p / values,
                });
            }
            damaging_mass += *p;
        }
    }
    menu.push(PathOutcome {
        event: None,
        damage: 0,
        probability: 1.0 - damaging_mass,
    });
    menu
}

/// Group sampled outcomes into instances keyed by event type and per-player
/// damage.
fn instances_from_assignment(
    sectors: &[SectorType],
    menu_positions: &[usize],
    assignment: &[path::SampledOutcome],
    participants: usize,
) -> Vec<DamageInstance> {
    let mut grouped: BTreeMap<(EventName, i64), DamageInstance> = BTreeMap::new();
    for sampled in assignment {
        let event = match sampled.outcome.event {
            Some(event) if sampled.outcome.damage > 0 => event,
            _ => continue,
        };
        let per_player = if event.affects_all() {
            sampled.outcome.damage / participants.max(1) as i64
        } else {
            sampled.outcome.damage
        };
        let instance_type = match DamageInstanceType::from_event(event) {
            Some(t) => t,
            None => continue,
        };
        let sector_index = menu_positions[sampled.position];
        let entry = grouped
            .entry((event, per_player))
            .or_insert_with(|| DamageInstance {
                event_type: instance_type,
                count: 0,
                damage_per_instance: per_player,
                sources: Vec::new(),
            });
        entry.count += 1;
        entry.sources.push(DamageSource {
            sector_type: sectors[sector_index],
            sector_index,
            probability: sampled.outcome.probability,
            zero_damage: false,
        });
    }
    grouped.into_values().collect()
}

pub fn calculate(
    ctx: &mut CalcContext<'_>,
    sectors: &[SectorType],
    loadout: &Loadout,
    participants: usize,
    comparison: &ComparisonResult,
) -> Result<EventDamageResult, ConfigError> {
    let event_exclusions = comparison.event_exclusions();

    let mut damage_events: Vec<EventName> = Vec::new();
    for sector in sectors {
        for event in ctx.probabilities(*sector, loadout)?.keys() {
            if event.is_damage_event() && !damage_events.contains(event) {
                damage_events.push(*event);
            }
        }
    }
    damage_events.sort();

    let mut occurrences = BTreeMap::new();
    let mut per_type_pmfs = BTreeMap::new();
    for event in &damage_events {
        let result = occurrence::calculate_for_type(ctx, sectors, loadout, *event)?;
        per_type_pmfs.insert(*event, result.occurrence.pmf.clone());
        occurrences.insert(*event, result);
    }
    let combined_occurrence = occurrence::combine_occurrences(&per_type_pmfs);

    let mut sector_pmfs: Vec<Pmf> = Vec::with_capacity(sectors.len());
    for sector in sectors {
        let probabilities = ctx.probabilities(*sector, loadout)?;
        sector_pmfs.push(sector_event_pmf(probabilities, participants));
    }

    let output = run_pipeline(
        sectors,
        |index, _| {
            let normal = sector_pmfs[index].clone();
            let worst = if event_exclusions.contains(&index) {
                Pmf::delta(0)
            } else {
                match comparison.sectors[index].worst_event {
                    Some(worst_event) if comparison.sectors[index].kind == WorstKind::Event => {
                        sector_worst_pmf(worst_event, participants)
                    }
                    _ => Pmf::delta(0),
                }
            };
            Ok::<_, ConfigError>((normal, worst))
        },
        None,
    )?;

    let mut scenarios = ScenarioQuadruple::extract_with_worst(&output.pmf, &output.worst_pmf);
    let occurrence_buckets = ScenarioQuadruple::extract(&combined_occurrence, false);
    scenarios.optimist_prob = occurrence_buckets.optimist_prob;
    scenarios.average_prob = occurrence_buckets.average_prob;
    scenarios.pessimist_prob = occurrence_buckets.pessimist_prob;
    scenarios.worst_prob = occurrence_buckets.worst_prob;

    let mut menu_positions: Vec<usize> = Vec::new();
    let mut menus: Vec<OutcomeMenu> = Vec::new();
    for (index, sector) in sectors.iter().enumerate() {
        let probabilities = ctx.probabilities(*sector, loadout)?;
        if probabilities.keys().any(|e| e.is_damage_event()) {
            menu_positions.push(index);
            menus.push(sector_event_menu(probabilities, participants));
        }
    }

    let mut instances = ScenarioInstances::default();
    for kind in [
        ScenarioKind::Optimist,
        ScenarioKind::Average,
        ScenarioKind::Pessimist,
    ] {
        let target = match kind {
            ScenarioKind::Optimist => scenarios.optimist,
            ScenarioKind::Average => scenarios.average,
            _ => scenarios.pessimist,
        };
        let sampled = path::sample_path(&mut ctx.rng, &menus, target).unwrap_or_default();
        instances.set(
            kind,
            instances_from_assignment(sectors, &menu_positions, &sampled, participants),
        );
    }

    // Worst case comes straight from the comparator verdicts: every
    // non-excluded sector fires its worst event at the top roll.
    let mut worst_instances: BTreeMap<(EventName, i64), DamageInstance> = BTreeMap::new();
    for (index, verdict) in comparison.sectors.iter().enumerate() {
        if verdict.kind != WorstKind::Event {
            continue;
        }
        let worst_event = match verdict.worst_event {
            Some(event) => event,
            None => continue,
        };
        let (_, base_max) = match worst_event.damage_range() {
            Some(range) => range,
            None => continue,
        };
        let probability = ctx
            .probabilities(sectors[index], loadout)?
            .get(&worst_event)
            .copied()
            .unwrap_or(0.0);
        let instance_type = match DamageInstanceType::from_event(worst_event) {
            Some(t) => t,
            None => continue,
        };
        let entry = worst_instances
            .entry((worst_event, base_max))
            .or_insert_with(|| DamageInstance {
                event_type: instance_type,
                count: 0,
                damage_per_instance: base_max,
                sources: Vec::new(),
            });
        entry.count += 1;
        entry.sources.push(DamageSource {
            sector_type: sectors[index],
            sector_index: index,
            probability,
            zero_damage: false,
        });
    }
    instances.set(
        ScenarioKind::WorstCase,
        worst_instances.into_values().collect(),
    );

    Ok(EventDamageResult {
        occurrences,
        combined_occurrence,
        damage_pmf: output.pmf,
        worst_pmf: output.worst_pmf,
        scenarios,
        instances,
    })
}
