//! Fight damage engine: per-sector fight PMFs reduced by team fighting
//! power, exact convolution, grenade post-processing, and per-scenario
//! explanation paths.

use super::{
    run_pipeline, DamageInstance, DamageInstanceType, DamageSource, ScenarioInstances,
};
use crate::comparator::ComparisonResult;
use crate::config::GRENADE_DAMAGE_REDUCTION;
use crate::context::CalcContext;
use crate::distribution::{Pmf, ScenarioQuadruple};
use crate::enums::{EventName, ScenarioKind, SectorType, FIGHT_STRENGTHS};
use crate::error_handling::ConfigError;
use crate::fighting_power::FightingPower;
use crate::model::Loadout;
use crate::occurrence::{self, OccurrenceResult};
use crate::path::{self, OutcomeMenu, PathOutcome};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FightResult {
    /// Occurrence distribution per fight event present on the planet.
    pub occurrences: BTreeMap<EventName, OccurrenceResult>,
    /// "Any fight anywhere" count; its quartile buckets supply the
    /// scenario probabilities for fight damage.
    pub combined_occurrence: Pmf,
    pub damage_pmf: Pmf,
    pub worst_pmf: Pmf,
    pub scenarios: ScenarioQuadruple,
    pub instances: ScenarioInstances,
}

fn effective_damage(base: i64, power: i64) -> i64 {
    (base - power).max(0)
}

/// One sector's fight damage PMF. Residual probability sits on zero.
fn sector_fight_pmf(
    probabilities: &BTreeMap<EventName, f64>,
    power: i64,
) -> Pmf {
    let mut pmf = Pmf::new();
    let mut fighting_mass = 0.0;
    for (event, p) in probabilities {
        match event {
            EventName::FightFixed(k) => {
                pmf.add_mass(effective_damage(*k as i64, power), *p);
                fighting_mass += *p;
            }
            EventName::FightRandom => {
                let share = *p / FIGHT_STRENGTHS.len() as f64;
                for base in FIGHT_STRENGTHS {
                    pmf.add_mass(effective_damage(base as i64, power), share);
                }
                fighting_mass += *p;
            }
            _ => {}
        }
    }
    pmf.add_mass(0, 1.0 - fighting_mass);
    pmf
}

/// Outcome menu of one sector for path sampling, pre-grenade.
fn sector_fight_menu(
    probabilities: &BTreeMap<EventName, f64>,
    power: i64,
) -> OutcomeMenu {
    let mut menu = Vec::new();
    let mut fighting_mass = 0.0;
    for (event, p) in probabilities {
        match event {
            EventName::FightFixed(k) => {
                menu.push(PathOutcome {
                    event: Some(*event),
                    damage: effective_damage(*k as i64, power),
                    probability: *p,
                });
                fighting_mass += *p;
            }
            EventName::FightRandom => {
                let share = *p / FIGHT_STRENGTHS.len() as f64;
                for base in FIGHT_STRENGTHS {
                    menu.push(PathOutcome {
                        event: Some(*event),
                        damage: effective_damage(base as i64, power),
                        probability: share,
                    });
                }
                fighting_mass += *p;
            }
            _ => {}
        }
    }
    menu.push(PathOutcome {
        event: None,
        damage: 0,
        probability: 1.0 - fighting_mass,
    });
    menu
}

pub fn calculate(
    ctx: &mut CalcContext<'_>,
    sectors: &[SectorType],
    loadout: &Loadout,
    fp: FightingPower,
    comparison: &ComparisonResult,
) -> Result<FightResult, ConfigError> {
    let fight_exclusions = comparison.fight_exclusions();

    // Which fight events exist anywhere on the visit list.
    let mut fight_events: Vec<EventName> = Vec::new();
    for sector in sectors {
        for event in ctx.probabilities(*sector, loadout)?.keys() {
            if event.is_fight() && !fight_events.contains(event) {
                fight_events.push(*event);
            }
        }
    }
    fight_events.sort();

    let mut occurrences = BTreeMap::new();
    let mut per_type_pmfs = BTreeMap::new();
    for event in &fight_events {
        let result = occurrence::calculate_for_type(ctx, sectors, loadout, *event)?;
        per_type_pmfs.insert(*event, result.occurrence.pmf.clone());
        occurrences.insert(*event, result);
    }
    let combined_occurrence = occurrence::combine_occurrences(&per_type_pmfs);

    // Per-sector damage PMFs, then the shared pipeline with the grenade
    // shift as post-processing. Grenades model optimal use without naming
    // specific fights: the whole distribution slides left.
    let grenade_shift = GRENADE_DAMAGE_REDUCTION * fp.grenades as i64;
    let shift = move |pmf: Pmf| pmf.map_values(|v| (v - grenade_shift).max(0));
    let power = fp.power;

    let mut sector_pmfs: Vec<Pmf> = Vec::with_capacity(sectors.len());
    for sector in sectors {
        let probabilities = ctx.probabilities(*sector, loadout)?;
        sector_pmfs.push(sector_fight_pmf(probabilities, power));
    }

    let output = run_pipeline(
        sectors,
        |index, _| {
            let normal = sector_pmfs[index].clone();
            let worst = if fight_exclusions.contains(&index) {
                Pmf::delta(0)
            } else {
                normal.clone()
            };
            Ok::<_, ConfigError>((normal, worst))
        },
        Some(&shift),
    )?;

    let mut scenarios = ScenarioQuadruple::extract_with_worst(&output.pmf, &output.worst_pmf);
    // The reported probabilities come from the combined occurrence count,
    // not from the damage buckets.
    let occurrence_buckets = ScenarioQuadruple::extract(&combined_occurrence, false);
    scenarios.optimist_prob = occurrence_buckets.optimist_prob;
    scenarios.average_prob = occurrence_buckets.average_prob;
    scenarios.pessimist_prob = occurrence_buckets.pessimist_prob;
    scenarios.worst_prob = occurrence_buckets.worst_prob;

    // Explanation paths over the fighting sectors only.
    let mut menu_positions: Vec<usize> = Vec::new();
    let mut menus: Vec<OutcomeMenu> = Vec::new();
    for (index, sector) in sectors.iter().enumerate() {
        let probabilities = ctx.probabilities(*sector, loadout)?;
        if probabilities.keys().any(|e| e.is_fight()) {
            menu_positions.push(index);
            menus.push(sector_fight_menu(probabilities, power));
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
        let sampled = path::sample_path(&mut ctx.rng, &menus, target + grenade_shift);
        let sources = sampled
            .map(|assignment| {
                assignment
                    .iter()
                    .map(|s| DamageSource {
                        sector_type: sectors[menu_positions[s.position]],
                        sector_index: menu_positions[s.position],
                        probability: s.outcome.probability,
                        zero_damage: s.outcome.damage == 0,
                    })
                    .collect()
            })
            .unwrap_or_default();
        instances.set(
            kind,
            vec![DamageInstance {
                event_type: DamageInstanceType::Combined,
                count: 1,
                damage_per_instance: target,
                sources,
            }],
        );
    }

    // Worst case is deterministic: every non-excluded fighting sector at
    // its strongest fight.
    let worst_sources: Vec<DamageSource> = menu_positions
        .iter()
        .map(|index| {
            let probabilities = &sector_pmfs[*index];
            DamageSource {
                sector_type: sectors[*index],
                sector_index: *index,
                probability: 1.0 - probabilities.get(0),
                zero_damage: fight_exclusions.contains(index),
            }
        })
        .collect();
    instances.set(
        ScenarioKind::WorstCase,
        vec![DamageInstance {
            event_type: DamageInstanceType::Combined,
            count: 1,
            damage_per_instance: scenarios.worst,
            sources: worst_sources,
        }],
    );

    Ok(FightResult {
        occurrences,
        combined_occurrence,
        damage_pmf: output.pmf,
        worst_pmf: output.worst_pmf,
        scenarios,
        instances,
    })
}
