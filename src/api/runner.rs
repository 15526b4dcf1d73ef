//! Orchestration of one calculation: oxygen gate, fighting power, the
//! exclusion comparison, the four engines, optional sector sampling with
//! mixing, and the per-scenario spread.

use crate::api::dto::{
    CombatReport, DamageReport, EffectsByScenario, EventDamageReport, ExpeditionReport,
    ExpeditionRequest, HealthByScenario, NegativeEventReport, OccurrenceReport, ResourcesReport,
    SamplingReport,
};
use crate::comparator;
use crate::config::{game_data, GameData};
use crate::context::CalcContext;
use crate::distribution::Pmf;
use crate::engines::{event, fight};
use crate::enums::{EventName, ScenarioKind, SectorType};
use crate::error_handling::{CalcError, ConfigError};
use crate::fighting_power::{self, FightingPower};
use crate::mixing::{self, MixedOutput, PipelineOutput};
use crate::model::{Loadout, Planet, Player, Team};
use crate::occurrence;
use crate::participation;
use crate::resources::{ResourceKind, ResourceOutlook};
use crate::sampling;
use crate::spreader;
use crate::validation;
use std::collections::BTreeMap;

/// Run one calculation against the default game tables.
pub fn calculate(request: &ExpeditionRequest) -> Result<ExpeditionReport, CalcError> {
    calculate_with_data(game_data(), request)
}

/// Run one calculation against explicit tables (config overrides, tests).
pub fn calculate_with_data(
    data: &GameData,
    request: &ExpeditionRequest,
) -> Result<ExpeditionReport, CalcError> {
    validation::validate_request(data, request)?;

    let players: Vec<Player> = request
        .team
        .iter()
        .map(|p| Player::from_slots(p.id, &p.avatar, &p.abilities, &p.items, p.max_health))
        .collect();
    let team = Team {
        players,
        mode: request.mode,
        toggles: request.toggles,
    };

    // An empty sector list is a well-defined empty result, not an error.
    if request.sectors.is_empty() {
        return Ok(empty_report(&team));
    }

    let planet = Planet::from_sectors(&request.sectors);
    let status = participation::participation_status(&team.players, &planet, &team.toggles);
    let participants = participation::participants(&team.players, &status);
    let loadout = team.loadout_of(&participants);
    let fp = fighting_power::aggregate(data, &participants, &team.toggles);

    let mut ctx = CalcContext::new(data, request.seed.unwrap_or(0));

    // Per-type event probabilities for the sector breakdown.
    let mut event_tables: BTreeMap<SectorType, BTreeMap<EventName, f64>> = BTreeMap::new();
    for sector in planet.full_visit_list() {
        if !event_tables.contains_key(&sector) {
            let table = ctx
                .probabilities(sector, &loadout)?
                .iter()
                .map(|(event, p)| (*event, *p))
                .collect();
            event_tables.insert(sector, table);
        }
    }

    let capacity = sampling::movement_capacity(&team, request.movement_capacity);
    let sampling_active = (capacity as usize) < planet.roaming_count();

    let (mixed, sampling_report) = if sampling_active {
        let compositions = sampling::sample_compositions(&mut ctx, &planet, &loadout, capacity);
        log::debug!(
            "sampling active: capacity {} of {} sectors, {} compositions retained",
            capacity,
            planet.roaming_count(),
            compositions.len()
        );
        let mut outputs = Vec::with_capacity(compositions.len());
        for composition in &compositions {
            let visit = composition.visit_list();
            let output = run_pipeline_for(&mut ctx, &visit, &loadout, fp, participants.len())?;
            outputs.push((composition.probability, output));
        }
        let mixed = mixing::mix(&outputs, &event_tables);
        let report = SamplingReport {
            enabled: true,
            composition_count: compositions.len(),
            compositions,
        };
        (mixed, Some(report))
    } else {
        let visit = planet.full_visit_list();
        let output = run_pipeline_for(&mut ctx, &visit, &loadout, fp, participants.len())?;
        (mixing::from_single(&output, &event_tables), None)
    };

    Ok(assemble_report(
        data,
        &team,
        &status,
        fp,
        participants.len(),
        mixed,
        sampling_report,
    ))
}

/// The full pipeline for one fixed visit list, spreading excluded.
fn run_pipeline_for(
    ctx: &mut CalcContext<'_>,
    visit: &[SectorType],
    loadout: &Loadout,
    fp: FightingPower,
    participant_count: usize,
) -> Result<PipelineOutput, ConfigError> {
    let mut resources = BTreeMap::new();
    for resource in ResourceKind::ALL {
        let outlook = crate::resources::calculate_resource(ctx, visit, loadout, resource)?;
        resources.insert(resource, outlook);
    }

    let mut negative = BTreeMap::new();
    let mut negative_events: Vec<EventName> = Vec::new();
    for sector in visit {
        for event in ctx.probabilities(*sector, loadout)?.keys() {
            if event.is_negative() && !negative_events.contains(event) {
                negative_events.push(*event);
            }
        }
    }
    for event in negative_events {
        let result = occurrence::calculate_for_type(ctx, visit, loadout, event)?;
        negative.insert(event, result.occurrence);
    }

    // With nobody on the expedition no damage can land; the engines are
    // skipped and zeroed results keep the report shape stable.
    let (fight_result, event_result) = if participant_count > 0 {
        let comparison = comparator::compare(ctx, visit, loadout, fp, participant_count)?;
        let fight_result = fight::calculate(ctx, visit, loadout, fp, &comparison)?;
        let event_result = event::calculate(ctx, visit, loadout, participant_count, &comparison)?;
        (fight_result, event_result)
    } else {
        (zeroed_fight(), zeroed_event())
    };

    Ok(PipelineOutput {
        visit_list: visit.to_vec(),
        resources,
        fight: fight_result,
        event_damage: event_result,
        negative,
    })
}

fn zeroed_fight() -> fight::FightResult {
    fight::FightResult {
        combined_occurrence: Pmf::delta(0),
        damage_pmf: Pmf::delta(0),
        worst_pmf: Pmf::delta(0),
        ..fight::FightResult::default()
    }
}

fn zeroed_event() -> event::EventDamageResult {
    event::EventDamageResult {
        combined_occurrence: Pmf::delta(0),
        damage_pmf: Pmf::delta(0),
        worst_pmf: Pmf::delta(0),
        ..event::EventDamageResult::default()
    }
}

fn assemble_report(
    data: &GameData,
    team: &Team,
    status: &[participation::ParticipationStatus],
    fp: FightingPower,
    participant_count: usize,
    mixed: MixedOutput,
    sampling_report: Option<SamplingReport>,
) -> ExpeditionReport {
    let resource = |kind: ResourceKind| -> ResourceOutlook {
        mixed.resources.get(&kind).cloned().unwrap_or_default()
    };
    let resources = ResourcesReport {
        fruits: resource(ResourceKind::Fruits),
        steaks: resource(ResourceKind::Steaks),
        fuel: resource(ResourceKind::Fuel),
        oxygen: resource(ResourceKind::Oxygen),
        artefacts: resource(ResourceKind::Artefacts),
        map_fragments: resource(ResourceKind::MapFragments),
    };

    let mut health = HealthByScenario::default();
    let mut effects = EffectsByScenario::default();
    for kind in ScenarioKind::ALL {
        let spread = spreader::spread_scenario(
            data,
            &team.players,
            status,
            mixed.fight_instances.get(kind),
            mixed.event_instances.get(kind),
        );
        match kind {
            ScenarioKind::Optimist => {
                health.optimist = spread.health;
                effects.optimist = spread.effects;
            }
            ScenarioKind::Average => {
                health.average = spread.health;
                effects.average = spread.effects;
            }
            ScenarioKind::Pessimist => {
                health.pessimist = spread.health;
                effects.pessimist = spread.effects;
            }
            ScenarioKind::WorstCase => {
                health.worst_case = spread.health;
                effects.worst_case = spread.effects;
            }
        }
    }

    let negative_events = mixed
        .negative
        .iter()
        .map(|(event, occurrence)| {
            (
                *event,
                NegativeEventReport {
                    pessimist: occurrence.scenarios.pessimist,
                    average: occurrence.scenarios.average,
                    optimist: occurrence.scenarios.optimist,
                },
            )
        })
        .collect();

    ExpeditionReport {
        resources,
        combat: CombatReport {
            occurrence: mixed
                .fight_occurrences
                .iter()
                .map(|(event, occurrence)| (*event, OccurrenceReport::from(occurrence)))
                .collect(),
            damage: DamageReport::from(&mixed.fight_damage),
            damage_instances: mixed.fight_instances,
            fighting_power: fp.power,
            grenade_count: fp.grenades,
            player_count: participant_count,
        },
        event_damage: EventDamageReport {
            occurrence: OccurrenceReport::from(&mixed.event_occurrence),
            damage: DamageReport::from(&mixed.event_damage),
            damage_instances: mixed.event_instances,
        },
        negative_events,
        sector_breakdown: mixed.sector_breakdown,
        health_by_scenario: health,
        effects_by_scenario: effects,
        participation_status: status.to_vec(),
        sampling: sampling_report,
    }
}

/// Boundary case: no sectors selected. Everything zero, participation
/// empty, players keep their health.
fn empty_report(team: &Team) -> ExpeditionReport {
    let health: Vec<i32> = team.players.iter().map(|p| p.max_health).collect();
    let per_player_effects: Vec<Vec<spreader::Effect>> = vec![Vec::new(); team.players.len()];
    ExpeditionReport {
        health_by_scenario: HealthByScenario {
            optimist: health.clone(),
            average: health.clone(),
            pessimist: health.clone(),
            worst_case: health,
        },
        effects_by_scenario: EffectsByScenario {
            optimist: per_player_effects.clone(),
            average: per_player_effects.clone(),
            pessimist: per_player_effects.clone(),
            worst_case: per_player_effects,
        },
        ..ExpeditionReport::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::dto::PlayerDto;

    fn player(id: u32, abilities: &[&str], items: &[&str]) -> PlayerDto {
        PlayerDto {
            id,
            avatar: String::new(),
            abilities: abilities.iter().map(|s| s.to_string()).collect(),
            items: items.iter().map(|s| s.to_string()).collect(),
            max_health: 14,
        }
    }

    fn request(sectors: Vec<SectorType>, team: Vec<PlayerDto>) -> ExpeditionRequest {
        ExpeditionRequest {
            sectors,
            team,
            ..ExpeditionRequest::default()
        }
    }

    #[test]
    fn empty_sectors_give_an_empty_report() {
        let report = calculate(&request(vec![], vec![player(1, &[], &[])])).unwrap();
        assert_eq!(report.resources.fruits.average, 0.0);
        assert!(report.participation_status.is_empty());
        assert_eq!(report.health_by_scenario.worst_case, vec![14]);
        assert!(report.sampling.is_none());
    }

    #[test]
    fn single_player_single_landing() {
        let report = calculate(&request(
            vec![SectorType::Landing],
            vec![player(1, &[], &[])],
        ))
        .unwrap();
        assert_eq!(report.combat.fighting_power, 1);
        assert_eq!(report.combat.grenade_count, 0);
        assert_eq!(report.combat.player_count, 1);
        // No fights anywhere on a lone landing sector.
        assert!(report.combat.occurrence.is_empty());
        assert_eq!(report.combat.damage.worst_case, 0.0);
        // But landing damage events can fire.
        assert!(report.event_damage.damage.worst_case > 0.0);
    }

    #[test]
    fn report_shape_survives_an_empty_team() {
        let report = calculate(&request(
            vec![SectorType::Landing, SectorType::Forest],
            vec![],
        ))
        .unwrap();
        assert!(report.resources.fruits.average > 0.0);
        assert_eq!(report.combat.damage.worst_case, 0.0);
        assert_eq!(report.event_damage.damage.worst_case, 0.0);
        assert!(report.health_by_scenario.average.is_empty());
    }

    #[test]
    fn sector_breakdown_covers_every_visited_type() {
        let report = calculate(&request(
            vec![SectorType::Landing, SectorType::Forest, SectorType::Desert],
            vec![player(1, &[], &[])],
        ))
        .unwrap();
        for sector in [SectorType::Landing, SectorType::Forest, SectorType::Desert] {
            let entry = &report.sector_breakdown[&sector];
            assert_eq!(entry.count, 1);
            let total: f64 = entry.events.values().sum();
            assert!((total - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn negative_events_are_reported_for_lost_sectors() {
        let report = calculate(&request(
            vec![SectorType::Landing, SectorType::Lost, SectorType::Desert],
            vec![player(1, &[], &[])],
        ))
        .unwrap();
        assert!(report.negative_events.contains_key(&EventName::KillLost));
        assert!(report.negative_events.contains_key(&EventName::Again));
        let again = &report.negative_events[&EventName::Again];
        assert!(again.pessimist >= again.optimist);
    }

    #[test]
    fn movement_shortfall_activates_sampling() {
        let sectors = vec![
            SectorType::Forest,
            SectorType::Forest,
            SectorType::Forest,
            SectorType::Forest,
            SectorType::Desert,
            SectorType::Desert,
            SectorType::Desert,
            SectorType::Desert,
            SectorType::Ocean,
            SectorType::Ocean,
            SectorType::Ocean,
            SectorType::Ocean,
        ];
        let team = vec![
            player(1, &["SPRINT"], &[]),
            player(2, &["SPRINT"], &[]),
        ];
        let report = calculate(&request(sectors, team)).unwrap();
        let sampling = report.sampling.expect("sampling must be active");
        assert!(sampling.enabled);
        assert!(sampling.composition_count > 0);
        let total: f64 = sampling.compositions.iter().map(|c| c.probability).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ample_movement_keeps_sampling_off() {
        let report = calculate(&request(
            vec![SectorType::Landing, SectorType::Forest],
            vec![player(1, &[], &[])],
        ))
        .unwrap();
        assert!(report.sampling.is_none());
    }
}
