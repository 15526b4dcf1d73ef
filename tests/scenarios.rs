//! End-to-end seed scenarios with literal inputs. Every scenario here is
//! exactly reproducible: no RNG participates in scenario values.

use expedition_wasm::api::dto::{ExpeditionRequest, PlayerDto};
use expedition_wasm::api::runner::calculate;
use expedition_wasm::enums::{Mode, SectorType};
use expedition_wasm::spreader::EffectKind;

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
        mode: Mode::Icarus,
        ..ExpeditionRequest::default()
    }
}

#[test]
fn no_team_yields_resources_but_no_damage() {
    let report = calculate(&request(
        vec![SectorType::Landing, SectorType::Forest],
        vec![],
    ))
    .unwrap();

    assert!(report.health_by_scenario.optimist.is_empty());
    assert!(report.health_by_scenario.average.is_empty());
    assert!(report.health_by_scenario.pessimist.is_empty());
    assert!(report.health_by_scenario.worst_case.is_empty());

    assert_eq!(report.combat.damage.optimist, 0.0);
    assert_eq!(report.combat.damage.average, 0.0);
    assert_eq!(report.combat.damage.pessimist, 0.0);
    assert_eq!(report.combat.damage.worst_case, 0.0);

    // FOREST has HARVEST events, so fruits flow even without a crew.
    assert!(report.resources.fruits.average > 0.0);
}

#[test]
fn single_unarmed_player_on_safe_planet() {
    let report = calculate(&request(
        vec![SectorType::Landing, SectorType::Forest, SectorType::Desert],
        vec![player(1, &[], &[])],
    ))
    .unwrap();

    assert_eq!(report.combat.fighting_power, 1);
    assert_eq!(report.combat.grenade_count, 0);

    let damage = &report.combat.damage;
    assert!(damage.optimist <= damage.average);
    assert!(damage.average <= damage.pessimist);
    assert!(damage.pessimist <= damage.worst_case);

    let event = &report.event_damage.damage;
    assert!(event.optimist <= event.average);
    assert!(event.average <= event.pessimist);
    assert!(event.pessimist <= event.worst_case);
}

#[test]
fn a_grenade_lowers_worst_case_combat_only() {
    let without = calculate(&request(
        vec![SectorType::Landing, SectorType::Forest, SectorType::Desert],
        vec![player(1, &[], &[])],
    ))
    .unwrap();
    let with = calculate(&request(
        vec![SectorType::Landing, SectorType::Forest, SectorType::Desert],
        vec![player(1, &[], &["GRENADE"])],
    ))
    .unwrap();

    assert_eq!(with.combat.grenade_count, 1);
    assert!(with.combat.damage.worst_case < without.combat.damage.worst_case);

    // Resources are untouched by grenades.
    assert_eq!(
        with.resources.fruits.average,
        without.resources.fruits.average
    );
    assert_eq!(with.resources.fuel.average, without.resources.fuel.average);
}

#[test]
fn rope_absorbs_the_mountain_accident_in_the_worst_case() {
    let report = calculate(&request(
        vec![SectorType::Landing, SectorType::Mountain],
        vec![player(1, &[], &["ROPE"])],
    ))
    .unwrap();

    let effects = &report.effects_by_scenario.worst_case[0];
    assert!(
        effects.iter().any(|e| e.kind == EffectKind::Rope),
        "rope badge missing: {:?}",
        effects
    );

    // Worst case: LANDING disaster deals 5, the MOUNTAIN accident is
    // absorbed entirely by the rope.
    assert_eq!(report.health_by_scenario.worst_case, vec![14 - 5]);
}

#[test]
fn sprint_team_on_a_twelve_sector_planet_triggers_sampling() {
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
    let report = calculate(&request(
        sectors,
        vec![player(1, &["SPRINT"], &[]), player(2, &["SPRINT"], &[])],
    ))
    .unwrap();

    // ICARUS base 9 plus two sprinters: capacity 11 against 12 sectors.
    let sampling = report.sampling.expect("sampling must be enabled");
    assert!(sampling.enabled);
    assert!(sampling.composition_count > 0);
    let total: f64 = sampling.compositions.iter().map(|c| c.probability).sum();
    assert!((total - 1.0).abs() < 1e-9, "composition mass {}", total);
    for composition in &sampling.compositions {
        assert_eq!(composition.total(), 11);
    }
}

#[test]
fn pilot_removes_all_landing_damage() {
    let report = calculate(&request(
        vec![SectorType::Landing],
        vec![player(1, &["PILOT"], &[])],
    ))
    .unwrap();

    assert_eq!(report.event_damage.damage.worst_case, 0.0);
    assert_eq!(report.health_by_scenario.worst_case, vec![14]);
}

#[test]
fn one_player_one_landing_only_landing_events_fire() {
    let report = calculate(&request(
        vec![SectorType::Landing],
        vec![player(1, &[], &[])],
    ))
    .unwrap();

    // No fight occurrence of any type.
    assert!(report.combat.occurrence.is_empty());
    // Only LANDING appears in the breakdown.
    assert_eq!(report.sector_breakdown.len(), 1);
    assert!(report.sector_breakdown.contains_key(&SectorType::Landing));
}

#[test]
fn zero_movement_equals_the_landing_only_pipeline() {
    let mut limited = request(
        vec![SectorType::Landing, SectorType::Forest, SectorType::Desert],
        vec![player(1, &[], &[])],
    );
    limited.movement_capacity = Some(0);
    let limited_report = calculate(&limited).unwrap();

    let landing_only = calculate(&request(
        vec![SectorType::Landing],
        vec![player(1, &[], &[])],
    ))
    .unwrap();

    let sampling = limited_report.sampling.as_ref().unwrap();
    assert_eq!(sampling.composition_count, 1);
    assert!((sampling.compositions[0].probability - 1.0).abs() < 1e-12);
    assert_eq!(sampling.compositions[0].total(), 0);

    assert_eq!(limited_report.resources, landing_only.resources);
    assert_eq!(limited_report.combat.damage, landing_only.combat.damage);
    assert_eq!(
        limited_report.event_damage.damage,
        landing_only.event_damage.damage
    );
    assert_eq!(
        limited_report.health_by_scenario,
        landing_only.health_by_scenario
    );
    assert_eq!(
        limited_report.sector_breakdown,
        landing_only.sector_breakdown
    );
}

#[test]
fn oxygenless_planet_strands_suitless_players() {
    let mut r = request(
        vec![SectorType::Landing, SectorType::Forest, SectorType::Predator],
        vec![player(1, &[], &[]), player(2, &[], &["SPACE_SUIT"])],
    );
    r.toggles.oxygenless_planet = true;
    let report = calculate(&r).unwrap();

    assert!(!report.participation_status[0].can_participate);
    assert!(report.participation_status[1].can_participate);
    assert_eq!(report.combat.player_count, 1);

    // The stranded player takes no damage in any scenario.
    assert_eq!(report.health_by_scenario.worst_case[0], 14);
    assert_eq!(report.health_by_scenario.pessimist[0], 14);
    assert_eq!(report.health_by_scenario.average[0], 14);
    assert_eq!(report.health_by_scenario.optimist[0], 14);
    // The suited one is exposed.
    assert!(report.health_by_scenario.worst_case[1] < 14);
}
