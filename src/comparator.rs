//! Worst-outcome comparison: for every sector, score the worst damaging
//! outcome across its fight and damage events, decide which family "wins"
//! the worst case, and derive the mutual-exclusion sets the worst-case
//! engines consume. Grenades are allocated greedily, strongest fight first.

use crate::config::GRENADE_DAMAGE_REDUCTION;
use crate::context::CalcContext;
use crate::enums::{EventName, SectorType};
use crate::error_handling::ConfigError;
use crate::fighting_power::FightingPower;
use crate::model::Loadout;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorstKind {
    Fight,
    Event,
    None,
}

/// The worst-case verdict for one sector position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorWorst {
    pub sector_type: SectorType,
    pub kind: WorstKind,
    pub worst_event: Option<EventName>,
    /// Team damage of the winning side's worst outcome.
    pub team_damage: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonResult {
    pub sectors: Vec<SectorWorst>,
    /// Whether a grenade was spent on each sector's fight (same indices).
    pub grenade_spent: Vec<bool>,
}

impl ComparisonResult {
    /// Sectors whose fight damage is silenced in the fight worst case
    /// (their event outcome wins there).
    pub fn fight_exclusions(&self) -> HashSet<usize> {
        self.sectors
            .iter()
            .enumerate()
            .filter(|(_, s)| s.kind == WorstKind::Event)
            .map(|(i, _)| i)
            .collect()
    }

    /// Sectors whose event damage is silenced in the event worst case.
    pub fn event_exclusions(&self) -> HashSet<usize> {
        self.sectors
            .iter()
            .enumerate()
            .filter(|(_, s)| s.kind == WorstKind::Fight)
            .map(|(i, _)| i)
            .collect()
    }
}

fn score(team_damage: i64, max_to_one: i64) -> i64 {
    team_damage * 100 + max_to_one * 10
}

/// Base damage of a fight event before fighting power.
fn fight_base(event: EventName) -> Option<i64> {
    match event {
        EventName::FightFixed(k) => Some(k as i64),
        EventName::FightRandom => Some(32),
        _ => None,
    }
}

/// Team damage and single-player maximum of a damage event's worst roll.
fn event_worst(event: EventName, participants: usize) -> Option<(i64, i64)> {
    let (_, base_max) = event.damage_range()?;
    if event.affects_all() {
        Some((base_max * participants as i64, base_max))
    } else {
        Some((base_max, base_max))
    }
}

/// Compare every sector's worst fight against its worst damage event.
pub fn compare(
    ctx: &mut CalcContext<'_>,
    sectors: &[SectorType],
    loadout: &Loadout,
    fp: FightingPower,
    participants: usize,
) -> Result<ComparisonResult, ConfigError> {
    let participants = participants.max(1);

    // Collect the strongest fight base per sector, then allocate grenades
    // greedily starting from the highest base damage.
    let mut strongest_fight: Vec<Option<i64>> = Vec::with_capacity(sectors.len());
    let mut worst_event_side: Vec<Option<(EventName, i64, i64)>> = Vec::with_capacity(sectors.len());

    for sector in sectors {
        let config = ctx.data.sector_config(*sector)?;
        let configured_worst = config.worst_event;
        let probabilities = ctx.probabilities(*sector, loadout)?;

        let best_fight = probabilities
            .keys()
            .filter_map(|event| fight_base(*event))
            .max();
        strongest_fight.push(best_fight);

        // Event side: the configured worst event when present on the
        // (modified) menu, otherwise the highest-scoring damage event left.
        let event_side = configured_worst
            .filter(|event| probabilities.contains_key(event))
            .or_else(|| {
                probabilities
                    .keys()
                    .filter(|event| event.is_damage_event())
                    .max_by_key(|event| {
                        event_worst(**event, participants)
                            .map(|(total, single)| score(total, single))
                            .unwrap_or(0)
                    })
                    .copied()
            })
            .and_then(|event| {
                event_worst(event, participants).map(|(total, single)| (event, total, single))
            });
        worst_event_side.push(event_side);
    }

    let mut grenade_spent = vec![false; sectors.len()];
    let mut grenades_remaining = fp.grenades;
    let mut fight_order: Vec<usize> = (0..sectors.len())
        .filter(|i| strongest_fight[*i].is_some())
        .collect();
    fight_order.sort_by_key(|i| std::cmp::Reverse(strongest_fight[*i].unwrap()));

    for index in fight_order {
        if grenades_remaining == 0 {
            break;
        }
        let base = strongest_fight[index].unwrap();
        let plain = (base - fp.power).max(0);
        let boosted = (base - fp.power - GRENADE_DAMAGE_REDUCTION).max(0);
        if boosted < plain {
            grenade_spent[index] = true;
            grenades_remaining -= 1;
        }
    }

    let mut result_sectors = Vec::with_capacity(sectors.len());
    for (index, sector) in sectors.iter().enumerate() {
        let fight_side = strongest_fight[index].map(|base| {
            let mut effective = (base - fp.power).max(0);
            if grenade_spent[index] {
                effective = (base - fp.power - GRENADE_DAMAGE_REDUCTION).max(0);
            }
            let max_to_one = (effective + participants as i64 - 1) / participants as i64;
            (effective, max_to_one)
        });
        let event_side = worst_event_side[index];

        let verdict = match (fight_side, event_side) {
            (None, None) => SectorWorst {
                sector_type: *sector,
                kind: WorstKind::None,
                worst_event: None,
                team_damage: 0,
            },
            (Some((total, _)), None) => SectorWorst {
                sector_type: *sector,
                kind: WorstKind::Fight,
                worst_event: None,
                team_damage: total,
            },
            (None, Some((event, total, _))) => SectorWorst {
                sector_type: *sector,
                kind: WorstKind::Event,
                worst_event: Some(event),
                team_damage: total,
            },
            (Some((fight_total, fight_single)), Some((event, event_total, event_single))) => {
                // Ties go to the fight side.
                if score(fight_total, fight_single) >= score(event_total, event_single) {
                    SectorWorst {
                        sector_type: *sector,
                        kind: WorstKind::Fight,
                        worst_event: None,
                        team_damage: fight_total,
                    }
                } else {
                    SectorWorst {
                        sector_type: *sector,
                        kind: WorstKind::Event,
                        worst_event: Some(event),
                        team_damage: event_total,
                    }
                }
            }
        };
        result_sectors.push(verdict);
    }

    Ok(ComparisonResult {
        sectors: result_sectors,
        grenade_spent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::game_data;

    fn run(sectors: &[SectorType], power: i64, grenades: usize, players: usize) -> ComparisonResult {
        let mut ctx = CalcContext::new(game_data(), 0);
        compare(
            &mut ctx,
            sectors,
            &Loadout::default(),
            FightingPower { power, grenades },
            players,
        )
        .unwrap()
    }

    #[test]
    fn landing_worst_is_the_disaster() {
        let result = run(&[SectorType::Landing], 1, 0, 2);
        assert_eq!(result.sectors[0].kind, WorstKind::Event);
        assert_eq!(result.sectors[0].worst_event, Some(EventName::Disaster35));
        // DISASTER hits everyone for up to 5.
        assert_eq!(result.sectors[0].team_damage, 10);
    }

    #[test]
    fn cold_sectors_worst_is_the_accident_even_for_big_teams() {
        let result = run(&[SectorType::Cold], 1, 0, 6);
        assert_eq!(result.sectors[0].worst_event, Some(EventName::Accident35));
        assert_eq!(result.sectors[0].team_damage, 5);
    }

    #[test]
    fn fight_only_sector_wins_the_fight_side() {
        let result = run(&[SectorType::Predator], 1, 0, 2);
        assert_eq!(result.sectors[0].kind, WorstKind::Fight);
        // FIGHT_12 minus power 1.
        assert_eq!(result.sectors[0].team_damage, 11);
    }

    #[test]
    fn quiet_sector_has_no_worst_side() {
        let result = run(&[SectorType::Desert], 1, 0, 2);
        assert_eq!(result.sectors[0].kind, WorstKind::None);
        assert!(result.fight_exclusions().is_empty());
        assert!(result.event_exclusions().is_empty());
    }

    #[test]
    fn exclusion_sets_never_overlap() {
        let result = run(
            &[
                SectorType::Landing,
                SectorType::Predator,
                SectorType::Desert,
                SectorType::Mountain,
            ],
            1,
            0,
            3,
        );
        let fights = result.fight_exclusions();
        let events = result.event_exclusions();
        assert!(fights.is_disjoint(&events));
        // LANDING and MOUNTAIN silence their (absent) fights; PREDATOR
        // silences its (absent) events; DESERT appears in neither.
        assert!(fights.contains(&0));
        assert!(fights.contains(&3));
        assert!(events.contains(&1));
        assert!(!fights.contains(&2) && !events.contains(&2));
    }

    #[test]
    fn grenades_go_to_the_strongest_fight_first() {
        let result = run(&[SectorType::Predator, SectorType::Mankarog], 1, 1, 2);
        assert!(result.grenade_spent[1], "MANKAROG fight is stronger");
        assert!(!result.grenade_spent[0]);
        assert_eq!(result.sectors[1].team_damage, 32 - 1 - 3);
    }

    #[test]
    fn grenade_is_kept_when_it_cannot_help() {
        // Power 20 already floors FIGHT_12 to zero damage.
        let result = run(&[SectorType::Predator], 20, 1, 2);
        assert!(!result.grenade_spent[0]);
        assert_eq!(result.sectors[0].team_damage, 0);
    }

    #[test]
    fn grenade_pool_is_tracked_across_sectors() {
        let result = run(
            &[
                SectorType::Mankarog,
                SectorType::Predator,
                SectorType::Forest,
            ],
            1,
            2,
            2,
        );
        // Two grenades: MANKAROG (32) and PREDATOR (12); FOREST (8) gets none.
        assert!(result.grenade_spent[0]);
        assert!(result.grenade_spent[1]);
        assert!(!result.grenade_spent[2]);
    }
}
