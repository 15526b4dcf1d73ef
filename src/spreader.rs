//! Per-player damage distribution: fight totals split evenly, event damage
//! dispatched by event type, sequential reductions (survival then armour),
//! sector-specific immunity, and the final health floor.

use crate::config::GameData;
use crate::engines::{DamageInstance, DamageInstanceType};
use crate::model::{AbilityId, ItemId, Player};
use crate::participation::ParticipationStatus;
use serde::{Deserialize, Serialize};

/// UI badge kinds for triggered reductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    #[serde(rename = "SURVIVAL")]
    Survival,
    #[serde(rename = "PLASTENITE_ARMOR")]
    PlasteniteArmor,
    #[serde(rename = "ROPE")]
    Rope,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Effect {
    pub kind: EffectKind,
    /// Damage points absorbed by the effect.
    pub amount: i64,
}

/// One scenario's outcome for the whole team, indexed like the input
/// player list (non-participants keep their max health and no effects).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadResult {
    pub health: Vec<i32>,
    pub effects: Vec<Vec<Effect>>,
}

/// One damage hit on one participant, before reductions.
#[derive(Clone)]
struct Hit {
    amount: i64,
    is_fight: bool,
}

fn immunity_item(
    data: &GameData,
    player: &Player,
    instance: &DamageInstance,
    source_index: usize,
) -> Option<ItemId> {
    let source = instance.sources.get(source_index)?;
    let event = match instance.event_type {
        DamageInstanceType::Tired2 => crate::enums::EventName::Tired2,
        DamageInstanceType::Accident35 => crate::enums::EventName::Accident35,
        DamageInstanceType::Disaster35 => crate::enums::EventName::Disaster35,
        DamageInstanceType::Combined => return None,
    };
    player.items.iter().copied().find(|item| {
        data.item_effect(*item)
            .sector_immunity
            .contains(&(source.sector_type, event))
    })
}

/// Spread one scenario's instances across the participating players.
pub fn spread_scenario(
    data: &GameData,
    players: &[Player],
    status: &[ParticipationStatus],
    fight_instances: &[DamageInstance],
    event_instances: &[DamageInstance],
) -> SpreadResult {
    let participant_indices: Vec<usize> = status
        .iter()
        .enumerate()
        .filter(|(_, s)| s.can_participate)
        .map(|(i, _)| i)
        .collect();
    let participant_count = participant_indices.len();

    let mut hits: Vec<Vec<Hit>> = vec![Vec::new(); players.len()];
    let mut effects: Vec<Vec<Effect>> = vec![Vec::new(); players.len()];

    if participant_count > 0 {
        // Fight damage splits evenly; the first `remainder` participants
        // carry the extra point.
        for instance in fight_instances {
            let total = instance.damage_per_instance * instance.count as i64;
            if total <= 0 {
                continue;
            }
            let base = total / participant_count as i64;
            let remainder = (total % participant_count as i64) as usize;
            for (order, player_index) in participant_indices.iter().enumerate() {
                let amount = base + if order < remainder { 1 } else { 0 };
                if amount > 0 {
                    hits[*player_index].push(Hit {
                        amount,
                        is_fight: true,
                    });
                }
            }
        }

        // Event damage dispatches by type. Accidents pick one participant
        // per firing, round-robin in original team order.
        let mut accident_cursor = 0usize;
        for instance in event_instances {
            for firing in 0..instance.count {
                if instance.event_type.affects_all() {
                    for player_index in &participant_indices {
                        apply_event_hit(
                            data,
                            &players[*player_index],
                            instance,
                            firing,
                            &mut hits[*player_index],
                            &mut effects[*player_index],
                        );
                    }
                } else {
                    let player_index =
                        participant_indices[accident_cursor % participant_count];
                    accident_cursor += 1;
                    apply_event_hit(
                        data,
                        &players[player_index],
                        instance,
                        firing,
                        &mut hits[player_index],
                        &mut effects[player_index],
                    );
                }
            }
        }
    }

    // Sequential reductions, each per damage instance, each floored at 0:
    // survival first, then armour (fight damage only).
    let mut health = Vec::with_capacity(players.len());
    for (player_index, player) in players.iter().enumerate() {
        let has_survival = player.has_ability(AbilityId::Survival);
        let has_armor = player.has_item(ItemId::PlasteniteArmor);
        let mut total = 0i64;
        for hit in &hits[player_index] {
            let mut amount = hit.amount;
            if has_survival && amount > 0 {
                let reduced = (amount - 1).max(0);
                effects[player_index].push(Effect {
                    kind: EffectKind::Survival,
                    amount: amount - reduced,
                });
                amount = reduced;
            }
            if has_armor && hit.is_fight && amount > 0 {
                let reduced = (amount - 1).max(0);
                effects[player_index].push(Effect {
                    kind: EffectKind::PlasteniteArmor,
                    amount: amount - reduced,
                });
                amount = reduced;
            }
            total += amount;
        }
        let final_health = (player.max_health as i64 - total).max(0);
        health.push(final_health as i32);
    }

    SpreadResult { health, effects }
}

fn apply_event_hit(
    data: &GameData,
    player: &Player,
    instance: &DamageInstance,
    firing: usize,
    hits: &mut Vec<Hit>,
    effects: &mut Vec<Effect>,
) {
    if instance.damage_per_instance <= 0 {
        return;
    }
    if immunity_item(data, player, instance, firing).is_some() {
        effects.push(Effect {
            kind: EffectKind::Rope,
            amount: instance.damage_per_instance,
        });
        return;
    }
    hits.push(Hit {
        amount: instance.damage_per_instance,
        is_fight: false,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::game_data;
    use crate::engines::DamageSource;
    use crate::enums::SectorType;
    use crate::participation::ParticipationReason;

    fn all_in(count: usize) -> Vec<ParticipationStatus> {
        vec![
            ParticipationStatus {
                can_participate: true,
                reason: ParticipationReason::Ok,
            };
            count
        ]
    }

    fn player(id: u32, abilities: &[&str], items: &[&str]) -> Player {
        let abilities: Vec<String> = abilities.iter().map(|s| s.to_string()).collect();
        let items: Vec<String> = items.iter().map(|s| s.to_string()).collect();
        Player::from_slots(id, "p", &abilities, &items, 14)
    }

    fn fight(total: i64) -> DamageInstance {
        DamageInstance {
            event_type: DamageInstanceType::Combined,
            count: 1,
            damage_per_instance: total,
            sources: Vec::new(),
        }
    }

    fn event(
        event_type: DamageInstanceType,
        damage: i64,
        sector: SectorType,
        count: usize,
    ) -> DamageInstance {
        DamageInstance {
            event_type,
            count,
            damage_per_instance: damage,
            sources: (0..count)
                .map(|i| DamageSource {
                    sector_type: sector,
                    sector_index: i,
                    probability: 0.25,
                    zero_damage: false,
                })
                .collect(),
        }
    }

    #[test]
    fn fight_damage_splits_with_remainder_up_front() {
        let players = [player(1, &[], &[]), player(2, &[], &[]), player(3, &[], &[])];
        let result = spread_scenario(game_data(), &players, &all_in(3), &[fight(7)], &[]);
        assert_eq!(result.health, vec![14 - 3, 14 - 2, 14 - 2]);
    }

    #[test]
    fn tired_hits_every_participant() {
        let players = [player(1, &[], &[]), player(2, &[], &[])];
        let instance = event(DamageInstanceType::Tired2, 2, SectorType::StrongWind, 1);
        let result = spread_scenario(game_data(), &players, &all_in(2), &[], &[instance]);
        assert_eq!(result.health, vec![12, 12]);
    }

    #[test]
    fn accidents_round_robin_over_participants() {
        let players = [player(1, &[], &[]), player(2, &[], &[])];
        let instance = event(DamageInstanceType::Accident35, 4, SectorType::Cold, 3);
        let result = spread_scenario(game_data(), &players, &all_in(2), &[], &[instance]);
        // Firings alternate: player 1 takes two, player 2 takes one.
        assert_eq!(result.health, vec![14 - 8, 14 - 4]);
    }

    #[test]
    fn survival_shaves_one_per_instance() {
        let players = [player(1, &["SURVIVAL"], &[])];
        let tired = event(DamageInstanceType::Tired2, 2, SectorType::StrongWind, 2);
        let result = spread_scenario(game_data(), &players, &all_in(1), &[], &[tired]);
        // Two instances of 2 damage, each reduced to 1.
        assert_eq!(result.health, vec![12]);
        let survival_uses = result.effects[0]
            .iter()
            .filter(|e| e.kind == EffectKind::Survival)
            .count();
        assert_eq!(survival_uses, 2);
    }

    #[test]
    fn armor_only_stops_fight_damage() {
        let players = [player(1, &[], &["PLASTENITE_ARMOR"])];
        let tired = event(DamageInstanceType::Tired2, 2, SectorType::StrongWind, 1);
        let result = spread_scenario(game_data(), &players, &all_in(1), &[fight(5)], &[tired]);
        // Fight 5 reduced to 4 by armour; event 2 untouched.
        assert_eq!(result.health, vec![14 - 4 - 2]);
        let armor_uses = result.effects[0]
            .iter()
            .filter(|e| e.kind == EffectKind::PlasteniteArmor)
            .count();
        assert_eq!(armor_uses, 1);
    }

    #[test]
    fn rope_absorbs_mountain_accidents() {
        let players = [player(1, &[], &["ROPE"])];
        let accident = event(DamageInstanceType::Accident35, 5, SectorType::Mountain, 1);
        let result = spread_scenario(game_data(), &players, &all_in(1), &[], &[accident]);
        assert_eq!(result.health, vec![14]);
        assert!(result.effects[0]
            .iter()
            .any(|e| e.kind == EffectKind::Rope && e.amount == 5));
    }

    #[test]
    fn rope_does_not_cover_other_sectors() {
        let players = [player(1, &[], &["ROPE"])];
        let accident = event(DamageInstanceType::Accident35, 5, SectorType::Cold, 1);
        let result = spread_scenario(game_data(), &players, &all_in(1), &[], &[accident]);
        assert_eq!(result.health, vec![9]);
    }

    #[test]
    fn health_never_goes_negative() {
        let players = [player(1, &[], &[])];
        let result = spread_scenario(game_data(), &players, &all_in(1), &[fight(100)], &[]);
        assert_eq!(result.health, vec![0]);
    }

    #[test]
    fn non_participants_keep_their_health() {
        let players = [player(1, &[], &[]), player(2, &[], &[])];
        let status = vec![
            ParticipationStatus {
                can_participate: false,
                reason: ParticipationReason::NoSpaceSuit,
            },
            ParticipationStatus {
                can_participate: true,
                reason: ParticipationReason::Ok,
            },
        ];
        let result = spread_scenario(game_data(), &players, &status, &[fight(6)], &[]);
        assert_eq!(result.health, vec![14, 8]);
        assert!(result.effects[0].is_empty());
    }

    #[test]
    fn no_participants_means_no_damage() {
        let players = [player(1, &[], &[])];
        let status = vec![ParticipationStatus {
            can_participate: false,
            reason: ParticipationReason::NoSpaceSuit,
        }];
        let result = spread_scenario(game_data(), &players, &status, &[fight(10)], &[]);
        assert_eq!(result.health, vec![14]);
    }
}
