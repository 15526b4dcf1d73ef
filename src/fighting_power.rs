//! Team fighting power and grenade pool aggregation.

use crate::config::GameData;
use crate::model::{ItemId, Player, Toggles};

/// Scalar summary of the team's ability to reduce fight damage, plus the
/// consumable grenade pool (grenades are never part of permanent FP).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FightingPower {
    pub power: i64,
    pub grenades: usize,
}

pub fn aggregate(data: &GameData, participants: &[&Player], toggles: &Toggles) -> FightingPower {
    let mut power = participants.len() as i64;
    let mut grenades = 0;

    for player in participants {
        for item in &player.items {
            if *item == ItemId::Grenade {
                grenades += 1;
                continue;
            }
            power += data.item_effect(*item).combat_bonus;
        }

        for ability in &player.abilities {
            let effect = data.ability_effect(*ability);
            if effect.power_bonus == 0 {
                continue;
            }
            if effect.requires_firearm && !player.carries_firearm() {
                continue;
            }
            power += effect.power_bonus;
        }

        if toggles.centauri_active {
            power += data.centauri_blaster_bonus * player.count_item(ItemId::Blaster) as i64;
        }
    }

    FightingPower { power, grenades }
}
