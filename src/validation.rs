//! Request validation. Everything here is an InvalidInput rejection;
//! expected user states (no sectors, no players) pass through and get
//! empty results downstream.

use crate::api::dto::ExpeditionRequest;
use crate::config::{GameData, ABILITY_SLOTS, ITEM_SLOTS, MAX_PLAYERS, MAX_SECTORS};
use crate::enums::SectorType;
use crate::error_handling::CalcError;
use std::collections::BTreeMap;

pub fn validate_request(data: &GameData, request: &ExpeditionRequest) -> Result<(), CalcError> {
    if request.team.len() > MAX_PLAYERS {
        return Err(CalcError::InvalidInput(format!(
            "too many players: {} (maximum {})",
            request.team.len(),
            MAX_PLAYERS
        )));
    }

    let mut seen_ids = Vec::new();
    for player in &request.team {
        if seen_ids.contains(&player.id) {
            return Err(CalcError::InvalidInput(format!(
                "duplicate player id: {}",
                player.id
            )));
        }
        seen_ids.push(player.id);

        if player.max_health < 0 {
            return Err(CalcError::InvalidInput(format!(
                "player {} has negative health",
                player.id
            )));
        }
        if player.abilities.len() > ABILITY_SLOTS {
            return Err(CalcError::InvalidInput(format!(
                "player {} has {} ability slots (maximum {})",
                player.id,
                player.abilities.len(),
                ABILITY_SLOTS
            )));
        }
        if player.items.len() > ITEM_SLOTS {
            return Err(CalcError::InvalidInput(format!(
                "player {} has {} item slots (maximum {})",
                player.id,
                player.items.len(),
                ITEM_SLOTS
            )));
        }
    }

    if request.sectors.len() > MAX_SECTORS {
        return Err(CalcError::InvalidInput(format!(
            "too many sectors: {} (maximum {})",
            request.sectors.len(),
            MAX_SECTORS
        )));
    }

    let mut counts: BTreeMap<SectorType, usize> = BTreeMap::new();
    for sector in &request.sectors {
        *counts.entry(*sector).or_insert(0) += 1;
    }
    for (sector, count) in counts {
        let cap = data.sector_config(sector)?.max_per_planet;
        if count > cap {
            return Err(CalcError::InvalidInput(format!(
                "{} appears {} times (maximum {})",
                sector, count, cap
            )));
        }
    }

    Ok(())
}
