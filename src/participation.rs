//! The oxygen gate: who may leave the ship at all.

use crate::enums::SectorType;
use crate::model::{ItemId, Planet, Player, Toggles};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParticipationReason {
    Ok,
    NoSpaceSuit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationStatus {
    pub can_participate: bool,
    pub reason: ParticipationReason,
}

/// A planet is breathable when it has an OXYGEN sector or the oxygenless
/// toggle is off. On an unbreathable planet only space-suited players leave
/// the ship.
pub fn planet_is_breathable(planet: &Planet, toggles: &Toggles) -> bool {
    !toggles.oxygenless_planet || planet.has_sector(SectorType::Oxygen)
}

pub fn participation_status(
    players: &[Player],
    planet: &Planet,
    toggles: &Toggles,
) -> Vec<ParticipationStatus> {
    let breathable = planet_is_breathable(planet, toggles);
    players
        .iter()
        .map(|player| {
            if breathable || player.has_item(ItemId::SpaceSuit) {
                ParticipationStatus {
                    can_participate: true,
                    reason: ParticipationReason::Ok,
                }
            } else {
                ParticipationStatus {
                    can_participate: false,
                    reason: ParticipationReason::NoSpaceSuit,
                }
            }
        })
        .collect()
}

/// The players who actually join the expedition, in original team order.
pub fn participants<'a>(players: &'a [Player], status: &[ParticipationStatus]) -> Vec<&'a Player> {
    players
        .iter()
        .zip(status)
        .filter(|(_, s)| s.can_participate)
        .map(|(p, _)| p)
        .collect()
}
