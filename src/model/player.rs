use super::loadout::{AbilityId, ItemId, Loadout, ProjectId};
use crate::enums::Mode;
use serde::{Deserialize, Serialize};

/// One crew member as the engines see them: slots already parsed, ability
/// aliases expanded, unknown entries dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: u32,
    pub avatar: String,
    pub abilities: Vec<AbilityId>,
    pub items: Vec<ItemId>,
    pub max_health: i32,
}

impl Player {
    /// Parse wire-format slot strings into a typed player. Empty and unknown
    /// slot entries are skipped silently; SKILLFUL expands in place.
    pub fn from_slots(
        id: u32,
        avatar: &str,
        ability_slots: &[String],
        item_slots: &[String],
        max_health: i32,
    ) -> Self {
        let mut abilities = Vec::new();
        for slot in ability_slots {
            if slot.is_empty() {
                continue;
            }
            if let Ok(ability) = slot.parse::<AbilityId>() {
                abilities.extend_from_slice(ability.expand());
            }
        }

        let mut items = Vec::new();
        for slot in item_slots {
            if slot.is_empty() {
                continue;
            }
            if let Ok(item) = slot.parse::<ItemId>() {
                items.push(item);
            }
        }

        Player {
            id,
            avatar: avatar.to_string(),
            abilities,
            items,
            max_health,
        }
    }

    pub fn has_ability(&self, ability: AbilityId) -> bool {
        self.abilities.contains(&ability)
    }

    pub fn has_item(&self, item: ItemId) -> bool {
        self.items.contains(&item)
    }

    pub fn count_item(&self, item: ItemId) -> usize {
        self.items.iter().filter(|i| **i == item).count()
    }

    pub fn carries_firearm(&self) -> bool {
        self.items.iter().any(|i| i.is_firearm())
    }
}

/// Global expedition toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Toggles {
    pub antigrav_active: bool,
    pub centauri_active: bool,
    pub oxygenless_planet: bool,
}

/// The whole crew plus global toggles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Team {
    pub players: Vec<Player>,
    pub mode: Mode,
    pub toggles: Toggles,
}

impl Team {
    /// SPRINT bonus counts across the whole team, including players who end
    /// up unable to participate.
    pub fn sprint_count(&self) -> usize {
        self.players
            .iter()
            .flat_map(|p| p.abilities.iter())
            .filter(|a| **a == AbilityId::Sprint)
            .count()
    }

    /// Combined loadout of the given participants, with active projects
    /// appended from the toggles.
    pub fn loadout_of(&self, participants: &[&Player]) -> Loadout {
        let mut loadout = Loadout::default();
        for player in participants {
            loadout.abilities.extend(player.abilities.iter().copied());
            loadout.items.extend(player.items.iter().copied());
        }
        if self.toggles.antigrav_active {
            loadout.projects.push(ProjectId::AntigravPropeller);
        }
        if self.toggles.centauri_active {
            loadout.projects.push(ProjectId::CentauriBase);
        }
        loadout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn from_slots_skips_empty_and_unknown() {
        let player = Player::from_slots(
            1,
            "ann",
            &strings(&["PILOT", "", "JUGGLER", "SPRINT"]),
            &strings(&["BLASTER", "", "MYSTERY_BOX"]),
            14,
        );
        assert_eq!(player.abilities, vec![AbilityId::Pilot, AbilityId::Sprint]);
        assert_eq!(player.items, vec![ItemId::Blaster]);
    }

    #[test]
    fn from_slots_expands_skillful() {
        let player = Player::from_slots(2, "bo", &strings(&["SKILLFUL"]), &[], 14);
        assert_eq!(
            player.abilities,
            vec![AbilityId::Botanic, AbilityId::Survival]
        );
    }

    #[test]
    fn sprint_counts_whole_team() {
        let team = Team {
            players: vec![
                Player::from_slots(1, "a", &strings(&["SPRINT"]), &[], 14),
                Player::from_slots(2, "b", &strings(&["SPRINT", "SPRINT"]), &[], 14),
            ],
            ..Team::default()
        };
        assert_eq!(team.sprint_count(), 3);
    }

    #[test]
    fn loadout_includes_toggled_projects() {
        let team = Team {
            players: vec![Player::from_slots(1, "a", &[], &strings(&["BLASTER"]), 14)],
            mode: Mode::Icarus,
            toggles: Toggles {
                antigrav_active: true,
                centauri_active: false,
                oxygenless_planet: false,
            },
        };
        let refs: Vec<&Player> = team.players.iter().collect();
        let loadout = team.loadout_of(&refs);
        assert!(loadout.has_project(ProjectId::AntigravPropeller));
        assert!(!loadout.has_project(ProjectId::CentauriBase));
        assert!(loadout.has_item(ItemId::Blaster));
    }
}
