use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Crew abilities relevant to expeditions. SKILLFUL is an alias that the
/// parse layer expands to BOTANIC + SURVIVAL before the engines see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AbilityId {
    Survival,
    Botanic,
    Pilot,
    Gunman,
    Diplomacy,
    Sprint,
    Skillful,
    Tracker,
    Traitor,
}

impl AbilityId {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbilityId::Survival => "SURVIVAL",
            AbilityId::Botanic => "BOTANIC",
            AbilityId::Pilot => "PILOT",
            AbilityId::Gunman => "GUNMAN",
            AbilityId::Diplomacy => "DIPLOMACY",
            AbilityId::Sprint => "SPRINT",
            AbilityId::Skillful => "SKILLFUL",
            AbilityId::Tracker => "TRACKER",
            AbilityId::Traitor => "TRAITOR",
        }
    }

    /// Alias expansion. Non-alias abilities expand to themselves.
    pub fn expand(&self) -> &'static [AbilityId] {
        match self {
            AbilityId::Skillful => &[AbilityId::Botanic, AbilityId::Survival],
            AbilityId::Survival => &[AbilityId::Survival],
            AbilityId::Botanic => &[AbilityId::Botanic],
            AbilityId::Pilot => &[AbilityId::Pilot],
            AbilityId::Gunman => &[AbilityId::Gunman],
            AbilityId::Diplomacy => &[AbilityId::Diplomacy],
            AbilityId::Sprint => &[AbilityId::Sprint],
            AbilityId::Tracker => &[AbilityId::Tracker],
            AbilityId::Traitor => &[AbilityId::Traitor],
        }
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AbilityId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALL: [AbilityId; 9] = [
            AbilityId::Survival,
            AbilityId::Botanic,
            AbilityId::Pilot,
            AbilityId::Gunman,
            AbilityId::Diplomacy,
            AbilityId::Sprint,
            AbilityId::Skillful,
            AbilityId::Tracker,
            AbilityId::Traitor,
        ];
        ALL.iter()
            .find(|a| a.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown ability: {}", s))
    }
}

/// Expedition-relevant items a player can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemId {
    Blaster,
    MachineGun,
    NatamyRifle,
    SniperRifle,
    MissileLauncher,
    HeatSeeker,
    Grenade,
    PlasteniteArmor,
    SpaceSuit,
    Rope,
    Driller,
    WhiteFlag,
    QuadCompass,
    TradModule,
    EchoSounder,
}

impl ItemId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemId::Blaster => "BLASTER",
            ItemId::MachineGun => "MACHINE_GUN",
            ItemId::NatamyRifle => "NATAMY_RIFLE",
            ItemId::SniperRifle => "SNIPER_RIFLE",
            ItemId::MissileLauncher => "MISSILE_LAUNCHER",
            ItemId::HeatSeeker => "HEAT_SEEKER",
            ItemId::Grenade => "GRENADE",
            ItemId::PlasteniteArmor => "PLASTENITE_ARMOR",
            ItemId::SpaceSuit => "SPACE_SUIT",
            ItemId::Rope => "ROPE",
            ItemId::Driller => "DRILLER",
            ItemId::WhiteFlag => "WHITE_FLAG",
            ItemId::QuadCompass => "QUAD_COMPASS",
            ItemId::TradModule => "TRAD_MODULE",
            ItemId::EchoSounder => "ECHO_SOUNDER",
        }
    }

    pub fn is_firearm(&self) -> bool {
        matches!(
            self,
            ItemId::Blaster
                | ItemId::MachineGun
                | ItemId::NatamyRifle
                | ItemId::SniperRifle
                | ItemId::MissileLauncher
                | ItemId::HeatSeeker
        )
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALL: [ItemId; 15] = [
            ItemId::Blaster,
            ItemId::MachineGun,
            ItemId::NatamyRifle,
            ItemId::SniperRifle,
            ItemId::MissileLauncher,
            ItemId::HeatSeeker,
            ItemId::Grenade,
            ItemId::PlasteniteArmor,
            ItemId::SpaceSuit,
            ItemId::Rope,
            ItemId::Driller,
            ItemId::WhiteFlag,
            ItemId::QuadCompass,
            ItemId::TradModule,
            ItemId::EchoSounder,
        ];
        ALL.iter()
            .find(|i| i.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown item: {}", s))
    }
}

/// Ship research projects that influence expeditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectId {
    AntigravPropeller,
    CentauriBase,
}

impl ProjectId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectId::AntigravPropeller => "ANTIGRAV_PROPELLER",
            ProjectId::CentauriBase => "CENTAURI_BASE",
        }
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Combined team loadout fed to the weight modifiers. Ability aliases are
/// already expanded and multiplicities preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Loadout {
    pub abilities: Vec<AbilityId>,
    pub items: Vec<ItemId>,
    pub projects: Vec<ProjectId>,
}

impl Loadout {
    pub fn has_ability(&self, ability: AbilityId) -> bool {
        self.abilities.contains(&ability)
    }

    pub fn has_item(&self, item: ItemId) -> bool {
        self.items.contains(&item)
    }

    pub fn has_project(&self, project: ProjectId) -> bool {
        self.projects.contains(&project)
    }

    pub fn count_ability(&self, ability: AbilityId) -> usize {
        self.abilities.iter().filter(|a| **a == ability).count()
    }

    pub fn count_item(&self, item: ItemId) -> usize {
        self.items.iter().filter(|i| **i == item).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skillful_expands_to_botanic_and_survival() {
        assert_eq!(
            AbilityId::Skillful.expand(),
            &[AbilityId::Botanic, AbilityId::Survival]
        );
        assert_eq!(AbilityId::Pilot.expand(), &[AbilityId::Pilot]);
    }

    #[test]
    fn firearm_set() {
        assert!(ItemId::Blaster.is_firearm());
        assert!(ItemId::HeatSeeker.is_firearm());
        assert!(!ItemId::Grenade.is_firearm());
        assert!(!ItemId::Rope.is_firearm());
    }

    #[test]
    fn loadout_counts_multiplicities() {
        let loadout = Loadout {
            abilities: vec![AbilityId::Sprint, AbilityId::Sprint],
            items: vec![ItemId::Grenade, ItemId::Grenade, ItemId::Blaster],
            projects: vec![],
        };
        assert_eq!(loadout.count_ability(AbilityId::Sprint), 2);
        assert_eq!(loadout.count_item(ItemId::Grenade), 2);
        assert!(!loadout.has_project(ProjectId::CentauriBase));
    }

    #[test]
    fn ability_parse_round_trip() {
        for s in ["SURVIVAL", "SKILLFUL", "TRACKER"] {
            let a: AbilityId = s.parse().unwrap();
            assert_eq!(a.as_str(), s);
        }
        assert!("JUGGLER".parse::<AbilityId>().is_err());
    }
}
