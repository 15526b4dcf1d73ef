//! Static game data: sector event tables, loadout effect tables and global
//! constants. Built once at startup, shared read-only for the process
//! lifetime; per-calculation state never lives here.

use crate::enums::{EventName, SectorType};
use crate::error_handling::ConfigError;
use crate::model::{AbilityId, ItemId, ProjectId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub const MAX_PLAYERS: usize = 8;
pub const MAX_SECTORS: usize = 30;
pub const ABILITY_SLOTS: usize = 5;
pub const ITEM_SLOTS: usize = 3;
pub const DEFAULT_HEALTH: i32 = 14;
pub const BASE_MOVEMENT_ICARUS: u32 = 9;
pub const BASE_MOVEMENT_PATROL: u32 = 3;
pub const GRENADE_DAMAGE_REDUCTION: i64 = 3;
/// Retained compositions must cover this much probability mass.
pub const SAMPLING_COVERAGE: f64 = 0.999;
/// Hard cap on retained compositions; beyond it pruning turns aggressive.
pub const MAX_RETAINED_COMPOSITIONS: usize = 10_000;
/// A PMF whose mass deviates from 1 by more than this is renormalised with
/// a warning.
pub const MASS_WARN_TOLERANCE: f64 = 1e-6;

/// Immutable per-sector-type configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorConfig {
    pub exploration_events: BTreeMap<EventName, u32>,
    pub weight_at_planet_exploration: u32,
    /// The event treated as this sector's worst damaging outcome when
    /// several damage events share the menu (multi-event sectors).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worst_event: Option<EventName>,
    /// Multiplicity cap for this type on one planet.
    pub max_per_planet: usize,
}

impl SectorConfig {
    pub fn weight_sum(&self) -> u64 {
        self.exploration_events.values().map(|w| *w as u64).sum()
    }
}

/// Which loadout entry a weight rule reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleSource {
    Ability(AbilityId),
    Item(ItemId),
    Project(ProjectId),
}

/// Which events a removal rule deletes from the weight table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventSelector {
    AllFights,
    Named(Vec<EventName>),
}

impl EventSelector {
    pub fn matches(&self, event: EventName) -> bool {
        match self {
            EventSelector::AllFights => event.is_fight(),
            EventSelector::Named(list) => list.contains(&event),
        }
    }
}

/// Deletes matching events from a sector's weight table. `sector = None`
/// applies on every sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalRule {
    pub source: RuleSource,
    pub sector: Option<SectorType>,
    pub events: EventSelector,
}

/// Multiplies one event's weight on one sector. Applied exactly once per
/// calculation regardless of how many copies of the source are carried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightScaleRule {
    pub source: RuleSource,
    pub sector: SectorType,
    pub event: EventName,
    pub factor: u32,
}

/// Combat-relevant item data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemEffect {
    pub combat_bonus: i64,
    pub single_use: bool,
    /// (sector, event) pairs this item fully absorbs for its carrier.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sector_immunity: Vec<(SectorType, EventName)>,
    /// Planet-discovery weight multiplier, applied by the sector sampler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_multiplier: Option<(SectorType, u32)>,
}

/// Ability data outside the removal rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityEffect {
    pub power_bonus: i64,
    pub requires_firearm: bool,
}

/// The complete static table bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameData {
    pub sectors: BTreeMap<SectorType, SectorConfig>,
    pub removal_rules: Vec<RemovalRule>,
    pub weight_scale_rules: Vec<WeightScaleRule>,
    pub item_effects: BTreeMap<ItemId, ItemEffect>,
    pub ability_effects: BTreeMap<AbilityId, AbilityEffect>,
    /// Fighting-power bonus per BLASTER while CENTAURI_BASE is active.
    pub centauri_blaster_bonus: i64,
}

impl GameData {
    pub fn sector_config(&self, sector: SectorType) -> Result<&SectorConfig, ConfigError> {
        self.sectors
            .get(&sector)
            .ok_or_else(|| ConfigError::UnknownSectorType(sector.to_string()))
    }

    pub fn item_effect(&self, item: ItemId) -> ItemEffect {
        self.item_effects.get(&item).cloned().unwrap_or_default()
    }

    pub fn ability_effect(&self, ability: AbilityId) -> AbilityEffect {
        self.ability_effects
            .get(&ability)
            .cloned()
            .unwrap_or_default()
    }

    /// Startup validation: every sector type configured, every weight sum
    /// positive, every worst_event actually on the sector's menu.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for sector_type in SectorType::ALL {
            let config = self.sector_config(sector_type)?;
            if config.weight_sum() == 0 {
                return Err(ConfigError::MalformedTable(format!(
                    "{} has zero total event weight",
                    sector_type
                )));
            }
            if let Some(worst) = config.worst_event {
                if !config.exploration_events.contains_key(&worst) {
                    return Err(ConfigError::MalformedTable(format!(
                        "{} names worst event {} that is not on its menu",
                        sector_type, worst
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn export_to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn import_from_json(json: &str) -> Result<GameData, ConfigError> {
        let data: GameData = serde_json::from_str(json)
            .map_err(|e| ConfigError::MalformedTable(e.to_string()))?;
        data.validate()?;
        Ok(data)
    }
}

fn sector(
    events: &[(EventName, u32)],
    discovery_weight: u32,
    worst_event: Option<EventName>,
    max_per_planet: usize,
) -> SectorConfig {
    SectorConfig {
        exploration_events: events.iter().copied().collect(),
        weight_at_planet_exploration: discovery_weight,
        worst_event,
        max_per_planet,
    }
}

fn build_sector_table() -> BTreeMap<SectorType, SectorConfig> {
    use EventName::*;
    use SectorType::*;

    let mut table = BTreeMap::new();

    table.insert(
        Landing,
        sector(
            &[
                (NothingToReport, 14),
                (Tired2, 4),
                (Accident35, 2),
                (Disaster35, 1),
            ],
            1,
            Some(Disaster35),
            1,
        ),
    );
    table.insert(
        Forest,
        sector(
            &[
                (Harvest(1), 5),
                (Harvest(2), 3),
                (FightFixed(8), 2),
                (NothingToReport, 2),
            ],
            6,
            None,
            4,
        ),
    );
    table.insert(
        Desert,
        sector(
            &[(NothingToReport, 6), (Again, 4), (ItemLost, 1)],
            5,
            None,
            5,
        ),
    );
    table.insert(
        Ocean,
        sector(
            &[(Provision(2), 4), (Provision(3), 2), (NothingToReport, 4)],
            6,
            None,
            5,
        ),
    );
    table.insert(
        Mountain,
        sector(
            &[(NothingToReport, 5), (Accident35, 3), (Tired2, 2)],
            4,
            Some(Accident35),
            3,
        ),
    );
    table.insert(
        Cold,
        sector(
            &[(NothingToReport, 5), (Tired2, 3), (Accident35, 2)],
            4,
            Some(Accident35),
            3,
        ),
    );
    table.insert(
        Hot,
        sector(
            &[(NothingToReport, 5), (Tired2, 3), (Accident35, 2)],
            4,
            Some(Accident35),
            3,
        ),
    );
    table.insert(
        Insect,
        sector(
            &[(FightFixed(8), 3), (Disease, 2), (NothingToReport, 3)],
            4,
            None,
            4,
        ),
    );
    table.insert(
        Predator,
        sector(
            &[(FightFixed(10), 4), (FightFixed(12), 2), (NothingToReport, 2)],
            3,
            None,
            4,
        ),
    );
    table.insert(
        Intelligent,
        sector(
            &[
                (FightFixed(15), 2),
                (FightFixed(18), 1),
                (Artefact, 2),
                (NothingToReport, 3),
            ],
            2,
            None,
            2,
        ),
    );
    table.insert(
        Hydrocarbon,
        sector(
            &[
                (Fuel(2), 4),
                (Fuel(3), 2),
                (Fuel(4), 1),
                (NothingToReport, 2),
            ],
            2,
            None,
            4,
        ),
    );
    table.insert(
        SectorType::Oxygen,
        sector(
            &[
                (EventName::Oxygen(8), 6),
                (EventName::Oxygen(16), 2),
                (EventName::Oxygen(24), 1),
                (NothingToReport, 3),
            ],
            3,
            None,
            3,
        ),
    );
    table.insert(
        CristalField,
        sector(&[(Artefact, 4), (NothingToReport, 4)], 2, None, 3),
    );
    table.insert(
        Ruins,
        sector(
            &[
                (Artefact, 3),
                (Starmap, 1),
                (FightFixed(10), 1),
                (NothingToReport, 3),
            ],
            2,
            None,
            2,
        ),
    );
    table.insert(
        Wreck,
        sector(
            &[
                (Artefact, 2),
                (Starmap, 2),
                (Fuel(2), 2),
                (NothingToReport, 3),
            ],
            2,
            None,
            2,
        ),
    );
    table.insert(
        Cave,
        sector(
            &[
                (FightFixed(8), 2),
                (Fuel(1), 1),
                (ItemLost, 1),
                (NothingToReport, 4),
            ],
            3,
            None,
            3,
        ),
    );
    table.insert(
        Swamp,
        sector(
            &[(Disease, 3), (Provision(1), 2), (NothingToReport, 4)],
            3,
            None,
            3,
        ),
    );
    table.insert(
        Mankarog,
        sector(&[(FightFixed(32), 4), (NothingToReport, 1)], 1, None, 1),
    );
    table.insert(
        Ruminant,
        sector(
            &[(Provision(2), 4), (Provision(4), 2), (NothingToReport, 3)],
            3,
            None,
            3,
        ),
    );
    table.insert(
        FruitTrees,
        sector(
            &[(Harvest(2), 4), (Harvest(3), 2), (NothingToReport, 2)],
            4,
            None,
            3,
        ),
    );
    table.insert(
        VolcanicActivity,
        sector(
            &[(Disaster35, 2), (Fuel(1), 1), (NothingToReport, 4)],
            2,
            Some(Disaster35),
            2,
        ),
    );
    table.insert(
        SeismicActivity,
        sector(
            &[(Disaster35, 1), (Again, 1), (NothingToReport, 5)],
            2,
            Some(Disaster35),
            2,
        ),
    );
    table.insert(
        StrongWind,
        sector(
            &[(Tired2, 3), (ItemLost, 1), (NothingToReport, 5)],
            3,
            Some(Tired2),
            2,
        ),
    );
    table.insert(
        Lost,
        sector(
            &[
                (KillLost, 1),
                (PlayerLost, 2),
                (Again, 2),
                (MushTrap, 1),
                (NothingToReport, 5),
            ],
            1,
            None,
            1,
        ),
    );

    table
}

fn build_removal_rules() -> Vec<RemovalRule> {
    use EventName::*;
    vec![
        RemovalRule {
            source: RuleSource::Ability(AbilityId::Pilot),
            sector: Some(SectorType::Landing),
            events: EventSelector::Named(vec![Tired2, Accident35, Disaster35]),
        },
        RemovalRule {
            source: RuleSource::Ability(AbilityId::Diplomacy),
            sector: None,
            events: EventSelector::AllFights,
        },
        RemovalRule {
            source: RuleSource::Ability(AbilityId::Tracker),
            sector: Some(SectorType::Lost),
            events: EventSelector::Named(vec![KillLost]),
        },
        RemovalRule {
            source: RuleSource::Item(ItemId::WhiteFlag),
            sector: Some(SectorType::Intelligent),
            events: EventSelector::AllFights,
        },
        RemovalRule {
            source: RuleSource::Item(ItemId::QuadCompass),
            sector: None,
            events: EventSelector::Named(vec![Again]),
        },
    ]
}

fn build_weight_scale_rules() -> Vec<WeightScaleRule> {
    vec![
        WeightScaleRule {
            source: RuleSource::Item(ItemId::TradModule),
            sector: SectorType::Intelligent,
            event: EventName::Artefact,
            factor: 2,
        },
        WeightScaleRule {
            source: RuleSource::Project(ProjectId::AntigravPropeller),
            sector: SectorType::Landing,
            event: EventName::NothingToReport,
            factor: 2,
        },
    ]
}

fn build_item_effects() -> BTreeMap<ItemId, ItemEffect> {
    let mut table = BTreeMap::new();
    let combat = |bonus: i64| ItemEffect {
        combat_bonus: bonus,
        ..ItemEffect::default()
    };

    table.insert(ItemId::Blaster, combat(1));
    table.insert(ItemId::MachineGun, combat(2));
    table.insert(ItemId::NatamyRifle, combat(2));
    table.insert(ItemId::SniperRifle, combat(2));
    table.insert(ItemId::MissileLauncher, combat(3));
    table.insert(ItemId::HeatSeeker, combat(3));
    table.insert(
        ItemId::Grenade,
        ItemEffect {
            single_use: true,
            ..ItemEffect::default()
        },
    );
    table.insert(
        ItemId::Rope,
        ItemEffect {
            sector_immunity: vec![(SectorType::Mountain, EventName::Accident35)],
            ..ItemEffect::default()
        },
    );
    table.insert(
        ItemId::EchoSounder,
        ItemEffect {
            discovery_multiplier: Some((SectorType::Hydrocarbon, 5)),
            ..ItemEffect::default()
        },
    );

    table
}

fn build_ability_effects() -> BTreeMap<AbilityId, AbilityEffect> {
    let mut table = BTreeMap::new();
    table.insert(
        AbilityId::Gunman,
        AbilityEffect {
            power_bonus: 1,
            requires_firearm: true,
        },
    );
    table
}

impl Default for GameData {
    fn default() -> Self {
        GameData {
            sectors: build_sector_table(),
            removal_rules: build_removal_rules(),
            weight_scale_rules: build_weight_scale_rules(),
            item_effects: build_item_effects(),
            ability_effects: build_ability_effects(),
            centauri_blaster_bonus: 1,
        }
    }
}

static GAME_DATA: OnceLock<GameData> = OnceLock::new();

/// The process-wide default table bundle.
pub fn game_data() -> &'static GameData {
    GAME_DATA.get_or_init(GameData::default)
}
