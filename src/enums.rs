use serde::de::{Error as DeError, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Fixed fight strengths that can appear in sector tables.
pub const FIGHT_STRENGTHS: [u8; 6] = [8, 10, 12, 15, 18, 32];

/// The closed set of sector types a planet can be composed of.
///
/// Each type has at most one base configuration entry in the sector table;
/// `parse` is the single place wire strings are turned into values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectorType {
    Landing,
    Forest,
    Desert,
    Ocean,
    Mountain,
    Cold,
    Hot,
    Insect,
    Predator,
    Intelligent,
    Hydrocarbon,
    Oxygen,
    CristalField,
    Ruins,
    Wreck,
    Cave,
    Swamp,
    Mankarog,
    Ruminant,
    FruitTrees,
    VolcanicActivity,
    SeismicActivity,
    StrongWind,
    Lost,
}

impl SectorType {
    pub const ALL: [SectorType; 24] = [
        SectorType::Landing,
        SectorType::Forest,
        SectorType::Desert,
        SectorType::Ocean,
        SectorType::Mountain,
        SectorType::Cold,
        SectorType::Hot,
        SectorType::Insect,
        SectorType::Predator,
        SectorType::Intelligent,
        SectorType::Hydrocarbon,
        SectorType::Oxygen,
        SectorType::CristalField,
        SectorType::Ruins,
        SectorType::Wreck,
        SectorType::Cave,
        SectorType::Swamp,
        SectorType::Mankarog,
        SectorType::Ruminant,
        SectorType::FruitTrees,
        SectorType::VolcanicActivity,
        SectorType::SeismicActivity,
        SectorType::StrongWind,
        SectorType::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectorType::Landing => "LANDING",
            SectorType::Forest => "FOREST",
            SectorType::Desert => "DESERT",
            SectorType::Ocean => "OCEAN",
            SectorType::Mountain => "MOUNTAIN",
            SectorType::Cold => "COLD",
            SectorType::Hot => "HOT",
            SectorType::Insect => "INSECT",
            SectorType::Predator => "PREDATOR",
            SectorType::Intelligent => "INTELLIGENT",
            SectorType::Hydrocarbon => "HYDROCARBON",
            SectorType::Oxygen => "OXYGEN",
            SectorType::CristalField => "CRISTAL_FIELD",
            SectorType::Ruins => "RUINS",
            SectorType::Wreck => "WRECK",
            SectorType::Cave => "CAVE",
            SectorType::Swamp => "SWAMP",
            SectorType::Mankarog => "MANKAROG",
            SectorType::Ruminant => "RUMINANT",
            SectorType::FruitTrees => "FRUIT_TREES",
            SectorType::VolcanicActivity => "VOLCANIC_ACTIVITY",
            SectorType::SeismicActivity => "SEISMIC_ACTIVITY",
            SectorType::StrongWind => "STRONG_WIND",
            SectorType::Lost => "LOST",
        }
    }
}

impl fmt::Display for SectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectorType::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown sector type: {}", s))
    }
}

impl Serialize for SectorType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

struct SectorTypeVisitor;

impl<'de> Visitor<'de> for SectorTypeVisitor {
    type Value = SectorType;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a sector type string such as \"FOREST\"")
    }

    fn visit_str<E: DeError>(self, value: &str) -> Result<Self::Value, E> {
        value.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for SectorType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(SectorTypeVisitor)
    }
}

/// Exploration events, partitioned into resource, damage, fight, negative
/// and neutral families. Parameterised variants carry the yield or fight
/// strength encoded in the wire name (`HARVEST_2`, `FIGHT_8`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventName {
    Harvest(u8),
    Provision(u8),
    Fuel(u8),
    Oxygen(u8),
    Artefact,
    Starmap,
    Tired2,
    Accident35,
    Disaster35,
    FightFixed(u8),
    FightRandom,
    KillLost,
    PlayerLost,
    Again,
    Disease,
    ItemLost,
    MushTrap,
    NothingToReport,
}

impl EventName {
    /// Wire name for this event. Allocates only for parameterised variants.
    pub fn wire_name(&self) -> String {
        match self {
            EventName::Harvest(n) => format!("HARVEST_{}", n),
            EventName::Provision(n) => format!("PROVISION_{}", n),
            EventName::Fuel(n) => format!("FUEL_{}", n),
            EventName::Oxygen(n) => format!("OXYGEN_{}", n),
            EventName::Artefact => "ARTEFACT".to_string(),
            EventName::Starmap => "STARMAP".to_string(),
            EventName::Tired2 => "TIRED_2".to_string(),
            EventName::Accident35 => "ACCIDENT_3_5".to_string(),
            EventName::Disaster35 => "DISASTER_3_5".to_string(),
            EventName::FightFixed(k) => format!("FIGHT_{}", k),
            EventName::FightRandom => "FIGHT_8_10_12_15_18_32".to_string(),
            EventName::KillLost => "KILL_LOST".to_string(),
            EventName::PlayerLost => "PLAYER_LOST".to_string(),
            EventName::Again => "AGAIN".to_string(),
            EventName::Disease => "DISEASE".to_string(),
            EventName::ItemLost => "ITEM_LOST".to_string(),
            EventName::MushTrap => "MUSH_TRAP".to_string(),
            EventName::NothingToReport => "NOTHING_TO_REPORT".to_string(),
        }
    }

    pub fn is_fight(&self) -> bool {
        matches!(self, EventName::FightFixed(_) | EventName::FightRandom)
    }

    pub fn is_damage_event(&self) -> bool {
        matches!(
            self,
            EventName::Tired2 | EventName::Accident35 | EventName::Disaster35
        )
    }

    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            EventName::KillLost
                | EventName::PlayerLost
                | EventName::Again
                | EventName::Disease
                | EventName::ItemLost
                | EventName::MushTrap
        )
    }

    /// Whether the damage event hits every participant (vs a single target).
    pub fn affects_all(&self) -> bool {
        matches!(self, EventName::Tired2 | EventName::Disaster35)
    }

    /// Inclusive per-player damage range of a damage event.
    pub fn damage_range(&self) -> Option<(i64, i64)> {
        match self {
            EventName::Tired2 => Some((2, 2)),
            EventName::Accident35 | EventName::Disaster35 => Some((3, 5)),
            _ => None,
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.wire_name())
    }
}

impl FromStr for EventName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_suffix = |prefix: &str| -> Option<u8> {
            s.strip_prefix(prefix).and_then(|rest| rest.parse().ok())
        };

        match s {
            "ARTEFACT" => return Ok(EventName::Artefact),
            "STARMAP" => return Ok(EventName::Starmap),
            "TIRED_2" => return Ok(EventName::Tired2),
            "ACCIDENT_3_5" => return Ok(EventName::Accident35),
            "DISASTER_3_5" => return Ok(EventName::Disaster35),
            "FIGHT_8_10_12_15_18_32" => return Ok(EventName::FightRandom),
            "KILL_LOST" => return Ok(EventName::KillLost),
            "PLAYER_LOST" => return Ok(EventName::PlayerLost),
            "AGAIN" => return Ok(EventName::Again),
            "DISEASE" => return Ok(EventName::Disease),
            "ITEM_LOST" => return Ok(EventName::ItemLost),
            "MUSH_TRAP" => return Ok(EventName::MushTrap),
            "NOTHING_TO_REPORT" => return Ok(EventName::NothingToReport),
            _ => {}
        }

        if let Some(n) = parse_suffix("HARVEST_") {
            return Ok(EventName::Harvest(n));
        }
        if let Some(n) = parse_suffix("PROVISION_") {
            return Ok(EventName::Provision(n));
        }
        if let Some(n) = parse_suffix("FUEL_") {
            return Ok(EventName::Fuel(n));
        }
        if let Some(n) = parse_suffix("OXYGEN_") {
            return Ok(EventName::Oxygen(n));
        }
        if let Some(k) = parse_suffix("FIGHT_") {
            if FIGHT_STRENGTHS.contains(&k) {
                return Ok(EventName::FightFixed(k));
            }
            return Err(format!("unknown fight strength: {}", s));
        }

        Err(format!("unknown event name: {}", s))
    }
}

impl Serialize for EventName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.wire_name())
    }
}

struct EventNameVisitor;

impl<'de> Visitor<'de> for EventNameVisitor {
    type Value = EventName;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an event name string such as \"HARVEST_2\"")
    }

    fn visit_str<E: DeError>(self, value: &str) -> Result<Self::Value, E> {
        value.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for EventName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(EventNameVisitor)
    }
}

/// Expedition movement mode. ICARUS is the long-range shuttle, PATROL the
/// short-range patrol craft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    #[default]
    Icarus,
    Patrol,
}

/// The four reported scenarios derived from every distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScenarioKind {
    Optimist,
    Average,
    Pessimist,
    WorstCase,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 4] = [
        ScenarioKind::Optimist,
        ScenarioKind::Average,
        ScenarioKind::Pessimist,
        ScenarioKind::WorstCase,
    ];
}
