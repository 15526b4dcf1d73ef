//! Resource yield engine: per-sector discrete yield distributions, exact
//! convolution across the visited sectors, and the tail-conditional
//! scenario extraction used for resources.

use crate::context::CalcContext;
use crate::distribution::Pmf;
use crate::enums::{EventName, SectorType};
use crate::error_handling::ConfigError;
use crate::model::{AbilityId, ItemId, Loadout};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything an expedition can bring back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Fruits,
    Steaks,
    Fuel,
    Oxygen,
    Artefacts,
    MapFragments,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Fruits,
        ResourceKind::Steaks,
        ResourceKind::Fuel,
        ResourceKind::Oxygen,
        ResourceKind::Artefacts,
        ResourceKind::MapFragments,
    ];
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Fruits => "fruits",
            ResourceKind::Steaks => "steaks",
            ResourceKind::Fuel => "fuel",
            ResourceKind::Oxygen => "oxygen",
            ResourceKind::Artefacts => "artefacts",
            ResourceKind::MapFragments => "mapFragments",
        };
        f.write_str(name)
    }
}

/// ARTEFACT finds turn out to be a real artefact 8 times out of 9; the
/// ninth is a star map fragment.
const ARTEFACT_GENUINE: f64 = 8.0 / 9.0;

/// Scenario triple for one resource. Pessimist/optimist are conditional
/// expectations of the bottom/top quarter of probability mass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceOutlook {
    pub pessimist: f64,
    pub average: f64,
    pub optimist: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<Pmf>,
}

/// Yield contributions of one event for one resource, after loadout
/// modifiers. Returns (yield, probability-share of the event).
fn yield_shares(
    resource: ResourceKind,
    event: EventName,
    botanics: usize,
    drillers: usize,
) -> Vec<(i64, f64)> {
    match (resource, event) {
        (ResourceKind::Fruits, EventName::Harvest(n)) if n > 0 => {
            vec![(n as i64 + botanics as i64, 1.0)]
        }
        (ResourceKind::Steaks, EventName::Provision(n)) if n > 0 => vec![(n as i64, 1.0)],
        (ResourceKind::Fuel, EventName::Fuel(n)) if n > 0 => {
            vec![(n as i64 * (drillers as i64 + 1), 1.0)]
        }
        (ResourceKind::Oxygen, EventName::Oxygen(n)) if n > 0 => vec![(n as i64, 1.0)],
        (ResourceKind::Artefacts, EventName::Artefact) => vec![(1, ARTEFACT_GENUINE)],
        (ResourceKind::MapFragments, EventName::Artefact) => vec![(1, 1.0 - ARTEFACT_GENUINE)],
        (ResourceKind::MapFragments, EventName::Starmap) => vec![(1, 1.0)],
        _ => Vec::new(),
    }
}

/// Build one sector's yield PMF for one resource.
fn sector_yield_pmf(
    ctx: &mut CalcContext<'_>,
    sector: SectorType,
    loadout: &Loadout,
    resource: ResourceKind,
    botanics: usize,
    drillers: usize,
) -> Result<Pmf, ConfigError> {
    let probabilities = ctx.probabilities(sector, loadout)?.clone();
    let mut pmf = Pmf::new();
    let mut yielding_mass = 0.0;

    for (event, p) in probabilities {
        for (amount, share) in yield_shares(resource, event, botanics, drillers) {
            if amount > 0 {
                pmf.add_mass(amount, p * share);
                yielding_mass += p * share;
            }
        }
    }

    pmf.add_mass(0, 1.0 - yielding_mass);
    Ok(pmf)
}

/// Full yield distribution for one resource across the visited sectors.
pub fn calculate_resource(
    ctx: &mut CalcContext<'_>,
    sectors: &[SectorType],
    loadout: &Loadout,
    resource: ResourceKind,
) -> Result<ResourceOutlook, ConfigError> {
    let botanics = loadout.count_ability(AbilityId::Botanic);
    let drillers = loadout.count_item(ItemId::Driller);

    let mut combined = Pmf::delta(0);
    for sector in sectors {
        let pmf = sector_yield_pmf(ctx, *sector, loadout, resource, botanics, drillers)?;
        combined = combined.convolve(&pmf);
    }
    combined.renormalize_if_drifted();

    let average = combined.expectation();
    let mut pessimist = combined.tail_expectation_low(0.25);
    let optimist = combined.tail_expectation_high(0.25);

    // A pessimist finds no oxygen.
    if resource == ResourceKind::Oxygen {
        pessimist = 0.0;
    }

    Ok(ResourceOutlook {
        pessimist,
        average,
        optimist,
        distribution: Some(combined),
    })
}
