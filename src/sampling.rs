//! Movement-limited expeditions: when the team cannot visit every sector,
//! the visited sub-multiset is random. Every size-K composition gets a
//! noncentral multivariate hypergeometric probability; negligible ones are
//! pruned and the survivors renormalised.

use crate::config::{
    BASE_MOVEMENT_ICARUS, BASE_MOVEMENT_PATROL, MAX_RETAINED_COMPOSITIONS, SAMPLING_COVERAGE,
};
use crate::context::CalcContext;
use crate::enums::{Mode, SectorType};
use crate::model::{Loadout, Planet, SectorComposition, Team};
use std::collections::BTreeMap;

/// Movement capacity: base by mode, +1 per SPRINT across the whole team
/// (sprinters count even when the oxygen gate keeps them aboard).
pub fn movement_capacity(team: &Team, requested: Option<u32>) -> u32 {
    if let Some(capacity) = requested {
        return capacity;
    }
    let base = match team.mode {
        Mode::Icarus => BASE_MOVEMENT_ICARUS,
        Mode::Patrol => BASE_MOVEMENT_PATROL,
    };
    base + team.sprint_count() as u32
}

/// Sampling weight of one sector type: discovery weight times any item
/// discovery multipliers carried by the team.
fn sampling_weight(ctx: &CalcContext<'_>, sector: SectorType, loadout: &Loadout) -> f64 {
    let base = ctx
        .data
        .sectors
        .get(&sector)
        .map(|c| c.weight_at_planet_exploration)
        .unwrap_or(1);
    let mut weight = base as f64;
    let mut seen = Vec::new();
    for item in &loadout.items {
        if seen.contains(item) {
            continue;
        }
        seen.push(*item);
        if let Some((target, factor)) = ctx.data.item_effect(*item).discovery_multiplier {
            if target == sector {
                weight *= factor as f64;
            }
        }
    }
    weight
}

struct Candidate {
    counts: Vec<usize>,
    mass: f64,
}

/// Enumerate every composition `(k_t)` with `0 <= k_t <= n_t` and
/// `sum k_t = K`, assigning unnormalised mass
/// `prod C(n_t, k_t) * w_t^k_t`. Enumeration always runs to completion for
/// an exact normaliser; only retention is capped.
fn enumerate_compositions(
    ctx: &mut CalcContext<'_>,
    types: &[(SectorType, usize, f64)],
    capacity: usize,
) -> (Vec<Candidate>, f64) {
    let mut retained: Vec<Candidate> = Vec::new();
    let mut total_mass = 0.0;

    // Suffix capacity for early cut-off.
    let mut suffix: Vec<usize> = vec![0; types.len() + 1];
    for i in (0..types.len()).rev() {
        suffix[i] = suffix[i + 1] + types[i].1;
    }

    let mut counts = vec![0usize; types.len()];
    recurse(
        ctx,
        types,
        &suffix,
        capacity,
        0,
        1.0,
        &mut counts,
        &mut retained,
        &mut total_mass,
    );

    (retained, total_mass)
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    ctx: &mut CalcContext<'_>,
    types: &[(SectorType, usize, f64)],
    suffix: &[usize],
    remaining: usize,
    index: usize,
    mass: f64,
    counts: &mut Vec<usize>,
    retained: &mut Vec<Candidate>,
    total_mass: &mut f64,
) {
    if remaining > suffix[index] {
        return;
    }
    if index == types.len() {
        *total_mass += mass;
        retained.push(Candidate {
            counts: counts.clone(),
            mass,
        });
        // Compact when retention overshoots: keep the heaviest candidates.
        if retained.len() > MAX_RETAINED_COMPOSITIONS * 4 {
            retained.sort_by(|a, b| b.mass.total_cmp(&a.mass));
            retained.truncate(MAX_RETAINED_COMPOSITIONS);
        }
        return;
    }

    let (_, available, weight) = types[index];
    let max_take = available.min(remaining);
    for take in 0..=max_take {
        let binomial = ctx.binomial(available as u64, take as u64);
        let contribution = mass * binomial * weight.powi(take as i32);
        counts[index] = take;
        recurse(
            ctx,
            types,
            suffix,
            remaining - take,
            index + 1,
            contribution,
            counts,
            retained,
            total_mass,
        );
    }
    counts[index] = 0;
}

/// All retained compositions for a movement capacity, probabilities
/// renormalised to 1.
pub fn sample_compositions(
    ctx: &mut CalcContext<'_>,
    planet: &Planet,
    loadout: &Loadout,
    capacity: u32,
) -> Vec<SectorComposition> {
    let type_counts = planet.type_counts();
    let types: Vec<(SectorType, usize, f64)> = type_counts
        .iter()
        .map(|(sector, count)| (*sector, *count, sampling_weight(ctx, *sector, loadout)))
        .collect();

    let capacity = (capacity as usize).min(planet.roaming_count());
    let (mut candidates, total_mass) = enumerate_compositions(ctx, &types, capacity);

    if candidates.is_empty() || total_mass <= 0.0 {
        return vec![SectorComposition {
            counts: BTreeMap::new(),
            probability: 1.0,
        }];
    }

    // Prune in descending-probability order until the coverage target,
    // never keeping more than the retention cap.
    candidates.sort_by(|a, b| b.mass.total_cmp(&a.mass));
    let mut kept: Vec<&Candidate> = Vec::new();
    let mut covered = 0.0;
    for candidate in &candidates {
        if covered >= SAMPLING_COVERAGE || kept.len() >= MAX_RETAINED_COMPOSITIONS {
            break;
        }
        covered += candidate.mass / total_mass;
        kept.push(candidate);
    }

    let kept_mass: f64 = kept.iter().map(|c| c.mass).sum();
    kept.iter()
        .map(|candidate| {
            let counts = types
                .iter()
                .zip(&candidate.counts)
                .filter(|(_, take)| **take > 0)
                .map(|((sector, _, _), take)| (*sector, *take))
                .collect();
            SectorComposition {
                counts,
                probability: candidate.mass / kept_mass,
            }
        })
        .collect()
}
