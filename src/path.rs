//! Explanation-path sampling: given per-sector outcome menus and a target
//! total damage, draw one sector-to-outcome assignment summing to the
//! target, weighted by the joint probability of all such assignments.
//!
//! The only RNG in the whole calculation lives here; the scenario numbers
//! themselves are exact.

use crate::enums::EventName;
use rand::Rng;

/// One pickable outcome of a sector: an event (or quiet nothing) and the
/// team damage it deals.
#[derive(Debug, Clone, PartialEq)]
pub struct PathOutcome {
    pub event: Option<EventName>,
    pub damage: i64,
    pub probability: f64,
}

/// A menu per sector position, in visit order.
pub type OutcomeMenu = Vec<PathOutcome>;

#[derive(Debug, Clone, PartialEq)]
pub struct SampledOutcome {
    pub position: usize,
    pub outcome: PathOutcome,
}

/// `ways[i][s]` = total probability of assignments to sectors `i..` summing
/// to exactly `s`.
fn build_ways(menus: &[OutcomeMenu], max_total: i64) -> Vec<Vec<f64>> {
    let width = (max_total + 1) as usize;
    let mut ways = vec![vec![0.0; width]; menus.len() + 1];
    ways[menus.len()][0] = 1.0;

    for i in (0..menus.len()).rev() {
        for s in 0..width as i64 {
            let mut total = 0.0;
            for outcome in &menus[i] {
                if outcome.damage <= s {
                    total += outcome.probability * ways[i + 1][(s - outcome.damage) as usize];
                }
            }
            ways[i][s as usize] = total;
        }
    }
    ways
}

fn max_total(menus: &[OutcomeMenu]) -> i64 {
    menus
        .iter()
        .map(|menu| menu.iter().map(|o| o.damage).max().unwrap_or(0))
        .sum()
}

/// The all-quiet assignment used for a zero target: every sector takes its
/// most probable zero-damage outcome.
fn zero_assignment(menus: &[OutcomeMenu]) -> Option<Vec<SampledOutcome>> {
    let mut path = Vec::with_capacity(menus.len());
    for (position, menu) in menus.iter().enumerate() {
        let quiet = menu
            .iter()
            .filter(|o| o.damage == 0)
            .max_by(|a, b| a.probability.total_cmp(&b.probability))?;
        path.push(SampledOutcome {
            position,
            outcome: quiet.clone(),
        });
    }
    Some(path)
}

/// Sample one assignment whose damages sum to `target`, or to the nearest
/// feasible total when `target` itself is unreachable (grenade-shifted and
/// mixed-mean targets land between attainable sums).
pub fn sample_path<R: Rng>(
    rng: &mut R,
    menus: &[OutcomeMenu],
    target: i64,
) -> Option<Vec<SampledOutcome>> {
    if menus.is_empty() {
        return Some(Vec::new());
    }
    if target <= 0 {
        if let Some(path) = zero_assignment(menus) {
            return Some(path);
        }
    }

    let max_total = max_total(menus);
    let ways = build_ways(menus, max_total);
    let feasible = |t: i64| t >= 0 && t <= max_total && ways[0][t as usize] > 0.0;

    let mut chosen = None;
    if feasible(target) {
        chosen = Some(target);
    } else {
        for step in 1..=max_total.max(target.abs()) {
            if feasible(target - step) {
                chosen = Some(target - step);
                break;
            }
            if feasible(target + step) {
                chosen = Some(target + step);
                break;
            }
        }
    }
    let mut remaining = chosen?;

    let mut path = Vec::with_capacity(menus.len());
    for (position, menu) in menus.iter().enumerate() {
        let denominator = ways[position][remaining as usize];
        if denominator <= 0.0 {
            return None;
        }
        let mut draw = rng.gen::<f64>() * denominator;
        let mut picked = None;
        for outcome in menu {
            if outcome.damage > remaining {
                continue;
            }
            let weight =
                outcome.probability * ways[position + 1][(remaining - outcome.damage) as usize];
            if weight <= 0.0 {
                continue;
            }
            draw -= weight;
            if draw <= 0.0 {
                picked = Some(outcome.clone());
                break;
            }
            picked = Some(outcome.clone());
        }
        let outcome = picked?;
        remaining -= outcome.damage;
        path.push(SampledOutcome { position, outcome });
    }

    debug_assert_eq!(remaining, 0);
    Some(path)
}
