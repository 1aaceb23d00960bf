//! Swap optimization over a filled assignment.
//!
//! Each lane either keeps its pair or swaps sides. With five lanes every
//! non-empty swap set (31 of them) is scored and the one that brings the
//! match differential closest to zero wins, provided it beats doing nothing.

use tracing::debug;

use crate::models::{Assignment, LaneDiffs, Role};

/// A set of lanes to swap and the match diff it is predicted to produce.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapPlan {
    pub roles: Vec<Role>,
    pub predicted: f64,
}

/// Every non-empty lane subset, smallest first, lexicographic within a size.
pub fn swap_candidates() -> Vec<Vec<Role>> {
    fn extend(start: usize, size: usize, current: &mut Vec<Role>, out: &mut Vec<Vec<Role>>) {
        if current.len() == size {
            out.push(current.clone());
            return;
        }
        for i in start..Role::LANES.len() {
            current.push(Role::LANES[i]);
            extend(i + 1, size, current, out);
            current.pop();
        }
    }

    let mut out = Vec::with_capacity(31);
    for size in 1..=Role::LANES.len() {
        extend(0, size, &mut Vec::with_capacity(size), &mut out);
    }
    out
}

/// Match diff that would result from swapping exactly `roles`.
pub fn swap_value(diffs: &LaneDiffs, roles: &[Role]) -> f64 {
    let signed = |role: Role| {
        if roles.contains(&role) {
            -diffs.get(role)
        } else {
            diffs.get(role)
        }
    };
    let solo: f64 = [Role::Top, Role::Jungle, Role::Mid]
        .into_iter()
        .map(signed)
        .sum();
    solo + (signed(Role::Adc) + signed(Role::Supp)) / 2.0
}

/// The swap set with the smallest absolute predicted diff, or `None` if no
/// set improves on the current diff. Earlier candidates win ties.
pub fn best_swap(diffs: &LaneDiffs) -> Option<SwapPlan> {
    let mut best_abs = diffs.match_diff().abs();
    let mut best = None;

    for roles in swap_candidates() {
        let predicted = swap_value(diffs, &roles);
        if predicted.abs() < best_abs {
            best_abs = predicted.abs();
            best = Some(SwapPlan { roles, predicted });
        }
    }
    best
}

/// Apply the best swap set to `assignment` in place. Returns the lanes that
/// were swapped, empty when the assignment was already optimal.
pub fn optimize(assignment: &mut Assignment<'_>) -> Vec<Role> {
    let diffs = assignment.lane_diffs();
    match best_swap(&diffs) {
        Some(plan) => {
            debug!(
                roles = ?plan.roles,
                before = diffs.match_diff(),
                after = plan.predicted,
                "swapping lanes"
            );
            for &role in &plan.roles {
                assignment.swap(role);
            }
            plan.roles
        }
        None => {
            debug!(match_diff = diffs.match_diff(), "no swap improves balance");
            Vec::new()
        }
    }
}
