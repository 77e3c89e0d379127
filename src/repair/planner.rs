//! Subset-shortest-path repair planner.
//!
//! Ported from `Repair::plan_optimal_repair`: treat each subset of the
//! failed-block list as a bitmask state, `0` meaning "nothing repaired
//! yet" and the all-ones mask meaning "everything repaired". From each
//! reachable state, try repairing every row or column that still has a
//! missing block; a row/column repair is only legal if the blocks it would
//! still need to cover (after this step) don't exceed that axis's parity
//! budget (`m1` for rows, `m2` for columns) — otherwise RS decode for that
//! axis can't succeed. Dijkstra over this DAG (masks only grow, so a
//! single increasing sweep over `0..target_mask` suffices, no priority
//! queue needed) finds the minimum cross-rack-read-cost plan.

use std::collections::HashSet;

use crate::error::{GridError, GridResult};
use crate::grid::CodeParams;
use crate::placement::PlacementMap;

/// Hard cap on simultaneous failures the bitmask search will handle; beyond
/// this, `2^n` states is no longer a reasonable brute force.
pub const MAX_PLANNER_FAILURES: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairKind {
    Row,
    Col,
}

/// One step of a repair plan: "repair everything still missing in row/col
/// `index`", at the given cross-rack read `cost`, recovering the blocks
/// named by `recovered_mask` (bit `i` set means `failed_ids[i]` becomes
/// available after this step).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairAction {
    pub kind: RepairKind,
    pub index: usize,
    pub cost: usize,
    pub recovered_mask: u32,
}

/// Cross-rack read cost of repairing via `peer_ids`, reading out of
/// `target_rack`: one unit per peer that is (a) not itself failed and
/// (b) placed on a different rack than `target_rack`. Peers with no
/// placement entry are skipped, mirroring the original's `catch (...)`
/// swallow around a missing mapping.
fn calculate_cost(
    peer_ids: &[usize],
    target_rack: usize,
    current_failures: &HashSet<usize>,
    placement: &PlacementMap,
) -> usize {
    let mut cost = 0;
    for &bid in peer_ids {
        if current_failures.contains(&bid) {
            continue;
        }
        if let Ok(entry) = placement.get(bid) {
            if entry.rack != target_rack {
                cost += 1;
            }
        }
    }
    cost
}

/// Plan the minimum-cost sequence of row/column repairs that recovers
/// every block in `failed_ids`. Returns `GridError::Unrepairable` if no
/// sequence of legal row/column repairs covers every failure (e.g. a
/// row and its intersecting column are both over budget).
pub fn plan_optimal_repair(
    failed_ids: &[usize],
    params: &CodeParams,
    placement: &PlacementMap,
) -> GridResult<Vec<RepairAction>> {
    let n = failed_ids.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    if n > MAX_PLANNER_FAILURES {
        return Err(GridError::TooManyFailures { n, limit: MAX_PLANNER_FAILURES });
    }

    let target_mask: u32 = (1u32 << n) - 1;
    let states = 1usize << n;
    const UNREACHABLE: u32 = u32::MAX;
    let mut min_cost = vec![UNREACHABLE; states];
    let mut parent: Vec<Option<(u32, RepairAction)>> = vec![None; states];
    min_cost[0] = 0;

    let rc_of: Vec<(usize, usize)> = failed_ids.iter().map(|&id| params.rc(id)).collect();

    for mask in 0..target_mask {
        let mask_idx = mask as usize;
        if min_cost[mask_idx] == UNREACHABLE {
            continue;
        }

        let mut rows_to_try = HashSet::new();
        let mut cols_to_try = HashSet::new();
        for i in 0..n {
            if mask & (1 << i) == 0 {
                rows_to_try.insert(rc_of[i].0);
                cols_to_try.insert(rc_of[i].1);
            }
        }

        let current_failures: HashSet<usize> = (0..n)
            .filter(|&i| mask & (1 << i) == 0)
            .map(|i| failed_ids[i])
            .collect();

        for &r in &rows_to_try {
            let mut new_recovered_mask: u32 = 0;
            for i in 0..n {
                if rc_of[i].0 == r && mask & (1 << i) == 0 {
                    new_recovered_mask |= 1 << i;
                }
            }
            if new_recovered_mask.count_ones() as usize > params.m1 {
                continue;
            }
            let first_bad_idx = (0..n).find(|&i| new_recovered_mask & (1 << i) != 0);
            let target_rack = match first_bad_idx {
                Some(i) => placement.get(failed_ids[i])?.rack,
                None => continue,
            };
            let row_peers = params.row_peers(r);
            let cost = calculate_cost(&row_peers, target_rack, &current_failures, placement);

            let next_mask = mask | new_recovered_mask;
            let candidate = min_cost[mask_idx] + cost as u32;
            if candidate < min_cost[next_mask as usize] {
                min_cost[next_mask as usize] = candidate;
                parent[next_mask as usize] = Some((
                    mask,
                    RepairAction { kind: RepairKind::Row, index: r, cost, recovered_mask: new_recovered_mask },
                ));
            }
        }

        for &c in &cols_to_try {
            let mut new_recovered_mask: u32 = 0;
            for i in 0..n {
                if rc_of[i].1 == c && mask & (1 << i) == 0 {
                    new_recovered_mask |= 1 << i;
                }
            }
            if new_recovered_mask.count_ones() as usize > params.m2 {
                continue;
            }
            let first_bad_idx = (0..n).find(|&i| new_recovered_mask & (1 << i) != 0);
            let target_rack = match first_bad_idx {
                Some(i) => placement.get(failed_ids[i])?.rack,
                None => continue,
            };
            let col_peers = params.col_peers(c);
            let cost = calculate_cost(&col_peers, target_rack, &current_failures, placement);

            let next_mask = mask | new_recovered_mask;
            let candidate = min_cost[mask_idx] + cost as u32;
            if candidate < min_cost[next_mask as usize] {
                min_cost[next_mask as usize] = candidate;
                parent[next_mask as usize] = Some((
                    mask,
                    RepairAction { kind: RepairKind::Col, index: c, cost, recovered_mask: new_recovered_mask },
                ));
            }
        }
    }

    if min_cost[target_mask as usize] == UNREACHABLE {
        return Err(GridError::Unrepairable);
    }

    let mut plan = Vec::new();
    let mut curr = target_mask;
    while curr > 0 {
        let (prev, action) = parent[curr as usize].expect("reachable mask must have a parent");
        plan.push(action);
        curr = prev;
    }
    plan.reverse();
    Ok(plan)
}
