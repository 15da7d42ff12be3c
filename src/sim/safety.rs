//! Per-direction safety check for AI steering
//!
//! Looks one step ahead only. Other bikes are treated as standing still, so two
//! bikes can both judge the same cell safe and still collide head to head.

use glam::IVec2;

use super::grid::Occupancy;
use super::state::{Bike, Direction};

/// Whether bike `index` may turn to `dir` without an immediate crash.
pub fn is_safe(grid: &Occupancy, bikes: &[Bike], index: usize, dir: Direction) -> bool {
    let Some(bike) = bikes.get(index) else {
        return false;
    };
    let next = dir.step(bike.pos);

    if grid.is_blocked(next) {
        return false;
    }

    let head_on = bikes
        .iter()
        .enumerate()
        .any(|(other, b)| other != index && b.alive && b.pos == next);
    if head_on {
        return false;
    }

    has_exit(grid, next, dir)
}

/// A cell entered while heading `dir` has at least one onward open neighbour.
pub fn has_exit(grid: &Occupancy, cell: IVec2, dir: Direction) -> bool {
    Direction::ALL
        .into_iter()
        .filter(|&d| d != dir.opposite())
        .any(|d| !grid.is_blocked(d.step(cell)))
}
