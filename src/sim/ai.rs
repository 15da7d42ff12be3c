//! Opponent steering
//!
//! Runs once per tick per AI bike before any bike moves, so every decision sees
//! the grid as it stood at the start of the tick.

use glam::IVec2;
use rand::Rng;

use super::flood::FloodFill;
use super::grid::Occupancy;
use super::safety::is_safe;
use super::state::{Bike, Direction};
use crate::tuning::{CONTINUITY_BONUS, HYSTERESIS_RATIO, TARGET_LEAD, TARGET_RANGE, Tuning};

#[inline]
fn manhattan(a: IVec2, b: IVec2) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Pick a heading for bike `index`, or `None` to leave it unchanged.
///
/// `None` also means no safe heading exists; the bike then crashes on the
/// coming tick.
pub fn choose_direction<R: Rng + ?Sized>(
    grid: &Occupancy,
    bikes: &[Bike],
    index: usize,
    tuning: &Tuning,
    flood: &mut FloodFill,
    rng: &mut R,
) -> Option<Direction> {
    let bike = bikes.get(index).filter(|b| b.alive)?;
    let current = bike.direction;

    if tuning.straight_bias > 0.0
        && rng.random_bool(tuning.straight_bias)
        && is_safe(grid, bikes, index, current)
    {
        log::trace!("bike {} holds {} (straight bias)", index, current.as_str());
        return Some(current);
    }

    // current heading first so ties keep it
    let [side_a, side_b] = current.perpendicular();
    let mut safe = [current, side_a, side_b]
        .into_iter()
        .filter(|&dir| is_safe(grid, bikes, index, dir))
        .peekable();
    safe.peek()?;

    let target = player_target(bikes, index, tuning);

    let mut best: Option<(Direction, f32)> = None;
    let mut current_safe = false;
    for dir in safe {
        if dir == current {
            current_safe = true;
        }
        let score = score_direction(grid, bike, dir, target, tuning, flood);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((dir, score));
        }
    }
    let (best_dir, best_score) = best?;

    let choice = if current_safe && best_dir != current {
        let current_score =
            flood.reachable(grid, current.step(bike.pos), tuning.flood_limit) as f32
                * CONTINUITY_BONUS;
        if best_score > current_score && current_score < HYSTERESIS_RATIO * best_score {
            best_dir
        } else {
            current
        }
    } else {
        best_dir
    };

    log::trace!(
        "bike {} at ({}, {}) steers {} (best {} scored {:.1})",
        index,
        bike.pos.x,
        bike.pos.y,
        choice.as_str(),
        best_dir.as_str(),
        best_score
    );
    Some(choice)
}

/// Cell the AI aims for: a few cells ahead of the player, when close enough.
fn player_target(bikes: &[Bike], index: usize, tuning: &Tuning) -> Option<IVec2> {
    tuning.target_bonus?;
    if index == 0 {
        return None;
    }
    let me = bikes.get(index)?;
    let player = bikes.first().filter(|p| p.alive)?;
    if manhattan(me.pos, player.pos) > TARGET_RANGE {
        return None;
    }
    Some(player.pos + player.direction.delta() * TARGET_LEAD)
}

fn score_direction(
    grid: &Occupancy,
    bike: &Bike,
    dir: Direction,
    target: Option<IVec2>,
    tuning: &Tuning,
    flood: &mut FloodFill,
) -> f32 {
    let next = dir.step(bike.pos);
    let mut score = flood.reachable(grid, next, tuning.flood_limit) as f32;

    if dir == bike.direction {
        score *= CONTINUITY_BONUS;
    }

    if let (Some(bonus), Some(target)) = (tuning.target_bonus, target) {
        if manhattan(next, target) < manhattan(bike.pos, target) {
            score *= bonus;
        }
    }

    if let Some(bonus) = tuning.wall_hug_bonus {
        let hugging = dir
            .perpendicular()
            .iter()
            .any(|side| grid.is_blocked(side.step(next)));
        if hugging {
            score *= bonus;
        }
    }

    score
}
