//! Bounded reachability estimate
//!
//! Breadth-first flood fill over open cells, used by the AI as a cheap
//! "how much room is ahead" score. It ignores where other bikes will move.

use std::collections::VecDeque;

use glam::IVec2;

use super::grid::Occupancy;
use super::state::Direction;

/// Reusable flood-fill scratch space.
///
/// Visit marks are generation stamps, so a fill never clears or reallocates
/// its buffers once they have grown to the grid size.
#[derive(Debug, Clone, Default)]
pub struct FloodFill {
    stamps: Vec<u32>,
    generation: u32,
    queue: VecDeque<IVec2>,
}

impl FloodFill {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count distinct open cells reachable from `start` (inclusive), stopping at `limit`.
    ///
    /// Returns 0 when `start` is out of bounds or occupied.
    pub fn reachable(&mut self, grid: &Occupancy, start: IVec2, limit: usize) -> usize {
        if limit == 0 || grid.is_blocked(start) {
            return 0;
        }
        let Some(start_key) = grid.key(start) else {
            return 0;
        };

        self.begin(grid);
        self.stamps[start_key] = self.generation;
        self.queue.push_back(start);
        let mut count = 1;

        while let Some(cell) = self.queue.pop_front() {
            if count >= limit {
                break;
            }
            for dir in Direction::ALL {
                let next = dir.step(cell);
                if grid.is_blocked(next) {
                    continue;
                }
                let Some(key) = grid.key(next) else {
                    continue;
                };
                if self.stamps[key] == self.generation {
                    continue;
                }
                self.stamps[key] = self.generation;
                count += 1;
                if count >= limit {
                    break;
                }
                self.queue.push_back(next);
            }
        }

        self.queue.clear();
        count
    }

    fn begin(&mut self, grid: &Occupancy) {
        let cells = grid.size() as usize * grid.size() as usize;
        if self.stamps.len() != cells {
            self.stamps = vec![0; cells];
            self.generation = 0;
        }
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.stamps.fill(0);
            self.generation = 1;
        }
        self.queue.clear();
    }
}
