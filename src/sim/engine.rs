//! Fixed-step game engine
//!
//! Owns every bike and the occupancy grid. The host drives it one `tick()` per
//! simulation step and reads back a [`GameView`] between steps.

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::ai;
use super::flood::FloodFill;
use super::grid::Occupancy;
use super::state::{Bike, BikeSpawn, Direction, GameEvent, GamePhase, GameView, Winner};
use crate::settings::MatchSettings;
use crate::tuning::{Difficulty, Tuning};

/// Seed used when the host does not supply a random source
pub const DEFAULT_SEED: u64 = 0x5eed_c7c1e;

/// Light-cycle match: bike 0 is the player, the rest are AI-controlled.
#[derive(Debug, Clone)]
pub struct Engine<R = Pcg32> {
    grid_size: u32,
    spawns: Vec<BikeSpawn>,
    difficulty: Difficulty,
    tuning: Tuning,
    bikes: Vec<Bike>,
    phase: GamePhase,
    winner: Option<Winner>,
    occupied: Occupancy,
    ticks: u64,
    /// Player bike steered by the AI as well (demo mode)
    autopilot: bool,
    events: Vec<GameEvent>,
    flood: FloodFill,
    rng: R,
}

impl Engine<Pcg32> {
    /// Create an engine from an integer AI level (0 = easy, clamped).
    pub fn new(grid_size: u32, spawns: Vec<BikeSpawn>, ai_level: i32) -> Self {
        Self::seeded(grid_size, spawns, Difficulty::from_level(ai_level), DEFAULT_SEED)
    }

    pub fn seeded(grid_size: u32, spawns: Vec<BikeSpawn>, difficulty: Difficulty, seed: u64) -> Self {
        Self::with_rng(grid_size, spawns, difficulty, Pcg32::seed_from_u64(seed))
    }

    pub fn from_settings(settings: &MatchSettings) -> Self {
        let mut engine = Self::seeded(
            settings.grid_size,
            settings.bikes.clone(),
            settings.difficulty,
            settings.seed,
        );
        engine.set_autopilot(settings.autopilot);
        engine
    }
}

impl<R: Rng> Engine<R> {
    /// Create an engine drawing AI randomness from `rng`.
    pub fn with_rng(grid_size: u32, spawns: Vec<BikeSpawn>, difficulty: Difficulty, rng: R) -> Self {
        let mut engine = Self {
            grid_size,
            bikes: Vec::with_capacity(spawns.len()),
            spawns,
            difficulty,
            tuning: difficulty.tuning(),
            phase: GamePhase::Ready,
            winner: None,
            occupied: Occupancy::new(grid_size),
            ticks: 0,
            autopilot: false,
            events: Vec::new(),
            flood: FloodFill::new(),
            rng,
        };
        engine.reset();
        engine
    }

    /// Rebuild every bike from its spawn and clear the grid.
    pub fn reset(&mut self) {
        self.occupied.clear();
        self.bikes.clear();
        for (index, spawn) in self.spawns.iter().enumerate() {
            let mut bike = Bike::from_spawn(spawn);
            // off-grid or already-taken spawns start derezzed with no trail
            if !self.occupied.claim(bike.pos) {
                log::warn!("Bike {} cannot spawn at ({}, {})", index, bike.x(), bike.y());
                bike.alive = false;
                bike.trail.clear();
            }
            self.bikes.push(bike);
        }
        self.phase = GamePhase::Ready;
        self.winner = None;
        self.ticks = 0;
        self.events.clear();
        log::debug!(
            "Reset: {} bikes on {}x{} grid ({})",
            self.bikes.len(),
            self.grid_size,
            self.grid_size,
            self.difficulty.as_str()
        );
    }

    /// Enter the countdown phase. Timing is up to the host.
    pub fn begin_countdown(&mut self) {
        if self.phase == GamePhase::Ready {
            self.phase = GamePhase::Countdown;
        }
    }

    pub fn start(&mut self) {
        if matches!(self.phase, GamePhase::Ready | GamePhase::Countdown) {
            self.phase = GamePhase::Playing;
            self.events.push(GameEvent::Started);
            log::info!("Match started ({} bikes, {})", self.bikes.len(), self.difficulty.as_str());
        }
    }

    /// Queue a heading for the next tick.
    ///
    /// Ignored for unknown or dead bikes and for a 180° turn against the
    /// current heading.
    pub fn set_bike_direction(&mut self, index: usize, direction: Direction) {
        let Some(bike) = self.bikes.get_mut(index) else {
            return;
        };
        if !bike.alive || direction == bike.direction.opposite() {
            return;
        }
        bike.next_direction = direction;
    }

    pub fn update_bike_color(&mut self, index: usize, color: impl Into<String>) {
        if let Some(bike) = self.bikes.get_mut(index) {
            bike.color = color.into();
        }
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        self.autopilot = enabled;
    }

    /// Advance the simulation by one step. Does nothing unless playing.
    pub fn tick(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.ticks += 1;

        for bike in self.bikes.iter_mut().filter(|b| b.alive) {
            bike.direction = bike.next_direction;
        }

        let first_ai = if self.autopilot { 0 } else { 1 };
        for index in first_ai..self.bikes.len() {
            let choice = ai::choose_direction(
                &self.occupied,
                &self.bikes,
                index,
                &self.tuning,
                &mut self.flood,
                &mut self.rng,
            );
            if let Some(direction) = choice {
                let bike = &mut self.bikes[index];
                bike.direction = direction;
                bike.next_direction = direction;
            }
        }

        // every bike moves at once: resolve against the pre-move world
        let alive: Vec<bool> = self.bikes.iter().map(|b| b.alive).collect();
        let targets: Vec<IVec2> = self
            .bikes
            .iter()
            .map(|b| if b.alive { b.next_cell() } else { b.pos })
            .collect();

        let crashed: Vec<bool> = (0..self.bikes.len())
            .map(|i| {
                alive[i]
                    && (self.occupied.is_blocked(targets[i])
                        || (0..targets.len())
                            .any(|j| j != i && alive[j] && targets[j] == targets[i]))
            })
            .collect();

        for (index, bike) in self.bikes.iter_mut().enumerate() {
            if !alive[index] {
                continue;
            }
            let target = targets[index];
            if crashed[index] {
                bike.alive = false;
                self.events.push(GameEvent::Derezzed { bike: index, at: target });
                log::debug!(
                    "Bike {} derezzed at ({}, {}) on tick {}",
                    index,
                    target.x,
                    target.y,
                    self.ticks
                );
            } else {
                bike.pos = target;
                bike.trail.push(target);
                self.occupied.claim(target);
            }
        }

        if let Some(winner) = self.outcome() {
            self.winner = Some(winner);
            self.phase = GamePhase::GameOver;
            self.events.push(GameEvent::GameOver { winner });
            log::info!("Game over after {} ticks: {:?}", self.ticks, winner);
        }
    }

    /// Decide whether the game ended on this tick
    fn outcome(&self) -> Option<Winner> {
        if self.bikes.first().is_some_and(|player| !player.alive) {
            return Some(Winner::PlayerEliminated);
        }
        let mut survivors = self
            .bikes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.alive)
            .map(|(i, _)| i);
        match (survivors.next(), survivors.next()) {
            (None, _) => Some(Winner::Draw),
            (Some(index), None) => Some(Winner::Bike(index)),
            _ => None,
        }
    }

    pub fn state(&self) -> GameView<'_> {
        GameView {
            bikes: &self.bikes,
            phase: self.phase,
            winner: self.winner,
        }
    }

    /// Hand pending events to the host
    pub fn drain_events(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    pub fn bikes(&self) -> &[Bike] {
        &self.bikes
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Ticks played since the last reset
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn autopilot(&self) -> bool {
        self.autopilot
    }

    pub fn is_occupied(&self, cell: IVec2) -> bool {
        self.occupied.is_occupied(cell)
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(x: i32, y: i32, direction: Direction) -> BikeSpawn {
        BikeSpawn::new(x, y, direction, "#fff")
    }

    fn playing(grid_size: u32, spawns: Vec<BikeSpawn>, difficulty: Difficulty) -> Engine {
        let mut engine = Engine::seeded(grid_size, spawns, difficulty, 1234);
        engine.start();
        engine
    }

    #[test]
    fn test_phase_flow() {
        let mut engine = Engine::new(10, vec![spawn(1, 8, Direction::Up), spawn(8, 1, Direction::Down)], 1);
        assert_eq!(engine.phase(), GamePhase::Ready);
        assert_eq!(engine.winner(), None);

        // tick outside Playing does nothing
        engine.tick();
        assert_eq!(engine.ticks(), 0);
        assert_eq!(engine.bikes()[0].trail.len(), 1);

        engine.begin_countdown();
        assert_eq!(engine.phase(), GamePhase::Countdown);
        engine.tick();
        assert_eq!(engine.ticks(), 0);

        engine.start();
        assert_eq!(engine.phase(), GamePhase::Playing);
        engine.tick();
        assert_eq!(engine.ticks(), 1);
        assert_eq!(engine.bikes()[0].trail.len(), 2);
    }

    #[test]
    fn test_countdown_only_from_ready() {
        let mut engine = playing(10, vec![spawn(1, 8, Direction::Up), spawn(8, 1, Direction::Down)], Difficulty::Easy);
        engine.begin_countdown();
        assert_eq!(engine.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_spawn_cells_are_claimed() {
        let engine = Engine::new(6, vec![spawn(0, 0, Direction::Right), spawn(5, 5, Direction::Left)], 0);
        assert!(engine.is_occupied(IVec2::new(0, 0)));
        assert!(engine.is_occupied(IVec2::new(5, 5)));
        assert_eq!(engine.occupied_count(), 2);
    }

    #[test]
    fn test_wall_death() {
        let mut engine = playing(5, vec![spawn(4, 2, Direction::Right), spawn(0, 0, Direction::Down)], Difficulty::Medium);
        engine.tick();

        let player = &engine.bikes()[0];
        assert!(!player.alive);
        assert_eq!(player.trail.len(), 1);
        assert_eq!(player.pos, IVec2::new(4, 2));
        assert_eq!(engine.winner(), Some(Winner::PlayerEliminated));
        assert_eq!(engine.phase(), GamePhase::GameOver);
        // the opponent still moved on the same tick
        assert_eq!(engine.bikes()[1].trail.len(), 2);
    }

    #[test]
    fn test_reversal_is_rejected() {
        let mut engine = Engine::new(10, vec![spawn(5, 5, Direction::Up), spawn(1, 1, Direction::Down)], 1);
        engine.set_bike_direction(0, Direction::Down);
        assert_eq!(engine.bikes()[0].next_direction, Direction::Up);

        engine.set_bike_direction(0, Direction::Left);
        assert_eq!(engine.bikes()[0].next_direction, Direction::Left);
        // reversal is judged against the committed heading, not the queued one
        engine.set_bike_direction(0, Direction::Right);
        assert_eq!(engine.bikes()[0].next_direction, Direction::Right);
    }

    #[test]
    fn test_invalid_calls_are_ignored() {
        let mut engine = Engine::new(10, vec![spawn(5, 5, Direction::Up), spawn(1, 1, Direction::Down)], 1);
        let before = engine.bikes().to_vec();
        engine.set_bike_direction(7, Direction::Left);
        engine.update_bike_color(7, "#f00");
        assert_eq!(engine.bikes(), &before[..]);
    }

    #[test]
    fn test_dead_bike_ignores_input() {
        let mut engine = playing(5, vec![spawn(4, 2, Direction::Right), spawn(0, 0, Direction::Down)], Difficulty::Medium);
        engine.tick();
        engine.set_bike_direction(0, Direction::Up);
        assert_eq!(engine.bikes()[0].next_direction, Direction::Right);
    }

    #[test]
    fn test_queued_direction_applies_next_tick() {
        let mut engine = playing(10, vec![spawn(5, 5, Direction::Up), spawn(0, 0, Direction::Right)], Difficulty::Medium);
        engine.set_bike_direction(0, Direction::Left);
        assert_eq!(engine.bikes()[0].direction, Direction::Up);
        engine.tick();
        assert_eq!(engine.bikes()[0].direction, Direction::Left);
        assert_eq!(engine.bikes()[0].pos, IVec2::new(4, 5));
    }

    #[test]
    fn test_update_color() {
        let mut engine = Engine::new(10, vec![spawn(5, 5, Direction::Up)], 1);
        engine.update_bike_color(0, "#00ffff");
        assert_eq!(engine.state().bikes[0].color, "#00ffff");
    }

    #[test]
    fn test_head_to_head_both_derez() {
        // player (2,4) up, AI (2,0) down: they meet at (2,2) on the second tick
        let mut engine = playing(5, vec![spawn(2, 4, Direction::Up), spawn(2, 0, Direction::Down)], Difficulty::Easy);
        engine.tick();
        assert!(engine.bikes().iter().all(|b| b.alive));
        engine.tick();

        let state = engine.state();
        assert!(state.bikes.iter().all(|b| !b.alive));
        assert!(!engine.is_occupied(IVec2::new(2, 2)));
        // the player died, which outranks the draw
        assert_eq!(state.winner, Some(Winner::PlayerEliminated));
        assert_eq!(state.winner.map(Winner::code), Some(-2));
    }

    #[test]
    fn test_ai_head_to_head_leaves_player_winner() {
        let mut engine = playing(
            9,
            vec![spawn(0, 6, Direction::Up), spawn(2, 3, Direction::Right), spawn(6, 3, Direction::Left)],
            Difficulty::Medium,
        );
        engine.tick();
        assert_eq!(engine.phase(), GamePhase::Playing);
        engine.tick();

        assert!(!engine.bikes()[1].alive);
        assert!(!engine.bikes()[2].alive);
        assert!(engine.bikes()[0].alive);
        assert_eq!(engine.winner(), Some(Winner::Bike(0)));
    }

    #[test]
    fn test_three_way_convergence_all_derez() {
        let mut engine = playing(
            7,
            vec![
                spawn(0, 0, Direction::Right),
                spawn(2, 3, Direction::Right),
                spawn(4, 3, Direction::Left),
                spawn(3, 4, Direction::Up),
            ],
            Difficulty::Medium,
        );
        engine.tick();

        assert!(engine.bikes()[0].alive);
        assert!(engine.bikes()[1..].iter().all(|b| !b.alive));
        assert_eq!(engine.winner(), Some(Winner::Bike(0)));
    }

    #[test]
    fn test_player_and_opponents_collide_together() {
        let mut engine = playing(
            5,
            vec![spawn(2, 3, Direction::Up), spawn(1, 2, Direction::Right), spawn(3, 2, Direction::Left)],
            Difficulty::Medium,
        );
        engine.tick();
        assert!(engine.bikes().iter().all(|b| !b.alive));
        assert_eq!(engine.winner(), Some(Winner::PlayerEliminated));
    }

    #[test]
    fn test_player_death_ends_game_while_ai_alive() {
        let mut engine = playing(
            12,
            vec![spawn(0, 5, Direction::Left), spawn(6, 2, Direction::Down), spawn(6, 9, Direction::Up)],
            Difficulty::Hard,
        );
        engine.tick();
        assert_eq!(engine.winner(), Some(Winner::PlayerEliminated));
        assert_eq!(engine.bikes()[1..].iter().filter(|b| b.alive).count(), 2);

        // further ticks are no-ops
        let frozen = engine.bikes().to_vec();
        engine.tick();
        assert_eq!(engine.bikes(), &frozen[..]);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let spawns = vec![spawn(1, 8, Direction::Up), spawn(8, 1, Direction::Down), spawn(1, 1, Direction::Right)];
        let mut engine = playing(10, spawns, Difficulty::Insane);
        for _ in 0..6 {
            engine.tick();
        }
        engine.reset();
        let first = (engine.bikes().to_vec(), engine.phase(), engine.winner(), engine.occupied_count());
        engine.reset();
        let second = (engine.bikes().to_vec(), engine.phase(), engine.winner(), engine.occupied_count());

        assert_eq!(first, second);
        assert_eq!(first.1, GamePhase::Ready);
        assert_eq!(first.2, None);
        assert_eq!(first.3, 3);
        assert_eq!(engine.ticks(), 0);
    }

    #[test]
    fn test_out_of_bounds_spawn_starts_derezzed() {
        let mut engine = Engine::new(5, vec![spawn(-1, 0, Direction::Up), spawn(2, 2, Direction::Up)], 1);
        let bike = &engine.bikes()[0];
        assert!(!bike.alive);
        assert!(bike.trail.is_empty());
        assert!(engine.bikes()[1].alive);
        for bike in engine.bikes() {
            assert!(bike.trail.iter().all(|&cell| engine.is_occupied(cell)));
        }
        assert_eq!(engine.occupied_count(), 1);

        engine.start();
        engine.tick();
        assert_eq!(engine.winner(), Some(Winner::PlayerEliminated));
        assert!(engine.bikes()[0].trail.is_empty());
        let trail_cells: usize = engine.bikes().iter().map(|b| b.trail.len()).sum();
        assert_eq!(engine.occupied_count(), trail_cells);
    }

    #[test]
    fn test_shared_spawn_claims_once() {
        let engine = Engine::new(6, vec![spawn(1, 1, Direction::Up), spawn(1, 1, Direction::Down)], 1);
        assert!(engine.bikes()[0].alive);
        assert!(!engine.bikes()[1].alive);
        let trail_cells: usize = engine.bikes().iter().map(|b| b.trail.len()).sum();
        assert_eq!(engine.occupied_count(), trail_cells);
    }

    #[test]
    fn test_autopilot_steers_player() {
        let spawns = vec![spawn(9, 5, Direction::Right), spawn(0, 0, Direction::Down)];
        let mut engine = playing(10, spawns.clone(), Difficulty::Medium);
        engine.tick();
        assert!(!engine.bikes()[0].alive);

        let mut engine = playing(10, spawns, Difficulty::Medium);
        assert!(!engine.autopilot());
        engine.set_autopilot(true);
        assert!(engine.autopilot());
        engine.tick();
        assert!(engine.bikes()[0].alive);
        assert_eq!(engine.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_events() {
        let mut engine = playing(5, vec![spawn(4, 2, Direction::Right), spawn(0, 0, Direction::Down)], Difficulty::Medium);
        engine.tick();
        let events: Vec<GameEvent> = engine.drain_events().collect();
        assert_eq!(
            events,
            vec![
                GameEvent::Started,
                GameEvent::Derezzed { bike: 0, at: IVec2::new(5, 2) },
                GameEvent::GameOver { winner: Winner::PlayerEliminated },
            ]
        );
        assert_eq!(engine.drain_events().count(), 0);
    }

    #[test]
    fn test_determinism() {
        let spawns = vec![
            spawn(10, 18, Direction::Up),
            spawn(10, 1, Direction::Down),
            spawn(1, 10, Direction::Right),
            spawn(18, 10, Direction::Left),
        ];
        let mut a = Engine::seeded(20, spawns.clone(), Difficulty::Easy, 99);
        let mut b = Engine::seeded(20, spawns, Difficulty::Easy, 99);
        a.set_autopilot(true);
        b.set_autopilot(true);
        a.start();
        b.start();
        for _ in 0..200 {
            a.tick();
            b.tick();
        }
        assert_eq!(a.bikes(), b.bikes());
        assert_eq!(a.winner(), b.winner());
        assert_eq!(a.ticks(), b.ticks());
    }
}
