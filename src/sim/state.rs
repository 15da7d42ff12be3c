//! Game state and core simulation types
//!
//! Everything the host may read back between ticks lives here. The engine owns
//! the only mutable copies; hosts see these types through [`GameView`].

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Heading of a bike on the grid. `Up` decreases `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All headings in evaluation order
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// The 180° reversal of this heading
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Unit offset of one step in this heading
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    /// Cell reached by moving one step from `cell`
    #[inline]
    pub fn step(self, cell: IVec2) -> IVec2 {
        cell + self.delta()
    }

    /// The two headings at 90° to this one
    pub fn perpendicular(self) -> [Direction; 2] {
        match self {
            Direction::Up | Direction::Down => [Direction::Left, Direction::Right],
            Direction::Left | Direction::Right => [Direction::Up, Direction::Down],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Where and how a bike enters the grid on every reset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BikeSpawn {
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
    /// Display colour, passed through untouched
    #[serde(default)]
    pub color: String,
}

impl BikeSpawn {
    pub fn new(x: i32, y: i32, direction: Direction, color: impl Into<String>) -> Self {
        Self {
            x,
            y,
            direction,
            color: color.into(),
        }
    }

    pub fn cell(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }
}

/// One participant. Index 0 in the engine is always the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bike {
    /// Current head cell
    pub pos: IVec2,
    /// Heading committed for the current tick
    pub direction: Direction,
    /// Heading queued for the next tick
    pub next_direction: Direction,
    /// Every cell this bike has held, oldest first (includes the spawn cell)
    pub trail: Vec<IVec2>,
    pub alive: bool,
    pub color: String,
}

impl Bike {
    pub fn from_spawn(spawn: &BikeSpawn) -> Self {
        let pos = spawn.cell();
        Self {
            pos,
            direction: spawn.direction,
            next_direction: spawn.direction,
            trail: vec![pos],
            alive: true,
            color: spawn.color.clone(),
        }
    }

    pub fn x(&self) -> i32 {
        self.pos.x
    }

    pub fn y(&self) -> i32 {
        self.pos.y
    }

    /// Cell this bike enters if it keeps its committed heading
    pub fn next_cell(&self) -> IVec2 {
        self.direction.step(self.pos)
    }
}

/// Current phase of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    /// Bikes placed, waiting for the host
    Ready,
    /// Host is counting down; the engine keeps no timer
    Countdown,
    /// Ticks advance the simulation
    Playing,
    /// Outcome decided
    GameOver,
}

/// Final result of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    /// Sole surviving bike by index
    Bike(usize),
    /// Every remaining bike derezzed on the same tick
    Draw,
    /// The player (index 0) derezzed; overrides every other result
    PlayerEliminated,
}

impl Winner {
    /// Integer code understood by hosts: bike index, `-1` draw, `-2` player eliminated
    pub fn code(self) -> i32 {
        match self {
            Winner::Bike(index) => index as i32,
            Winner::Draw => DRAW_CODE,
            Winner::PlayerEliminated => PLAYER_ELIMINATED_CODE,
        }
    }
}

pub const DRAW_CODE: i32 = -1;
pub const PLAYER_ELIMINATED_CODE: i32 = -2;

/// Something the host may want to react to (sound, particles, overlays)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Started,
    /// A bike crashed trying to enter `at`
    Derezzed { bike: usize, at: IVec2 },
    GameOver { winner: Winner },
}

/// Read-only view handed to the host each frame
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GameView<'a> {
    pub bikes: &'a [Bike],
    pub phase: GamePhase,
    pub winner: Option<Winner>,
}

impl GameView<'_> {
    pub fn player(&self) -> Option<&Bike> {
        self.bikes.first()
    }

    pub fn alive_count(&self) -> usize {
        self.bikes.iter().filter(|b| b.alive).count()
    }
}
