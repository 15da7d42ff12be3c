//! Light Cycles headless runner
//!
//! Plays demo matches with every bike on autopilot and prints each final
//! board plus the session tally.

use std::path::PathBuf;

use clap::Parser;
use light_cycles::consts::*;
use light_cycles::sim::{Engine, GameEvent, GamePhase};
use light_cycles::{Difficulty, MatchSettings, MatchTally, Outcome};

#[derive(Parser, Debug)]
#[command(name = "light-cycles")]
#[command(about = "Play autopilot light-cycle matches and print the tally")]
struct Args {
    /// Settings JSON; defaults are used when absent or unreadable
    settings: Option<PathBuf>,

    /// Number of games to play
    #[arg(short, long)]
    rounds: Option<u32>,

    /// Seed for the AI random source
    #[arg(short, long)]
    seed: Option<u64>,

    /// AI difficulty: easy, medium, hard or insane
    #[arg(short, long, value_parser = parse_difficulty)]
    difficulty: Option<Difficulty>,
}

impl Args {
    /// Load the settings file, then apply command-line overrides
    fn settings(&self) -> MatchSettings {
        let mut settings = match &self.settings {
            Some(path) => MatchSettings::load_or_default(path),
            None => {
                log::info!("No settings file given, using defaults");
                MatchSettings::default()
            }
        };
        if let Some(rounds) = self.rounds {
            settings.rounds = rounds;
        }
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
        if let Some(difficulty) = self.difficulty {
            settings.difficulty = difficulty;
        }
        settings
    }
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    Difficulty::from_str(s).ok_or_else(|| format!("unknown difficulty '{s}'"))
}

/// Simulated display refresh driving the accumulator
const FRAME_DT: f32 = 1.0 / 60.0;

/// One running match plus its frame clock
struct Session {
    engine: Engine,
    accumulator: f32,
}

impl Session {
    fn new(settings: &MatchSettings) -> Self {
        let mut engine = Engine::from_settings(settings);
        // nobody is at the keyboard
        engine.set_autopilot(true);
        Self {
            engine,
            accumulator: 0.0,
        }
    }

    /// Run simulation ticks for one frame
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.engine.tick();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        let events: Vec<GameEvent> = self.engine.drain_events().collect();
        for event in events {
            match event {
                GameEvent::Started => log::debug!("Go!"),
                GameEvent::Derezzed { bike, at } => log::info!(
                    "Bike {} derezzed at ({}, {}), {} left",
                    bike,
                    at.x,
                    at.y,
                    self.engine.state().alive_count()
                ),
                GameEvent::GameOver { winner } => {
                    log::info!("Winner: {}", Outcome::from_winner(winner).as_str())
                }
            }
        }
    }

    /// Play one game from a fresh reset. Returns false if it hit the tick cap.
    fn play(&mut self) -> bool {
        self.engine.reset();
        self.accumulator = 0.0;
        self.engine.begin_countdown();
        self.engine.start();

        while self.engine.phase() == GamePhase::Playing {
            if self.engine.ticks() >= MAX_GAME_TICKS {
                log::warn!("Game abandoned after {} ticks", self.engine.ticks());
                return false;
            }
            self.update(FRAME_DT);
        }
        true
    }
}

/// Draw the grid: `.` empty, trail letters per bike, capitals for live heads,
/// `x` where a bike derezzed.
fn render_board(engine: &Engine) -> String {
    let size = engine.grid_size() as usize;
    let mut rows = vec![vec!['.'; size]; size];

    for (index, bike) in engine.state().bikes.iter().enumerate() {
        let mark = (b'a' + (index % 26) as u8) as char;
        for cell in &bike.trail {
            rows[cell.y as usize][cell.x as usize] = mark;
        }
        // a bike that never made it onto the grid has no head to draw
        let (Ok(x), Ok(y)) = (usize::try_from(bike.x()), usize::try_from(bike.y())) else {
            continue;
        };
        if x < size && y < size {
            rows[y][x] = if bike.alive { mark.to_ascii_uppercase() } else { 'x' };
        }
    }

    rows.into_iter()
        .map(|row| row.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

fn main() {
    env_logger::init();

    let settings = Args::parse().settings();
    log::info!(
        "Light Cycles: {}x{} grid, {} bikes, {}, seed {}, {} rounds",
        settings.grid_size,
        settings.grid_size,
        settings.bikes.len(),
        settings.difficulty.as_str(),
        settings.seed,
        settings.rounds
    );

    let mut session = Session::new(&settings);
    let mut tally = MatchTally::new();

    for round in 1..=settings.rounds {
        if !session.play() {
            continue;
        }
        let engine = &session.engine;
        let view = engine.state();
        let Some(winner) = view.winner else {
            continue;
        };
        println!(
            "Round {}: {} (code {}) after {} ticks, player trail {} cells",
            round,
            Outcome::from_winner(winner).as_str(),
            winner.code(),
            engine.ticks(),
            view.player().map_or(0, |bike| bike.trail.len())
        );
        println!("{}\n", render_board(engine));
        if let Some(rank) = tally.record(winner, engine.ticks(), engine.difficulty()) {
            log::debug!("Round {} is #{} longest", round, rank);
        }
    }

    match serde_json::to_string_pretty(&tally) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize tally: {}", e),
    }
}
