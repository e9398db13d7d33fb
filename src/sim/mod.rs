//! Play-by-play game simulation.
//!
//! Layering, bottom up: `tactics` (the play and coverage vocabulary),
//! `matchup` and `fatigue` (skill and body math), `playcaller` (what to
//! call), `resolver` (what happened, as a pure [`PlayOutcome`]), `state`
//! (down, distance, clock and score), `engine` (the loop that ties them
//! together and writes to the rosters) and `overtime`.

pub mod engine;
pub mod fatigue;
pub mod matchup;
pub mod outcome;
pub mod overtime;
pub mod playcaller;
pub mod record;
pub mod resolver;
pub mod state;
pub mod tactics;
pub mod tuning;

pub use engine::{simulate_game, team_stat, GameSim, NoPause, StepHook};
pub use outcome::{Action, PlayEvent, PlayOutcome, PlayerRef, Side, Turnover};
pub use playcaller::ClockMode;
pub use record::{GameRecord, PlayRecord};
pub use state::{GameState, TeamTotals};
pub use tactics::{DefensiveCall, OffensivePlay};
pub use tuning::{run_tuning, TuningReport};
