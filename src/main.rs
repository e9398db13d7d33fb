use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use gridiron_sim::roster::{Team, TeamBuilder};
use gridiron_sim::sim::{run_tuning, simulate_game, GameRecord, GameSim, PlayRecord, Side, StepHook};

mod config;

use config::Config;

/// Prints each play and waits for Enter.
struct PromptPause;

impl StepHook for PromptPause {
    fn after_play(&mut self, line: &str, _play: &PlayRecord) {
        print!("{}  [Enter]", line);
        if let Err(e) = io::stdout().flush() {
            warn!("Failed to flush stdout: {}", e);
        }
        let mut buf = String::new();
        if io::stdin().lock().read_line(&mut buf).is_err() {
            warn!("stdin closed, continuing without pausing");
        }
    }
}

#[derive(Debug, Default)]
struct BatchSummary {
    games: u32,
    home_wins: u32,
    away_wins: u32,
    ties: u32,
    overtime_games: u32,
    home_points: u32,
    away_points: u32,
}

impl BatchSummary {
    fn add(&mut self, record: &GameRecord) {
        self.games += 1;
        match record.winner() {
            Some(Side::Home) => self.home_wins += 1,
            Some(Side::Away) => self.away_wins += 1,
            None => self.ties += 1,
        }
        if record.went_to_overtime() {
            self.overtime_games += 1;
        }
        self.home_points += record.home_score;
        self.away_points += record.away_score;
    }

    fn average(points: u32, games: u32) -> f64 {
        if games == 0 {
            0.0
        } else {
            f64::from(points) / f64::from(games)
        }
    }
}

fn load_team(path: Option<&Path>, name: &str, rating: u8, bias: u8, jitter: u8, seed: u64) -> Result<Team> {
    let Some(path) = path else {
        return Ok(TeamBuilder::new(name)
            .rating(rating)
            .run_pass_bias(bias)
            .jitter(jitter)
            .seed(seed)
            .build());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read team file {}", path.display()))?;
    let mut team: Team = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse team file {}", path.display()))?;
    if team.depth_chart.is_empty() {
        team.set_depth_chart();
    }
    team.validate()
        .with_context(|| format!("Invalid roster in {}", path.display()))?;
    info!("Loaded {} ({} players) from {}", team.name, team.roster.len(), path.display());
    Ok(team)
}

/// Batch games go into a numbered subdirectory each so their logs don't collide.
fn export(config: &Config, record: &GameRecord, game: Option<u32>) -> Result<()> {
    if let Some(base) = &config.export_dir {
        let dir = match game {
            Some(i) => base.join(format!("game_{:03}", i + 1)),
            None => base.clone(),
        };
        let path = record
            .export_log(&dir)
            .with_context(|| format!("Failed to export log to {}", dir.display()))?;
        info!("Play-by-play written to {}", path.display());
    }
    Ok(())
}

fn print_record(config: &Config, record: &GameRecord) -> Result<()> {
    if config.json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        if !config.interactive {
            for line in &record.log {
                println!("{}", line);
            }
        }
        println!("FINAL: {}", record.final_line());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::parse();
    config.validate()?;

    let seed = config.seed_or_random();
    info!("Using seed {}", seed);

    let mut home = load_team(
        config.home_team.as_deref(),
        &config.home_name,
        config.home_rating,
        config.home_bias,
        config.jitter,
        seed,
    )?;
    let mut away = load_team(
        config.away_team.as_deref(),
        &config.away_name,
        config.away_rating,
        config.away_bias,
        config.jitter,
        seed.wrapping_add(1),
    )?;

    // Tuning lab: home offense against away defense, no game
    if let Some(plays) = config.tune_plays {
        info!("Tuning: {} offense vs {} defense, {} plays", home.name, away.name, plays);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let report = run_tuning(&home, &away, plays, &mut rng);
        if config.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("{}", report);
        }
        return Ok(());
    }

    if config.games == 1 {
        let sim = GameSim::new(&mut home, &mut away, config.week, seed)?;
        let sim = if config.interactive { sim.with_hook(PromptPause) } else { sim };
        let record = sim.play_game();
        print_record(&config, &record)?;
        export(&config, &record, None)?;
        return Ok(());
    }

    // Batch: every game gets its own copy of both teams and its own seed
    let mut handles = Vec::with_capacity(config.games as usize);
    for i in 0..config.games {
        let mut home = home.clone();
        let mut away = away.clone();
        let week = config.week;
        let game_seed = seed.wrapping_add(u64::from(i));
        handles.push(tokio::task::spawn_blocking(move || {
            simulate_game(&mut home, &mut away, week, game_seed)
        }));
    }

    let mut summary = BatchSummary::default();
    let mut records = Vec::with_capacity(handles.len());
    for (i, handle) in (0..).zip(handles) {
        let record = handle.await.context("Game task failed")??;
        summary.add(&record);
        export(&config, &record, Some(i))?;
        records.push(record);
    }

    if config.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for record in &records {
            println!("{}", record.final_line());
        }
    }
    info!(
        "{} games: {} {} wins, {} {} wins, {} ties, {} to overtime, avg score {:.1}-{:.1}",
        summary.games,
        home.name,
        summary.home_wins,
        away.name,
        summary.away_wins,
        summary.ties,
        summary.overtime_games,
        BatchSummary::average(summary.home_points, summary.games),
        BatchSummary::average(summary.away_points, summary.games),
    );

    Ok(())
}
