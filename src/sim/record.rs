//! Finished-game output: one record per snap, the game summary and the
//! exported play-by-play text file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::outcome::{Action, PlayEvent, Side};
use super::playcaller::ClockMode;
use super::state::TeamTotals;
use super::tactics::{DefensiveCall, OffensivePlay};

/// Structured copy of one snap, taken before the play was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayRecord {
    pub quarter: u8,
    /// `None` in regulation, the period number in overtime.
    pub overtime_period: Option<u32>,
    /// Game clock at the snap, `mm:ss`.
    pub clock: String,
    pub offense: Side,
    pub down: u8,
    pub distance: i32,
    pub ball_on: i32,
    pub mode: ClockMode,
    pub play: OffensivePlay,
    pub call: DefensiveCall,
    pub action: Action,
    pub event: PlayEvent,
    pub yards: i32,
    /// Points the offense scored on the play (negative for a safety).
    pub points: i32,
    pub seconds: i32,
    pub description: String,
}

/// A completed game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub week: u32,
    pub home: String,
    pub away: String,
    pub home_score: u32,
    pub away_score: u32,
    pub played: bool,
    pub overtime_periods: u32,
    pub home_totals: TeamTotals,
    pub away_totals: TeamTotals,
    pub seed: u64,
    pub simulated_at: DateTime<Utc>,
    pub log: Vec<String>,
    pub plays: Vec<PlayRecord>,
}

impl GameRecord {
    /// `None` for a tie.
    pub fn winner(&self) -> Option<Side> {
        match self.home_score.cmp(&self.away_score) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less => Some(Side::Away),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn team_name(&self, side: Side) -> &str {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn went_to_overtime(&self) -> bool {
        self.overtime_periods > 0
    }

    /// `Away 17 @ Home 20`, with `(OT)` or `(2OT)` and so on appended.
    pub fn final_line(&self) -> String {
        let ot = match self.overtime_periods {
            0 => String::new(),
            1 => " (OT)".to_string(),
            n => format!(" ({}OT)", n),
        };
        format!(
            "{} {} @ {} {}{}",
            self.away, self.away_score, self.home, self.home_score, ot
        )
    }

    pub fn log_file_name(&self) -> String {
        format!(
            "Week{}_{}_vs_{}.txt",
            self.week,
            file_safe(&self.away),
            file_safe(&self.home)
        )
    }

    /// Write the play-by-play log into `dir`, creating it if needed.
    pub fn export_log(&self, dir: &Path) -> io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(self.log_file_name());

        let mut text = format!(
            "WEEK {}: {} @ {}\nSimulated {} (seed {})\n\n",
            self.week,
            self.away,
            self.home,
            self.simulated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.seed
        );
        for line in &self.log {
            text.push_str(line);
            text.push('\n');
        }
        text.push_str(&format!("\nFINAL: {}\n", self.final_line()));

        fs::write(&path, text)?;
        Ok(path)
    }
}

fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
