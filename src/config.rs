//! Command-line configuration.

use std::path::PathBuf;

use clap::Parser;

/// Play-by-play football game simulator
#[derive(Parser, Debug, Clone)]
#[command(name = "gridiron-sim", version, about)]
pub struct Config {
    /// RNG seed; a random one is chosen (and logged) when omitted
    #[arg(long, env = "GRIDIRON_SEED")]
    pub seed: Option<u64>,

    /// Week number used in logs and export file names
    #[arg(long, env = "GRIDIRON_WEEK", default_value = "1")]
    pub week: u32,

    /// Number of independent games to simulate
    #[arg(long, env = "GRIDIRON_GAMES", default_value = "1")]
    pub games: u32,

    /// Home team JSON roster file (generated when omitted)
    #[arg(long, env = "GRIDIRON_HOME_TEAM")]
    pub home_team: Option<PathBuf>,

    /// Away team JSON roster file (generated when omitted)
    #[arg(long, env = "GRIDIRON_AWAY_TEAM")]
    pub away_team: Option<PathBuf>,

    /// Name for a generated home team
    #[arg(long, env = "GRIDIRON_HOME_NAME", default_value = "Home")]
    pub home_name: String,

    /// Name for a generated away team
    #[arg(long, env = "GRIDIRON_AWAY_NAME", default_value = "Away")]
    pub away_name: String,

    /// Overall rating for a generated home team (1–99)
    #[arg(long, env = "GRIDIRON_HOME_RATING", default_value = "75")]
    pub home_rating: u8,

    /// Overall rating for a generated away team (1–99)
    #[arg(long, env = "GRIDIRON_AWAY_RATING", default_value = "75")]
    pub away_rating: u8,

    /// Home coach run/pass bias (0 = ground game, 10 = air raid)
    #[arg(long, env = "GRIDIRON_HOME_BIAS", default_value = "5")]
    pub home_bias: u8,

    /// Away coach run/pass bias (0 = ground game, 10 = air raid)
    #[arg(long, env = "GRIDIRON_AWAY_BIAS", default_value = "5")]
    pub away_bias: u8,

    /// Attribute spread applied to generated players
    #[arg(long, env = "GRIDIRON_JITTER", default_value = "5")]
    pub jitter: u8,

    /// Pause after every play until Enter is pressed
    #[arg(long, env = "GRIDIRON_INTERACTIVE", default_value = "false")]
    pub interactive: bool,

    /// Directory to write play-by-play logs into
    #[arg(long, env = "GRIDIRON_EXPORT_DIR")]
    pub export_dir: Option<PathBuf>,

    /// Print game records as JSON instead of text
    #[arg(long, env = "GRIDIRON_JSON", default_value = "false")]
    pub json: bool,

    /// Run the tuning lab for this many plays instead of a game
    #[arg(long, env = "GRIDIRON_TUNE_PLAYS")]
    pub tune_plays: Option<u32>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        for (label, rating) in [("home_rating", self.home_rating), ("away_rating", self.away_rating)] {
            if !(1..=99).contains(&rating) {
                anyhow::bail!("{} must be between 1 and 99", label);
            }
        }
        for (label, bias) in [("home_bias", self.home_bias), ("away_bias", self.away_bias)] {
            if bias > 10 {
                anyhow::bail!("{} must be between 0 and 10", label);
            }
        }
        if self.games == 0 {
            anyhow::bail!("games must be at least 1");
        }
        if self.interactive && self.games > 1 {
            anyhow::bail!("--interactive can only be used with a single game");
        }
        if self.tune_plays == Some(0) {
            anyhow::bail!("tune_plays must be at least 1");
        }
        Ok(())
    }

    /// The configured seed, or a fresh random one.
    pub fn seed_or_random(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}
