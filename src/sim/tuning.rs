//! Balance lab: resolve many isolated snaps between two fixed teams and
//! report the distribution. Nothing is committed, so every snap sees the
//! same fresh rosters and the same 1st and 10.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::roster::Team;

use super::outcome::Action;
use super::playcaller::ClockMode;
use super::resolver::{resolve_play, PlayContext};
use super::state::GameState;
use super::tactics::{DefensiveCall, OffensivePlay};

/// Runs of at least this many yards count as breakaways.
pub const BREAKAWAY_YARDS: i32 = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TuningReport {
    pub plays: u32,
    pub rush_att: u32,
    pub rush_yds: i32,
    pub breakaways: u32,
    pub stuffs: u32,
    pub fumbles: u32,
    pub dropbacks: u32,
    pub pass_att: u32,
    pub pass_cmp: u32,
    pub pass_yds: i32,
    pub drops: u32,
    pub sacks: u32,
    pub interceptions: u32,
    pub scrambles: u32,
}

fn ratio(num: f64, den: u32) -> f64 {
    if den == 0 {
        0.0
    } else {
        num / f64::from(den)
    }
}

impl TuningReport {
    pub fn rush_avg(&self) -> f64 {
        ratio(f64::from(self.rush_yds), self.rush_att)
    }

    pub fn completion_pct(&self) -> f64 {
        ratio(f64::from(self.pass_cmp) * 100.0, self.pass_att)
    }

    pub fn yards_per_attempt(&self) -> f64 {
        ratio(f64::from(self.pass_yds), self.pass_att)
    }

    pub fn sack_pct(&self) -> f64 {
        ratio(f64::from(self.sacks) * 100.0, self.dropbacks)
    }

    pub fn int_pct(&self) -> f64 {
        ratio(f64::from(self.interceptions) * 100.0, self.pass_att)
    }

    fn record(&mut self, action: Action, yards: i32) {
        self.plays += 1;
        match action {
            Action::Rush => {
                self.rush_att += 1;
                self.rush_yds += yards;
                if yards >= BREAKAWAY_YARDS {
                    self.breakaways += 1;
                }
                if yards <= 0 {
                    self.stuffs += 1;
                }
            }
            Action::Fumble => {
                self.rush_att += 1;
                self.fumbles += 1;
            }
            Action::Completion => {
                self.dropbacks += 1;
                self.pass_att += 1;
                self.pass_cmp += 1;
                self.pass_yds += yards;
            }
            Action::Incompletion => {
                self.dropbacks += 1;
                self.pass_att += 1;
            }
            Action::Drop => {
                self.dropbacks += 1;
                self.pass_att += 1;
                self.drops += 1;
            }
            Action::Interception => {
                self.dropbacks += 1;
                self.pass_att += 1;
                self.interceptions += 1;
            }
            Action::Sack | Action::StripSack => {
                self.dropbacks += 1;
                self.sacks += 1;
            }
            Action::Scramble => {
                self.dropbacks += 1;
                self.scrambles += 1;
            }
            Action::Punt | Action::FieldGoal | Action::Blocked => {}
        }
    }
}

impl fmt::Display for TuningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} plays ===", self.plays)?;
        writeln!(f, "PASSING")?;
        writeln!(
            f,
            "  {}/{} ({:.1}%), {} yds, {:.1} YPA",
            self.pass_cmp,
            self.pass_att,
            self.completion_pct(),
            self.pass_yds,
            self.yards_per_attempt()
        )?;
        writeln!(
            f,
            "  sacks {} ({:.1}%), INT {} ({:.1}%), drops {}, scrambles {}",
            self.sacks,
            self.sack_pct(),
            self.interceptions,
            self.int_pct(),
            self.drops,
            self.scrambles
        )?;
        writeln!(f, "RUSHING")?;
        writeln!(
            f,
            "  {} att, {} yds, {:.1} avg",
            self.rush_att,
            self.rush_yds,
            self.rush_avg()
        )?;
        write!(
            f,
            "  breakaways (20+) {}, stuffs (<=0) {}, fumbles {}",
            self.breakaways, self.stuffs, self.fumbles
        )
    }
}

/// Resolve `plays` snaps: half random run calls, half random pass calls,
/// each against a random scrimmage defense.
pub fn run_tuning<R: Rng + ?Sized>(offense: &Team, defense: &Team, plays: u32, rng: &mut R) -> TuningReport {
    let state = GameState::new();
    let ctx = PlayContext {
        state: &state,
        offense,
        defense,
        mode: ClockMode::Normal,
    };

    let mut report = TuningReport::default();
    for _ in 0..plays {
        let menu: &[OffensivePlay] = if rng.gen::<f64>() < 0.5 {
            &OffensivePlay::RUNS
        } else {
            &OffensivePlay::PASSES
        };
        let play = *menu.choose(rng).unwrap_or(&OffensivePlay::RunPower);
        let call = *DefensiveCall::SCRIMMAGE.choose(rng).unwrap_or(&DefensiveCall::Cover2);
        let outcome = resolve_play(&ctx, play, call, rng);
        report.record(outcome.action, outcome.yards);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::TeamBuilder;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn counts_every_play() {
        let off = TeamBuilder::new("Offense").rating(75).build();
        let def = TeamBuilder::new("Defense").rating(75).build();
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let r = run_tuning(&off, &def, 2000, &mut rng);

        assert_eq!(r.plays, 2000);
        assert_eq!(r.rush_att + r.dropbacks, 2000);
        assert_eq!(r.pass_att + r.sacks + r.scrambles, r.dropbacks);
        assert!(r.pass_cmp <= r.pass_att);
        assert!(r.rush_att > 800 && r.rush_att < 1200, "{} rushes", r.rush_att);
        assert!(r.completion_pct() > 30.0);
    }

    #[test]
    fn stronger_offense_gains_more() {
        let weak = TeamBuilder::new("Weak").rating(55).build();
        let strong = TeamBuilder::new("Strong").rating(90).build();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let good = run_tuning(&strong, &weak, 3000, &mut rng);
        let bad = run_tuning(&weak, &strong, 3000, &mut rng);
        assert!(good.rush_avg() > bad.rush_avg());
        assert!(good.stuffs < bad.stuffs);
    }

    #[test]
    fn empty_report_has_zero_rates() {
        let r = TuningReport::default();
        assert_relative_eq!(r.completion_pct(), 0.0);
        assert_relative_eq!(r.rush_avg(), 0.0);
        assert!(r.to_string().contains("0 plays"));
    }

    #[test]
    fn rates() {
        let mut r = TuningReport::default();
        r.record(Action::Completion, 12);
        r.record(Action::Incompletion, 0);
        r.record(Action::Sack, -6);
        r.record(Action::Rush, 25);
        r.record(Action::Rush, -1);
        assert_relative_eq!(r.completion_pct(), 50.0);
        assert_relative_eq!(r.yards_per_attempt(), 6.0);
        assert_relative_eq!(r.sack_pct(), 100.0 / 3.0, epsilon = 1e-9);
        assert_eq!(r.breakaways, 1);
        assert_eq!(r.stuffs, 1);
        assert_relative_eq!(r.rush_avg(), 12.0);
    }
}
