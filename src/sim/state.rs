//! Down, distance, clock, possession and score.
//!
//! `GameState` is the only thing that moves the ball. It knows nothing about
//! rosters; it consumes a [`PlayOutcome`] and reports what that did as a
//! [`PlayEvent`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::outcome::{PlayEvent, PlayOutcome, Resolution, Side};
use super::playcaller::Situation;

pub const QUARTER_SECONDS: i32 = 900;

/// Where the receiving team starts after a kickoff.
pub const KICKOFF_SPOT: i32 = 25;

/// Where every overtime possession starts (25 from the opponent's goal).
pub const OVERTIME_SPOT: i32 = 75;

/// Where a punt that reaches the goal line is placed instead.
pub const PUNT_FALLBACK_SPOT: i32 = 20;

pub const TOUCHDOWN_POINTS: u32 = 7;
pub const FIELD_GOAL_POINTS: u32 = 3;
pub const SAFETY_POINTS: u32 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamTotals {
    pub score: u32,
    pub yards: i32,
    pub turnovers: u32,
}

/// How the ball changes hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PossessionChange {
    /// After a score: the receiver starts at its own 25 (overtime: opp 25).
    Kickoff,
    /// The new offense takes over where the ball is, mirrored.
    Turnover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    Running,
    QuarterEnded(u8),
    RegulationOver,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub quarter: u8,
    pub time_remaining: i32,
    pub down: u8,
    pub distance: i32,
    /// 0..=100 toward the offense's scoring end.
    pub ball_on: i32,
    pub offense: Side,
    pub overtime_period: Option<u32>,
    totals: [TeamTotals; 2],
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Opening state: away team ball at its own 25, 1st and 10, 15:00 Q1.
    pub fn new() -> Self {
        Self {
            quarter: 1,
            time_remaining: QUARTER_SECONDS,
            down: 1,
            distance: 10,
            ball_on: KICKOFF_SPOT,
            offense: Side::Away,
            overtime_period: None,
            totals: [TeamTotals::default(); 2],
        }
    }

    pub fn defense(&self) -> Side {
        self.offense.other()
    }

    pub fn is_overtime(&self) -> bool {
        self.overtime_period.is_some()
    }

    pub fn totals(&self, side: Side) -> &TeamTotals {
        &self.totals[side.index()]
    }

    fn totals_mut(&mut self, side: Side) -> &mut TeamTotals {
        &mut self.totals[side.index()]
    }

    pub fn score(&self, side: Side) -> u32 {
        self.totals(side).score
    }

    /// Offense score minus defense score.
    pub fn score_diff(&self) -> i32 {
        self.score(self.offense) as i32 - self.score(self.defense()) as i32
    }

    pub fn is_tied(&self) -> bool {
        self.score(Side::Home) == self.score(Side::Away)
    }

    /// Clutch time: fourth quarter or overtime, within one score.
    pub fn is_clutch(&self) -> bool {
        (self.quarter == 4 || self.is_overtime()) && self.score_diff().abs() <= 8
    }

    pub fn in_red_zone(&self) -> bool {
        self.ball_on > 80
    }

    pub fn add_points(&mut self, side: Side, points: u32) {
        self.totals_mut(side).score += points;
    }

    /// Take points back (used when a shootout touchdown counts as a conversion).
    pub fn remove_points(&mut self, side: Side, points: u32) {
        let t = self.totals_mut(side);
        t.score = t.score.saturating_sub(points);
    }

    pub fn situation(&self) -> Situation {
        Situation {
            down: self.down,
            distance: self.distance,
            ball_on: self.ball_on,
            quarter: self.quarter,
            time_remaining: self.time_remaining,
            score_diff: self.score_diff(),
            overtime: self.overtime_period,
        }
    }

    /// Hand the ball to `side` at a fixed spot with a fresh set of downs.
    pub fn set_possession(&mut self, side: Side, ball_on: i32, down: u8, distance: i32) {
        self.offense = side;
        self.ball_on = ball_on;
        self.down = down;
        self.distance = distance;
    }

    pub fn switch_possession(&mut self, change: PossessionChange) {
        self.offense = self.offense.other();
        self.down = 1;
        self.distance = 10;
        self.ball_on = match change {
            PossessionChange::Turnover => 100 - self.ball_on,
            PossessionChange::Kickoff if self.is_overtime() => OVERTIME_SPOT,
            PossessionChange::Kickoff => KICKOFF_SPOT,
        };
        debug!("Possession to {} at {}", self.offense, self.ball_on);
    }

    /// Apply a resolved play and report what it did.
    pub fn apply(&mut self, outcome: &PlayOutcome) -> PlayEvent {
        let offense = self.offense;
        match outcome.resolution {
            Resolution::Turnover { turnover } => {
                if turnover.is_giveaway() {
                    self.totals_mut(offense).turnovers += 1;
                }
                self.switch_possession(PossessionChange::Turnover);
                PlayEvent::Turnover(turnover)
            }
            Resolution::Punt { distance } => {
                let spot = punt_spot(self.ball_on, distance);
                self.switch_possession(PossessionChange::Turnover);
                self.ball_on = spot;
                PlayEvent::Punt
            }
            Resolution::FieldGoal { good: true, .. } => {
                self.add_points(offense, FIELD_GOAL_POINTS);
                self.switch_possession(PossessionChange::Kickoff);
                PlayEvent::FieldGoalGood
            }
            Resolution::FieldGoal { good: false, .. } => {
                self.switch_possession(PossessionChange::Turnover);
                PlayEvent::FieldGoalMissed
            }
            Resolution::Yardage => self.advance(outcome.yards),
        }
    }

    /// Move the ball `yards` and settle scoring, first downs and downs.
    pub fn advance(&mut self, yards: i32) -> PlayEvent {
        let offense = self.offense;
        self.totals_mut(offense).yards += yards;
        self.ball_on += yards;

        if self.ball_on >= 100 {
            self.add_points(offense, TOUCHDOWN_POINTS);
            self.switch_possession(PossessionChange::Kickoff);
            PlayEvent::Touchdown
        } else if self.ball_on <= 0 {
            self.add_points(offense.other(), SAFETY_POINTS);
            self.switch_possession(PossessionChange::Kickoff);
            PlayEvent::Safety
        } else if yards >= self.distance {
            self.down = 1;
            self.distance = 10;
            PlayEvent::FirstDown
        } else {
            self.down += 1;
            self.distance -= yards;
            if self.down > 4 {
                self.switch_possession(PossessionChange::Turnover);
                PlayEvent::TurnoverOnDowns
            } else {
                PlayEvent::Normal
            }
        }
    }

    /// Run `seconds` off the clock. Quarters 1–3 roll over to a fresh 15:00;
    /// expiry in the 4th ends regulation and leaves the clock where it fell.
    pub fn run_clock(&mut self, seconds: i32) -> ClockEvent {
        self.time_remaining -= seconds;
        if self.time_remaining > 0 {
            return ClockEvent::Running;
        }
        if self.quarter < 4 {
            let ended = self.quarter;
            self.quarter += 1;
            self.time_remaining = QUARTER_SECONDS;
            ClockEvent::QuarterEnded(ended)
        } else {
            ClockEvent::RegulationOver
        }
    }

    /// `mm:ss`, never negative.
    pub fn clock(&self) -> String {
        let t = self.time_remaining.max(0);
        format!("{:02}:{:02}", t / 60, t % 60)
    }

    /// `own N` in the offense's half, `opp N` past midfield.
    pub fn field_position(&self) -> String {
        if self.ball_on > 50 {
            format!("opp {}", 100 - self.ball_on)
        } else {
            format!("own {}", self.ball_on)
        }
    }
}

/// Spot for the receiving team after a punt of `distance` from `ball_on`.
/// A punt that reaches the goal line comes out to the 20.
pub fn punt_spot(ball_on: i32, distance: i32) -> i32 {
    let spot = 100 - (ball_on + distance);
    if spot <= 0 {
        PUNT_FALLBACK_SPOT
    } else {
        spot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::outcome::{Action, Turnover};
    use crate::sim::tactics::{DefensiveCall, OffensivePlay};

    fn outcome(resolution: Resolution, yards: i32) -> PlayOutcome {
        PlayOutcome {
            play: OffensivePlay::RunPower,
            call: DefensiveCall::Man1,
            action: Action::Rush,
            resolution,
            yards,
            seconds: 40,
            description: String::new(),
            stats: Vec::new(),
            participants: Vec::new(),
            touchdown_credits: Vec::new(),
        }
    }

    #[test]
    fn fresh_game_state() {
        let s = GameState::new();
        assert_eq!(s.quarter, 1);
        assert_eq!(s.time_remaining, 900);
        assert_eq!(s.down, 1);
        assert_eq!(s.distance, 10);
        assert_eq!(s.offense, Side::Away);
        assert_eq!(s.ball_on, 25);
    }

    #[test]
    fn short_gain_advances_the_down() {
        let mut s = GameState::new();
        assert_eq!(s.advance(3), PlayEvent::Normal);
        assert_eq!((s.down, s.distance, s.ball_on), (2, 7, 28));
    }

    #[test]
    fn loss_lengthens_distance() {
        let mut s = GameState::new();
        s.advance(-6);
        assert_eq!((s.down, s.distance), (2, 16));
    }

    #[test]
    fn reaching_the_line_is_a_first_down() {
        let mut s = GameState::new();
        s.down = 3;
        s.distance = 4;
        assert_eq!(s.advance(4), PlayEvent::FirstDown);
        assert_eq!((s.down, s.distance, s.ball_on), (1, 10, 29));
    }

    #[test]
    fn turnover_on_downs_mirrors_spot() {
        let mut s = GameState::new();
        s.down = 4;
        s.distance = 5;
        s.ball_on = 62;
        assert_eq!(s.advance(2), PlayEvent::TurnoverOnDowns);
        assert_eq!(s.offense, Side::Home);
        assert_eq!(s.ball_on, 100 - 64);
        assert_eq!((s.down, s.distance), (1, 10));
    }

    #[test]
    fn touchdown_scores_seven_and_kicks_off() {
        let mut s = GameState::new();
        s.ball_on = 95;
        assert_eq!(s.advance(5), PlayEvent::Touchdown);
        assert_eq!(s.score(Side::Away), 7);
        assert_eq!(s.offense, Side::Home);
        assert_eq!(s.ball_on, KICKOFF_SPOT);
    }

    #[test]
    fn overtime_touchdown_resets_to_opp_25() {
        let mut s = GameState::new();
        s.overtime_period = Some(1);
        s.ball_on = 90;
        s.advance(12);
        assert_eq!(s.ball_on, OVERTIME_SPOT);
    }

    #[test]
    fn safety_scores_two_for_defense() {
        let mut s = GameState::new();
        s.ball_on = 3;
        assert_eq!(s.advance(-4), PlayEvent::Safety);
        assert_eq!(s.score(Side::Home), 2);
        assert_eq!(s.score(Side::Away), 0);
        assert_eq!(s.offense, Side::Home);
        assert_eq!(s.ball_on, KICKOFF_SPOT);
    }

    #[test]
    fn punt_from_own_40_for_45_lands_at_15() {
        assert_eq!(punt_spot(40, 45), 15);
        let mut s = GameState::new();
        s.ball_on = 40;
        s.down = 4;
        let event = s.apply(&outcome(Resolution::Punt { distance: 45 }, 0));
        assert_eq!(event, PlayEvent::Punt);
        assert_eq!(s.offense, Side::Home);
        assert_eq!(s.ball_on, 15);
        assert_eq!((s.down, s.distance), (1, 10));
    }

    #[test]
    fn punt_into_end_zone_falls_back_to_20() {
        assert_eq!(punt_spot(70, 55), PUNT_FALLBACK_SPOT);
        assert_eq!(punt_spot(45, 55), PUNT_FALLBACK_SPOT);
        assert_eq!(punt_spot(44, 55), 1);
    }

    #[test]
    fn made_field_goal_scores_three() {
        let mut s = GameState::new();
        s.ball_on = 75;
        let event = s.apply(&outcome(Resolution::FieldGoal { distance: 42, good: true }, 0));
        assert_eq!(event, PlayEvent::FieldGoalGood);
        assert_eq!(s.score(Side::Away), 3);
        assert_eq!(s.offense, Side::Home);
        assert_eq!(s.ball_on, KICKOFF_SPOT);
    }

    #[test]
    fn missed_field_goal_turns_over_at_the_spot() {
        let mut s = GameState::new();
        s.ball_on = 70;
        let event = s.apply(&outcome(Resolution::FieldGoal { distance: 47, good: false }, 0));
        assert_eq!(event, PlayEvent::FieldGoalMissed);
        assert_eq!(s.offense, Side::Home);
        assert_eq!(s.ball_on, 30);
    }

    #[test]
    fn giveaway_is_charged_to_the_team_that_lost_it() {
        let mut s = GameState::new();
        s.ball_on = 55;
        let event = s.apply(&outcome(Resolution::Turnover { turnover: Turnover::Interception }, 0));
        assert_eq!(event, PlayEvent::Turnover(Turnover::Interception));
        assert_eq!(s.totals(Side::Away).turnovers, 1);
        assert_eq!(s.totals(Side::Home).turnovers, 0);
        assert_eq!(s.offense, Side::Home);
        assert_eq!(s.ball_on, 45);

        s.apply(&outcome(Resolution::Turnover { turnover: Turnover::BlockedPunt }, 0));
        assert_eq!(s.totals(Side::Home).turnovers, 0);
        assert_eq!(s.offense, Side::Away);
    }

    #[test]
    fn turnover_ignores_yards_on_the_record() {
        let mut s = GameState::new();
        s.apply(&outcome(Resolution::Turnover { turnover: Turnover::Fumble }, 0));
        assert_eq!(s.totals(Side::Away).yards, 0);
    }

    #[test]
    fn clock_rolls_quarters_then_stops_in_the_fourth() {
        let mut s = GameState::new();
        assert_eq!(s.run_clock(60), ClockEvent::Running);
        assert_eq!(s.clock(), "14:00");
        assert_eq!(s.run_clock(900), ClockEvent::QuarterEnded(1));
        assert_eq!((s.quarter, s.time_remaining), (2, 900));
        s.quarter = 4;
        s.time_remaining = 20;
        assert_eq!(s.run_clock(45), ClockEvent::RegulationOver);
        assert_eq!(s.quarter, 4);
        assert_eq!(s.clock(), "00:00");
    }

    #[test]
    fn field_position_labels() {
        let mut s = GameState::new();
        assert_eq!(s.field_position(), "own 25");
        s.ball_on = 50;
        assert_eq!(s.field_position(), "own 50");
        s.ball_on = 68;
        assert_eq!(s.field_position(), "opp 32");
    }
}
