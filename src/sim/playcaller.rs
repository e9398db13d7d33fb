//! Offensive and defensive play selection.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::roster::{Coach, CoachTrait, Player, PlayerTrait};

use super::tactics::{DefensiveCall, OffensivePlay};

/// Ball spot from which a 4th down becomes a field goal try.
pub const FIELD_GOAL_RANGE: i32 = 65;

/// Ball spot at which the offense is goal-to-go.
pub const GOAL_TO_GO: i32 = 97;

/// First overtime period played as a conversion shootout.
pub const SHOOTOUT_PERIOD: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClockMode {
    Normal,
    Hurry,
    Chew,
}

impl ClockMode {
    /// Fixed clock cost that replaces a scrimmage play's own timing.
    pub fn runoff(self, coach: &Coach) -> Option<i32> {
        let managed = coach.has(CoachTrait::ClockManager);
        match self {
            ClockMode::Normal => None,
            ClockMode::Hurry => Some(if managed { 18 } else { 25 }),
            ClockMode::Chew => Some(if managed { 60 } else { 55 }),
        }
    }
}

impl fmt::Display for ClockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClockMode::Normal => "NORMAL",
            ClockMode::Hurry => "HURRY",
            ClockMode::Chew => "CHEW",
        })
    }
}

/// Everything the playcaller looks at, from the offense's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Situation {
    pub down: u8,
    pub distance: i32,
    pub ball_on: i32,
    pub quarter: u8,
    pub time_remaining: i32,
    /// Offense score minus defense score.
    pub score_diff: i32,
    /// `Some(period)` once the game is in overtime.
    pub overtime: Option<u32>,
}

impl Situation {
    pub fn is_shootout(&self) -> bool {
        matches!(self.overtime, Some(p) if p >= SHOOTOUT_PERIOD)
    }
}

/// Late-game clock strategy for the offense.
pub fn clock_mode(sit: &Situation, coach: &Coach) -> ClockMode {
    if sit.quarter != 4 || sit.overtime.is_some() {
        return ClockMode::Normal;
    }
    let (hurry_at, chew_at) = if coach.has(CoachTrait::ClockManager) {
        (420, 360)
    } else {
        (300, 240)
    };
    if sit.score_diff < 0 && sit.time_remaining < hurry_at {
        ClockMode::Hurry
    } else if sit.score_diff > 0 && sit.time_remaining < chew_at {
        ClockMode::Chew
    } else {
        ClockMode::Normal
    }
}

/// Probability of a pass on a non-4th-down snap.
pub fn pass_probability(sit: &Situation, mode: ClockMode, coach: &Coach, qb: &Player) -> f64 {
    let mut p = f64::from(coach.run_pass_bias) * 0.08;
    if sit.distance > 8 {
        p += 0.25;
    }
    if sit.distance < 4 {
        p -= 0.15;
    }
    match mode {
        ClockMode::Hurry => p += 0.35,
        ClockMode::Chew => p -= 0.40,
        ClockMode::Normal => {}
    }
    if qb.traits.has(PlayerTrait::Gunslinger) {
        p += 0.15;
    }
    if qb.traits.has(PlayerTrait::GameManager) {
        p -= 0.10;
    }
    p.clamp(0.10, 0.90)
}

fn fourth_down_call<R: Rng + ?Sized>(sit: &Situation, coach: &Coach, rng: &mut R) -> (OffensivePlay, DefensiveCall) {
    let mut aggression = i32::from(coach.fourth_down_agg);
    if sit.quarter == 4 && sit.score_diff < 0 && sit.time_remaining < 180 {
        aggression += 50;
    }
    if coach.has(CoachTrait::GutFeeling) && rng.gen::<f64>() < 0.2 {
        aggression += rng.gen_range(-20..=40);
    }
    if coach.has(CoachTrait::FourthDownFire) {
        aggression += 15;
    }

    if sit.ball_on >= FIELD_GOAL_RANGE {
        if aggression > 15 {
            if sit.distance <= 2 {
                (OffensivePlay::RunPower, DefensiveCall::GoalLine)
            } else {
                (OffensivePlay::PassQuick, DefensiveCall::Man1)
            }
        } else {
            (OffensivePlay::FieldGoal, DefensiveCall::Block)
        }
    } else if aggression > 25 {
        (OffensivePlay::PassDeep, DefensiveCall::BlitzHeavy)
    } else {
        (OffensivePlay::Punt, DefensiveCall::Return)
    }
}

/// Choose the offensive play and the defensive call for the next snap.
pub fn call_plays<R: Rng + ?Sized>(
    sit: &Situation,
    mode: ClockMode,
    coach: &Coach,
    qb: &Player,
    rng: &mut R,
) -> (OffensivePlay, DefensiveCall) {
    if sit.is_shootout() {
        return if rng.gen::<f64>() < 0.5 {
            (OffensivePlay::RunPower, DefensiveCall::GoalLine)
        } else {
            (OffensivePlay::PassQuick, DefensiveCall::Man1)
        };
    }

    if sit.down == 4 {
        return fourth_down_call(sit, coach, rng);
    }

    if sit.ball_on >= GOAL_TO_GO {
        return (OffensivePlay::RunPower, DefensiveCall::GoalLine);
    }

    let mut is_pass = rng.gen::<f64>() < pass_probability(sit, mode, coach, qb);
    if qb.traits.has(PlayerTrait::HeroBall) && sit.score_diff < -3 && sit.quarter == 4 {
        is_pass = true;
    }

    let shot_call = rng.gen_range(0..=10) < i32::from(coach.aggressiveness);
    if is_pass {
        let menu = if shot_call {
            [OffensivePlay::PassDeep, OffensivePlay::PassPa, OffensivePlay::PassStd]
        } else {
            [OffensivePlay::PassQuick, OffensivePlay::PassScreen, OffensivePlay::PassStd]
        };
        let play = if qb.traits.has(PlayerTrait::Gunslinger) && rng.gen::<f64>() < 0.4 {
            OffensivePlay::PassDeep
        } else if qb.traits.has(PlayerTrait::GameManager) && rng.gen::<f64>() < 0.4 {
            OffensivePlay::PassQuick
        } else {
            *menu.choose(rng).unwrap_or(&OffensivePlay::PassStd)
        };
        let call = *DefensiveCall::PASS_LOOKS.choose(rng).unwrap_or(&DefensiveCall::Cover2);
        (play, call)
    } else {
        let menu = if shot_call {
            [OffensivePlay::RunDraw, OffensivePlay::RunZone, OffensivePlay::RunPower]
        } else {
            [OffensivePlay::RunPower, OffensivePlay::RunZone, OffensivePlay::RunPower]
        };
        let play = *menu.choose(rng).unwrap_or(&OffensivePlay::RunPower);
        let call = *DefensiveCall::RUN_LOOKS.choose(rng).unwrap_or(&DefensiveCall::BlitzHeavy);
        (play, call)
    }
}
