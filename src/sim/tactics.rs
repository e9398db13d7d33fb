//! Offensive play and defensive call tables.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::roster::Position;

/// Bonus or penalty applied when a defensive call reads the offensive concept.
pub const COUNTER_SWING: i32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayCategory {
    Run,
    Pass,
    Punt,
    FieldGoal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OffensivePlay {
    RunPower,
    RunZone,
    RunDraw,
    PassQuick,
    PassScreen,
    PassStd,
    PassPa,
    PassDeep,
    Punt,
    FieldGoal,
}

/// One receiver assignment within a pass concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub position: Position,
    pub concept: &'static str,
    pub priority: i32,
}

impl Route {
    /// Blockers stay in and are never thrown to. A zero-priority fake still
    /// releases and can be targeted.
    pub fn is_block(&self) -> bool {
        self.concept == "Block"
    }
}

const fn route(position: Position, concept: &'static str, priority: i32) -> Route {
    Route {
        position,
        concept,
        priority,
    }
}

const QUICK_ROUTES: [Route; 3] = [
    route(Position::Wr, "Slant", 10),
    route(Position::Te, "Flat", 8),
    route(Position::Rb, "Checkdown", 7),
];
const SCREEN_ROUTES: [Route; 3] = [
    route(Position::Wr, "Screen", 10),
    route(Position::Rb, "Swing", 6),
    route(Position::Te, "Block", 0),
];
const STD_ROUTES: [Route; 3] = [
    route(Position::Wr, "Curl", 10),
    route(Position::Te, "Seam", 9),
    route(Position::Rb, "Block", 0),
];
const PA_ROUTES: [Route; 3] = [
    route(Position::Te, "Cross", 10),
    route(Position::Wr, "Post", 8),
    route(Position::Rb, "Fake", 0),
];
const DEEP_ROUTES: [Route; 3] = [
    route(Position::Wr, "Go", 10),
    route(Position::Te, "Go", 9),
    route(Position::Rb, "Block", 0),
];

impl OffensivePlay {
    pub const RUNS: [OffensivePlay; 3] = [
        OffensivePlay::RunPower,
        OffensivePlay::RunZone,
        OffensivePlay::RunDraw,
    ];

    pub const PASSES: [OffensivePlay; 5] = [
        OffensivePlay::PassQuick,
        OffensivePlay::PassScreen,
        OffensivePlay::PassStd,
        OffensivePlay::PassPa,
        OffensivePlay::PassDeep,
    ];

    pub fn category(self) -> PlayCategory {
        match self {
            OffensivePlay::RunPower | OffensivePlay::RunZone | OffensivePlay::RunDraw => {
                PlayCategory::Run
            }
            OffensivePlay::Punt => PlayCategory::Punt,
            OffensivePlay::FieldGoal => PlayCategory::FieldGoal,
            _ => PlayCategory::Pass,
        }
    }

    /// Seconds the snap itself takes before any post-play runoff.
    pub fn base_time(self) -> i32 {
        match self {
            OffensivePlay::RunDraw | OffensivePlay::PassPa => 55,
            OffensivePlay::PassQuick | OffensivePlay::PassScreen => 45,
            OffensivePlay::Punt => 15,
            OffensivePlay::FieldGoal => 5,
            _ => 50,
        }
    }

    /// Route assignments; empty for runs and kicks.
    pub fn routes(self) -> &'static [Route] {
        match self {
            OffensivePlay::PassQuick => &QUICK_ROUTES,
            OffensivePlay::PassScreen => &SCREEN_ROUTES,
            OffensivePlay::PassStd => &STD_ROUTES,
            OffensivePlay::PassPa => &PA_ROUTES,
            OffensivePlay::PassDeep => &DEEP_ROUTES,
            _ => &[],
        }
    }

    pub fn route_for(self, position: Position) -> Option<Route> {
        self.routes().iter().copied().find(|r| r.position == position)
    }

    /// Air yards on a completion before yards after catch.
    pub fn air_yards(self) -> i32 {
        match self {
            OffensivePlay::PassDeep => 20,
            OffensivePlay::PassStd => 10,
            _ => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OffensivePlay::RunPower => "RUN_POWER",
            OffensivePlay::RunZone => "RUN_ZONE",
            OffensivePlay::RunDraw => "RUN_DRAW",
            OffensivePlay::PassQuick => "PASS_QUICK",
            OffensivePlay::PassScreen => "PASS_SCREEN",
            OffensivePlay::PassStd => "PASS_STD",
            OffensivePlay::PassPa => "PASS_PA",
            OffensivePlay::PassDeep => "PASS_DEEP",
            OffensivePlay::Punt => "PUNT",
            OffensivePlay::FieldGoal => "FIELD_GOAL",
        }
    }
}

impl fmt::Display for OffensivePlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefensiveCall {
    Cover2,
    Cover3,
    Man1,
    BlitzZone,
    BlitzHeavy,
    GoalLine,
    /// Special-teams rush against a field goal.
    Block,
    /// Special-teams return unit against a punt.
    Return,
}

impl DefensiveCall {
    pub const PASS_LOOKS: [DefensiveCall; 4] = [
        DefensiveCall::Cover2,
        DefensiveCall::Cover3,
        DefensiveCall::BlitzZone,
        DefensiveCall::Man1,
    ];

    pub const RUN_LOOKS: [DefensiveCall; 4] = [
        DefensiveCall::BlitzHeavy,
        DefensiveCall::Man1,
        DefensiveCall::BlitzZone,
        DefensiveCall::GoalLine,
    ];

    pub const SCRIMMAGE: [DefensiveCall; 6] = [
        DefensiveCall::Cover2,
        DefensiveCall::Cover3,
        DefensiveCall::Man1,
        DefensiveCall::BlitzZone,
        DefensiveCall::BlitzHeavy,
        DefensiveCall::GoalLine,
    ];

    /// Zone looks flatten defender skill toward a fixed baseline.
    pub fn is_zone(self) -> bool {
        matches!(
            self,
            DefensiveCall::Cover2 | DefensiveCall::Cover3 | DefensiveCall::BlitzZone
        )
    }

    /// Concepts this call is built to stop.
    pub fn counters(self) -> &'static [OffensivePlay] {
        use OffensivePlay::*;
        match self {
            DefensiveCall::Cover2 => &[PassQuick, PassStd],
            DefensiveCall::Cover3 => &[PassDeep, PassPa],
            DefensiveCall::Man1 => &[PassScreen, RunZone],
            DefensiveCall::BlitzZone => &[PassStd, RunDraw],
            DefensiveCall::BlitzHeavy => &[RunZone, RunPower],
            DefensiveCall::GoalLine => &[RunPower, RunZone],
            DefensiveCall::Block | DefensiveCall::Return => &[],
        }
    }

    /// Concepts this call is exposed to.
    pub fn weak_against(self) -> &'static [OffensivePlay] {
        use OffensivePlay::*;
        match self {
            DefensiveCall::Cover2 => &[RunPower, PassDeep],
            DefensiveCall::Cover3 => &[PassQuick, PassScreen],
            DefensiveCall::Man1 => &[RunDraw, PassQuick],
            DefensiveCall::BlitzZone => &[PassQuick, RunPower],
            DefensiveCall::BlitzHeavy => &[PassScreen, PassPa],
            DefensiveCall::GoalLine => &[PassPa, PassQuick],
            DefensiveCall::Block | DefensiveCall::Return => &[],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DefensiveCall::Cover2 => "COVER_2",
            DefensiveCall::Cover3 => "COVER_3",
            DefensiveCall::Man1 => "MAN_1",
            DefensiveCall::BlitzZone => "BLITZ_ZONE",
            DefensiveCall::BlitzHeavy => "BLITZ_HEAVY",
            DefensiveCall::GoalLine => "GOAL_LINE",
            DefensiveCall::Block => "BLOCK",
            DefensiveCall::Return => "RETURN",
        }
    }
}

impl fmt::Display for DefensiveCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Flat strategy swing from the counter table: negative when the defense
/// guessed right, positive when the offense caught it out of position.
pub fn counter_modifier(play: OffensivePlay, call: DefensiveCall) -> i32 {
    if call.counters().contains(&play) {
        -COUNTER_SWING
    } else if call.weak_against().contains(&play) {
        COUNTER_SWING
    } else {
        0
    }
}
