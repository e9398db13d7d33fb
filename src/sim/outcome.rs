//! Value types a resolved play hands back to the game state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::roster::Stat;

use super::fatigue::Exertion;
use super::tactics::{DefensiveCall, OffensivePlay};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::Home => 0,
            Side::Away => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Home => "home",
            Side::Away => "away",
        })
    }
}

/// A player addressed by team side and roster index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerRef {
    pub side: Side,
    pub index: usize,
}

impl PlayerRef {
    pub fn new(side: Side, index: usize) -> Self {
        Self { side, index }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Turnover {
    Fumble,
    Interception,
    StripSack,
    BlockedPunt,
    BlockedKick,
}

impl Turnover {
    /// Lost possession through a mistake with the ball, as opposed to a
    /// special-teams block.
    pub fn is_giveaway(self) -> bool {
        matches!(self, Turnover::Fumble | Turnover::Interception | Turnover::StripSack)
    }
}

/// What physically happened on the snap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Rush,
    Scramble,
    Sack,
    Incompletion,
    Drop,
    Completion,
    Interception,
    Fumble,
    StripSack,
    Punt,
    FieldGoal,
    Blocked,
}

/// How the game state should treat the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// Ordinary scrimmage result; yards go through down and distance.
    Yardage,
    Turnover { turnover: Turnover },
    Punt { distance: i32 },
    FieldGoal { distance: i32, good: bool },
}

/// Result of applying a play to the game state. Drive-ending detection
/// keys off this, never off the description text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayEvent {
    Normal,
    FirstDown,
    Touchdown,
    Safety,
    TurnoverOnDowns,
    Turnover(Turnover),
    FieldGoalGood,
    FieldGoalMissed,
    Punt,
}

impl PlayEvent {
    /// Whether the offense no longer has the ball after this play.
    pub fn ends_possession(self) -> bool {
        !matches!(self, PlayEvent::Normal | PlayEvent::FirstDown)
    }

    pub fn is_turnover(self) -> bool {
        matches!(
            self,
            PlayEvent::Turnover(_) | PlayEvent::TurnoverOnDowns | PlayEvent::FieldGoalMissed
        )
    }
}

/// One player's stamina and injury result for a play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participation {
    pub player: PlayerRef,
    pub exertion: Exertion,
}

/// Everything a single snap produced. The resolver builds this without
/// touching any team; the engine commits it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayOutcome {
    pub play: OffensivePlay,
    pub call: DefensiveCall,
    pub action: Action,
    pub resolution: Resolution,
    pub yards: i32,
    pub seconds: i32,
    pub description: String,
    pub stats: Vec<(PlayerRef, Stat, i32)>,
    pub participants: Vec<Participation>,
    /// Credits awarded only if the yardage reaches the end zone.
    pub touchdown_credits: Vec<(PlayerRef, Stat)>,
}

impl PlayOutcome {
    pub fn is_turnover(&self) -> bool {
        matches!(self.resolution, Resolution::Turnover { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn possession_ending_events() {
        assert!(!PlayEvent::Normal.ends_possession());
        assert!(!PlayEvent::FirstDown.ends_possession());
        for e in [
            PlayEvent::Touchdown,
            PlayEvent::Safety,
            PlayEvent::TurnoverOnDowns,
            PlayEvent::Turnover(Turnover::Fumble),
            PlayEvent::FieldGoalGood,
            PlayEvent::FieldGoalMissed,
            PlayEvent::Punt,
        ] {
            assert!(e.ends_possession(), "{:?}", e);
        }
    }

    #[test]
    fn blocks_are_not_giveaways() {
        assert!(Turnover::Interception.is_giveaway());
        assert!(!Turnover::BlockedPunt.is_giveaway());
        assert!(PlayEvent::Turnover(Turnover::BlockedKick).is_turnover());
        assert!(!PlayEvent::Punt.is_turnover());
    }

    #[test]
    fn sides_flip() {
        assert_eq!(Side::Home.other(), Side::Away);
        assert_eq!(Side::Away.other().other(), Side::Away);
    }
}
