//! Teams, players, coaches and the trait vocabulary the engine reads.
//!
//! The roster layer owns persistent player state (stamina, injuries, season
//! stats). The simulation borrows teams mutably for the length of a game and
//! writes the results of each play back through this module.

pub mod builder;
pub mod models;
pub mod traits;

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use builder::TeamBuilder;
pub use models::{Attribute, BonusContext, Coach, Player, PlayerStats, Position, Scheme, Stat};
pub use traits::{CoachTrait, PlayerTrait, TraitHook, TraitSet};

/// Minimum stamina for a player to count as fresh.
pub const FRESH_STAMINA: f64 = 25.0;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("{team} has no {position} on the roster")]
    MissingPosition { team: String, position: Position },

    #[error("{team} depth chart lists roster index {index} at {position}")]
    BadDepthChart {
        team: String,
        position: Position,
        index: usize,
    },

    #[error("unknown trait: {0}")]
    UnknownTrait(String),

    #[error("trait {rejected} conflicts with {existing}")]
    TraitConflict {
        existing: &'static str,
        rejected: &'static str,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub coach: Coach,
    pub roster: Vec<Player>,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    /// Ordered roster indices per position, best first.
    #[serde(default)]
    pub depth_chart: BTreeMap<Position, Vec<usize>>,
}

impl Team {
    /// Build a team and derive its depth chart from overall ratings.
    pub fn new(name: impl Into<String>, coach: Coach, roster: Vec<Player>) -> Self {
        let mut team = Self {
            name: name.into(),
            coach,
            roster,
            wins: 0,
            losses: 0,
            depth_chart: BTreeMap::new(),
        };
        team.set_depth_chart();
        team
    }

    /// Re-sort every position group by overall rating, best first.
    pub fn set_depth_chart(&mut self) {
        self.depth_chart.clear();
        for pos in Position::ALL {
            let mut group: Vec<usize> = self
                .roster
                .iter()
                .enumerate()
                .filter(|(_, p)| p.position == pos)
                .map(|(i, _)| i)
                .collect();
            group.sort_by_key(|&i| std::cmp::Reverse(self.roster[i].overall()));
            self.depth_chart.insert(pos, group);
        }
    }

    /// Fail fast when any position the engine draws from is empty, or when
    /// the depth chart points outside the roster or at the wrong position.
    pub fn validate(&self) -> Result<(), RosterError> {
        for pos in Position::ALL {
            if !self.roster.iter().any(|p| p.position == pos) {
                return Err(RosterError::MissingPosition {
                    team: self.name.clone(),
                    position: pos,
                });
            }
        }
        for (&position, order) in &self.depth_chart {
            let stale = order
                .iter()
                .find(|&&i| self.roster.get(i).map_or(true, |p| p.position != position));
            if let Some(&index) = stale {
                return Err(RosterError::BadDepthChart {
                    team: self.name.clone(),
                    position,
                    index,
                });
            }
        }
        Ok(())
    }

    fn candidates(&self, pos: Position) -> Vec<usize> {
        match self.depth_chart.get(&pos) {
            Some(order) if !order.is_empty() => order.clone(),
            _ => self
                .roster
                .iter()
                .enumerate()
                .filter(|(_, p)| p.position == pos)
                .map(|(i, _)| i)
                .collect(),
        }
    }

    /// Up to `count` roster indices for `pos`, in depth-chart order.
    ///
    /// Healthy players above their stamina floor come first. If that leaves
    /// the group short, healthy but tired players fill in. As a last resort
    /// the top of the depth chart plays regardless of health, so the result
    /// is never empty while the position has anyone listed.
    pub fn active(&self, pos: Position, count: usize) -> Vec<usize> {
        let candidates = self.candidates(pos);
        let mut picked = Vec::with_capacity(count);

        for &idx in &candidates {
            if picked.len() == count {
                break;
            }
            let p = &self.roster[idx];
            if p.traits.has(PlayerTrait::Soft) && p.is_injured() {
                continue;
            }
            let floor = p.traits.modify(TraitHook::StaminaFloor, FRESH_STAMINA);
            if !p.is_injured() && f64::from(p.stamina) > floor {
                picked.push(idx);
            }
        }

        if picked.len() < count {
            for &idx in &candidates {
                if picked.len() == count {
                    break;
                }
                if !picked.contains(&idx) && !self.roster[idx].is_injured() {
                    picked.push(idx);
                }
            }
        }

        if picked.is_empty() {
            if let Some(&first) = candidates.first() {
                picked.push(first);
            }
        }
        picked
    }

    /// The first active player at `pos`.
    ///
    /// Panics if the roster has nobody at `pos`; [`Team::validate`] rules
    /// that out for every team the engine accepts.
    pub fn starter(&self, pos: Position) -> usize {
        self.active(pos, 1)[0]
    }

    pub fn player(&self, idx: usize) -> &Player {
        &self.roster[idx]
    }

    /// Advance every player one week toward recovery.
    pub fn recover_weekly<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for p in &mut self.roster {
            let was = p.injury_type.clone();
            p.recover_weekly(rng);
            if let (Some(name), None) = (was, &p.injury_type) {
                debug!("{} ({}) cleared from {}", p.full_name(), self.name, name);
            }
        }
    }

    pub fn record_string(&self) -> String {
        format!("{}-{}", self.wins, self.losses)
    }

    /// Record the result of a finished game.
    pub fn record_result(&mut self, won: bool) {
        if won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
    }
}
