//! Seeded generation of complete teams.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::warn;

use super::models::{Attribute, Coach, Player, Position};
use super::traits::{CoachTrait, PlayerTrait};
use super::{RosterError, Team};

const PLAYERS_PER_POSITION: usize = 5;

const SURNAMES: &[&str] = &[
    "Adams", "Baker", "Carter", "Dawson", "Ellis", "Foster", "Graves", "Hayes", "Irving", "Jensen",
    "Keller", "Lawson", "Mercer", "Nolan", "Owens", "Porter", "Quinn", "Reyes", "Sutton", "Tate",
    "Underwood", "Vance", "Walsh", "Young", "Zimmer", "Brooks", "Crane", "Drake", "Fields", "Hale",
];

const FIRST_NAMES: &[&str] = &[
    "Alex", "Ben", "Cody", "Dante", "Eli", "Jordan", "Kyle", "Marcus", "Nate", "Tyler", "Zach",
];

/// Deterministic generated teams.
///
/// Every attribute of an offensive player starts at the offense rating and
/// every defensive or special-teams attribute at the defense rating. A
/// non-zero jitter spreads individual ratings by up to ±jitter using a
/// generator seeded from `seed`, so the same builder always yields the same
/// roster.
#[derive(Debug, Clone)]
pub struct TeamBuilder {
    name: String,
    offense: u8,
    defense: u8,
    jitter: u8,
    seed: u64,
    depth: usize,
    coach: Coach,
    player_traits: Vec<(Position, PlayerTrait)>,
}

impl TeamBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        let mut coach = Coach::new("Head", "Coach");
        coach.fourth_down_agg = 5;
        Self {
            name: name.into(),
            offense: 75,
            defense: 75,
            jitter: 0,
            seed: 0,
            depth: PLAYERS_PER_POSITION,
            coach,
            player_traits: Vec::new(),
        }
    }

    /// Set both unit ratings at once.
    pub fn rating(self, rating: u8) -> Self {
        self.offense(rating).defense(rating)
    }

    pub fn offense(mut self, rating: u8) -> Self {
        self.offense = rating.min(99);
        self
    }

    pub fn defense(mut self, rating: u8) -> Self {
        self.defense = rating.min(99);
        self
    }

    pub fn jitter(mut self, jitter: u8) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = depth.max(1);
        self
    }

    pub fn run_pass_bias(mut self, bias: u8) -> Self {
        self.coach.run_pass_bias = bias.min(10);
        self
    }

    pub fn aggressiveness(mut self, aggressiveness: u8) -> Self {
        self.coach.aggressiveness = aggressiveness.min(10);
        self
    }

    pub fn fourth_down_agg(mut self, agg: u8) -> Self {
        self.coach.fourth_down_agg = agg;
        self
    }

    /// Add a coach trait, refusing one that conflicts with a held trait.
    pub fn coach_trait(mut self, t: CoachTrait) -> Result<Self, RosterError> {
        if let Some(existing) = self.coach.traits.iter().find(|e| e.conflicts_with(t)) {
            return Err(RosterError::TraitConflict {
                existing: existing.name(),
                rejected: t.name(),
            });
        }
        if !self.coach.has(t) {
            self.coach.traits.push(t);
        }
        Ok(self)
    }

    /// Give the depth-chart starter at `pos` a trait.
    pub fn starter_trait(mut self, pos: Position, t: PlayerTrait) -> Self {
        self.player_traits.push((pos, t));
        self
    }

    fn base_rating(&self, pos: Position) -> u8 {
        match pos {
            Position::Qb | Position::Rb | Position::Wr | Position::Te | Position::Ol => self.offense,
            _ => self.defense,
        }
    }

    /// Build the team. A starter trait that conflicts with one the starter
    /// already holds is skipped with a warning.
    pub fn build(self) -> Team {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut roster = Vec::with_capacity(Position::ALL.len() * self.depth);

        for pos in Position::ALL {
            let base = i32::from(self.base_rating(pos));
            for slot in 0..self.depth {
                let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Sam");
                let last = SURNAMES.choose(&mut rng).copied().unwrap_or("Smith");
                let mut player = Player::new(first, format!("{last}{}", slot + 1), pos);
                for attr in Attribute::ALL {
                    let spread = i32::from(self.jitter);
                    let offset = if spread > 0 { rng.gen_range(-spread..=spread) } else { 0 };
                    player.set_attr(attr, (base + offset).clamp(1, 99) as u8);
                }
                roster.push(player);
            }
        }

        let mut team = Team::new(self.name, self.coach, roster);
        for (pos, t) in self.player_traits {
            let idx = team.starter(pos);
            if let Err(e) = team.roster[idx].traits.insert(t) {
                warn!("{}: skipping {} trait for {}: {}", team.name, pos, team.roster[idx].last_name, e);
            }
        }
        team
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_every_position() {
        let team = TeamBuilder::new("Owls").build();
        for pos in Position::ALL {
            let count = team.roster.iter().filter(|p| p.position == pos).count();
            assert_eq!(count, PLAYERS_PER_POSITION, "{}", pos);
        }
        team.validate().unwrap();
    }

    #[test]
    fn unit_ratings_apply_to_the_right_side() {
        let team = TeamBuilder::new("Owls").offense(90).defense(50).build();
        let qb = &team.roster[team.starter(Position::Qb)];
        let lb = &team.roster[team.starter(Position::Lb)];
        assert_eq!(qb.attributes[&Attribute::Accuracy], 90);
        assert_eq!(lb.attributes[&Attribute::Tackling], 50);
    }

    #[test]
    fn same_seed_same_roster() {
        let a = TeamBuilder::new("Owls").jitter(8).seed(42).build();
        let b = TeamBuilder::new("Owls").jitter(8).seed(42).build();
        let c = TeamBuilder::new("Owls").jitter(8).seed(43).build();
        let attrs = |t: &Team| t.roster.iter().map(|p| p.attributes.clone()).collect::<Vec<_>>();
        assert_eq!(attrs(&a), attrs(&b));
        assert_ne!(attrs(&a), attrs(&c));
    }

    #[test]
    fn jitter_stays_in_bounds() {
        let team = TeamBuilder::new("Owls").rating(95).jitter(10).seed(5).build();
        for p in &team.roster {
            for &v in p.attributes.values() {
                assert!((85..=99).contains(&v), "rating {} out of range", v);
            }
        }
    }

    #[test]
    fn coach_trait_conflict_is_rejected() {
        let result = TeamBuilder::new("Owls")
            .coach_trait(CoachTrait::TheAnalyst)
            .and_then(|b| b.coach_trait(CoachTrait::GutFeeling));
        assert!(matches!(result, Err(RosterError::TraitConflict { .. })));
    }

    #[test]
    fn conflicting_starter_trait_is_skipped() {
        let team = TeamBuilder::new("Owls")
            .starter_trait(Position::Qb, PlayerTrait::Gunslinger)
            .starter_trait(Position::Qb, PlayerTrait::GameManager)
            .build();
        let qb = &team.roster[team.starter(Position::Qb)];
        assert!(qb.traits.has(PlayerTrait::Gunslinger));
        assert!(!qb.traits.has(PlayerTrait::GameManager));
    }

    #[test]
    fn starter_trait_lands_on_the_starter() {
        let team = TeamBuilder::new("Owls")
            .starter_trait(Position::K, PlayerTrait::IceVeins)
            .build();
        let k = team.starter(Position::K);
        assert!(team.roster[k].traits.has(PlayerTrait::IceVeins));
    }
}
