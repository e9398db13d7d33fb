//! Player and coach trait tags plus the data tables that give them meaning.
//!
//! Traits never appear as ad-hoc string comparisons in the engine. Each trait
//! is an enumerated tag, and its game effect is a row in [`PLAYER_EFFECTS`]
//! keyed by the hook at which the engine consults it. Adding a trait means
//! adding a variant and a table row; the resolver does not change.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::RosterError;

// ── Player traits ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlayerTrait {
    #[serde(rename = "Field General")]
    FieldGeneral,
    #[serde(rename = "Iron Man")]
    IronMan,
    #[serde(rename = "Route Technician")]
    RouteTechnician,
    #[serde(rename = "Ball Hawk")]
    BallHawk,
    #[serde(rename = "Trench Dog")]
    TrenchDog,
    #[serde(rename = "Ice Veins")]
    IceVeins,
    #[serde(rename = "Human Joystick")]
    HumanJoystick,
    #[serde(rename = "Brick Wall")]
    BrickWall,
    #[serde(rename = "Safety Valve")]
    SafetyValve,
    #[serde(rename = "First Step")]
    FirstStep,
    #[serde(rename = "Satellite")]
    Satellite,
    #[serde(rename = "Escapist")]
    Escapist,
    #[serde(rename = "Bruiser")]
    Bruiser,
    #[serde(rename = "Big Leg")]
    BigLeg,
    #[serde(rename = "Wolverine Blood")]
    WolverineBlood,
    #[serde(rename = "Gunslinger")]
    Gunslinger,
    #[serde(rename = "Game Manager")]
    GameManager,
    #[serde(rename = "Hero Ball")]
    HeroBall,
    #[serde(rename = "Glass Cannon")]
    GlassCannon,
    #[serde(rename = "Stone Hands")]
    StoneHands,
    #[serde(rename = "Butterfingers")]
    Butterfingers,
    #[serde(rename = "Choker")]
    Choker,
    #[serde(rename = "Injury Prone")]
    InjuryProne,
    #[serde(rename = "Statue")]
    Statue,
    #[serde(rename = "Turnstile")]
    Turnstile,
    #[serde(rename = "Soft")]
    Soft,
    #[serde(rename = "Ankle Biter")]
    AnkleBiter,
}

impl PlayerTrait {
    pub const ALL: [PlayerTrait; 27] = [
        PlayerTrait::FieldGeneral,
        PlayerTrait::IronMan,
        PlayerTrait::RouteTechnician,
        PlayerTrait::BallHawk,
        PlayerTrait::TrenchDog,
        PlayerTrait::IceVeins,
        PlayerTrait::HumanJoystick,
        PlayerTrait::BrickWall,
        PlayerTrait::SafetyValve,
        PlayerTrait::FirstStep,
        PlayerTrait::Satellite,
        PlayerTrait::Escapist,
        PlayerTrait::Bruiser,
        PlayerTrait::BigLeg,
        PlayerTrait::WolverineBlood,
        PlayerTrait::Gunslinger,
        PlayerTrait::GameManager,
        PlayerTrait::HeroBall,
        PlayerTrait::GlassCannon,
        PlayerTrait::StoneHands,
        PlayerTrait::Butterfingers,
        PlayerTrait::Choker,
        PlayerTrait::InjuryProne,
        PlayerTrait::Statue,
        PlayerTrait::Turnstile,
        PlayerTrait::Soft,
        PlayerTrait::AnkleBiter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PlayerTrait::FieldGeneral => "Field General",
            PlayerTrait::IronMan => "Iron Man",
            PlayerTrait::RouteTechnician => "Route Technician",
            PlayerTrait::BallHawk => "Ball Hawk",
            PlayerTrait::TrenchDog => "Trench Dog",
            PlayerTrait::IceVeins => "Ice Veins",
            PlayerTrait::HumanJoystick => "Human Joystick",
            PlayerTrait::BrickWall => "Brick Wall",
            PlayerTrait::SafetyValve => "Safety Valve",
            PlayerTrait::FirstStep => "First Step",
            PlayerTrait::Satellite => "Satellite",
            PlayerTrait::Escapist => "Escapist",
            PlayerTrait::Bruiser => "Bruiser",
            PlayerTrait::BigLeg => "Big Leg",
            PlayerTrait::WolverineBlood => "Wolverine Blood",
            PlayerTrait::Gunslinger => "Gunslinger",
            PlayerTrait::GameManager => "Game Manager",
            PlayerTrait::HeroBall => "Hero Ball",
            PlayerTrait::GlassCannon => "Glass Cannon",
            PlayerTrait::StoneHands => "Stone Hands",
            PlayerTrait::Butterfingers => "Butterfingers",
            PlayerTrait::Choker => "Choker",
            PlayerTrait::InjuryProne => "Injury Prone",
            PlayerTrait::Statue => "Statue",
            PlayerTrait::Turnstile => "Turnstile",
            PlayerTrait::Soft => "Soft",
            PlayerTrait::AnkleBiter => "Ankle Biter",
        }
    }

    /// Whether `self` and `other` may not be held by the same player.
    pub fn conflicts_with(self, other: PlayerTrait) -> bool {
        PLAYER_CONFLICTS
            .iter()
            .any(|&(a, b)| (a == self && b == other) || (a == other && b == self))
    }
}

impl fmt::Display for PlayerTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlayerTrait {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PlayerTrait::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| RosterError::UnknownTrait(wanted.to_string()))
    }
}

/// Mutually exclusive player traits (symmetric).
const PLAYER_CONFLICTS: &[(PlayerTrait, PlayerTrait)] = &[
    (PlayerTrait::FieldGeneral, PlayerTrait::Statue),
    (PlayerTrait::IronMan, PlayerTrait::GlassCannon),
    (PlayerTrait::IronMan, PlayerTrait::Soft),
    (PlayerTrait::IronMan, PlayerTrait::InjuryProne),
    (PlayerTrait::BallHawk, PlayerTrait::StoneHands),
    (PlayerTrait::IceVeins, PlayerTrait::Choker),
    (PlayerTrait::BrickWall, PlayerTrait::Turnstile),
    (PlayerTrait::SafetyValve, PlayerTrait::StoneHands),
    (PlayerTrait::Satellite, PlayerTrait::StoneHands),
    (PlayerTrait::Gunslinger, PlayerTrait::GameManager),
    (PlayerTrait::GameManager, PlayerTrait::HeroBall),
    (PlayerTrait::Statue, PlayerTrait::Escapist),
    (PlayerTrait::Soft, PlayerTrait::TrenchDog),
    (PlayerTrait::InjuryProne, PlayerTrait::WolverineBlood),
];

// ── Effect table ─────────────────────────────────────────────────────────────

/// Points in the engine where player traits are consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraitHook {
    /// Receiver skill when computing route separation.
    RouteSeparation,
    /// Extra receiver skill for a running back running a route.
    BackfieldRoute,
    /// Offensive-line run blocking, read from the quarterback.
    RunBlockLeadership,
    /// Run trench win, read from any defensive lineman.
    RunPenetration,
    /// Offensive-line pass blocking, read from any offensive lineman.
    PassBlock,
    /// Quarterback escape ability under pressure.
    Escape,
    /// Receiver catching contribution.
    Catching,
    /// Catch chance on 3rd and short.
    ShortThirdDownCatch,
    /// Percent chance to drop a catchable ball.
    DropChance,
    /// Percent chance to fumble on a run.
    FumbleChance,
    /// Awareness threshold the passer must clear to avoid a bad read.
    ReadThreshold,
    /// Defender interception chance.
    InterceptChance,
    /// Extra yards after the catch (rolled range).
    YardsAfterCatch,
    /// Stamina lost per exertion.
    Fatigue,
    /// Injury risk multiplier.
    InjuryRisk,
    /// Stamina a player needs to be picked as a fresh starter.
    StaminaFloor,
    /// Kick accuracy in clutch situations.
    ClutchKick,
    /// Punt distance.
    PuntDistance,
    /// Separation margin a passer needs to come off a covered primary read.
    VisionThreshold,
    /// Highest injury severity rank that is shaken off (-1: none).
    InjuryShrug,
    /// Extra weeks recovered per week.
    RecoveryRate,
    /// Probability of a week with no recovery.
    RecoveryStall,
}

/// How a table row changes the value at its hook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    Add(f64),
    Scale(f64),
    Set(f64),
    /// Uniform integer bonus in an inclusive range, rolled by the caller.
    Roll(i32, i32),
}

pub const PLAYER_EFFECTS: &[(PlayerTrait, TraitHook, Effect)] = &[
    (PlayerTrait::RouteTechnician, TraitHook::RouteSeparation, Effect::Add(10.0)),
    (PlayerTrait::Satellite, TraitHook::BackfieldRoute, Effect::Add(15.0)),
    (PlayerTrait::FieldGeneral, TraitHook::RunBlockLeadership, Effect::Add(5.0)),
    (PlayerTrait::FirstStep, TraitHook::RunPenetration, Effect::Add(-5.0)),
    (PlayerTrait::BrickWall, TraitHook::PassBlock, Effect::Add(8.0)),
    (PlayerTrait::Turnstile, TraitHook::PassBlock, Effect::Add(-8.0)),
    (PlayerTrait::Statue, TraitHook::Escape, Effect::Add(-20.0)),
    (PlayerTrait::Escapist, TraitHook::Escape, Effect::Add(15.0)),
    (PlayerTrait::StoneHands, TraitHook::Catching, Effect::Add(-15.0)),
    (PlayerTrait::SafetyValve, TraitHook::ShortThirdDownCatch, Effect::Add(15.0)),
    (PlayerTrait::StoneHands, TraitHook::DropChance, Effect::Set(10.0)),
    (PlayerTrait::Butterfingers, TraitHook::FumbleChance, Effect::Add(5.0)),
    (PlayerTrait::Gunslinger, TraitHook::ReadThreshold, Effect::Add(-10.0)),
    (PlayerTrait::BallHawk, TraitHook::InterceptChance, Effect::Scale(1.25)),
    (PlayerTrait::HumanJoystick, TraitHook::YardsAfterCatch, Effect::Roll(2, 10)),
    (PlayerTrait::TrenchDog, TraitHook::Fatigue, Effect::Scale(0.5)),
    (PlayerTrait::GlassCannon, TraitHook::InjuryRisk, Effect::Scale(3.0)),
    (PlayerTrait::IronMan, TraitHook::StaminaFloor, Effect::Set(15.0)),
    (PlayerTrait::IceVeins, TraitHook::ClutchKick, Effect::Add(10.0)),
    (PlayerTrait::Choker, TraitHook::ClutchKick, Effect::Add(-20.0)),
    (PlayerTrait::BigLeg, TraitHook::PuntDistance, Effect::Add(5.0)),
    (PlayerTrait::GameManager, TraitHook::VisionThreshold, Effect::Set(1.0)),
    (PlayerTrait::IronMan, TraitHook::InjuryShrug, Effect::Set(1.0)),
    (PlayerTrait::WolverineBlood, TraitHook::RecoveryRate, Effect::Add(1.0)),
    (PlayerTrait::InjuryProne, TraitHook::RecoveryStall, Effect::Set(0.5)),
];

/// Who has to carry a trait for a contact effect to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactRole {
    Tackler,
    BallCarrier,
}

/// Random post-tackle yardage effects, rolled in table order.
#[derive(Debug, Clone, Copy)]
pub struct ContactEffect {
    pub holder: PlayerTrait,
    pub role: ContactRole,
    pub chance: f64,
    pub yards: i32,
}

pub const CONTACT_EFFECTS: &[ContactEffect] = &[
    ContactEffect {
        holder: PlayerTrait::AnkleBiter,
        role: ContactRole::Tackler,
        chance: 0.3,
        yards: 4,
    },
    ContactEffect {
        holder: PlayerTrait::Bruiser,
        role: ContactRole::BallCarrier,
        chance: 0.3,
        yards: 3,
    },
];

// ── Trait set ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitSet(BTreeSet<PlayerTrait>);

impl TraitSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, t: PlayerTrait) -> bool {
        self.0.contains(&t)
    }

    pub fn iter(&self) -> impl Iterator<Item = PlayerTrait> + '_ {
        self.0.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add a trait, refusing one that conflicts with a trait already held.
    pub fn insert(&mut self, t: PlayerTrait) -> Result<(), RosterError> {
        if let Some(existing) = self.iter().find(|e| e.conflicts_with(t)) {
            return Err(RosterError::TraitConflict {
                existing: existing.name(),
                rejected: t.name(),
            });
        }
        self.0.insert(t);
        Ok(())
    }

    /// Run `value` through every table row this set matches at `hook`.
    pub fn modify(&self, hook: TraitHook, value: f64) -> f64 {
        apply_effects(self.0.iter().copied(), hook, value)
    }

    /// Sum of the rolled bonuses this set carries at `hook`.
    pub fn roll_bonus<R: rand::Rng + ?Sized>(&self, hook: TraitHook, rng: &mut R) -> i32 {
        let mut bonus = 0;
        for &(t, h, effect) in PLAYER_EFFECTS {
            if h != hook || !self.has(t) {
                continue;
            }
            if let Effect::Roll(lo, hi) = effect {
                bonus += rng.gen_range(lo..=hi);
            }
        }
        bonus
    }
}

impl FromIterator<PlayerTrait> for TraitSet {
    fn from_iter<I: IntoIterator<Item = PlayerTrait>>(iter: I) -> Self {
        TraitSet(iter.into_iter().collect())
    }
}

/// Apply a unit-wide hook: each distinct trait held by anyone in the unit
/// counts once, no matter how many players carry it.
pub fn unit_modify<'a, I>(sets: I, hook: TraitHook, value: f64) -> f64
where
    I: IntoIterator<Item = &'a TraitSet>,
{
    let union: BTreeSet<PlayerTrait> = sets.into_iter().flat_map(|s| s.iter()).collect();
    apply_effects(union.into_iter(), hook, value)
}

fn apply_effects<I: Iterator<Item = PlayerTrait>>(traits: I, hook: TraitHook, value: f64) -> f64 {
    let held: BTreeSet<PlayerTrait> = traits.collect();
    PLAYER_EFFECTS
        .iter()
        .filter(|(t, h, _)| *h == hook && held.contains(t))
        .fold(value, |acc, &(_, _, effect)| match effect {
            Effect::Add(x) => acc + x,
            Effect::Scale(x) => acc * x,
            Effect::Set(x) => x,
            Effect::Roll(..) => acc,
        })
}

// ── Coach traits ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CoachTrait {
    #[serde(rename = "The Analyst")]
    TheAnalyst,
    #[serde(rename = "Gut Feeling")]
    GutFeeling,
    #[serde(rename = "Halftime Adjuster")]
    HalftimeAdjuster,
    #[serde(rename = "Clock Manager")]
    ClockManager,
    #[serde(rename = "Fourth Down Fire")]
    FourthDownFire,
    #[serde(rename = "Defensive Mastermind")]
    DefensiveMastermind,
    #[serde(rename = "Quarterback Whisperer")]
    QuarterbackWhisperer,
}

impl CoachTrait {
    pub const ALL: [CoachTrait; 7] = [
        CoachTrait::TheAnalyst,
        CoachTrait::GutFeeling,
        CoachTrait::HalftimeAdjuster,
        CoachTrait::ClockManager,
        CoachTrait::FourthDownFire,
        CoachTrait::DefensiveMastermind,
        CoachTrait::QuarterbackWhisperer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CoachTrait::TheAnalyst => "The Analyst",
            CoachTrait::GutFeeling => "Gut Feeling",
            CoachTrait::HalftimeAdjuster => "Halftime Adjuster",
            CoachTrait::ClockManager => "Clock Manager",
            CoachTrait::FourthDownFire => "Fourth Down Fire",
            CoachTrait::DefensiveMastermind => "Defensive Mastermind",
            CoachTrait::QuarterbackWhisperer => "Quarterback Whisperer",
        }
    }

    pub fn conflicts_with(self, other: CoachTrait) -> bool {
        matches!(
            (self, other),
            (CoachTrait::TheAnalyst, CoachTrait::GutFeeling)
                | (CoachTrait::GutFeeling, CoachTrait::TheAnalyst)
        )
    }
}

impl fmt::Display for CoachTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CoachTrait {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CoachTrait::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| RosterError::UnknownTrait(wanted.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn set(traits: &[PlayerTrait]) -> TraitSet {
        traits.iter().copied().collect()
    }

    #[test]
    fn empty_set_leaves_value_untouched() {
        let s = TraitSet::new();
        assert_relative_eq!(s.modify(TraitHook::Escape, 42.0), 42.0);
        assert_relative_eq!(s.modify(TraitHook::InjuryShrug, -1.0), -1.0);
    }

    #[test]
    fn additive_and_multiplicative_effects_keep_their_rule() {
        let statue = set(&[PlayerTrait::Statue]);
        assert_relative_eq!(statue.modify(TraitHook::Escape, 70.0), 50.0);

        let hawk = set(&[PlayerTrait::BallHawk]);
        assert_relative_eq!(hawk.modify(TraitHook::InterceptChance, 8.0), 10.0);

        let stone = set(&[PlayerTrait::StoneHands]);
        assert_relative_eq!(stone.modify(TraitHook::DropChance, 3.0), 10.0);
    }

    #[test]
    fn unit_hook_counts_each_trait_once() {
        let a = set(&[PlayerTrait::BrickWall]);
        let b = set(&[PlayerTrait::BrickWall]);
        let c = set(&[PlayerTrait::Turnstile]);
        assert_relative_eq!(unit_modify([&a, &b], TraitHook::PassBlock, 60.0), 68.0);
        assert_relative_eq!(unit_modify([&a, &b, &c], TraitHook::PassBlock, 60.0), 60.0);
    }

    #[test]
    fn conflicting_trait_is_rejected() {
        let mut s = TraitSet::new();
        s.insert(PlayerTrait::IronMan).unwrap();
        let err = s.insert(PlayerTrait::GlassCannon).unwrap_err();
        assert!(matches!(err, RosterError::TraitConflict { .. }));
        assert!(!s.has(PlayerTrait::GlassCannon));
    }

    #[test]
    fn trait_names_round_trip_through_from_str() {
        for t in PlayerTrait::ALL {
            assert_eq!(t.name().parse::<PlayerTrait>().unwrap(), t);
        }
        for t in CoachTrait::ALL {
            assert_eq!(t.name().parse::<CoachTrait>().unwrap(), t);
        }
        assert!("Laser Eyes".parse::<PlayerTrait>().is_err());
    }

    #[test]
    fn rolled_bonus_stays_in_range() {
        let joystick = set(&[PlayerTrait::HumanJoystick]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let b = joystick.roll_bonus(TraitHook::YardsAfterCatch, &mut rng);
            assert!((2..=10).contains(&b));
        }
        assert_eq!(TraitSet::new().roll_bonus(TraitHook::YardsAfterCatch, &mut rng), 0);
    }

    #[test]
    fn serde_uses_display_names() {
        let s = set(&[PlayerTrait::IronMan, PlayerTrait::BigLeg]);
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"Iron Man\""));
        let back: TraitSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
