//! Stamina drain and injuries.
//!
//! [`exert`] decides what one burst of effort costs a player; the engine
//! writes the result back with [`Player::absorb`].

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::roster::{Attribute, Player, TraitHook};

/// Stamina below which a player is more likely to get hurt (and to fumble).
pub const LOW_STAMINA: u8 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Minor,
    Moderate,
    Serious,
    Severe,
}

impl Severity {
    /// Bucket a severity roll (`0..=100` plus the durability penalty).
    pub fn from_roll(roll: i32) -> Self {
        match roll {
            r if r > 120 => Severity::Severe,
            r if r > 90 => Severity::Serious,
            r if r > 55 => Severity::Moderate,
            _ => Severity::Minor,
        }
    }

    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Minor => "MINOR",
            Severity::Moderate => "MODERATE",
            Severity::Serious => "SERIOUS",
            Severity::Severe => "SEVERE",
        }
    }

    /// `(name, min weeks, max weeks)` entries for this tier.
    pub fn pool(self) -> &'static [(&'static str, u32, u32)] {
        match self {
            Severity::Minor => &[
                ("Bruised Ribs", 1, 1),
                ("Hip Pointer", 1, 2),
                ("Stinger", 1, 1),
                ("Sprained Wrist", 1, 2),
                ("Bruised Knee", 1, 2),
                ("Turf Toe", 1, 3),
                ("Lower Back Strain", 1, 2),
            ],
            Severity::Moderate => &[
                ("Sprained Ankle", 2, 3),
                ("Hamstring Strain", 2, 4),
                ("Groin Strain", 2, 4),
                ("Concussion", 1, 3),
                ("Calf Strain", 2, 5),
                ("Shoulder Subluxation", 3, 5),
                ("Elbow Sprain", 2, 4),
                ("Broken Finger", 3, 6),
                ("Deep Thigh Bruise", 2, 3),
            ],
            Severity::Serious => &[
                ("High Ankle Sprain", 5, 8),
                ("MCL Sprain", 5, 8),
                ("Meniscus Tear", 4, 9),
                ("Broken Hand", 5, 8),
                ("Sports Hernia", 6, 9),
                ("Broken Collarbone", 7, 10),
                ("Broken Ribs", 4, 7),
            ],
            Severity::Severe => &[
                ("Broken Arm", 9, 14),
                ("Broken Leg", 12, 18),
                ("Torn Pectoral", 11, 16),
                ("Torn Triceps", 11, 16),
                ("Lisfranc Injury", 10, 16),
                ("Torn ACL", 14, 20),
                ("Achilles Tear", 14, 20),
                ("Patellar Tendon Tear", 14, 20),
                ("Vertebrae Fracture", 15, 25),
            ],
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Injury {
    pub name: String,
    pub severity: Severity,
    pub weeks: u32,
}

/// What one exertion did to a player. Nothing is written back until the
/// game state commits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exertion {
    pub stamina: u8,
    pub injury: Option<Injury>,
    /// An injury was rolled but a trait let the player shake it off.
    pub shrugged_off: bool,
}

impl Exertion {
    /// Log text for the play description, if anything happened.
    pub fn describe(&self, last_name: &str) -> Option<String> {
        if let Some(injury) = &self.injury {
            Some(format!("{} INJURED ({} - {})", last_name, injury.name, injury.severity))
        } else if self.shrugged_off {
            Some(format!("{} shakes off a hit.", last_name))
        } else {
            None
        }
    }
}

/// Percent chance of injury for one exertion, before the caller's roll.
pub fn injury_chance(player: &Player, stamina: u8, risk: f64) -> f64 {
    let durability = player.attr(Attribute::Durability);
    let mut chance = 0.5 + (100.0 - durability) * 0.02;
    if stamina < LOW_STAMINA {
        chance += 2.0;
    }
    chance * player.traits.modify(TraitHook::InjuryRisk, risk)
}

/// Drain stamina from `stamina` (the player's current value, which may
/// already reflect earlier exertions this play) and roll for injury.
pub fn exert<R: Rng + ?Sized>(player: &Player, stamina: u8, fatigue: i32, risk: f64, rng: &mut R) -> Exertion {
    let drain = player.traits.modify(TraitHook::Fatigue, f64::from(fatigue)) as i32;
    let stamina = (i32::from(stamina) - drain).clamp(0, 100) as u8;

    let chance = injury_chance(player, stamina, risk);
    if rng.gen_range(0.0..100.0) >= chance {
        return Exertion {
            stamina,
            injury: None,
            shrugged_off: false,
        };
    }

    let penalty = 100 - player.attr(Attribute::Durability) as i32;
    let severity = Severity::from_roll(rng.gen_range(0..=100) + penalty);

    let shrug_up_to = player.traits.modify(TraitHook::InjuryShrug, -1.0);
    if f64::from(severity.rank()) <= shrug_up_to {
        return Exertion {
            stamina,
            injury: None,
            shrugged_off: true,
        };
    }

    let injury = severity.pool().choose(rng).map(|&(name, min, max)| Injury {
        name: name.to_string(),
        severity,
        weeks: rng.gen_range(min..=max),
    });
    Exertion {
        stamina,
        injury,
        shrugged_off: false,
    }
}

impl Player {
    /// Write an exertion back onto the player.
    pub fn absorb(&mut self, exertion: &Exertion) {
        self.stamina = exertion.stamina;
        if let Some(injury) = &exertion.injury {
            self.weeks_injured = injury.weeks;
            self.injury_type = Some(injury.name.clone());
        }
    }
}
