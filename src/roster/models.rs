//! Positions, attributes, stat lines, players and coaches.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::traits::{CoachTrait, TraitHook, TraitSet};

// ── Positions & attributes ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    Qb,
    Rb,
    Wr,
    Te,
    Ol,
    Dl,
    Lb,
    Db,
    K,
    P,
}

impl Position {
    pub const ALL: [Position; 10] = [
        Position::Qb,
        Position::Rb,
        Position::Wr,
        Position::Te,
        Position::Ol,
        Position::Dl,
        Position::Lb,
        Position::Db,
        Position::K,
        Position::P,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Position::Qb => "QB",
            Position::Rb => "RB",
            Position::Wr => "WR",
            Position::Te => "TE",
            Position::Ol => "OL",
            Position::Dl => "DL",
            Position::Lb => "LB",
            Position::Db => "DB",
            Position::K => "K",
            Position::P => "P",
        }
    }

    /// Attribute weights used for a player's overall rating at this position.
    pub fn weights(self) -> &'static [(Attribute, f64)] {
        use Attribute::*;
        match self {
            Position::Qb => &[
                (ThrowPower, 0.35),
                (Accuracy, 0.35),
                (Awareness, 0.15),
                (Speed, 0.10),
                (Agility, 0.05),
            ],
            Position::Rb => &[
                (Speed, 0.30),
                (Agility, 0.30),
                (Strength, 0.20),
                (Catching, 0.10),
                (Awareness, 0.10),
            ],
            Position::Wr => &[
                (Speed, 0.35),
                (Catching, 0.35),
                (Agility, 0.20),
                (Accuracy, 0.05),
                (Strength, 0.05),
            ],
            Position::Te => &[
                (Catching, 0.35),
                (Blocking, 0.35),
                (Strength, 0.20),
                (Speed, 0.05),
                (Awareness, 0.05),
            ],
            Position::Ol => &[
                (Blocking, 0.45),
                (Strength, 0.40),
                (Awareness, 0.10),
                (Agility, 0.05),
            ],
            Position::Dl => &[
                (Strength, 0.35),
                (Tackling, 0.30),
                (Agility, 0.20),
                (Blocking, 0.10),
                (Awareness, 0.05),
            ],
            Position::Lb => &[
                (Tackling, 0.35),
                (Strength, 0.25),
                (Awareness, 0.20),
                (Speed, 0.10),
                (Agility, 0.10),
            ],
            Position::Db => &[
                (Speed, 0.30),
                (Accuracy, 0.20),
                (Awareness, 0.20),
                (Catching, 0.15),
                (Tackling, 0.15),
            ],
            Position::K | Position::P => &[(KickPower, 0.60), (Accuracy, 0.40)],
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Rated skills, each 0–99. Serialized under their three-letter codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attribute {
    #[serde(rename = "SPD")]
    Speed,
    #[serde(rename = "STR")]
    Strength,
    #[serde(rename = "AGI")]
    Agility,
    #[serde(rename = "INT")]
    Awareness,
    #[serde(rename = "THP")]
    ThrowPower,
    #[serde(rename = "ACC")]
    Accuracy,
    #[serde(rename = "CTH")]
    Catching,
    #[serde(rename = "BLK")]
    Blocking,
    #[serde(rename = "TKL")]
    Tackling,
    #[serde(rename = "KPW")]
    KickPower,
    #[serde(rename = "DUR")]
    Durability,
}

impl Attribute {
    pub const ALL: [Attribute; 11] = [
        Attribute::Speed,
        Attribute::Strength,
        Attribute::Agility,
        Attribute::Awareness,
        Attribute::ThrowPower,
        Attribute::Accuracy,
        Attribute::Catching,
        Attribute::Blocking,
        Attribute::Tackling,
        Attribute::KickPower,
        Attribute::Durability,
    ];

    /// Value assumed when a player has no rating for this attribute.
    pub fn default_rating(self) -> u8 {
        match self {
            Attribute::Durability => 75,
            _ => 0,
        }
    }
}

// ── Player ───────────────────────────────────────────────────────────────────

/// Counters the engine increments. Season-level; never reset by a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    PassAtt,
    PassCmp,
    PassYds,
    PassTd,
    PassInt,
    SacksTaken,
    RushAtt,
    RushYds,
    RushTd,
    Fumbles,
    RecCat,
    RecYds,
    RecTd,
    Tackles,
    Sacks,
    IntMade,
    FgAtt,
    FgMade,
    Punts,
    PuntYds,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub pass_att: i32,
    pub pass_cmp: i32,
    pub pass_yds: i32,
    pub pass_td: i32,
    pub pass_int: i32,
    pub sacks_taken: i32,
    pub rush_att: i32,
    pub rush_yds: i32,
    pub rush_td: i32,
    pub fumbles: i32,
    pub rec_cat: i32,
    pub rec_yds: i32,
    pub rec_td: i32,
    pub tackles: i32,
    pub sacks: i32,
    pub int_made: i32,
    pub fg_att: i32,
    pub fg_made: i32,
    pub punts: i32,
    pub punt_yds: i32,
}

impl PlayerStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn add(&mut self, stat: Stat, amount: i32) {
        *self.slot(stat) += amount;
    }

    pub fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::PassAtt => self.pass_att,
            Stat::PassCmp => self.pass_cmp,
            Stat::PassYds => self.pass_yds,
            Stat::PassTd => self.pass_td,
            Stat::PassInt => self.pass_int,
            Stat::SacksTaken => self.sacks_taken,
            Stat::RushAtt => self.rush_att,
            Stat::RushYds => self.rush_yds,
            Stat::RushTd => self.rush_td,
            Stat::Fumbles => self.fumbles,
            Stat::RecCat => self.rec_cat,
            Stat::RecYds => self.rec_yds,
            Stat::RecTd => self.rec_td,
            Stat::Tackles => self.tackles,
            Stat::Sacks => self.sacks,
            Stat::IntMade => self.int_made,
            Stat::FgAtt => self.fg_att,
            Stat::FgMade => self.fg_made,
            Stat::Punts => self.punts,
            Stat::PuntYds => self.punt_yds,
        }
    }

    fn slot(&mut self, stat: Stat) -> &mut i32 {
        match stat {
            Stat::PassAtt => &mut self.pass_att,
            Stat::PassCmp => &mut self.pass_cmp,
            Stat::PassYds => &mut self.pass_yds,
            Stat::PassTd => &mut self.pass_td,
            Stat::PassInt => &mut self.pass_int,
            Stat::SacksTaken => &mut self.sacks_taken,
            Stat::RushAtt => &mut self.rush_att,
            Stat::RushYds => &mut self.rush_yds,
            Stat::RushTd => &mut self.rush_td,
            Stat::Fumbles => &mut self.fumbles,
            Stat::RecCat => &mut self.rec_cat,
            Stat::RecYds => &mut self.rec_yds,
            Stat::RecTd => &mut self.rec_td,
            Stat::Tackles => &mut self.tackles,
            Stat::Sacks => &mut self.sacks,
            Stat::IntMade => &mut self.int_made,
            Stat::FgAtt => &mut self.fg_att,
            Stat::FgMade => &mut self.fg_made,
            Stat::Punts => &mut self.punts,
            Stat::PuntYds => &mut self.punt_yds,
        }
    }
}

fn full_stamina() -> u8 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub first_name: String,
    pub last_name: String,
    pub position: Position,
    #[serde(default)]
    pub attributes: BTreeMap<Attribute, u8>,
    #[serde(default = "full_stamina")]
    pub stamina: u8,
    #[serde(default)]
    pub traits: TraitSet,
    #[serde(default)]
    pub weeks_injured: u32,
    #[serde(default)]
    pub injury_type: Option<String>,
    #[serde(default)]
    pub stats: PlayerStats,
}

impl Player {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, position: Position) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            position,
            attributes: BTreeMap::new(),
            stamina: 100,
            traits: TraitSet::new(),
            weeks_injured: 0,
            injury_type: None,
            stats: PlayerStats::default(),
        }
    }

    /// Rating for `attr` as a float, falling back to the attribute default.
    pub fn attr(&self, attr: Attribute) -> f64 {
        f64::from(
            self.attributes
                .get(&attr)
                .copied()
                .unwrap_or_else(|| attr.default_rating()),
        )
    }

    pub fn set_attr(&mut self, attr: Attribute, value: u8) {
        self.attributes.insert(attr, value.min(99));
    }

    pub fn overall(&self) -> u8 {
        let score: f64 = self
            .position
            .weights()
            .iter()
            .map(|&(a, w)| self.attr(a) * w)
            .sum();
        score.round().clamp(0.0, 99.0) as u8
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_injured(&self) -> bool {
        self.weeks_injured > 0
    }

    /// Zero the counters and restore full stamina.
    pub fn reset(&mut self) {
        self.stats.reset();
        self.stamina = 100;
    }

    /// One week of healing between games. Stamina is always restored.
    pub fn recover_weekly<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.is_injured() {
            let mut healed = self.traits.modify(TraitHook::RecoveryRate, 1.0) as u32;
            let stall = self.traits.modify(TraitHook::RecoveryStall, 0.0);
            if stall > 0.0 && rng.gen::<f64>() < stall {
                healed = 0;
            }
            self.weeks_injured = self.weeks_injured.saturating_sub(healed);
            if self.weeks_injured == 0 {
                self.injury_type = None;
            }
        }
        self.stamina = 100;
    }
}

// ── Coach ────────────────────────────────────────────────────────────────────

/// Situations in which a coach may add a strategy bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusContext {
    FourthDown,
    /// Second-half adjustment; `score_diff` is from the coach's side.
    Halftime { score_diff: i32 },
    QbAttributes,
    IntChanceDefense,
    /// Pre-snap read of the defense. Any bonus here also cancels a
    /// defensive counter.
    PlayRecognition,
}

/// Offensive identity derived from the coach's run/pass bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scheme {
    AirRaid,
    Smashmouth,
    Balanced,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coach {
    pub first_name: String,
    pub last_name: String,
    /// 0 (run-only) .. 10 (pass-only).
    pub run_pass_bias: u8,
    /// 0 .. 10, appetite for shot plays.
    pub aggressiveness: u8,
    /// 0 .. 100, willingness to go for it on 4th down.
    pub fourth_down_agg: u8,
    #[serde(default)]
    pub traits: Vec<CoachTrait>,
}

impl Coach {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            run_pass_bias: 5,
            aggressiveness: 5,
            fourth_down_agg: 10,
            traits: Vec::new(),
        }
    }

    pub fn has(&self, t: CoachTrait) -> bool {
        self.traits.contains(&t)
    }

    pub fn scheme(&self) -> Scheme {
        match self.run_pass_bias {
            b if b >= 7 => Scheme::AirRaid,
            b if b <= 3 => Scheme::Smashmouth,
            _ => Scheme::Balanced,
        }
    }

    /// Strategy bonus this coach contributes in `ctx`.
    ///
    /// Only the Gut Feeling roll consumes randomness, and only when the
    /// coach actually holds that trait. Fourth-down bonuses stack.
    pub fn game_bonus<R: Rng + ?Sized>(&self, ctx: BonusContext, rng: &mut R) -> f64 {
        match ctx {
            BonusContext::FourthDown => {
                let mut bonus = 0.0;
                if self.has(CoachTrait::FourthDownFire) {
                    bonus += 15.0;
                }
                if self.has(CoachTrait::GutFeeling) && rng.gen::<f64>() < 0.3 {
                    bonus += 20.0;
                }
                bonus
            }
            BonusContext::Halftime { score_diff } => {
                if self.has(CoachTrait::HalftimeAdjuster) && score_diff < 0 {
                    5.0
                } else {
                    0.0
                }
            }
            BonusContext::QbAttributes if self.has(CoachTrait::QuarterbackWhisperer) => 5.0,
            BonusContext::IntChanceDefense if self.has(CoachTrait::DefensiveMastermind) => 10.0,
            BonusContext::PlayRecognition if self.has(CoachTrait::TheAnalyst) => 5.0,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn missing_durability_defaults_to_75() {
        let p = Player::new("Sam", "Reed", Position::Rb);
        assert_relative_eq!(p.attr(Attribute::Durability), 75.0);
        assert_relative_eq!(p.attr(Attribute::Speed), 0.0);
    }

    #[test]
    fn overall_uses_position_weights() {
        let mut k = Player::new("Leo", "Foot", Position::K);
        k.set_attr(Attribute::KickPower, 90);
        k.set_attr(Attribute::Accuracy, 80);
        // 90 * 0.6 + 80 * 0.4 = 86
        assert_eq!(k.overall(), 86);
    }

    #[test]
    fn weights_sum_to_one() {
        for pos in Position::ALL {
            let total: f64 = pos.weights().iter().map(|(_, w)| w).sum();
            assert_relative_eq!(total, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn stats_accumulate_by_key() {
        let mut s = PlayerStats::default();
        s.add(Stat::RushYds, 12);
        s.add(Stat::RushYds, -3);
        s.add(Stat::Sacks, 1);
        assert_eq!(s.get(Stat::RushYds), 9);
        assert_eq!(s.sacks, 1);
    }

    #[test]
    fn scheme_follows_bias() {
        let mut c = Coach::new("Pat", "Lane");
        c.run_pass_bias = 8;
        assert_eq!(c.scheme(), Scheme::AirRaid);
        c.run_pass_bias = 2;
        assert_eq!(c.scheme(), Scheme::Smashmouth);
        c.run_pass_bias = 5;
        assert_eq!(c.scheme(), Scheme::Balanced);
    }

    #[test]
    fn game_bonus_by_context() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut c = Coach::new("Pat", "Lane");
        assert_relative_eq!(c.game_bonus(BonusContext::FourthDown, &mut rng), 0.0);

        c.traits = vec![CoachTrait::FourthDownFire, CoachTrait::HalftimeAdjuster];
        assert_relative_eq!(c.game_bonus(BonusContext::FourthDown, &mut rng), 15.0);
        assert_relative_eq!(
            c.game_bonus(BonusContext::Halftime { score_diff: -7 }, &mut rng),
            5.0
        );
        assert_relative_eq!(
            c.game_bonus(BonusContext::Halftime { score_diff: 3 }, &mut rng),
            0.0
        );

        c.traits = vec![CoachTrait::DefensiveMastermind, CoachTrait::TheAnalyst];
        assert_relative_eq!(c.game_bonus(BonusContext::IntChanceDefense, &mut rng), 10.0);
        assert_relative_eq!(c.game_bonus(BonusContext::PlayRecognition, &mut rng), 5.0);
        assert_relative_eq!(c.game_bonus(BonusContext::QbAttributes, &mut rng), 0.0);
    }

    #[test]
    fn gut_feeling_sometimes_fires() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut c = Coach::new("Pat", "Lane");
        c.traits = vec![CoachTrait::GutFeeling];
        let fired = (0..500)
            .filter(|_| c.game_bonus(BonusContext::FourthDown, &mut rng) > 0.0)
            .count();
        assert!(fired > 100 && fired < 200, "fired {} of 500", fired);
    }

    #[test]
    fn fourth_down_fire_and_gut_feeling_stack() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let mut c = Coach::new("Pat", "Lane");
        c.traits = vec![CoachTrait::FourthDownFire, CoachTrait::GutFeeling];
        let bonuses: Vec<f64> = (0..500)
            .map(|_| c.game_bonus(BonusContext::FourthDown, &mut rng))
            .collect();
        assert!(bonuses.iter().all(|&b| b == 15.0 || b == 35.0));
        let stacked = bonuses.iter().filter(|&&b| b == 35.0).count();
        assert!(stacked > 100 && stacked < 200, "stacked {} of 500", stacked);
    }

    #[test]
    fn player_json_uses_attribute_codes() {
        let json = r#"{
            "first_name": "Joe", "last_name": "Arm", "position": "QB",
            "attributes": {"THP": 88, "ACC": 91, "INT": 80},
            "traits": ["Field General"]
        }"#;
        let p: Player = serde_json::from_str(json).unwrap();
        assert_eq!(p.position, Position::Qb);
        assert_eq!(p.stamina, 100);
        assert_relative_eq!(p.attr(Attribute::Accuracy), 91.0);
        assert!(p.traits.has(crate::roster::PlayerTrait::FieldGeneral));
    }
}
