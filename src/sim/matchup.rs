//! Skill-vs-skill resolution: unit ratings, the trench margin and pass
//! target selection.

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::roster::{Attribute, Player, Position, Team, TraitHook};

use super::tactics::{DefensiveCall, OffensivePlay};

/// Half-width of the uniform noise added to every margin.
pub const MARGIN_VARIANCE: i32 = 20;

/// Half-width of the noise on route separation.
const SEPARATION_VARIANCE: i32 = 15;

/// Defender skill that zone coverage pulls toward.
const ZONE_BASELINE: f64 = 85.0;

pub const RUN_BLOCK: &[(Attribute, f64)] = &[(Attribute::Strength, 0.5), (Attribute::Blocking, 0.5)];
pub const RUN_STOP: &[(Attribute, f64)] = &[(Attribute::Strength, 0.5), (Attribute::Tackling, 0.5)];
pub const PASS_RUSH: &[(Attribute, f64)] = &[(Attribute::Strength, 1.0)];
pub const PASS_PROTECT: &[(Attribute, f64)] = &[(Attribute::Blocking, 1.0)];

/// An offense-vs-defense interaction reduced to two scores and a flat
/// adjustment (scheme, strategy and trait bonuses already folded in).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matchup {
    pub offense: f64,
    pub defense: f64,
    pub adjustment: f64,
}

impl Matchup {
    pub fn new(offense: f64, defense: f64) -> Self {
        Self {
            offense,
            defense,
            adjustment: 0.0,
        }
    }

    pub fn adjust(mut self, delta: f64) -> Self {
        self.adjustment += delta;
        self
    }

    /// Deterministic part of the margin.
    pub fn edge(&self) -> f64 {
        self.offense - self.defense + self.adjustment
    }

    /// Signed win margin with uniform noise in `[-20, 20]`.
    pub fn margin<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.edge() + f64::from(rng.gen_range(-MARGIN_VARIANCE..=MARGIN_VARIANCE))
    }
}

/// Mean weighted score of a unit.
pub fn unit_rating(team: &Team, players: &[usize], weights: &[(Attribute, f64)]) -> f64 {
    if players.is_empty() {
        return 0.0;
    }
    let total: f64 = players
        .iter()
        .map(|&i| {
            let p = team.player(i);
            weights.iter().map(|&(a, w)| p.attr(a) * w).sum::<f64>()
        })
        .sum();
    total / players.len() as f64
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassTarget {
    /// Roster index on the offense.
    pub receiver: usize,
    pub position: Position,
    /// Roster index on the defense.
    pub defender: usize,
    pub separation: f64,
    pub score: f64,
}

/// Position group that covers a receiver at `pos`.
fn coverage_group<R: Rng + ?Sized>(pos: Position, rng: &mut R) -> Position {
    match pos {
        Position::Te => {
            if rng.gen::<f64>() < 0.7 {
                Position::Lb
            } else {
                Position::Db
            }
        }
        Position::Rb => Position::Lb,
        _ => Position::Db,
    }
}

/// Route separation skill for a receiver before coverage is subtracted.
fn route_skill(receiver: &Player, pos: Position) -> f64 {
    let base = receiver.attr(Attribute::Speed) * 0.45 + receiver.attr(Attribute::Agility) * 0.55;
    let base = receiver.traits.modify(TraitHook::RouteSeparation, base);
    if pos == Position::Rb {
        receiver.traits.modify(TraitHook::BackfieldRoute, base)
    } else {
        base
    }
}

fn coverage_skill(defender: &Player, zone: bool) -> f64 {
    let raw = defender.attr(Attribute::Speed) * 0.5 + defender.attr(Attribute::Awareness) * 0.5;
    if zone {
        (raw + ZONE_BASELINE) / 2.0
    } else {
        raw
    }
}

/// Pick the receiver the quarterback throws to, or `None` when every
/// eligible player is blocking.
///
/// Every receiver running a route draws a defender and a separation. The
/// top three by priority-weighted score are sampled with weight
/// `max(1, score + 20)`. A vision roll driven by the passer's awareness can
/// then move the throw off a covered read to a more open receiver.
pub fn select_target<R: Rng + ?Sized>(
    offense: &Team,
    defense: &Team,
    play: OffensivePlay,
    call: DefensiveCall,
    qb: &Player,
    rng: &mut R,
) -> Option<PassTarget> {
    let mut eligible: Vec<(Position, usize)> = Vec::with_capacity(4);
    for (pos, count) in [(Position::Wr, 2), (Position::Te, 1), (Position::Rb, 1)] {
        eligible.extend(offense.active(pos, count).into_iter().map(|i| (pos, i)));
    }

    let zone = call.is_zone();
    let mut candidates = Vec::with_capacity(eligible.len());
    for (pos, receiver) in eligible {
        let Some(route) = play.route_for(pos) else {
            continue;
        };
        if route.is_block() {
            continue;
        }
        let group = coverage_group(pos, rng);
        let Some(&defender) = defense.active(group, 3).choose(rng) else {
            continue;
        };

        let separation = route_skill(offense.player(receiver), pos)
            - coverage_skill(defense.player(defender), zone)
            + f64::from(rng.gen_range(-SEPARATION_VARIANCE..=SEPARATION_VARIANCE));
        candidates.push(PassTarget {
            receiver,
            position: pos,
            defender,
            separation,
            score: separation + f64::from(route.priority * 3),
        });
    }

    if candidates.is_empty() {
        return None;
    }
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let top = &candidates[..candidates.len().min(3)];
    let weights: Vec<f64> = top.iter().map(|c| (c.score + 20.0).max(1.0)).collect();
    let mut best_idx = WeightedIndex::new(&weights)
        .map(|dist| dist.sample(rng))
        .unwrap_or(0);

    let vision = f64::from(rng.gen_range(0..=100)) + qb.attr(Attribute::Awareness) * 0.3;
    if vision > 50.0 && candidates[best_idx].separation < -2.0 {
        let margin = qb.traits.modify(TraitHook::VisionThreshold, 5.0);
        let floor = candidates[best_idx].separation + margin;
        if let Some(alt) = (0..candidates.len()).find(|&i| i != best_idx && candidates[i].separation > floor) {
            best_idx = alt;
        }
    }

    Some(candidates[best_idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{PlayerTrait, TeamBuilder};
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn margin_noise_is_bounded_and_uniformish() {
        let m = Matchup::new(70.0, 60.0).adjust(-4.0);
        assert_relative_eq!(m.edge(), 6.0);
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let mut low = 0;
        let mut high = 0;
        for _ in 0..2000 {
            let x = m.margin(&mut rng);
            assert!((-14.0..=26.0).contains(&x));
            if x < -4.0 {
                low += 1;
            } else if x > 16.0 {
                high += 1;
            }
        }
        // Both outer quarters of a uniform window get a real share.
        assert!(low > 300 && high > 300, "low {} high {}", low, high);
    }

    #[test]
    fn unit_rating_is_a_weighted_mean() {
        let mut team = TeamBuilder::new("A").rating(60).build();
        let ol = team.active(Position::Ol, 5);
        team.roster[ol[0]].set_attr(Attribute::Blocking, 90);
        // (60*0.5 + 90*0.5 + 4 * 60) / 5 = 63
        assert_relative_eq!(unit_rating(&team, &ol, RUN_BLOCK), 63.0, epsilon = 1e-9);
        assert_relative_eq!(unit_rating(&team, &[], RUN_BLOCK), 0.0);
    }

    #[test]
    fn target_is_never_a_blocker() {
        let off = TeamBuilder::new("O").rating(75).build();
        let def = TeamBuilder::new("D").rating(75).build();
        let qb = off.player(off.starter(Position::Qb));
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        for _ in 0..300 {
            let t = select_target(&off, &def, OffensivePlay::PassDeep, DefensiveCall::Man1, qb, &mut rng)
                .expect("deep has two live routes");
            assert_ne!(t.position, Position::Rb);
            assert_eq!(off.player(t.receiver).position, t.position);
        }
    }

    #[test]
    fn play_action_fake_can_be_targeted() {
        let off = TeamBuilder::new("O").rating(75).build();
        let def = TeamBuilder::new("D").rating(75).build();
        let qb = off.player(off.starter(Position::Qb));
        let mut rng = ChaCha8Rng::seed_from_u64(33);
        let rb_targets = (0..2000)
            .filter_map(|_| select_target(&off, &def, OffensivePlay::PassPa, DefensiveCall::Cover2, qb, &mut rng))
            .filter(|t| t.position == Position::Rb)
            .count();
        assert!(rb_targets > 0);
    }

    #[test]
    fn running_back_is_covered_by_a_linebacker() {
        let off = TeamBuilder::new("O").rating(75).build();
        let def = TeamBuilder::new("D").rating(75).build();
        let qb = off.player(off.starter(Position::Qb));
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut seen_rb = false;
        for _ in 0..300 {
            if let Some(t) =
                select_target(&off, &def, OffensivePlay::PassScreen, DefensiveCall::Cover2, qb, &mut rng)
            {
                if t.position == Position::Rb {
                    seen_rb = true;
                    assert_eq!(def.player(t.defender).position, Position::Lb);
                } else {
                    assert_eq!(def.player(t.defender).position, Position::Db);
                }
            }
        }
        assert!(seen_rb);
    }

    #[test]
    fn route_technician_adds_separation_skill() {
        let mut team = TeamBuilder::new("O").rating(70).build();
        let wr = team.starter(Position::Wr);
        let plain = route_skill(team.player(wr), Position::Wr);
        team.roster[wr].traits.insert(PlayerTrait::RouteTechnician).unwrap();
        assert_relative_eq!(route_skill(team.player(wr), Position::Wr), plain + 10.0);

        let rb = team.starter(Position::Rb);
        team.roster[rb].traits.insert(PlayerTrait::Satellite).unwrap();
        assert_relative_eq!(route_skill(team.player(rb), Position::Rb), plain + 15.0);
        assert_relative_eq!(route_skill(team.player(rb), Position::Wr), plain);
    }

    #[test]
    fn zone_pulls_coverage_toward_baseline() {
        let mut p = Player::new("D", "Back", Position::Db);
        p.set_attr(Attribute::Speed, 60);
        p.set_attr(Attribute::Awareness, 60);
        assert_relative_eq!(coverage_skill(&p, false), 60.0);
        assert_relative_eq!(coverage_skill(&p, true), 72.5);
    }
}
