//! Resolution of a single snap.
//!
//! The resolver reads both teams and the game state but never mutates them.
//! Every stat delta, stamina change and injury it decides on is recorded in
//! the returned [`PlayOutcome`] for the engine to commit. Random draws happen
//! in a fixed order for a given play type, so a seeded generator reproduces
//! the same play.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::roster::traits::{unit_modify, ContactRole, CONTACT_EFFECTS};
use crate::roster::{Attribute, BonusContext, Player, Position, Scheme, Stat, Team, TraitHook};

use super::fatigue::{self, LOW_STAMINA};
use super::matchup::{self, Matchup, PASS_PROTECT, PASS_RUSH, RUN_BLOCK, RUN_STOP};
use super::outcome::{Action, Participation, PlayOutcome, PlayerRef, Resolution, Turnover};
use super::playcaller::ClockMode;
use super::state::GameState;
use super::tactics::{counter_modifier, DefensiveCall, OffensivePlay, PlayCategory};

/// Trench margin below which a run is stuffed at the line.
pub const STUFF_MARGIN: f64 = -15.0;

/// Trench margin below which a run is contested by the second level.
pub const CONTESTED_MARGIN: f64 = 5.0;

/// Pass-rush margin above which the pocket collapses.
pub const PRESSURE_MARGIN: f64 = 20.0;

/// Flat bonus when the call matches the coach's scheme.
const SCHEME_BONUS: f64 = 5.0;

/// Everything the resolver may read.
#[derive(Debug, Clone, Copy)]
pub struct PlayContext<'a> {
    pub state: &'a GameState,
    pub offense: &'a Team,
    pub defense: &'a Team,
    pub mode: ClockMode,
}

impl<'a> PlayContext<'a> {
    fn player(&self, r: PlayerRef) -> &'a Player {
        let team: &'a Team = if r.side == self.state.offense {
            self.offense
        } else {
            self.defense
        };
        team.player(r.index)
    }

    fn off(&self, index: usize) -> PlayerRef {
        PlayerRef::new(self.state.offense, index)
    }

    fn def(&self, index: usize) -> PlayerRef {
        PlayerRef::new(self.state.defense(), index)
    }
}

/// Yards to the uprights from a ball spot (snap plus end zone depth).
pub fn field_goal_distance(ball_on: i32) -> i32 {
    100 - ball_on + 17
}

/// Percent accuracy for a kick of `distance` with a situational `bonus`.
/// Chip shots of 25 yards or less never miss.
pub fn field_goal_accuracy(distance: i32, bonus: f64) -> f64 {
    if distance <= 25 {
        100.0
    } else {
        100.0 - f64::from(distance - 25) + bonus
    }
}

fn pick<R: Rng + ?Sized>(group: &[usize], rng: &mut R) -> Option<usize> {
    group.choose(rng).copied()
}

/// Collects what a play does to players while it is being resolved.
struct Ledger<'a> {
    ctx: PlayContext<'a>,
    play: OffensivePlay,
    call: DefensiveCall,
    stats: Vec<(PlayerRef, Stat, i32)>,
    participants: Vec<Participation>,
    injuries: Vec<String>,
    touchdown_credits: Vec<(PlayerRef, Stat)>,
}

impl<'a> Ledger<'a> {
    fn new(ctx: PlayContext<'a>, play: OffensivePlay, call: DefensiveCall) -> Self {
        Self {
            ctx,
            play,
            call,
            stats: Vec::new(),
            participants: Vec::new(),
            injuries: Vec::new(),
            touchdown_credits: Vec::new(),
        }
    }

    fn credit(&mut self, who: PlayerRef, stat: Stat, amount: i32) {
        self.stats.push((who, stat, amount));
    }

    /// Stamina as of this point in the play.
    fn stamina(&self, who: PlayerRef) -> u8 {
        self.participants
            .iter()
            .rev()
            .find(|p| p.player == who)
            .map(|p| p.exertion.stamina)
            .unwrap_or_else(|| self.ctx.player(who).stamina)
    }

    fn exert<R: Rng + ?Sized>(&mut self, who: PlayerRef, amount: i32, risk: f64, rng: &mut R) {
        let player = self.ctx.player(who);
        let exertion = fatigue::exert(player, self.stamina(who), amount, risk, rng);
        if let Some(text) = exertion.describe(&player.last_name) {
            self.injuries.push(text);
        }
        self.participants.push(Participation { player: who, exertion });
    }

    fn finish(
        self,
        action: Action,
        resolution: Resolution,
        yards: i32,
        seconds: i32,
        mut description: String,
    ) -> PlayOutcome {
        if !self.injuries.is_empty() {
            description.push(' ');
            description.push_str(&self.injuries.join(" "));
        }
        debug!(
            "{} vs {}: {:?} {} yds, {}s",
            self.play, self.call, action, yards, seconds
        );
        PlayOutcome {
            play: self.play,
            call: self.call,
            action,
            resolution,
            yards,
            seconds,
            description,
            stats: self.stats,
            participants: self.participants,
            touchdown_credits: self.touchdown_credits,
        }
    }

    fn turnover(self, turnover: Turnover, action: Action, seconds: i32, description: String) -> PlayOutcome {
        self.finish(action, Resolution::Turnover { turnover }, 0, seconds, description)
    }
}

/// Resolve one snap of `play` against `call`.
pub fn resolve_play<R: Rng + ?Sized>(
    ctx: &PlayContext<'_>,
    play: OffensivePlay,
    call: DefensiveCall,
    rng: &mut R,
) -> PlayOutcome {
    let ledger = Ledger::new(*ctx, play, call);
    match play.category() {
        PlayCategory::Punt => punt(ledger, rng),
        PlayCategory::FieldGoal => field_goal(ledger, rng),
        PlayCategory::Run | PlayCategory::Pass => scrimmage(ledger, rng),
    }
}

// ── Special teams ────────────────────────────────────────────────────────────

fn punt<R: Rng + ?Sized>(mut l: Ledger<'_>, rng: &mut R) -> PlayOutcome {
    if rng.gen::<f64>() < 0.01 {
        return l.turnover(
            Turnover::BlockedPunt,
            Action::Blocked,
            10,
            "PUNT BLOCKED! Recovered by defense.".to_string(),
        );
    }

    let punter = l.ctx.off(l.ctx.offense.starter(Position::P));
    let rolled = f64::from(35 + rng.gen_range(0..=20));
    let distance = l.ctx.player(punter).traits.modify(TraitHook::PuntDistance, rolled) as i32;
    l.credit(punter, Stat::Punts, 1);
    l.credit(punter, Stat::PuntYds, distance);

    l.finish(
        Action::Punt,
        Resolution::Punt { distance },
        0,
        OffensivePlay::Punt.base_time(),
        format!("Punt for {} yds.", distance),
    )
}

fn field_goal<R: Rng + ?Sized>(mut l: Ledger<'_>, rng: &mut R) -> PlayOutcome {
    if rng.gen::<f64>() < 0.015 {
        return l.turnover(
            Turnover::BlockedKick,
            Action::Blocked,
            10,
            "KICK BLOCKED! Defense recovers!".to_string(),
        );
    }

    let kicker = l.ctx.off(l.ctx.offense.starter(Position::K));
    l.credit(kicker, Stat::FgAtt, 1);

    let distance = field_goal_distance(l.ctx.state.ball_on);
    let bonus = if l.ctx.state.is_clutch() {
        l.ctx.player(kicker).traits.modify(TraitHook::ClutchKick, 0.0)
    } else {
        0.0
    };
    let accuracy = field_goal_accuracy(distance, bonus);
    let good = f64::from(rng.gen_range(1..=100)) < accuracy;

    let text = if good {
        l.credit(kicker, Stat::FgMade, 1);
        format!("{} yd FG GOOD.", distance)
    } else {
        format!("{} yd FG MISSED.", distance)
    };
    l.finish(
        Action::FieldGoal,
        Resolution::FieldGoal { distance, good },
        0,
        OffensivePlay::FieldGoal.base_time(),
        text,
    )
}

// ── Scrimmage ────────────────────────────────────────────────────────────────

/// Strategy modifier and the tag it leaves in the description.
fn strategy<R: Rng + ?Sized>(l: &Ledger<'_>, rng: &mut R) -> (f64, &'static str) {
    let coach = &l.ctx.offense.coach;
    let state = l.ctx.state;

    let mut swing = counter_modifier(l.play, l.call);
    let mut tag = match swing.signum() {
        -1 => " (Def Read!)",
        1 => " (Great Call!)",
        _ => "",
    };
    let recognition = coach.game_bonus(BonusContext::PlayRecognition, rng);
    if recognition > 0.0 && swing < 0 {
        swing = 0;
        tag = " (Analyst Save)";
    }

    let mut modifier = f64::from(swing);
    if swing > 0 {
        modifier += recognition;
    }
    if state.down == 4 {
        modifier += coach.game_bonus(BonusContext::FourthDown, rng);
    }
    if state.quarter == 3 && state.score_diff() < 0 {
        modifier += coach.game_bonus(
            BonusContext::Halftime {
                score_diff: state.score_diff(),
            },
            rng,
        );
    }
    (modifier, tag)
}

struct Snap {
    strategy: f64,
    tag: &'static str,
    scheme: Scheme,
    scheme_bonus: f64,
    qb: PlayerRef,
}

fn scrimmage<R: Rng + ?Sized>(l: Ledger<'_>, rng: &mut R) -> PlayOutcome {
    let (strategy, tag) = strategy(&l, rng);
    let scheme = l.ctx.offense.coach.scheme();
    let scheme_bonus = match (scheme, l.play.category()) {
        (Scheme::AirRaid, PlayCategory::Pass) | (Scheme::Smashmouth, PlayCategory::Run) => SCHEME_BONUS,
        _ => 0.0,
    };
    let snap = Snap {
        strategy,
        tag,
        scheme,
        scheme_bonus,
        qb: l.ctx.off(l.ctx.offense.starter(Position::Qb)),
    };

    if l.play.category() == PlayCategory::Run {
        run(l, &snap, rng)
    } else {
        pass(l, &snap, rng)
    }
}

/// Yardage plays consume the snap time plus huddle runoff, unless the clock
/// mode dictates a fixed runoff.
fn scrimmage_time(l: &Ledger<'_>, snap_seconds: i32) -> i32 {
    l.ctx
        .mode
        .runoff(&l.ctx.offense.coach)
        .unwrap_or(snap_seconds + 10)
}

fn run<R: Rng + ?Sized>(mut l: Ledger<'_>, snap: &Snap, rng: &mut R) -> PlayOutcome {
    let offense = l.ctx.offense;
    let defense = l.ctx.defense;
    let rb = l.ctx.off(offense.starter(Position::Rb));
    let carrier = l.ctx.player(rb);

    l.credit(rb, Stat::RushAtt, 1);
    l.exert(rb, 12, 1.0, rng);

    let dl = defense.active(Position::Dl, 3);
    let ol = offense.active(Position::Ol, 5);

    let mut blocking = matchup::unit_rating(offense, &ol, RUN_BLOCK);
    blocking += match snap.scheme {
        Scheme::Smashmouth => 3.0,
        Scheme::AirRaid => -2.0,
        Scheme::Balanced => 0.0,
    };
    blocking = l.ctx.player(snap.qb).traits.modify(TraitHook::RunBlockLeadership, blocking);

    let mut trench = Matchup::new(blocking, matchup::unit_rating(defense, &dl, RUN_STOP))
        .adjust(snap.strategy * 0.5 + snap.scheme_bonus * 0.5);
    if l.ctx.state.in_red_zone() {
        trench = trench.adjust(4.0);
    }
    let penetration = unit_modify(dl.iter().map(|&i| &defense.player(i).traits), TraitHook::RunPenetration, 0.0);
    let margin = trench.adjust(penetration).margin(rng);

    let mut fumble = 1.5;
    if l.stamina(rb) < LOW_STAMINA {
        fumble += 3.0;
    }
    if carrier.attr(Attribute::Strength) < 50.0 {
        fumble += 1.0;
    }
    let fumble = carrier.traits.modify(TraitHook::FumbleChance, fumble);
    if rng.gen_range(0.0..100.0) < fumble {
        l.credit(rb, Stat::Fumbles, 1);
        let text = format!("FUMBLE! {} loses the ball! Recovered by defense.", carrier.last_name);
        return l.turnover(Turnover::Fumble, Action::Fumble, 10, text);
    }

    let (mut yards, mut text, tackler) = if margin < STUFF_MARGIN {
        let yards = rng.gen_range(-4..=0);
        let tackler = pick(&dl, rng);
        let name = tackler.map(|t| defense.player(t).last_name.as_str()).unwrap_or("the line");
        (yards, format!("Stuffed by {}!", name), tackler)
    } else if margin < CONTESTED_MARGIN {
        let yards = rng.gen_range(1..=5);
        let tackler = pick(&defense.active(Position::Lb, 3), rng);
        (yards, "Run up middle.".to_string(), tackler)
    } else {
        let mut yards = rng.gen_range(4..=12);
        let breakaway = 0.03 + carrier.attr(Attribute::Speed) / 2000.0;
        let text = if rng.gen::<f64>() < breakaway {
            yards += rng.gen_range(20..=60);
            "BREAKAWAY!"
        } else {
            "Nice run!"
        };
        let group = if rng.gen::<f64>() < 0.7 { Position::Lb } else { Position::Db };
        let tackler = pick(&defense.active(group, 3), rng);
        (yards, text.to_string(), tackler)
    };

    if let Some(t) = tackler {
        let tackler_traits = &defense.player(t).traits;
        for effect in CONTACT_EFFECTS {
            let holder = match effect.role {
                ContactRole::Tackler => tackler_traits,
                ContactRole::BallCarrier => &carrier.traits,
            };
            if holder.has(effect.holder) && rng.gen::<f64>() < effect.chance {
                yards += effect.yards;
                match effect.role {
                    ContactRole::Tackler => text.push_str(" Missed tackle!"),
                    ContactRole::BallCarrier => {
                        text.push_str(&format!(" {} runs through contact!", carrier.last_name))
                    }
                }
            }
        }
    }

    l.credit(rb, Stat::RushYds, yards);
    if let Some(t) = tackler {
        let t = l.ctx.def(t);
        l.credit(t, Stat::Tackles, 1);
        l.exert(t, 8, 1.0, rng);
    }
    l.touchdown_credits.push((rb, Stat::RushTd));

    text.push_str(&format!(" {} yds.{}", yards, snap.tag));
    let seconds = scrimmage_time(&l, l.play.base_time() + 5);
    l.finish(Action::Rush, Resolution::Yardage, yards, seconds, text)
}

fn pass<R: Rng + ?Sized>(mut l: Ledger<'_>, snap: &Snap, rng: &mut R) -> PlayOutcome {
    let offense = l.ctx.offense;
    let defense = l.ctx.defense;
    let qb_ref = snap.qb;
    let qb = l.ctx.player(qb_ref);
    let air_raid = snap.scheme == Scheme::AirRaid;

    let target = matchup::select_target(offense, defense, l.play, l.call, qb, rng);
    let mut separation = target.map(|t| t.separation).unwrap_or(0.0);
    if air_raid {
        separation += 2.0;
    }

    let dl = defense.active(Position::Dl, 3);
    let ol = offense.active(Position::Ol, 5);
    let rush = matchup::unit_rating(defense, &dl, PASS_RUSH);
    let mut protection = matchup::unit_rating(offense, &ol, PASS_PROTECT);
    protection += match snap.scheme {
        Scheme::AirRaid => 2.0,
        Scheme::Smashmouth => -3.0,
        Scheme::Balanced => 0.0,
    };
    protection = unit_modify(ol.iter().map(|&i| &offense.player(i).traits), TraitHook::PassBlock, protection);
    let pressure = Matchup::new(rush / 2.0, protection / 2.0)
        .adjust(-snap.strategy)
        .margin(rng);

    let target = match target {
        Some(t) if pressure <= PRESSURE_MARGIN => t,
        _ => return pocket_collapse(l, snap, rng),
    };

    let receiver_ref = l.ctx.off(target.receiver);
    let defender_ref = l.ctx.def(target.defender);
    let receiver = l.ctx.player(receiver_ref);
    let defender = l.ctx.player(defender_ref);
    let state = l.ctx.state;

    l.credit(qb_ref, Stat::PassAtt, 1);
    let mut accuracy = qb.attr(Attribute::Accuracy) * 0.5;
    if air_raid {
        accuracy += 5.0;
    }
    accuracy += offense.coach.game_bonus(BonusContext::QbAttributes, rng);
    let hands = receiver
        .traits
        .modify(TraitHook::Catching, receiver.attr(Attribute::Catching) * 0.5);
    let mut catch = (60.0 + accuracy + hands + separation * 1.5).clamp(40.0, 99.0);
    if state.down == 3 && state.distance < 5 {
        catch = receiver.traits.modify(TraitHook::ShortThirdDownCatch, catch);
    }

    let roll = f64::from(rng.gen_range(1..=100));
    if roll <= catch {
        let drop = receiver.traits.modify(TraitHook::DropChance, 3.0);
        if f64::from(rng.gen_range(0..=100)) < drop {
            l.exert(qb_ref, 5, 0.1, rng);
            let text = format!("Incomplete. {} DROPPED the pass!", receiver.last_name);
            let seconds = scrimmage_time(&l, 15);
            return l.finish(Action::Drop, Resolution::Yardage, 0, seconds, text);
        }
    } else {
        l.exert(qb_ref, 5, 0.1, rng);
        let text = format!("Incomplete pass to {}.", receiver.last_name);
        let seconds = scrimmage_time(&l, 15);
        return l.finish(Action::Incompletion, Resolution::Yardage, 0, seconds, text);
    }

    let risky = separation < -5.0;
    let read_bar = qb.traits.modify(TraitHook::ReadThreshold, qb.attr(Attribute::Awareness));
    let bad_read = f64::from(rng.gen_range(0..=100)) > read_bar;
    let mut pick_six = defender
        .traits
        .modify(TraitHook::InterceptChance, defender.attr(Attribute::Awareness) * 0.16);
    let mastermind = defense.coach.game_bonus(BonusContext::IntChanceDefense, rng);
    if mastermind > 0.0 {
        pick_six *= 1.0 + mastermind / 100.0;
    }
    if (risky || bad_read) && f64::from(rng.gen_range(1..=100)) < pick_six {
        l.credit(defender_ref, Stat::IntMade, 1);
        l.credit(qb_ref, Stat::PassInt, 1);
        let text = format!("INTERCEPTED by {}!", defender.last_name);
        return l.turnover(Turnover::Interception, Action::Interception, 20, text);
    }

    l.credit(qb_ref, Stat::PassCmp, 1);
    l.credit(receiver_ref, Stat::RecCat, 1);

    let mut after_catch = 0;
    if receiver.attr(Attribute::Speed) > defender.attr(Attribute::Speed) {
        after_catch = rng.gen_range(1..=8);
        if rng.gen::<f64>() < 0.1 {
            after_catch += rng.gen_range(10..=25);
        }
    }
    after_catch += receiver.traits.roll_bonus(TraitHook::YardsAfterCatch, rng);
    let yards = (l.play.air_yards() + after_catch + rng.gen_range(-2..=5)).max(1);

    l.credit(receiver_ref, Stat::RecYds, yards);
    l.credit(qb_ref, Stat::PassYds, yards);
    l.exert(qb_ref, 5, 0.1, rng);
    l.exert(receiver_ref, 10, 1.0, rng);

    let tackler = if rng.gen::<f64>() < 0.3 {
        pick(&defense.active(Position::Lb, 3), rng).map(|i| l.ctx.def(i))
    } else {
        Some(defender_ref)
    };
    if let Some(t) = tackler {
        l.credit(t, Stat::Tackles, 1);
        l.exert(t, 8, 1.0, rng);
    }
    l.touchdown_credits.push((qb_ref, Stat::PassTd));
    l.touchdown_credits.push((receiver_ref, Stat::RecTd));

    let text = format!("Pass to {} for {} yds.{}", receiver.last_name, yards, snap.tag);
    let seconds = scrimmage_time(&l, l.play.base_time() + 5);
    l.finish(Action::Completion, Resolution::Yardage, yards, seconds, text)
}

/// Pressure got home or nobody was open: scramble or take the sack.
fn pocket_collapse<R: Rng + ?Sized>(mut l: Ledger<'_>, snap: &Snap, rng: &mut R) -> PlayOutcome {
    let qb_ref = snap.qb;
    let qb = l.ctx.player(qb_ref);

    let escape = qb.traits.modify(
        TraitHook::Escape,
        qb.attr(Attribute::Speed) * 0.6 + qb.attr(Attribute::Agility) * 0.4,
    );
    if escape > f64::from(rng.gen_range(0..=100) + 30) {
        let ceiling = (qb.attr(Attribute::Speed) / 6.0) as i32 + 2;
        let yards = rng.gen_range(1..=ceiling);
        l.credit(qb_ref, Stat::RushAtt, 1);
        l.credit(qb_ref, Stat::RushYds, yards);
        l.exert(qb_ref, 15, 3.0, rng);
        l.touchdown_credits.push((qb_ref, Stat::RushTd));
        let text = format!("Pressure! {} scrambles for {} yds.", qb.last_name, yards);
        let seconds = scrimmage_time(&l, 25);
        return l.finish(Action::Scramble, Resolution::Yardage, yards, seconds, text);
    }

    let rushers = l.ctx.defense.active(Position::Dl, 3);
    let sacker = pick(&rushers, rng).map(|i| l.ctx.def(i));
    let sacker_name = sacker
        .map(|s| l.ctx.player(s).last_name.as_str())
        .unwrap_or("the rush");
    let loss = rng.gen_range(2..=9);

    l.credit(qb_ref, Stat::SacksTaken, 1);
    if let Some(s) = sacker {
        l.credit(s, Stat::Sacks, 1);
    }

    if rng.gen::<f64>() < 0.05 {
        l.credit(qb_ref, Stat::Fumbles, 1);
        let text = format!("STRIP SACK! {} knocks it loose! Defense ball.", sacker_name);
        return l.turnover(Turnover::StripSack, Action::StripSack, 30, text);
    }

    l.exert(qb_ref, 20, 5.0, rng);
    let text = format!("SACK! {} drops QB for -{}.", sacker_name, loss);
    let seconds = scrimmage_time(&l, 45);
    l.finish(Action::Sack, Resolution::Yardage, -loss, seconds, text)
}
