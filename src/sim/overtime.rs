//! Overtime sequencing.
//!
//! The period loop is kept apart from the engine so its termination can be
//! exercised without playing football. The engine implements
//! [`OvertimeDriver`]; tests drive it with scripted scores.

use tracing::{info, warn};

use super::outcome::Side;
use super::playcaller::SHOOTOUT_PERIOD;

/// A game still tied after this many periods is called a tie.
pub const MAX_OVERTIME_PERIODS: u32 = 100;

/// Order in which teams possess within a period.
pub const POSSESSION_ORDER: [Side; 2] = [Side::Away, Side::Home];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OvertimeFormat {
    /// One full possession per team from the opponent's 25.
    Possessions,
    /// One snap per team from the 3, scored as a two-point try.
    Shootout,
}

impl OvertimeFormat {
    pub fn for_period(period: u32) -> Self {
        if period >= SHOOTOUT_PERIOD {
            OvertimeFormat::Shootout
        } else {
            OvertimeFormat::Possessions
        }
    }
}

pub trait OvertimeDriver {
    fn is_tied(&self) -> bool;

    /// Called once at the start of each period.
    fn begin_period(&mut self, period: u32, format: OvertimeFormat);

    /// Play a full drive for `side`; returns when the possession ends.
    fn run_possession(&mut self, side: Side);

    /// Run a single conversion snap for `side`.
    fn run_conversion(&mut self, side: Side);
}

/// Play overtime periods until the score is no longer tied or
/// `max_periods` have been played. Returns the number of periods played.
pub fn play_overtime<D: OvertimeDriver + ?Sized>(driver: &mut D, max_periods: u32) -> u32 {
    let mut period = 0;
    while driver.is_tied() {
        if period >= max_periods {
            warn!("Still tied after {} overtime periods, calling it a tie", period);
            break;
        }
        period += 1;
        let format = OvertimeFormat::for_period(period);
        info!("Overtime period {} ({:?})", period, format);
        driver.begin_period(period, format);

        for side in POSSESSION_ORDER {
            match format {
                OvertimeFormat::Possessions => driver.run_possession(side),
                OvertimeFormat::Shootout => driver.run_conversion(side),
            }
        }
    }
    period
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scores a fixed number of points per possession or conversion, taken
    /// from per-period scripts.
    struct Scripted {
        score: [u32; 2],
        possessions: Vec<(u32, u32)>,
        conversions: Vec<(u32, u32)>,
        period: u32,
        formats: Vec<OvertimeFormat>,
        calls: Vec<(u32, Side)>,
    }

    impl Scripted {
        fn new(possessions: Vec<(u32, u32)>, conversions: Vec<(u32, u32)>) -> Self {
            Self {
                score: [21, 21],
                possessions,
                conversions,
                period: 0,
                formats: Vec::new(),
                calls: Vec::new(),
            }
        }

        fn points(script: &[(u32, u32)], index: usize, side: Side) -> u32 {
            script
                .get(index)
                .map(|&(away, home)| if side == Side::Away { away } else { home })
                .unwrap_or(0)
        }
    }

    impl OvertimeDriver for Scripted {
        fn is_tied(&self) -> bool {
            self.score[0] == self.score[1]
        }

        fn begin_period(&mut self, period: u32, format: OvertimeFormat) {
            self.period = period;
            self.formats.push(format);
        }

        fn run_possession(&mut self, side: Side) {
            self.calls.push((self.period, side));
            let idx = (self.period - 1) as usize;
            self.score[side.index()] += Self::points(&self.possessions, idx, side);
        }

        fn run_conversion(&mut self, side: Side) {
            self.calls.push((self.period, side));
            let idx = (self.period - SHOOTOUT_PERIOD) as usize;
            self.score[side.index()] += Self::points(&self.conversions, idx, side);
        }
    }

    #[test]
    fn untied_game_skips_overtime() {
        let mut d = Scripted::new(vec![], vec![]);
        d.score = [24, 21];
        assert_eq!(play_overtime(&mut d, MAX_OVERTIME_PERIODS), 0);
        assert!(d.calls.is_empty());
    }

    #[test]
    fn first_period_decides() {
        let mut d = Scripted::new(vec![(7, 3)], vec![]);
        assert_eq!(play_overtime(&mut d, MAX_OVERTIME_PERIODS), 1);
        assert_eq!(d.calls, vec![(1, Side::Away), (1, Side::Home)]);
        assert_eq!(d.score, [24, 28]);
    }

    #[test]
    fn matched_periods_proceed_to_shootout() {
        let mut d = Scripted::new(vec![(7, 7), (3, 3)], vec![(2, 2), (0, 0), (0, 2)]);
        let periods = play_overtime(&mut d, MAX_OVERTIME_PERIODS);
        assert_eq!(periods, 5);
        assert_eq!(
            d.formats,
            vec![
                OvertimeFormat::Possessions,
                OvertimeFormat::Possessions,
                OvertimeFormat::Shootout,
                OvertimeFormat::Shootout,
                OvertimeFormat::Shootout,
            ]
        );
        assert!(!d.is_tied());
    }

    #[test]
    fn both_teams_always_get_their_turn() {
        // Away scores first but home still gets its conversion.
        let mut d = Scripted::new(vec![(0, 0), (0, 0)], vec![(2, 0)]);
        play_overtime(&mut d, MAX_OVERTIME_PERIODS);
        assert_eq!(d.calls.last(), Some(&(3, Side::Home)));
    }

    #[test]
    fn endless_tie_stops_at_cap() {
        let mut d = Scripted::new(vec![], vec![]);
        assert_eq!(play_overtime(&mut d, 20), 20);
        assert!(d.is_tied());
        assert_eq!(d.calls.len(), 40);
    }
}
