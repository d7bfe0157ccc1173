//! Quick-time events
//!
//! Each QTE is a small tick-driven state machine with a fixed wall-clock
//! budget. Exactly one QTE is ever active: the combat phase owns the live
//! `QteState`, so starting a new one drops the old state and its pending
//! listeners with it.
//!
//! `advance` yields the normalized performance score once, when the event
//! resolves (by input or by timeout).

use rand::Rng;
use serde::Serialize;

use crate::consts::*;

/// Directional symbols for the sequence QTE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "w" | "W" | "up" => Some(Self::Up),
            "s" | "S" | "down" => Some(Self::Down),
            "a" | "A" | "left" => Some(Self::Left),
            "d" | "D" | "right" => Some(Self::Right),
            _ => None,
        }
    }

    fn sample(rng: &mut impl Rng) -> Self {
        match rng.random_range(0..4) {
            0 => Self::Up,
            1 => Self::Down,
            2 => Self::Left,
            _ => Self::Right,
        }
    }
}

/// Keyboard input relevant to the active QTE, for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct QteInput {
    /// Mash presses registered this tick
    pub mash_presses: u8,
    /// Confirm/space pressed this tick (timing QTEs)
    pub confirm: bool,
    /// Directional key pressed this tick (sequence QTE)
    pub dir: Option<Dir>,
}

/// QTE flavor, selected by the equipped weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QteKind {
    Mash,
    Timing,
    DefendTiming,
    Sequence,
}

/// Live state of the active quick-time event
#[derive(Debug, Clone)]
pub enum QteState {
    /// Count presses against a target inside a fixed window; score is
    /// presses/target, deliberately uncapped above 1.0.
    Mash { elapsed: f32, presses: u32 },
    /// A marker sweeps the bar once; a single press samples its distance
    /// from the sweet-spot center.
    Timing { marker: f32 },
    /// Same sweep, scored on distance from the bar's absolute center.
    DefendTiming { marker: f32 },
    /// Press four symbols in order before the window closes.
    Sequence {
        symbols: [Dir; SEQUENCE_LEN],
        matched: usize,
        elapsed: f32,
    },
}

impl QteState {
    pub fn new(kind: QteKind, rng: &mut impl Rng) -> Self {
        match kind {
            QteKind::Mash => Self::Mash {
                elapsed: 0.0,
                presses: 0,
            },
            QteKind::Timing => Self::Timing {
                marker: -BAR_HALF_WIDTH,
            },
            QteKind::DefendTiming => Self::DefendTiming {
                marker: -BAR_HALF_WIDTH,
            },
            QteKind::Sequence => Self::Sequence {
                symbols: std::array::from_fn(|_| Dir::sample(rng)),
                matched: 0,
                elapsed: 0.0,
            },
        }
    }

    pub fn kind(&self) -> QteKind {
        match self {
            Self::Mash { .. } => QteKind::Mash,
            Self::Timing { .. } => QteKind::Timing,
            Self::DefendTiming { .. } => QteKind::DefendTiming,
            Self::Sequence { .. } => QteKind::Sequence,
        }
    }

    /// Advance the event by one tick. Returns the performance score when it
    /// resolves; the caller drops the state at that point.
    pub fn advance(&mut self, input: &QteInput, dt: f32) -> Option<f32> {
        match self {
            Self::Mash { elapsed, presses } => {
                *presses += u32::from(input.mash_presses);
                *elapsed += dt;
                if *elapsed >= MASH_WINDOW_SECS {
                    Some(*presses as f32 / MASH_TARGET as f32)
                } else {
                    None
                }
            }
            Self::Timing { marker } => {
                if input.confirm {
                    let dist = (*marker - SWEET_SPOT_CENTER).abs();
                    return Some((1.0 - dist / TIMING_FALLOFF).max(0.0));
                }
                *marker += MARKER_SPEED * dt;
                if *marker > BAR_HALF_WIDTH {
                    Some(0.0)
                } else {
                    None
                }
            }
            Self::DefendTiming { marker } => {
                if input.confirm {
                    let dist = marker.abs();
                    return Some((1.0 - dist / BAR_HALF_WIDTH).max(0.0));
                }
                *marker += MARKER_SPEED * dt;
                if *marker > BAR_HALF_WIDTH {
                    Some(0.0)
                } else {
                    None
                }
            }
            Self::Sequence {
                symbols,
                matched,
                elapsed,
            } => {
                if let Some(dir) = input.dir {
                    // Wrong presses are ignored, not penalized
                    if *matched < symbols.len() && dir == symbols[*matched] {
                        *matched += 1;
                        if *matched == symbols.len() {
                            let score = 1.0 - *elapsed / SEQUENCE_WINDOW_SECS;
                            return Some(score.max(SEQUENCE_FLOOR));
                        }
                    }
                }
                *elapsed += dt;
                if *elapsed >= SEQUENCE_WINDOW_SECS {
                    // Partial credit, halved
                    Some(*matched as f32 / symbols.len() as f32 * 0.5)
                } else {
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    fn press(dir: Dir) -> QteInput {
        QteInput {
            dir: Some(dir),
            ..Default::default()
        }
    }

    /// Tick with no input until the event times out.
    fn run_out(qte: &mut QteState) -> f32 {
        for _ in 0..10_000 {
            if let Some(score) = qte.advance(&QteInput::default(), SIM_DT) {
                return score;
            }
        }
        panic!("QTE never resolved");
    }

    #[test]
    fn test_mash_overflow_is_uncapped() {
        let mut qte = QteState::new(QteKind::Mash, &mut rng());
        // 25 presses against a target of 20
        for _ in 0..25 {
            qte.advance(
                &QteInput {
                    mash_presses: 1,
                    ..Default::default()
                },
                SIM_DT,
            );
        }
        let score = run_out(&mut qte);
        assert!((score - 1.25).abs() < 1e-6);
    }

    #[test]
    fn test_mash_no_presses_scores_zero() {
        let mut qte = QteState::new(QteKind::Mash, &mut rng());
        assert_eq!(run_out(&mut qte), 0.0);
    }

    #[test]
    fn test_timing_sweet_spot_center_is_perfect() {
        let mut qte = QteState::Timing {
            marker: SWEET_SPOT_CENTER,
        };
        let score = qte
            .advance(
                &QteInput {
                    confirm: true,
                    ..Default::default()
                },
                SIM_DT,
            )
            .expect("press resolves");
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_timing_far_press_scores_zero() {
        let mut qte = QteState::Timing {
            marker: SWEET_SPOT_CENTER - 120.0,
        };
        let score = qte
            .advance(
                &QteInput {
                    confirm: true,
                    ..Default::default()
                },
                SIM_DT,
            )
            .expect("press resolves");
        assert_eq!(score, 0.0, "distance >= 100 scores zero");
    }

    #[test]
    fn test_timing_sweep_out_scores_zero() {
        let mut qte = QteState::new(QteKind::Timing, &mut rng());
        assert_eq!(run_out(&mut qte), 0.0);
    }

    #[test]
    fn test_defend_center_and_edge() {
        let mut center = QteState::DefendTiming { marker: 0.0 };
        let confirm = QteInput {
            confirm: true,
            ..Default::default()
        };
        assert_eq!(center.advance(&confirm, SIM_DT), Some(1.0));

        let mut edge = QteState::DefendTiming {
            marker: BAR_HALF_WIDTH,
        };
        assert_eq!(edge.advance(&confirm, SIM_DT), Some(0.0));
    }

    #[test]
    fn test_sequence_instant_completion_is_perfect() {
        let mut qte = QteState::new(QteKind::Sequence, &mut rng());
        let symbols = match &qte {
            QteState::Sequence { symbols, .. } => *symbols,
            _ => unreachable!(),
        };
        let mut score = None;
        for dir in symbols {
            score = qte.advance(&press(dir), SIM_DT);
        }
        let score = score.expect("completing the sequence resolves");
        assert!(score > 0.99);
    }

    #[test]
    fn test_sequence_partial_credit_on_timeout() {
        let mut qte = QteState::new(QteKind::Sequence, &mut rng());
        let symbols = match &qte {
            QteState::Sequence { symbols, .. } => *symbols,
            _ => unreachable!(),
        };
        // 2 of 4 correct, then let the window expire
        assert!(qte.advance(&press(symbols[0]), SIM_DT).is_none());
        assert!(qte.advance(&press(symbols[1]), SIM_DT).is_none());
        let score = run_out(&mut qte);
        assert!((score - 0.25).abs() < 1e-6, "2/4 * 0.5 = 0.25");
    }

    #[test]
    fn test_sequence_wrong_press_is_ignored() {
        let mut qte = QteState::Sequence {
            symbols: [Dir::Up, Dir::Up, Dir::Up, Dir::Up],
            matched: 0,
            elapsed: 0.0,
        };
        assert!(qte.advance(&press(Dir::Left), SIM_DT).is_none());
        match &qte {
            QteState::Sequence { matched, .. } => assert_eq!(*matched, 0),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_sequence_slow_completion_hits_floor() {
        let mut qte = QteState::Sequence {
            symbols: [Dir::Up, Dir::Up, Dir::Up, Dir::Up],
            matched: 3,
            elapsed: SEQUENCE_WINDOW_SECS - 0.1,
        };
        let score = qte.advance(&press(Dir::Up), SIM_DT).expect("resolves");
        assert_eq!(score, SEQUENCE_FLOOR);
    }
}
