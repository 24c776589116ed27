//! Bet lifecycle and streak tracking.
//!
//! ```text
//!   Idle ──signal──▶ Pending ──win/tie──▶ Idle (streak+1)
//!                       │
//!                      loss
//!                       ▼
//!                   GaleArmed ──win/tie──▶ Idle (streak+1)
//!                       │
//!                      loss ─────────────▶ Idle (streak=0)
//! ```
//!
//! At most one bet is tracked at a time. The tracker is the only owner of
//! this state; every transition happens inside a single method call.

use std::fmt;
use tracing::{debug, info};

use crate::strategy::Signal;
use crate::types::{Side, Symbol};

/// A bet that has been announced and not yet settled.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveBet {
    pub pattern_id: String,
    pub side: Side,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum BetPhase {
    #[default]
    Idle,
    Pending(ActiveBet),
    /// First loss absorbed; the same side rides one more round.
    GaleArmed(ActiveBet),
}

impl fmt::Display for BetPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetPhase::Idle => write!(f, "idle"),
            BetPhase::Pending(b) => write!(f, "pending {} (#{})", b.side, b.pattern_id),
            BetPhase::GaleArmed(b) => write!(f, "gale {} (#{})", b.side, b.pattern_id),
        }
    }
}

/// Result of settling an outstanding bet against a resolved round.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    /// Won (or tied) on the first attempt or on the gale.
    Win {
        bet: ActiveBet,
        outcome: Symbol,
        on_gale: bool,
        streak: u32,
    },
    /// First loss; the gale is now armed.
    GaleEntered { bet: ActiveBet, outcome: Symbol },
    /// Lost the gale too; streak reset.
    GaleLost { bet: ActiveBet, outcome: Symbol },
}

impl Settlement {
    pub fn bet(&self) -> &ActiveBet {
        match self {
            Settlement::Win { bet, .. }
            | Settlement::GaleEntered { bet, .. }
            | Settlement::GaleLost { bet, .. } => bet,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BetTracker {
    phase: BetPhase,
    streak: u32,
}

impl BetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &BetPhase {
        &self.phase
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn gale_active(&self) -> bool {
        matches!(self.phase, BetPhase::GaleArmed(_))
    }

    /// True while a bet or its gale is outstanding.
    pub fn is_busy(&self) -> bool {
        !matches!(self.phase, BetPhase::Idle)
    }

    pub fn active_bet(&self) -> Option<&ActiveBet> {
        match &self.phase {
            BetPhase::Idle => None,
            BetPhase::Pending(b) | BetPhase::GaleArmed(b) => Some(b),
        }
    }

    /// Open a bet from an approved signal. Ignored unless idle.
    pub fn open(&mut self, signal: &Signal) -> bool {
        if self.is_busy() {
            debug!(pattern_id = %signal.pattern_id, phase = %self.phase, "Bet outstanding, signal ignored");
            return false;
        }
        self.phase = BetPhase::Pending(ActiveBet {
            pattern_id: signal.pattern_id.clone(),
            side: signal.side,
        });
        info!(pattern_id = %signal.pattern_id, side = %signal.side, "Bet opened");
        true
    }

    /// Settle the outstanding bet against a resolved round outcome.
    /// Returns `None` when idle.
    pub fn settle(&mut self, outcome: Symbol) -> Option<Settlement> {
        let phase = std::mem::take(&mut self.phase);
        let settlement = match phase {
            BetPhase::Idle => return None,
            BetPhase::Pending(bet) if bet.side.wins_on(outcome) => {
                self.streak += 1;
                Settlement::Win { bet, outcome, on_gale: false, streak: self.streak }
            }
            BetPhase::Pending(bet) => {
                self.phase = BetPhase::GaleArmed(bet.clone());
                Settlement::GaleEntered { bet, outcome }
            }
            BetPhase::GaleArmed(bet) if bet.side.wins_on(outcome) => {
                self.streak += 1;
                Settlement::Win { bet, outcome, on_gale: true, streak: self.streak }
            }
            BetPhase::GaleArmed(bet) => {
                self.streak = 0;
                Settlement::GaleLost { bet, outcome }
            }
        };

        info!(
            pattern_id = %settlement.bet().pattern_id,
            side = %settlement.bet().side,
            %outcome,
            streak = self.streak,
            phase = %self.phase,
            "Bet settled"
        );
        Some(settlement)
    }
}
