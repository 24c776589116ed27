//! Signal planning — pattern matching, bet resolution and the timing gate.

pub mod matcher;
pub mod resolver;
pub mod timing;

use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{debug, info};

use crate::history::HistoryStore;
use crate::storage::Catalog;
use crate::types::{Round, Side};
use resolver::NoDecision;
use timing::TimingGate;

// ---------------------------------------------------------------------------
// Decision log
// ---------------------------------------------------------------------------

/// An approved recommendation for the upcoming round.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub pattern_id: String,
    pub side: Side,
    /// Round whose arrival completed the pattern.
    pub trigger_round_id: String,
}

/// Record of what the planner did with one round, including the passes.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Signal approved; the caller opens a bet and announces it.
    Signalled(Signal),
    /// A bet is outstanding, so matching was not attempted.
    Busy,
    /// No catalog pattern matches the tail of history.
    NoMatch,
    /// A pattern matched but resolved to no side.
    NoDecision { pattern_id: String, reason: NoDecision },
    /// A pattern matched but the betting window is too close to closing.
    WindowClosed { pattern_id: String, side: Side },
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Signalled(s) => write!(f, "signal {} on pattern {}", s.side, s.pattern_id),
            Decision::Busy => write!(f, "busy"),
            Decision::NoMatch => write!(f, "no match"),
            Decision::NoDecision { pattern_id, reason } => {
                write!(f, "pattern {pattern_id} undecided ({reason:?})")
            }
            Decision::WindowClosed { pattern_id, side } => {
                write!(f, "pattern {pattern_id} → {side} too late")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Planner
// ---------------------------------------------------------------------------

/// Pipelines matcher → resolver → timing gate for one round.
///
/// Owns the catalog for the process lifetime; holds no per-round state.
pub struct SignalPlanner {
    catalog: Catalog,
    gate: TimingGate,
}

impl SignalPlanner {
    pub fn new(catalog: Catalog, gate: TimingGate) -> Self {
        Self { catalog, gate }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Decide whether `round` (already appended to `history`) triggers a
    /// signal. `busy` is true while a bet or its gale is outstanding.
    pub fn plan(
        &self,
        history: &HistoryStore,
        round: &Round,
        now: DateTime<Utc>,
        busy: bool,
    ) -> Decision {
        if busy {
            debug!(round_id = %round.id, "Bet outstanding, skipping pattern check");
            return Decision::Busy;
        }

        let Some(pattern) = matcher::match_history(history, &self.catalog) else {
            return Decision::NoMatch;
        };
        info!(pattern_id = %pattern.id, pattern = %pattern, round_id = %round.id, "Pattern detected");

        let side = match resolver::resolve(pattern) {
            Ok(side) => side,
            Err(reason) => {
                return Decision::NoDecision {
                    pattern_id: pattern.id.clone(),
                    reason,
                }
            }
        };

        if !self.gate.approves(round.started_at, now) {
            info!(
                pattern_id = %pattern.id,
                %side,
                elapsed_secs = (now - round.started_at).num_milliseconds() as f64 / 1000.0,
                window_secs = self.gate.window().num_seconds(),
                "Betting window closing, signal dropped"
            );
            return Decision::WindowClosed {
                pattern_id: pattern.id.clone(),
                side,
            };
        }

        Decision::Signalled(Signal {
            pattern_id: pattern.id.clone(),
            side,
            trigger_round_id: round.id.clone(),
        })
    }
}
