//! Table monitor — one evaluation pass per poll tick.
//!
//! Owns every piece of mutable process state (history, bet tracker, last
//! seen round id, status slot). Ticks run strictly one after another, so
//! no locking is needed. External calls are bounded by timeouts; a timeout
//! or transport error turns the tick into a no-op.

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::codec::{self, RawRound};
use crate::engine::tracker::{BetTracker, Settlement};
use crate::history::HistoryStore;
use crate::notify::{messages, Notifier, StatusSlot};
use crate::source::RoundSource;
use crate::strategy::{Decision, SignalPlanner};
use crate::types::CodecError;

// ---------------------------------------------------------------------------
// Tick outcome
// ---------------------------------------------------------------------------

/// What a single tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Fetch failed or timed out.
    NoData,
    /// Same round id as the previous tick.
    Duplicate,
    /// Round could not be classified and was dropped.
    Discarded(CodecError),
    /// Round not resolved yet; it is picked up again once it is.
    Awaiting,
    /// Round appended to history and evaluated.
    Processed {
        settlement: Option<Settlement>,
        decision: Decision,
    },
}

impl fmt::Display for TickOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TickOutcome::NoData => write!(f, "no data"),
            TickOutcome::Duplicate => write!(f, "duplicate"),
            TickOutcome::Discarded(e) => write!(f, "discarded: {e}"),
            TickOutcome::Awaiting => write!(f, "awaiting resolution"),
            TickOutcome::Processed { settlement, decision } => match settlement {
                Some(s) => write!(f, "settled {:?}; {decision}", s),
                None => write!(f, "{decision}"),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Monitor
// ---------------------------------------------------------------------------

/// Timeouts applied around the external collaborators.
#[derive(Debug, Clone, Copy)]
pub struct MonitorTimeouts {
    pub fetch: Duration,
    pub notify: Duration,
}

impl Default for MonitorTimeouts {
    fn default() -> Self {
        Self {
            fetch: Duration::from_secs(5),
            notify: Duration::from_secs(5),
        }
    }
}

pub struct Monitor {
    source: Box<dyn RoundSource>,
    notifier: Box<dyn Notifier>,
    planner: SignalPlanner,
    history: HistoryStore,
    tracker: BetTracker,
    last_round_id: Option<String>,
    last_discarded_id: Option<String>,
    status: StatusSlot,
    timeouts: MonitorTimeouts,
}

impl Monitor {
    pub fn new(
        source: Box<dyn RoundSource>,
        notifier: Box<dyn Notifier>,
        planner: SignalPlanner,
        history: HistoryStore,
        timeouts: MonitorTimeouts,
    ) -> Self {
        if history.capacity() < planner.catalog().max_len() {
            warn!(
                capacity = history.capacity(),
                longest_pattern = planner.catalog().max_len(),
                "History capacity is shorter than the longest pattern; it can never match"
            );
        }
        Self {
            source,
            notifier,
            planner,
            history,
            tracker: BetTracker::new(),
            last_round_id: None,
            last_discarded_id: None,
            status: StatusSlot::new(),
            timeouts,
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn tracker(&self) -> &BetTracker {
        &self.tracker
    }

    pub fn status(&self) -> &StatusSlot {
        &self.status
    }

    /// Fetch the latest round and evaluate it.
    pub async fn tick(&mut self) -> TickOutcome {
        let fetched = tokio::time::timeout(self.timeouts.fetch, self.source.latest_round()).await;
        let raw = match fetched {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                warn!(source = self.source.name(), error = format!("{e:#}"), "Round fetch failed");
                return TickOutcome::NoData;
            }
            Err(_) => {
                warn!(source = self.source.name(), timeout_secs = self.timeouts.fetch.as_secs(), "Round fetch timed out");
                return TickOutcome::NoData;
            }
        };
        self.process_round(raw, Utc::now()).await
    }

    /// Evaluate one raw round at wall-clock time `now`.
    ///
    /// Order: dedup → wait for resolution → classify → append → settle
    /// outstanding bet → plan a new signal if idle → refresh the status
    /// message. An in-progress record carries no result yet and is neither
    /// classified nor marked as seen; a malformed resolved record is not
    /// marked either, so a corrected version is still processed.
    pub async fn process_round(&mut self, raw: RawRound, now: DateTime<Utc>) -> TickOutcome {
        if self.last_round_id.as_deref() == Some(raw.id.as_str()) {
            debug!(round_id = %raw.id, "Round already processed");
            return TickOutcome::Duplicate;
        }

        if !codec::is_resolved(&raw) {
            debug!(round_id = %raw.id, phase = %self.tracker.phase(), "Round not resolved yet");
            return TickOutcome::Awaiting;
        }

        let round = match codec::decode_round(&raw) {
            Ok(r) => r,
            Err(e) => {
                if self.last_discarded_id.as_deref() == Some(raw.id.as_str()) {
                    debug!(round_id = %raw.id, error = %e, "Round still unclassifiable");
                } else {
                    warn!(round_id = %raw.id, error = %e, "Discarding unclassifiable round");
                    self.last_discarded_id = Some(raw.id);
                }
                return TickOutcome::Discarded(e);
            }
        };

        self.last_round_id = Some(round.id.clone());
        self.history.push(round.clone());
        info!(round = %round, history = self.history.len(), "Round recorded");

        // State transitions are applied before any notification is awaited,
        // so a slow or failing sink never leaves a half-applied tick.
        let settlement = self.tracker.settle(round.outcome);
        let decision = self
            .planner
            .plan(&self.history, &round, now, self.tracker.is_busy());
        if let Decision::Signalled(signal) = &decision {
            self.tracker.open(signal);
        }

        if let Some(s) = &settlement {
            self.notify(&messages::settlement(s)).await;
        }
        if let Decision::Signalled(signal) = &decision {
            self.retract_status().await;
            info!(pattern_id = %signal.pattern_id, side = %signal.side, round_id = %signal.trigger_round_id, "Signal sent");
            self.notify(&messages::signal(signal)).await;
        }
        self.refresh_status().await;

        TickOutcome::Processed { settlement, decision }
    }

    /// Post the monitoring message when idle and none is live.
    async fn refresh_status(&mut self) {
        if self.tracker.is_busy() || self.status.is_occupied() {
            return;
        }
        if let Some(id) = self.notify(messages::MONITORING).await {
            self.status.occupy(id);
        }
    }

    async fn retract_status(&mut self) {
        if !self.status.is_occupied() {
            return;
        }
        let notifier = self.notifier.as_ref();
        if tokio::time::timeout(self.timeouts.notify, self.status.retract(notifier))
            .await
            .is_err()
        {
            warn!(sink = notifier.name(), "Status retraction timed out");
        }
    }

    /// Send a message; failures are logged and swallowed.
    async fn notify(&self, text: &str) -> Option<i64> {
        let sink = self.notifier.name();
        match tokio::time::timeout(self.timeouts.notify, self.notifier.send(text)).await {
            Ok(Ok(id)) => Some(id),
            Ok(Err(e)) => {
                warn!(sink, error = format!("{e:#}"), "Notification failed");
                None
            }
            Err(_) => {
                warn!(sink, "Notification timed out");
                None
            }
        }
    }
}
