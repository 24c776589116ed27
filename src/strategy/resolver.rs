//! Bet resolution: matched pattern → side.

use tracing::warn;

use crate::types::{ActionCode, Pattern, Side};

/// Why a matched pattern produced no side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoDecision {
    /// The catalog entry names an action this build does not know.
    UnrecognizedAction(String),
    /// The rule reads more symbols than the sequence has.
    SequenceTooShort,
}

/// Resolve the side for a matched pattern. Pure apart from the warning:
/// the same pattern always yields the same answer.
pub fn resolve(pattern: &Pattern) -> Result<Side, NoDecision> {
    let outcome = match &pattern.action {
        ActionCode::Known(action) => action
            .side_for(&pattern.sequence)
            .ok_or(NoDecision::SequenceTooShort),
        ActionCode::Unrecognized(code) => Err(NoDecision::UnrecognizedAction(code.clone())),
    };

    if let Err(reason) = &outcome {
        warn!(pattern_id = %pattern.id, action = %pattern.action, ?reason, "Matched pattern has no decision; signal suppressed");
    }
    outcome
}
