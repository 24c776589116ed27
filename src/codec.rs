//! Outcome codec.
//!
//! Maps the round payload published by the results feed onto a classified
//! [`Round`]. Anything that cannot be classified is rejected here and never
//! reaches history.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::{CodecError, Round, Symbol};

/// `data.status` value of a settled round.
const RESOLVED_STATUS: &str = "Resolved";

// ---------------------------------------------------------------------------
// Wire types (feed JSON → Rust)
// ---------------------------------------------------------------------------

/// Latest-round record as returned by the feed. Only the fields we use are
/// deserialized; all of them are optional so that malformation surfaces as
/// a [`CodecError`] rather than a transport error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRound {
    pub id: String,
    #[serde(default)]
    pub data: RawRoundData,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRoundData {
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub result: Option<RawResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawResult {
    #[serde(default)]
    pub outcome: Option<String>,
}

impl RawRound {
    /// Convenience constructor used by tests and replay tooling.
    pub fn new(id: &str, outcome: &str, started_at: DateTime<Utc>, resolved: bool) -> Self {
        Self {
            id: id.to_string(),
            data: RawRoundData {
                started_at: Some(started_at.to_rfc3339()),
                status: Some(if resolved { RESOLVED_STATUS } else { "InProgress" }.to_string()),
                result: Some(RawResult {
                    outcome: Some(outcome.to_string()),
                }),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Map a feed outcome string to a symbol.
pub fn classify_outcome(outcome: &str) -> Result<Symbol, CodecError> {
    match outcome {
        "BankerWon" => Ok(Symbol::Banker),
        "PlayerWon" => Ok(Symbol::Player),
        "Tie" => Ok(Symbol::Tie),
        other => Err(CodecError::UnknownOutcome(other.to_string())),
    }
}

/// Parse the feed's `startedAt` field (RFC 3339, UTC, fractional seconds).
pub fn parse_started_at(value: &str) -> Result<DateTime<Utc>, CodecError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CodecError::BadTimestamp {
            value: value.to_string(),
            message: e.to_string(),
        })
}

/// Whether the feed has settled this round. An in-progress record carries
/// no result yet, so this is checked before [`decode_round`].
pub fn is_resolved(raw: &RawRound) -> bool {
    raw.data.status.as_deref() == Some(RESOLVED_STATUS)
}

/// Classify a raw record into a [`Round`].
pub fn decode_round(raw: &RawRound) -> Result<Round, CodecError> {
    let outcome = raw
        .data
        .result
        .as_ref()
        .and_then(|r| r.outcome.as_deref())
        .ok_or(CodecError::MissingField("data.result.outcome"))?;
    let outcome = classify_outcome(outcome)?;

    let started_at = raw
        .data
        .started_at
        .as_deref()
        .ok_or(CodecError::MissingField("data.startedAt"))?;
    let started_at = parse_started_at(started_at)?;

    Ok(Round {
        id: raw.id.clone(),
        outcome,
        started_at,
        resolved: is_resolved(raw),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
