//! Shared types for the table monitor.
//!
//! These types form the data model used across all modules: classified
//! rounds, the betting side, catalog patterns and their action codes.
//! They carry no I/O so that codec, strategy and engine modules can
//! depend on them without circular references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Symbols and sides
// ---------------------------------------------------------------------------

/// Classified outcome of one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    Banker,
    Player,
    Tie,
}

impl Symbol {
    /// Emoji used in catalog files and chat messages.
    pub fn emoji(&self) -> &'static str {
        match self {
            Symbol::Banker => "🔴",
            Symbol::Player => "🔵",
            Symbol::Tie => "🟡",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.emoji())
    }
}

/// Parse a catalog symbol: the emoji or the outcome name (case-insensitive).
impl std::str::FromStr for Symbol {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "🔴" | "banker" => Ok(Symbol::Banker),
            "🔵" | "player" => Ok(Symbol::Player),
            "🟡" | "tie" => Ok(Symbol::Tie),
            _ => Err(anyhow::anyhow!("Unknown symbol: {s}")),
        }
    }
}

/// Side a signal recommends. Ties are never bet on directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Banker,
    Player,
}

impl Side {
    /// The opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Banker => Side::Player,
            Side::Player => Side::Banker,
        }
    }

    /// The symbol a round must show for this side to win outright.
    pub fn symbol(&self) -> Symbol {
        match self {
            Side::Banker => Symbol::Banker,
            Side::Player => Symbol::Player,
        }
    }

    /// Whether a bet on this side survives the given outcome.
    /// A tie always counts in the bettor's favour (protected tie).
    pub fn wins_on(&self, outcome: Symbol) -> bool {
        outcome == Symbol::Tie || outcome == self.symbol()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Banker => write!(f, "Banker"),
            Side::Player => write!(f, "Player"),
        }
    }
}

// ---------------------------------------------------------------------------
// Round
// ---------------------------------------------------------------------------

/// One classified round, as admitted into history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: String,
    pub outcome: Symbol,
    pub started_at: DateTime<Utc>,
    pub resolved: bool,
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "round {} {} (started {}{})",
            self.id,
            self.outcome,
            self.started_at.format("%H:%M:%S"),
            if self.resolved { ", resolved" } else { "" },
        )
    }
}

// ---------------------------------------------------------------------------
// Patterns and actions
// ---------------------------------------------------------------------------

/// Betting rule attached to a pattern. Each variant is a pure function of
/// the pattern's own sequence; see [`Action::side_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    FollowLast,
    OppositeOfLast,
    Against,
    FollowOpener,
    FollowBreakout,
    FollowAlternation,
    FollowNewColour,
    AlwaysBanker,
    AlwaysPlayer,
    SkipTieBanker,
    BackToPlayer,
    FollowPairs,
    FollowCycle,
    FreshStart,
    FollowDouble,
}

impl Action {
    /// All known actions (useful for iteration).
    pub const ALL: &'static [Action] = &[
        Action::FollowLast,
        Action::OppositeOfLast,
        Action::Against,
        Action::FollowOpener,
        Action::FollowBreakout,
        Action::FollowAlternation,
        Action::FollowNewColour,
        Action::AlwaysBanker,
        Action::AlwaysPlayer,
        Action::SkipTieBanker,
        Action::BackToPlayer,
        Action::FollowPairs,
        Action::FollowCycle,
        Action::FreshStart,
        Action::FollowDouble,
    ];

    /// Catalog code for this action, as written in `patterns.json`.
    pub fn code(&self) -> &'static str {
        match self {
            Action::FollowLast => "Entrar a favor",
            Action::OppositeOfLast => "Entrar no oposto do último",
            Action::Against => "Entrar contra",
            Action::FollowOpener => "Entrar no lado que inicia",
            Action::FollowBreakout => "Seguir rompimento",
            Action::FollowAlternation => "Seguir alternância",
            Action::FollowNewColour => "Seguir nova cor",
            Action::AlwaysBanker => "Seguir 🔴",
            Action::AlwaysPlayer => "Seguir 🔵",
            Action::SkipTieBanker => "Ignorar Tie e seguir 🔴",
            Action::BackToPlayer => "Voltar para 🔵",
            Action::FollowPairs => "Seguir pares",
            Action::FollowCycle => "Seguir ciclo",
            Action::FreshStart => "Novo início",
            Action::FollowDouble => "Seguir padrão 2x",
        }
    }

    /// Look up an action by its catalog code.
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Action::ALL.iter().copied().find(|a| a.code() == code)
    }

    /// Whether the rule reads the second-to-last symbol.
    pub fn needs_two_symbols(&self) -> bool {
        matches!(self, Action::FollowPairs | Action::FollowDouble)
    }

    /// Side recommended for a matched sequence.
    ///
    /// Returns `None` only when the sequence is too short for the rule
    /// (empty, or a single symbol for the rules that read the previous one).
    pub fn side_for(&self, sequence: &[Symbol]) -> Option<Side> {
        let first = *sequence.first()?;
        let last = *sequence.last()?;
        let prev = if sequence.len() >= 2 {
            Some(sequence[sequence.len() - 2])
        } else {
            None
        };

        let pick = |cond: bool, yes: Side| if cond { yes } else { yes.opposite() };

        let side = match self {
            Action::FollowLast => pick(last == Symbol::Banker, Side::Banker),
            Action::OppositeOfLast | Action::Against | Action::FollowAlternation => {
                pick(last == Symbol::Banker, Side::Player)
            }
            Action::FollowOpener | Action::FollowCycle => {
                pick(first == Symbol::Banker, Side::Banker)
            }
            Action::FollowBreakout | Action::FollowNewColour => {
                pick(last == Symbol::Player, Side::Player)
            }
            Action::FreshStart => pick(first == Symbol::Player, Side::Player),
            Action::AlwaysBanker | Action::SkipTieBanker => Side::Banker,
            Action::AlwaysPlayer | Action::BackToPlayer => Side::Player,
            Action::FollowPairs | Action::FollowDouble => pick(prev? == Symbol::Banker, Side::Banker),
        };
        Some(side)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Action code as loaded from the catalog. Unknown codes are kept so the
/// pattern still occupies its priority slot; they never resolve to a side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionCode {
    Known(Action),
    Unrecognized(String),
}

impl From<&str> for ActionCode {
    fn from(code: &str) -> Self {
        match Action::from_code(code) {
            Some(action) => ActionCode::Known(action),
            None => ActionCode::Unrecognized(code.to_string()),
        }
    }
}

impl fmt::Display for ActionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionCode::Known(a) => write!(f, "{a}"),
            ActionCode::Unrecognized(code) => write!(f, "{code} (unrecognized)"),
        }
    }
}

/// A catalog entry. The sequence is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub id: String,
    pub sequence: Vec<Symbol>,
    pub action: ActionCode,
}

impl Pattern {
    /// Build a pattern, rejecting an empty sequence.
    pub fn new(id: impl Into<String>, sequence: Vec<Symbol>, action: ActionCode) -> Option<Self> {
        if sequence.is_empty() {
            return None;
        }
        Some(Self {
            id: id.into(),
            sequence,
            action,
        })
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seq: String = self.sequence.iter().map(|s| s.emoji()).collect();
        write!(f, "#{} {} → {}", self.id, seq, self.action)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Reasons a raw round is rejected before it reaches history.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    #[error("Unrecognized outcome: {0}")]
    UnknownOutcome(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid timestamp {value:?}: {message}")]
    BadTimestamp { value: String, message: String },
}

/// Startup configuration problems that stop the process.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("poll interval must be positive")]
    ZeroPollInterval,

    #[error("history capacity must be positive")]
    ZeroHistoryCapacity,

    #[error("round duration ({duration}s) exceeds the {max}s limit")]
    RoundTooLong { duration: u64, max: u64 },

    #[error("signal deadline ({deadline}s) must be shorter than the round ({duration}s)")]
    DeadlineTooLong { deadline: u64, duration: u64 },

    #[error("no notification destination configured")]
    MissingDestination,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
