//! TABLEWATCH — Bac Bo table monitor and betting-signal tracker.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.
//!
//! ```text
//! RoundSource → codec → HistoryStore → SignalPlanner → BetTracker → Notifier
//!                                     (matcher, resolver, timing gate)
//! ```

pub mod codec;
pub mod config;
pub mod engine;
pub mod history;
pub mod notify;
pub mod source;
pub mod storage;
pub mod strategy;
pub mod types;
