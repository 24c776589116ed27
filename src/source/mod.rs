//! Round data sources.
//!
//! Defines the `RoundSource` trait and the HTTP implementation for the
//! CasinoScores latest-round feed.

pub mod casinoscores;

use anyhow::Result;
use async_trait::async_trait;

use crate::codec::RawRound;

/// Pull interface for the latest round on the watched table.
///
/// Implementors return the raw record; classification is the codec's job.
#[async_trait]
pub trait RoundSource: Send + Sync {
    /// Fetch the most recent round record.
    async fn latest_round(&self) -> Result<RawRound>;

    /// Source name for logging and identification.
    fn name(&self) -> &str;
}
