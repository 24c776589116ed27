//! Core engine — bet tracking and the per-tick monitor.

pub mod monitor;
pub mod tracker;
