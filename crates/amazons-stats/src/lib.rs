//! Move-level match statistics.
//!
//! Replays recorded Amazons matches and accumulates per-move counts into
//! phase- and color-segmented buckets. The aggregator here is the unit a
//! worker owns privately during fan-out and the driver merges during
//! fan-in; nothing in this crate touches files or threads.

pub mod aggregator;
pub mod phase;
pub mod replay;

pub use aggregator::{ProbabilityRow, StatsAggregator, WinRateRow};
pub use phase::{PhaseSchedule, Scope};
pub use replay::{replay_match, ReplayOptions, ReplayedMatch};
