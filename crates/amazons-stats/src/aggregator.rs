//! The per-move count aggregator.
//!
//! One aggregator holds the full 3-family × 2-color × 4-scope bucket table:
//! move frequency, games played, and win games, for each color in each
//! scope. Buckets are addressed by enum tuple, so there is no way to pick
//! the wrong sibling mapping by name. A worker mutates its own aggregator
//! during fan-out; the driver folds worker aggregators together with
//! [`StatsAggregator::merge`], which is associative and commutative.

use std::collections::HashMap;

use serde::Serialize;

use amazons_core::Side;

use crate::phase::Scope;

/// The three count families for one (color, scope) bucket.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Bucket {
    frequency: HashMap<String, u64>,
    games: HashMap<String, u64>,
    wins: HashMap<String, u64>,
}

fn merge_counts(target: &mut HashMap<String, u64>, source: HashMap<String, u64>) {
    for (key, count) in source {
        *target.entry(key).or_insert(0) += count;
    }
}

impl Bucket {
    fn merge(&mut self, other: Bucket) {
        merge_counts(&mut self.frequency, other.frequency);
        merge_counts(&mut self.games, other.games);
        merge_counts(&mut self.wins, other.wins);
    }
}

/// One row of a derived win-rate table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WinRateRow {
    pub key: String,
    pub count: u64,
    pub total_games: u64,
    pub win_rate: f64,
}

/// One row of a derived move-probability table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProbabilityRow {
    pub key: String,
    pub probability: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatsAggregator {
    // [color][scope]
    buckets: [[Bucket; Scope::COUNT]; 2],
}

fn color_index(color: Side) -> usize {
    match color {
        Side::Black => 0,
        Side::White => 1,
    }
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn bucket(&self, color: Side, scope: Scope) -> &Bucket {
        &self.buckets[color_index(color)][scope.index()]
    }

    fn bucket_mut(&mut self, color: Side, scope: Scope) -> &mut Bucket {
        &mut self.buckets[color_index(color)][scope.index()]
    }

    /// Record one observation of a move in one bucket: frequency and games
    /// each gain 1, wins gains 1 when the mover won the match.
    pub fn accumulate(&mut self, color: Side, scope: Scope, key: &str, is_win: bool) {
        let bucket = self.bucket_mut(color, scope);
        *bucket.frequency.entry(key.to_string()).or_insert(0) += 1;
        *bucket.games.entry(key.to_string()).or_insert(0) += 1;
        if is_win {
            *bucket.wins.entry(key.to_string()).or_insert(0) += 1;
        }
    }

    /// Fold another aggregator into this one, key-wise additive.
    pub fn merge(&mut self, other: StatsAggregator) {
        for (ours, theirs) in self
            .buckets
            .iter_mut()
            .flatten()
            .zip(other.buckets.into_iter().flatten())
        {
            ours.merge(theirs);
        }
    }

    /// Win-rate rows for one bucket: every key with at least one game,
    /// sorted lexicographically by key. Keys with zero games are omitted,
    /// not zero-filled.
    pub fn win_rates(&self, color: Side, scope: Scope) -> Vec<WinRateRow> {
        let bucket = self.bucket(color, scope);
        let mut rows: Vec<WinRateRow> = bucket
            .games
            .iter()
            .filter(|(_, &total)| total > 0)
            .map(|(key, &total)| {
                let count = bucket.wins.get(key).copied().unwrap_or(0);
                WinRateRow {
                    key: key.clone(),
                    count,
                    total_games: total,
                    win_rate: count as f64 / total as f64,
                }
            })
            .collect();
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        rows
    }

    /// Frequency-normalized move probabilities for one bucket, sorted by
    /// key. A scope with no observations yields an empty table rather than
    /// a division by zero; zero-probability rows are omitted.
    pub fn move_probabilities(&self, color: Side, scope: Scope) -> Vec<ProbabilityRow> {
        let bucket = self.bucket(color, scope);
        let total: u64 = bucket.frequency.values().sum();
        if total == 0 {
            return Vec::new();
        }
        let mut rows: Vec<ProbabilityRow> = bucket
            .frequency
            .iter()
            .filter(|(_, &count)| count > 0)
            .map(|(key, &count)| ProbabilityRow {
                key: key.clone(),
                probability: count as f64 / total as f64,
            })
            .collect();
        rows.sort_by(|a, b| a.key.cmp(&b.key));
        rows
    }

    pub fn frequency(&self, color: Side, scope: Scope, key: &str) -> u64 {
        self.bucket(color, scope).frequency.get(key).copied().unwrap_or(0)
    }

    pub fn games_played(&self, color: Side, scope: Scope, key: &str) -> u64 {
        self.bucket(color, scope).games.get(key).copied().unwrap_or(0)
    }

    pub fn win_games(&self, color: Side, scope: Scope, key: &str) -> u64 {
        self.bucket(color, scope).wins.get(key).copied().unwrap_or(0)
    }

    /// Total plies accumulated, counted from the phase-scoped games buckets
    /// of both colors (the overall mirror is excluded to avoid double
    /// counting).
    pub fn counted_plies(&self) -> u64 {
        let mut total = 0;
        for color in [Side::Black, Side::White] {
            for scope in [Scope::Opening, Scope::Middle, Scope::End] {
                total += self.bucket(color, scope).games.values().sum::<u64>();
            }
        }
        total
    }
}
