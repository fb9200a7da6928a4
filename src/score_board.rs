//! Thread-safe accumulation of scores and progress for one tournament run.

use std::cmp::Ordering;
use std::sync::Mutex;

use tracing::warn;

use crate::recorder::ProgressSnapshot;

#[derive(Debug, Clone)]
struct ScoreEntry {
    name: String,
    score: f64,
}

/// Owns the score table and the latest progress snapshot.
///
/// Workers report through [`merge_score`] and [`publish_progress`] from any
/// thread; both are serialized internally. Merging is additive and
/// commutative, so the final table does not depend on completion order.
///
/// [`merge_score`]: ScoreBoard::merge_score
/// [`publish_progress`]: ScoreBoard::publish_progress
pub struct ScoreBoard {
    // entries stay in discovery order; the stable ranking sort relies on it
    table: Mutex<Vec<ScoreEntry>>,
    progress: Mutex<ProgressSnapshot>,
}

impl ScoreBoard {
    /// Creates a board with a zero score per agent, in discovery order.
    pub fn new(names: impl IntoIterator<Item = String>, total_pairings: usize) -> Self {
        let table = names
            .into_iter()
            .map(|name| ScoreEntry { name, score: 0.0 })
            .collect();
        Self {
            table: Mutex::new(table),
            progress: Mutex::new(ProgressSnapshot::new(0, total_pairings)),
        }
    }

    /// Adds `delta` to `name`'s cumulative score.
    pub fn merge_score(&self, name: &str, delta: f64) {
        let mut table = self.table.lock().expect("poisoned");
        match table.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.score += delta,
            None => warn!("score for unknown agent '{name}' dropped"),
        }
    }

    /// Replaces the progress snapshot. Last writer wins.
    pub fn publish_progress(&self, snapshot: ProgressSnapshot) {
        *self.progress.lock().expect("poisoned") = snapshot;
    }

    /// The latest published snapshot.
    pub fn progress(&self) -> ProgressSnapshot {
        *self.progress.lock().expect("poisoned")
    }

    /// Final ranking: score descending, ties in discovery order.
    ///
    /// Meant to be read after all workers joined; a mid-run call only sees
    /// the contributions merged so far.
    pub fn rankings(&self) -> Vec<(String, f64)> {
        let mut entries = self.table.lock().expect("poisoned").clone();
        entries.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        entries
            .into_iter()
            .map(|entry| (entry.name, entry.score))
            .collect()
    }
}
