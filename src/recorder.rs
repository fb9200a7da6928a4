//! Artifact boundary: the shared event stream, the progress snapshot file
//! and the per-match logs.
//!
//! The engine never writes files directly; it talks to a [`Recorder`].
//! [`FileRecorder`] produces the on-disk formats consumed by the status
//! front end, [`MemoryRecorder`] keeps everything in memory for tests and
//! embedders. Creation of the initial artifacts is fatal when it fails;
//! individual writes afterwards only log a warning, a transient failure must
//! not abort a running tournament.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::match_runner::MatchLog;
use crate::pairing::Pairing;

/// Name of the tournament-wide event stream artifact.
pub const OUTPUT_FILE: &str = "tournament_output.txt";
/// Name of the progress artifact.
pub const PROGRESS_FILE: &str = "tournament_progress.json";
/// Directory holding one log artifact per (pairing, repetition).
pub const MATCH_LOG_DIR: &str = "match_logs";

/// Completed-pairs progress, replaced wholesale on every update.
///
/// A polling consumer may catch the file mid-rewrite; it must treat a parse
/// failure as "no progress yet", not as an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Completed pairing units.
    pub current: usize,
    /// Total pairing units in this tournament.
    pub total: usize,
    /// `current / total`, in percent.
    pub percentage: f64,
}

impl ProgressSnapshot {
    /// Snapshot for `current` of `total` completed units.
    pub fn new(current: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            100.0
        } else {
            current as f64 / total as f64 * 100.0
        };
        Self {
            current,
            total,
            percentage,
        }
    }
}

/// Sink for everything a tournament run externalizes.
///
/// All three operations are called from worker and collector threads; every
/// implementation must serialize its writes internally.
pub trait Recorder: Send + Sync {
    /// Appends one line to the event stream. Lines are written whole;
    /// concurrent callers never interleave mid-line.
    fn append_event(&self, line: &str);

    /// Replaces the progress artifact with `snapshot`. Last writer wins.
    fn publish_progress(&self, snapshot: &ProgressSnapshot);

    /// Persists the log of one match repetition of `pairing`.
    fn record_match_log(&self, pairing: &Pairing, repetition: usize, log: &MatchLog);
}

/// [`Recorder`] writing the artifacts to a directory.
pub struct FileRecorder {
    output: Mutex<BufWriter<File>>,
    progress_path: PathBuf,
    match_log_dir: PathBuf,
}

impl FileRecorder {
    /// Creates (or truncates) the artifacts in `output_dir`.
    ///
    /// # Errors
    /// Returned when the directory or the initial files cannot be created;
    /// a tournament must not start without its artifacts.
    pub fn create(output_dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("could not create output directory {}", output_dir.display()))?;

        let output_path = output_dir.join(OUTPUT_FILE);
        let output = File::create(&output_path)
            .with_context(|| format!("could not create {}", output_path.display()))?;

        let progress_path = output_dir.join(PROGRESS_FILE);
        File::create(&progress_path)
            .with_context(|| format!("could not create {}", progress_path.display()))?;

        let match_log_dir = output_dir.join(MATCH_LOG_DIR);
        fs::create_dir_all(&match_log_dir).with_context(|| {
            format!("could not create match log directory {}", match_log_dir.display())
        })?;

        Ok(Self {
            output: Mutex::new(BufWriter::new(output)),
            progress_path,
            match_log_dir,
        })
    }
}

impl Recorder for FileRecorder {
    fn append_event(&self, line: &str) {
        let mut output = self.output.lock().expect("poisoned");
        // flush per line: the status front end polls this file mid-run
        if let Err(e) = writeln!(output, "{line}").and_then(|()| output.flush()) {
            warn!("could not append to event stream: {e}");
        }
    }

    fn publish_progress(&self, snapshot: &ProgressSnapshot) {
        let json = match serde_json::to_string(snapshot) {
            Ok(json) => json,
            Err(e) => {
                warn!("could not serialize progress: {e}");
                return;
            }
        };
        if let Err(e) = fs::write(&self.progress_path, json) {
            warn!("could not publish progress: {e}");
        }
    }

    fn record_match_log(&self, pairing: &Pairing, repetition: usize, log: &MatchLog) {
        let path = self
            .match_log_dir
            .join(format!("{}_match_{repetition}.txt", pairing.artifact_key()));
        let mut text = format!(
            "Match {repetition}: {} vs {}\n",
            pairing.first.name, pairing.second.name
        );
        text.push_str(&log.to_text());
        if let Err(e) = fs::write(&path, text) {
            warn!("could not record match log {}: {e}", path.display());
        }
    }
}

/// In-memory [`Recorder`] for tests and embedders that persist elsewhere.
#[derive(Default)]
pub struct MemoryRecorder {
    events: Mutex<Vec<String>>,
    progress: Mutex<Option<ProgressSnapshot>>,
    match_logs: Mutex<Vec<(String, usize, Vec<String>)>>,
}

impl MemoryRecorder {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All event lines appended so far.
    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("poisoned").clone()
    }

    /// The most recently published snapshot, if any.
    pub fn last_progress(&self) -> Option<ProgressSnapshot> {
        *self.progress.lock().expect("poisoned")
    }

    /// Recorded `(pairing key, repetition, lines)` triples.
    pub fn match_logs(&self) -> Vec<(String, usize, Vec<String>)> {
        self.match_logs.lock().expect("poisoned").clone()
    }
}

impl Recorder for MemoryRecorder {
    fn append_event(&self, line: &str) {
        self.events.lock().expect("poisoned").push(line.to_owned());
    }

    fn publish_progress(&self, snapshot: &ProgressSnapshot) {
        *self.progress.lock().expect("poisoned") = Some(*snapshot);
    }

    fn record_match_log(&self, pairing: &Pairing, repetition: usize, log: &MatchLog) {
        self.match_logs.lock().expect("poisoned").push((
            pairing.artifact_key(),
            repetition,
            log.lines().to_vec(),
        ));
    }
}
