//! Core evaluation logic for running duel tournaments.
//!
//! This module defines the [`Evaluator`] type, which orchestrates tournament
//! execution:
//!
//! - Enumerating every ordered pair of roster agents (round-robin, no
//!   self-play)
//! - Dispatching each pairing's match series to a bounded worker pool
//! - Merging scores and republishing progress as units complete
//! - Producing the final ranking and the result artifacts via a [`Recorder`]
//!
//! Exactly one run may be active per [`Evaluator`] at a time. A second
//! `evaluate` call while one is active is refused with [`AlreadyRunning`]
//! and has no side effects.
//!
//! A failing pairing (provider error or panic) is caught at the unit
//! boundary, logged with its cause, and contributes no score to either side;
//! the remaining pairings still run. Provider calls have no timeout: a
//! non-terminating agent stalls its worker slot for the rest of the run.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, instrument, trace};

use crate::agent::Roster;
use crate::configuration::Configuration;
use crate::logger::init_logger;
use crate::match_runner::{run_series, SeriesResult};
use crate::pairing::Pairing;
use crate::recorder::{FileRecorder, Recorder};
use crate::score_board::ScoreBoard;
use crate::tournament_scheduler::TournamentScheduler;

/// Refusal returned by [`Evaluator::evaluate`] while a run is active.
///
/// Downcast from the returned `anyhow::Error` to distinguish it from real
/// failures; re-issuing the request after the active run finishes is fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyRunning;

impl fmt::Display for AlreadyRunning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a tournament is already running")
    }
}

impl std::error::Error for AlreadyRunning {}

/// One pairing that contributed no score, with the cause.
#[derive(Debug, Clone)]
pub struct SkippedPairing {
    /// Display form of the ordered pairing, e.g. `[alice VS bob]`.
    pub pairing: String,
    /// Why the unit failed.
    pub cause: String,
}

/// Outcome of one completed tournament run.
#[derive(Debug, Clone)]
pub struct TournamentReport {
    /// Final table: `(agent name, cumulative score)`, best first; ties keep
    /// registration order.
    pub rankings: Vec<(String, f64)>,
    /// Units enumerated for this roster: `N * (N - 1)`.
    pub total_pairings: usize,
    /// Pairings that failed and were skipped, in completion order.
    pub skipped: Vec<SkippedPairing>,
}

impl TournamentReport {
    /// Units that completed with scores.
    pub fn completed_pairings(&self) -> usize {
        self.total_pairings - self.skipped.len()
    }

    /// True when no pairing was skipped.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

struct UnitOutcome {
    pairing: Pairing,
    result: Result<SeriesResult, String>,
}

// releases the running flag even when a run errors out
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The main type for running duel tournaments.
///
/// It schedules every ordered agent pair, applies the worker-pool bound,
/// and collects the final score table.
pub struct Evaluator {
    config: Configuration,
    running: AtomicBool,
}

impl Evaluator {
    #[instrument(skip_all)]
    /// Create an [`Evaluator`] with the given [`Configuration`].
    pub fn new(config: Configuration) -> Evaluator {
        if config.log {
            let _ = std::fs::create_dir_all(config.output_dir());
            init_logger(config.output_dir());
        }

        trace!(?config);

        Evaluator {
            config,
            running: AtomicBool::new(false),
        }
    }

    /// True while a tournament run is active on this evaluator.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Executes a full tournament over `roster`, writing the artifacts to
    /// the configured output directory.
    ///
    /// # Errors
    /// [`AlreadyRunning`] when a run is active, or an error if the initial
    /// artifacts cannot be created. Individual pairing failures do *not*
    /// error: they are reported in [`TournamentReport::skipped`].
    pub fn evaluate(&self, roster: Roster) -> anyhow::Result<TournamentReport> {
        let guard = self.try_begin()?;
        let recorder = Arc::new(
            FileRecorder::create(self.config.output_dir())
                .context("could not initialize tournament artifacts")?,
        );
        self.run_tournament(roster, recorder, guard)
    }

    /// Like [`evaluate`](Self::evaluate), but externalizing through a caller
    /// supplied [`Recorder`] instead of the file artifacts.
    pub fn evaluate_with(
        &self,
        roster: Roster,
        recorder: Arc<dyn Recorder>,
    ) -> anyhow::Result<TournamentReport> {
        let guard = self.try_begin()?;
        self.run_tournament(roster, recorder, guard)
    }

    // atomic idle -> running transition; refused when already running
    fn try_begin(&self) -> anyhow::Result<RunningGuard<'_>> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(AlreadyRunning.into());
        }
        Ok(RunningGuard(&self.running))
    }

    fn run_tournament(
        &self,
        roster: Roster,
        recorder: Arc<dyn Recorder>,
        _guard: RunningGuard<'_>,
    ) -> anyhow::Result<TournamentReport> {
        let agents = roster.into_agents();
        info!("evaluating {} agents", agents.len());
        recorder.append_event(&format!("Loaded {} agents.", agents.len()));

        let mut scheduler = TournamentScheduler::new(&agents, self.config.worker_pool_size());
        let board = ScoreBoard::new(
            agents.iter().map(|a| a.name.clone()),
            scheduler.total_pairings(),
        );

        recorder.append_event("Starting tournament...");
        recorder.publish_progress(&scheduler.progress());

        let (tx_result, rx_result) = mpsc::channel();
        let mut skipped = vec![];

        for pairing in scheduler.advance() {
            self.launch_unit(pairing, tx_result.clone(), recorder.clone());
        }

        while !scheduler.is_finished() {
            // not finished <=> unit running <=> result to receive
            let outcome = rx_result.recv().expect("worker result channel closed");
            let was_skipped = match outcome.result {
                Ok(series) => {
                    board.merge_score(&outcome.pairing.first.name, series.first_total);
                    board.merge_score(&outcome.pairing.second.name, series.second_total);
                    if self.config.verbose {
                        print_series_result(&outcome.pairing, &series);
                    }
                    false
                }
                Err(cause) => {
                    error!("unit {} failed: {cause}", outcome.pairing);
                    recorder.append_event(&format!("{} skipped: {cause}", outcome.pairing));
                    skipped.push(SkippedPairing {
                        pairing: outcome.pairing.to_string(),
                        cause,
                    });
                    true
                }
            };

            for pairing in scheduler.on_unit_complete(was_skipped) {
                self.launch_unit(pairing, tx_result.clone(), recorder.clone());
            }

            let snapshot = scheduler.progress();
            board.publish_progress(snapshot);
            recorder.publish_progress(&snapshot);
        }

        let rankings = board.rankings();
        recorder.append_event("Tournament Results:");
        for (name, score) in &rankings {
            recorder.append_event(&format!("{name}: {score} points"));
        }
        info!(
            total = scheduler.total_pairings(),
            skipped = skipped.len(),
            "tournament finished"
        );

        Ok(TournamentReport {
            rankings,
            total_pairings: scheduler.total_pairings(),
            skipped,
        })
    }

    fn launch_unit(
        &self,
        pairing: Pairing,
        tx_result: Sender<UnitOutcome>,
        recorder: Arc<dyn Recorder>,
    ) {
        let config = self.config.clone();
        std::thread::spawn(move || {
            // a panicking provider must cost one pairing, not the tournament
            let result = catch_unwind(AssertUnwindSafe(|| {
                run_series(&pairing, &config, recorder.as_ref())
            }));
            let result = match result {
                Ok(Ok(series)) => Ok(series),
                Ok(Err(e)) => Err(format!("{e:#}")),
                Err(panic) => Err(panic_message(panic.as_ref())),
            };
            let _ = tx_result.send(UnitOutcome { pairing, result });
        });
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("agent panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("agent panicked: {message}")
    } else {
        "agent panicked".to_owned()
    }
}

fn print_series_result(pairing: &Pairing, series: &SeriesResult) {
    // green pairing, default-color scores
    println!(
        "\x1b[32m{pairing}: \x1b[39m{}-{}",
        series.first_total, series.second_total
    );
}
