//! # Duel Arena
//!
//! A modular Rust crate for running AI tournaments of the elemental duel, a
//! simultaneous-move energy-management game: every round both agents secretly
//! pick one of `shield`, `load`, `fireball`, `tsunami` or `mirror`, and the
//! round either ends the match or feeds the next one.
//!
//! It provides:
//! - The pure game rules (`move_rules`): legality downgrades and round resolution
//! - The per-match state machine (`match_runner`)
//! - Round-robin scheduling of every ordered agent pair over a bounded worker
//!   pool, with thread-safe score and progress aggregation (`evaluator`)
//! - Pluggable artifact output (`recorder`): a tournament output stream, a
//!   polling-friendly progress file and one log per match
//! - A handful of built-in strategies (`sample_agents`)
//!
//! Agents run in-process: an agent is anything implementing
//! [`AgentProvider`](crate::agent_interface::AgentProvider), registered
//! through a factory so every match repetition starts from a fresh instance.
//! How agent code gets loaded, stored or displayed is out of scope; so is
//! sandboxing. A provider that never returns stalls its worker slot.
//!
//! # Usage Example
//!
//! ```no_run
//! use duel_arena::prelude::*;
//! use duel_arena::sample_agents::{Charger, Reflex, Tactician, Turtle};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Configuration::new()
//!         .with_output_dir("arena_artifacts")
//!         .with_pool_size(4);
//!
//!     let mut roster = Roster::new();
//!     roster.register("charger", Charger::factory())?;
//!     roster.register("turtle", Turtle::factory())?;
//!     roster.register("reflex", Reflex::factory())?;
//!     roster.register("tactician", Tactician::factory())?;
//!
//!     let evaluator = Evaluator::new(config);
//!     let report = evaluator.evaluate(roster)?;
//!
//!     for (name, score) in &report.rankings {
//!         println!("{name}: {score}");
//!     }
//!     if !report.is_clean() {
//!         eprintln!("{} pairings were skipped", report.skipped.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Example Agent
//!
//! ```
//! use duel_arena::agent_interface::AgentProvider;
//! use duel_arena::move_rules::Move;
//!
//! /// Fireballs whenever it can afford to, loads otherwise.
//! #[derive(Default)]
//! struct Hothead {
//!     energy: i32,
//! }
//!
//! impl AgentProvider for Hothead {
//!     fn play(&mut self, _opponent_last_move: Option<Move>) -> anyhow::Result<Move> {
//!         if self.energy >= 1 {
//!             self.energy -= 1;
//!             Ok(Move::Fireball)
//!         } else {
//!             self.energy += 1;
//!             Ok(Move::Load)
//!         }
//!     }
//! }
//! ```
//!
//! ## Agent Requirements
//!
//! - `play` receives the opponent's previous *validated* move (`None` on
//!   round 1) and must return promptly; there is no per-call timeout
//! - An unaffordable returned move is downgraded to `load`, never rejected
//! - A returned error (or panic) forfeits the whole pairing for both sides
#![warn(missing_docs)]

pub mod agent;
pub mod agent_interface;
pub use anyhow;
pub mod configuration;
pub mod evaluator;
mod logger;
pub mod match_runner;
pub mod move_rules;
pub mod pairing;
pub mod recorder;
pub mod sample_agents;
pub mod score_board;
mod tournament_scheduler;

/// Commonly used types and traits for quick access.
///
/// Import this prelude to get started easily:
/// ```rust
/// use duel_arena::prelude::*;
/// ```
///
/// Includes:
/// - [`Configuration`](crate::configuration::Configuration)
/// - [`Roster`](crate::agent::Roster)
/// - [`Evaluator`](crate::evaluator::Evaluator) and its report types
/// - the agent traits and the [`Move`](crate::move_rules::Move) enumeration
pub mod prelude {
    pub use crate::agent::Roster;
    pub use crate::agent_interface::AgentFactory;
    pub use crate::agent_interface::AgentProvider;
    pub use crate::configuration::Configuration;
    pub use crate::evaluator::AlreadyRunning;
    pub use crate::evaluator::Evaluator;
    pub use crate::evaluator::TournamentReport;
    pub use crate::move_rules::Move;
    pub use crate::move_rules::RoundOutcome;
}
