//! Deterministic scripted agents shared by the integration tests.

use std::thread::sleep;
use std::time::Duration;

use duel_arena::agent_interface::{AgentFactory, AgentProvider};
use duel_arena::move_rules::Move;

/// Plays the same move every round, legal or not.
pub struct Always(pub Move);

impl AgentProvider for Always {
    fn play(&mut self, _opponent_last_move: Option<Move>) -> anyhow::Result<Move> {
        Ok(self.0)
    }
}

/// Factory for [`Always`].
pub fn always(m: Move) -> impl AgentFactory {
    move || Box::new(Always(m)) as Box<dyn AgentProvider>
}

/// Errors on its first call.
pub struct Failing;

impl AgentProvider for Failing {
    fn play(&mut self, _opponent_last_move: Option<Move>) -> anyhow::Result<Move> {
        anyhow::bail!("scripted failure")
    }
}

/// Factory for [`Failing`].
pub fn failing() -> impl AgentFactory {
    || Box::new(Failing) as Box<dyn AgentProvider>
}

/// Panics on its first call.
pub struct Panicking;

impl AgentProvider for Panicking {
    fn play(&mut self, _opponent_last_move: Option<Move>) -> anyhow::Result<Move> {
        panic!("scripted panic")
    }
}

/// Factory for [`Panicking`].
pub fn panicking() -> impl AgentFactory {
    || Box::new(Panicking) as Box<dyn AgentProvider>
}

/// Shields after sleeping, to keep a tournament observably "running".
pub struct Slow(pub Duration);

impl AgentProvider for Slow {
    fn play(&mut self, _opponent_last_move: Option<Move>) -> anyhow::Result<Move> {
        sleep(self.0);
        Ok(Move::Shield)
    }
}

/// Factory for [`Slow`].
pub fn slow(delay: Duration) -> impl AgentFactory {
    move || Box::new(Slow(delay)) as Box<dyn AgentProvider>
}
