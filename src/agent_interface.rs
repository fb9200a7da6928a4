//! Module defining the traits an agent must implement to enter a tournament.

use crate::move_rules::Move;

/// What an agent should implement.
///
/// One instance plays exactly one match. The engine calls [`play`] once per
/// round with the opponent's previous *validated* move (`None` on round 1)
/// and feeds the returned intent through the legality rules: an
/// unaffordable intent is downgraded, never rejected.
///
/// Returning an error marks the whole pairing unit as failed: neither side
/// scores from it and the tournament moves on.
///
/// [`play`]: AgentProvider::play
pub trait AgentProvider {
    /// Pick this round's move given the opponent's previous validated move.
    fn play(&mut self, opponent_last_move: Option<Move>) -> anyhow::Result<Move>;
}

/// What will be given to the evaluator to allow it to create fresh agents.
///
/// A factory must hand out a zero-state instance on every call: each match
/// repetition gets a brand-new provider so no state leaks between matches.
pub trait AgentFactory: Send + Sync {
    /// Returns a fresh, zero-state agent instance.
    fn new_agent(&self) -> Box<dyn AgentProvider>;
}

impl<F> AgentFactory for F
where
    F: Fn() -> Box<dyn AgentProvider> + Send + Sync,
{
    fn new_agent(&self) -> Box<dyn AgentProvider> {
        self()
    }
}

#[cfg(test)]
mod interface_tests {
    use super::*;

    struct DummyAgent;

    impl AgentProvider for DummyAgent {
        fn play(&mut self, _opponent_last_move: Option<Move>) -> anyhow::Result<Move> {
            Ok(Move::Shield)
        }
    }

    fn get_agent_move<A: AgentProvider>(agent: &mut A) -> Move {
        agent.play(None).unwrap()
    }

    #[test]
    fn test_dyn_agent() {
        let mut agent = DummyAgent;
        assert_eq!(Move::Shield, get_agent_move(&mut agent));
    }

    struct DummyFactory;

    impl AgentFactory for DummyFactory {
        fn new_agent(&self) -> Box<dyn AgentProvider> {
            Box::new(DummyAgent)
        }
    }

    fn make_agent<F: AgentFactory>(factory: &F) -> Box<dyn AgentProvider> {
        factory.new_agent()
    }

    #[test]
    fn test_dyn_factory() {
        let mut agent = make_agent(&DummyFactory);
        assert_eq!(agent.play(Some(Move::Load)).unwrap(), Move::Shield);
    }

    #[test]
    fn test_closure_factory() {
        let factory = || Box::new(DummyAgent) as Box<dyn AgentProvider>;
        let mut agent = factory.new_agent();
        assert_eq!(agent.play(None).unwrap(), Move::Shield);
    }
}
