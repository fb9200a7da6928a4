use std::sync::Arc;

use tracing::trace;

use crate::agent::Agent;
use crate::pairing::Pairing;
use crate::recorder::ProgressSnapshot;

/// Round-robin pair enumeration plus bounded worker-slot accounting.
///
/// All ordered pairs are generated up front, in discovery order; `advance`
/// hands out pending pairings while slots are free, and completions (scored
/// or skipped) free a slot and refresh the progress counters.
pub struct TournamentScheduler {
    pending: Vec<Pairing>,
    pool_size: usize,
    running: usize,
    completed: usize,
    skipped: usize,
    total: usize,
}

impl TournamentScheduler {
    pub fn new(agents: &[Arc<Agent>], pool_size: usize) -> Self {
        assert!(pool_size >= 1, "worker pool needs at least one slot");

        // every ordered pair (i, j), i != j; self-play is excluded
        let mut pending = vec![];
        for first in agents {
            for second in agents {
                if first.id != second.id {
                    pending.push(Pairing {
                        first: first.clone(),
                        second: second.clone(),
                    });
                }
            }
        }
        let total = pending.len();
        // hand pairs out in enumeration order
        pending.reverse();

        TournamentScheduler {
            pending,
            pool_size,
            running: 0,
            completed: 0,
            skipped: 0,
            total,
        }
    }

    /// Pairings to launch now, bounded by free worker slots.
    pub fn advance(&mut self) -> Vec<Pairing> {
        let free = self.pool_size.saturating_sub(self.running);
        let take = free.min(self.pending.len());
        let mut to_launch = Vec::with_capacity(take);
        for _ in 0..take {
            to_launch.push(self.pending.pop().unwrap());
        }
        self.running += to_launch.len();
        trace!(
            launched = to_launch.len(),
            running = self.running,
            pending = self.pending.len()
        );
        to_launch
    }

    /// Frees the completed unit's slot and returns the next launches.
    pub fn on_unit_complete(&mut self, was_skipped: bool) -> Vec<Pairing> {
        self.running -= 1;
        self.completed += 1;
        if was_skipped {
            self.skipped += 1;
        }
        self.advance()
    }

    /// All units ran (scored or skipped).
    pub fn is_finished(&self) -> bool {
        self.pending.is_empty() && self.running == 0
    }

    pub fn total_pairings(&self) -> usize {
        self.total
    }

    pub fn skipped_pairings(&self) -> usize {
        self.skipped
    }

    pub fn progress(&self) -> ProgressSnapshot {
        ProgressSnapshot::new(self.completed, self.total)
    }
}

#[cfg(test)]
mod scheduler_tests {
    use super::*;
    use crate::agent::Roster;
    use crate::agent_interface::AgentProvider;
    use crate::move_rules::Move;
    use std::collections::HashSet;

    struct Dummy;

    impl AgentProvider for Dummy {
        fn play(&mut self, _m: Option<Move>) -> anyhow::Result<Move> {
            Ok(Move::Shield)
        }
    }

    fn agents(n: usize) -> Vec<Arc<Agent>> {
        let mut roster = Roster::new();
        for i in 0..n {
            roster
                .register(format!("agent{i}"), || {
                    Box::new(Dummy) as Box<dyn AgentProvider>
                })
                .unwrap();
        }
        roster.into_agents()
    }

    #[test]
    fn enumerates_all_ordered_pairs_once() {
        let agents = agents(4);
        let mut scheduler = TournamentScheduler::new(&agents, 100);
        let launched = scheduler.advance();

        assert_eq!(scheduler.total_pairings(), 4 * 3);
        assert_eq!(launched.len(), 12);

        let mut seen = HashSet::new();
        for pairing in &launched {
            assert_ne!(pairing.first.id, pairing.second.id, "self-pair {pairing}");
            assert!(
                seen.insert((pairing.first.id, pairing.second.id)),
                "duplicate {pairing}"
            );
        }
    }

    #[test]
    fn advance_respects_the_slot_bound() {
        let agents = agents(4);
        let mut scheduler = TournamentScheduler::new(&agents, 3);

        assert_eq!(scheduler.advance().len(), 3);
        assert!(scheduler.advance().is_empty(), "no free slot");

        let next = scheduler.on_unit_complete(false);
        assert_eq!(next.len(), 1, "one slot freed, one launch");
        assert!(!scheduler.is_finished());
    }

    #[test]
    fn hands_out_pairs_in_enumeration_order() {
        let agents = agents(3);
        let mut scheduler = TournamentScheduler::new(&agents, 1);
        let first = scheduler.advance();
        assert_eq!(first[0].first.name, "agent0");
        assert_eq!(first[0].second.name, "agent1");
    }

    #[test]
    fn progress_counts_completions_and_skips() {
        let agents = agents(2);
        let mut scheduler = TournamentScheduler::new(&agents, 2);
        let launched = scheduler.advance();
        assert_eq!(launched.len(), 2);

        assert_eq!(scheduler.progress().current, 0);
        scheduler.on_unit_complete(false);
        scheduler.on_unit_complete(true);

        let progress = scheduler.progress();
        assert_eq!(progress.current, 2);
        assert_eq!(progress.total, 2);
        assert_eq!(progress.percentage, 100.0);
        assert_eq!(scheduler.skipped_pairings(), 1);
        assert!(scheduler.is_finished());
    }

    #[test]
    fn single_agent_has_no_pairings() {
        let agents = agents(1);
        let mut scheduler = TournamentScheduler::new(&agents, 4);
        assert!(scheduler.advance().is_empty());
        assert!(scheduler.is_finished());
        assert_eq!(scheduler.progress().percentage, 100.0);
    }
}
