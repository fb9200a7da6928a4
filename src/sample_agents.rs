//! Built-in reference strategies.
//!
//! Handy as tournament filler, as opponents for a custom agent under
//! development, and as documentation of the [`AgentProvider`] contract. The
//! deterministic ones double as fixed points in tests.

use rand::Rng;

use crate::agent_interface::{AgentFactory, AgentProvider};
use crate::move_rules::Move;

/// Banks two energy, then releases a tsunami. Repeat.
#[derive(Debug, Default)]
pub struct Charger {
    energy: i32,
}

impl Charger {
    /// Factory handing out fresh instances.
    pub fn factory() -> impl AgentFactory {
        || Box::new(Charger::default()) as Box<dyn AgentProvider>
    }
}

impl AgentProvider for Charger {
    fn play(&mut self, _opponent_last_move: Option<Move>) -> anyhow::Result<Move> {
        if self.energy >= 2 {
            self.energy -= 2;
            Ok(Move::Tsunami)
        } else {
            self.energy += 1;
            Ok(Move::Load)
        }
    }
}

/// Always shields. Never wins, never loses: the draw-credit baseline.
#[derive(Debug, Default)]
pub struct Turtle;

impl Turtle {
    /// Factory handing out fresh instances.
    pub fn factory() -> impl AgentFactory {
        || Box::new(Turtle) as Box<dyn AgentProvider>
    }
}

impl AgentProvider for Turtle {
    fn play(&mut self, _opponent_last_move: Option<Move>) -> anyhow::Result<Move> {
        Ok(Move::Shield)
    }
}

/// Always loads. Free target for any attack, useful as a punching bag.
#[derive(Debug, Default)]
pub struct Accumulator;

impl Accumulator {
    /// Factory handing out fresh instances.
    pub fn factory() -> impl AgentFactory {
        || Box::new(Accumulator) as Box<dyn AgentProvider>
    }
}

impl AgentProvider for Accumulator {
    fn play(&mut self, _opponent_last_move: Option<Move>) -> anyhow::Result<Move> {
        Ok(Move::Load)
    }
}

/// Mirrors the first heavy attack, tsunamis when charged, otherwise plays a
/// weighted random of loading, fireballing and shielding.
#[derive(Debug, Default)]
pub struct Reflex {
    energy: i32,
    mirror_used: bool,
}

impl Reflex {
    /// Factory handing out fresh instances.
    pub fn factory() -> impl AgentFactory {
        || Box::new(Reflex::default()) as Box<dyn AgentProvider>
    }
}

impl AgentProvider for Reflex {
    fn play(&mut self, opponent_last_move: Option<Move>) -> anyhow::Result<Move> {
        if matches!(opponent_last_move, Some(Move::Fireball | Move::Tsunami)) && !self.mirror_used {
            self.mirror_used = true;
            return Ok(Move::Mirror);
        }

        let mut rng = rand::thread_rng();
        if self.energy >= 2 {
            self.energy -= 2;
            Ok(Move::Tsunami)
        } else if self.energy == 1 {
            if rng.gen_bool(0.7) {
                self.energy += 1;
                Ok(Move::Load)
            } else {
                self.energy -= 1;
                Ok(Move::Fireball)
            }
        } else if rng.gen_bool(0.8) {
            self.energy += 1;
            Ok(Move::Load)
        } else {
            Ok(Move::Shield)
        }
    }
}

// payoff rows/columns in this order
const TACTICIAN_MOVES: [Move; 5] = [
    Move::Load,
    Move::Shield,
    Move::Fireball,
    Move::Tsunami,
    Move::Mirror,
];

const TACTICIAN_PAYOFF: [[i32; 5]; 5] = [
    [0, 1, -2, -2, 1],
    [-1, 0, 1, -2, 1],
    [2, -1, 0, 1, -2],
    [2, 2, -1, 0, -2],
    [-1, -1, 2, 2, 0],
];

/// Scores every affordable move against the opponent's affordable replies
/// with a fixed payoff matrix, tracking the opponent's energy and mirror
/// from the moves it observes.
#[derive(Debug)]
pub struct Tactician {
    energy: i32,
    mirror_available: bool,
    opponent_energy: i32,
    opponent_mirror: bool,
}

impl Default for Tactician {
    fn default() -> Self {
        Self {
            energy: 0,
            mirror_available: true,
            opponent_energy: 0,
            opponent_mirror: true,
        }
    }
}

impl Tactician {
    /// Factory handing out fresh instances.
    pub fn factory() -> impl AgentFactory {
        || Box::new(Tactician::default()) as Box<dyn AgentProvider>
    }

    fn affordable(index: usize, energy: i32, mirror: bool) -> bool {
        match TACTICIAN_MOVES[index] {
            Move::Fireball => energy >= 1,
            Move::Tsunami => energy >= 2,
            Move::Mirror => mirror,
            Move::Load | Move::Shield => true,
        }
    }

    fn note_opponent(&mut self, observed: Option<Move>) {
        match observed {
            Some(Move::Load) => self.opponent_energy += 1,
            Some(Move::Fireball) => self.opponent_energy -= 1,
            Some(Move::Tsunami) => self.opponent_energy -= 2,
            Some(Move::Mirror) => self.opponent_mirror = false,
            Some(Move::Shield) | None => {}
        }
    }
}

impl AgentProvider for Tactician {
    fn play(&mut self, opponent_last_move: Option<Move>) -> anyhow::Result<Move> {
        self.note_opponent(opponent_last_move);

        let mut best_score = -1;
        let mut best_move = None;
        for own in 0..5 {
            if !Self::affordable(own, self.energy, self.mirror_available) {
                continue;
            }
            let mut sum = 0;
            for reply in 0..5 {
                if !Self::affordable(reply, self.opponent_energy, self.opponent_mirror) {
                    continue;
                }
                sum += TACTICIAN_PAYOFF[own][reply];
            }
            if sum > best_score {
                best_score = sum;
                best_move = Some(TACTICIAN_MOVES[own]);
            }
        }

        // nothing scored above the sentinel: load is the safe default
        let chosen = best_move.unwrap_or(Move::Load);
        match chosen {
            Move::Load => self.energy += 1,
            Move::Fireball => self.energy -= 1,
            Move::Tsunami => self.energy -= 2,
            Move::Mirror => self.mirror_available = false,
            Move::Shield => {}
        }
        Ok(chosen)
    }
}
