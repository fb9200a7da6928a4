//! One ordered pair of agents, the unit of scheduled work.

use std::{fmt::Display, sync::Arc};

use crate::agent::Agent;

/// An ordered agent pair. Order matters: `[a VS b]` and `[b VS a]` are two
/// distinct units of work with separate logs and separate score streams.
#[derive(Debug, Clone)]
pub struct Pairing {
    /// The first mover of every round line.
    pub first: Arc<Agent>,
    /// The second mover.
    pub second: Arc<Agent>,
}

impl Pairing {
    /// Filesystem-safe key used to name per-match log artifacts.
    pub fn artifact_key(&self) -> String {
        format!("{}_vs_{}", self.first.name, self.second.name)
    }
}

impl Display for Pairing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} VS {}]", self.first.name, self.second.name)
    }
}
