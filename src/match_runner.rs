//! Match execution: the per-round state machine and the repeated series.

use anyhow::Context;
use tracing::trace;

use crate::agent_interface::AgentProvider;
use crate::configuration::Configuration;
use crate::move_rules::{resolve_round, validate_move, Move, RoundOutcome};
use crate::pairing::Pairing;
use crate::recorder::Recorder;

/// Per-side mutable resources. Owned by one match, discarded with it; every
/// match repetition starts from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceState {
    /// Energy points: produced by `load`, consumed by `fireball`/`tsunami`.
    pub energy: i32,
    /// One-time mirror flag, cleared permanently once mirror is played.
    pub mirror_available: bool,
}

impl ResourceState {
    fn new() -> Self {
        Self {
            energy: 0,
            mirror_available: true,
        }
    }

    // Legality was already checked against the pre-update energy; the
    // decrement here is unconditional.
    fn apply(&mut self, validated: Move) {
        match validated {
            Move::Load => self.energy += 1,
            Move::Fireball => self.energy -= 1,
            Move::Tsunami => self.energy -= 2,
            Move::Mirror => self.mirror_available = false,
            Move::Shield => {}
        }
    }
}

/// Where a match currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchState {
    /// Rounds are still being exchanged.
    InProgress,
    /// A decisive round ended the match.
    Decided {
        /// True when the first mover won.
        first_won: bool,
    },
    /// The round cap elapsed without a decisive round: a draw.
    Exhausted,
}

/// The score pair awarded for one completed match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchScores {
    /// First mover's score.
    pub first: f64,
    /// Second mover's score.
    pub second: f64,
}

impl MatchScores {
    /// Partial credit each side receives when the round cap elapses.
    pub const DRAW_CREDIT: f64 = 1.1;

    fn decisive(first_won: bool) -> Self {
        if first_won {
            Self { first: 1.0, second: 0.0 }
        } else {
            Self { first: 0.0, second: 1.0 }
        }
    }

    fn exhausted() -> Self {
        Self {
            first: Self::DRAW_CREDIT,
            second: Self::DRAW_CREDIT,
        }
    }
}

/// Append-only per-match record: one line per round, then a terminal line.
#[derive(Debug, Clone, Default)]
pub struct MatchLog {
    lines: Vec<String>,
}

impl MatchLog {
    fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    /// The recorded lines, in arrival order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The whole log as newline-terminated text.
    pub fn to_text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

/// A finished match: terminal state, awarded scores, and the full log.
#[derive(Debug)]
pub struct CompletedMatch {
    /// Either `Decided` or `Exhausted`, never `InProgress`.
    pub state: MatchState,
    /// Scores awarded to each side.
    pub scores: MatchScores,
    /// Number of rounds actually played.
    pub rounds: usize,
    /// Per-round record plus the terminal line.
    pub log: MatchLog,
}

/// One bounded match between two freshly instantiated agents.
///
/// Both providers are polled each round with the opponent's previous
/// *validated* move, both intents are validated against each side's current
/// resources, resources are updated, and the round is resolved. The first
/// decisive round ends the match.
pub struct DuelMatch {
    first_name: String,
    second_name: String,
    first: Box<dyn AgentProvider>,
    second: Box<dyn AgentProvider>,
    resources_first: ResourceState,
    resources_second: ResourceState,
    last_first: Option<Move>,
    last_second: Option<Move>,
    state: MatchState,
    rounds: usize,
    log: MatchLog,
}

impl DuelMatch {
    /// Starts a match between two zero-state providers.
    pub fn new(
        first_name: impl Into<String>,
        first: Box<dyn AgentProvider>,
        second_name: impl Into<String>,
        second: Box<dyn AgentProvider>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            second_name: second_name.into(),
            first,
            second,
            resources_first: ResourceState::new(),
            resources_second: ResourceState::new(),
            last_first: None,
            last_second: None,
            state: MatchState::InProgress,
            rounds: 0,
            log: MatchLog::default(),
        }
    }

    /// Current state.
    pub fn state(&self) -> MatchState {
        self.state
    }

    /// Both sides' resources, first mover first.
    pub fn resources(&self) -> (ResourceState, ResourceState) {
        (self.resources_first, self.resources_second)
    }

    /// The log so far.
    pub fn log(&self) -> &MatchLog {
        &self.log
    }

    /// Plays one round and returns the resulting state.
    ///
    /// Calling this on a finished match is a no-op.
    ///
    /// # Errors
    /// Returned when either provider fails; the match is unusable afterwards.
    pub fn play_round(&mut self) -> anyhow::Result<MatchState> {
        if self.state != MatchState::InProgress {
            return Ok(self.state);
        }

        let intent_first = self
            .first
            .play(self.last_second)
            .with_context(|| format!("agent '{}' failed to play", self.first_name))?;
        let intent_second = self
            .second
            .play(self.last_first)
            .with_context(|| format!("agent '{}' failed to play", self.second_name))?;

        let move_first = validate_move(
            intent_first,
            self.resources_first.energy,
            self.resources_first.mirror_available,
        );
        let move_second = validate_move(
            intent_second,
            self.resources_second.energy,
            self.resources_second.mirror_available,
        );

        self.rounds += 1;
        self.log.push(format!(
            "{} vs {}: {} vs {}",
            self.first_name, self.second_name, move_first, move_second
        ));

        self.resources_first.apply(move_first);
        self.resources_second.apply(move_second);

        match resolve_round(move_first, move_second) {
            RoundOutcome::First => self.state = MatchState::Decided { first_won: true },
            RoundOutcome::Second => self.state = MatchState::Decided { first_won: false },
            RoundOutcome::Draw => {
                // carried into the next round as "opponent's last move"
                self.last_first = Some(move_first);
                self.last_second = Some(move_second);
            }
        }
        Ok(self.state)
    }

    /// Plays rounds until a decisive round or `round_cap` rounds, whichever
    /// comes first, and awards the scores.
    pub fn run(mut self, round_cap: usize) -> anyhow::Result<CompletedMatch> {
        for _ in 0..round_cap {
            if self.play_round()? != MatchState::InProgress {
                break;
            }
        }

        let scores = match self.state {
            MatchState::Decided { first_won } => {
                let scores = MatchScores::decisive(first_won);
                let winner = if first_won {
                    &self.first_name
                } else {
                    &self.second_name
                };
                self.log
                    .push(format!("{winner} wins! ({}-{})", scores.first, scores.second));
                scores
            }
            _ => {
                self.state = MatchState::Exhausted;
                let scores = MatchScores::exhausted();
                self.log
                    .push(format!("Draw! ({}-{})", scores.first, scores.second));
                scores
            }
        };

        Ok(CompletedMatch {
            state: self.state,
            scores,
            rounds: self.rounds,
            log: self.log,
        })
    }
}

/// Accumulated scores of one ordered pairing over its whole match series.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SeriesResult {
    /// Sum of the first mover's match scores.
    pub first_total: f64,
    /// Sum of the second mover's match scores.
    pub second_total: f64,
    /// Matches actually completed (always the configured count on success).
    pub matches_played: usize,
}

/// Runs the full repeated series for one ordered pairing.
///
/// Every repetition gets brand-new provider instances and fresh resources;
/// logs are handed to the recorder one artifact per repetition. An error in
/// any repetition fails the whole unit; neither side keeps partial scores.
pub(crate) fn run_series(
    pairing: &Pairing,
    config: &Configuration,
    recorder: &dyn Recorder,
) -> anyhow::Result<SeriesResult> {
    recorder.append_event(&format!(
        "Match: {} vs {}",
        pairing.first.name, pairing.second.name
    ));

    let mut totals = SeriesResult::default();
    for repetition in 0..config.matches_per_pairing() {
        let duel = DuelMatch::new(
            pairing.first.name.clone(),
            pairing.first.instantiate(),
            pairing.second.name.clone(),
            pairing.second.instantiate(),
        );
        let completed = duel
            .run(config.round_cap())
            .with_context(|| format!("{pairing} repetition {repetition}"))?;

        if config.record_match_logs() {
            recorder.record_match_log(pairing, repetition, &completed.log);
        }

        trace!(%pairing, repetition, rounds = completed.rounds, state = ?completed.state);
        totals.first_total += completed.scores.first;
        totals.second_total += completed.scores.second;
        totals.matches_played += 1;
    }
    Ok(totals)
}

#[cfg(test)]
mod match_tests {
    use super::*;
    use anyhow::bail;

    struct Always(Move);

    impl AgentProvider for Always {
        fn play(&mut self, _opponent_last_move: Option<Move>) -> anyhow::Result<Move> {
            Ok(self.0)
        }
    }

    /// Loads until tsunami is affordable, then fires it.
    struct Charger;

    impl AgentProvider for Charger {
        fn play(&mut self, _opponent_last_move: Option<Move>) -> anyhow::Result<Move> {
            Ok(Move::Tsunami)
        }
    }

    struct Failing;

    impl AgentProvider for Failing {
        fn play(&mut self, _opponent_last_move: Option<Move>) -> anyhow::Result<Move> {
            bail!("engine exploded")
        }
    }

    fn boxed<A: AgentProvider + 'static>(agent: A) -> Box<dyn AgentProvider> {
        Box::new(agent)
    }

    #[test]
    fn mutual_shielding_exhausts_the_match() {
        let duel = DuelMatch::new("a", boxed(Always(Move::Shield)), "b", boxed(Always(Move::Shield)));
        let completed = duel.run(100).unwrap();

        assert_eq!(completed.state, MatchState::Exhausted);
        assert_eq!(completed.rounds, 100);
        assert_eq!(completed.scores.first, MatchScores::DRAW_CREDIT);
        assert_eq!(completed.scores.second, MatchScores::DRAW_CREDIT);
        // 100 round lines plus the terminal line
        assert_eq!(completed.log.lines().len(), 101);
        assert_eq!(completed.log.lines()[0], "a vs b: shield vs shield");
        assert_eq!(completed.log.lines()[100], "Draw! (1.1-1.1)");
    }

    #[test]
    fn charger_beats_turtle_in_three_rounds() {
        // Tsunami intents downgrade to load until 2 energy is banked, then
        // the real tsunami goes through a shield.
        let duel = DuelMatch::new("x", boxed(Charger), "y", boxed(Always(Move::Shield)));
        let completed = duel.run(100).unwrap();

        assert_eq!(completed.state, MatchState::Decided { first_won: true });
        assert_eq!(completed.rounds, 3);
        assert_eq!(
            completed.log.lines(),
            [
                "x vs y: load vs shield",
                "x vs y: load vs shield",
                "x vs y: tsunami vs shield",
                "x wins! (1-0)",
            ]
        );
        assert_eq!(completed.scores, MatchScores { first: 1.0, second: 0.0 });
    }

    #[test]
    fn illegal_fireball_downgrades_then_fires() {
        let duel = DuelMatch::new("x", boxed(Always(Move::Fireball)), "y", boxed(Always(Move::Load)));
        let completed = duel.run(100).unwrap();

        assert_eq!(
            completed.log.lines(),
            [
                "x vs y: load vs load",
                "x vs y: fireball vs load",
                "x wins! (1-0)",
            ]
        );
        assert_eq!(completed.scores, MatchScores { first: 1.0, second: 0.0 });
    }

    #[test]
    fn mirror_is_single_use() {
        let mut duel =
            DuelMatch::new("m", boxed(Always(Move::Mirror)), "l", boxed(Always(Move::Load)));
        // Round 1: mirror goes through (vs load: draw) and burns the flag.
        duel.play_round().unwrap();
        assert!(!duel.resources().0.mirror_available);
        assert_eq!(duel.log().lines()[0], "m vs l: mirror vs load");
        // Round 2: second mirror intent downgrades to load.
        duel.play_round().unwrap();
        assert_eq!(duel.log().lines()[1], "m vs l: load vs load");
    }

    #[test]
    fn tsunami_at_exactly_two_energy_leaves_zero() {
        let mut duel = DuelMatch::new("x", boxed(Charger), "y", boxed(Always(Move::Shield)));
        duel.play_round().unwrap();
        duel.play_round().unwrap();
        assert_eq!(duel.resources().0.energy, 2);
        duel.play_round().unwrap();
        assert_eq!(duel.resources().0.energy, 0);
        assert_eq!(duel.state(), MatchState::Decided { first_won: true });
    }

    #[test]
    fn mirror_reflects_a_fireball() {
        // Shields round 1, then holds up the mirror just as the opponent
        // has banked enough energy to actually throw a fireball.
        struct Ambusher {
            round: usize,
        }
        impl AgentProvider for Ambusher {
            fn play(&mut self, _m: Option<Move>) -> anyhow::Result<Move> {
                self.round += 1;
                if self.round == 1 {
                    Ok(Move::Shield)
                } else {
                    Ok(Move::Mirror)
                }
            }
        }
        let duel = DuelMatch::new(
            "m",
            boxed(Ambusher { round: 0 }),
            "f",
            boxed(Always(Move::Fireball)),
        );
        let completed = duel.run(100).unwrap();
        // round 1: shield vs load (downgraded fireball) -> draw
        // round 2: mirror vs fireball -> the mirror side wins
        assert_eq!(completed.log.lines()[0], "m vs f: shield vs load");
        assert_eq!(completed.log.lines()[1], "m vs f: mirror vs fireball");
        assert_eq!(completed.state, MatchState::Decided { first_won: true });
        assert_eq!(completed.log.lines()[2], "m wins! (1-0)");
    }

    #[test]
    fn wasted_mirror_loses_to_the_followup_fireball() {
        // Mirror thrown against a harmless load is spent; the real fireball
        // lands one round later.
        let duel = DuelMatch::new("m", boxed(Always(Move::Mirror)), "f", boxed(Always(Move::Fireball)));
        let completed = duel.run(100).unwrap();
        assert_eq!(completed.log.lines()[0], "m vs f: mirror vs load");
        assert_eq!(completed.log.lines()[1], "m vs f: load vs fireball");
        assert_eq!(completed.state, MatchState::Decided { first_won: false });
    }

    #[test]
    fn provider_error_fails_the_match() {
        let duel = DuelMatch::new("bad", boxed(Failing), "b", boxed(Always(Move::Shield)));
        let err = duel.run(100).unwrap_err();
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn finished_match_ignores_further_rounds() {
        let mut duel = DuelMatch::new("x", boxed(Charger), "y", boxed(Always(Move::Shield)));
        while duel.play_round().unwrap() == MatchState::InProgress {}
        let rounds_logged = duel.log().lines().len();
        assert_eq!(duel.play_round().unwrap(), MatchState::Decided { first_won: true });
        assert_eq!(duel.log().lines().len(), rounds_logged);
    }
}
