use rand::Rng;
use rltris_agents::{Agent, Transition};
use rltris_engine::{Action, NextStates, Simulator};
use rltris_features::extract;
use serde::{Deserialize, Serialize};

/// Why an episode stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
pub enum EpisodeEnd {
    /// A step reported a terminal outcome.
    GameOver,
    /// The active piece had no legal placement.
    NoMoves,
    /// The step bound was reached first.
    StepLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeReport {
    pub score: f32,
    pub steps: usize,
    pub lines_cleared: usize,
    pub end: EpisodeEnd,
}

/// Plays one episode from a fresh reset, letting `agent` learn from every step.
///
/// Each step extracts the features of the current board, enumerates the next
/// states, plays the agent's choice and hands the resulting [`Transition`] to
/// [`Agent::observe`] only after the simulator resolved it.
pub fn run_episode<A, R>(
    sim: &mut Simulator,
    agent: &mut A,
    max_steps: usize,
    rng: &mut R,
) -> Result<EpisodeReport, A::Error>
where
    A: Agent,
    R: Rng + ?Sized,
{
    sim.reset();
    let mut steps = 0;
    let end = loop {
        if steps >= max_steps {
            break EpisodeEnd::StepLimit;
        }
        let before = extract(sim.board());
        let next_states = sim.enumerate_next_states();
        let Some(action) = agent.select_action(&next_states, rng)? else {
            break EpisodeEnd::NoMoves;
        };
        let outcome = sim.step(action);
        steps += 1;
        let after = extract(sim.board());
        agent.observe(
            Transition::new(before, outcome.reward, after, outcome.terminal),
            rng,
        )?;
        if outcome.terminal {
            break EpisodeEnd::GameOver;
        }
    };
    Ok(report(sim, steps, end))
}

/// Plays one episode from a fresh reset without learning.
pub fn play_episode<A, R>(
    sim: &mut Simulator,
    agent: &A,
    max_steps: usize,
    rng: &mut R,
) -> Result<EpisodeReport, A::Error>
where
    A: Agent,
    R: Rng + ?Sized,
{
    play_with(sim, max_steps, |next_states| {
        agent.select_action(next_states, rng)
    })
}

fn play_with<F, E>(sim: &mut Simulator, max_steps: usize, mut select: F) -> Result<EpisodeReport, E>
where
    F: FnMut(&NextStates) -> Result<Option<Action>, E>,
{
    sim.reset();
    let mut steps = 0;
    let end = loop {
        if steps >= max_steps {
            break EpisodeEnd::StepLimit;
        }
        let Some(action) = select(&sim.enumerate_next_states())? else {
            break EpisodeEnd::NoMoves;
        };
        steps += 1;
        if sim.step(action).terminal {
            break EpisodeEnd::GameOver;
        }
    };
    Ok(report(sim, steps, end))
}

fn report(sim: &Simulator, steps: usize, end: EpisodeEnd) -> EpisodeReport {
    EpisodeReport {
        score: sim.score(),
        steps,
        lines_cleared: sim.stats().total_cleared_lines(),
        end,
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;
    use rltris_engine::{Board, Seed};
    use rltris_features::FeatureVector;

    use super::*;

    /// Always plays the first candidate and records what it observed.
    #[derive(Debug, Default)]
    struct FirstChoice {
        observed: Vec<Transition>,
        episodes: usize,
    }

    impl Agent for FirstChoice {
        type Error = Infallible;

        fn select_action<R>(
            &self,
            next_states: &NextStates,
            _rng: &mut R,
        ) -> Result<Option<Action>, Infallible>
        where
            R: Rng + ?Sized,
        {
            Ok(next_states.nth_action(0))
        }

        fn observe<R>(&mut self, transition: Transition, _rng: &mut R) -> Result<(), Infallible>
        where
            R: Rng + ?Sized,
        {
            self.observed.push(transition);
            Ok(())
        }

        fn end_episode(&mut self) {
            self.episodes += 1;
        }

        fn set_exploration(&mut self, _enabled: bool) {}

        fn epsilon(&self) -> f32 {
            0.0
        }
    }

    #[test]
    fn test_episode_runs_until_game_over() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut sim = Simulator::with_seed(Seed::from(3));
        let mut agent = FirstChoice::default();

        // Stacking every piece at the leftmost placement tops out quickly.
        let report = run_episode(&mut sim, &mut agent, 1_000, &mut rng).unwrap();
        assert!(
            report.end.is_game_over() || report.end.is_no_moves(),
            "{report:?}"
        );
        assert!(report.steps < 1_000);
        assert_eq!(agent.observed.len(), report.steps);
        assert_eq!(report.score, sim.score());
    }

    #[test]
    fn test_transitions_chain_board_features() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut sim = Simulator::with_seed(Seed::from(9));
        let mut agent = FirstChoice::default();
        let report = run_episode(&mut sim, &mut agent, 10, &mut rng).unwrap();

        let first = agent.observed.first().unwrap();
        assert_eq!(first.before, extract(&Board::EMPTY));
        for pair in agent.observed.windows(2) {
            assert_eq!(pair[0].after, pair[1].before);
        }
        let last = agent.observed.last().unwrap();
        assert_eq!(last.after, extract(sim.board()));
        assert_eq!(last.terminal, report.end.is_game_over());
        assert!(agent.observed[..agent.observed.len() - 1]
            .iter()
            .all(|t| !t.terminal));
    }

    #[test]
    fn test_step_limit() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut sim = Simulator::with_seed(Seed::from(1));
        let mut agent = FirstChoice::default();
        let report = run_episode(&mut sim, &mut agent, 2, &mut rng).unwrap();
        assert_eq!(report.end, EpisodeEnd::StepLimit);
        assert_eq!(report.steps, 2);
        assert_eq!(agent.observed.len(), 2);

        let report = run_episode(&mut sim, &mut agent, 0, &mut rng).unwrap();
        assert_eq!(report.steps, 0);
        assert_eq!(report.score, 0.0);
    }

    #[test]
    fn test_play_episode_does_not_observe() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut sim = Simulator::with_seed(Seed::from(3));
        let agent = FirstChoice::default();
        let report = play_episode(&mut sim, &agent, 5, &mut rng).unwrap();
        assert_eq!(report.steps, 5);
        assert!(agent.observed.is_empty());
        assert!(report.score > 0.0);
    }

    #[test]
    fn test_reset_between_episodes() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut sim = Simulator::with_seed(Seed::from(4));
        let mut agent = FirstChoice::default();
        run_episode(&mut sim, &mut agent, 1_000, &mut rng).unwrap();
        agent.observed.clear();
        run_episode(&mut sim, &mut agent, 1, &mut rng).unwrap();
        assert_eq!(agent.observed[0].before, FeatureVector::default());
    }
}
