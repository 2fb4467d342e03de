use std::{convert::Infallible, error::Error};

use rand::Rng;
use rltris_engine::{Action, NextStates};

use crate::{
    approximator::ValueApproximator,
    replay_memory::Transition,
    tabular::TabularAgent,
    value_agent::{ValueAgent, ValueAgentError},
};

/// The contract between a learning agent and the episode loop.
pub trait Agent {
    type Error: Error + Send + Sync + 'static;

    /// Chooses one of `next_states`, or `None` if there is no candidate.
    fn select_action<R>(
        &self,
        next_states: &NextStates,
        rng: &mut R,
    ) -> Result<Option<Action>, Self::Error>
    where
        R: Rng + ?Sized;

    /// Learns from one fully resolved step.
    fn observe<R>(&mut self, transition: Transition, rng: &mut R) -> Result<(), Self::Error>
    where
        R: Rng + ?Sized;

    /// Advances per-episode schedules such as ε decay.
    fn end_episode(&mut self);

    /// Turns exploration on or off. With exploration off every choice is greedy.
    fn set_exploration(&mut self, enabled: bool);

    fn epsilon(&self) -> f32;
}

impl Agent for TabularAgent {
    type Error = Infallible;

    fn select_action<R>(
        &self,
        next_states: &NextStates,
        rng: &mut R,
    ) -> Result<Option<Action>, Infallible>
    where
        R: Rng + ?Sized,
    {
        Ok(TabularAgent::select_action(self, next_states, rng))
    }

    fn observe<R>(&mut self, transition: Transition, _rng: &mut R) -> Result<(), Infallible>
    where
        R: Rng + ?Sized,
    {
        self.update(
            &transition.before,
            transition.reward,
            &transition.after,
            transition.terminal,
        );
        Ok(())
    }

    fn end_episode(&mut self) {
        self.exploration_mut().decay();
        self.decay_learning_rate();
    }

    fn set_exploration(&mut self, enabled: bool) {
        self.exploration_mut().set_enabled(enabled);
    }

    fn epsilon(&self) -> f32 {
        self.exploration().epsilon()
    }
}

impl<A> Agent for ValueAgent<A>
where
    A: ValueApproximator,
{
    type Error = ValueAgentError;

    fn select_action<R>(
        &self,
        next_states: &NextStates,
        rng: &mut R,
    ) -> Result<Option<Action>, ValueAgentError>
    where
        R: Rng + ?Sized,
    {
        Ok(self.act(next_states, rng)?)
    }

    fn observe<R>(&mut self, transition: Transition, rng: &mut R) -> Result<(), ValueAgentError>
    where
        R: Rng + ?Sized,
    {
        self.remember(transition);
        self.learn(rng)?;
        Ok(())
    }

    fn end_episode(&mut self) {
        self.update_epsilon();
    }

    fn set_exploration(&mut self, enabled: bool) {
        self.exploration_mut().set_enabled(enabled);
    }

    fn epsilon(&self) -> f32 {
        self.exploration().epsilon()
    }
}
