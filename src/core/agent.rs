// The decision loop around the repertoire.
//
// One `act` call is one atomic step: evaluate every precondition, let the
// selection policy pick among the eligible slots, snapshot, execute,
// snapshot again. Nothing else may mutate the environment between the two
// snapshots.

use crate::environment::Environment;
use crate::position::Pos;
use crate::prng::Prng;
use crate::schema::Repertoire;

/// World state plus drive level as seen immediately before or after an
/// executed effect. `codes` is a clone of the environment's derived
/// population-code vector, so later mutation cannot reach back into it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateSnapshot {
    pub food: Pos,
    pub mouth: Pos,
    pub paw: Pos,
    pub tube: Pos,
    pub hunger: f32,
    pub codes: Vec<f32>,
}

impl StateSnapshot {
    pub fn capture(env: &Environment, hunger: f32) -> Self {
        Self {
            food: env.food,
            mouth: env.mouth,
            paw: env.paw,
            tube: env.tube,
            hunger,
            codes: env.population_codes().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    /// Repertoire slot of the executed schema.
    pub slot: usize,
    pub reward: i32,
}

/// Tie-break strategy among simultaneously eligible schemas. The
/// repertoire order is not a priority order; whichever policy the caller
/// plugs in decides.
pub trait SelectionPolicy {
    /// Choose one of the `eligible` repertoire slots, or decline the step.
    fn choose(&mut self, eligible: &[usize]) -> Option<usize>;
}

/// Lowest eligible slot wins. With the standard catalogue this walks the
/// manipulation schemas first and falls back to the irrelevant no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstEligible;

impl SelectionPolicy for FirstEligible {
    fn choose(&mut self, eligible: &[usize]) -> Option<usize> {
        eligible.first().copied()
    }
}

/// Uniform pick among the eligible slots, from an own seeded stream so
/// episode reproducibility is independent of the environment's draws.
#[derive(Debug, Clone)]
pub struct RandomEligible {
    rng: Prng,
}

impl RandomEligible {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Prng::new(seed),
        }
    }
}

impl SelectionPolicy for RandomEligible {
    fn choose(&mut self, eligible: &[usize]) -> Option<usize> {
        if eligible.is_empty() {
            return None;
        }
        Some(eligible[self.rng.gen_range_usize(0, eligible.len())])
    }
}

#[derive(Debug, Clone)]
pub struct Agent {
    /// Drive level: 1.0 hungry, 0.0 sated. Only the eat schema writes it.
    pub hunger: f32,
    pub current_state: Option<StateSnapshot>,
    pub next_state: Option<StateSnapshot>,
    /// One-hot label of the last executed schema, over repertoire slots.
    pub training_signal: Vec<f32>,
}

impl Agent {
    pub fn new() -> Self {
        Self {
            hunger: 1.0,
            current_state: None,
            next_state: None,
            training_signal: Vec::new(),
        }
    }

    pub fn sated(&self) -> bool {
        self.hunger <= 0.0
    }

    /// Run one step: pick an eligible schema via `policy`, execute it, and
    /// record the before/after snapshots plus the training signal.
    ///
    /// Returns `None` when the policy declines (the irrelevant schema is
    /// always eligible, so the standard catalogue never runs dry; a policy
    /// may still refuse it).
    pub fn act<P: SelectionPolicy>(
        &mut self,
        env: &mut Environment,
        repertoire: &Repertoire,
        policy: &mut P,
    ) -> Option<StepOutcome> {
        let eligible = repertoire.eligible(env);
        let slot = policy.choose(&eligible)?;
        let schema = *repertoire.get(slot)?;

        self.current_state = Some(StateSnapshot::capture(env, self.hunger));
        let reward = schema.effects(env, self);
        self.next_state = Some(StateSnapshot::capture(env, self.hunger));
        self.training_signal = repertoire.one_hot(slot);

        Some(StepOutcome { slot, reward })
    }
}

impl Default for Agent {
    fn default() -> Self {
        Self::new()
    }
}
