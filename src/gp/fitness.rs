//! Rollout-based fitness evaluation.
//!
//! A program's fitness is its mean net reward over a number of independent
//! episodes. Episodes are bounded by a maximum step count so evaluation
//! terminates even against an environment that never signals completion.
//! Programs are independent of one another, so population evaluation fans
//! out across rayon workers, each owning its own environment instance.

// Mean fitness divides by the episode count
#![allow(clippy::cast_precision_loss)]

use crate::env::{Environment, EnvironmentError};
use crate::error::EvalError;
use crate::gp::eval::evaluate;
use crate::gp::symbols::Registry;
use crate::gp::tree::{Node, Program};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for fitness evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitnessConfig {
    /// Number of independent episodes averaged per evaluation.
    pub episodes: usize,
    /// Maximum steps per episode.
    pub max_steps: u32,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            episodes: 5,
            max_steps: 1000,
        }
    }
}

/// Error during a single program's fitness evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum FitnessError {
    /// The program could not be evaluated against an observation.
    Eval(EvalError),
    /// The environment adapter failed.
    Environment(EnvironmentError),
}

impl fmt::Display for FitnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eval(e) => write!(f, "evaluation error: {e}"),
            Self::Environment(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for FitnessError {}

impl From<EvalError> for FitnessError {
    fn from(e: EvalError) -> Self {
        Self::Eval(e)
    }
}

impl From<EnvironmentError> for FitnessError {
    fn from(e: EnvironmentError) -> Self {
        Self::Environment(e)
    }
}

/// Evaluate one program's fitness: mean net reward across episodes.
///
/// Each episode resets the environment, then repeatedly evaluates the tree
/// against the current observation, steps with the resulting action, and
/// accumulates reward until the environment signals completion or the step
/// bound is reached.
///
/// # Errors
///
/// Returns a [`FitnessError`] if the tree cannot be evaluated or the
/// environment fails.
pub fn evaluate_program<E: Environment>(
    root: &Node,
    registry: &Registry,
    env: &mut E,
    config: &FitnessConfig,
) -> Result<f64, FitnessError> {
    let mut total = 0.0;

    for _ in 0..config.episodes {
        let mut observation = env.reset()?;
        let mut net_reward = 0.0;

        for _ in 0..config.max_steps {
            let action = evaluate(root, registry, &observation)?;
            let step = env.step(&action)?;
            net_reward += step.reward;
            observation = step.observation;
            if step.done {
                break;
            }
        }
        total += net_reward;
    }

    Ok(total / config.episodes as f64)
}

/// Assign fitness to every program in the population.
///
/// Programs are evaluated concurrently; each worker builds its own
/// environment from the factory, so no state is shared. A program whose
/// evaluation fails with an [`EvalError`] is assigned minimal fitness
/// (negative infinity) and logged; an [`EnvironmentError`] aborts the whole
/// evaluation, since the engine cannot repair an external adapter.
///
/// # Errors
///
/// Returns the first [`EnvironmentError`] any worker encounters.
pub fn evaluate_population<E, F>(
    population: &mut [Program],
    registry: &Registry,
    make_env: F,
    config: &FitnessConfig,
) -> Result<(), EnvironmentError>
where
    E: Environment,
    F: Fn() -> E + Sync,
{
    population.par_iter_mut().try_for_each(|program| {
        let mut env = make_env();
        let outcome = evaluate_program(&program.root, registry, &mut env, config);
        env.close();

        match outcome {
            Ok(fitness) => {
                program.fitness = Some(fitness);
                Ok(())
            }
            Err(FitnessError::Eval(e)) => {
                log::warn!("program degraded to minimal fitness: {e}");
                program.fitness = Some(f64::NEG_INFINITY);
                Ok(())
            }
            Err(FitnessError::Environment(e)) => Err(e),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Observation, Step};
    use crate::gp::symbols::{TerminalRule, Value, ValueType};

    /// Pays `reward` per step and completes after `length` steps.
    struct FlatEnv {
        reward: f64,
        length: u32,
        taken: u32,
    }

    impl FlatEnv {
        fn new(reward: f64, length: u32) -> Self {
            Self { reward, length, taken: 0 }
        }
    }

    impl Environment for FlatEnv {
        fn reset(&mut self) -> Result<Observation, EnvironmentError> {
            self.taken = 0;
            let mut obs = Observation::new();
            obs.insert("t", Value::Number(0.0));
            Ok(obs)
        }

        fn step(&mut self, _action: &Value) -> Result<Step, EnvironmentError> {
            self.taken += 1;
            let mut obs = Observation::new();
            obs.insert("t", Value::Number(f64::from(self.taken)));
            Ok(Step {
                observation: obs,
                reward: self.reward,
                done: self.taken >= self.length,
                info: None,
            })
        }
    }

    /// Fails on the first step.
    struct BrokenEnv;

    impl Environment for BrokenEnv {
        fn reset(&mut self) -> Result<Observation, EnvironmentError> {
            Ok(Observation::new())
        }

        fn step(&mut self, _action: &Value) -> Result<Step, EnvironmentError> {
            Err(EnvironmentError::new("stepper offline"))
        }
    }

    fn constant_policy() -> (Registry, Node) {
        let mut registry = Registry::new();
        let go = registry
            .register_terminal("go", ValueType::Action, TerminalRule::Constant(Value::Action(1)))
            .unwrap();
        (registry, Node::Terminal { terminal: go, value: None })
    }

    #[test]
    fn test_fitness_is_mean_net_reward() {
        let (registry, root) = constant_policy();
        let config = FitnessConfig { episodes: 3, max_steps: 100 };
        let mut env = FlatEnv::new(0.5, 10);

        let fitness = evaluate_program(&root, &registry, &mut env, &config).unwrap();
        assert!((fitness - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_step_bound_caps_episodes() {
        let (registry, root) = constant_policy();
        // The environment would run 1000 steps; the bound stops it at 4.
        let config = FitnessConfig { episodes: 1, max_steps: 4 };
        let mut env = FlatEnv::new(1.0, 1000);

        let fitness = evaluate_program(&root, &registry, &mut env, &config).unwrap();
        assert!((fitness - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_population_evaluation_assigns_all() {
        let (registry, root) = constant_policy();
        let mut population: Vec<Program> =
            (0..8).map(|_| Program::new(root.clone())).collect();
        let config = FitnessConfig { episodes: 2, max_steps: 10 };

        evaluate_population(&mut population, &registry, || FlatEnv::new(1.0, 10), &config)
            .unwrap();

        for program in &population {
            assert!((program.fitness.unwrap() - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_missing_input_degrades_to_minimal_fitness() {
        let mut registry = Registry::new();
        let ghost = registry
            .register_terminal(
                "ghost",
                ValueType::Action,
                TerminalRule::Input("missing".into()),
            )
            .unwrap();
        let mut population = vec![Program::new(Node::Terminal {
            terminal: ghost,
            value: None,
        })];
        let config = FitnessConfig { episodes: 1, max_steps: 5 };

        evaluate_population(&mut population, &registry, || FlatEnv::new(1.0, 5), &config)
            .unwrap();
        assert_eq!(population[0].fitness, Some(f64::NEG_INFINITY));
    }

    #[test]
    fn test_environment_error_aborts() {
        let (registry, root) = constant_policy();
        let mut population = vec![Program::new(root)];
        let config = FitnessConfig::default();

        let err = evaluate_population(&mut population, &registry, || BrokenEnv, &config)
            .unwrap_err();
        assert_eq!(err, EnvironmentError::new("stepper offline"));
        assert_eq!(population[0].fitness, None);
    }
}
