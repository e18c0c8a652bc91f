//! The environment adapter contract consumed by rollout fitness evaluation.
//!
//! The engine drives a policy through episodes of a sequential-decision
//! environment: `reset` yields the first observation, `step` applies an
//! action and yields the next observation together with a reward and a
//! completion flag. Concrete environments live outside the engine; it
//! consumes this trait only.

use crate::gp::Value;
use std::collections::HashMap;
use std::fmt;

/// A named snapshot of the environment state, read by observation terminals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observation {
    fields: HashMap<String, Value>,
}

impl Observation {
    /// Create an empty observation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a named field, replacing any previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    /// Look up a named field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<Value> {
        self.fields.get(field).copied()
    }

    /// Number of fields in this observation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether this observation carries no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for Observation {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Result of applying one action to the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Observation after the action took effect.
    pub observation: Observation,
    /// Reward earned by the action.
    pub reward: f64,
    /// Whether the episode is complete.
    pub done: bool,
    /// Free-form diagnostic string; ignored by the engine.
    pub info: Option<String>,
}

/// Failure inside an environment adapter.
///
/// The engine cannot repair an external environment, so these abort the run
/// and are propagated unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentError {
    message: String,
}

impl EnvironmentError {
    /// Create an error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for EnvironmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "environment error: {}", self.message)
    }
}

impl std::error::Error for EnvironmentError {}

/// A sequential-decision environment the engine can roll policies through.
///
/// Fitness evaluation constructs one instance per worker, so implementations
/// need no internal synchronization; they do need to tolerate repeated
/// `reset` calls.
pub trait Environment {
    /// Start a new episode and return its first observation.
    ///
    /// # Errors
    ///
    /// Returns an [`EnvironmentError`] if the environment cannot start an
    /// episode.
    fn reset(&mut self) -> Result<Observation, EnvironmentError>;

    /// Apply one action and advance the environment by one time step.
    ///
    /// # Errors
    ///
    /// Returns an [`EnvironmentError`] if the action cannot be applied.
    fn step(&mut self, action: &Value) -> Result<Step, EnvironmentError>;

    /// Release any resources held by the environment. Called once per
    /// fitness evaluation, after the last episode.
    fn close(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_roundtrip() {
        let mut obs = Observation::new();
        obs.insert("x", Value::Number(1.5));
        obs.insert("x", Value::Number(2.5));

        assert_eq!(obs.get("x"), Some(Value::Number(2.5)));
        assert_eq!(obs.get("y"), None);
        assert_eq!(obs.len(), 1);
    }

    #[test]
    fn test_observation_from_iter() {
        let obs: Observation = [
            ("x".to_string(), Value::Number(0.0)),
            ("done".to_string(), Value::Boolean(false)),
        ]
        .into_iter()
        .collect();

        assert!(!obs.is_empty());
        assert_eq!(obs.get("done"), Some(Value::Boolean(false)));
    }
}
