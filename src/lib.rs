// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Arbor: a typed genetic-programming engine for evolving control policies.
//!
//! This crate evolves symbolic programs (typed expression trees) acting as
//! policies for a sequential-decision environment with a reset/step
//! interface. It provides:
//! - A typed symbol vocabulary and recursive program representation
//! - Stochastic tree generation (grow/full) under depth and type constraints
//! - Tree evaluation against environment observations
//! - A generational evolutionary loop with rollout-based fitness,
//!   tournament selection, subtree crossover, and subtree mutation
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │         Evolution Loop              │
//! ├─────────────────────────────────────┤
//! │  Selection │ Crossover │ Mutation   │
//! ├─────────────────────────────────────┤
//! │    Rollout Fitness (Environment)    │
//! ├─────────────────────────────────────┤
//! │  Registry → Generator → Evaluator   │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use arbor::gp::{evolve, install_all, EvolutionConfig, Registry, TerminalRule, ValueType};
//!
//! let mut registry = Registry::new();
//! registry.register_terminal("x", ValueType::Number, TerminalRule::Input("x".into()))?;
//! install_all(&mut registry)?;
//!
//! let config = EvolutionConfig::default();
//! let (best, stats) = evolve(&registry, &config, MyEnvironment::new)?;
//! ```

pub mod env;
pub mod error;
pub mod gp;

pub use env::{Environment, EnvironmentError, Observation, Step};
pub use error::{ConfigError, EvalError};

// Re-export key GP types at crate root for convenience
pub use gp::{EvolutionConfig, Node, Program, Registry, Value, ValueType, evaluate, evolve};
