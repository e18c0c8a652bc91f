//! Genetic programming engine for typed policy trees.
//!
//! This module provides the complete evolutionary framework: a typed symbol
//! vocabulary, stochastic tree generation, tree evaluation, rollout-based
//! fitness, and the generational loop with selection, crossover, and
//! mutation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │         Evolution Loop              │
//! ├─────────────────────────────────────┤
//! │  Selection │ Crossover │ Mutation   │
//! ├─────────────────────────────────────┤
//! │    Rollout Fitness Evaluation       │
//! ├─────────────────────────────────────┤
//! │  Registry → Generator → Evaluator   │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use arbor::gp::{evolve, EvolutionConfig};
//!
//! let config = EvolutionConfig::default();
//! let (best, stats) = evolve(&registry, &config, CartEnv::new)?;
//! println!("{}", serde_json::to_string(&to_json(&best.root, &registry))?);
//! ```

mod crossover;
mod eval;
mod evolution;
mod fitness;
mod generate;
mod mutation;
mod ops;
mod persistence;
mod selection;
mod sexpr;
mod symbols;
mod tree;

pub use crossover::{CrossoverConfig, crossover};
pub use eval::evaluate;
pub use evolution::{
    EvolutionConfig, EvolutionError, EvolutionStats, GenerationStats, VariationConfig, evolve,
};
pub use fitness::{FitnessConfig, FitnessError, evaluate_population, evaluate_program};
pub use generate::{Generator, GrowMethod};
pub use mutation::mutate;
pub use ops::{
    install_all, install_arithmetic, install_branching, install_comparisons, install_logic,
};
pub use persistence::{
    BestProgram, Checkpoint, best_program_path, checkpoint_path, load_best_program,
    load_checkpoint, save_best_program, save_checkpoint,
};
pub use selection::{SelectionConfig, SelectionStats, best_index, tournament_select};
pub use sexpr::{SexprError, from_json, parse, to_json};
pub use symbols::{
    FunctionId, FunctionSymbol, Operator, Registry, TerminalId, TerminalRule, TerminalSymbol,
    Value, ValueType,
};
pub use tree::{Node, Program, Site};
