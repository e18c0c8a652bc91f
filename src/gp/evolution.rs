//! The generational evolutionary loop.
//!
//! Orchestrates the run: initialization, rollout fitness evaluation,
//! selection, variation, replacement, and termination. Each generation
//! depends on the fully evaluated previous one, so the loop itself is
//! strictly sequential; all parallelism lives inside fitness evaluation.

// Generation counters are persisted as u32; test fixtures cast positions
#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

use crate::env::{Environment, EnvironmentError};
use crate::error::ConfigError;
use crate::gp::crossover::{CrossoverConfig, crossover};
use crate::gp::fitness::{FitnessConfig, evaluate_population};
use crate::gp::generate::{Generator, GrowMethod};
use crate::gp::mutation::mutate;
use crate::gp::persistence::{
    Checkpoint, best_program_path, checkpoint_path, save_best_program, save_checkpoint,
};
use crate::gp::selection::{SelectionConfig, SelectionStats, best_index, tournament_select};
use crate::gp::symbols::{Registry, ValueType};
use crate::gp::tree::Program;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Variation rates for producing the next generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariationConfig {
    /// Probability a child is produced by crossover (otherwise it starts as
    /// a copy of its first parent).
    pub crossover_rate: f64,
    /// Probability a child is mutated after crossover.
    pub mutation_rate: f64,
    /// Position-pair attempts before crossover falls back to a copy.
    pub crossover_attempts: usize,
}

impl Default for VariationConfig {
    fn default() -> Self {
        Self {
            crossover_rate: 0.9,
            mutation_rate: 0.2,
            crossover_attempts: 8,
        }
    }
}

/// Configuration for an evolution run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Population size, fixed for the whole run.
    pub population_size: usize,
    /// Number of generations to evaluate before stopping.
    pub max_generations: usize,
    /// Maximum program depth (root = depth 0).
    pub max_depth: usize,
    /// Probability of growing a terminal instead of a function during grow
    /// generation.
    pub terminal_growth: f64,
    /// Stop early once the best fitness seen reaches this value.
    pub fitness_threshold: Option<f64>,
    /// Copy the generation's best program unchanged into the next
    /// generation, displacing one child.
    pub elitism: bool,
    /// RNG seed for reproducibility.
    pub seed: u64,
    /// Declared type of program roots.
    pub root: ValueType,
    /// Fitness evaluation configuration.
    pub fitness: FitnessConfig,
    /// Selection configuration.
    pub selection: SelectionConfig,
    /// Variation configuration.
    pub variation: VariationConfig,
    /// Directory for checkpoints and the best-program file; `None` disables
    /// persistence.
    pub output_dir: Option<PathBuf>,
    /// How often to save checkpoints (every N generations).
    pub checkpoint_interval: usize,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 50,
            max_depth: 6,
            terminal_growth: 0.3,
            fitness_threshold: None,
            elitism: true,
            seed: 42,
            root: ValueType::Action,
            fitness: FitnessConfig::default(),
            selection: SelectionConfig::default(),
            variation: VariationConfig::default(),
            output_dir: None,
            checkpoint_interval: 25,
        }
    }
}

impl EvolutionConfig {
    /// Check every parameter before a run starts.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::InvalidPopulationSize(self.population_size));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth(self.max_depth));
        }
        if !(0.0..=1.0).contains(&self.terminal_growth) {
            return Err(ConfigError::InvalidGrowthRate(self.terminal_growth));
        }
        if !(0.0..=1.0).contains(&self.variation.crossover_rate) {
            return Err(ConfigError::InvalidRate {
                name: "crossover rate",
                value: self.variation.crossover_rate,
            });
        }
        if !(0.0..=1.0).contains(&self.variation.mutation_rate) {
            return Err(ConfigError::InvalidRate {
                name: "mutation rate",
                value: self.variation.mutation_rate,
            });
        }
        if self.fitness.episodes == 0 {
            return Err(ConfigError::InvalidEpisodes(self.fitness.episodes));
        }
        if self.selection.tournament_size == 0 {
            return Err(ConfigError::InvalidTournamentSize(self.selection.tournament_size));
        }
        Ok(())
    }
}

/// Statistics for a single generation.
#[derive(Debug, Clone, Copy)]
pub struct GenerationStats {
    /// Generation number.
    pub generation: usize,
    /// Best fitness in this generation.
    pub best_fitness: f64,
    /// Mean fitness.
    pub mean_fitness: f64,
    /// Fitness standard deviation.
    pub fitness_std: f64,
}

/// Overall statistics from an evolution run.
#[derive(Debug, Clone)]
pub struct EvolutionStats {
    /// Statistics per generation.
    pub generations: Vec<GenerationStats>,
    /// Best fitness achieved.
    pub best_fitness: f64,
    /// Generation where the best fitness was achieved.
    pub best_generation: usize,
    /// Total time in seconds.
    pub elapsed_seconds: f64,
}

/// Error during an evolution run.
#[derive(Debug)]
pub enum EvolutionError {
    /// Invalid or unsatisfiable configuration.
    Config(ConfigError),
    /// The environment adapter failed.
    Environment(EnvironmentError),
    /// Persistence I/O failed.
    Io(std::io::Error),
}

impl fmt::Display for EvolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration error: {e}"),
            Self::Environment(e) => write!(f, "{e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for EvolutionError {}

impl From<ConfigError> for EvolutionError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<EnvironmentError> for EvolutionError {
    fn from(e: EnvironmentError) -> Self {
        Self::Environment(e)
    }
}

impl From<std::io::Error> for EvolutionError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Run an evolution to completion and return the best program ever seen.
///
/// The run proceeds Initialize → Evaluate → Select&Vary → Replace until the
/// generation cap is reached or the fitness threshold is met; the returned
/// program is the best across all generations, not necessarily from the
/// last one. `make_env` is called once per fitness worker.
///
/// # Errors
///
/// Returns an [`EvolutionError`] if the configuration is invalid, the
/// registry cannot supply required symbols, the environment fails, or final
/// persistence fails.
pub fn evolve<E, F>(
    registry: &Registry,
    config: &EvolutionConfig,
    make_env: F,
) -> Result<(Program, EvolutionStats), EvolutionError>
where
    E: Environment,
    F: Fn() -> E + Sync,
{
    let start_time = std::time::Instant::now();

    config.validate()?;
    if let Some(dir) = &config.output_dir {
        std::fs::create_dir_all(dir)?;
    }

    let mut rng = SmallRng::seed_from_u64(config.seed);
    let generator = Generator::new(registry, config.terminal_growth)?;
    let crossover_config = CrossoverConfig {
        max_depth: config.max_depth,
        max_attempts: config.variation.crossover_attempts,
    };

    // Initialize
    let mut population = Vec::with_capacity(config.population_size);
    for _ in 0..config.population_size {
        let root = generator.generate(config.max_depth, GrowMethod::Grow, config.root, &mut rng)?;
        population.push(Program::new(root));
    }

    let mut best: Option<Program> = None;
    let mut best_generation = 0;
    let mut gen_stats = Vec::new();
    let mut generation = 0usize;

    loop {
        // Evaluate
        evaluate_population(&mut population, registry, &make_env, &config.fitness)?;

        let stats = SelectionStats::from_population(&population);
        gen_stats.push(GenerationStats {
            generation,
            best_fitness: stats.best_fitness,
            mean_fitness: stats.mean_fitness,
            fitness_std: stats.fitness_std,
        });

        if let Some(idx) = best_index(&population)
            && best.as_ref().is_none_or(|b| population[idx].score() > b.score())
        {
            best = Some(population[idx].clone());
            best_generation = generation;
        }

        log::info!(
            "generation {generation}: best={:.4} mean={:.4} std={:.4}",
            stats.best_fitness,
            stats.mean_fitness,
            stats.fitness_std
        );

        if let Some(dir) = &config.output_dir
            && config.checkpoint_interval > 0
            && generation % config.checkpoint_interval == 0
        {
            let checkpoint = Checkpoint {
                generation: generation as u32,
                population: population.clone(),
                best_fitness: best.as_ref().map_or(f64::NEG_INFINITY, Program::score),
                rng_seed: config.seed,
            };
            if let Err(e) = save_checkpoint(&checkpoint, &checkpoint_path(dir, generation as u32)) {
                log::warn!("failed to save checkpoint: {e}");
            }
        }

        // Terminate?
        let threshold_met = match (config.fitness_threshold, &best) {
            (Some(threshold), Some(program)) => program.score() >= threshold,
            _ => false,
        };
        if threshold_met || generation + 1 >= config.max_generations {
            break;
        }

        // Select & vary
        let mut next = Vec::with_capacity(config.population_size);
        if config.elitism
            && let Some(idx) = best_index(&population)
        {
            next.push(population[idx].clone());
        }
        while next.len() < config.population_size {
            let first = tournament_select(&population, config.selection.tournament_size, &mut rng);
            let second = tournament_select(&population, config.selection.tournament_size, &mut rng);

            let mut child = if rng.gen_bool(config.variation.crossover_rate) {
                crossover(
                    &population[first].root,
                    &population[second].root,
                    registry,
                    &crossover_config,
                    &mut rng,
                )
            } else {
                population[first].root.clone()
            };
            if rng.gen_bool(config.variation.mutation_rate) {
                child = mutate(&child, &generator, config.max_depth, &mut rng)?;
            }
            next.push(Program::new(child));
        }

        // Replace
        population = next;
        generation += 1;
    }

    // The population is never empty, so a best program always exists.
    let best = best.unwrap_or_else(|| population[0].clone());

    if let Some(dir) = &config.output_dir {
        let checkpoint = Checkpoint {
            generation: generation as u32,
            population: population.clone(),
            best_fitness: best.score(),
            rng_seed: config.seed,
        };
        save_checkpoint(&checkpoint, &checkpoint_path(dir, generation as u32))?;
        save_best_program(&best, registry, best_generation as u32, &best_program_path(dir))?;
    }

    let elapsed = start_time.elapsed().as_secs_f64();
    let stats = EvolutionStats {
        generations: gen_stats,
        best_fitness: best.score(),
        best_generation,
        elapsed_seconds: elapsed,
    };
    Ok((best, stats))
}
