//! Parent selection for the generational loop.
//!
//! Tournament selection: sample a fixed number of programs uniformly with
//! replacement and keep the fittest, breaking ties uniformly at random. The
//! population is only read, never reordered or mutated.

// Statistics use intentional precision-losing casts; tie detection compares
// fitness scores for exact equality
#![allow(clippy::cast_precision_loss, clippy::float_cmp)]

use crate::gp::tree::Program;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Configuration for tournament selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Number of programs competing in each tournament.
    pub tournament_size: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self { tournament_size: 5 }
    }
}

/// Select a parent index by tournament.
///
/// Draws `tournament_size` indices uniformly with replacement and returns
/// the index of the fittest sampled program; exact fitness ties are broken
/// uniformly at random. Unevaluated programs rank below every evaluated
/// one.
pub fn tournament_select<R: Rng>(
    population: &[Program],
    tournament_size: usize,
    rng: &mut R,
) -> usize {
    if population.is_empty() {
        return 0;
    }

    let k = tournament_size.max(1);
    let mut winners: Vec<usize> = Vec::with_capacity(k);
    let mut best_score = f64::NEG_INFINITY;

    for _ in 0..k {
        let idx = rng.gen_range(0..population.len());
        let score = population[idx].score();
        if winners.is_empty() || score > best_score {
            best_score = score;
            winners.clear();
            winners.push(idx);
        } else if score == best_score {
            winners.push(idx);
        }
    }

    winners[rng.gen_range(0..winners.len())]
}

/// Index of the fittest program, or `None` for an empty population.
///
/// Used for elitism and best-ever tracking; equal scores keep the earliest
/// index.
#[must_use]
pub fn best_index(population: &[Program]) -> Option<usize> {
    population
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| {
            a.score()
                .partial_cmp(&b.score())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(idx, _)| idx)
}

/// Fitness distribution of a population, computed once per generation.
#[derive(Debug, Clone, Copy)]
pub struct SelectionStats {
    /// Mean fitness of the population.
    pub mean_fitness: f64,
    /// Best fitness in the population.
    pub best_fitness: f64,
    /// Worst fitness in the population.
    pub worst_fitness: f64,
    /// Standard deviation of fitness.
    pub fitness_std: f64,
}

impl SelectionStats {
    /// Calculate statistics from a population's assigned fitness scores.
    #[must_use]
    pub fn from_population(population: &[Program]) -> Self {
        if population.is_empty() {
            return Self {
                mean_fitness: 0.0,
                best_fitness: 0.0,
                worst_fitness: 0.0,
                fitness_std: 0.0,
            };
        }

        let scores: Vec<f64> = population.iter().map(Program::score).collect();
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        let best = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let worst = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let variance =
            scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / scores.len() as f64;

        Self {
            mean_fitness: mean,
            best_fitness: best,
            worst_fitness: worst,
            fitness_std: variance.sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gp::symbols::{Registry, TerminalRule, Value, ValueType};
    use crate::gp::tree::Node;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn population(fitness: &[f64]) -> Vec<Program> {
        let mut registry = Registry::new();
        let t = registry
            .register_terminal("go", ValueType::Action, TerminalRule::Constant(Value::Action(1)))
            .unwrap();

        fitness
            .iter()
            .map(|&f| Program {
                root: Node::Terminal { terminal: t, value: None },
                fitness: Some(f),
            })
            .collect()
    }

    #[test]
    fn test_tournament_prefers_fitter() {
        let mut rng = SmallRng::seed_from_u64(42);
        let pop = population(&[0.1, 0.5, 0.9, 0.2, 0.8]);

        let mut counts = [0usize; 5];
        for _ in 0..1000 {
            let idx = tournament_select(&pop, 3, &mut rng);
            counts[idx] += 1;
        }

        // Index 2 (fitness 0.9) should be selected most often
        let max_idx = counts.iter().enumerate().max_by_key(|(_, c)| *c).unwrap().0;
        assert_eq!(max_idx, 2);
    }

    #[test]
    fn test_tournament_breaks_ties_uniformly() {
        let mut rng = SmallRng::seed_from_u64(123);
        let pop = population(&[1.0, 1.0]);

        let mut counts = [0usize; 2];
        for _ in 0..2000 {
            counts[tournament_select(&pop, 2, &mut rng)] += 1;
        }

        // Both tied programs should win a substantial share
        assert!(counts.iter().all(|&c| c > 600), "tie counts {counts:?}");
    }

    #[test]
    fn test_tournament_never_mutates_population() {
        let mut rng = SmallRng::seed_from_u64(7);
        let pop = population(&[0.3, 0.6, 0.1]);
        let snapshot = pop.clone();

        for _ in 0..100 {
            tournament_select(&pop, 3, &mut rng);
        }
        assert_eq!(pop, snapshot);
    }

    #[test]
    fn test_unevaluated_programs_rank_last() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut pop = population(&[0.0, 0.5]);
        pop[0].fitness = None;

        for _ in 0..50 {
            assert_eq!(tournament_select(&pop, 64, &mut rng), 1);
        }
    }

    #[test]
    fn test_best_index() {
        let pop = population(&[0.3, 0.9, 0.1, 0.8, 0.5]);
        assert_eq!(best_index(&pop), Some(1));
        assert_eq!(best_index(&[]), None);
    }

    #[test]
    fn test_selection_stats() {
        let pop = population(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let stats = SelectionStats::from_population(&pop);

        assert!((stats.mean_fitness - 3.0).abs() < 0.001);
        assert!((stats.best_fitness - 5.0).abs() < 0.001);
        assert!((stats.worst_fitness - 1.0).abs() < 0.001);
        assert!(stats.fitness_std > 0.0);
    }
}
