//! Stochastic program generation under depth and type constraints.
//!
//! Both construction methods recurse top-down. `Full` only places terminals
//! at the depth limit, so every leaf sits exactly there; `Grow` may stop
//! early, placing a terminal with the configured probability at every level.

// Random-constant draws truncate intentionally for discrete action ranges
#![allow(clippy::cast_possible_truncation)]

use crate::error::ConfigError;
use crate::gp::symbols::{Registry, TerminalRule, Value, ValueType};
use crate::gp::tree::Node;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tree construction method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowMethod {
    /// Terminals may be placed before the depth limit, with the configured
    /// growth probability.
    Grow,
    /// Terminals are placed only at the depth limit.
    Full,
}

/// Random program generator over a symbol registry.
///
/// All draws go through the caller-supplied random source, so generation is
/// reproducible given a seed.
#[derive(Debug, Clone, Copy)]
pub struct Generator<'a> {
    registry: &'a Registry,
    terminal_growth: f64,
}

impl<'a> Generator<'a> {
    /// Create a generator with the given terminal growth probability.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidGrowthRate`] if the probability lies
    /// outside `[0, 1]`.
    pub fn new(registry: &'a Registry, terminal_growth: f64) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&terminal_growth) {
            return Err(ConfigError::InvalidGrowthRate(terminal_growth));
        }
        Ok(Self {
            registry,
            terminal_growth,
        })
    }

    /// The registry this generator draws from.
    #[must_use]
    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Generate a random tree of the expected type, at most `max_depth`
    /// levels deep (the root is depth 0).
    ///
    /// `max_depth == 0` always yields a single terminal, whatever the
    /// method.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the registry has no terminal of a
    /// required type, or no function returning a required type while depth
    /// remains.
    pub fn generate<R: Rng>(
        &self,
        max_depth: usize,
        method: GrowMethod,
        expected: ValueType,
        rng: &mut R,
    ) -> Result<Node, ConfigError> {
        if max_depth == 0
            || (method == GrowMethod::Grow && rng.gen_bool(self.terminal_growth))
        {
            return self.terminal(expected, rng);
        }

        // Candidates must return the expected type; drawing from the whole
        // function set would break the typed-tree invariant.
        let candidates = self.registry.functions_of_type(expected);
        if candidates.is_empty() {
            return Err(ConfigError::EmptyFunctionSet(expected));
        }
        let function = candidates[rng.gen_range(0..candidates.len())];

        let symbol = self.registry.function(function);
        let mut children = Vec::with_capacity(symbol.arity());
        for &slot_ty in &symbol.arg_tys {
            children.push(self.generate(max_depth - 1, method, slot_ty, rng)?);
        }
        Ok(Node::Call { function, children })
    }

    fn terminal<R: Rng>(&self, expected: ValueType, rng: &mut R) -> Result<Node, ConfigError> {
        let candidates = self.registry.terminals_of_type(expected);
        if candidates.is_empty() {
            return Err(ConfigError::EmptyTerminalSet(expected));
        }
        let terminal = candidates[rng.gen_range(0..candidates.len())];

        let symbol = self.registry.terminal(terminal);
        let value = match symbol.rule {
            TerminalRule::UniformConstant { lo, hi } => {
                Some(draw_constant(symbol.ty, lo, hi, rng))
            }
            _ => None,
        };
        Ok(Node::Terminal { terminal, value })
    }
}

/// Draw the fixed value for a random-constant terminal.
fn draw_constant<R: Rng>(ty: ValueType, lo: f64, hi: f64, rng: &mut R) -> Value {
    match ty {
        ValueType::Number => Value::Number(rng.gen_range(lo..=hi)),
        ValueType::Action => Value::Action(rng.gen_range(lo as i64..=hi as i64)),
        ValueType::Boolean => Value::Boolean(rng.gen_bool(0.5)),
    }
}
