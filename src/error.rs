//! Core error vocabulary for registry setup and program evaluation.

use crate::gp::ValueType;
use std::fmt;

/// Invalid or unsatisfiable configuration, surfaced before a run starts.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A terminal with this name is already registered.
    DuplicateTerminal(String),
    /// A function with this name is already registered.
    DuplicateFunction(String),
    /// Functions must take at least one argument.
    ZeroArity(String),
    /// Declared arity disagrees with the number of argument types.
    ArityMismatch {
        /// Function name.
        name: String,
        /// Declared arity.
        arity: usize,
        /// Number of argument types supplied.
        args: usize,
    },
    /// A random-constant terminal was given an empty draw range.
    InvalidConstantRange {
        /// Lower bound of the range.
        lo: f64,
        /// Upper bound of the range.
        hi: f64,
    },
    /// No terminal of the required type is registered.
    EmptyTerminalSet(ValueType),
    /// No function returning the required type is registered.
    EmptyFunctionSet(ValueType),
    /// Population size must be at least one.
    InvalidPopulationSize(usize),
    /// Maximum program depth must be at least one.
    InvalidMaxDepth(usize),
    /// Terminal growth rate must lie in `[0, 1]`.
    InvalidGrowthRate(f64),
    /// A probability parameter lies outside `[0, 1]`.
    InvalidRate {
        /// Which parameter was out of range.
        name: &'static str,
        /// The offending value.
        value: f64,
    },
    /// Episodes per fitness evaluation must be at least one.
    InvalidEpisodes(usize),
    /// Tournament size must be at least one.
    InvalidTournamentSize(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateTerminal(name) => write!(f, "duplicate terminal symbol: {name}"),
            Self::DuplicateFunction(name) => write!(f, "duplicate function symbol: {name}"),
            Self::ZeroArity(name) => write!(f, "function {name} declares zero arity"),
            Self::ArityMismatch { name, arity, args } => write!(
                f,
                "function {name} declares arity {arity} but {args} argument types"
            ),
            Self::InvalidConstantRange { lo, hi } => {
                write!(f, "empty random-constant range: [{lo}, {hi}]")
            }
            Self::EmptyTerminalSet(ty) => write!(f, "no terminal of type {ty} is registered"),
            Self::EmptyFunctionSet(ty) => {
                write!(f, "no function returning type {ty} is registered")
            }
            Self::InvalidPopulationSize(n) => write!(f, "invalid population size: {n}"),
            Self::InvalidMaxDepth(d) => write!(f, "invalid maximum depth: {d}"),
            Self::InvalidGrowthRate(rate) => {
                write!(f, "terminal growth rate {rate} outside [0, 1]")
            }
            Self::InvalidRate { name, value } => write!(f, "{name} {value} outside [0, 1]"),
            Self::InvalidEpisodes(n) => write!(f, "invalid episode count: {n}"),
            Self::InvalidTournamentSize(k) => write!(f, "invalid tournament size: {k}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// A program could not be evaluated against an observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// The observation lacks a field referenced by a terminal.
    MissingInput(String),
    /// A random-constant terminal node carries no drawn value.
    UnboundConstant(String),
    /// An operator rejected its evaluated arguments.
    Operator {
        /// Function whose operator failed.
        function: String,
        /// What went wrong.
        message: String,
    },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput(field) => write!(f, "observation has no field {field}"),
            Self::UnboundConstant(name) => {
                write!(f, "random-constant terminal {name} has no drawn value")
            }
            Self::Operator { function, message } => {
                write!(f, "operator {function} failed: {message}")
            }
        }
    }
}

impl std::error::Error for EvalError {}
