//! Typed symbol vocabulary and the registry programs are built from.
//!
//! A registry holds two symbol categories: terminals (leaves) and functions
//! (internal nodes). Candidate lists are indexed per value type so the
//! generator never filters at draw time.

// Symbol ids are dense u16 indices into the registry tables
#![allow(clippy::cast_possible_truncation)]

use crate::error::{ConfigError, EvalError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Runtime type of a program node.
///
/// A closed enumeration: the engine filters symbol candidates by type via
/// per-type index tables rather than string tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// An action accepted by the environment.
    Action,
    /// A scalar number.
    Number,
    /// A truth value.
    Boolean,
}

impl ValueType {
    pub(crate) const COUNT: usize = 3;

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action => write!(f, "action"),
            Self::Number => write!(f, "number"),
            Self::Boolean => write!(f, "boolean"),
        }
    }
}

/// A runtime value produced by evaluating a program node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// An action, encoded as a discrete choice.
    Action(i64),
    /// A scalar number.
    Number(f64),
    /// A truth value.
    Boolean(bool),
}

impl Value {
    /// The type this value belongs to.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Action(_) => ValueType::Action,
            Self::Number(_) => ValueType::Number,
            Self::Boolean(_) => ValueType::Boolean,
        }
    }

    /// The contained number, if this is a `Number`.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The contained action, if this is an `Action`.
    #[must_use]
    pub fn as_action(&self) -> Option<i64> {
        match self {
            Self::Action(a) => Some(*a),
            _ => None,
        }
    }

    /// The contained truth value, if this is a `Boolean`.
    #[must_use]
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

/// Identifier of a terminal symbol within its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerminalId(pub(crate) u16);

/// Identifier of a function symbol within its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionId(pub(crate) u16);

/// How a terminal produces its value at evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TerminalRule {
    /// A literal constant.
    Constant(Value),
    /// A constant drawn uniformly from `[lo, hi]` once, at generation time,
    /// and fixed in the node thereafter.
    UniformConstant {
        /// Lower bound of the draw range.
        lo: f64,
        /// Upper bound of the draw range.
        hi: f64,
    },
    /// A projection of the current observation by field name.
    Input(String),
}

/// A leaf symbol: name, declared type, and evaluation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalSymbol {
    /// Symbol name, unique among terminals.
    pub name: String,
    /// Declared type of nodes built from this symbol.
    pub ty: ValueType,
    /// How the terminal resolves to a value.
    pub rule: TerminalRule,
}

/// The operator a function symbol applies to its evaluated children.
#[derive(Clone)]
pub struct Operator(Arc<dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync>);

impl Operator {
    /// Wrap a closure as an operator.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Apply the operator to evaluated arguments, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns an [`EvalError`] if the operator rejects its arguments.
    pub fn apply(&self, args: &[Value]) -> Result<Value, EvalError> {
        (self.0)(args)
    }
}

impl fmt::Debug for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Operator(..)")
    }
}

/// An internal-node symbol: name, arity, argument types, return type, and
/// the operator applied to evaluated children.
#[derive(Debug, Clone)]
pub struct FunctionSymbol {
    /// Symbol name, unique among functions.
    pub name: String,
    /// Type of values this function returns.
    pub return_ty: ValueType,
    /// Expected type of each argument slot, in declaration order.
    pub arg_tys: Vec<ValueType>,
    /// Operator applied to the evaluated children.
    pub op: Operator,
}

impl FunctionSymbol {
    /// Number of arguments this function requires.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.arg_tys.len()
    }
}

/// The typed vocabulary programs are built from.
///
/// Symbol names are unique within their category. Candidate ids are indexed
/// by declared type so the generator's uniform draws are O(1).
#[derive(Debug, Clone, Default)]
pub struct Registry {
    terminals: Vec<TerminalSymbol>,
    functions: Vec<FunctionSymbol>,
    terminals_by_type: [Vec<TerminalId>; ValueType::COUNT],
    functions_by_type: [Vec<FunctionId>; ValueType::COUNT],
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a terminal symbol.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the name is already taken or a
    /// random-constant rule declares an empty range.
    pub fn register_terminal(
        &mut self,
        name: impl Into<String>,
        ty: ValueType,
        rule: TerminalRule,
    ) -> Result<TerminalId, ConfigError> {
        let name = name.into();
        if self.find_terminal(&name).is_some() {
            return Err(ConfigError::DuplicateTerminal(name));
        }
        if let TerminalRule::UniformConstant { lo, hi } = rule
            && lo > hi
        {
            return Err(ConfigError::InvalidConstantRange { lo, hi });
        }

        let id = TerminalId(self.terminals.len() as u16);
        self.terminals.push(TerminalSymbol { name, ty, rule });
        self.terminals_by_type[ty.index()].push(id);
        Ok(id)
    }

    /// Register a function symbol.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the name is already taken, the arity is
    /// zero, or the arity disagrees with the argument type list.
    pub fn register_function(
        &mut self,
        name: impl Into<String>,
        arity: usize,
        return_ty: ValueType,
        arg_tys: Vec<ValueType>,
        op: Operator,
    ) -> Result<FunctionId, ConfigError> {
        let name = name.into();
        if self.find_function(&name).is_some() {
            return Err(ConfigError::DuplicateFunction(name));
        }
        if arity == 0 {
            return Err(ConfigError::ZeroArity(name));
        }
        if arity != arg_tys.len() {
            return Err(ConfigError::ArityMismatch {
                name,
                arity,
                args: arg_tys.len(),
            });
        }

        let id = FunctionId(self.functions.len() as u16);
        self.functions.push(FunctionSymbol {
            name,
            return_ty,
            arg_tys,
            op,
        });
        self.functions_by_type[return_ty.index()].push(id);
        Ok(id)
    }

    /// The terminal symbol behind an id issued by this registry.
    #[must_use]
    pub fn terminal(&self, id: TerminalId) -> &TerminalSymbol {
        &self.terminals[id.0 as usize]
    }

    /// The function symbol behind an id issued by this registry.
    #[must_use]
    pub fn function(&self, id: FunctionId) -> &FunctionSymbol {
        &self.functions[id.0 as usize]
    }

    /// Candidate terminals of the given declared type.
    #[must_use]
    pub fn terminals_of_type(&self, ty: ValueType) -> &[TerminalId] {
        &self.terminals_by_type[ty.index()]
    }

    /// Candidate functions returning the given type.
    #[must_use]
    pub fn functions_of_type(&self, ty: ValueType) -> &[FunctionId] {
        &self.functions_by_type[ty.index()]
    }

    /// Look up a terminal by name.
    #[must_use]
    pub fn find_terminal(&self, name: &str) -> Option<TerminalId> {
        self.terminals
            .iter()
            .position(|t| t.name == name)
            .map(|i| TerminalId(i as u16))
    }

    /// Look up a function by name.
    #[must_use]
    pub fn find_function(&self, name: &str) -> Option<FunctionId> {
        self.functions
            .iter()
            .position(|f| f.name == name)
            .map(|i| FunctionId(i as u16))
    }

    /// Number of registered terminals.
    #[must_use]
    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
    }

    /// Number of registered functions.
    #[must_use]
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }
}
