//! Symbolic program interchange.
//!
//! Programs serialize to a nested JSON S-expression: a terminal is its
//! symbol name, a call is `[function_name, child, ...]`. A random-constant
//! terminal carries its drawn value as a one-entry object `{name: value}`,
//! so the round trip is structurally exact. Parsing resolves names against
//! a registry and checks arity and slot types.

use crate::gp::symbols::{Registry, TerminalRule, Value, ValueType};
use crate::gp::tree::Node;
use serde_json::{Map, Number, Value as Json};
use std::fmt;

/// A symbolic form could not be parsed against a registry.
#[derive(Debug, Clone, PartialEq)]
pub enum SexprError {
    /// No terminal with this name is registered.
    UnknownTerminal(String),
    /// No function with this name is registered.
    UnknownFunction(String),
    /// A random-constant terminal appeared without its drawn value.
    MissingConstant(String),
    /// A drawn value was attached to a terminal that is not a random
    /// constant.
    UnexpectedConstant(String),
    /// A call has the wrong number of children.
    Arity {
        /// Function name.
        name: String,
        /// Registered arity.
        expected: usize,
        /// Children found in the form.
        found: usize,
    },
    /// A child's declared type disagrees with its slot.
    TypeMismatch {
        /// Function name.
        name: String,
        /// Argument slot, 0-based.
        slot: usize,
        /// Type the slot expects.
        expected: ValueType,
        /// Type the child declares.
        found: ValueType,
    },
    /// The form is not a name, constant object, or call array.
    Malformed(String),
}

impl fmt::Display for SexprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTerminal(name) => write!(f, "unknown terminal: {name}"),
            Self::UnknownFunction(name) => write!(f, "unknown function: {name}"),
            Self::MissingConstant(name) => {
                write!(f, "random-constant terminal {name} is missing its value")
            }
            Self::UnexpectedConstant(name) => {
                write!(f, "terminal {name} does not take a constant value")
            }
            Self::Arity { name, expected, found } => {
                write!(f, "function {name} expects {expected} children, found {found}")
            }
            Self::TypeMismatch { name, slot, expected, found } => write!(
                f,
                "function {name} slot {slot} expects {expected}, found {found}"
            ),
            Self::Malformed(detail) => write!(f, "malformed program form: {detail}"),
        }
    }
}

impl std::error::Error for SexprError {}

/// Serialize a tree to its symbolic JSON form.
#[must_use]
pub fn to_json(node: &Node, registry: &Registry) -> Json {
    match node {
        Node::Terminal { terminal, value } => {
            let symbol = registry.terminal(*terminal);
            match (&symbol.rule, value) {
                (TerminalRule::UniformConstant { .. }, Some(drawn)) => {
                    let mut entry = Map::with_capacity(1);
                    entry.insert(symbol.name.clone(), value_to_json(*drawn));
                    Json::Object(entry)
                }
                _ => Json::String(symbol.name.clone()),
            }
        }
        Node::Call { function, children } => {
            let symbol = registry.function(*function);
            let mut items = Vec::with_capacity(children.len() + 1);
            items.push(Json::String(symbol.name.clone()));
            items.extend(children.iter().map(|child| to_json(child, registry)));
            Json::Array(items)
        }
    }
}

/// Parse a symbolic JSON form back into a tree.
///
/// # Errors
///
/// Returns a [`SexprError`] if a name cannot be resolved, a call violates
/// its function's arity or slot types, or the form is malformed.
pub fn from_json(json: &Json, registry: &Registry) -> Result<Node, SexprError> {
    match json {
        Json::String(name) => terminal_from_name(name, None, registry),
        Json::Object(entries) => {
            let (name, value) = single_entry(entries)?;
            terminal_from_name(name, Some(value), registry)
        }
        Json::Array(items) => call_from_items(items, registry),
        other => Err(SexprError::Malformed(other.to_string())),
    }
}

/// Parse a symbolic form from its JSON text.
///
/// # Errors
///
/// Returns a [`SexprError`] if the text is not JSON or the form does not
/// resolve against the registry.
pub fn parse(text: &str, registry: &Registry) -> Result<Node, SexprError> {
    let json: Json =
        serde_json::from_str(text).map_err(|e| SexprError::Malformed(e.to_string()))?;
    from_json(&json, registry)
}

fn terminal_from_name(
    name: &str,
    value: Option<&Json>,
    registry: &Registry,
) -> Result<Node, SexprError> {
    let Some(terminal) = registry.find_terminal(name) else {
        return Err(SexprError::UnknownTerminal(name.to_string()));
    };
    let symbol = registry.terminal(terminal);

    let value = match (&symbol.rule, value) {
        (TerminalRule::UniformConstant { .. }, Some(json)) => {
            Some(value_from_json(json, symbol.ty, name)?)
        }
        (TerminalRule::UniformConstant { .. }, None) => {
            return Err(SexprError::MissingConstant(name.to_string()));
        }
        (_, Some(_)) => return Err(SexprError::UnexpectedConstant(name.to_string())),
        (_, None) => None,
    };
    Ok(Node::Terminal { terminal, value })
}

fn call_from_items(items: &[Json], registry: &Registry) -> Result<Node, SexprError> {
    let Some((head, rest)) = items.split_first() else {
        return Err(SexprError::Malformed("empty call form".to_string()));
    };
    let Json::String(name) = head else {
        return Err(SexprError::Malformed(format!(
            "call head must be a function name, found {head}"
        )));
    };
    let Some(function) = registry.find_function(name) else {
        return Err(SexprError::UnknownFunction(name.clone()));
    };

    let symbol = registry.function(function);
    if rest.len() != symbol.arity() {
        return Err(SexprError::Arity {
            name: name.clone(),
            expected: symbol.arity(),
            found: rest.len(),
        });
    }

    let mut children = Vec::with_capacity(rest.len());
    for (slot, item) in rest.iter().enumerate() {
        let child = from_json(item, registry)?;
        let found = child.value_type(registry);
        let expected = symbol.arg_tys[slot];
        if found != expected {
            return Err(SexprError::TypeMismatch {
                name: name.clone(),
                slot,
                expected,
                found,
            });
        }
        children.push(child);
    }
    Ok(Node::Call { function, children })
}

fn single_entry(entries: &Map<String, Json>) -> Result<(&str, &Json), SexprError> {
    let mut iter = entries.iter();
    match (iter.next(), iter.next()) {
        (Some((name, value)), None) => Ok((name.as_str(), value)),
        _ => Err(SexprError::Malformed(
            "constant object must have exactly one entry".to_string(),
        )),
    }
}

fn value_to_json(value: Value) -> Json {
    match value {
        Value::Action(a) => Json::Number(a.into()),
        Value::Number(n) => Number::from_f64(n).map_or(Json::Null, Json::Number),
        Value::Boolean(b) => Json::Bool(b),
    }
}

fn value_from_json(json: &Json, ty: ValueType, name: &str) -> Result<Value, SexprError> {
    let value = match ty {
        ValueType::Action => json.as_i64().map(Value::Action),
        ValueType::Number => json.as_f64().map(Value::Number),
        ValueType::Boolean => json.as_bool().map(Value::Boolean),
    };
    value.ok_or_else(|| {
        SexprError::Malformed(format!("constant for {name} must be a {ty}, found {json}"))
    })
}
