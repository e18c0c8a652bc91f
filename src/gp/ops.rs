//! Standard operator vocabulary.
//!
//! Installers for the operator set most runs want without hand-registering
//! arithmetic: numeric operators (division and modulo are protected, 0 on a
//! zero divisor), comparisons, boolean logic, and branching into action or
//! number alternatives. All installed operators are total.

use crate::error::{ConfigError, EvalError};
use crate::gp::symbols::{Operator, Registry, Value, ValueType};

/// Install the full standard vocabulary.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any standard name is already registered.
pub fn install_all(registry: &mut Registry) -> Result<(), ConfigError> {
    install_arithmetic(registry)?;
    install_comparisons(registry)?;
    install_logic(registry)?;
    install_branching(registry)
}

/// Install numeric operators: `add`, `sub`, `mul`, `div` (protected), `mod`
/// (protected), `min`, `max`, `neg`, `abs`.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any of the names is already registered.
pub fn install_arithmetic(registry: &mut Registry) -> Result<(), ConfigError> {
    binary_number(registry, "add", |a, b| a + b)?;
    binary_number(registry, "sub", |a, b| a - b)?;
    binary_number(registry, "mul", |a, b| a * b)?;
    binary_number(registry, "div", |a, b| if b.abs() < f64::EPSILON { 0.0 } else { a / b })?;
    binary_number(registry, "mod", |a, b| if b.abs() < f64::EPSILON { 0.0 } else { a % b })?;
    binary_number(registry, "min", f64::min)?;
    binary_number(registry, "max", f64::max)?;
    unary_number(registry, "neg", |a| -a)?;
    unary_number(registry, "abs", f64::abs)?;
    Ok(())
}

/// Install comparisons over numbers: `gt`, `lt`, `eq`.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any of the names is already registered.
pub fn install_comparisons(registry: &mut Registry) -> Result<(), ConfigError> {
    comparison(registry, "gt", |a, b| a > b)?;
    comparison(registry, "lt", |a, b| a < b)?;
    comparison(registry, "eq", |a, b| (a - b).abs() < f64::EPSILON)?;
    Ok(())
}

/// Install boolean logic: `and`, `or`, `not`.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any of the names is already registered.
pub fn install_logic(registry: &mut Registry) -> Result<(), ConfigError> {
    logical(registry, "and", |a, b| a && b)?;
    logical(registry, "or", |a, b| a || b)?;

    registry.register_function(
        "not",
        1,
        ValueType::Boolean,
        vec![ValueType::Boolean],
        Operator::new(|args| Ok(Value::Boolean(!boolean("not", args, 0)?))),
    )?;
    Ok(())
}

/// Install branching: `if` chooses between two actions, `select` between
/// two numbers, both on a boolean condition.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any of the names is already registered.
pub fn install_branching(registry: &mut Registry) -> Result<(), ConfigError> {
    registry.register_function(
        "if",
        3,
        ValueType::Action,
        vec![ValueType::Boolean, ValueType::Action, ValueType::Action],
        Operator::new(|args| {
            if boolean("if", args, 0)? {
                Ok(args[1])
            } else {
                Ok(args[2])
            }
        }),
    )?;
    registry.register_function(
        "select",
        3,
        ValueType::Number,
        vec![ValueType::Boolean, ValueType::Number, ValueType::Number],
        Operator::new(|args| {
            if boolean("select", args, 0)? {
                Ok(args[1])
            } else {
                Ok(args[2])
            }
        }),
    )?;
    Ok(())
}

fn binary_number(
    registry: &mut Registry,
    name: &'static str,
    f: impl Fn(f64, f64) -> f64 + Send + Sync + 'static,
) -> Result<(), ConfigError> {
    registry.register_function(
        name,
        2,
        ValueType::Number,
        vec![ValueType::Number, ValueType::Number],
        Operator::new(move |args| {
            Ok(Value::Number(f(number(name, args, 0)?, number(name, args, 1)?)))
        }),
    )?;
    Ok(())
}

fn unary_number(
    registry: &mut Registry,
    name: &'static str,
    f: impl Fn(f64) -> f64 + Send + Sync + 'static,
) -> Result<(), ConfigError> {
    registry.register_function(
        name,
        1,
        ValueType::Number,
        vec![ValueType::Number],
        Operator::new(move |args| Ok(Value::Number(f(number(name, args, 0)?)))),
    )?;
    Ok(())
}

fn comparison(
    registry: &mut Registry,
    name: &'static str,
    f: impl Fn(f64, f64) -> bool + Send + Sync + 'static,
) -> Result<(), ConfigError> {
    registry.register_function(
        name,
        2,
        ValueType::Boolean,
        vec![ValueType::Number, ValueType::Number],
        Operator::new(move |args| {
            Ok(Value::Boolean(f(number(name, args, 0)?, number(name, args, 1)?)))
        }),
    )?;
    Ok(())
}

fn logical(
    registry: &mut Registry,
    name: &'static str,
    f: impl Fn(bool, bool) -> bool + Send + Sync + 'static,
) -> Result<(), ConfigError> {
    registry.register_function(
        name,
        2,
        ValueType::Boolean,
        vec![ValueType::Boolean, ValueType::Boolean],
        Operator::new(move |args| {
            Ok(Value::Boolean(f(boolean(name, args, 0)?, boolean(name, args, 1)?)))
        }),
    )?;
    Ok(())
}

fn number(function: &str, args: &[Value], slot: usize) -> Result<f64, EvalError> {
    args.get(slot).and_then(Value::as_number).ok_or_else(|| EvalError::Operator {
        function: function.to_string(),
        message: format!("argument {slot} is not a number"),
    })
}

fn boolean(function: &str, args: &[Value], slot: usize) -> Result<bool, EvalError> {
    args.get(slot).and_then(Value::as_boolean).ok_or_else(|| EvalError::Operator {
        function: function.to_string(),
        message: format!("argument {slot} is not a boolean"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(registry: &Registry, name: &str, args: &[Value]) -> Value {
        let id = registry.find_function(name).unwrap();
        registry.function(id).op.apply(args).unwrap()
    }

    #[test]
    fn test_protected_division() {
        let mut registry = Registry::new();
        install_arithmetic(&mut registry).unwrap();

        let n = |v: f64| Value::Number(v);
        assert_eq!(apply(&registry, "div", &[n(8.0), n(2.0)]), n(4.0));
        assert_eq!(apply(&registry, "div", &[n(8.0), n(0.0)]), n(0.0));
        assert_eq!(apply(&registry, "mod", &[n(8.0), n(0.0)]), n(0.0));
    }

    #[test]
    fn test_comparisons_and_logic() {
        let mut registry = Registry::new();
        install_comparisons(&mut registry).unwrap();
        install_logic(&mut registry).unwrap();

        let n = |v: f64| Value::Number(v);
        let b = |v: bool| Value::Boolean(v);
        assert_eq!(apply(&registry, "gt", &[n(2.0), n(1.0)]), b(true));
        assert_eq!(apply(&registry, "lt", &[n(2.0), n(1.0)]), b(false));
        assert_eq!(apply(&registry, "eq", &[n(2.0), n(2.0)]), b(true));
        assert_eq!(apply(&registry, "and", &[b(true), b(false)]), b(false));
        assert_eq!(apply(&registry, "or", &[b(true), b(false)]), b(true));
        assert_eq!(apply(&registry, "not", &[b(false)]), b(true));
    }

    #[test]
    fn test_branching_types() {
        let mut registry = Registry::new();
        install_branching(&mut registry).unwrap();

        let id = registry.find_function("if").unwrap();
        let symbol = registry.function(id);
        assert_eq!(symbol.arity(), 3);
        assert_eq!(symbol.return_ty, ValueType::Action);

        let out = symbol
            .op
            .apply(&[Value::Boolean(true), Value::Action(3), Value::Action(4)])
            .unwrap();
        assert_eq!(out, Value::Action(3));
    }

    #[test]
    fn test_operator_rejects_wrong_argument() {
        let mut registry = Registry::new();
        install_arithmetic(&mut registry).unwrap();

        let id = registry.find_function("add").unwrap();
        let err = registry
            .function(id)
            .op
            .apply(&[Value::Number(1.0), Value::Boolean(true)])
            .unwrap_err();
        assert!(matches!(err, EvalError::Operator { .. }));
    }

    #[test]
    fn test_install_all_is_conflict_free() {
        let mut registry = Registry::new();
        install_all(&mut registry).unwrap();
        assert!(registry.function_count() >= 16);

        // A second install collides with the existing names.
        assert!(install_all(&mut registry).is_err());
    }
}
