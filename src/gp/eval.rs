//! Program evaluation: tree × observation → value.

use crate::env::Observation;
use crate::error::EvalError;
use crate::gp::symbols::{Registry, TerminalRule, Value};
use crate::gp::tree::Node;

/// Evaluate a program tree against an observation.
///
/// Pure: no state is touched, so the same tree can be evaluated once per
/// environment time step. Children evaluate left to right, in declaration
/// order, before their operator applies.
///
/// # Errors
///
/// Returns an [`EvalError`] if a terminal projects a field the observation
/// lacks, or an operator rejects its arguments.
pub fn evaluate(
    node: &Node,
    registry: &Registry,
    observation: &Observation,
) -> Result<Value, EvalError> {
    match node {
        Node::Terminal { terminal, value } => {
            let symbol = registry.terminal(*terminal);
            match &symbol.rule {
                TerminalRule::Constant(constant) => Ok(*constant),
                TerminalRule::UniformConstant { .. } => {
                    value.ok_or_else(|| EvalError::UnboundConstant(symbol.name.clone()))
                }
                TerminalRule::Input(field) => observation
                    .get(field)
                    .ok_or_else(|| EvalError::MissingInput(field.clone())),
            }
        }
        Node::Call { function, children } => {
            let symbol = registry.function(*function);
            let mut args = Vec::with_capacity(children.len());
            for child in children {
                args.push(evaluate(child, registry, observation)?);
            }
            symbol.op.apply(&args)
        }
    }
}
