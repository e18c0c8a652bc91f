//! Typed recursive program representation.
//!
//! A program is a tree of symbol references: terminals at the leaves, calls
//! at the internal nodes. Subtrees are addressed by preorder index, which is
//! how the genetic operators pick and splice positions.

use crate::gp::symbols::{FunctionId, Registry, TerminalId, Value, ValueType};
use serde::{Deserialize, Serialize};

/// A node in a typed program tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// A leaf resolving to a value per its symbol's rule.
    Terminal {
        /// The terminal symbol.
        terminal: TerminalId,
        /// The value drawn at generation time, for random-constant
        /// terminals; `None` for every other rule.
        value: Option<Value>,
    },
    /// An internal node applying a function to its children.
    Call {
        /// The function symbol.
        function: FunctionId,
        /// One child per argument slot, in declaration order.
        children: Vec<Node>,
    },
}

impl Node {
    /// Declared type of this node.
    #[must_use]
    pub fn value_type(&self, registry: &Registry) -> ValueType {
        match self {
            Self::Terminal { terminal, .. } => registry.terminal(*terminal).ty,
            Self::Call { function, .. } => registry.function(*function).return_ty,
        }
    }

    /// Total number of nodes in this subtree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        match self {
            Self::Terminal { .. } => 1,
            Self::Call { children, .. } => {
                1 + children.iter().map(Self::node_count).sum::<usize>()
            }
        }
    }

    /// Depth of the deepest node in this subtree, counting this node as 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Terminal { .. } => 0,
            Self::Call { children, .. } => {
                1 + children.iter().map(Self::depth).max().unwrap_or(0)
            }
        }
    }

    /// The subtree at the given preorder index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Node> {
        if index == 0 {
            return Some(self);
        }
        let mut remaining = index - 1;
        if let Self::Call { children, .. } = self {
            for child in children {
                let count = child.node_count();
                if remaining < count {
                    return child.get(remaining);
                }
                remaining -= count;
            }
        }
        None
    }

    /// Replace the subtree at the given preorder index.
    ///
    /// Returns `false` (leaving the tree untouched) if the index is out of
    /// range.
    pub fn replace(&mut self, index: usize, replacement: Node) -> bool {
        if index == 0 {
            *self = replacement;
            return true;
        }
        let mut remaining = index - 1;
        if let Self::Call { children, .. } = self {
            for child in children {
                let count = child.node_count();
                if remaining < count {
                    return child.replace(remaining, replacement);
                }
                remaining -= count;
            }
        }
        false
    }

    /// All subtree positions, in preorder, with their declared types and
    /// depths. The root is always present at index 0, depth 0.
    #[must_use]
    pub fn sites(&self, registry: &Registry) -> Vec<Site> {
        let mut sites = Vec::with_capacity(self.node_count());
        self.collect_sites(registry, 0, &mut sites);
        sites
    }

    fn collect_sites(&self, registry: &Registry, depth: usize, sites: &mut Vec<Site>) {
        sites.push(Site {
            index: sites.len(),
            ty: self.value_type(registry),
            depth,
        });
        if let Self::Call { children, .. } = self {
            for child in children {
                child.collect_sites(registry, depth + 1, sites);
            }
        }
    }

    /// Whether this tree satisfies the registry's type signature: the root
    /// has the expected type, and every call has exactly one child of the
    /// declared type per argument slot.
    #[must_use]
    pub fn is_well_typed(&self, registry: &Registry, expected: ValueType) -> bool {
        if self.value_type(registry) != expected {
            return false;
        }
        match self {
            Self::Terminal { .. } => true,
            Self::Call { function, children } => {
                let symbol = registry.function(*function);
                children.len() == symbol.arity()
                    && children
                        .iter()
                        .zip(&symbol.arg_tys)
                        .all(|(child, &ty)| child.is_well_typed(registry, ty))
            }
        }
    }
}

/// A subtree position within a program tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Site {
    /// Preorder index of the subtree root.
    pub index: usize,
    /// Declared type of the subtree root (equal to the type its parent slot
    /// expects).
    pub ty: ValueType,
    /// Depth of the subtree root below the tree root.
    pub depth: usize,
}

/// A program: a tree plus the fitness assigned by the last evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// The program tree.
    pub root: Node,
    /// Mean net reward from the last fitness evaluation; `None` until the
    /// program has been evaluated.
    pub fitness: Option<f64>,
}

impl Program {
    /// Wrap a tree as an unevaluated program.
    #[must_use]
    pub fn new(root: Node) -> Self {
        Self {
            root,
            fitness: None,
        }
    }

    /// Assigned fitness, or negative infinity if not yet evaluated.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.fitness.unwrap_or(f64::NEG_INFINITY)
    }
}
