//! Property-based tests for program generation and the genetic operators.
//!
//! These verify the structural laws of generated, crossed-over, and mutated
//! trees: leaf placement per construction method, arity and slot typing
//! against the registry, depth bounds, and interchange round-trips.
//! Run with: cargo test --release prop_trees

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use arbor::gp::{
    CrossoverConfig, Generator, GrowMethod, Node, Registry, TerminalRule, Value, ValueType,
    crossover, from_json, install_all, mutate, to_json,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn fixture() -> Registry {
    let mut registry = Registry::new();
    registry
        .register_terminal("x", ValueType::Number, TerminalRule::Input("x".into()))
        .unwrap();
    registry
        .register_terminal(
            "c",
            ValueType::Number,
            TerminalRule::UniformConstant { lo: -1.0, hi: 1.0 },
        )
        .unwrap();
    registry
        .register_terminal("go", ValueType::Action, TerminalRule::Constant(Value::Action(1)))
        .unwrap();
    registry
        .register_terminal("stay", ValueType::Action, TerminalRule::Constant(Value::Action(0)))
        .unwrap();
    install_all(&mut registry).unwrap();
    registry
}

fn leaf_depths(node: &Node, depth: usize, out: &mut Vec<usize>) {
    match node {
        Node::Terminal { .. } => out.push(depth),
        Node::Call { children, .. } => {
            for child in children {
                leaf_depths(child, depth + 1, out);
            }
        }
    }
}

/// Every call node must carry exactly its symbol's arity, with each child
/// declaring the slot's expected type.
fn check_signatures(node: &Node, registry: &Registry) -> bool {
    match node {
        Node::Terminal { .. } => true,
        Node::Call { function, children } => {
            let symbol = registry.function(*function);
            children.len() == symbol.arity()
                && children
                    .iter()
                    .zip(symbol.arg_tys.iter())
                    .all(|(child, &ty)| child.value_type(registry) == ty)
                && children.iter().all(|child| check_signatures(child, registry))
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Full construction places every leaf at exactly the depth limit.
    #[test]
    fn prop_full_leaves_at_limit(seed in any::<u64>(), depth in 0usize..5) {
        let registry = fixture();
        let generator = Generator::new(&registry, 0.3).unwrap();
        let mut rng = SmallRng::seed_from_u64(seed);

        let tree = generator
            .generate(depth, GrowMethod::Full, ValueType::Action, &mut rng)
            .unwrap();

        let mut depths = Vec::new();
        leaf_depths(&tree, 0, &mut depths);
        prop_assert!(depths.iter().all(|&d| d == depth));
    }

    /// Grow construction never exceeds the depth limit, and depth 0 yields
    /// a single terminal.
    #[test]
    fn prop_grow_within_limit(
        seed in any::<u64>(),
        depth in 0usize..6,
        growth in 0.0f64..=1.0,
    ) {
        let registry = fixture();
        let generator = Generator::new(&registry, growth).unwrap();
        let mut rng = SmallRng::seed_from_u64(seed);

        let tree = generator
            .generate(depth, GrowMethod::Grow, ValueType::Action, &mut rng)
            .unwrap();

        prop_assert!(tree.depth() <= depth);
        if depth == 0 {
            prop_assert!(matches!(tree, Node::Terminal { .. }), "expected a terminal node");
        }
    }

    /// Generated trees satisfy the registry's type signature everywhere.
    #[test]
    fn prop_generated_trees_are_well_typed(seed in any::<u64>(), depth in 0usize..5) {
        let registry = fixture();
        let generator = Generator::new(&registry, 0.3).unwrap();
        let mut rng = SmallRng::seed_from_u64(seed);

        let tree = generator
            .generate(depth, GrowMethod::Grow, ValueType::Action, &mut rng)
            .unwrap();

        prop_assert!(tree.is_well_typed(&registry, ValueType::Action));
        prop_assert!(check_signatures(&tree, &registry));
    }

    /// Serializing to symbolic form and parsing back is the identity.
    #[test]
    fn prop_interchange_round_trip(seed in any::<u64>(), depth in 0usize..5) {
        let registry = fixture();
        let generator = Generator::new(&registry, 0.3).unwrap();
        let mut rng = SmallRng::seed_from_u64(seed);

        let tree = generator
            .generate(depth, GrowMethod::Grow, ValueType::Action, &mut rng)
            .unwrap();

        let form = to_json(&tree, &registry);
        let parsed = from_json(&form, &registry).unwrap();
        prop_assert_eq!(parsed, tree);
    }

    /// Crossover children respect typing and the depth bound.
    #[test]
    fn prop_crossover_preserves_invariants(seed in any::<u64>(), depth in 1usize..5) {
        let registry = fixture();
        let generator = Generator::new(&registry, 0.3).unwrap();
        let config = CrossoverConfig { max_depth: depth, max_attempts: 8 };
        let mut rng = SmallRng::seed_from_u64(seed);

        let a = generator
            .generate(depth, GrowMethod::Grow, ValueType::Action, &mut rng)
            .unwrap();
        let b = generator
            .generate(depth, GrowMethod::Grow, ValueType::Action, &mut rng)
            .unwrap();

        let child = crossover(&a, &b, &registry, &config, &mut rng);
        prop_assert!(child.is_well_typed(&registry, ValueType::Action));
        prop_assert!(check_signatures(&child, &registry));
        prop_assert!(child.depth() <= depth);
    }

    /// Mutation children respect typing and the depth bound.
    #[test]
    fn prop_mutation_preserves_invariants(seed in any::<u64>(), depth in 1usize..5) {
        let registry = fixture();
        let generator = Generator::new(&registry, 0.3).unwrap();
        let mut rng = SmallRng::seed_from_u64(seed);

        let parent = generator
            .generate(depth, GrowMethod::Grow, ValueType::Action, &mut rng)
            .unwrap();

        let child = mutate(&parent, &generator, depth, &mut rng).unwrap();
        prop_assert!(child.is_well_typed(&registry, ValueType::Action));
        prop_assert!(check_signatures(&child, &registry));
        prop_assert!(child.depth() <= depth);
    }
}
