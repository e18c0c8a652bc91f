//! Subtree-regeneration mutation.
//!
//! A random subtree of the parent is discarded and regrown by the program
//! generator, using the position's expected type and whatever depth budget
//! remains below the position.

use crate::error::ConfigError;
use crate::gp::generate::{Generator, GrowMethod};
use crate::gp::tree::Node;
use rand::Rng;

/// Mutate a parent tree, returning a new child tree.
///
/// The child is a copy of `parent` with one subtree regenerated (grow
/// method) under the configured maximum depth. The parent is never mutated
/// or aliased.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the registry cannot supply a symbol for the
/// regenerated subtree.
pub fn mutate<R: Rng>(
    parent: &Node,
    generator: &Generator<'_>,
    max_depth: usize,
    rng: &mut R,
) -> Result<Node, ConfigError> {
    let sites = parent.sites(generator.registry());
    let site = sites[rng.gen_range(0..sites.len())];

    let budget = max_depth.saturating_sub(site.depth);
    let subtree = generator.generate(budget, GrowMethod::Grow, site.ty, rng)?;

    let mut child = parent.clone();
    child.replace(site.index, subtree);
    Ok(child)
}
