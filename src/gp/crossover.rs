//! Subtree crossover between two parent programs.
//!
//! A random subtree of the recipient is replaced by a type-compatible
//! subtree of the donor. Position choice retries a bounded number of times
//! when no compatible pair or only depth-violating pairs turn up; exhaustion
//! falls back to an unmodified copy of the recipient, which is a degraded
//! but valid outcome rather than an error.

use crate::gp::symbols::Registry;
use crate::gp::tree::Node;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Configuration for subtree crossover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossoverConfig {
    /// Maximum depth the spliced child may reach.
    pub max_depth: usize,
    /// Attempts at finding a compatible position pair before falling back.
    pub max_attempts: usize,
}

impl Default for CrossoverConfig {
    fn default() -> Self {
        Self {
            max_depth: 6,
            max_attempts: 8,
        }
    }
}

/// Cross two parent trees, returning a new child tree.
///
/// The child is a copy of `recipient` with one subtree replaced by a copy
/// of a same-typed subtree of `donor`. Neither parent is mutated or
/// aliased. If no compatible, depth-respecting pair is found within
/// `max_attempts`, the child is an unmodified copy of `recipient`.
#[must_use]
pub fn crossover<R: Rng>(
    recipient: &Node,
    donor: &Node,
    registry: &Registry,
    config: &CrossoverConfig,
    rng: &mut R,
) -> Node {
    let recipient_sites = recipient.sites(registry);
    let donor_sites = donor.sites(registry);

    for _ in 0..config.max_attempts {
        let target = recipient_sites[rng.gen_range(0..recipient_sites.len())];

        let compatible: Vec<usize> = donor_sites
            .iter()
            .filter(|site| site.ty == target.ty)
            .map(|site| site.index)
            .collect();
        if compatible.is_empty() {
            continue;
        }

        let source = compatible[rng.gen_range(0..compatible.len())];
        let Some(subtree) = donor.get(source) else {
            continue;
        };
        if target.depth + subtree.depth() > config.max_depth {
            continue;
        }

        let mut child = recipient.clone();
        child.replace(target.index, subtree.clone());
        return child;
    }

    log::debug!(
        "crossover found no compatible positions in {} attempts, copying recipient",
        config.max_attempts
    );
    recipient.clone()
}
