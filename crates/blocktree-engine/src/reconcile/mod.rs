//! # Reconciler
//!
//! Merges an externally supplied tree (paste, programmatic load) into the
//! live tree with as little disruption as possible.
//!
//! Reconciliation is split into a pure compute phase ([`diff`]) and an
//! apply phase ([`apply`]). If applying fails part way, typically with a
//! stale path, or the patched tree does not come out equal to the target,
//! the live tree's children are swapped for the target in one step. The
//! live tree always ends up equal to the normalized target; only the
//! in-place benefits (preserved cursor and so on) are lost on fallback.

mod apply;
mod diff;

pub use apply::apply;
pub use diff::{DiffOp, diff};

use blocktree_config::ReconcileConfig;

use crate::error::EditError;
use crate::tree::{Node, Path, Tree, normalize_nodes};

/// Raised when the in-place patch was abandoned for a full replacement.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("reconciliation fell back to full replacement: {cause}")]
pub struct FallbackApplied {
    pub cause: EditError,
}

/// Summary of a successful in-place reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileReport {
    pub ops: Vec<DiffOp>,
}

impl ReconcileReport {
    /// True when the live tree already matched and nothing was touched.
    pub fn is_noop(&self) -> bool {
        self.ops.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: ReconcileConfig,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Drop collapsible-empty elements and fill other childless ones.
    pub fn prepare(&self, target: Vec<Node>) -> Vec<Node> {
        normalize_nodes(target, &|kind: &str| self.config.is_collapsible(kind))
    }

    /// Compute the ops that turn `live` into an already prepared `target`.
    pub fn diff(&self, live: &Tree, target: &[Node]) -> Vec<DiffOp> {
        diff(live.children(), target, &self.config)
    }

    pub fn reconcile(
        &self,
        live: &mut Tree,
        target: Vec<Node>,
    ) -> Result<ReconcileReport, FallbackApplied> {
        let target = self.prepare(target);
        let ops = self.diff(live, &target);
        log::debug!("reconcile computed {} ops", ops.len());
        self.apply_or_replace(live, ops, target)
    }

    /// Apply `ops`, falling back to replacing the live children with `target`
    /// if any op fails or the result diverges from `target`.
    pub fn apply_or_replace(
        &self,
        live: &mut Tree,
        ops: Vec<DiffOp>,
        target: Vec<Node>,
    ) -> Result<ReconcileReport, FallbackApplied> {
        let outcome = apply(live, &ops, &self.config).and_then(|_| {
            if live.children == target {
                Ok(())
            } else {
                Err(EditError::invalid(
                    &Path::root(),
                    "patched tree diverged from target",
                ))
            }
        });

        match outcome {
            Ok(()) => Ok(ReconcileReport { ops }),
            Err(cause) => {
                log::warn!("reconcile falling back to full replacement: {cause}");
                live.children = target;
                Err(FallbackApplied { cause })
            }
        }
    }
}
