//! Boundary to the host's native style system.

use crate::style::ComputedStyle;
use crate::tree::NodeId;

/// Receives computed styles whenever a node's property values change.
///
/// Called on the first resolution of a node and on every recompute that
/// produces different values. Recomputes yielding an identical property map
/// are not reported.
pub trait StyleApplier {
    fn apply(&mut self, node: NodeId, style: &ComputedStyle);
}

impl<F> StyleApplier for F
where
    F: FnMut(NodeId, &ComputedStyle),
{
    fn apply(&mut self, node: NodeId, style: &ComputedStyle) {
        self(node, style)
    }
}
