use std::collections::HashSet;
use std::sync::RwLock;

use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// Identity of a graph node: the address of its shared `TensorData`.
/// Only used as a map key, never dereferenced.
pub(crate) type NodeId = *const RwLock<TensorData>;

/// Nodes reachable from `root` through `grad_fn` links, ordered so that every
/// node comes before the inputs it was computed from.
pub(crate) fn topological_sort(root: &Tensor) -> Vec<Tensor> {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut post_order = Vec::new();
    // (node, inputs already pushed)
    let mut stack = vec![(root.clone(), false)];

    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            post_order.push(node);
            continue;
        }
        if !visited.insert(node.node_id()) {
            continue;
        }
        let inputs = node.grad_fn().map(|op| op.inputs()).unwrap_or_default();
        stack.push((node, true));
        for input in inputs {
            if !visited.contains(&input.node_id()) {
                stack.push((input, false));
            }
        }
    }
    post_order.reverse();
    post_order
}
