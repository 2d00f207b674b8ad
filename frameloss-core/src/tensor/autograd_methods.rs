use std::collections::HashMap;
use std::sync::Arc;

use log::trace;

use crate::autograd::graph::{topological_sort, NodeId};
use crate::autograd::BackwardOp;
use crate::error::FrameLossError;
use crate::ops::arithmetic::add_op;
use crate::tensor::create::{ones, ones_f64};
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use crate::types::DType;

impl Tensor {
    /// Returns a clone of the gradient tensor, if one was accumulated.
    pub fn grad(&self) -> Option<Tensor> {
        self.read_data().grad.clone()
    }

    /// Drops the accumulated gradient.
    pub fn zero_grad(&self) {
        self.write_data().grad = None;
    }

    /// Returns the backward node that produced this tensor.
    pub fn grad_fn(&self) -> Option<Arc<dyn BackwardOp + Send + Sync>> {
        self.read_data().grad_fn.clone()
    }

    /// True for tensors not produced by a recorded operation.
    pub fn is_leaf(&self) -> bool {
        self.read_data().grad_fn.is_none()
    }

    /// A tensor sharing this one's data but cut from the graph.
    pub fn detach(&self) -> Tensor {
        let guard = self.read_data();
        Tensor::from_tensor_data(TensorData::new_view(
            Arc::clone(&guard.buffer),
            guard.device,
            guard.dtype,
            guard.shape.clone(),
        ))
    }

    pub(crate) fn node_id(&self) -> NodeId {
        Arc::as_ptr(&self.data)
    }

    /// Marks `self` as the output of `grad_fn`.
    pub(crate) fn set_grad_fn(&self, grad_fn: Arc<dyn BackwardOp + Send + Sync>) {
        let mut guard = self.write_data();
        guard.requires_grad = true;
        guard.grad_fn = Some(grad_fn);
    }

    /// Back-propagates from this tensor and accumulates `dself/dleaf` into
    /// the `grad` of every leaf that requires a gradient.
    ///
    /// `gradient` defaults to ones when `self` holds a single element.
    /// Calling it on a tensor that does not require a gradient is a no-op.
    ///
    /// # Errors
    /// `BackwardNonScalar` for a multi-element tensor without `gradient`,
    /// `BackwardError` for a gradient of the wrong shape or dtype.
    pub fn backward(&self, gradient: Option<Tensor>) -> Result<(), FrameLossError> {
        if !self.requires_grad() {
            return Ok(());
        }
        let grad_init = match gradient {
            Some(g) => {
                if g.shape() != self.shape() || g.dtype() != self.dtype() {
                    return Err(FrameLossError::BackwardError(format!(
                        "gradient {:?} {:?} does not match tensor {:?} {:?}",
                        g.shape(),
                        g.dtype(),
                        self.shape(),
                        self.dtype()
                    )));
                }
                g.detach()
            }
            None if self.numel() == 1 => match self.dtype() {
                DType::F32 => ones(&self.shape())?,
                DType::F64 => ones_f64(&self.shape())?,
            },
            None => return Err(FrameLossError::BackwardNonScalar),
        };

        let sorted_nodes = topological_sort(self);
        trace!("backward over {} node(s)", sorted_nodes.len());
        let mut grad_map: HashMap<NodeId, Tensor> = HashMap::new();
        grad_map.insert(self.node_id(), grad_init);

        for node in sorted_nodes {
            let accumulated = match grad_map.remove(&node.node_id()) {
                Some(grad) => grad,
                None => continue,
            };
            let op = match node.grad_fn() {
                Some(op) => op,
                None => {
                    if node.requires_grad() {
                        node.accumulate_grad(accumulated)?;
                    }
                    continue;
                }
            };

            let inputs = op.inputs();
            let input_grads = op.backward(&accumulated)?;
            if input_grads.len() != inputs.len() {
                return Err(FrameLossError::BackwardError(format!(
                    "{:?} returned {} gradient(s) for {} input(s)",
                    op,
                    input_grads.len(),
                    inputs.len()
                )));
            }
            for (input, grad) in inputs.iter().zip(input_grads) {
                if grad.shape() != input.shape() {
                    return Err(FrameLossError::BackwardError(format!(
                        "{:?} produced a {:?} gradient for a {:?} input",
                        op,
                        grad.shape(),
                        input.shape()
                    )));
                }
                let id = input.node_id();
                let summed = match grad_map.remove(&id) {
                    Some(existing) => add_op(&existing, &grad)?,
                    None => grad,
                };
                grad_map.insert(id, summed);
            }
        }
        Ok(())
    }

    fn accumulate_grad(&self, grad: Tensor) -> Result<(), FrameLossError> {
        let existing = self.grad();
        let total = match existing {
            Some(existing) => add_op(&existing, &grad)?,
            None => grad,
        };
        self.write_data().grad = Some(total);
        Ok(())
    }
}

#[cfg(test)]
#[path = "autograd_methods_test.rs"]
mod tests;
