use std::fmt::Debug;

use crate::error::FrameLossError;
use crate::tensor::Tensor;

/// The backward pass of one differentiable operation.
///
/// An implementation is stored in the output tensor's `grad_fn` and holds
/// whatever the chain rule needs from the forward pass (input handles,
/// shapes, parameters).
pub trait BackwardOp: Debug + Send + Sync {
    /// Given `dL/dOutput`, returns `dL/dInput` for every tensor returned by
    /// [`inputs`](BackwardOp::inputs), in the same order and with the same shapes.
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, FrameLossError>;

    /// The inputs that required a gradient when the forward pass ran.
    fn inputs(&self) -> Vec<Tensor>;
}
