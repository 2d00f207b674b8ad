//! Reverse-mode automatic differentiation.
//!
//! Every op whose inputs require a gradient stores a [`BackwardOp`] in its
//! output's `grad_fn`. `Tensor::backward` walks those links from the loss back
//! to the leaves and accumulates gradients into leaves that require them.
//! Tensors with `requires_grad == false` (frozen parameters, targets) are never
//! visited, so they never receive a gradient.

pub mod backward_op;
pub(crate) mod graph;

pub use backward_op::BackwardOp;
