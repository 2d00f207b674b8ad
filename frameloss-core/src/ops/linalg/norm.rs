use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::FrameLossError;
use crate::ops::apply_binary_op;
use crate::ops::arithmetic::{sqrt_op, square_op};
use crate::ops::reduction::sum_op;
use crate::ops::reduction::utils::reduced_shape;
use crate::tensor::Tensor;

/// Backward of an L2 norm: `g * x / ||x||`, with a zero subgradient where
/// the norm vanishes.
#[derive(Debug)]
struct NormBackward {
    input: Tensor,
    /// `None` for the norm over every element.
    dim: Option<usize>,
}

impl BackwardOp for NormBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, FrameLossError> {
        let x = self.input.detach();
        let shape = x.shape();
        let axes: Vec<usize> = match self.dim {
            Some(dim) => vec![dim],
            None => (0..shape.len()).collect(),
        };
        let kept_shape = reduced_shape(&shape, &axes, true);
        let norm = norm_kept(&x, &axes)?;
        let grad_kept = grad_output.reshape(kept_shape)?;
        let scale = apply_binary_op(
            &grad_kept,
            &norm,
            |g, n| if n > 0.0 { g / n } else { 0.0 },
            |g, n| if n > 0.0 { g / n } else { 0.0 },
            "norm_backward",
        )?;
        Ok(vec![x.mul(&scale)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

fn norm_kept(x: &Tensor, axes: &[usize]) -> Result<Tensor, FrameLossError> {
    sqrt_op(&sum_op(&square_op(x)?, Some(axes), true)?)
}

fn norm_forward(a: &Tensor, dim: Option<usize>, keep_dims: bool) -> Result<Tensor, FrameLossError> {
    // The composite square/sum/sqrt graph is replaced by a single node.
    let x = a.detach();
    let squared = square_op(&x)?;
    let total = match dim {
        Some(dim) => sum_op(&squared, Some(&[dim]), keep_dims)?,
        None => sum_op(&squared, None, false)?,
    };
    let output = sqrt_op(&total)?;
    if a.requires_grad() {
        output.set_grad_fn(Arc::new(NormBackward { input: a.clone(), dim }));
    }
    Ok(output)
}

/// L2 (Frobenius) norm over every element, as a 0-d tensor.
pub fn norm_op(a: &Tensor) -> Result<Tensor, FrameLossError> {
    norm_forward(a, None, false)
}

/// L2 norm along `dim`.
pub fn norm_dim_op(a: &Tensor, dim: usize, keep_dims: bool) -> Result<Tensor, FrameLossError> {
    norm_forward(a, Some(dim), keep_dims)
}
