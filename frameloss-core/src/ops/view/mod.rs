//! Shape manipulation. `reshape` and `unsqueeze` share the input buffer;
//! `expand` materializes a contiguous copy.

use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::FrameLossError;
use crate::ops::traits::TensorElement;
use crate::tensor::utils::{broadcast_strides, increment_index};
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;
use crate::types::DType;

/// Returns a tensor with the same data and a new shape.
pub fn reshape_op(a: &Tensor, new_shape: Vec<usize>) -> Result<Tensor, FrameLossError> {
    let guard = a.read_data();
    let new_numel: usize = new_shape.iter().product();
    if new_numel != guard.numel() {
        return Err(FrameLossError::ShapeMismatch {
            expected: guard.shape.clone(),
            actual: new_shape,
            operation: "reshape (element count)".to_string(),
        });
    }
    let input_shape = guard.shape.clone();
    let requires_grad = guard.requires_grad;
    let view = TensorData::new_view(guard.buffer.clone(), guard.device, guard.dtype, new_shape);
    drop(guard);

    let output = Tensor::from_tensor_data(view);
    if requires_grad {
        output.set_grad_fn(Arc::new(ReshapeBackward {
            input: a.clone(),
            input_shape,
        }));
    }
    Ok(output)
}

#[derive(Debug)]
struct ReshapeBackward {
    input: Tensor,
    input_shape: Vec<usize>,
}

impl BackwardOp for ReshapeBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, FrameLossError> {
        Ok(vec![reshape_op(grad_output, self.input_shape.clone())?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Sums the expanded gradient back to the source shape.
#[derive(Debug)]
struct ExpandBackward {
    input: Tensor,
    input_shape: Vec<usize>,
}

impl BackwardOp for ExpandBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, FrameLossError> {
        Ok(vec![grad_output.reduce_to_shape(&self.input_shape)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Inserts a dimension of size 1 at `dim` (`0..=rank`).
pub fn unsqueeze_op(a: &Tensor, dim: usize) -> Result<Tensor, FrameLossError> {
    let mut shape = a.shape();
    if dim > shape.len() {
        return Err(FrameLossError::InvalidArgument {
            operation: "unsqueeze".to_string(),
            message: format!("dim {} is out of range for rank {}", dim, shape.len()),
        });
    }
    shape.insert(dim, 1);
    reshape_op(a, shape)
}

/// Repeats size-1 (or missing leading) dimensions to reach `target_shape`.
pub fn expand_op(a: &Tensor, target_shape: &[usize]) -> Result<Tensor, FrameLossError> {
    let shape = a.shape();
    let compatible = shape.len() <= target_shape.len()
        && shape
            .iter()
            .rev()
            .zip(target_shape.iter().rev())
            .all(|(&s, &t)| s == t || s == 1);
    if !compatible {
        return Err(FrameLossError::BroadcastError {
            shape1: shape,
            shape2: target_shape.to_vec(),
        });
    }
    let output = match a.dtype() {
        DType::F32 => expand_typed::<f32>(a, &shape, target_shape)?,
        DType::F64 => expand_typed::<f64>(a, &shape, target_shape)?,
    };
    if a.requires_grad() {
        output.set_grad_fn(Arc::new(ExpandBackward {
            input: a.clone(),
            input_shape: shape,
        }));
    }
    Ok(output)
}

fn expand_typed<T: TensorElement>(a: &Tensor, shape: &[usize], target_shape: &[usize]) -> Result<Tensor, FrameLossError> {
    let data = a.cpu_data::<T>("expand")?;
    let strides = broadcast_strides(shape, target_shape);
    let numel: usize = target_shape.iter().product();
    let mut out = Vec::with_capacity(numel);
    if numel > 0 {
        let mut index = vec![0; target_shape.len()];
        loop {
            let offset: usize = index.iter().zip(&strides).map(|(i, s)| i * s).sum();
            out.push(data[offset]);
            if !increment_index(&mut index, target_shape) {
                break;
            }
        }
    }
    Tensor::from_vec(out, target_shape.to_vec())
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
