use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::FrameLossError;
use crate::ops::reduction::utils::{normalize_axes, reduce_axes, reduced_shape};
use crate::ops::traits::TensorElement;
use crate::tensor::Tensor;
use crate::types::DType;

/// Routes each output gradient to the position of the minimum it came from
/// (first occurrence on ties).
#[derive(Debug)]
struct MinBackward {
    input: Tensor,
    dim: usize,
}

impl BackwardOp for MinBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, FrameLossError> {
        let x = self.input.detach();
        let shape = x.shape();
        let grad_kept = grad_output.reshape(reduced_shape(&shape, &[self.dim], true))?;
        let grad = match x.dtype() {
            DType::F32 => min_backward_typed::<f32>(&x, &grad_kept, &shape, self.dim)?,
            DType::F64 => min_backward_typed::<f64>(&x, &grad_kept, &shape, self.dim)?,
        };
        Ok(vec![grad])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

fn min_backward_typed<T: TensorElement>(
    x: &Tensor,
    grad: &Tensor,
    shape: &[usize],
    dim: usize,
) -> Result<Tensor, FrameLossError> {
    let data = x.cpu_data::<T>("min_backward")?;
    let g = grad.cpu_data::<T>("min_backward")?;
    let outer: usize = shape[..dim].iter().product();
    let len = shape[dim];
    let inner: usize = shape[dim + 1..].iter().product();
    let mut out = vec![T::zero(); data.len()];

    for o in 0..outer {
        for i in 0..inner {
            let at = |k: usize| (o * len + k) * inner + i;
            let mut best = at(0);
            let mut best_value = T::nan();
            for k in 0..len {
                let v = data[at(k)];
                if v < best_value || (best_value.is_nan() && !v.is_nan()) {
                    best = at(k);
                    best_value = v;
                }
            }
            out[best] = g[o * inner + i];
        }
    }
    Tensor::from_vec(out, shape.to_vec())
}

/// Minimum values along a single dimension.
///
/// Only the values are returned; NaN entries are skipped unless the whole
/// slice is NaN.
pub fn min_op(a: &Tensor, dim: usize, keep_dims: bool) -> Result<Tensor, FrameLossError> {
    let shape = a.shape();
    let axes = normalize_axes(Some(&[dim]), shape.len(), "min")?;
    if shape[dim] == 0 {
        return Err(FrameLossError::InvalidArgument {
            operation: "min".to_string(),
            message: format!("cannot take the minimum over empty dimension {}", dim),
        });
    }
    let output = match a.dtype() {
        DType::F32 => min_typed::<f32>(a, &shape, &axes, keep_dims)?,
        DType::F64 => min_typed::<f64>(a, &shape, &axes, keep_dims)?,
    };
    if a.requires_grad() {
        output.set_grad_fn(Arc::new(MinBackward { input: a.clone(), dim }));
    }
    Ok(output)
}

fn min_typed<T: TensorElement>(a: &Tensor, shape: &[usize], axes: &[usize], keep_dims: bool) -> Result<Tensor, FrameLossError> {
    let data = a.cpu_data::<T>("min")?;
    let out = reduce_axes(&data, shape, axes, T::nan(), |acc, x| acc.min(x));
    Tensor::from_vec(out, reduced_shape(shape, axes, keep_dims))
}
