use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::FrameLossError;
use crate::ops::reduction::utils::{normalize_axes, reduce_axes, reduced_shape};
use crate::ops::traits::TensorElement;
use crate::tensor::Tensor;
use crate::types::DType;

/// Backward of `sum` and `mean`: the gradient is broadcast back over the
/// reduced axes, scaled by `scale` (1 for sum, `1/count` for mean).
#[derive(Debug)]
pub(crate) struct SumBackward {
    input: Tensor,
    axes: Vec<usize>,
    scale: f64,
}

impl BackwardOp for SumBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, FrameLossError> {
        let input_shape = self.input.shape();
        let kept_shape = reduced_shape(&input_shape, &self.axes, true);
        let grad = grad_output.reshape(kept_shape)?.expand(&input_shape)?;
        if self.scale == 1.0 {
            Ok(vec![grad])
        } else {
            Ok(vec![grad.mul_scalar(self.scale)?])
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

pub(crate) fn record_sum(input: &Tensor, axes: Vec<usize>, scale: f64, output: Tensor) -> Tensor {
    if input.requires_grad() {
        output.set_grad_fn(Arc::new(SumBackward {
            input: input.clone(),
            axes,
            scale,
        }));
    }
    output
}

/// Sums the tensor over `axes` (all axes when `None`).
///
/// With `keep_dims` the reduced axes stay in the output shape with size 1.
pub fn sum_op(a: &Tensor, axes: Option<&[usize]>, keep_dims: bool) -> Result<Tensor, FrameLossError> {
    let shape = a.shape();
    let axes = normalize_axes(axes, shape.len(), "sum")?;
    let output = match a.dtype() {
        DType::F32 => sum_typed::<f32>(a, &shape, &axes, keep_dims)?,
        DType::F64 => sum_typed::<f64>(a, &shape, &axes, keep_dims)?,
    };
    Ok(record_sum(a, axes, 1.0, output))
}

fn sum_typed<T: TensorElement>(a: &Tensor, shape: &[usize], axes: &[usize], keep_dims: bool) -> Result<Tensor, FrameLossError> {
    let data = a.cpu_data::<T>("sum")?;
    let out = reduce_axes(&data, shape, axes, T::zero(), |acc, x| acc + x);
    Tensor::from_vec(out, reduced_shape(shape, axes, keep_dims))
}
