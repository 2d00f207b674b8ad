use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::FrameLossError;
use crate::ops::traits::TensorElement;
use crate::tensor::Tensor;
use crate::types::DType;

/// The whole gradient goes to the first largest element.
#[derive(Debug)]
struct MaxAllBackward {
    input: Tensor,
}

impl BackwardOp for MaxAllBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, FrameLossError> {
        let x = self.input.detach();
        let grad = match x.dtype() {
            DType::F32 => max_all_backward_typed::<f32>(&x, grad_output)?,
            DType::F64 => max_all_backward_typed::<f64>(&x, grad_output)?,
        };
        Ok(vec![grad])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

fn max_all_backward_typed<T: TensorElement>(x: &Tensor, grad: &Tensor) -> Result<Tensor, FrameLossError> {
    let data = x.cpu_data::<T>("max_backward")?;
    let g = grad.cpu_data::<T>("max_backward")?;
    let mut best = 0;
    for (i, &v) in data.iter().enumerate() {
        if v > data[best] || (data[best].is_nan() && !v.is_nan()) {
            best = i;
        }
    }
    let mut out = vec![T::zero(); data.len()];
    out[best] = g[0];
    Tensor::from_vec(out, x.shape())
}

/// Largest element of the whole tensor as a 0-d tensor.
pub fn max_all_op(a: &Tensor) -> Result<Tensor, FrameLossError> {
    let output = match a.dtype() {
        DType::F32 => max_all_typed::<f32>(a)?,
        DType::F64 => max_all_typed::<f64>(a)?,
    };
    if a.requires_grad() {
        output.set_grad_fn(Arc::new(MaxAllBackward { input: a.clone() }));
    }
    Ok(output)
}

fn max_all_typed<T: TensorElement>(a: &Tensor) -> Result<Tensor, FrameLossError> {
    let data = a.cpu_data::<T>("max")?;
    if data.is_empty() {
        return Err(FrameLossError::InvalidArgument {
            operation: "max".to_string(),
            message: "cannot take the maximum of an empty tensor".to_string(),
        });
    }
    let max = data.iter().fold(T::neg_infinity(), |acc, &x| acc.max(x));
    Tensor::from_vec(vec![max], vec![])
}
