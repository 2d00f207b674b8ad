use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::FrameLossError;
use crate::ops::traits::TensorElement;
use crate::tensor::Tensor;
use crate::types::DType;

/// Matrix product of two 2-D tensors, `[m, k] x [k, n] -> [m, n]`.
pub fn matmul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, FrameLossError> {
    let a_shape = a.shape();
    let b_shape = b.shape();
    for shape in [&a_shape, &b_shape] {
        if shape.len() != 2 {
            return Err(FrameLossError::DimensionMismatch {
                expected: 2,
                actual: shape.len(),
                operation: "matmul".to_string(),
            });
        }
    }
    if a_shape[1] != b_shape[0] {
        return Err(FrameLossError::ShapeMismatch {
            expected: vec![a_shape[1], b_shape[1]],
            actual: b_shape,
            operation: "matmul (inner dimensions)".to_string(),
        });
    }
    if a.dtype() != b.dtype() {
        return Err(FrameLossError::DataTypeMismatch {
            expected: a.dtype(),
            actual: b.dtype(),
            operation: "matmul".to_string(),
        });
    }
    let output = match a.dtype() {
        DType::F32 => matmul_typed::<f32>(a, b, a_shape[0], a_shape[1], b_shape[1])?,
        DType::F64 => matmul_typed::<f64>(a, b, a_shape[0], a_shape[1], b_shape[1])?,
    };
    let a_requires_grad = a.requires_grad();
    let b_requires_grad = b.requires_grad();
    if a_requires_grad || b_requires_grad {
        output.set_grad_fn(Arc::new(MatmulBackward {
            a: a.clone(),
            b: b.clone(),
            a_requires_grad,
            b_requires_grad,
        }));
    }
    Ok(output)
}

/// `dA = G B^T`, `dB = A^T G`.
#[derive(Debug)]
struct MatmulBackward {
    a: Tensor,
    b: Tensor,
    a_requires_grad: bool,
    b_requires_grad: bool,
}

impl BackwardOp for MatmulBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, FrameLossError> {
        let mut grads = Vec::with_capacity(2);
        if self.a_requires_grad {
            grads.push(matmul_op(grad_output, &transpose_2d(&self.b.detach())?)?);
        }
        if self.b_requires_grad {
            grads.push(matmul_op(&transpose_2d(&self.a.detach())?, grad_output)?);
        }
        Ok(grads)
    }

    fn inputs(&self) -> Vec<Tensor> {
        let mut inputs = Vec::with_capacity(2);
        if self.a_requires_grad {
            inputs.push(self.a.clone());
        }
        if self.b_requires_grad {
            inputs.push(self.b.clone());
        }
        inputs
    }
}

/// Materialized transpose of a 2-D tensor.
fn transpose_2d(t: &Tensor) -> Result<Tensor, FrameLossError> {
    match t.dtype() {
        DType::F32 => transpose_typed::<f32>(t),
        DType::F64 => transpose_typed::<f64>(t),
    }
}

fn transpose_typed<T: TensorElement>(t: &Tensor) -> Result<Tensor, FrameLossError> {
    let shape = t.shape();
    let (rows, cols) = (shape[0], shape[1]);
    let data = t.cpu_data::<T>("transpose")?;
    let mut out = Vec::with_capacity(rows * cols);
    for c in 0..cols {
        for r in 0..rows {
            out.push(data[r * cols + c]);
        }
    }
    Tensor::from_vec(out, vec![cols, rows])
}

fn matmul_typed<T: TensorElement>(a: &Tensor, b: &Tensor, m: usize, k: usize, n: usize) -> Result<Tensor, FrameLossError> {
    let a_data = a.cpu_data::<T>("matmul")?;
    let b_data = b.cpu_data::<T>("matmul")?;
    let mut out = vec![T::zero(); m * n];
    for i in 0..m {
        for p in 0..k {
            let a_ip = a_data[i * k + p];
            for j in 0..n {
                out[i * n + j] = out[i * n + j] + a_ip * b_data[p * n + j];
            }
        }
    }
    Tensor::from_vec(out, vec![m, n])
}
