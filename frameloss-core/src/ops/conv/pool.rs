use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::FrameLossError;
use crate::ops::traits::TensorElement;
use crate::tensor::Tensor;
use crate::types::DType;

/// Max pooling over `[N, C, H, W]` without padding; trailing rows/columns
/// that do not fill a whole window are dropped.
pub fn max_pool2d_op(input: &Tensor, kernel_size: usize, stride: usize) -> Result<Tensor, FrameLossError> {
    let shape = input.shape();
    if shape.len() != 4 {
        return Err(FrameLossError::DimensionMismatch {
            expected: 4,
            actual: shape.len(),
            operation: "max_pool2d".to_string(),
        });
    }
    if kernel_size == 0 || stride == 0 || kernel_size > shape[2] || kernel_size > shape[3] {
        return Err(FrameLossError::InvalidArgument {
            operation: "max_pool2d".to_string(),
            message: format!(
                "kernel {} with stride {} does not fit input {:?}",
                kernel_size, stride, shape
            ),
        });
    }
    let output = match input.dtype() {
        DType::F32 => max_pool2d_typed::<f32>(input, &shape, kernel_size, stride)?,
        DType::F64 => max_pool2d_typed::<f64>(input, &shape, kernel_size, stride)?,
    };
    if input.requires_grad() {
        output.set_grad_fn(Arc::new(MaxPool2dBackward {
            input: input.clone(),
            kernel_size,
            stride,
        }));
    }
    Ok(output)
}

/// Sends each window's gradient to the cell that held its maximum
/// (first one in row-major order on ties).
#[derive(Debug)]
struct MaxPool2dBackward {
    input: Tensor,
    kernel_size: usize,
    stride: usize,
}

impl BackwardOp for MaxPool2dBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, FrameLossError> {
        let input = self.input.detach();
        let shape = input.shape();
        let grad = match input.dtype() {
            DType::F32 => max_pool2d_backward_typed::<f32>(&input, grad_output, &shape, self.kernel_size, self.stride)?,
            DType::F64 => max_pool2d_backward_typed::<f64>(&input, grad_output, &shape, self.kernel_size, self.stride)?,
        };
        Ok(vec![grad])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

fn max_pool2d_backward_typed<T: TensorElement>(
    input: &Tensor,
    grad_output: &Tensor,
    shape: &[usize],
    kernel_size: usize,
    stride: usize,
) -> Result<Tensor, FrameLossError> {
    let x = input.cpu_data::<T>("max_pool2d_backward")?;
    let go = grad_output.cpu_data::<T>("max_pool2d_backward")?;
    let (n, c, h, w) = (shape[0], shape[1], shape[2], shape[3]);
    let out_h = (h - kernel_size) / stride + 1;
    let out_w = (w - kernel_size) / stride + 1;
    let mut grad = vec![T::zero(); x.len()];

    for plane in 0..n * c {
        let base = plane * h * w;
        for oh in 0..out_h {
            for ow in 0..out_w {
                let mut best = base + oh * stride * w + ow * stride;
                for kh in 0..kernel_size {
                    let row = base + (oh * stride + kh) * w;
                    for kw in 0..kernel_size {
                        let idx = row + ow * stride + kw;
                        if x[idx] > x[best] {
                            best = idx;
                        }
                    }
                }
                let out_idx = (plane * out_h + oh) * out_w + ow;
                grad[best] = grad[best] + go[out_idx];
            }
        }
    }
    Tensor::from_vec(grad, shape.to_vec())
}

fn max_pool2d_typed<T: TensorElement>(
    input: &Tensor,
    shape: &[usize],
    kernel_size: usize,
    stride: usize,
) -> Result<Tensor, FrameLossError> {
    let x = input.cpu_data::<T>("max_pool2d")?;
    let (n, c, h, w) = (shape[0], shape[1], shape[2], shape[3]);
    let out_h = (h - kernel_size) / stride + 1;
    let out_w = (w - kernel_size) / stride + 1;
    let mut out = Vec::with_capacity(n * c * out_h * out_w);

    for plane in 0..n * c {
        let base = plane * h * w;
        for oh in 0..out_h {
            for ow in 0..out_w {
                let mut best = T::neg_infinity();
                for kh in 0..kernel_size {
                    let row = base + (oh * stride + kh) * w;
                    for kw in 0..kernel_size {
                        best = best.max(x[row + ow * stride + kw]);
                    }
                }
                out.push(best);
            }
        }
    }
    Tensor::from_vec(out, vec![n, c, out_h, out_w])
}
