//! # Tensor Operations Module (`ops`)
//!
//! Forward kernels for every tensor operation the losses need. Operations are
//! grouped by what they do:
//!
//! - [`arithmetic`]: element-wise arithmetic with broadcasting (add, sub, mul, div, ...).
//! - [`reduction`]: sum, mean and min/max along axes.
//! - [`linalg`]: 2-D matmul and L2 norms.
//! - [`conv`]: grouped 2-D convolution and max pooling.
//! - [`activation`]: ReLU.
//! - [`view`]: reshape, unsqueeze, expand.
//! - [`dtype`]: casting between F32 and F64.
//!
//! Each op has a core `xxx_op` function; the `Tensor` methods are thin
//! wrappers around them. Kernels are generic over [`traits::TensorElement`]
//! and dispatched on the input's `DType`.

pub mod traits;

pub mod activation;
pub mod arithmetic;
pub mod conv;
pub mod dtype;
pub mod linalg;
pub mod reduction;
pub mod view;

use crate::error::FrameLossError;
use crate::ops::traits::TensorElement;
use crate::tensor::utils::{broadcast_shapes, broadcast_strides, increment_index};
use crate::tensor::Tensor;
use crate::types::DType;

/// Applies a unary element-wise operation to a tensor.
///
/// # Arguments
/// * `a`: The input tensor.
/// * `op_f32`: The operation for F32 data.
/// * `op_f64`: The operation for F64 data.
/// * `op_name`: Name of the operation for error messages.
pub(crate) fn apply_unary_op<F32Op, F64Op>(
    a: &Tensor,
    op_f32: F32Op,
    op_f64: F64Op,
    op_name: &str,
) -> Result<Tensor, FrameLossError>
where
    F32Op: Fn(f32) -> f32,
    F64Op: Fn(f64) -> f64,
{
    match a.dtype() {
        DType::F32 => unary_typed(a, op_f32, op_name),
        DType::F64 => unary_typed(a, op_f64, op_name),
    }
}

fn unary_typed<T, F>(a: &Tensor, op: F, op_name: &str) -> Result<Tensor, FrameLossError>
where
    T: TensorElement,
    F: Fn(T) -> T,
{
    let data = a.cpu_data::<T>(op_name)?;
    let out: Vec<T> = data.iter().map(|&x| op(x)).collect();
    Tensor::from_vec(out, a.shape())
}

/// Applies a binary element-wise operation with NumPy-style broadcasting.
///
/// Both operands must share the same `DType`; no implicit promotion happens.
pub(crate) fn apply_binary_op<F32Op, F64Op>(
    a: &Tensor,
    b: &Tensor,
    op_f32: F32Op,
    op_f64: F64Op,
    op_name: &str,
) -> Result<Tensor, FrameLossError>
where
    F32Op: Fn(f32, f32) -> f32,
    F64Op: Fn(f64, f64) -> f64,
{
    let dtype = a.dtype();
    if dtype != b.dtype() {
        return Err(FrameLossError::DataTypeMismatch {
            expected: dtype,
            actual: b.dtype(),
            operation: op_name.to_string(),
        });
    }
    let a_shape = a.shape();
    let b_shape = b.shape();
    let out_shape = broadcast_shapes(&a_shape, &b_shape).ok_or_else(|| FrameLossError::BroadcastError {
        shape1: a_shape.clone(),
        shape2: b_shape.clone(),
    })?;

    match dtype {
        DType::F32 => binary_typed(a, b, &out_shape, op_f32, op_name),
        DType::F64 => binary_typed(a, b, &out_shape, op_f64, op_name),
    }
}

fn binary_typed<T, F>(
    a: &Tensor,
    b: &Tensor,
    out_shape: &[usize],
    op: F,
    op_name: &str,
) -> Result<Tensor, FrameLossError>
where
    T: TensorElement,
    F: Fn(T, T) -> T,
{
    let a_data = a.cpu_data::<T>(op_name)?;
    let b_data = b.cpu_data::<T>(op_name)?;
    let a_shape = a.shape();
    let b_shape = b.shape();

    if a_shape == b_shape {
        let out: Vec<T> = a_data
            .iter()
            .zip(b_data.iter())
            .map(|(&x, &y)| op(x, y))
            .collect();
        return Tensor::from_vec(out, out_shape.to_vec());
    }

    let a_strides = broadcast_strides(&a_shape, out_shape);
    let b_strides = broadcast_strides(&b_shape, out_shape);
    let numel: usize = out_shape.iter().product();
    let mut out = Vec::with_capacity(numel);
    if numel > 0 {
        let mut index = vec![0; out_shape.len()];
        loop {
            let a_offset: usize = index.iter().zip(&a_strides).map(|(i, s)| i * s).sum();
            let b_offset: usize = index.iter().zip(&b_strides).map(|(i, s)| i * s).sum();
            out.push(op(a_data[a_offset], b_data[b_offset]));
            if !increment_index(&mut index, out_shape) {
                break;
            }
        }
    }
    Tensor::from_vec(out, out_shape.to_vec())
}
