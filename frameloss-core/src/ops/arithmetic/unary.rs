use std::sync::Arc;

use num_traits::Float;

use crate::autograd::BackwardOp;
use crate::error::FrameLossError;
use crate::ops::apply_unary_op;
use crate::tensor::Tensor;

/// Element-wise unary maps with a known derivative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum UnaryKind {
    Neg,
    Abs,
    Sqrt,
    Square,
    AddScalar,
    MulScalar(f64),
    Relu,
}

#[derive(Debug)]
pub(crate) struct UnaryBackward {
    kind: UnaryKind,
    input: Tensor,
}

impl BackwardOp for UnaryBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, FrameLossError> {
        let x = self.input.detach();
        let grad = match self.kind {
            UnaryKind::Neg => grad_output.neg()?,
            UnaryKind::AddScalar => grad_output.clone(),
            UnaryKind::MulScalar(scalar) => grad_output.mul_scalar(scalar)?,
            UnaryKind::Abs => grad_output.mul(&apply_unary_op(&x, sign::<f32>, sign::<f64>, "abs_backward")?)?,
            UnaryKind::Sqrt => grad_output.mul(&apply_unary_op(&x, half_rsqrt::<f32>, half_rsqrt::<f64>, "sqrt_backward")?)?,
            UnaryKind::Square => grad_output.mul(&x.mul_scalar(2.0)?)?,
            UnaryKind::Relu => grad_output.mul(&apply_unary_op(&x, step::<f32>, step::<f64>, "relu_backward")?)?,
        };
        Ok(vec![grad])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Derivative of `|x|`, taken as zero at the kink.
fn sign<T: Float>(v: T) -> T {
    if v > T::zero() {
        T::one()
    } else if v < T::zero() {
        -T::one()
    } else {
        T::zero()
    }
}

/// Derivative of `max(0, x)`.
fn step<T: Float>(v: T) -> T {
    if v > T::zero() {
        T::one()
    } else {
        T::zero()
    }
}

/// Derivative of `sqrt(x)`: `1 / (2 sqrt(x))`.
fn half_rsqrt<T: Float>(v: T) -> T {
    let root = v.sqrt();
    (root + root).recip()
}

/// Attaches a [`UnaryBackward`] to `output` when `input` is tracked.
pub(crate) fn record_unary(kind: UnaryKind, input: &Tensor, output: Tensor) -> Tensor {
    if input.requires_grad() {
        output.set_grad_fn(Arc::new(UnaryBackward {
            kind,
            input: input.clone(),
        }));
    }
    output
}

pub fn neg_op(a: &Tensor) -> Result<Tensor, FrameLossError> {
    let output = apply_unary_op(a, |x| -x, |x| -x, "neg")?;
    Ok(record_unary(UnaryKind::Neg, a, output))
}

pub fn abs_op(a: &Tensor) -> Result<Tensor, FrameLossError> {
    let output = apply_unary_op(a, f32::abs, f64::abs, "abs")?;
    Ok(record_unary(UnaryKind::Abs, a, output))
}

pub fn sqrt_op(a: &Tensor) -> Result<Tensor, FrameLossError> {
    let output = apply_unary_op(a, f32::sqrt, f64::sqrt, "sqrt")?;
    Ok(record_unary(UnaryKind::Sqrt, a, output))
}

pub fn square_op(a: &Tensor) -> Result<Tensor, FrameLossError> {
    let output = apply_unary_op(a, |x| x * x, |x| x * x, "square")?;
    Ok(record_unary(UnaryKind::Square, a, output))
}

/// Adds a scalar to every element. The scalar is rounded to the tensor's dtype.
pub fn add_scalar_op(a: &Tensor, scalar: f64) -> Result<Tensor, FrameLossError> {
    let s32 = scalar as f32;
    let output = apply_unary_op(a, move |x| x + s32, move |x| x + scalar, "add_scalar")?;
    Ok(record_unary(UnaryKind::AddScalar, a, output))
}

/// Multiplies every element by a scalar. The scalar is rounded to the tensor's dtype.
pub fn mul_scalar_op(a: &Tensor, scalar: f64) -> Result<Tensor, FrameLossError> {
    let s32 = scalar as f32;
    let output = apply_unary_op(a, move |x| x * s32, move |x| x * scalar, "mul_scalar")?;
    Ok(record_unary(UnaryKind::MulScalar(scalar), a, output))
}
