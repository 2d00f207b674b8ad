use crate::error::FrameLossError;
use crate::ops::apply_unary_op;
use crate::ops::arithmetic::{record_unary, UnaryKind};
use crate::tensor::Tensor;

/// Rectified linear unit, `max(0, x)` element-wise.
pub fn relu_op(a: &Tensor) -> Result<Tensor, FrameLossError> {
    let output = apply_unary_op(a, |x| x.max(0.0), |x| x.max(0.0), "relu")?;
    Ok(record_unary(UnaryKind::Relu, a, output))
}
