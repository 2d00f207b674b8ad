use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::FrameLossError;
use crate::ops::apply_binary_op;
use crate::tensor::Tensor;

/// The element-wise binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryKind {
    Add,
    Sub,
    Mul,
    Div,
}

/// Backward node shared by the broadcasting binary ops. Gradients are summed
/// back down to each operand's shape.
#[derive(Debug)]
struct BinaryBackward {
    kind: BinaryKind,
    a: Tensor,
    b: Tensor,
    a_requires_grad: bool,
    b_requires_grad: bool,
}

impl BackwardOp for BinaryBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, FrameLossError> {
        let a = self.a.detach();
        let b = self.b.detach();
        let mut grads = Vec::with_capacity(2);

        if self.a_requires_grad {
            // d(a op b)/da
            let grad_a = match self.kind {
                BinaryKind::Add | BinaryKind::Sub => grad_output.clone(),
                BinaryKind::Mul => mul_op(grad_output, &b)?,
                BinaryKind::Div => div_op(grad_output, &b)?,
            };
            grads.push(grad_a.reduce_to_shape(&a.shape())?);
        }
        if self.b_requires_grad {
            // d(a op b)/db
            let grad_b = match self.kind {
                BinaryKind::Add => grad_output.clone(),
                BinaryKind::Sub => grad_output.neg()?,
                BinaryKind::Mul => mul_op(grad_output, &a)?,
                BinaryKind::Div => {
                    // -g * a / b^2
                    let b_squared = mul_op(&b, &b)?;
                    mul_op(grad_output, &div_op(&a, &b_squared)?)?.neg()?
                }
            };
            grads.push(grad_b.reduce_to_shape(&b.shape())?);
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

fn record(kind: BinaryKind, a: &Tensor, b: &Tensor, output: Tensor) -> Tensor {
    let a_requires_grad = a.requires_grad();
    let b_requires_grad = b.requires_grad();
    if a_requires_grad || b_requires_grad {
        output.set_grad_fn(Arc::new(BinaryBackward {
            kind,
            a: a.clone(),
            b: b.clone(),
            a_requires_grad,
            b_requires_grad,
        }));
    }
    output
}

/// Element-wise `a + b` with broadcasting.
pub fn add_op(a: &Tensor, b: &Tensor) -> Result<Tensor, FrameLossError> {
    let output = apply_binary_op(a, b, |x, y| x + y, |x, y| x + y, "add")?;
    Ok(record(BinaryKind::Add, a, b, output))
}

/// Element-wise `a - b` with broadcasting.
pub fn sub_op(a: &Tensor, b: &Tensor) -> Result<Tensor, FrameLossError> {
    let output = apply_binary_op(a, b, |x, y| x - y, |x, y| x - y, "sub")?;
    Ok(record(BinaryKind::Sub, a, b, output))
}

/// Element-wise `a * b` with broadcasting.
pub fn mul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, FrameLossError> {
    let output = apply_binary_op(a, b, |x, y| x * y, |x, y| x * y, "mul")?;
    Ok(record(BinaryKind::Mul, a, b, output))
}

/// Element-wise `a / b` with broadcasting. Division by zero follows IEEE 754.
pub fn div_op(a: &Tensor, b: &Tensor) -> Result<Tensor, FrameLossError> {
    let output = apply_binary_op(a, b, |x, y| x / y, |x, y| x / y, "div")?;
    Ok(record(BinaryKind::Div, a, b, output))
}
