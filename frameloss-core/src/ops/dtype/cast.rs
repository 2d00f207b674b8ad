use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::FrameLossError;
use crate::tensor::Tensor;
use crate::types::DType;

/// Casts the gradient back to the source dtype.
#[derive(Debug)]
struct CastBackward {
    input: Tensor,
    source: DType,
}

impl BackwardOp for CastBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, FrameLossError> {
        Ok(vec![cast_op(grad_output, self.source)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Converts a tensor to `target`. Casting to the current dtype returns a
/// shallow clone.
pub fn cast_op(a: &Tensor, target: DType) -> Result<Tensor, FrameLossError> {
    let source = a.dtype();
    if source == target {
        return Ok(a.clone());
    }
    let shape = a.shape();
    let result = match (source, target) {
        (DType::F32, DType::F64) => {
            let data = a.cpu_data::<f32>("cast")?;
            Tensor::new_f64(data.iter().map(|&v| v as f64).collect(), shape)?
        }
        (DType::F64, DType::F32) => {
            let data = a.cpu_data::<f64>("cast")?;
            Tensor::new(data.iter().map(|&v| v as f32).collect(), shape)?
        }
        _ => unreachable!("identical dtypes handled above"),
    };
    if a.requires_grad() {
        result.set_grad_fn(Arc::new(CastBackward {
            input: a.clone(),
            source,
        }));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_f32_to_f64_and_back() -> Result<(), FrameLossError> {
        let t = Tensor::new(vec![0.5, -1.25], vec![2])?;
        let wide = cast_op(&t, DType::F64)?;
        assert_eq!(wide.dtype(), DType::F64);
        assert_eq!(wide.get_f64_data()?, vec![0.5, -1.25]);
        let narrow = cast_op(&wide, DType::F32)?;
        assert_eq!(narrow.get_f32_data()?, vec![0.5, -1.25]);
        Ok(())
    }

    #[test]
    fn test_cast_backward_returns_source_dtype() -> Result<(), FrameLossError> {
        let t = Tensor::new(vec![1.0, 2.0], vec![2])?;
        t.set_requires_grad(true);
        cast_op(&t, DType::F64)?.mul_scalar(3.0)?.sum(None, false)?.backward(None)?;
        let grad = t.grad().ok_or_else(|| FrameLossError::InternalError("no grad".to_string()))?;
        assert_eq!(grad.dtype(), DType::F32);
        assert_eq!(grad.get_f32_data()?, vec![3.0, 3.0]);
        Ok(())
    }

    #[test]
    fn test_cast_same_dtype_is_noop() -> Result<(), FrameLossError> {
        let t = Tensor::new(vec![1.0], vec![1])?;
        let same = cast_op(&t, DType::F32)?;
        assert_eq!(same.dtype(), DType::F32);
        assert_eq!(same.get_f32_data()?, vec![1.0]);
        Ok(())
    }
}
