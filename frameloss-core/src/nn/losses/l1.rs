// src/nn/losses/l1.rs

use log::trace;

use crate::error::FrameLossError;
use crate::nn::losses::reduction::Reduction;
use crate::nn::losses::{check_same_shape, Loss};
use crate::ops::arithmetic::{abs_op, sub_op};
use crate::tensor::Tensor;

/// Mean absolute error between output and target.
///
/// With `Reduction::Mean` (the default) this is `mean(|output - target|)`.
#[derive(Debug, Clone, Default)]
pub struct L1Loss {
    reduction: Reduction,
}

impl L1Loss {
    pub fn new(reduction: Reduction) -> Self {
        L1Loss { reduction }
    }

    pub fn reduction(&self) -> Reduction {
        self.reduction
    }

    /// Computes the loss without needing a mutable handle.
    pub fn calculate(&self, input: &Tensor, target: &Tensor) -> Result<Tensor, FrameLossError> {
        check_same_shape(input, target, "L1Loss calculate")?;

        let abs_diff = abs_op(&sub_op(input, target)?)?;
        let loss = match self.reduction {
            Reduction::Mean => abs_diff.mean(None, false)?,
            Reduction::Sum => abs_diff.sum(None, false)?,
            Reduction::None => abs_diff,
        };
        trace!("L1Loss over {:?} -> {:?}", input.shape(), loss.shape());
        Ok(loss)
    }
}

impl Loss for L1Loss {
    fn evaluate(&mut self, output: &Tensor, target: &Tensor) -> Result<Tensor, FrameLossError> {
        self.calculate(output, target)
    }

    fn name(&self) -> &'static str {
        "l1"
    }
}

#[cfg(test)]
#[path = "l1_test.rs"]
mod tests;
