use crate::error::FrameLossError;
use crate::nn::module::Module;
use crate::ops::activation::relu_op;
use crate::tensor::Tensor;

/// Layer that applies the Rectified Linear Unit (ReLU) activation function.
///
/// This layer does not have any learnable parameters.
#[derive(Debug, Default, Clone)]
pub struct ReLU {}

impl ReLU {
    pub fn new() -> Self {
        ReLU {}
    }
}

impl Module for ReLU {
    fn forward(&self, input: &Tensor) -> Result<Tensor, FrameLossError> {
        relu_op(input)
    }
}
