use crate::error::FrameLossError;
use crate::nn::module::Module;
use crate::ops::conv::max_pool2d_op;
use crate::tensor::Tensor;

/// 2-D max pooling layer without padding.
#[derive(Debug, Clone)]
pub struct MaxPool2d {
    kernel_size: usize,
    stride: usize,
}

impl MaxPool2d {
    pub fn new(kernel_size: usize, stride: usize) -> Self {
        MaxPool2d { kernel_size, stride }
    }
}

impl Module for MaxPool2d {
    fn forward(&self, input: &Tensor) -> Result<Tensor, FrameLossError> {
        max_pool2d_op(input, self.kernel_size, self.stride)
    }
}
