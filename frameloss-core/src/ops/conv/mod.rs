//! Spatial operations on `[N, C, H, W]` tensors.

mod conv2d;
mod pool;

pub use conv2d::{conv2d_op, Conv2dParams};
pub use pool::max_pool2d_op;

#[cfg(test)]
#[path = "conv_test.rs"]
mod tests;
