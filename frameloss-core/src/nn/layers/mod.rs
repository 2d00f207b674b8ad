pub mod conv2d;
pub mod max_pool2d;
pub mod relu;

pub use conv2d::Conv2d;
pub use max_pool2d::MaxPool2d;
pub use relu::ReLU;
