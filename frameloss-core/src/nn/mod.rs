// src/nn/mod.rs
// Network building blocks (layers, parameters) and the training losses.

pub mod layers;
pub mod losses;
pub mod module;
pub mod parameter;

pub use layers::{Conv2d, MaxPool2d, ReLU};
pub use losses::{
    ColorPaletteLoss, FeatureExtractor, L1ColorLoss, L1Loss, Loss, PerceptualL1Loss, PerceptualLoss, Reduction,
    SsimLoss,
};
pub use module::Module;
pub use parameter::Parameter;
