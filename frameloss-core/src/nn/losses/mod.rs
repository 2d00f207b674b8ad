//! Training losses for frame interpolation.
//!
//! Every loss implements [`Loss`]: `evaluate(output, target)` returns a
//! scalar tensor (or a `[N]` tensor for per-sample SSIM).

pub mod color;
pub mod combined;
pub mod factory;
pub mod l1;
pub mod perceptual;
pub mod reduction;
pub mod ssim;

pub use color::{hex_to_percent_rgb, hex_to_ratio_rgb, hex_to_rgb, ColorPaletteLoss, ColorScale, DEFAULT_PALETTE};
pub use combined::{L1ColorLoss, PerceptualL1Loss};
pub use factory::{build_loss, build_loss_from_global, build_loss_with_extractor};
pub use l1::L1Loss;
pub use perceptual::{FeatureExtractor, PerceptualLoss};
pub use reduction::Reduction;
pub use ssim::{create_window, gaussian, ssim, SsimLoss, WindowKey};

use crate::error::FrameLossError;
use crate::tensor::Tensor;

/// A loss function evaluated by the training loop on `(output, target)` batches.
///
/// `evaluate` takes `&mut self` because some losses memoize derived tensors
/// (the SSIM window) between calls.
pub trait Loss: std::fmt::Debug + Send {
    fn evaluate(&mut self, output: &Tensor, target: &Tensor) -> Result<Tensor, FrameLossError>;

    /// Short name used in log records.
    fn name(&self) -> &'static str;
}

impl<L: Loss + ?Sized> Loss for Box<L> {
    fn evaluate(&mut self, output: &Tensor, target: &Tensor) -> Result<Tensor, FrameLossError> {
        (**self).evaluate(output, target)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Fails with `ShapeMismatch` unless both tensors have the same shape.
pub(crate) fn check_same_shape(output: &Tensor, target: &Tensor, operation: &str) -> Result<(), FrameLossError> {
    let output_shape = output.shape();
    let target_shape = target.shape();
    if output_shape != target_shape {
        return Err(FrameLossError::ShapeMismatch {
            expected: target_shape,
            actual: output_shape,
            operation: operation.to_string(),
        });
    }
    Ok(())
}
