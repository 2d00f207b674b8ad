//! Structural similarity (SSIM) over Gaussian-weighted local windows.
//!
//! Local statistics come from depthwise convolutions with a normalized 2-D
//! Gaussian window:
//!
//! ```text
//! SSIM = ((2 mu1 mu2 + C1)(2 sigma12 + C2)) / ((mu1^2 + mu2^2 + C1)(sigma1^2 + sigma2^2 + C2))
//! ```
//!
//! with `C1 = 0.01^2` and `C2 = 0.03^2` (dynamic range 1.0).

use log::debug;

use crate::device::StorageDevice;
use crate::error::FrameLossError;
use crate::nn::losses::{check_same_shape, Loss};
use crate::ops::conv::Conv2dParams;
use crate::tensor::Tensor;
use crate::types::DType;

pub const DEFAULT_WINDOW_SIZE: usize = 11;
pub const DEFAULT_SIGMA: f64 = 1.5;
pub const C1: f64 = 0.01 * 0.01;
pub const C2: f64 = 0.03 * 0.03;

/// Normalized 1-D Gaussian of length `window_size` centred on `window_size / 2`.
///
/// Samples are evaluated in `f64`, stored as `f32` and normalized in `f32`,
/// so the result is an F32 tensor of shape `[window_size]`.
pub fn gaussian(window_size: usize, sigma: f64) -> Result<Tensor, FrameLossError> {
    if window_size == 0 || !(sigma > 0.0) {
        return Err(FrameLossError::InvalidArgument {
            operation: "gaussian".to_string(),
            message: format!("window_size {} and sigma {} must be positive", window_size, sigma),
        });
    }
    let center = (window_size / 2) as f64;
    let gauss: Vec<f32> = (0..window_size)
        .map(|x| (-(x as f64 - center).powi(2) / (2.0 * sigma * sigma)).exp() as f32)
        .collect();
    let total: f32 = gauss.iter().sum();
    Tensor::new(gauss.into_iter().map(|g| g / total).collect(), vec![window_size])
}

/// Depthwise SSIM window: the outer product of [`gaussian`] with itself,
/// replicated to `[channel, 1, window_size, window_size]`.
///
/// The window is always computed in `f32` and only then cast to `dtype`, so
/// F64 inputs see the widened F32 window.
pub fn create_window(window_size: usize, channel: usize, dtype: DType) -> Result<Tensor, FrameLossError> {
    if window_size % 2 == 0 {
        return Err(FrameLossError::InvalidArgument {
            operation: "create_window".to_string(),
            message: format!("window size must be odd, got {}", window_size),
        });
    }
    if channel == 0 {
        return Err(FrameLossError::InvalidArgument {
            operation: "create_window".to_string(),
            message: "channel count must be positive".to_string(),
        });
    }
    let window_1d = gaussian(window_size, DEFAULT_SIGMA)?;
    let column = window_1d.unsqueeze(1)?;
    let row = window_1d.unsqueeze(0)?;
    let window_2d = column.matmul(&row)?.reshape(vec![1, 1, window_size, window_size])?;
    window_2d
        .expand(&[channel, 1, window_size, window_size])?
        .to_dtype(dtype)
}

/// Promotes a single `[C, H, W]` image to a batch of one; passes 4-D tensors through.
fn promote_to_batch(img: &Tensor) -> Result<Tensor, FrameLossError> {
    match img.rank() {
        3 => img.unsqueeze(0),
        4 => Ok(img.clone()),
        other => Err(FrameLossError::DimensionMismatch {
            expected: 4,
            actual: other,
            operation: "ssim".to_string(),
        }),
    }
}

/// SSIM between two batches (or two single `[C, H, W]` images).
///
/// Builds a fresh window on every call; use [`SsimLoss`] to keep it cached.
/// Returns a scalar when `size_average`, otherwise one value per batch element.
pub fn ssim(img1: &Tensor, img2: &Tensor, window_size: usize, size_average: bool) -> Result<Tensor, FrameLossError> {
    let img1 = promote_to_batch(img1)?;
    let img2 = promote_to_batch(img2)?;
    check_same_shape(&img1, &img2, "ssim")?;
    let channel = img1.shape()[1];
    let window = create_window(window_size, channel, img1.dtype())?;
    ssim_with_window(&img1, &img2, &window, window_size, channel, size_average)
}

fn ssim_with_window(
    img1: &Tensor,
    img2: &Tensor,
    window: &Tensor,
    window_size: usize,
    channel: usize,
    size_average: bool,
) -> Result<Tensor, FrameLossError> {
    let params = Conv2dParams::default()
        .with_padding(window_size / 2)
        .with_groups(channel);
    let local = |t: &Tensor| t.conv2d(window, None, params);

    let mu1 = local(img1)?;
    let mu2 = local(img2)?;

    let mu1_sq = mu1.square()?;
    let mu2_sq = mu2.square()?;
    let mu1_mu2 = mu1.mul(&mu2)?;

    let sigma1_sq = local(&img1.square()?)?.sub(&mu1_sq)?;
    let sigma2_sq = local(&img2.square()?)?.sub(&mu2_sq)?;
    let sigma12 = local(&img1.mul(img2)?)?.sub(&mu1_mu2)?;

    let numerator = mu1_mu2
        .mul_scalar(2.0)?
        .add_scalar(C1)?
        .mul(&sigma12.mul_scalar(2.0)?.add_scalar(C2)?)?;
    let denominator = mu1_sq
        .add(&mu2_sq)?
        .add_scalar(C1)?
        .mul(&sigma1_sq.add(&sigma2_sq)?.add_scalar(C2)?)?;
    let ssim_map = numerator.div(&denominator)?;

    if size_average {
        ssim_map.mean(None, false)
    } else {
        ssim_map.mean(Some(&[1, 2, 3]), false)
    }
}

/// What a cached SSIM window was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowKey {
    pub channels: usize,
    pub dtype: DType,
    pub device: StorageDevice,
}

#[derive(Debug)]
struct WindowCache {
    key: WindowKey,
    window: Tensor,
}

/// Negated SSIM, suitable for minimization.
///
/// The Gaussian window is memoized and rebuilt only when the channel count,
/// dtype or device of the input differs from the cached one.
#[derive(Debug)]
pub struct SsimLoss {
    window_size: usize,
    size_average: bool,
    cache: Option<WindowCache>,
}

impl Default for SsimLoss {
    fn default() -> Self {
        SsimLoss {
            window_size: DEFAULT_WINDOW_SIZE,
            size_average: true,
            cache: None,
        }
    }
}

impl SsimLoss {
    /// # Errors
    /// `InvalidArgument` for an even or zero `window_size`.
    pub fn new(window_size: usize, size_average: bool) -> Result<Self, FrameLossError> {
        if window_size == 0 || window_size % 2 == 0 {
            return Err(FrameLossError::InvalidArgument {
                operation: "SsimLoss::new".to_string(),
                message: format!("window size must be positive and odd, got {}", window_size),
            });
        }
        Ok(SsimLoss {
            window_size,
            size_average,
            cache: None,
        })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn size_average(&self) -> bool {
        self.size_average
    }

    /// Key of the window currently cached, if any.
    pub fn cached_window_key(&self) -> Option<WindowKey> {
        self.cache.as_ref().map(|c| c.key)
    }

    fn window_for(&mut self, key: WindowKey) -> Result<Tensor, FrameLossError> {
        if let Some(cache) = &self.cache {
            if cache.key == key {
                return Ok(cache.window.clone());
            }
        }
        debug!(
            "Building SSIM window: size {}, {} channel(s), {:?} on {:?}",
            self.window_size, key.channels, key.dtype, key.device
        );
        let window = create_window(self.window_size, key.channels, key.dtype)?.to_device(key.device)?;
        self.cache = Some(WindowCache {
            key,
            window: window.clone(),
        });
        Ok(window)
    }
}

impl Loss for SsimLoss {
    fn evaluate(&mut self, output: &Tensor, target: &Tensor) -> Result<Tensor, FrameLossError> {
        let img1 = promote_to_batch(output)?;
        let img2 = promote_to_batch(target)?;
        check_same_shape(&img1, &img2, "SsimLoss evaluate")?;

        let channels = img1.shape()[1];
        let window = self.window_for(WindowKey {
            channels,
            dtype: img1.dtype(),
            device: img1.device(),
        })?;
        ssim_with_window(&img1, &img2, &window, self.window_size, channels, self.size_average)?.neg()
    }

    fn name(&self) -> &'static str {
        "ssim"
    }
}

#[cfg(test)]
#[path = "ssim_test.rs"]
mod tests;
