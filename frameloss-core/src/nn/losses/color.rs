//! Distance of generated pixels to a fixed 16-color palette.

use log::{debug, log_enabled, Level};
use serde::{Deserialize, Serialize};

use crate::error::FrameLossError;
use crate::nn::losses::Loss;
use crate::tensor::Tensor;

/// Reference palette, in the order the loss stores it.
pub const DEFAULT_PALETTE: [&str; 16] = [
    "#FFFFFF", "#E4E4E4", "#888888", "#222222", "#FFA7D1", "#E50000", "#E59500", "#A06A42",
    "#E5D900", "#94E044", "#02BE01", "#00E5F0", "#0083C7", "#0000EA", "#E04AFF", "#820080",
];

/// How 8-bit channel values are mapped to ratios.
///
/// `Legacy256` divides by 256, so `#FFFFFF` becomes `255/256` per channel.
/// Stored baselines were produced with it, hence the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScale {
    #[default]
    Legacy256,
    Standard255,
}

impl ColorScale {
    pub fn divisor(&self) -> f64 {
        match self {
            ColorScale::Legacy256 => 256.0,
            ColorScale::Standard255 => 255.0,
        }
    }
}

/// Parses `#RRGGBB` (the `#` is optional, surrounding whitespace ignored).
pub fn hex_to_rgb(cs: &str) -> Result<(u8, u8, u8), FrameLossError> {
    let trimmed = cs.trim();
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(FrameLossError::InvalidColor {
            input: hex.to_string(),
        });
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| FrameLossError::InvalidColor {
            input: hex.to_string(),
        })
    };
    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// `#RRGGBB` to ratios using `scale`.
pub fn hex_to_ratio_rgb(cs: &str, scale: ColorScale) -> Result<[f64; 3], FrameLossError> {
    let (r, g, b) = hex_to_rgb(cs)?;
    let d = scale.divisor();
    Ok([r as f64 / d, g as f64 / d, b as f64 / d])
}

/// `#RRGGBB` to ratios with the legacy divisor of 256.
pub fn hex_to_percent_rgb(cs: &str) -> Result<[f64; 3], FrameLossError> {
    hex_to_ratio_rgb(cs, ColorScale::Legacy256)
}

/// Sum over all pixels of the Euclidean RGB distance to the nearest palette
/// color, times `factor`. The target batch is not used.
#[derive(Debug, Clone)]
pub struct ColorPaletteLoss {
    /// `[3, colors]`, F64.
    palette: Tensor,
    factor: f64,
}

impl ColorPaletteLoss {
    /// Loss over [`DEFAULT_PALETTE`] with the legacy 256 divisor.
    pub fn new(factor: f64) -> Result<Self, FrameLossError> {
        Self::with_palette(&DEFAULT_PALETTE, ColorScale::Legacy256, factor)
    }

    pub fn with_palette(colors: &[&str], scale: ColorScale, factor: f64) -> Result<Self, FrameLossError> {
        if colors.is_empty() {
            return Err(FrameLossError::InvalidArgument {
                operation: "ColorPaletteLoss".to_string(),
                message: "palette must contain at least one color".to_string(),
            });
        }
        let ratios = colors
            .iter()
            .map(|cs| hex_to_ratio_rgb(cs, scale))
            .collect::<Result<Vec<_>, _>>()?;
        // Channel-major so that the palette views as [1, 3, 1, colors].
        let mut data = Vec::with_capacity(3 * ratios.len());
        for channel in 0..3 {
            data.extend(ratios.iter().map(|rgb| rgb[channel]));
        }
        let palette = Tensor::new_f64(data, vec![3, ratios.len()])?;
        debug!("Color palette loaded: {:?}", palette.shape());
        Ok(ColorPaletteLoss { palette, factor })
    }

    /// The palette as a `[3, colors]` F64 tensor.
    pub fn palette(&self) -> &Tensor {
        &self.palette
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn calculate(&self, output: &Tensor) -> Result<Tensor, FrameLossError> {
        let shape = output.shape();
        if shape.len() != 4 {
            return Err(FrameLossError::DimensionMismatch {
                expected: 4,
                actual: shape.len(),
                operation: "ColorPaletteLoss".to_string(),
            });
        }
        if shape[1] != 3 {
            return Err(FrameLossError::ShapeMismatch {
                expected: vec![shape[0], 3, shape[2], shape[3]],
                actual: shape,
                operation: "ColorPaletteLoss (RGB channels)".to_string(),
            });
        }
        if log_enabled!(Level::Debug) {
            if let Ok(max) = output.max_all().and_then(|m| m.item()) {
                debug!("ColorPaletteLoss output {:?}, max {}", shape, max);
            }
        }

        let colors = self.palette.shape()[1];
        let palette = self
            .palette
            .to_dtype(output.dtype())?
            .reshape(vec![1, 3, 1, colors])?;
        let pixels = output.reshape(vec![shape[0], 3, shape[2] * shape[3], 1])?;

        let dist = pixels.sub(&palette)?;
        let norm_dist = dist.norm_dim(1, false)?;
        let min_dist = norm_dist.min_dim(2, false)?;
        debug!(
            "dist {:?}, norm_dist {:?}, min_dist {:?}",
            dist.shape(),
            norm_dist.shape(),
            min_dist.shape()
        );
        min_dist.sum(None, false)?.mul_scalar(self.factor)
    }
}

impl Loss for ColorPaletteLoss {
    fn evaluate(&mut self, output: &Tensor, _target: &Tensor) -> Result<Tensor, FrameLossError> {
        self.calculate(output)
    }

    fn name(&self) -> &'static str {
        "color"
    }
}

#[cfg(test)]
#[path = "color_test.rs"]
mod tests;
