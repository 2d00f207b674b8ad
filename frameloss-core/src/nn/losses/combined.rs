//! Unweighted sums of two losses.

use log::debug;

use crate::error::FrameLossError;
use crate::nn::losses::color::ColorPaletteLoss;
use crate::nn::losses::l1::L1Loss;
use crate::nn::losses::perceptual::{FeatureExtractor, PerceptualLoss};
use crate::nn::losses::Loss;
use crate::tensor::Tensor;

/// Perceptual loss plus mean absolute error.
#[derive(Debug)]
pub struct PerceptualL1Loss<E: FeatureExtractor> {
    perceptual: PerceptualLoss<E>,
    l1: L1Loss,
}

impl<E: FeatureExtractor> PerceptualL1Loss<E> {
    pub fn new(extractor: E, perceptual_factor: f64) -> Self {
        PerceptualL1Loss {
            perceptual: PerceptualLoss::new(extractor, perceptual_factor),
            l1: L1Loss::default(),
        }
    }

    /// The two terms, `(perceptual, l1)`, before summation.
    pub fn terms(&self, output: &Tensor, target: &Tensor) -> Result<(Tensor, Tensor), FrameLossError> {
        Ok((
            self.perceptual.calculate(output, target)?,
            self.l1.calculate(output, target)?,
        ))
    }
}

impl<E: FeatureExtractor> Loss for PerceptualL1Loss<E> {
    fn evaluate(&mut self, output: &Tensor, target: &Tensor) -> Result<Tensor, FrameLossError> {
        let (perceptual, l1) = self.terms(output, target)?;
        perceptual.add(&l1)
    }

    fn name(&self) -> &'static str {
        "perceptual_l1"
    }
}

/// Mean absolute error plus the color-palette loss.
#[derive(Debug)]
pub struct L1ColorLoss {
    l1: L1Loss,
    color: ColorPaletteLoss,
}

impl L1ColorLoss {
    pub fn new(color: ColorPaletteLoss) -> Self {
        L1ColorLoss {
            l1: L1Loss::default(),
            color,
        }
    }

    /// The two terms, `(l1, color)`, before summation.
    pub fn terms(&self, output: &Tensor, target: &Tensor) -> Result<(Tensor, Tensor), FrameLossError> {
        let l1 = self.l1.calculate(output, target)?;
        let color = self.color.calculate(output)?;
        Ok((l1, color))
    }
}

impl Loss for L1ColorLoss {
    fn evaluate(&mut self, output: &Tensor, target: &Tensor) -> Result<Tensor, FrameLossError> {
        let (l1, color) = self.terms(output, target)?;
        debug!("l1: {:?} color: {:?}", l1.item().ok(), color.item().ok());
        l1.add(&color)
    }

    fn name(&self) -> &'static str {
        "l1_color"
    }
}

#[cfg(test)]
#[path = "combined_test.rs"]
mod tests;
