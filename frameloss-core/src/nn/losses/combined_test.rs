use crate::error::FrameLossError;
use crate::nn::losses::color::ColorPaletteLoss;
use crate::nn::losses::combined::{L1ColorLoss, PerceptualL1Loss};
use crate::nn::losses::l1::L1Loss;
use crate::nn::losses::perceptual::{FeatureExtractor, PerceptualLoss};
use crate::nn::losses::Loss;
use crate::tensor::{rand_uniform, Tensor};

/// Spatial mean per channel.
#[derive(Debug)]
struct ChannelMean;

impl FeatureExtractor for ChannelMean {
    fn extract(&self, input: &Tensor) -> Result<Tensor, FrameLossError> {
        input.mean(Some(&[2, 3]), false)
    }
}

#[test]
fn test_perceptual_l1_is_exact_sum() -> Result<(), FrameLossError> {
    let output = rand_uniform(&[2, 3, 4, 4], 0.0, 1.0, 21)?;
    let target = rand_uniform(&[2, 3, 4, 4], 0.0, 1.0, 22)?;

    let mut combined = PerceptualL1Loss::new(ChannelMean, 0.7);
    let total = combined.evaluate(&output, &target)?.item_f32()?;

    let mut perceptual = PerceptualLoss::new(ChannelMean, 0.7);
    let mut l1 = L1Loss::default();
    let expected = perceptual.evaluate(&output, &target)?.item_f32()? + l1.evaluate(&output, &target)?.item_f32()?;
    assert_eq!(total, expected);

    let (p, a) = combined.terms(&output, &target)?;
    assert_eq!(total, p.item_f32()? + a.item_f32()?);
    Ok(())
}

#[test]
fn test_l1_color_is_exact_sum() -> Result<(), FrameLossError> {
    let output = rand_uniform(&[1, 3, 3, 3], 0.0, 1.0, 23)?;
    let target = rand_uniform(&[1, 3, 3, 3], 0.0, 1.0, 24)?;

    let mut combined = L1ColorLoss::new(ColorPaletteLoss::new(0.1)?);
    let total = combined.evaluate(&output, &target)?.item_f32()?;

    let mut color = ColorPaletteLoss::new(0.1)?;
    let mut l1 = L1Loss::default();
    let expected = l1.evaluate(&output, &target)?.item_f32()? + color.evaluate(&output, &target)?.item_f32()?;
    assert_eq!(total, expected);
    assert_eq!(combined.name(), "l1_color");
    Ok(())
}

#[test]
fn test_combined_losses_propagate_shape_errors() -> Result<(), FrameLossError> {
    let a = rand_uniform(&[1, 3, 2, 2], 0.0, 1.0, 25)?;
    let b = rand_uniform(&[1, 3, 2, 3], 0.0, 1.0, 26)?;
    let mut combined = L1ColorLoss::new(ColorPaletteLoss::new(1.0)?);
    assert!(matches!(combined.evaluate(&a, &b), Err(FrameLossError::ShapeMismatch { .. })));

    let mut perceptual = PerceptualL1Loss::new(ChannelMean, 1.0);
    assert!(matches!(perceptual.evaluate(&a, &b), Err(FrameLossError::ShapeMismatch { .. })));
    Ok(())
}
