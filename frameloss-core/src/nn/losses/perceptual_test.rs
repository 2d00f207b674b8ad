use crate::error::FrameLossError;
use crate::nn::losses::perceptual::{FeatureExtractor, PerceptualLoss};
use crate::nn::losses::Loss;
use crate::nn::parameter::Parameter;
use crate::tensor::Tensor;
use approx::assert_relative_eq;

/// Scales its input by a single weight.
#[derive(Debug)]
struct ScaleExtractor {
    weight: Parameter,
}

impl ScaleExtractor {
    fn new(scale: f32) -> Self {
        ScaleExtractor {
            weight: Parameter::new_unnamed(Tensor::new(vec![scale], vec![1]).expect("weight")),
        }
    }
}

impl FeatureExtractor for ScaleExtractor {
    fn extract(&self, input: &Tensor) -> Result<Tensor, FrameLossError> {
        input.mul(&self.weight)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        vec![&self.weight]
    }
}

#[test]
fn test_perceptual_loss_freezes_extractor() {
    let extractor = ScaleExtractor::new(2.0);
    assert!(extractor.weight.requires_grad());
    let loss = PerceptualLoss::new(extractor, 1.0);
    assert!(loss.extractor().parameters().iter().all(|p| !p.requires_grad()));
}

#[test]
fn test_perceptual_loss_is_scaled_l2_of_feature_difference() -> Result<(), FrameLossError> {
    let mut loss = PerceptualLoss::new(ScaleExtractor::new(2.0), 0.5);
    let output = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![1, 1, 2, 2])?;
    let target = Tensor::new(vec![1.0, 1.0, 1.0, 1.0], vec![1, 1, 2, 2])?;
    // features differ by 2 * [0, 1, 2, 3] -> norm = 2 * sqrt(14)
    let value = loss.evaluate(&output, &target)?.item_f32()?;
    assert_relative_eq!(value, 0.5 * 2.0 * 14.0f32.sqrt(), epsilon = 1e-5);
    Ok(())
}

#[test]
fn test_perceptual_loss_zero_for_identical_inputs() -> Result<(), FrameLossError> {
    let mut loss = PerceptualLoss::new(Box::new(ScaleExtractor::new(3.0)) as Box<dyn FeatureExtractor>, 1.0);
    let x = Tensor::new(vec![0.25; 12], vec![1, 3, 2, 2])?;
    assert_eq!(loss.evaluate(&x, &x)?.item_f32()?, 0.0);
    assert_eq!(loss.name(), "perceptual");
    Ok(())
}

#[test]
fn test_perceptual_loss_shape_mismatch() -> Result<(), FrameLossError> {
    let mut loss = PerceptualLoss::new(ScaleExtractor::new(1.0), 1.0);
    let a = Tensor::new(vec![0.0; 4], vec![1, 1, 2, 2])?;
    let b = Tensor::new(vec![0.0; 6], vec![1, 1, 2, 3])?;
    assert!(matches!(loss.evaluate(&a, &b), Err(FrameLossError::ShapeMismatch { .. })));
    Ok(())
}

#[test]
fn test_backward_reaches_output_but_not_frozen_extractor() -> Result<(), FrameLossError> {
    let mut loss = PerceptualLoss::new(ScaleExtractor::new(2.0), 1.0);
    let output = Tensor::new(vec![3.0, 4.0], vec![1, 1, 1, 2])?;
    output.set_requires_grad(true);
    let target = Tensor::new(vec![0.0, 0.0], vec![1, 1, 1, 2])?;

    let value = loss.evaluate(&output, &target)?;
    assert_relative_eq!(value.item_f32()?, 10.0, epsilon = 1e-5);
    value.backward(None)?;

    // d||2(o - t)|| / do = 2 (o - t) / ||o - t||
    let grad = output.grad().expect("output batch should receive a gradient");
    let grad = grad.get_f32_data()?;
    assert_relative_eq!(grad[0], 1.2, epsilon = 1e-5);
    assert_relative_eq!(grad[1], 1.6, epsilon = 1e-5);
    assert!(loss.extractor().weight.grad().is_none());
    assert!(target.grad().is_none());
    Ok(())
}

#[test]
fn test_unfrozen_extractor_would_receive_a_gradient() -> Result<(), FrameLossError> {
    let extractor = ScaleExtractor::new(2.0);
    let output = Tensor::new(vec![3.0, 4.0], vec![1, 1, 1, 2])?;
    let target = Tensor::new(vec![0.0, 0.0], vec![1, 1, 1, 2])?;
    let value = extractor.extract(&output)?.sub(&extractor.extract(&target)?)?.norm()?;
    value.backward(None)?;
    // ||w (o - t)|| = 5 w
    let grad = extractor.weight.grad().expect("trainable weight should receive a gradient");
    assert_relative_eq!(grad.item_f32()?, 5.0, epsilon = 1e-5);
    Ok(())
}
