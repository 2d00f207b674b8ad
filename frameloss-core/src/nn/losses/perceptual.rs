use log::{debug, trace};

use crate::error::FrameLossError;
use crate::nn::losses::{check_same_shape, Loss};
use crate::nn::parameter::Parameter;
use crate::tensor::Tensor;

/// Maps an image batch to a feature map, e.g. the leading layers of a
/// pretrained classifier.
pub trait FeatureExtractor: std::fmt::Debug + Send + Sync {
    fn extract(&self, input: &Tensor) -> Result<Tensor, FrameLossError>;

    /// Weights of the extractor. They are frozen when handed to a [`PerceptualLoss`].
    fn parameters(&self) -> Vec<&Parameter> {
        Vec::new()
    }
}

impl<E: FeatureExtractor + ?Sized> FeatureExtractor for Box<E> {
    fn extract(&self, input: &Tensor) -> Result<Tensor, FrameLossError> {
        (**self).extract(input)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        (**self).parameters()
    }
}

/// `factor * ||F(output) - F(target)||_2` over a frozen feature extractor `F`.
#[derive(Debug)]
pub struct PerceptualLoss<E: FeatureExtractor> {
    extractor: E,
    factor: f64,
}

impl<E: FeatureExtractor> PerceptualLoss<E> {
    /// Takes ownership of `extractor` and freezes its parameters, so
    /// `backward()` from this loss only reaches the image batches.
    pub fn new(extractor: E, factor: f64) -> Self {
        let params = extractor.parameters();
        for param in &params {
            param.set_requires_grad(false);
        }
        debug!("PerceptualLoss: froze {} extractor parameter(s)", params.len());
        PerceptualLoss { extractor, factor }
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn calculate(&self, output: &Tensor, target: &Tensor) -> Result<Tensor, FrameLossError> {
        check_same_shape(output, target, "PerceptualLoss calculate")?;
        let output_features = self.extractor.extract(output)?;
        let target_features = self.extractor.extract(target)?;
        trace!("PerceptualLoss features {:?}", output_features.shape());
        output_features
            .sub(&target_features)?
            .norm()?
            .mul_scalar(self.factor)
    }
}

impl<E: FeatureExtractor> Loss for PerceptualLoss<E> {
    fn evaluate(&mut self, output: &Tensor, target: &Tensor) -> Result<Tensor, FrameLossError> {
        self.calculate(output, target)
    }

    fn name(&self) -> &'static str {
        "perceptual"
    }
}

#[cfg(test)]
#[path = "perceptual_test.rs"]
mod tests;
