//! VGG19 `features` block truncated after `relu4_4`.

use std::path::Path;

use frameloss_core::model::sequential::Sequential;
use frameloss_core::nn::layers::{Conv2d, MaxPool2d, ReLU};
use frameloss_core::nn::losses::FeatureExtractor;
use frameloss_core::nn::{Module, Parameter};
use frameloss_core::ops::conv::Conv2dParams;
use frameloss_core::{FrameLossError, Tensor};
use log::{debug, info};

use crate::weights::{load_state_dict, StateDict};

/// Number of `features` layers kept: every layer up to and including `relu4_4`.
pub const VGG19_RELU4_4_LAYERS: usize = 27;

#[derive(Clone, Copy)]
enum Layer {
    Conv(usize),
    Pool,
}

/// Blocks 1 to 4 of VGG19; a pool closes each of the first three.
const VGG19_TRUNCATED: [Layer; 15] = [
    Layer::Conv(64),
    Layer::Conv(64),
    Layer::Pool,
    Layer::Conv(128),
    Layer::Conv(128),
    Layer::Pool,
    Layer::Conv(256),
    Layer::Conv(256),
    Layer::Conv(256),
    Layer::Conv(256),
    Layer::Pool,
    Layer::Conv(512),
    Layer::Conv(512),
    Layer::Conv(512),
    Layer::Conv(512),
];

/// Frozen VGG19 feature extractor.
///
/// Layer indices follow torchvision's `vgg19().features`, so a state dict
/// exported from it (`features.{i}.weight`, `features.{i}.bias`) loads as is.
/// Keys past `relu4_4` and the classifier are ignored.
#[derive(Debug)]
pub struct Vgg19Features {
    layers: Sequential,
}

impl Vgg19Features {
    /// Builds the backbone from pretrained tensors.
    ///
    /// # Errors
    /// `WeightLoading` if a convolution's weight or bias is missing or has the
    /// wrong shape.
    pub fn from_state_dict(state_dict: &StateDict) -> Result<Self, FrameLossError> {
        Self::build(|index, in_channels, out_channels| {
            let weight = lookup(state_dict, index, "weight", &[out_channels, in_channels, 3, 3])?;
            let bias = lookup(state_dict, index, "bias", &[out_channels])?;
            Conv2d::from_tensors(weight, Some(bias), Conv2dParams::default().with_padding(1))
        })
    }

    /// Loads the backbone from a state-dict file written by
    /// [`save_state_dict`](crate::weights::save_state_dict).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, FrameLossError> {
        let state_dict = load_state_dict(&path)?;
        let features = Self::from_state_dict(&state_dict)?;
        info!(
            "VGG19 features loaded from {} ({} parameter tensors, frozen)",
            path.as_ref().display(),
            Module::parameters(&features).len()
        );
        Ok(features)
    }

    /// Randomly initialized backbone. Only useful for tests and shape checks.
    pub fn random(seed: u64) -> Result<Self, FrameLossError> {
        Self::build(|index, in_channels, out_channels| {
            Conv2d::new(
                in_channels,
                out_channels,
                3,
                Conv2dParams::default().with_padding(1),
                seed.wrapping_add(2 * index as u64),
            )
        })
    }

    fn build<F>(mut conv: F) -> Result<Self, FrameLossError>
    where
        F: FnMut(usize, usize, usize) -> Result<Conv2d, FrameLossError>,
    {
        let mut layers = Sequential::new();
        let mut in_channels = 3;
        for layer in VGG19_TRUNCATED {
            match layer {
                Layer::Conv(out_channels) => {
                    layers.push(Box::new(conv(layers.len(), in_channels, out_channels)?));
                    layers.push(Box::new(ReLU::new()));
                    in_channels = out_channels;
                }
                Layer::Pool => layers.push(Box::new(MaxPool2d::new(2, 2))),
            }
        }
        debug_assert_eq!(layers.len(), VGG19_RELU4_4_LAYERS);

        let features = Vgg19Features { layers };
        features.freeze();
        Ok(features)
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Parameters under their torchvision names, ready for
    /// [`save_state_dict`](crate::weights::save_state_dict).
    pub fn state_dict(&self) -> StateDict {
        self.named_parameters()
            .into_iter()
            .map(|(name, param)| (name, param.tensor().clone()))
            .collect()
    }
}

fn lookup(state_dict: &StateDict, index: usize, kind: &str, shape: &[usize]) -> Result<Tensor, FrameLossError> {
    let key = format!("features.{}.{}", index, kind);
    let tensor = state_dict
        .get(&key)
        .ok_or_else(|| FrameLossError::WeightLoading(format!("missing tensor '{}'", key)))?;
    if tensor.shape() != shape {
        return Err(FrameLossError::WeightLoading(format!(
            "tensor '{}' has shape {:?}, expected {:?}",
            key,
            tensor.shape(),
            shape
        )));
    }
    debug!("{} {:?}", key, shape);
    Ok(tensor.clone())
}

impl Module for Vgg19Features {
    fn forward(&self, input: &Tensor) -> Result<Tensor, FrameLossError> {
        self.layers.forward(input)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        self.layers.parameters()
    }

    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        self.layers
            .named_parameters()
            .into_iter()
            .map(|(name, param)| (format!("features.{}", name), param))
            .collect()
    }

    fn children(&self) -> Vec<&dyn Module> {
        vec![&self.layers]
    }
}

impl FeatureExtractor for Vgg19Features {
    fn extract(&self, input: &Tensor) -> Result<Tensor, FrameLossError> {
        self.forward(input)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        Module::parameters(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frameloss_core::tensor::rand_uniform;

    #[test]
    fn test_layer_layout_matches_torchvision() -> Result<(), FrameLossError> {
        let vgg = Vgg19Features::random(0)?;
        assert_eq!(vgg.num_layers(), VGG19_RELU4_4_LAYERS);

        let names: Vec<String> = vgg.named_parameters().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names.len(), 2 * 12);
        assert_eq!(names[0], "features.0.weight");
        assert_eq!(names[1], "features.0.bias");
        assert_eq!(names[4], "features.5.weight");
        assert_eq!(names[22], "features.25.weight");
        Ok(())
    }

    #[test]
    fn test_parameters_are_frozen() -> Result<(), FrameLossError> {
        let vgg = Vgg19Features::random(1)?;
        assert!(vgg.is_frozen());
        assert!(FeatureExtractor::parameters(&vgg).iter().all(|p| !p.requires_grad()));
        Ok(())
    }

    #[test]
    fn test_feature_shape() -> Result<(), FrameLossError> {
        let vgg = Vgg19Features::random(2)?;
        let input = rand_uniform(&[1, 3, 16, 16], 0.0, 1.0, 3)?;
        let features = vgg.extract(&input)?;
        assert_eq!(features.shape(), vec![1, 512, 2, 2]);
        assert!(features.get_f32_data()?.iter().all(|&v| v >= 0.0));
        Ok(())
    }

    #[test]
    fn test_rejects_grayscale_input() -> Result<(), FrameLossError> {
        let vgg = Vgg19Features::random(4)?;
        let input = rand_uniform(&[1, 1, 8, 8], 0.0, 1.0, 5)?;
        assert!(matches!(vgg.extract(&input), Err(FrameLossError::ShapeMismatch { .. })));
        Ok(())
    }

    #[test]
    fn test_state_dict_round_trip() -> Result<(), FrameLossError> {
        let source = Vgg19Features::random(6)?;
        let dict = source.state_dict();
        assert_eq!(dict.len(), 24);

        let reloaded = Vgg19Features::from_state_dict(&dict)?;
        assert!(reloaded.is_frozen());
        let input = rand_uniform(&[1, 3, 8, 8], 0.0, 1.0, 7)?;
        assert_eq!(
            source.extract(&input)?.get_f32_data()?,
            reloaded.extract(&input)?.get_f32_data()?
        );
        Ok(())
    }

    #[test]
    fn test_missing_and_misshapen_tensors() -> Result<(), FrameLossError> {
        let mut dict = Vgg19Features::random(8)?.state_dict();
        dict.remove("features.10.bias");
        assert!(matches!(
            Vgg19Features::from_state_dict(&dict),
            Err(FrameLossError::WeightLoading(msg)) if msg.contains("features.10.bias")
        ));

        let mut dict = Vgg19Features::random(9)?.state_dict();
        dict.insert("features.0.weight".to_string(), Tensor::new(vec![0.0; 27], vec![1, 3, 3, 3])?);
        assert!(matches!(
            Vgg19Features::from_state_dict(&dict),
            Err(FrameLossError::WeightLoading(_))
        ));
        Ok(())
    }
}
