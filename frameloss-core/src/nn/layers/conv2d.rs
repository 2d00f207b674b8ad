use crate::error::FrameLossError;
use crate::nn::module::Module;
use crate::nn::parameter::Parameter;
use crate::ops::conv::{conv2d_op, Conv2dParams};
use crate::tensor::{rand_uniform, Tensor};

/// 2-D convolution layer with square kernels.
///
/// Weight shape is `[out_channels, in_channels / groups, k, k]`, bias shape `[out_channels]`.
#[derive(Debug, Clone)]
pub struct Conv2d {
    weight: Parameter,
    bias: Option<Parameter>,
    params: Conv2dParams,
}

impl Conv2d {
    /// Creates a layer with Kaiming-uniform initialized weights
    /// (`U(-1/sqrt(fan_in), 1/sqrt(fan_in))`) and a bias.
    ///
    /// `seed` makes the initialization reproducible.
    pub fn new(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        params: Conv2dParams,
        seed: u64,
    ) -> Result<Self, FrameLossError> {
        if params.groups == 0 || in_channels % params.groups != 0 {
            return Err(FrameLossError::InvalidArgument {
                operation: "Conv2d::new".to_string(),
                message: format!("{} input channels cannot be split into {} groups", in_channels, params.groups),
            });
        }
        let fan_in = (in_channels / params.groups) * kernel_size * kernel_size;
        let bound = 1.0 / (fan_in.max(1) as f32).sqrt();
        let weight = rand_uniform(
            &[out_channels, in_channels / params.groups, kernel_size, kernel_size],
            -bound,
            bound,
            seed,
        )?;
        let bias = rand_uniform(&[out_channels], -bound, bound, seed.wrapping_add(1))?;
        Self::from_tensors(weight, Some(bias), params)
    }

    /// Builds the layer around existing (e.g. pretrained) tensors.
    pub fn from_tensors(weight: Tensor, bias: Option<Tensor>, params: Conv2dParams) -> Result<Self, FrameLossError> {
        let w_shape = weight.shape();
        if w_shape.len() != 4 {
            return Err(FrameLossError::DimensionMismatch {
                expected: 4,
                actual: w_shape.len(),
                operation: "Conv2d weight".to_string(),
            });
        }
        if let Some(b) = &bias {
            if b.shape() != [w_shape[0]] {
                return Err(FrameLossError::ShapeMismatch {
                    expected: vec![w_shape[0]],
                    actual: b.shape(),
                    operation: "Conv2d bias".to_string(),
                });
            }
        }
        Ok(Conv2d {
            weight: Parameter::new(weight, Some("weight".to_string())),
            bias: bias.map(|b| Parameter::new(b, Some("bias".to_string()))),
            params,
        })
    }

    pub fn weight(&self) -> &Parameter {
        &self.weight
    }

    pub fn bias(&self) -> Option<&Parameter> {
        self.bias.as_ref()
    }

    pub fn in_channels(&self) -> usize {
        self.weight.shape()[1] * self.params.groups
    }

    pub fn out_channels(&self) -> usize {
        self.weight.shape()[0]
    }
}

impl Module for Conv2d {
    fn forward(&self, input: &Tensor) -> Result<Tensor, FrameLossError> {
        conv2d_op(input, &self.weight, self.bias.as_ref().map(|b| b.tensor()), self.params)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        let mut params = vec![&self.weight];
        params.extend(self.bias.as_ref());
        params
    }

    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        self.parameters()
            .into_iter()
            .map(|p| (p.name().unwrap_or("param").to_string(), p))
            .collect()
    }
}
