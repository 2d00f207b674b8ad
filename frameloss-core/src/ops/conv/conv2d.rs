use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::FrameLossError;
use crate::ops::traits::TensorElement;
use crate::tensor::Tensor;
use crate::types::DType;

/// Stride, zero-padding and channel grouping of a 2-D convolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conv2dParams {
    pub stride: (usize, usize),
    pub padding: (usize, usize),
    /// `groups == in_channels` gives a depthwise convolution.
    pub groups: usize,
}

impl Default for Conv2dParams {
    fn default() -> Self {
        Conv2dParams {
            stride: (1, 1),
            padding: (0, 0),
            groups: 1,
        }
    }
}

impl Conv2dParams {
    pub fn with_padding(mut self, padding: usize) -> Self {
        self.padding = (padding, padding);
        self
    }

    pub fn with_groups(mut self, groups: usize) -> Self {
        self.groups = groups;
        self
    }

    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = (stride, stride);
        self
    }
}

struct ConvGeometry {
    batch: usize,
    in_channels: usize,
    in_h: usize,
    in_w: usize,
    out_channels: usize,
    kernel_h: usize,
    kernel_w: usize,
    out_h: usize,
    out_w: usize,
}

/// 2-D cross-correlation of `input` `[N, C_in, H, W]` with `weight`
/// `[C_out, C_in / groups, kH, kW]`, plus an optional `bias` `[C_out]`.
///
/// Output spatial size is `(H + 2 * pad - kH) / stride + 1` per axis.
pub fn conv2d_op(
    input: &Tensor,
    weight: &Tensor,
    bias: Option<&Tensor>,
    params: Conv2dParams,
) -> Result<Tensor, FrameLossError> {
    let geometry = check_conv_shapes(input, weight, bias, &params)?;
    let output = match input.dtype() {
        DType::F32 => conv2d_typed::<f32>(input, weight, bias, &params, &geometry)?,
        DType::F64 => conv2d_typed::<f64>(input, weight, bias, &params, &geometry)?,
    };

    let needs = ConvGrads {
        input: input.requires_grad(),
        weight: weight.requires_grad(),
        bias: bias.map_or(false, |b| b.requires_grad()),
    };
    if needs.input || needs.weight || needs.bias {
        output.set_grad_fn(Arc::new(Conv2dBackward {
            input: input.clone(),
            weight: weight.clone(),
            bias: bias.cloned(),
            params,
            needs,
        }));
    }
    Ok(output)
}

/// Which operands of a convolution want a gradient.
#[derive(Debug, Clone, Copy)]
struct ConvGrads {
    input: bool,
    weight: bool,
    bias: bool,
}

#[derive(Debug)]
struct Conv2dBackward {
    input: Tensor,
    weight: Tensor,
    bias: Option<Tensor>,
    params: Conv2dParams,
    needs: ConvGrads,
}

impl BackwardOp for Conv2dBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, FrameLossError> {
        let input = self.input.detach();
        let weight = self.weight.detach();
        let geometry = check_conv_shapes(&input, &weight, self.bias.as_ref(), &self.params)?;
        match input.dtype() {
            DType::F32 => conv2d_backward_typed::<f32>(&input, &weight, grad_output, &self.params, &geometry, self.needs),
            DType::F64 => conv2d_backward_typed::<f64>(&input, &weight, grad_output, &self.params, &geometry, self.needs),
        }
    }

    fn inputs(&self) -> Vec<Tensor> {
        let mut inputs = Vec::with_capacity(3);
        if self.needs.input {
            inputs.push(self.input.clone());
        }
        if self.needs.weight {
            inputs.push(self.weight.clone());
        }
        if let (true, Some(bias)) = (self.needs.bias, &self.bias) {
            inputs.push(bias.clone());
        }
        inputs
    }
}

fn check_conv_shapes(
    input: &Tensor,
    weight: &Tensor,
    bias: Option<&Tensor>,
    params: &Conv2dParams,
) -> Result<ConvGeometry, FrameLossError> {
    let in_shape = input.shape();
    let w_shape = weight.shape();
    for shape in [&in_shape, &w_shape] {
        if shape.len() != 4 {
            return Err(FrameLossError::DimensionMismatch {
                expected: 4,
                actual: shape.len(),
                operation: "conv2d".to_string(),
            });
        }
    }
    for other in std::iter::once(weight).chain(bias) {
        if other.dtype() != input.dtype() {
            return Err(FrameLossError::DataTypeMismatch {
                expected: input.dtype(),
                actual: other.dtype(),
                operation: "conv2d".to_string(),
            });
        }
    }
    let invalid = |message: String| FrameLossError::InvalidArgument {
        operation: "conv2d".to_string(),
        message,
    };
    if params.groups == 0 || params.stride.0 == 0 || params.stride.1 == 0 {
        return Err(invalid("groups and strides must be positive".to_string()));
    }

    let (batch, in_channels, in_h, in_w) = (in_shape[0], in_shape[1], in_shape[2], in_shape[3]);
    let (out_channels, w_in, kernel_h, kernel_w) = (w_shape[0], w_shape[1], w_shape[2], w_shape[3]);

    if in_channels % params.groups != 0 || out_channels % params.groups != 0 {
        return Err(invalid(format!(
            "{} input and {} output channels are not divisible by {} groups",
            in_channels, out_channels, params.groups
        )));
    }
    if w_in != in_channels / params.groups {
        return Err(FrameLossError::ShapeMismatch {
            expected: vec![out_channels, in_channels / params.groups, kernel_h, kernel_w],
            actual: w_shape,
            operation: "conv2d (weight)".to_string(),
        });
    }
    if let Some(b) = bias {
        if b.shape() != [out_channels] {
            return Err(FrameLossError::ShapeMismatch {
                expected: vec![out_channels],
                actual: b.shape(),
                operation: "conv2d (bias)".to_string(),
            });
        }
    }

    let padded_h = in_h + 2 * params.padding.0;
    let padded_w = in_w + 2 * params.padding.1;
    if kernel_h > padded_h || kernel_w > padded_w {
        return Err(invalid(format!(
            "kernel {}x{} is larger than the padded input {}x{}",
            kernel_h, kernel_w, padded_h, padded_w
        )));
    }

    Ok(ConvGeometry {
        batch,
        in_channels,
        in_h,
        in_w,
        out_channels,
        kernel_h,
        kernel_w,
        out_h: (padded_h - kernel_h) / params.stride.0 + 1,
        out_w: (padded_w - kernel_w) / params.stride.1 + 1,
    })
}

fn conv2d_typed<T: TensorElement>(
    input: &Tensor,
    weight: &Tensor,
    bias: Option<&Tensor>,
    params: &Conv2dParams,
    g: &ConvGeometry,
) -> Result<Tensor, FrameLossError> {
    let x = input.cpu_data::<T>("conv2d")?;
    let w = weight.cpu_data::<T>("conv2d")?;
    let b = bias.map(|t| t.cpu_data::<T>("conv2d")).transpose()?;

    let in_per_group = g.in_channels / params.groups;
    let out_per_group = g.out_channels / params.groups;
    let (pad_h, pad_w) = (params.padding.0 as isize, params.padding.1 as isize);
    let mut out = Vec::with_capacity(g.batch * g.out_channels * g.out_h * g.out_w);

    for n in 0..g.batch {
        for oc in 0..g.out_channels {
            let group = oc / out_per_group;
            let base = b.as_ref().map_or(T::zero(), |b| b[oc]);
            for oh in 0..g.out_h {
                for ow in 0..g.out_w {
                    let mut acc = base;
                    for icg in 0..in_per_group {
                        let ic = group * in_per_group + icg;
                        let x_plane = (n * g.in_channels + ic) * g.in_h * g.in_w;
                        let w_plane = (oc * in_per_group + icg) * g.kernel_h * g.kernel_w;
                        for kh in 0..g.kernel_h {
                            let ih = (oh * params.stride.0) as isize + kh as isize - pad_h;
                            if ih < 0 || ih >= g.in_h as isize {
                                continue;
                            }
                            let x_row = x_plane + ih as usize * g.in_w;
                            let w_row = w_plane + kh * g.kernel_w;
                            for kw in 0..g.kernel_w {
                                let iw = (ow * params.stride.1) as isize + kw as isize - pad_w;
                                if iw < 0 || iw >= g.in_w as isize {
                                    continue;
                                }
                                acc = acc + x[x_row + iw as usize] * w[w_row + kw];
                            }
                        }
                    }
                    out.push(acc);
                }
            }
        }
    }

    Tensor::from_vec(out, vec![g.batch, g.out_channels, g.out_h, g.out_w])
}

/// Gradients of the convolution for the operands flagged in `needs`, in
/// `(input, weight, bias)` order.
fn conv2d_backward_typed<T: TensorElement>(
    input: &Tensor,
    weight: &Tensor,
    grad_output: &Tensor,
    params: &Conv2dParams,
    g: &ConvGeometry,
    needs: ConvGrads,
) -> Result<Vec<Tensor>, FrameLossError> {
    let x = input.cpu_data::<T>("conv2d_backward")?;
    let w = weight.cpu_data::<T>("conv2d_backward")?;
    let go = grad_output.cpu_data::<T>("conv2d_backward")?;

    let in_per_group = g.in_channels / params.groups;
    let out_per_group = g.out_channels / params.groups;
    let (pad_h, pad_w) = (params.padding.0 as isize, params.padding.1 as isize);
    let mut grad_input = vec![T::zero(); if needs.input { x.len() } else { 0 }];
    let mut grad_weight = vec![T::zero(); if needs.weight { w.len() } else { 0 }];
    let mut grad_bias = vec![T::zero(); if needs.bias { g.out_channels } else { 0 }];

    for n in 0..g.batch {
        for oc in 0..g.out_channels {
            let group = oc / out_per_group;
            for oh in 0..g.out_h {
                for ow in 0..g.out_w {
                    let grad = go[((n * g.out_channels + oc) * g.out_h + oh) * g.out_w + ow];
                    if needs.bias {
                        grad_bias[oc] = grad_bias[oc] + grad;
                    }
                    for icg in 0..in_per_group {
                        let ic = group * in_per_group + icg;
                        let x_plane = (n * g.in_channels + ic) * g.in_h * g.in_w;
                        let w_plane = (oc * in_per_group + icg) * g.kernel_h * g.kernel_w;
                        for kh in 0..g.kernel_h {
                            let ih = (oh * params.stride.0) as isize + kh as isize - pad_h;
                            if ih < 0 || ih >= g.in_h as isize {
                                continue;
                            }
                            let x_row = x_plane + ih as usize * g.in_w;
                            let w_row = w_plane + kh * g.kernel_w;
                            for kw in 0..g.kernel_w {
                                let iw = (ow * params.stride.1) as isize + kw as isize - pad_w;
                                if iw < 0 || iw >= g.in_w as isize {
                                    continue;
                                }
                                let xi = x_row + iw as usize;
                                let wi = w_row + kw;
                                if needs.input {
                                    grad_input[xi] = grad_input[xi] + grad * w[wi];
                                }
                                if needs.weight {
                                    grad_weight[wi] = grad_weight[wi] + grad * x[xi];
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    let mut grads = Vec::with_capacity(3);
    if needs.input {
        grads.push(Tensor::from_vec(grad_input, input.shape())?);
    }
    if needs.weight {
        grads.push(Tensor::from_vec(grad_weight, weight.shape())?);
    }
    if needs.bias {
        grads.push(Tensor::from_vec(grad_bias, vec![g.out_channels])?);
    }
    Ok(grads)
}
