use crate::error::FrameLossError;
use crate::ops::activation::relu_op;
use crate::ops::arithmetic::{
    abs_op, add_op, add_scalar_op, div_op, mul_op, mul_scalar_op, neg_op, sqrt_op, square_op, sub_op,
};
use crate::ops::conv::{conv2d_op, max_pool2d_op, Conv2dParams};
use crate::ops::dtype::cast_op;
use crate::ops::linalg::{matmul_op, norm_dim_op, norm_op};
use crate::ops::reduction::{max_all_op, mean_op, min_op, sum_op};
use crate::tensor::Tensor;
use crate::types::DType;

impl Tensor {
    pub fn add(&self, other: &Tensor) -> Result<Tensor, FrameLossError> {
        add_op(self, other)
    }

    pub fn sub(&self, other: &Tensor) -> Result<Tensor, FrameLossError> {
        sub_op(self, other)
    }

    pub fn mul(&self, other: &Tensor) -> Result<Tensor, FrameLossError> {
        mul_op(self, other)
    }

    pub fn div(&self, other: &Tensor) -> Result<Tensor, FrameLossError> {
        div_op(self, other)
    }

    pub fn neg(&self) -> Result<Tensor, FrameLossError> {
        neg_op(self)
    }

    pub fn abs(&self) -> Result<Tensor, FrameLossError> {
        abs_op(self)
    }

    pub fn sqrt(&self) -> Result<Tensor, FrameLossError> {
        sqrt_op(self)
    }

    pub fn square(&self) -> Result<Tensor, FrameLossError> {
        square_op(self)
    }

    pub fn add_scalar(&self, scalar: f64) -> Result<Tensor, FrameLossError> {
        add_scalar_op(self, scalar)
    }

    pub fn mul_scalar(&self, scalar: f64) -> Result<Tensor, FrameLossError> {
        mul_scalar_op(self, scalar)
    }

    pub fn relu(&self) -> Result<Tensor, FrameLossError> {
        relu_op(self)
    }

    /// Sum over `axes`, or over everything when `None`.
    pub fn sum(&self, axes: Option<&[usize]>, keep_dims: bool) -> Result<Tensor, FrameLossError> {
        sum_op(self, axes, keep_dims)
    }

    /// Mean over `axes`, or over everything when `None`.
    pub fn mean(&self, axes: Option<&[usize]>, keep_dims: bool) -> Result<Tensor, FrameLossError> {
        mean_op(self, axes, keep_dims)
    }

    /// Minimum values along `dim`.
    pub fn min_dim(&self, dim: usize, keep_dims: bool) -> Result<Tensor, FrameLossError> {
        min_op(self, dim, keep_dims)
    }

    pub fn max_all(&self) -> Result<Tensor, FrameLossError> {
        max_all_op(self)
    }

    /// L2 norm of all elements.
    pub fn norm(&self) -> Result<Tensor, FrameLossError> {
        norm_op(self)
    }

    /// L2 norm along `dim`.
    pub fn norm_dim(&self, dim: usize, keep_dims: bool) -> Result<Tensor, FrameLossError> {
        norm_dim_op(self, dim, keep_dims)
    }

    pub fn matmul(&self, other: &Tensor) -> Result<Tensor, FrameLossError> {
        matmul_op(self, other)
    }

    pub fn conv2d(&self, weight: &Tensor, bias: Option<&Tensor>, params: Conv2dParams) -> Result<Tensor, FrameLossError> {
        conv2d_op(self, weight, bias, params)
    }

    pub fn max_pool2d(&self, kernel_size: usize, stride: usize) -> Result<Tensor, FrameLossError> {
        max_pool2d_op(self, kernel_size, stride)
    }

    /// Converts to `dtype`; a no-op clone when the dtype already matches.
    pub fn to_dtype(&self, dtype: DType) -> Result<Tensor, FrameLossError> {
        cast_op(self, dtype)
    }
}
