// src/tensor/create.rs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal, Uniform};

use crate::error::FrameLossError;
use crate::tensor::Tensor;
use crate::types::DType;

/// Creates a new F32 tensor filled with zeros with the specified shape.
pub fn zeros(shape: &[usize]) -> Result<Tensor, FrameLossError> {
    full(shape, 0.0)
}

/// Creates a new F64 tensor filled with zeros with the specified shape.
pub fn zeros_f64(shape: &[usize]) -> Result<Tensor, FrameLossError> {
    full_f64(shape, 0.0)
}

/// Creates a new F32 tensor filled with ones with the specified shape.
pub fn ones(shape: &[usize]) -> Result<Tensor, FrameLossError> {
    full(shape, 1.0)
}

/// Creates a new F64 tensor filled with ones with the specified shape.
pub fn ones_f64(shape: &[usize]) -> Result<Tensor, FrameLossError> {
    full_f64(shape, 1.0)
}

/// Creates a new F32 tensor filled with `value`.
pub fn full(shape: &[usize], value: f32) -> Result<Tensor, FrameLossError> {
    let numel = shape.iter().product();
    Tensor::new(vec![value; numel], shape.to_vec())
}

/// Creates a new F64 tensor filled with `value`.
pub fn full_f64(shape: &[usize], value: f64) -> Result<Tensor, FrameLossError> {
    let numel = shape.iter().product();
    Tensor::new_f64(vec![value; numel], shape.to_vec())
}

pub fn from_vec_f32(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Tensor, FrameLossError> {
    Tensor::new(data_vec, shape)
}

pub fn from_vec_f64(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Tensor, FrameLossError> {
    Tensor::new_f64(data_vec, shape)
}

/// Creates a tensor of zeros with the shape and dtype of `tensor`.
pub fn zeros_like(tensor: &Tensor) -> Result<Tensor, FrameLossError> {
    let shape = tensor.shape();
    match tensor.dtype() {
        DType::F32 => zeros(&shape),
        DType::F64 => zeros_f64(&shape),
    }
}

/// F32 tensor with samples from the standard normal distribution.
/// The same `seed` always yields the same tensor.
pub fn randn(shape: &[usize], seed: u64) -> Result<Tensor, FrameLossError> {
    let numel: usize = shape.iter().product();
    let mut rng = StdRng::seed_from_u64(seed);
    let data: Vec<f32> = (0..numel)
        .map(|_| {
            let v: f32 = StandardNormal.sample(&mut rng);
            v
        })
        .collect();
    Tensor::new(data, shape.to_vec())
}

/// F32 tensor with samples drawn uniformly from `[low, high)`.
pub fn rand_uniform(shape: &[usize], low: f32, high: f32, seed: u64) -> Result<Tensor, FrameLossError> {
    if !(low < high) {
        return Err(FrameLossError::InvalidArgument {
            operation: "rand_uniform".to_string(),
            message: format!("low ({}) must be smaller than high ({})", low, high),
        });
    }
    let numel: usize = shape.iter().product();
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Uniform::new(low, high);
    let data: Vec<f32> = (0..numel).map(|_| rng.sample(dist)).collect();
    Tensor::new(data, shape.to_vec())
}
