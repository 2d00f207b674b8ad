use crate::error::FrameLossError;
use crate::ops::view::{expand_op, reshape_op, unsqueeze_op};
use crate::tensor::Tensor;

impl Tensor {
    /// Same data under `new_shape`; the element count must not change.
    pub fn reshape(&self, new_shape: Vec<usize>) -> Result<Tensor, FrameLossError> {
        reshape_op(self, new_shape)
    }

    pub fn unsqueeze(&self, dim: usize) -> Result<Tensor, FrameLossError> {
        unsqueeze_op(self, dim)
    }

    /// Materialized broadcast of `self` to `target_shape`.
    pub fn expand(&self, target_shape: &[usize]) -> Result<Tensor, FrameLossError> {
        expand_op(self, target_shape)
    }

    /// Reads one element by multi-dimensional index, widened to `f64`.
    pub fn get(&self, indices: &[usize]) -> Result<f64, FrameLossError> {
        let shape = self.shape();
        if indices.len() != shape.len() || indices.iter().zip(&shape).any(|(&i, &s)| i >= s) {
            return Err(FrameLossError::InvalidArgument {
                operation: "get".to_string(),
                message: format!("index {:?} is out of bounds for shape {:?}", indices, shape),
            });
        }
        let offset = self.read_data().get_offset(indices);
        Ok(self.to_f64_vec()?[offset])
    }
}
