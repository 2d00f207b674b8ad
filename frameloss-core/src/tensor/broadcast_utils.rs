use crate::error::FrameLossError;
use crate::ops::reduction::sum_op;
use crate::ops::view::reshape_op;
use crate::tensor::Tensor;

impl Tensor {
    /// Sums a broadcast gradient back down to `target_shape`.
    ///
    /// Leading dimensions missing from `target_shape` and dimensions that were
    /// expanded from size 1 are summed out.
    pub fn reduce_to_shape(&self, target_shape: &[usize]) -> Result<Tensor, FrameLossError> {
        let current_shape = self.shape();
        if current_shape == target_shape {
            return Ok(self.clone());
        }
        let current_rank = current_shape.len();
        let target_rank = target_shape.len();
        if current_rank < target_rank {
            return Err(FrameLossError::BroadcastError {
                shape1: current_shape,
                shape2: target_shape.to_vec(),
            });
        }

        let rank_diff = current_rank - target_rank;
        let mut axes: Vec<usize> = (0..rank_diff).collect();
        for (i, &target_dim) in target_shape.iter().enumerate() {
            let current_dim = current_shape[rank_diff + i];
            if current_dim == target_dim {
                continue;
            }
            if target_dim != 1 {
                return Err(FrameLossError::BroadcastError {
                    shape1: current_shape,
                    shape2: target_shape.to_vec(),
                });
            }
            axes.push(rank_diff + i);
        }
        let reduced = sum_op(self, Some(&axes), true)?;
        reshape_op(&reduced, target_shape.to_vec())
    }
}
