use std::cmp::max;

/// Calculates the strides for a given shape.
/// Strides represent the number of elements to skip in the flattened data array
/// to move one step along each dimension.
///
/// Example:
/// shape = [2, 3] -> strides = [3, 1]
/// shape = [2, 2, 2] -> strides = [4, 2, 1]
pub fn calculate_strides(shape: &[usize]) -> Vec<usize> {
    if shape.is_empty() {
        return vec![];
    }
    let rank = shape.len();
    let mut strides = vec![1; rank];
    for i in (0..rank - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

/// Determines the output shape resulting from broadcasting two input shapes.
///
/// Follows NumPy/PyTorch broadcasting rules:
/// 1. If the shapes have different numbers of dimensions, prepend 1s to the shorter shape.
/// 2. Compare dimensions element-wise from right to left.
/// 3. Dimensions are compatible if they are equal, or one of them is 1.
///
/// Returns `None` if the shapes are not broadcastable.
pub fn broadcast_shapes(shape_a: &[usize], shape_b: &[usize]) -> Option<Vec<usize>> {
    let rank_a = shape_a.len();
    let rank_b = shape_b.len();
    let max_rank = max(rank_a, rank_b);
    let mut result_shape = vec![0; max_rank];

    for i in 0..max_rank {
        let dim_a = shape_a.get(rank_a.wrapping_sub(1 + i)).copied().unwrap_or(1);
        let dim_b = shape_b.get(rank_b.wrapping_sub(1 + i)).copied().unwrap_or(1);

        result_shape[max_rank - 1 - i] = if dim_a == dim_b || dim_b == 1 {
            dim_a
        } else if dim_a == 1 {
            dim_b
        } else {
            return None;
        };
    }
    Some(result_shape)
}

/// Strides for reading `shape` as if it were expanded to `target_shape`.
///
/// Broadcast dimensions (size 1 in `shape`, or missing leading dimensions)
/// get a stride of 0. The caller must have checked broadcast compatibility.
pub fn broadcast_strides(shape: &[usize], target_shape: &[usize]) -> Vec<usize> {
    let own = calculate_strides(shape);
    let rank_diff = target_shape.len() - shape.len();
    (0..target_shape.len())
        .map(|i| {
            if i < rank_diff {
                0
            } else {
                let d = i - rank_diff;
                if shape[d] == 1 && target_shape[i] != 1 {
                    0
                } else {
                    own[d]
                }
            }
        })
        .collect()
}

/// Advances a row-major multi-index by one position. Returns `false` once the
/// index wraps around past the last element.
pub fn increment_index(index: &mut [usize], shape: &[usize]) -> bool {
    let mut dim = shape.len();
    while dim > 0 {
        dim -= 1;
        index[dim] += 1;
        if index[dim] < shape[dim] {
            return true;
        }
        index[dim] = 0;
    }
    false
}
