use crate::error::FrameLossError;
use crate::ops::traits::TensorElement;
use crate::tensor::utils::{calculate_strides, increment_index};

/// Validates `axes` against `rank` and returns them sorted and deduplicated.
/// `None` means every axis.
pub(crate) fn normalize_axes(
    axes: Option<&[usize]>,
    rank: usize,
    operation: &str,
) -> Result<Vec<usize>, FrameLossError> {
    let mut normalized: Vec<usize> = match axes {
        None => (0..rank).collect(),
        Some(list) => list.to_vec(),
    };
    if let Some(&bad) = normalized.iter().find(|&&axis| axis >= rank) {
        return Err(FrameLossError::InvalidArgument {
            operation: operation.to_string(),
            message: format!("axis {} is out of range for rank {}", bad, rank),
        });
    }
    normalized.sort_unstable();
    normalized.dedup();
    Ok(normalized)
}

/// Output shape of a reduction over `axes`.
pub(crate) fn reduced_shape(shape: &[usize], axes: &[usize], keep_dims: bool) -> Vec<usize> {
    shape
        .iter()
        .enumerate()
        .filter_map(|(d, &size)| {
            if axes.contains(&d) {
                if keep_dims {
                    Some(1)
                } else {
                    None
                }
            } else {
                Some(size)
            }
        })
        .collect()
}

/// Folds `data` (laid out as `shape`) over `axes` with `fold`, starting every
/// output cell from `init`. Returns the output in row-major order of the
/// kept dimensions.
pub(crate) fn reduce_axes<T, F>(data: &[T], shape: &[usize], axes: &[usize], init: T, fold: F) -> Vec<T>
where
    T: TensorElement,
    F: Fn(T, T) -> T,
{
    let kept_shape = reduced_shape(shape, axes, true);
    let kept_strides = calculate_strides(&kept_shape);
    let out_numel: usize = kept_shape.iter().product();
    let mut out = vec![init; out_numel];

    if data.is_empty() {
        return out;
    }

    let mut index = vec![0; shape.len()];
    for &value in data {
        let out_offset: usize = index
            .iter()
            .enumerate()
            .filter(|(d, _)| !axes.contains(d))
            .map(|(d, &i)| i * kept_strides[d])
            .sum();
        out[out_offset] = fold(out[out_offset], value);
        increment_index(&mut index, shape);
    }
    out
}
