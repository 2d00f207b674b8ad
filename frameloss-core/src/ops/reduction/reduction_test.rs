use crate::error::FrameLossError;
use crate::ops::reduction::{max_all_op, mean_op, min_op, sum_op};
use crate::tensor::{from_vec_f32, from_vec_f64, Tensor};
use approx::assert_relative_eq;

fn t32(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
    from_vec_f32(data, shape).expect("Test tensor f32 creation failed")
}

#[test]
fn test_sum_all_and_axes() {
    let t = t32(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
    let all = sum_op(&t, None, false).unwrap();
    assert_eq!(all.shape(), Vec::<usize>::new());
    assert_eq!(all.item_f32().unwrap(), 21.0);

    let rows = sum_op(&t, Some(&[1]), false).unwrap();
    assert_eq!(rows.shape(), vec![2]);
    assert_eq!(rows.get_f32_data().unwrap(), vec![6.0, 15.0]);

    let cols = sum_op(&t, Some(&[0]), true).unwrap();
    assert_eq!(cols.shape(), vec![1, 3]);
    assert_eq!(cols.get_f32_data().unwrap(), vec![5.0, 7.0, 9.0]);
}

#[test]
fn test_mean_over_trailing_axes() {
    // Per-sample mean of a [2, 1, 2, 2] batch.
    let t = from_vec_f64(vec![1.0, 2.0, 3.0, 4.0, 10.0, 10.0, 10.0, 14.0], vec![2, 1, 2, 2]).unwrap();
    let per_sample = mean_op(&t, Some(&[1, 2, 3]), false).unwrap();
    assert_eq!(per_sample.shape(), vec![2]);
    let values = per_sample.get_f64_data().unwrap();
    assert_relative_eq!(values[0], 2.5);
    assert_relative_eq!(values[1], 11.0);
}

#[test]
fn test_min_skips_nan() {
    let t = t32(vec![3.0, f32::NAN, 1.0, 2.0, 5.0, 4.0], vec![2, 3]);
    let m = min_op(&t, 1, false).unwrap();
    assert_eq!(m.get_f32_data().unwrap(), vec![1.0, 2.0]);

    let kept = min_op(&t, 0, true).unwrap();
    assert_eq!(kept.shape(), vec![1, 3]);
    assert_eq!(kept.get_f32_data().unwrap(), vec![2.0, 5.0, 1.0]);
}

#[test]
fn test_max_all() {
    let t = t32(vec![-1.0, 7.5, 2.0], vec![3]);
    assert_eq!(max_all_op(&t).unwrap().item_f32().unwrap(), 7.5);
    let empty = t32(vec![], vec![0]);
    assert!(matches!(max_all_op(&empty), Err(FrameLossError::InvalidArgument { .. })));
}

#[test]
fn test_axis_out_of_range() {
    let t = t32(vec![1.0, 2.0], vec![2]);
    assert!(matches!(sum_op(&t, Some(&[1]), false), Err(FrameLossError::InvalidArgument { .. })));
    assert!(matches!(min_op(&t, 3, false), Err(FrameLossError::InvalidArgument { .. })));
}
