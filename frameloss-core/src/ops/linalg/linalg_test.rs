use crate::error::FrameLossError;
use crate::ops::linalg::{matmul_op, norm_dim_op, norm_op};
use crate::tensor::{from_vec_f32, from_vec_f64};
use approx::assert_relative_eq;

#[test]
fn test_matmul_2x3_3x2() {
    let a = from_vec_f32(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]).unwrap();
    let b = from_vec_f32(vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0], vec![3, 2]).unwrap();
    let c = matmul_op(&a, &b).unwrap();
    assert_eq!(c.shape(), vec![2, 2]);
    assert_eq!(c.get_f32_data().unwrap(), vec![58.0, 64.0, 139.0, 154.0]);
}

#[test]
fn test_matmul_outer_product() {
    let col = from_vec_f64(vec![1.0, 2.0], vec![2, 1]).unwrap();
    let row = from_vec_f64(vec![3.0, 4.0], vec![1, 2]).unwrap();
    let outer = matmul_op(&col, &row).unwrap();
    assert_eq!(outer.get_f64_data().unwrap(), vec![3.0, 4.0, 6.0, 8.0]);
}

#[test]
fn test_matmul_errors() {
    let a = from_vec_f32(vec![1.0; 6], vec![2, 3]).unwrap();
    let v = from_vec_f32(vec![1.0; 3], vec![3]).unwrap();
    assert!(matches!(matmul_op(&a, &v), Err(FrameLossError::DimensionMismatch { expected: 2, actual: 1, .. })));
    assert!(matches!(matmul_op(&a, &a), Err(FrameLossError::ShapeMismatch { .. })));
}

#[test]
fn test_norm_all() {
    let t = from_vec_f32(vec![3.0, 4.0, 0.0, 0.0], vec![2, 2]).unwrap();
    assert_relative_eq!(norm_op(&t).unwrap().item_f32().unwrap(), 5.0);
}

#[test]
fn test_norm_dim() {
    let t = from_vec_f64(vec![3.0, 0.0, 4.0, 1.0], vec![2, 2]).unwrap();
    let n = norm_dim_op(&t, 0, false).unwrap();
    assert_eq!(n.shape(), vec![2]);
    let v = n.get_f64_data().unwrap();
    assert_relative_eq!(v[0], 5.0);
    assert_relative_eq!(v[1], 1.0);
}
