use crate::error::FrameLossError;
use crate::ops::conv::{conv2d_op, max_pool2d_op, Conv2dParams};
use crate::tensor::{from_vec_f32, from_vec_f64, ones};
use crate::types::DType;

#[test]
fn test_conv2d_valid_3x3_sum_kernel() {
    let input = from_vec_f32((1..=9).map(|v| v as f32).collect(), vec![1, 1, 3, 3]).unwrap();
    let weight = ones(&[1, 1, 2, 2]).unwrap();
    let out = conv2d_op(&input, &weight, None, Conv2dParams::default()).unwrap();
    assert_eq!(out.shape(), vec![1, 1, 2, 2]);
    assert_eq!(out.get_f32_data().unwrap(), vec![12.0, 16.0, 24.0, 28.0]);
}

#[test]
fn test_conv2d_padding_keeps_size() {
    let input = from_vec_f32((1..=9).map(|v| v as f32).collect(), vec![1, 1, 3, 3]).unwrap();
    let weight = ones(&[1, 1, 3, 3]).unwrap();
    let out = conv2d_op(&input, &weight, None, Conv2dParams::default().with_padding(1)).unwrap();
    assert_eq!(out.shape(), vec![1, 1, 3, 3]);
    assert_eq!(
        out.get_f32_data().unwrap(),
        vec![12.0, 21.0, 16.0, 27.0, 45.0, 33.0, 24.0, 39.0, 28.0]
    );
}

#[test]
fn test_conv2d_bias_and_stride() {
    let input = ones(&[1, 1, 4, 4]).unwrap();
    let weight = ones(&[2, 1, 2, 2]).unwrap();
    let bias = from_vec_f32(vec![0.5, -1.0], vec![2]).unwrap();
    let out = conv2d_op(&input, &weight, Some(&bias), Conv2dParams::default().with_stride(2)).unwrap();
    assert_eq!(out.shape(), vec![1, 2, 2, 2]);
    assert_eq!(out.get_f32_data().unwrap(), vec![4.5, 4.5, 4.5, 4.5, 3.0, 3.0, 3.0, 3.0]);
}

#[test]
fn test_conv2d_depthwise_groups() {
    // Two channels, each convolved with its own 1x1 kernel.
    let input = from_vec_f64(vec![1.0, 2.0, 3.0, 4.0], vec![1, 2, 1, 2]).unwrap();
    let weight = from_vec_f64(vec![10.0, 100.0], vec![2, 1, 1, 1]).unwrap();
    let out = conv2d_op(&input, &weight, None, Conv2dParams::default().with_groups(2)).unwrap();
    assert_eq!(out.dtype(), DType::F64);
    assert_eq!(out.get_f64_data().unwrap(), vec![10.0, 20.0, 300.0, 400.0]);
}

#[test]
fn test_conv2d_shape_errors() {
    let input = ones(&[1, 3, 4, 4]).unwrap();
    let bad_weight = ones(&[2, 2, 3, 3]).unwrap();
    assert!(matches!(
        conv2d_op(&input, &bad_weight, None, Conv2dParams::default()),
        Err(FrameLossError::ShapeMismatch { .. })
    ));

    let flat = ones(&[3, 4, 4]).unwrap();
    let weight = ones(&[1, 3, 3, 3]).unwrap();
    assert!(matches!(
        conv2d_op(&flat, &weight, None, Conv2dParams::default()),
        Err(FrameLossError::DimensionMismatch { expected: 4, actual: 3, .. })
    ));

    assert!(matches!(
        conv2d_op(&input, &weight, None, Conv2dParams::default().with_groups(2)),
        Err(FrameLossError::InvalidArgument { .. })
    ));

    let large = ones(&[1, 3, 5, 5]).unwrap();
    assert!(matches!(
        conv2d_op(&input, &large, None, Conv2dParams::default()),
        Err(FrameLossError::InvalidArgument { .. })
    ));
}

#[test]
fn test_max_pool2d() {
    let input = from_vec_f32((1..=16).map(|v| v as f32).collect(), vec![1, 1, 4, 4]).unwrap();
    let out = max_pool2d_op(&input, 2, 2).unwrap();
    assert_eq!(out.shape(), vec![1, 1, 2, 2]);
    assert_eq!(out.get_f32_data().unwrap(), vec![6.0, 8.0, 14.0, 16.0]);
}

#[test]
fn test_max_pool2d_drops_partial_windows() {
    let input = ones(&[2, 3, 5, 5]).unwrap();
    let out = max_pool2d_op(&input, 2, 2).unwrap();
    assert_eq!(out.shape(), vec![2, 3, 2, 2]);
    assert!(matches!(max_pool2d_op(&input, 6, 2), Err(FrameLossError::InvalidArgument { .. })));
}
