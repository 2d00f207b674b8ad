use crate::error::FrameLossError;
use crate::nn::losses::l1::L1Loss;
use crate::nn::losses::reduction::Reduction;
use crate::nn::losses::Loss;
use crate::tensor::{from_vec_f32, Tensor};
use approx::assert_relative_eq;

fn create_test_tensor_f32(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
    from_vec_f32(data, shape).expect("Test tensor f32 creation failed")
}

#[test]
fn test_l1_loss_mean() -> Result<(), FrameLossError> {
    let mut l1 = L1Loss::default();
    let input = create_test_tensor_f32(vec![1.0, 2.0, 3.0, 4.0], vec![1, 1, 2, 2]);
    let target = create_test_tensor_f32(vec![1.5, 1.0, 3.0, 2.0], vec![1, 1, 2, 2]);
    let loss = l1.evaluate(&input, &target)?;
    assert_eq!(loss.shape(), &[] as &[usize]);
    assert_relative_eq!(loss.item_f32()?, 0.875f32, epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_l1_loss_sum_and_none() -> Result<(), FrameLossError> {
    let input = create_test_tensor_f32(vec![1.0, -2.0], vec![2]);
    let target = create_test_tensor_f32(vec![0.0, 0.0], vec![2]);

    let sum = L1Loss::new(Reduction::Sum).calculate(&input, &target)?;
    assert_relative_eq!(sum.item_f32()?, 3.0f32, epsilon = 1e-6);

    let none = L1Loss::new(Reduction::None).calculate(&input, &target)?;
    assert_eq!(none.get_f32_data()?, vec![1.0, 2.0]);
    Ok(())
}

#[test]
fn test_l1_loss_mismatched_shapes() {
    let l1 = L1Loss::default();
    let input = create_test_tensor_f32(vec![1.0, 2.0], vec![2]);
    let target = create_test_tensor_f32(vec![1.0, 2.0, 3.0], vec![3]);
    let result = l1.calculate(&input, &target);
    assert!(matches!(result, Err(FrameLossError::ShapeMismatch { .. })));
}

#[test]
fn test_l1_loss_identical_is_zero() -> Result<(), FrameLossError> {
    let mut l1 = L1Loss::default();
    let x = Tensor::new_f64(vec![0.1, 0.7, 0.3], vec![3])?;
    assert_eq!(l1.evaluate(&x, &x)?.item_f64()?, 0.0);
    assert_eq!(l1.name(), "l1");
    Ok(())
}
