use crate::error::FrameLossError;
use crate::nn::losses::color::{
    hex_to_percent_rgb, hex_to_ratio_rgb, hex_to_rgb, ColorPaletteLoss, ColorScale, DEFAULT_PALETTE,
};
use crate::nn::losses::Loss;
use crate::tensor::Tensor;
use crate::types::DType;
use approx::assert_relative_eq;

/// Builds a `[1, 3, 1, n]` F32 image whose pixels are the given palette entries.
fn image_from_palette(indices: &[usize]) -> Tensor {
    let mut data = vec![0.0f32; 3 * indices.len()];
    for (p, &i) in indices.iter().enumerate() {
        let (r, g, b) = hex_to_rgb(DEFAULT_PALETTE[i]).expect("palette entry parses");
        data[p] = r as f32 / 256.0;
        data[indices.len() + p] = g as f32 / 256.0;
        data[2 * indices.len() + p] = b as f32 / 256.0;
    }
    Tensor::new(data, vec![1, 3, 1, indices.len()]).expect("image creation failed")
}

#[test]
fn test_hex_to_rgb_known_values() -> Result<(), FrameLossError> {
    assert_eq!(hex_to_rgb("#FFFFFF")?, (255, 255, 255));
    assert_eq!(hex_to_rgb("#A06A42")?, (160, 106, 66));
    assert_eq!(hex_to_rgb("  0083c7 ")?, (0, 131, 199));
    Ok(())
}

#[test]
fn test_hex_to_percent_rgb_uses_256_divisor() -> Result<(), FrameLossError> {
    let white = hex_to_percent_rgb("#FFFFFF")?;
    assert_eq!(white, [255.0 / 256.0; 3]);
    assert!(white[0] < 1.0);

    let standard = hex_to_ratio_rgb("#FFFFFF", ColorScale::Standard255)?;
    assert_eq!(standard, [1.0; 3]);
    Ok(())
}

#[test]
fn test_hex_to_rgb_rejects_malformed_strings() {
    for bad in ["#FFF", "#GGGGGG", "", "#", "#FFFFFFF", "#FF FF F"] {
        let err = hex_to_rgb(bad).expect_err("malformed color should fail");
        assert!(matches!(err, FrameLossError::InvalidColor { .. }), "{:?}", err);
    }
    let err = hex_to_rgb("#12345").expect_err("five digits should fail");
    assert_eq!(err.to_string(), "input #12345 is not in #RRGGBB format");
}

#[test]
fn test_palette_layout() -> Result<(), FrameLossError> {
    let loss = ColorPaletteLoss::new(1.0)?;
    let palette = loss.palette();
    assert_eq!(palette.shape(), vec![3, 16]);
    assert_eq!(palette.dtype(), DType::F64);
    // column 0 is #FFFFFF, column 5 is #E50000
    assert_eq!(palette.get(&[0, 0])?, 255.0 / 256.0);
    assert_eq!(palette.get(&[0, 5])?, 229.0 / 256.0);
    assert_eq!(palette.get(&[1, 5])?, 0.0);
    Ok(())
}

#[test]
fn test_color_loss_zero_for_palette_pixels() -> Result<(), FrameLossError> {
    let mut loss = ColorPaletteLoss::new(1.0)?;
    let all: Vec<usize> = (0..16).collect();
    let output = image_from_palette(&all);
    let value = loss.evaluate(&output, &output)?;
    assert_eq!(value.shape(), Vec::<usize>::new());
    assert_eq!(value.item_f32()?, 0.0);

    let f64_output = output.to_dtype(DType::F64)?;
    assert_eq!(loss.evaluate(&f64_output, &f64_output)?.item_f64()?, 0.0);
    Ok(())
}

#[test]
fn test_color_loss_positive_off_palette() -> Result<(), FrameLossError> {
    let mut loss = ColorPaletteLoss::new(2.0)?;
    // One black pixel; the closest entry is #222222.
    let black = Tensor::new_f64(vec![0.0; 3], vec![1, 3, 1, 1])?;
    let value = loss.evaluate(&black, &black)?.item_f64()?;
    let expected = 2.0 * (3.0f64).sqrt() * 34.0 / 256.0;
    assert!(value > 0.0);
    assert_relative_eq!(value, expected, epsilon = 1e-12);
    Ok(())
}

#[test]
fn test_color_loss_sums_over_batch_and_pixels() -> Result<(), FrameLossError> {
    let loss = ColorPaletteLoss::new(1.0)?;
    let single = Tensor::new_f64(vec![0.0; 3], vec![1, 3, 1, 1])?;
    let batch = Tensor::new_f64(vec![0.0; 2 * 3 * 2 * 2], vec![2, 3, 2, 2])?;
    let one = loss.calculate(&single)?.item_f64()?;
    let many = loss.calculate(&batch)?.item_f64()?;
    assert_relative_eq!(many, 8.0 * one, epsilon = 1e-12);
    Ok(())
}

#[test]
fn test_color_loss_requires_rgb_batches() -> Result<(), FrameLossError> {
    let loss = ColorPaletteLoss::new(1.0)?;
    let gray = Tensor::new(vec![0.5; 4], vec![1, 1, 2, 2])?;
    assert!(matches!(loss.calculate(&gray), Err(FrameLossError::ShapeMismatch { .. })));
    let unbatched = Tensor::new(vec![0.5; 12], vec![3, 2, 2])?;
    assert!(matches!(
        loss.calculate(&unbatched),
        Err(FrameLossError::DimensionMismatch { .. })
    ));
    Ok(())
}

#[test]
fn test_custom_palette_with_standard_scale() -> Result<(), FrameLossError> {
    let loss = ColorPaletteLoss::with_palette(&["#000000", "#FFFFFF"], ColorScale::Standard255, 1.0)?;
    let white = Tensor::new_f64(vec![1.0; 3], vec![1, 3, 1, 1])?;
    assert_eq!(loss.calculate(&white)?.item_f64()?, 0.0);

    assert!(matches!(
        ColorPaletteLoss::with_palette(&["#000000", "nope"], ColorScale::Standard255, 1.0),
        Err(FrameLossError::InvalidColor { .. })
    ));
    assert!(matches!(
        ColorPaletteLoss::with_palette(&[], ColorScale::Legacy256, 1.0),
        Err(FrameLossError::InvalidArgument { .. })
    ));
    Ok(())
}
