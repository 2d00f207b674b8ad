use frameloss_core::tensor::{from_vec_f32, rand_uniform};
use frameloss_core::Tensor;

// Shared by several integration test crates; not every crate uses every helper.
#[allow(dead_code)]
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[allow(dead_code)]
pub fn random_batch(shape: &[usize], seed: u64) -> Tensor {
    rand_uniform(shape, 0.0, 1.0, seed).expect("Test batch creation failed")
}

/// A `[1, 3, h, w]` image painted with a single RGB ratio triple.
#[allow(dead_code)]
pub fn solid_image(rgb: [f32; 3], h: usize, w: usize) -> Tensor {
    let data: Vec<f32> = rgb.iter().flat_map(|&c| std::iter::repeat(c).take(h * w)).collect();
    from_vec_f32(data, vec![1, 3, h, w]).expect("Test image creation failed")
}
