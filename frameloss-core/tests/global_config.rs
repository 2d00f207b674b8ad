mod common;

use common::{init_logger, random_batch};
use frameloss_core::config::{global, init_global};
use frameloss_core::nn::losses::build_loss_from_global;
use frameloss_core::{FrameLossError, LossConfig, LossKind};

// One test owns the process-wide configuration of this binary.
#[test]
fn factory_reads_the_installed_global_config() -> Result<(), FrameLossError> {
    init_logger();
    assert!(global().is_none());
    assert!(matches!(build_loss_from_global(), Err(FrameLossError::ConfigError(_))));

    init_global(LossConfig::from_toml_str(
        "[losses]\nkind = \"ssim\"\nssim_window_size = 3\nssim_size_average = false\n",
    )?)?;
    assert_eq!(global().map(|c| c.kind), Some(LossKind::Ssim));

    let mut loss = build_loss_from_global()?;
    assert_eq!(loss.name(), "ssim");
    let x = random_batch(&[2, 1, 6, 6], 4);
    assert_eq!(loss.evaluate(&x, &x)?.shape(), vec![2]);
    Ok(())
}
