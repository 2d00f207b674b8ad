use log::info;

use crate::config::{self, LossConfig, LossKind};
use crate::error::FrameLossError;
use crate::nn::losses::color::ColorPaletteLoss;
use crate::nn::losses::combined::{L1ColorLoss, PerceptualL1Loss};
use crate::nn::losses::l1::L1Loss;
use crate::nn::losses::perceptual::{FeatureExtractor, PerceptualLoss};
use crate::nn::losses::ssim::SsimLoss;
use crate::nn::losses::Loss;

/// Builds the loss selected by `config` for the kinds that need no backbone.
///
/// # Errors
/// `ConfigError` for `vgg` and `vgg_l1`; use [`build_loss_with_extractor`] for those.
pub fn build_loss(config: &LossConfig) -> Result<Box<dyn Loss>, FrameLossError> {
    config.validate()?;
    let loss: Box<dyn Loss> = match config.kind {
        LossKind::L1 => Box::new(L1Loss::default()),
        LossKind::Ssim => Box::new(SsimLoss::new(config.ssim_window_size, config.ssim_size_average)?),
        LossKind::L1Color => Box::new(L1ColorLoss::new(color_loss(config)?)),
        LossKind::Vgg | LossKind::VggL1 => {
            return Err(FrameLossError::ConfigError(format!(
                "loss kind {:?} requires a feature extractor",
                config.kind
            )))
        }
    };
    info!("Built {} loss", loss.name());
    Ok(loss)
}

/// Builds any configured loss, handing `extractor` to the perceptual kinds.
pub fn build_loss_with_extractor<E>(config: &LossConfig, extractor: E) -> Result<Box<dyn Loss>, FrameLossError>
where
    E: FeatureExtractor + 'static,
{
    config.validate()?;
    let loss: Box<dyn Loss> = match config.kind {
        LossKind::Vgg => Box::new(PerceptualLoss::new(extractor, config.vgg_factor)),
        LossKind::VggL1 => Box::new(PerceptualL1Loss::new(extractor, config.vgg_factor)),
        _ => return build_loss(config),
    };
    info!("Built {} loss", loss.name());
    Ok(loss)
}

/// [`build_loss`] over the configuration installed with [`config::init_global`].
///
/// # Errors
/// `ConfigError` when no global configuration is installed.
pub fn build_loss_from_global() -> Result<Box<dyn Loss>, FrameLossError> {
    build_loss(config::require_global()?)
}

fn color_loss(config: &LossConfig) -> Result<ColorPaletteLoss, FrameLossError> {
    ColorPaletteLoss::with_palette(
        &crate::nn::losses::color::DEFAULT_PALETTE,
        config.color_scale,
        config.color_factor,
    )
}
