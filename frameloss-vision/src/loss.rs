//! Perceptual losses backed by [`Vgg19Features`].

use frameloss_core::config::{self, LossConfig};
use frameloss_core::nn::losses::{self, build_loss_with_extractor, PerceptualL1Loss, PerceptualLoss};
use frameloss_core::{FrameLossError, Loss};

use crate::vgg::Vgg19Features;

fn load_backbone(config: &LossConfig) -> Result<Vgg19Features, FrameLossError> {
    let path = config.vgg_weights.as_ref().ok_or_else(|| {
        FrameLossError::ConfigError(format!("loss kind {:?} requires `vgg_weights`", config.kind))
    })?;
    Vgg19Features::load(path)
}

/// `vgg_factor * ||VGG(output) - VGG(target)||_2` with weights from `config.vgg_weights`.
pub fn vgg_loss(config: &LossConfig) -> Result<PerceptualLoss<Vgg19Features>, FrameLossError> {
    Ok(PerceptualLoss::new(load_backbone(config)?, config.vgg_factor))
}

/// [`vgg_loss`] plus L1.
pub fn vgg_l1_loss(config: &LossConfig) -> Result<PerceptualL1Loss<Vgg19Features>, FrameLossError> {
    Ok(PerceptualL1Loss::new(load_backbone(config)?, config.vgg_factor))
}

/// Builds any configured loss. The VGG weights are only read for the
/// perceptual kinds.
pub fn build_loss(config: &LossConfig) -> Result<Box<dyn Loss>, FrameLossError> {
    if config.kind.is_perceptual() {
        config.validate()?;
        build_loss_with_extractor(config, load_backbone(config)?)
    } else {
        losses::build_loss(config)
    }
}

/// [`build_loss`] over the configuration installed with
/// [`frameloss_core::config::init_global`].
pub fn build_loss_from_global() -> Result<Box<dyn Loss>, FrameLossError> {
    build_loss(config::require_global()?)
}
