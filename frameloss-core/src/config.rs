//! Loss configuration loaded from TOML.
//!
//! ```toml
//! [losses]
//! kind = "vgg_l1"
//! vgg_factor = 1.0
//! vgg_weights = "weights/vgg19_features.bin"
//! ```
//!
//! Every key is optional. A process-wide instance can be installed once at
//! startup with [`init_global`].

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::info;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::FrameLossError;
use crate::nn::losses::ColorScale;

/// Which training loss to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LossKind {
    /// Mean absolute error.
    #[default]
    #[serde(rename = "l1")]
    L1,
    /// Perceptual loss on VGG19 features.
    #[serde(rename = "vgg")]
    Vgg,
    /// Negated SSIM.
    #[serde(rename = "ssim")]
    Ssim,
    /// Perceptual loss plus L1.
    #[serde(rename = "vgg_l1")]
    VggL1,
    /// L1 plus color-palette loss.
    #[serde(rename = "l1_color")]
    L1Color,
}

impl LossKind {
    /// True for the kinds that need a feature extractor.
    pub fn is_perceptual(&self) -> bool {
        matches!(self, LossKind::Vgg | LossKind::VggL1)
    }
}

impl FromStr for LossKind {
    type Err = FrameLossError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "l1" => Ok(LossKind::L1),
            "vgg" => Ok(LossKind::Vgg),
            "ssim" => Ok(LossKind::Ssim),
            "vgg_l1" => Ok(LossKind::VggL1),
            "l1_color" => Ok(LossKind::L1Color),
            other => Err(FrameLossError::ConfigError(format!("unknown loss kind '{}'", other))),
        }
    }
}

/// Settings consumed by the losses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LossConfig {
    pub kind: LossKind,
    /// Weight of the perceptual term.
    pub vgg_factor: f64,
    /// Weight of the color-palette term.
    pub color_factor: f64,
    pub ssim_window_size: usize,
    pub ssim_size_average: bool,
    pub color_scale: ColorScale,
    /// Local VGG19 weight file. Required by the perceptual kinds.
    pub vgg_weights: Option<PathBuf>,
}

impl Default for LossConfig {
    fn default() -> Self {
        LossConfig {
            kind: LossKind::L1,
            vgg_factor: 1.0,
            color_factor: 1.0,
            ssim_window_size: 11,
            ssim_size_average: true,
            color_scale: ColorScale::Legacy256,
            vgg_weights: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    losses: LossConfig,
}

impl LossConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, FrameLossError> {
        let contents = fs::read_to_string(&path)?;
        let config = Self::from_toml_str(&contents)?;
        info!("Loaded loss configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Parses the `[losses]` table of a TOML document and validates it.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, FrameLossError> {
        let file: ConfigFile = toml::from_str(toml_str)?;
        file.losses.validate()?;
        Ok(file.losses)
    }

    pub fn validate(&self) -> Result<(), FrameLossError> {
        if self.ssim_window_size == 0 || self.ssim_window_size % 2 == 0 {
            return Err(FrameLossError::ConfigError(format!(
                "ssim_window_size must be positive and odd, got {}",
                self.ssim_window_size
            )));
        }
        for (name, value) in [("vgg_factor", self.vgg_factor), ("color_factor", self.color_factor)] {
            if !value.is_finite() {
                return Err(FrameLossError::ConfigError(format!("{} must be finite, got {}", name, value)));
            }
        }
        Ok(())
    }
}

static GLOBAL_CONFIG: OnceCell<LossConfig> = OnceCell::new();

/// Installs the process-wide configuration. Fails if one is already installed.
pub fn init_global(config: LossConfig) -> Result<&'static LossConfig, FrameLossError> {
    config.validate()?;
    GLOBAL_CONFIG
        .set(config)
        .map_err(|_| FrameLossError::ConfigError("global loss configuration already initialized".to_string()))?;
    require_global()
}

/// The process-wide configuration, or `None` before [`init_global`].
pub fn global() -> Option<&'static LossConfig> {
    GLOBAL_CONFIG.get()
}

/// Like [`global`], but a missing configuration is a `ConfigError`.
pub fn require_global() -> Result<&'static LossConfig, FrameLossError> {
    global().ok_or_else(|| FrameLossError::ConfigError("global loss configuration is not initialized".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_table_missing() -> Result<(), FrameLossError> {
        let config = LossConfig::from_toml_str("")?;
        assert_eq!(config, LossConfig::default());
        assert_eq!(config.kind, LossKind::L1);
        assert_eq!(config.vgg_factor, 1.0);
        assert_eq!(config.ssim_window_size, 11);
        assert_eq!(config.color_scale, ColorScale::Legacy256);
        Ok(())
    }

    #[test]
    fn test_parse_full_table() -> Result<(), FrameLossError> {
        let config = LossConfig::from_toml_str(
            r#"
            # comment
            [losses]
            kind = "l1_color"
            vgg_factor = 0.25
            color_factor = 0.01
            ssim_window_size = 7
            ssim_size_average = false
            color_scale = "standard255"
            vgg_weights = "/tmp/vgg.bin"
            "#,
        )?;
        assert_eq!(config.kind, LossKind::L1Color);
        assert_eq!(config.vgg_factor, 0.25);
        assert_eq!(config.color_factor, 0.01);
        assert_eq!(config.ssim_window_size, 7);
        assert!(!config.ssim_size_average);
        assert_eq!(config.color_scale, ColorScale::Standard255);
        assert_eq!(config.vgg_weights, Some(PathBuf::from("/tmp/vgg.bin")));
        Ok(())
    }

    #[test]
    fn test_rejects_unknown_kind_and_even_window() {
        let unknown = LossConfig::from_toml_str("[losses]\nkind = \"mse\"\n");
        assert!(matches!(unknown, Err(FrameLossError::ConfigError(_))));

        let even = LossConfig::from_toml_str("[losses]\nssim_window_size = 8\n");
        assert!(matches!(even, Err(FrameLossError::ConfigError(_))));
    }

    #[test]
    fn test_loss_kind_from_str() {
        assert_eq!("VGG_L1".parse::<LossKind>(), Ok(LossKind::VggL1));
        assert!("vgg".parse::<LossKind>().map(|k| k.is_perceptual()).unwrap_or(false));
        assert!(matches!("huber".parse::<LossKind>(), Err(FrameLossError::ConfigError(_))));
    }

    #[test]
    fn test_load_from_file() -> Result<(), FrameLossError> {
        let path = std::env::temp_dir().join(format!("frameloss_config_{}.toml", std::process::id()));
        fs::write(&path, "[losses]\nkind = \"ssim\"\n")?;
        let config = LossConfig::load_from_file(&path);
        fs::remove_file(&path)?;
        assert_eq!(config?.kind, LossKind::Ssim);

        let missing = LossConfig::load_from_file("/nonexistent/frameloss.toml");
        assert!(matches!(missing, Err(FrameLossError::Io(_))));
        Ok(())
    }

    #[test]
    fn test_global_is_set_once() -> Result<(), FrameLossError> {
        assert_eq!(global(), None);
        assert!(matches!(require_global(), Err(FrameLossError::ConfigError(_))));

        let config = LossConfig {
            kind: LossKind::Ssim,
            ..LossConfig::default()
        };
        let installed = init_global(config.clone())?;
        assert_eq!(installed, &config);
        assert_eq!(global(), Some(&config));

        assert!(matches!(
            init_global(LossConfig::default()),
            Err(FrameLossError::ConfigError(_))
        ));
        assert_eq!(require_global()?.kind, LossKind::Ssim);
        Ok(())
    }
}
