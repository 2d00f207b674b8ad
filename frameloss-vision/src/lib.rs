//! VGG19 feature backbone for the perceptual losses of `frameloss-core`.
//!
//! The backbone is loaded from a local state-dict file (see [`weights`]) and
//! handed to [`frameloss_core::nn::losses::PerceptualLoss`] through the
//! [`FeatureExtractor`](frameloss_core::nn::losses::FeatureExtractor) trait.

pub mod loss;
pub mod vgg;
pub mod weights;

pub use loss::{build_loss, build_loss_from_global, vgg_loss, vgg_l1_loss};
pub use vgg::{Vgg19Features, VGG19_RELU4_4_LAYERS};
pub use weights::{load_state_dict, read_state_dict, save_state_dict, write_state_dict, StateDict};
