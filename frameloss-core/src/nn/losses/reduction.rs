use std::str::FromStr;

use crate::error::FrameLossError;

/// Specifies the reduction to apply to an element-wise loss:
/// 'none' | 'mean' | 'sum'
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reduction {
    #[default]
    Mean,
    Sum,
    /// Keep the element-wise values.
    None,
}

impl FromStr for Reduction {
    type Err = FrameLossError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mean" => Ok(Reduction::Mean),
            "sum" => Ok(Reduction::Sum),
            "none" => Ok(Reduction::None),
            _ => Err(FrameLossError::UnsupportedOperation(format!(
                "Unsupported reduction type: {}",
                s
            ))),
        }
    }
}
