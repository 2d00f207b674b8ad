use std::fmt::Debug;

/// Represents the physical location where tensor data is stored.
///
/// Only the CPU carries a compute backend. The GPU variant exists so that
/// device-keyed caches (see the SSIM window cache) and device checks in the
/// ops can name it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageDevice {
    /// Data is stored in main system memory (RAM).
    #[default]
    CPU,
    /// Data is stored on a CUDA-enabled GPU. No kernels exist for it.
    GPU,
}
