/// Floating-point element types a `Tensor` can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// 32-bit floating-point type.
    F32,
    /// 64-bit floating-point type.
    F64,
}

impl DType {
    /// Size in bytes of one element.
    pub fn size_of(&self) -> usize {
        match self {
            DType::F32 => std::mem::size_of::<f32>(),
            DType::F64 => std::mem::size_of::<f64>(),
        }
    }
}
