use std::fmt;
use std::ops::Deref;

use crate::tensor::Tensor;

/// A tensor owned by a `Module` as one of its weights.
/// Parameters are created with `requires_grad` set to `true`.
#[derive(Clone)]
pub struct Parameter {
    tensor: Tensor,
    name: Option<String>,
}

impl Parameter {
    pub fn new(tensor: Tensor, name: Option<String>) -> Self {
        tensor.set_requires_grad(true);
        Parameter { tensor, name }
    }

    pub fn new_unnamed(tensor: Tensor) -> Self {
        Self::new(tensor, None)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn tensor(&self) -> &Tensor {
        &self.tensor
    }

    /// Consumes the Parameter and returns the underlying Tensor.
    pub fn into_inner(self) -> Tensor {
        self.tensor
    }
}

// Allow accessing the underlying Tensor immutably via Deref.
impl Deref for Parameter {
    type Target = Tensor;

    fn deref(&self) -> &Self::Target {
        &self.tensor
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parameter({:?}, {:?})", self.name, self.tensor)
    }
}
