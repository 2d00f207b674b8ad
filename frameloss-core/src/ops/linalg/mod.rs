//! Linear algebra: 2-D matrix product and L2 norms.

mod matmul;
mod norm;

pub use matmul::matmul_op;
pub use norm::{norm_dim_op, norm_op};

#[cfg(test)]
#[path = "linalg_test.rs"]
mod tests;
