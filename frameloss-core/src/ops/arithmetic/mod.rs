//! Element-wise arithmetic.

mod binary;
mod unary;

pub use binary::{add_op, div_op, mul_op, sub_op};
pub use unary::{abs_op, add_scalar_op, mul_scalar_op, neg_op, sqrt_op, square_op};
pub(crate) use unary::{record_unary, UnaryKind};

#[cfg(test)]
#[path = "arithmetic_test.rs"]
mod tests;
