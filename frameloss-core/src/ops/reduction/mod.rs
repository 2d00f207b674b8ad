//! Reductions along axes.

mod max;
mod mean;
mod min;
mod sum;
pub(crate) mod utils;

pub use max::max_all_op;
pub use mean::mean_op;
pub use min::min_op;
pub use sum::sum_op;

#[cfg(test)]
#[path = "reduction_test.rs"]
mod tests;
