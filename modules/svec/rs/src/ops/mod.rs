//! Elementwise arithmetic on compressed vectors and the reductions built on top of it.

mod combine;
mod operator;
mod reduce;
mod unary;

pub use operator::Operator;
pub use unary::UnaryFn;
