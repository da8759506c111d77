pub mod binary;
mod dense;
pub mod literal;
