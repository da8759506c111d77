pub use config::Config;
pub use error::Error;
pub use ops::{Operator, UnaryFn};
pub use svec::{Runs, SparseVector, Svec};
pub use value::{NvpIdentical, Value, NVP};

mod access;
pub mod aggregate;
pub mod codec;
pub mod config;
mod error;
pub mod ops;
mod svec;
mod value;
