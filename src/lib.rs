#![warn(rust_2018_idioms)]

pub mod adapter;
pub mod app;
pub mod buffer;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;
pub mod relational;
pub mod synth;
pub mod writer;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::SeederError;
pub use writer::{DualPathWriter, WriteMode, WriteReport};
