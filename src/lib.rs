pub mod bundle;
pub mod checker;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod pipeline;
pub mod process;
pub mod steps;
pub mod transform;

pub use error::PipelineError;
pub use pipeline::{Pipeline, PipelineReport};
