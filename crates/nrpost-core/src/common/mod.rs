pub mod config;

pub use config::{DEFAULT_FIG_EXTENSION, RunConfig, RunConfigError};
