//! Service configuration read from the environment, and the dependencies
//! built from it.
mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{Config, LogFormat};
