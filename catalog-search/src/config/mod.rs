//! Configuration for the catalog search commands.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{AppConfig, LogFormat};
