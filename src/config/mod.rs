#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod sources;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use sources::SourcesConfig;
