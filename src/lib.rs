pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

#[cfg(feature = "lambda")]
pub use config::lambda::LambdaConfig;

pub use app::handlers::{Endpoint, HandlerSet};
pub use app::server::create_router;
pub use config::SourcesConfig;
pub use crate::core::context::AppContext;
pub use crate::core::respond::HandlerResponse;
pub use utils::error::{EtlError, Result};
