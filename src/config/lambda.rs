use crate::config::sources::SourcesConfig;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::env;
use std::path::PathBuf;

pub const CONFIG_PATH_ENV: &str = "STAT_FEEDS_CONFIG";

#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub sources: SourcesConfig,
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        let path = env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        Ok(Self {
            sources: SourcesConfig::load(path.as_deref())?,
        })
    }
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        self.sources.validate()
    }
}
