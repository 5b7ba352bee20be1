use crate::config::sources::SourcesConfig;
use crate::core::fetch::HttpFetcher;
use crate::core::Fetcher;
use crate::utils::error::Result;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// 同一個警告在整個應用程式生命週期只記錄一次
#[derive(Debug, Default)]
pub struct WarnOnce {
    seen: Mutex<HashSet<String>>,
}

impl WarnOnce {
    pub fn new() -> Self {
        Self::default()
    }

    /// 第一次看到 `key` 時記錄並回傳 true
    pub fn warn(&self, key: &str, message: &str) -> bool {
        let mut seen = match self.seen.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if seen.insert(key.to_string()) {
            tracing::warn!("⚠️ {}", message);
            true
        } else {
            false
        }
    }

    pub fn has_warned(&self, key: &str) -> bool {
        match self.seen.lock() {
            Ok(guard) => guard.contains(key),
            Err(poisoned) => poisoned.into_inner().contains(key),
        }
    }
}

/// 啟動時建立、傳給每個 handler 的共用環境
#[derive(Clone)]
pub struct AppContext {
    pub fetcher: Arc<dyn Fetcher>,
    pub config: Arc<SourcesConfig>,
    pub warnings: Arc<WarnOnce>,
}

impl AppContext {
    pub fn new(config: SourcesConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.http)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    pub fn with_fetcher(config: SourcesConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            config: Arc::new(config),
            warnings: Arc::new(WarnOnce::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_once_only_first_time() {
        let warnings = WarnOnce::new();
        assert!(!warnings.has_warned("forex.api_key"));
        assert!(warnings.warn("forex.api_key", "missing key"));
        assert!(!warnings.warn("forex.api_key", "missing key"));
        assert!(warnings.has_warned("forex.api_key"));
        assert!(warnings.warn("other", "other warning"));
    }

    #[test]
    fn test_contexts_do_not_share_warnings() {
        let a = AppContext::new(SourcesConfig::default()).unwrap();
        let b = AppContext::new(SourcesConfig::default()).unwrap();
        a.warnings.warn("k", "m");
        assert!(a.warnings.has_warned("k"));
        assert!(!b.warnings.has_warned("k"));
    }
}
