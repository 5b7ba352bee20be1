use crate::core::respond::CachePolicy;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const API_KEY_ENV: &str = "FOREXRATEAPI_KEY";

pub const DEFAULT_OFGEM_URL: &str = "https://www.ofgem.gov.uk/energy-price-cap";
pub const DEFAULT_ONS_URL: &str =
    "https://www.ons.gov.uk/economy/inflationandpriceindices/bulletins/housepriceindex/latest";
pub const DEFAULT_FOREX_ENDPOINT: &str = "https://api.forexrateapi.com/v1/latest";
pub const DEFAULT_BASE: &str = "GBP";
pub const DEFAULT_CURRENCIES: &str = "USD,EUR,JPY,AUD,CAD,CHF,CNY,INR,NZD";

/// 所有資料來源的設定，可由 TOML 檔覆寫；每個欄位都有預設值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub http: HttpConfig,
    pub ofgem: OfgemConfig,
    pub ons: OnsConfig,
    pub forex: ForexConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!(
                "stat-feeds/",
                env!("CARGO_PKG_VERSION"),
                " (public statistics fetcher)"
            )
            .to_string(),
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OfgemConfig {
    pub url: String,
    pub s_maxage: u64,
    pub stale_while_revalidate: u64,
}

impl Default for OfgemConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_OFGEM_URL.to_string(),
            // 每季更新：6 小時新鮮、1 天過期可用
            s_maxage: 21_600,
            stale_while_revalidate: 86_400,
        }
    }
}

impl OfgemConfig {
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy::new(self.s_maxage, self.stale_while_revalidate)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OnsConfig {
    pub url: String,
    pub source_name: String,
}

impl Default for OnsConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ONS_URL.to_string(),
            source_name: "ONS House Price Index".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForexConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub default_base: String,
    pub default_currencies: String,
    pub s_maxage: u64,
    pub stale_while_revalidate: u64,
}

impl Default for ForexConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_FOREX_ENDPOINT.to_string(),
            api_key: None,
            default_base: DEFAULT_BASE.to_string(),
            default_currencies: DEFAULT_CURRENCIES.to_string(),
            // 每日匯率
            s_maxage: 86_400,
            stale_while_revalidate: 43_200,
        }
    }
}

impl ForexConfig {
    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy::new(self.s_maxage, self.stale_while_revalidate)
    }
}

impl SourcesConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        let mut config: Self =
            toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;

        // 未解析的 ${VAR} 視同未設定
        if config
            .forex
            .api_key
            .as_deref()
            .is_some_and(|k| k.trim().is_empty() || k.starts_with("${"))
        {
            config.forex.api_key = None;
        }
        Ok(config)
    }

    /// 有檔案就讀檔，沒有就用預設值；最後套用環境變數
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(p) => {
                tracing::info!("📁 Loading sources configuration from: {}", p.display());
                Self::from_file(p)?
            }
            None => Self::default(),
        };
        Ok(config.with_env_overrides())
    }

    /// 環境變數中的 API key 只補上未設定的值
    pub fn with_env_overrides(mut self) -> Self {
        if self.forex.api_key.is_none() {
            self.forex.api_key = std::env::var(API_KEY_ENV)
                .ok()
                .filter(|k| !k.trim().is_empty());
        }
        self
    }

    /// 替換環境變數 (例如 ${FOREXRATEAPI_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}")?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for SourcesConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("http.user_agent", &self.http.user_agent)?;
        if let Some(timeout) = self.http.timeout_seconds {
            validation::validate_positive_number("http.timeout_seconds", timeout, 1)?;
        }

        validation::validate_url("ofgem.url", &self.ofgem.url)?;
        validation::validate_positive_number("ofgem.s_maxage", self.ofgem.s_maxage, 1)?;
        validation::validate_positive_number(
            "ofgem.stale_while_revalidate",
            self.ofgem.stale_while_revalidate,
            1,
        )?;

        validation::validate_url("ons.url", &self.ons.url)?;
        validation::validate_non_empty_string("ons.source_name", &self.ons.source_name)?;

        validation::validate_url("forex.endpoint", &self.forex.endpoint)?;
        validation::validate_currency_code("forex.default_base", &self.forex.default_base)?;
        validation::validate_currency_list(
            "forex.default_currencies",
            &self.forex.default_currencies,
        )?;
        validation::validate_positive_number("forex.s_maxage", self.forex.s_maxage, 1)?;
        validation::validate_positive_number(
            "forex.stale_while_revalidate",
            self.forex.stale_while_revalidate,
            1,
        )?;

        // API key 缺少不在這裡擋：rates 端點會以 500 回應，其餘端點照常運作
        tracing::info!("✅ Sources configuration validation passed");
        Ok(())
    }
}
