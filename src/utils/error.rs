use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {status}")]
    UpstreamStatus { status: u16, body: Option<String> },

    #[error("Unrecognized payload: {message}")]
    PayloadShape { message: String },

    #[error("Extraction failed: {message}")]
    Extraction { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    PatternError(#[from] regex::Error),

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Upstream,
    Payload,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) | EtlError::UpstreamStatus { .. } => ErrorCategory::Upstream,
            EtlError::PayloadShape { .. }
            | EtlError::Extraction { .. }
            | EtlError::SerializationError(_) => ErrorCategory::Payload,
            EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::PatternError(_) => ErrorCategory::Configuration,
            EtlError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 上游暫時性錯誤，邊緣快取的 stale-while-revalidate 會撐住
            ErrorCategory::Upstream => ErrorSeverity::Medium,
            ErrorCategory::Payload => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 錯誤信封中使用的簡短機器代碼
    pub fn error_code(&self) -> &'static str {
        match self {
            EtlError::ApiError(_) => "upstream_unreachable",
            EtlError::UpstreamStatus { .. } => "upstream_error",
            EtlError::PayloadShape { .. } | EtlError::SerializationError(_) => {
                "unrecognized_payload"
            }
            EtlError::Extraction { .. } => "extraction_failed",
            EtlError::MissingConfigError { field } if field == "forex.api_key" => {
                "missing_api_key"
            }
            EtlError::MissingConfigError { .. } => "missing_config",
            EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::PatternError(_) => "invalid_config",
            EtlError::IoError(_) => "internal_error",
        }
    }

    /// 硬失敗時回應的 HTTP 狀態碼
    pub fn http_status(&self) -> StatusCode {
        match self.category() {
            ErrorCategory::Upstream | ErrorCategory::Payload => StatusCode::BAD_GATEWAY,
            ErrorCategory::Configuration | ErrorCategory::System => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 上游回應的狀態碼（若有）
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            EtlError::UpstreamStatus { status, .. } => Some(*status),
            EtlError::ApiError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::ApiError(_) => "Check network connectivity to the upstream source",
            EtlError::UpstreamStatus { .. } => {
                "The upstream source is failing; the edge cache keeps serving the last good value"
            }
            EtlError::PayloadShape { .. } | EtlError::SerializationError(_) => {
                "The provider response format changed; add a new response shape"
            }
            EtlError::Extraction { .. } => {
                "The page wording changed; add a new extraction strategy for the source"
            }
            EtlError::MissingConfigError { .. } => {
                "Set the missing value in the sources file or the environment"
            }
            EtlError::InvalidConfigValueError { .. } | EtlError::ConfigValidationError { .. } => {
                "Fix the configuration value and restart"
            }
            EtlError::PatternError(_) => "Fix the regular expression of the extraction strategy",
            EtlError::IoError(_) => "Check file paths and permissions",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::ApiError(e) if e.is_timeout() => {
                "The data source did not respond in time".to_string()
            }
            EtlError::ApiError(_) => "The data source could not be reached".to_string(),
            EtlError::UpstreamStatus { status, .. } => {
                format!("The data source responded with HTTP {}", status)
            }
            EtlError::MissingConfigError { field } => {
                format!("Required setting '{}' is not configured", field)
            }
            EtlError::Extraction { message } => message.clone(),
            other => other.to_string(),
        }
    }
}
