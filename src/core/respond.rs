use crate::core::ErrorEnvelope;
use crate::utils::error::EtlError;
use reqwest::StatusCode;
use serde::Serialize;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// 邊緣快取指令：`s-maxage=<fresh>, stale-while-revalidate=<stale>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub s_maxage: u64,
    pub stale_while_revalidate: u64,
}

impl CachePolicy {
    pub const fn new(s_maxage: u64, stale_while_revalidate: u64) -> Self {
        Self {
            s_maxage,
            stale_while_revalidate,
        }
    }

    pub fn header_value(&self) -> String {
        format!(
            "s-maxage={}, stale-while-revalidate={}",
            self.s_maxage, self.stale_while_revalidate
        )
    }
}

/// 與傳輸層無關的處理結果；body 已序列化，確保相同輸入得到相同位元組
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub status: StatusCode,
    pub cache_control: Option<String>,
    pub body: String,
}

impl HandlerResponse {
    pub fn content_type(&self) -> &'static str {
        CONTENT_TYPE_JSON
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// 成功回應；有快取策略才帶 Cache-Control
pub fn respond_ok<T: Serialize>(body: &T, cache: Option<CachePolicy>) -> HandlerResponse {
    match serde_json::to_string(body) {
        Ok(json) => HandlerResponse {
            status: StatusCode::OK,
            cache_control: cache.map(|c| c.header_value()),
            body: json,
        },
        Err(e) => respond_error(&EtlError::SerializationError(e)),
    }
}

/// 硬失敗：不帶快取標頭，避免錯誤被邊緣快取
pub fn respond_error(err: &EtlError) -> HandlerResponse {
    respond_error_with(err.http_status(), error_envelope(err))
}

pub fn respond_error_with(status: StatusCode, envelope: ErrorEnvelope) -> HandlerResponse {
    let body = serde_json::to_string(&envelope)
        .unwrap_or_else(|_| format!(r#"{{"error":"{}"}}"#, envelope.error));
    HandlerResponse {
        status,
        cache_control: None,
        body,
    }
}

pub fn error_envelope(err: &EtlError) -> ErrorEnvelope {
    let detail = match err {
        EtlError::UpstreamStatus { body, .. } => body.clone(),
        EtlError::PayloadShape { message } | EtlError::Extraction { message } => {
            Some(message.clone())
        }
        _ => None,
    };
    ErrorEnvelope {
        error: err.error_code().to_string(),
        status: err.upstream_status(),
        detail,
    }
}
