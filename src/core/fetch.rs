use crate::config::sources::HttpConfig;
use crate::core::Fetcher;
use crate::utils::error::{EtlError, Result};
use crate::utils::logger::redact_url;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::time::Duration;

/// 錯誤信封中保留的上游回應長度上限（字元）
pub const MAX_DIAGNOSTIC_BODY: usize = 200;

const ACCEPT_ANY: &str = "text/html,application/json;q=0.9,*/*;q=0.8";

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        tracing::debug!("Making request to: {}", redact_url(url));
        // reqwest 的錯誤訊息含完整 URL（可能帶 api_key），轉換前先移除
        let response = self
            .client
            .get(url)
            .header(ACCEPT, ACCEPT_ANY)
            .send()
            .await
            .map_err(|e| EtlError::ApiError(e.without_url()))?;

        let status = response.status();
        tracing::debug!("Upstream response status: {}", status);

        if !status.is_success() {
            // 讀不到 body 也不影響錯誤本身
            let body = response
                .text()
                .await
                .ok()
                .map(|b| truncate_chars(b.trim(), MAX_DIAGNOSTIC_BODY))
                .filter(|b| !b.is_empty());
            return Err(EtlError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .text()
            .await
            .map_err(|e| EtlError::ApiError(e.without_url()))
    }
}

pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
