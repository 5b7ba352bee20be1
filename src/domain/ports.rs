use crate::core::respond::HandlerResponse;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// 請求的查詢參數
pub type Query = HashMap<String, String>;

/// 對上游來源發出單次 GET
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// 從純文字中取出單一數值的規則
pub trait ValueStrategy: Send + Sync {
    fn name(&self) -> &str;
    fn extract(&self, text: &str) -> Option<f64>;
}

/// 從純文字中取出期間標籤的規則
pub trait PeriodStrategy: Send + Sync {
    fn name(&self) -> &str;
    fn extract(&self, text: &str) -> Option<String>;
}

/// 一個端點：抓取 -> 擷取 -> 正規化 -> 回應，永不讓錯誤穿出邊界
#[async_trait]
pub trait StatisticHandler: Send + Sync {
    fn name(&self) -> &'static str;
    async fn handle(&self, query: &Query) -> HandlerResponse;
}
