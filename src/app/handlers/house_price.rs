use crate::core::context::AppContext;
use crate::core::extract::{
    first_label, first_value, title_case, RegexPeriodStrategy, RegexValueStrategy, MONTHS,
};
use crate::core::respond::{respond_ok, HandlerResponse};
use crate::core::{
    HousePriceEnvelope, PeriodStrategy, Query, ReleasePeriod, SourceMeta, StatisticHandler,
    ValueStrategy,
};
use crate::utils::error::{EtlError, Result};
use crate::utils::html::html_to_text;
use async_trait::async_trait;
use chrono::NaiveDate;

const FIGURE: &str = r"£\s?(\d[\d,]*(?:\.\d+)?)";

pub const EXTRACTION_MISS: &str = "Could not find the average UK house price in the ONS bulletin";

pub fn default_value_strategies() -> Result<Vec<Box<dyn ValueStrategy>>> {
    Ok(vec![
        Box::new(RegexValueStrategy::new(
            "average-uk-house-price-was",
            &format!(r"(?i)average\s+UK\s+house\s+price\s+was\s+{}", FIGURE),
        )?),
        Box::new(RegexValueStrategy::new(
            "average-house-price-in-the-uk-was",
            &format!(r"(?i)average\s+house\s+price\s+in\s+the\s+UK\s+was\s+{}", FIGURE),
        )?),
        Box::new(RegexValueStrategy::new(
            "uk-average-house-price",
            &format!(r"(?i)UK\s+average\s+house\s+price[^£]{{0,80}}?{}", FIGURE),
        )?),
    ])
}

pub fn default_period_strategies() -> Result<Vec<Box<dyn PeriodStrategy>>> {
    Ok(vec![
        Box::new(RegexPeriodStrategy::new(
            "figure-in-month",
            &format!(r"(?i)£\s?\d[\d,]*(?:\.\d+)?\s+in\s+({})\s+(\d{{4}})\b", MONTHS),
            render_month_year,
        )?),
        Box::new(RegexPeriodStrategy::new(
            "month-year",
            &format!(r"(?i)\b({})\s+(\d{{4}})\b", MONTHS),
            render_month_year,
        )?),
    ])
}

fn render_month_year(caps: &regex::Captures<'_>) -> Option<String> {
    Some(format!("{} {}", title_case(&caps[1]), &caps[2]))
}

/// "August 2025" -> "2025-08-01"
pub fn period_start(label: &str) -> Option<String> {
    NaiveDate::parse_from_str(&format!("01 {}", label), "%d %B %Y")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// ONS 房價指數公報：英國平均房價
///
/// 任何失敗都回 200，`value` 為 null 並附上 `error`，前端只有一種渲染路徑。
pub struct HousePriceHandler {
    ctx: AppContext,
    values: Vec<Box<dyn ValueStrategy>>,
    periods: Vec<Box<dyn PeriodStrategy>>,
}

impl HousePriceHandler {
    pub fn new(ctx: AppContext) -> Result<Self> {
        Ok(Self::with_strategies(
            ctx,
            default_value_strategies()?,
            default_period_strategies()?,
        ))
    }

    pub fn with_strategies(
        ctx: AppContext,
        values: Vec<Box<dyn ValueStrategy>>,
        periods: Vec<Box<dyn PeriodStrategy>>,
    ) -> Self {
        Self {
            ctx,
            values,
            periods,
        }
    }

    pub fn extract_value(&self, text: &str) -> Option<f64> {
        let (value, strategy) = first_value(&self.values, text)?;
        tracing::debug!("ONS house price {} matched by strategy '{}'", value, strategy);
        Some(value)
    }

    pub fn extract_period_label(&self, text: &str) -> Option<String> {
        first_label(&self.periods, text)
    }

    pub fn build_envelope(
        &self,
        value: Option<f64>,
        label: Option<String>,
        error: Option<String>,
    ) -> HousePriceEnvelope {
        HousePriceEnvelope {
            value,
            unit: "gbp".to_string(),
            period: ReleasePeriod {
                start: label.as_deref().and_then(period_start),
                label,
            },
            change: None,
            source: SourceMeta {
                name: self.ctx.config.ons.source_name.clone(),
                url: self.ctx.config.ons.url.clone(),
            },
            error,
        }
    }
}

#[async_trait]
impl StatisticHandler for HousePriceHandler {
    fn name(&self) -> &'static str {
        "house-price"
    }

    async fn handle(&self, _query: &Query) -> HandlerResponse {
        let envelope = match self.ctx.fetcher.fetch_text(&self.ctx.config.ons.url).await {
            Ok(raw) => {
                let text = html_to_text(&raw);
                let value = self.extract_value(&text);
                let label = self.extract_period_label(&text);
                match value {
                    Some(v) => {
                        tracing::info!("✅ ONS average house price: £{}", v);
                        self.build_envelope(Some(v), label, None)
                    }
                    None => {
                        let miss = EtlError::Extraction {
                            message: EXTRACTION_MISS.to_string(),
                        };
                        tracing::warn!("⚠️ {} ({})", miss, miss.recovery_suggestion());
                        self.build_envelope(None, label, Some(miss.user_friendly_message()))
                    }
                }
            }
            Err(e) => {
                tracing::warn!("⚠️ ONS fetch failed, returning empty statistic: {}", e);
                self.build_envelope(None, None, Some(e.user_friendly_message()))
            }
        };

        respond_ok(&envelope, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::sources::SourcesConfig;

    fn handler() -> HousePriceHandler {
        HousePriceHandler::new(AppContext::new(SourcesConfig::default()).unwrap()).unwrap()
    }

    #[test]
    fn test_extracts_bulletin_phrasings() {
        let h = handler();
        assert_eq!(
            h.extract_value("The average UK house price was £270,000 in August 2025"),
            Some(270000.0)
        );
        assert_eq!(
            h.extract_value("The average house price in the UK was £268,450 in July 2025"),
            Some(268450.0)
        );
        assert_eq!(
            h.extract_value("UK average house prices increased by 2.8% to £271,000"),
            Some(271000.0)
        );
        assert_eq!(h.extract_value("House prices rose in most regions."), None);
    }

    #[test]
    fn test_period_label_prefers_month_after_figure() {
        let h = handler();
        let text =
            "Released 17 September 2025. The average UK house price was £270,000 in July 2025.";
        assert_eq!(h.extract_period_label(text), Some("July 2025".to_string()));
        assert_eq!(
            h.extract_period_label("Release date: september 2025"),
            Some("September 2025".to_string())
        );
        assert_eq!(h.extract_period_label("no date"), None);
    }

    #[test]
    fn test_period_start_from_label() {
        assert_eq!(period_start("August 2025"), Some("2025-08-01".to_string()));
        assert_eq!(period_start("Smarch 2025"), None);
    }

    #[test]
    fn test_envelope_shape() {
        let h = handler();
        let json = serde_json::to_value(h.build_envelope(
            Some(270000.0),
            Some("August 2025".to_string()),
            None,
        ))
        .unwrap();
        assert_eq!(json["value"], 270000);
        assert_eq!(json["unit"], "gbp");
        assert_eq!(json["period"]["start"], "2025-08-01");
        assert_eq!(json["period"]["label"], "August 2025");
        assert!(json["change"].is_null());
        assert_eq!(json["source"]["name"], "ONS House Price Index");
        assert!(json.get("error").is_none());
    }
}
