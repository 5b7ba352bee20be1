use crate::core::context::AppContext;
use crate::core::extract::{
    first_label, first_value, title_case, RegexPeriodStrategy, RegexValueStrategy, MONTHS,
};
use crate::core::respond::{respond_error, respond_ok, HandlerResponse};
use crate::core::{
    Period, PeriodStrategy, Query, StatBody, StatisticEnvelope, StatisticHandler, ValueStrategy,
};
use crate::utils::error::Result;
use crate::utils::html::html_to_text;
use async_trait::async_trait;
use regex::Captures;

pub const OFGEM_CAP_ID: &str = "ofgemCap";
pub const OFGEM_CAP_TITLE: &str = "Energy price cap (typical household, per year)";
pub const DEFAULT_PERIOD_LABEL: &str = "Current price cap period";

// 金額：£1,755 / £ 1755 / £1,755.32
const FIGURE: &str = r"£\s?(\d[\d,]*(?:\.\d+)?)";

// 1 October (2025) to 31 December 2025
const DATE_RANGE: &str = r"(?i)\b(\d{1,2})\s+({m})(?:\s+(\d{4}))?\s*(?:to|until|-|–|—)\s*(\d{1,2})\s+({m})\s+(\d{4})\b";

pub fn default_value_strategies() -> Result<Vec<Box<dyn ValueStrategy>>> {
    Ok(vec![
        Box::new(RegexValueStrategy::new(
            "figure-per-year",
            &format!(r"(?i){}\s*per\s+year", FIGURE),
        )?),
        Box::new(RegexValueStrategy::new(
            "figure-a-year",
            &format!(r"(?i){}\s*a\s+year", FIGURE),
        )?),
        Box::new(RegexValueStrategy::new(
            "figure-then-typical",
            &format!(r"(?i){}[^£]{{0,60}}?\btypical\b", FIGURE),
        )?),
        Box::new(RegexValueStrategy::new(
            "typical-then-figure",
            &format!(r"(?i)\btypical\b[^£]{{0,120}}?{}", FIGURE),
        )?),
    ])
}

pub fn default_period_strategies() -> Result<Vec<Box<dyn PeriodStrategy>>> {
    Ok(vec![
        Box::new(RegexPeriodStrategy::new(
            "date-range",
            &DATE_RANGE.replace("{m}", MONTHS),
            render_date_range,
        )?),
        Box::new(RegexPeriodStrategy::new(
            "from-date",
            &format!(r"(?i)\bfrom\s+(\d{{1,2}})\s+({})\s+(\d{{4}})\b", MONTHS),
            |caps| {
                Some(format!(
                    "From {} {} {}",
                    &caps[1],
                    title_case(&caps[2]),
                    &caps[3]
                ))
            },
        )?),
    ])
}

/// "1 October to 31 December 2025" -> "1 October – 31 December 2025"
fn render_date_range(caps: &Captures<'_>) -> Option<String> {
    let start = match caps.get(3) {
        Some(year) => format!("{} {} {}", &caps[1], title_case(&caps[2]), year.as_str()),
        None => format!("{} {}", &caps[1], title_case(&caps[2])),
    };
    Some(format!(
        "{} – {} {} {}",
        start,
        &caps[4],
        title_case(&caps[5]),
        &caps[6]
    ))
}

/// Ofgem 能源價格上限：典型家庭每年帳單
pub struct OfgemCapHandler {
    ctx: AppContext,
    values: Vec<Box<dyn ValueStrategy>>,
    periods: Vec<Box<dyn PeriodStrategy>>,
}

impl OfgemCapHandler {
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
        tracing::debug!("Ofgem cap {} matched by strategy '{}'", value, strategy);
        Some(value)
    }

    pub fn extract_period_label(&self, text: &str) -> Option<String> {
        first_label(&self.periods, text)
    }

    pub fn build_envelope(value: Option<f64>, label: Option<String>) -> StatBody {
        StatBody {
            stat: StatisticEnvelope {
                id: OFGEM_CAP_ID.to_string(),
                title: OFGEM_CAP_TITLE.to_string(),
                value,
                unit: "gbp".to_string(),
                period: Some(Period::labelled(
                    label.unwrap_or_else(|| DEFAULT_PERIOD_LABEL.to_string()),
                )),
                change: None,
            },
        }
    }
}

#[async_trait]
impl StatisticHandler for OfgemCapHandler {
    fn name(&self) -> &'static str {
        "ofgem-cap"
    }

    async fn handle(&self, _query: &Query) -> HandlerResponse {
        let raw = match self.ctx.fetcher.fetch_text(&self.ctx.config.ofgem.url).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!("❌ Ofgem fetch failed: {}", e);
                return respond_error(&e);
            }
        };

        let text = html_to_text(&raw);
        let value = self.extract_value(&text);
        let label = self.extract_period_label(&text);
        if label.is_none() {
            self.ctx.warnings.warn(
                "ofgem.period",
                "Ofgem page has no recognisable date range; using the generic period label",
            );
        }

        let body = Self::build_envelope(value, label);
        match value {
            Some(v) => {
                tracing::info!("✅ Ofgem price cap: £{}", v);
                respond_ok(&body, Some(self.ctx.config.ofgem.cache_policy()))
            }
            None => {
                // 擷取失敗的結果不進邊緣快取
                tracing::warn!("⚠️ Ofgem page matched no extraction strategy");
                respond_ok(&body, None)
            }
        }
    }
}
