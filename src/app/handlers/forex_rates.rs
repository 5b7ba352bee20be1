use crate::core::context::AppContext;
use crate::core::extract::{extract_base, extract_rates, lookup};
use crate::core::respond::{respond_error, respond_ok, HandlerResponse};
use crate::core::{Query, RatesEnvelope, StatisticHandler};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::validate_required_field;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use url::Url;

pub const PROVIDER: &str = "forexrateapi";

/// 查詢參數整理後的請求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatesRequest {
    pub base: String,
    pub currencies: String,
}

impl RatesRequest {
    /// 參數只做修剪與大寫，其餘原樣轉給供應商
    pub fn from_query(query: &Query, default_base: &str, default_currencies: &str) -> Self {
        let base = query
            .get("base")
            .map(|b| b.trim().to_uppercase())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| default_base.to_string());

        let currencies = query
            .get("currencies")
            .map(|c| {
                c.split(',')
                    .map(|code| code.trim().to_uppercase())
                    .filter(|code| !code.is_empty())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| default_currencies.to_string());

        Self { base, currencies }
    }

    pub fn upstream_url(&self, endpoint: &str, api_key: &str) -> Result<String> {
        let url = Url::parse_with_params(
            endpoint,
            &[
                ("api_key", api_key),
                ("base", self.base.as_str()),
                ("currencies", self.currencies.as_str()),
            ],
        )
        .map_err(|e| EtlError::InvalidConfigValueError {
            field: "forex.endpoint".to_string(),
            value: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        Ok(url.to_string())
    }
}

/// 上游日期：`timestamp`（Unix 秒）優先，其次 `date` 字串
pub fn payload_date(payload: &Value) -> Option<String> {
    let from_timestamp = lookup(payload, &["timestamp"])
        .or_else(|| lookup(payload, &["data", "timestamp"]))
        .and_then(Value::as_i64)
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true));

    from_timestamp.or_else(|| {
        lookup(payload, &["date"])
            .or_else(|| lookup(payload, &["data", "date"]))
            .and_then(Value::as_str)
            .map(|s| s.to_string())
    })
}

/// 將供應商回應正規化為 `{ base, date, rates, provider }`
pub fn normalise_rates(payload: &Value, requested_base: &str) -> Result<RatesEnvelope> {
    let (shape, rates) = extract_rates(payload)?;
    tracing::debug!("Rates payload matched shape {:?} ({} rates)", shape, rates.len());

    Ok(RatesEnvelope {
        base: extract_base(payload).unwrap_or_else(|| requested_base.to_string()),
        date: payload_date(payload)
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        rates,
        provider: PROVIDER.to_string(),
    })
}

pub struct ForexRatesHandler {
    ctx: AppContext,
}

impl ForexRatesHandler {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    async fn fetch_rates(&self, request: &RatesRequest) -> Result<RatesEnvelope> {
        let forex = &self.ctx.config.forex;
        let api_key = validate_required_field("forex.api_key", &forex.api_key).inspect_err(|_| {
            self.ctx.warnings.warn(
                "forex.api_key",
                "FOREXRATEAPI_KEY is not configured; the rates endpoint will answer 500",
            );
        })?;

        let url = request.upstream_url(&forex.endpoint, api_key)?;
        let raw = self.ctx.fetcher.fetch_text(&url).await?;
        let payload: Value = serde_json::from_str(&raw)?;
        normalise_rates(&payload, &request.base)
    }
}

#[async_trait]
impl StatisticHandler for ForexRatesHandler {
    fn name(&self) -> &'static str {
        "rates"
    }

    async fn handle(&self, query: &Query) -> HandlerResponse {
        let forex = &self.ctx.config.forex;
        let request =
            RatesRequest::from_query(query, &forex.default_base, &forex.default_currencies);

        match self.fetch_rates(&request).await {
            Ok(envelope) => {
                tracing::info!(
                    "✅ {} rates for base {} ({})",
                    envelope.rates.len(),
                    envelope.base,
                    envelope.date
                );
                respond_ok(&envelope, Some(forex.cache_policy()))
            }
            Err(e) => {
                tracing::error!("❌ Forex rates failed: {} ({:?})", e, e.category());
                respond_error(&e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query(pairs: &[(&str, &str)]) -> Query {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_request_defaults() {
        let request = RatesRequest::from_query(&Query::new(), "GBP", "USD,EUR");
        assert_eq!(request.base, "GBP");
        assert_eq!(request.currencies, "USD,EUR");
    }

    #[test]
    fn test_request_normalises_query() {
        let request = RatesRequest::from_query(
            &query(&[("base", " usd "), ("currencies", "eur, jpy,,gbp")]),
            "GBP",
            "USD,EUR",
        );
        assert_eq!(request.base, "USD");
        assert_eq!(request.currencies, "EUR,JPY,GBP");

        let blank =
            RatesRequest::from_query(&query(&[("base", "  "), ("currencies", ",")]), "GBP", "USD");
        assert_eq!(blank.base, "GBP");
        assert_eq!(blank.currencies, "USD");
    }

    #[test]
    fn test_upstream_url_encodes_params() {
        let request = RatesRequest {
            base: "GBP".to_string(),
            currencies: "USD,EUR".to_string(),
        };
        let url = request
            .upstream_url("https://api.forexrateapi.com/v1/latest", "k&y")
            .unwrap();
        assert_eq!(
            url,
            "https://api.forexrateapi.com/v1/latest?api_key=k%26y&base=GBP&currencies=USD%2CEUR"
        );
        assert!(request.upstream_url("not a url", "key").is_err());
    }

    #[test]
    fn test_payload_date_sources() {
        assert_eq!(
            payload_date(&json!({"timestamp": 1_760_486_400})),
            Some("2025-10-15T00:00:00Z".to_string())
        );
        assert_eq!(
            payload_date(&json!({"date": "2025-10-15"})),
            Some("2025-10-15".to_string())
        );
        assert_eq!(payload_date(&json!({"rates": {}})), None);
    }

    #[test]
    fn test_normalise_example_payload() {
        let payload = json!({"base": "GBP", "timestamp": 1_760_486_400, "rates": {"USD": 1.27}});
        let envelope = normalise_rates(&payload, "EUR").unwrap();
        assert_eq!(envelope.base, "GBP");
        assert_eq!(envelope.provider, "forexrateapi");
        assert_eq!(envelope.rates.get("USD"), Some(&1.27));
        assert_eq!(
            serde_json::to_string(&envelope).unwrap(),
            r#"{"base":"GBP","date":"2025-10-15T00:00:00Z","rates":{"USD":1.27},"provider":"forexrateapi"}"#
        );
    }

    #[test]
    fn test_normalise_falls_back_to_requested_base_and_now() {
        let envelope = normalise_rates(&json!({"conversion_rates": {"EUR": 1.17}}), "GBP").unwrap();
        assert_eq!(envelope.base, "GBP");
        assert!(DateTime::parse_from_rfc3339(&envelope.date).is_ok());
    }
}
