use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// 數值的有效期間
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Period {
    pub label: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl Period {
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            start: None,
            end: None,
        }
    }
}

/// 單一時間點的統計數值
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticEnvelope {
    pub id: String,
    pub title: String,
    #[serde(serialize_with = "serialize_figure")]
    pub value: Option<f64>,
    pub unit: String,
    pub period: Option<Period>,
    #[serde(serialize_with = "serialize_figure")]
    pub change: Option<f64>,
}

/// `{ "stat": ... }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatBody {
    pub stat: StatisticEnvelope,
}

/// 房價公報的期間：只有起始日與標籤
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleasePeriod {
    pub start: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceMeta {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HousePriceEnvelope {
    #[serde(serialize_with = "serialize_figure")]
    pub value: Option<f64>,
    pub unit: String,
    pub period: ReleasePeriod,
    #[serde(serialize_with = "serialize_figure")]
    pub change: Option<f64>,
    pub source: SourceMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatesEnvelope {
    pub base: String,
    pub date: String,
    #[serde(serialize_with = "serialize_rates")]
    pub rates: BTreeMap<String, f64>,
    pub provider: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status: None,
            detail: None,
        }
    }
}

// 2^53：超過此值 f64 無法精確表示整數
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// 有限整數輸出為 JSON 整數（1755 而非 1755.0），NaN / inf 一律輸出 null
pub fn serialize_figure<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) if v.is_finite() => {
            if v.fract() == 0.0 && v.abs() < MAX_EXACT_INTEGER {
                serializer.serialize_i64(*v as i64)
            } else {
                serializer.serialize_f64(*v)
            }
        }
        _ => serializer.serialize_none(),
    }
}

struct Figure(f64);

impl Serialize for Figure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_figure(&Some(self.0), serializer)
    }
}

/// 匯率表的每個值套用與 `serialize_figure` 相同的規則
pub fn serialize_rates<S: Serializer>(
    rates: &BTreeMap<String, f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(rates.iter().map(|(code, rate)| (code, Figure(*rate))))
}
