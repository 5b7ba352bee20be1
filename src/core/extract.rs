use crate::core::{PeriodStrategy, ValueStrategy};
use crate::utils::error::{EtlError, Result};
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::BTreeMap;

/// 英文月份名稱（正規表達式片段）
pub const MONTHS: &str =
    "January|February|March|April|May|June|July|August|September|October|November|December";

/// 去掉千分位與空白後解析數字；非有限值視為失敗
pub fn parse_figure(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// "OCTOBER" / "october" -> "October"
pub fn title_case(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 以第一個（或名為 `figure` 的）擷取群組作為數值
pub struct RegexValueStrategy {
    name: String,
    pattern: Regex,
}

impl RegexValueStrategy {
    pub fn new(name: &str, pattern: &str) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            pattern: Regex::new(pattern)?,
        })
    }
}

impl ValueStrategy for RegexValueStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, text: &str) -> Option<f64> {
        self.pattern.captures_iter(text).find_map(|caps| {
            caps.name("figure")
                .or_else(|| caps.get(1))
                .and_then(|m| parse_figure(m.as_str()))
        })
    }
}

/// 比對成功後以 `render` 組出標籤
pub struct RegexPeriodStrategy {
    name: String,
    pattern: Regex,
    render: fn(&Captures<'_>) -> Option<String>,
}

impl RegexPeriodStrategy {
    pub fn new(
        name: &str,
        pattern: &str,
        render: fn(&Captures<'_>) -> Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            pattern: Regex::new(pattern)?,
            render,
        })
    }
}

impl PeriodStrategy for RegexPeriodStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, text: &str) -> Option<String> {
        self.pattern
            .captures_iter(text)
            .find_map(|caps| (self.render)(&caps))
    }
}

/// 依序嘗試，回傳第一個成功的數值與規則名稱
pub fn first_value<'a>(
    strategies: &'a [Box<dyn ValueStrategy>],
    text: &str,
) -> Option<(f64, &'a str)> {
    strategies
        .iter()
        .find_map(|s| s.extract(text).map(|v| (v, s.name())))
}

pub fn first_label(strategies: &[Box<dyn PeriodStrategy>], text: &str) -> Option<String> {
    strategies.iter().find_map(|s| {
        let label = s.extract(text)?;
        tracing::debug!("Period label matched by strategy '{}'", s.name());
        Some(label)
    })
}

/// 依路徑逐層查找 JSON 欄位
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |node, key| node.get(*key))
}

/// 匯率供應商已知的回應格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatesShape {
    /// `{ "rates": {...} }`
    TopLevel,
    /// `{ "data": { "rates": {...} } }`
    NestedData,
    /// `{ "conversion_rates": {...} }`
    ConversionRates,
}

impl RatesShape {
    /// 嘗試順序
    pub const ALL: [RatesShape; 3] = [
        RatesShape::TopLevel,
        RatesShape::NestedData,
        RatesShape::ConversionRates,
    ];

    pub fn key_path(&self) -> &'static [&'static str] {
        match self {
            RatesShape::TopLevel => &["rates"],
            RatesShape::NestedData => &["data", "rates"],
            RatesShape::ConversionRates => &["conversion_rates"],
        }
    }

    /// 物件存在即視為符合；非數值的項目直接略過
    pub fn extract(&self, payload: &Value) -> Option<BTreeMap<String, f64>> {
        let object = lookup(payload, self.key_path())?.as_object()?;
        Some(
            object
                .iter()
                .filter_map(|(code, rate)| {
                    rate.as_f64()
                        .filter(|r| r.is_finite())
                        .map(|r| (code.to_string(), r))
                })
                .collect(),
        )
    }
}

pub fn extract_rates(payload: &Value) -> Result<(RatesShape, BTreeMap<String, f64>)> {
    RatesShape::ALL
        .iter()
        .find_map(|shape| shape.extract(payload).map(|rates| (*shape, rates)))
        .ok_or_else(|| EtlError::PayloadShape {
            message: "no rates object under rates, data.rates or conversion_rates".to_string(),
        })
}

const BASE_PATHS: [&[&str]; 3] = [&["base"], &["data", "base"], &["base_code"]];

pub fn extract_base(payload: &Value) -> Option<String> {
    BASE_PATHS
        .iter()
        .find_map(|path| lookup(payload, path).and_then(Value::as_str))
        .map(|s| s.to_string())
}
