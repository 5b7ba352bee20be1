pub mod forex_rates;
pub mod house_price;
pub mod ofgem_cap;

use crate::core::context::AppContext;
use crate::core::StatisticHandler;
use crate::utils::error::{EtlError, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use forex_rates::ForexRatesHandler;
pub use house_price::HousePriceHandler;
pub use ofgem_cap::OfgemCapHandler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    OfgemCap,
    HousePrice,
    ForexRates,
}

impl Endpoint {
    pub const ALL: [Endpoint; 3] = [Endpoint::OfgemCap, Endpoint::HousePrice, Endpoint::ForexRates];

    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::OfgemCap => "ofgem-cap",
            Endpoint::HousePrice => "house-price",
            Endpoint::ForexRates => "rates",
        }
    }

    pub fn route(&self) -> &'static str {
        match self {
            Endpoint::OfgemCap => "/api/ofgem-cap",
            Endpoint::HousePrice => "/api/house-price",
            Endpoint::ForexRates => "/api/rates",
        }
    }

    /// 接受端點名稱或路由路徑（Lambda 事件只給得出其中之一）
    pub fn from_path(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        Self::ALL
            .into_iter()
            .find(|e| e.route() == trimmed || e.name() == trimmed)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Endpoint {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_path(s).ok_or_else(|| EtlError::InvalidConfigValueError {
            field: "endpoint".to_string(),
            value: s.to_string(),
            reason: "expected one of: ofgem-cap, house-price, rates".to_string(),
        })
    }
}

/// 三個互相獨立的 handler，啟動時建立一次
#[derive(Clone)]
pub struct HandlerSet {
    pub ofgem_cap: Arc<OfgemCapHandler>,
    pub house_price: Arc<HousePriceHandler>,
    pub forex_rates: Arc<ForexRatesHandler>,
}

impl HandlerSet {
    pub fn new(ctx: AppContext) -> Result<Self> {
        Ok(Self {
            ofgem_cap: Arc::new(OfgemCapHandler::new(ctx.clone())?),
            house_price: Arc::new(HousePriceHandler::new(ctx.clone())?),
            forex_rates: Arc::new(ForexRatesHandler::new(ctx)),
        })
    }

    pub fn get(&self, endpoint: Endpoint) -> Arc<dyn StatisticHandler> {
        match endpoint {
            Endpoint::OfgemCap => self.ofgem_cap.clone(),
            Endpoint::HousePrice => self.house_price.clone(),
            Endpoint::ForexRates => self.forex_rates.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::sources::SourcesConfig;

    #[test]
    fn test_endpoint_lookup() {
        assert_eq!(Endpoint::from_path("/api/rates"), Some(Endpoint::ForexRates));
        assert_eq!(Endpoint::from_path("/api/ofgem-cap/"), Some(Endpoint::OfgemCap));
        assert_eq!(Endpoint::from_path("house-price"), Some(Endpoint::HousePrice));
        assert_eq!(Endpoint::from_path("/api/unknown"), None);
        assert!("nope".parse::<Endpoint>().is_err());
    }

    #[test]
    fn test_handler_set_names_match_endpoints() {
        let set = HandlerSet::new(AppContext::new(SourcesConfig::default()).unwrap()).unwrap();
        for endpoint in Endpoint::ALL {
            assert_eq!(set.get(endpoint).name(), endpoint.name());
        }
    }
}
