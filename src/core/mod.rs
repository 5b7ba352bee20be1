pub mod context;
pub mod extract;
pub mod fetch;
pub mod respond;

pub use crate::domain::model::{
    ErrorEnvelope, HousePriceEnvelope, Period, RatesEnvelope, ReleasePeriod, SourceMeta,
    StatBody, StatisticEnvelope,
};
pub use crate::domain::ports::{Fetcher, PeriodStrategy, Query, StatisticHandler, ValueStrategy};
pub use crate::utils::error::Result;
