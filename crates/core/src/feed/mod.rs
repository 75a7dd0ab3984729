//! Feed model: the fixed category set, typed payloads and the source trait.

mod error;
mod traits;
mod types;

pub use error::FetchFailure;
pub use traits::FeedSource;
pub use types::{
    AlertEntry, CurrentConditions, DailyForecast, DailyPeriod, FeedCategory, FeedPayload,
    ForecastText, HeadlineEntry, HourlyCurve, HourlyPoint, LatestObservations, RadarImage,
    RegionalMap, Staleness, StationReading, TextForecast,
};
