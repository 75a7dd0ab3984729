//! Concrete feed sources: api.weather.gov for the panels and alerts, RSS/Atom
//! for headlines.

mod cities;
mod error;
mod nws;
mod nws_feeds;
mod rss;

use std::sync::Arc;

pub use cities::{canonical_city_name, major_cities_near, regional_readings, CityTarget};
pub use error::NwsError;
pub use nws::{NwsClient, NwsConfig, PointUrls};
pub use nws_feeds::{compass_point, speed_mph, temperature_f, NwsFeedSource};
pub use rss::{dedupe_headlines, parse_feed, RssHeadlineSource};

use crate::config::Config;
use crate::feed::{FeedCategory, FeedSource};

/// Build one source per feed category from configuration. The NWS sources
/// share a client, so the points lookup happens once.
pub fn build_sources(config: &Config) -> Result<Vec<Arc<dyn FeedSource>>, NwsError> {
    let station = &config.station;
    let client = Arc::new(NwsClient::new(NwsConfig::from(station))?);

    let mut sources: Vec<Arc<dyn FeedSource>> = FeedCategory::ALL
        .iter()
        .copied()
        .filter(|c| *c != FeedCategory::Headlines)
        .map(|category| {
            Arc::new(NwsFeedSource::new(
                Arc::clone(&client),
                category,
                station.station_limit,
                station.regional_station_limit,
            )) as Arc<dyn FeedSource>
        })
        .collect();

    sources.push(Arc::new(RssHeadlineSource::new(
        config.headlines.rss_urls.clone(),
        config.headlines.max_items_per_feed,
        &station.user_agent,
        config
            .feeds
            .settings(FeedCategory::Headlines)
            .fetch_timeout(),
    )?));

    Ok(sources)
}
