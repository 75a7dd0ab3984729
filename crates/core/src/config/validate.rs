use super::{types::Config, ConfigError};
use crate::feed::FeedCategory;
use crate::rotator::{Panel, MAX_DWELL};

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(msg.into())
}

/// Validate configuration
/// Currently validates:
/// - Station section exists (enforced by serde) with coordinates in range
/// - Server port is not 0
/// - Every feed refreshes and times out after a positive interval, and ages
///   no later than it goes stale
/// - Retry, rotation, ticker and display timings are usable
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    // Station validation
    let station = &config.station;
    if !(-90.0..=90.0).contains(&station.latitude) {
        return Err(invalid(format!(
            "station.latitude must be within -90..=90, got {}",
            station.latitude
        )));
    }
    if !(-180.0..=180.0).contains(&station.longitude) {
        return Err(invalid(format!(
            "station.longitude must be within -180..=180, got {}",
            station.longitude
        )));
    }
    if station.user_agent.trim().is_empty() {
        return Err(invalid("station.user_agent cannot be empty"));
    }

    // Feed validation
    for category in FeedCategory::ALL {
        let settings = config.feeds.settings(category);
        if settings.refresh_interval_secs == 0 {
            return Err(invalid(format!(
                "feeds.{}.refresh_interval_secs must be greater than 0",
                category
            )));
        }
        if settings.fetch_timeout_secs == 0 {
            return Err(invalid(format!(
                "feeds.{}.fetch_timeout_secs must be greater than 0",
                category
            )));
        }
        if settings.aging_after_secs > settings.stale_after_secs {
            return Err(invalid(format!(
                "feeds.{}.aging_after_secs ({}) cannot exceed stale_after_secs ({})",
                category, settings.aging_after_secs, settings.stale_after_secs
            )));
        }
    }

    // Retry validation
    let retry = &config.retry;
    if !retry.multiplier.is_finite() || retry.multiplier < 1.0 {
        return Err(invalid("retry.multiplier must be at least 1.0"));
    }
    if !(0.0..=1.0).contains(&retry.jitter) {
        return Err(invalid("retry.jitter must be within 0.0..=1.0"));
    }
    if retry.max_backoff_ms == 0 {
        return Err(invalid("retry.max_backoff_ms must be greater than 0"));
    }
    if retry.initial_backoff_ms > retry.max_backoff_ms {
        return Err(invalid(
            "retry.initial_backoff_ms cannot exceed retry.max_backoff_ms",
        ));
    }

    // Rotation validation
    for panel in Panel::ORDER {
        let dwell = config.rotation.dwell_secs_for(panel);
        if !dwell.is_finite() || dwell <= 0.0 {
            return Err(invalid(format!(
                "rotation dwell for {} must be greater than 0",
                panel
            )));
        }
        if dwell > MAX_DWELL.as_secs_f64() {
            return Err(invalid(format!(
                "rotation dwell for {} cannot exceed {} seconds, got {}",
                panel,
                MAX_DWELL.as_secs(),
                dwell
            )));
        }
    }

    // Ticker validation
    let ticker = &config.ticker;
    if !ticker.scroll_rate.is_finite() || ticker.scroll_rate <= 0.0 {
        return Err(invalid("ticker.scroll_rate must be greater than 0"));
    }
    if ticker.idle_message.trim().is_empty() {
        return Err(invalid("ticker.idle_message cannot be empty"));
    }
    if ticker.visible_width == 0 {
        return Err(invalid("ticker.visible_width must be greater than 0"));
    }

    // Display validation
    if config.display.render_interval_ms == 0 {
        return Err(invalid("display.render_interval_ms must be greater than 0"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config_from_str, FeedOverride};

    fn valid_config() -> Config {
        load_config_from_str(
            r#"
[station]
latitude = 29.735
longitude = -94.977
"#,
        )
        .unwrap()
    }

    fn assert_invalid(config: &Config) {
        let result = validate_config(config);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = valid_config();
        config.server.port = 0;
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_latitude_out_of_range() {
        let mut config = valid_config();
        config.station.latitude = 91.0;
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_aging_after_stale_fails() {
        let mut config = valid_config();
        config.feeds.radar = Some(FeedOverride {
            aging_after_secs: Some(900),
            stale_after_secs: Some(600),
            ..Default::default()
        });
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("feeds.radar"));
    }

    #[test]
    fn test_validate_zero_refresh_interval_fails() {
        let mut config = valid_config();
        config.feeds.alerts = Some(FeedOverride {
            refresh_interval_secs: Some(0),
            ..Default::default()
        });
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_zero_dwell_fails() {
        let mut config = valid_config();
        config.rotation.dwell_secs.radar = Some(0.0);
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_huge_dwell_fails() {
        let mut config = valid_config();
        config.rotation.default_dwell_secs = 1e30;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("cannot exceed"));

        let mut config = valid_config();
        config.rotation.dwell_secs.text_forecast = Some(3601.0);
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_ticker_settings() {
        let mut config = valid_config();
        config.ticker.scroll_rate = 0.0;
        assert_invalid(&config);

        let mut config = valid_config();
        config.ticker.idle_message = "   ".to_string();
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_retry_settings() {
        let mut config = valid_config();
        config.retry.multiplier = 0.5;
        assert_invalid(&config);

        let mut config = valid_config();
        config.retry.jitter = 1.5;
        assert_invalid(&config);

        let mut config = valid_config();
        config.retry.initial_backoff_ms = config.retry.max_backoff_ms + 1;
        assert_invalid(&config);
    }
}
