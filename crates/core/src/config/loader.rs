//! Config file discovery and layering.
//!
//! The TOML file is the base layer. `WEATHARR_`-prefixed environment
//! variables override it, with `__` between nested keys:
//! `WEATHARR_STATION__LATITUDE=30.1`,
//! `WEATHARR_FEEDS__RADAR__REFRESH_INTERVAL_SECS=60`.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};

use super::{types::Config, ConfigError};

/// Environment variable naming the config file.
pub const CONFIG_PATH_VAR: &str = "WEATHARR_CONFIG";

/// Used when neither a path nor [`CONFIG_PATH_VAR`] is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

const ENV_PREFIX: &str = "WEATHARR_";

/// Config file to read: `explicit` if given, else `$WEATHARR_CONFIG`, else
/// `config.toml` in the working directory.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn layered(path: &Path) -> Figment {
    Figment::new().merge(Toml::file(path)).merge(
        Env::prefixed(ENV_PREFIX)
            // The path variable shares the prefix but is not a setting.
            .ignore(&["config"])
            .split("__"),
    )
}

/// Load `path` with environment overrides applied. Nothing is validated
/// here; see [`super::validate_config`].
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    layered(path)
        .extract()
        .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
}

/// Parse a TOML document on its own, without environment overrides.
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
