use reqwest::Url;

use crate::app_config::ClientConfig;
use crate::ConfigError;

pub const DEFAULT_PREDICT_URL: &str = "http://10.0.2.2:5000/predict";
pub const DEFAULT_DIRECTORY_URL: &str = "https://overpass-api.de/api/interpreter";

/// Load client configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_client_config() -> Result<ClientConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_client_config_from_env()
}

/// Load client configuration from environment variables already in the process.
///
/// Unlike [`load_client_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_client_config_from_env() -> Result<ClientConfig, ConfigError> {
    build_client_config(|key| std::env::var(key))
}

/// Build client configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a
/// `HashMap` instead of `set_var`/`remove_var`.
fn build_client_config<F>(lookup: F) -> Result<ClientConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_url = |var: &str, default: &str| -> Result<Url, ConfigError> {
        let raw = or_default(var, default);
        validate_http_url(var, raw.trim())
    };

    let predict_url = parse_url("DERMASCAN_PREDICT_URL", DEFAULT_PREDICT_URL)?;
    let directory_url = parse_url("DERMASCAN_DIRECTORY_URL", DEFAULT_DIRECTORY_URL)?;
    let request_timeout_secs = parse_u64("DERMASCAN_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("DERMASCAN_USER_AGENT", "dermascan/0.1 (skin-check)");
    let log_level = or_default("DERMASCAN_LOG_LEVEL", "info");

    Ok(ClientConfig {
        predict_url,
        directory_url,
        request_timeout_secs,
        user_agent,
        log_level,
    })
}

/// Accept only absolute `http`/`https` URLs with a non-empty host.
fn validate_http_url(var: &str, raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(format!("'{raw}' is not a valid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("'{raw}' must use http or https")));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid(format!("'{raw}' has no host")));
    }

    Ok(url)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
