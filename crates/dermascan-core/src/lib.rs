pub mod app_config;
pub mod config;
pub mod display;
pub mod geo;
pub mod provider;

pub use app_config::ClientConfig;
pub use config::{load_client_config, load_client_config_from_env};
pub use display::{format_distance, maps_uri};
pub use geo::{distance_meters, Coordinate, GeoError};
pub use provider::ProviderRecord;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
