use reqwest::Url;

/// Runtime configuration for the network-facing client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Classification endpoint receiving the multipart image upload.
    pub predict_url: Url,
    /// Overpass interpreter endpoint receiving the spatial query.
    pub directory_url: Url,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub log_level: String,
}
