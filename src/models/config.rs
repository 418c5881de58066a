//! Configuration model loaded from external sources.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize)]
/// Settings of the bill desk web application.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub templates_dir: String,
    /// Key material for signed flash-message cookies; at least 64 bytes.
    pub secret: String,
    /// Base URL of the bill store, e.g. `http://127.0.0.1:5000/`.
    pub api_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    pub letterhead: Letterhead,
    pub store: StoreConfig,
}

#[derive(Clone, Debug, Deserialize)]
/// Settings of the mock REST bill store.
pub struct StoreConfig {
    pub address: String,
    pub port: u16,
    pub database_url: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
/// Business details printed at the top of every bill.
pub struct Letterhead {
    pub business_name: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub phones: Vec<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub logo: Option<String>,
}

fn default_request_timeout_secs() -> u64 {
    10
}
