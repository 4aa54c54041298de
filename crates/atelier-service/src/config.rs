//! Service configuration.

use serde::Deserialize;
use std::path::Path;

use atelier_core::{
    EconomyPolicy, DEFAULT_MAX_TRANSACTION_ATTEMPTS, DEFAULT_OWNER_REWARD, DEFAULT_PURCHASE_COST,
    DEFAULT_STARTING_COINS,
};

/// Default Gemini model for the generation proxy.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to `RocksDB` data directory (default: "/data/atelier").
    pub data_dir: String,

    /// Expected JWT issuer (optional; not checked when unset).
    pub auth_issuer: Option<String>,

    /// Expected JWT audience (default: "atelier").
    pub auth_audience: String,

    /// HS256 secret for validating identity tokens.
    pub auth_jwt_secret: Option<String>,

    /// Midtrans server key (optional).
    pub midtrans_server_key: Option<String>,

    /// Midtrans client key, handed to the browser Snap embed.
    pub midtrans_client_key: Option<String>,

    /// Use the Midtrans production environment instead of the sandbox.
    pub midtrans_production: bool,

    /// Override for the Snap base URL.
    pub midtrans_snap_url: Option<String>,

    /// Gemini API key (optional).
    pub gemini_api_key: Option<String>,

    /// Gemini model name.
    pub gemini_model: String,

    /// Override for the Gemini API base URL.
    pub gemini_api_url: Option<String>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Coin costs, rewards and retry limits.
    pub policy: EconomyPolicy,
}

/// Midtrans secrets file structure.
#[derive(Debug, Deserialize)]
struct MidtransSecrets {
    server_key: String,
    #[serde(default)]
    client_key: Option<String>,
    #[serde(default)]
    production: bool,
}

/// Gemini secrets file structure.
#[derive(Debug, Deserialize)]
struct GeminiSecrets {
    api_key: String,
    #[serde(default)]
    model: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        let (midtrans_server_key, midtrans_client_key, midtrans_production) =
            load_midtrans_secrets();
        let (gemini_api_key, gemini_model) = load_gemini_secrets();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/atelier".into()),
            auth_issuer: std::env::var("AUTH_ISSUER").ok(),
            auth_audience: std::env::var("AUTH_AUDIENCE").unwrap_or_else(|_| "atelier".into()),
            auth_jwt_secret: std::env::var("AUTH_JWT_SECRET").ok(),
            midtrans_server_key,
            midtrans_client_key,
            midtrans_production,
            midtrans_snap_url: std::env::var("MIDTRANS_SNAP_URL").ok(),
            gemini_api_key,
            gemini_model: gemini_model.unwrap_or_else(|| DEFAULT_GEMINI_MODEL.into()),
            gemini_api_url: std::env::var("GEMINI_API_URL").ok(),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: env_parse("MAX_BODY_BYTES").unwrap_or(8 * 1024 * 1024), // 8MB, images ride inline
            request_timeout_seconds: env_parse("REQUEST_TIMEOUT_SECONDS").unwrap_or(60),
            policy: checked_policy(EconomyPolicy {
                purchase_cost: env_parse("PURCHASE_COST").unwrap_or(DEFAULT_PURCHASE_COST),
                owner_reward: env_parse("OWNER_REWARD").unwrap_or(DEFAULT_OWNER_REWARD),
                starting_coins: env_parse("STARTING_COINS").unwrap_or(DEFAULT_STARTING_COINS),
                max_transaction_attempts: env_parse("MAX_TRANSACTION_ATTEMPTS")
                    .unwrap_or(DEFAULT_MAX_TRANSACTION_ATTEMPTS),
            }),
        }
    }
}

/// Fall back to the default economy when the configured one is unsafe.
fn checked_policy(policy: EconomyPolicy) -> EconomyPolicy {
    match policy.validate() {
        Ok(()) => policy,
        Err(e) => {
            tracing::warn!(error = %e, ?policy, "Ignoring economy settings, using defaults");
            EconomyPolicy::default()
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

/// Load Midtrans secrets from file or environment.
fn load_midtrans_secrets() -> (Option<String>, Option<String>, bool) {
    let secret_paths = [
        ".secrets/midtrans.json",
        "atelier/.secrets/midtrans.json",
        "../.secrets/midtrans.json",
    ];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<MidtransSecrets>(path) {
            tracing::info!(path = %path, "Loaded Midtrans secrets from file");
            return (
                Some(secrets.server_key),
                secrets.client_key,
                secrets.production,
            );
        }
    }

    // Fall back to environment variables
    tracing::debug!("Midtrans secrets file not found, using environment variables");
    (
        std::env::var("MIDTRANS_SERVER_KEY").ok(),
        std::env::var("MIDTRANS_CLIENT_KEY").ok(),
        env_parse("MIDTRANS_PRODUCTION").unwrap_or(false),
    )
}

/// Load Gemini secrets from file or environment.
fn load_gemini_secrets() -> (Option<String>, Option<String>) {
    let secret_paths = [
        ".secrets/gemini.json",
        "atelier/.secrets/gemini.json",
        "../.secrets/gemini.json",
    ];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<GeminiSecrets>(path) {
            tracing::info!(path = %path, "Loaded Gemini secrets from file");
            return (Some(secrets.api_key), secrets.model);
        }
    }

    tracing::debug!("Gemini secrets file not found, using environment variables");
    (
        std::env::var("GEMINI_API_KEY").ok(),
        std::env::var("GEMINI_MODEL").ok(),
    )
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/atelier".into(),
            auth_issuer: None,
            auth_audience: "atelier".into(),
            auth_jwt_secret: None,
            midtrans_server_key: None,
            midtrans_client_key: None,
            midtrans_production: false,
            midtrans_snap_url: None,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.into(),
            gemini_api_url: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 8 * 1024 * 1024,
            request_timeout_seconds: 60,
            policy: EconomyPolicy::default(),
        }
    }
}
