use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// ✅ Global Config stored in `OnceLock`
static CONFIG: OnceLock<Arc<Config>> = OnceLock::new();

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub page_size: usize,
    pub debounce_window: Duration,
    pub session_dir: PathBuf,
}

impl Config {
    /// ✅ Load environment variables and set defaults
    pub fn from_env() -> Self {
        dotenv().ok(); // Load .env only once

        Self {
            api_base_url: env::var("GATEPASS_API_URL").expect("GATEPASS_API_URL must be set"),
            request_timeout: Duration::from_secs(
                env::var("GATEPASS_REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .unwrap_or(30),
            ),
            page_size: env::var("GATEPASS_PAGE_SIZE")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .unwrap_or(20),
            debounce_window: Duration::from_millis(
                env::var("GATEPASS_DEBOUNCE_MS")
                    .unwrap_or_else(|_| "500".to_string())
                    .parse()
                    .unwrap_or(500),
            ),
            session_dir: PathBuf::from(
                env::var("GATEPASS_SESSION_DIR").unwrap_or_else(|_| ".gatepass".to_string()),
            ),
        }
    }

    /// ✅ Initialize the global config
    pub fn init() {
        CONFIG
            .set(Arc::new(Self::from_env()))
            .expect("Config already initialized");
    }

    /// ✅ Safe access to Config
    pub fn get() -> Arc<Config> {
        CONFIG.get().expect("Config not initialized").clone()
    }
}
