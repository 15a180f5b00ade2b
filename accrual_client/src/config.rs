use std::time::Duration;

use log::*;
use loyalty_common::helpers::parse_number;

const DEFAULT_ACCRUAL_ADDRESS: &str = "http://127.0.0.1:8081";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RETRY_DELAY_SECS: u64 = 5;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_COOLDOWN_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct AccrualConfig {
    /// Base address of the accrual authority, e.g. `http://accrual:8080`. A trailing slash is ignored.
    pub base_url: String,
    /// Timeout for a single HTTP exchange.
    pub timeout: Duration,
    /// How long to wait before retrying after a transport failure.
    pub retry_delay: Duration,
    /// Number of attempts made for one query before giving up with [`crate::AccrualApiError::Unavailable`].
    pub max_attempts: u32,
    /// Cooldown applied when a 429 response carries no usable `Retry-After` header.
    pub default_cooldown: Duration,
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ACCRUAL_ADDRESS.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            default_cooldown: Duration::from_secs(DEFAULT_COOLDOWN_SECS),
        }
    }
}

impl AccrualConfig {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self { base_url: base_url.into(), ..Default::default() }
    }

    pub fn new_from_env_or_default() -> Self {
        let default = Self::default();
        let base_url = std::env::var("LPS_ACCRUAL_SYSTEM_ADDRESS").unwrap_or_else(|_| {
            warn!("🪛️ LPS_ACCRUAL_SYSTEM_ADDRESS not set, using {DEFAULT_ACCRUAL_ADDRESS} as default");
            DEFAULT_ACCRUAL_ADDRESS.to_string()
        });
        let timeout = env_number("LPS_ACCRUAL_TIMEOUT_SECS").map(Duration::from_secs).unwrap_or(default.timeout);
        let retry_delay =
            env_number("LPS_ACCRUAL_RETRY_DELAY_SECS").map(Duration::from_secs).unwrap_or(default.retry_delay);
        let max_attempts = env_number::<u32>("LPS_ACCRUAL_MAX_ATTEMPTS").unwrap_or(default.max_attempts).max(1);
        let default_cooldown =
            env_number("LPS_ACCRUAL_DEFAULT_COOLDOWN_SECS").map(Duration::from_secs).unwrap_or(default.default_cooldown);
        Self { base_url, timeout, retry_delay, max_attempts, default_cooldown }
    }
}

fn env_number<T>(var: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match parse_number::<T>(std::env::var(var).ok()) {
        Ok(v) => v,
        Err(e) => {
            warn!("🪛️ Ignoring {var}. {e}");
            None
        },
    }
}
