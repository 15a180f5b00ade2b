use std::{env, time::Duration};

use accrual_client::AccrualConfig;
use log::*;
use loyalty_common::{helpers::parse_number, Secret};
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::accrual_worker::WorkerConfig;

const DEFAULT_LPS_HOST: &str = "127.0.0.1";
const DEFAULT_LPS_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/loyalty.db";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_IDLE_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_PASS_INTERVAL: Duration = Duration::from_millis(1000);
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub auth: AuthConfig,
    /// How to reach the accrual system, and how hard to try.
    pub accrual: AccrualConfig,
    /// Pacing of the reconciliation worker.
    pub worker: WorkerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_LPS_HOST.to_string(),
            port: DEFAULT_LPS_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            auth: AuthConfig::default(),
            accrual: AccrualConfig::default(),
            worker: WorkerConfig::default(),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { idle_interval: DEFAULT_IDLE_INTERVAL, pass_interval: DEFAULT_PASS_INTERVAL }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("LPS_HOST").ok().unwrap_or_else(|| DEFAULT_LPS_HOST.into());
        let port = env_number("LPS_PORT").unwrap_or(DEFAULT_LPS_PORT);
        let database_url = env::var("LPS_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ LPS_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let db_max_connections = env_number("LPS_DB_MAX_CONNECTIONS").unwrap_or(DEFAULT_DB_MAX_CONNECTIONS).max(1);
        let auth = AuthConfig::try_from_env().unwrap_or_else(|| {
            warn!("🪛️ LPS_JWT_SECRET is not set. Reverting to the default configuration.");
            AuthConfig::default()
        });
        let accrual = AccrualConfig::new_from_env_or_default();
        let worker = WorkerConfig {
            idle_interval: env_number("LPS_WORKER_IDLE_INTERVAL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_IDLE_INTERVAL),
            pass_interval: env_number("LPS_WORKER_PASS_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_PASS_INTERVAL),
        };
        Self { host, port, database_url, db_max_connections, auth, accrual, worker }
    }
}

fn env_number<T>(var: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    parse_number::<T>(env::var(var).ok()).unwrap_or_else(|e| {
        error!("🪛️ {e} Ignoring {var} and using the default instead.");
        None
    })
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HMAC secret used to sign and verify session JWTs (HS256).
    pub jwt_secret: Secret<String>,
    /// Lifetime of tokens minted by [`crate::auth::TokenIssuer`].
    pub token_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. DO NOT operate on \
             production like this since every session token will be invalidated when the server restarts. 🚨️🚨️🚨️"
        );
        let secret = thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect::<String>();
        Self { jwt_secret: Secret::new(secret), token_ttl: DEFAULT_TOKEN_TTL }
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self { jwt_secret: Secret::new(secret.into()), token_ttl: DEFAULT_TOKEN_TTL }
    }

    /// Returns `None` if `LPS_JWT_SECRET` is not set or is empty.
    pub fn try_from_env() -> Option<Self> {
        let secret = env::var("LPS_JWT_SECRET").ok().filter(|s| !s.trim().is_empty())?;
        let token_ttl = env_number("LPS_JWT_TTL_SECS").map(Duration::from_secs).unwrap_or(DEFAULT_TOKEN_TTL);
        Some(Self { jwt_secret: Secret::new(secret), token_ttl })
    }
}
