use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "SHAREGATE_LISTEN_ADDR";
pub const PUBLIC_ORIGIN_ENV: &str = "SHAREGATE_PUBLIC_ORIGIN";
pub const STORAGE_BACKEND_ENV: &str = "SHAREGATE_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "SHAREGATE_MYSQL_DSN";
pub const REDIS_URL_ENV: &str = "SHAREGATE_REDIS_URL";
pub const REDIS_KEY_PREFIX_ENV: &str = "SHAREGATE_REDIS_KEY_PREFIX";
pub const API_KEYS_ENV: &str = "SHAREGATE_API_KEYS";
pub const STORE_TIMEOUT_ENV: &str = "SHAREGATE_STORE_TIMEOUT_MS";
pub const MAX_TTL_ENV: &str = "SHAREGATE_MAX_TTL_SECONDS";
pub const MAX_SUBJECTS_ENV: &str = "SHAREGATE_MAX_SUBJECTS";
pub const SWEEP_INTERVAL_ENV: &str = "SHAREGATE_SWEEP_INTERVAL_SECONDS";
pub const SWEEP_RETENTION_ENV: &str = "SHAREGATE_SWEEP_RETENTION_SECONDS";
pub const LOG_FORMAT_ENV: &str = "SHAREGATE_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_PUBLIC_ORIGIN: &str = "http://127.0.0.1:8080";
pub const DEFAULT_REDIS_KEY_PREFIX: &str = "sg:";
/// Longest lifetime an operator may allow for a link, ten years.
pub const MAX_TTL_CEILING_SECONDS: u64 = 3_650 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
    #[value(name = "redis")]
    Redis,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
            StorageBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "sharegate", about = "Time-limited share links for assessment results")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Origin used to build capability URLs handed to owners.
    #[arg(long, env = PUBLIC_ORIGIN_ENV, default_value = DEFAULT_PUBLIC_ORIGIN)]
    pub public_origin: String,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    #[arg(long, env = REDIS_URL_ENV, required_if_eq("storage", "redis"))]
    pub redis_url: Option<String>,

    #[arg(long, env = REDIS_KEY_PREFIX_ENV, default_value = DEFAULT_REDIS_KEY_PREFIX)]
    pub redis_key_prefix: String,

    /// Owner API keys as comma separated `owner:key` pairs.
    #[arg(long, env = API_KEYS_ENV, value_delimiter = ',', hide_env_values = true)]
    pub api_keys: Vec<String>,

    #[arg(long, env = STORE_TIMEOUT_ENV, default_value_t = 2_000)]
    pub store_timeout_ms: u64,

    #[arg(
        long,
        env = MAX_TTL_ENV,
        default_value_t = 90 * 24 * 60 * 60,
        value_parser = clap::value_parser!(u64).range(1..=MAX_TTL_CEILING_SECONDS)
    )]
    pub max_ttl_seconds: u64,

    #[arg(long, env = MAX_SUBJECTS_ENV, default_value_t = 100)]
    pub max_subjects: usize,

    /// How often expired links are purged. `0` disables the sweeper.
    #[arg(long, env = SWEEP_INTERVAL_ENV, default_value_t = 3_600)]
    pub sweep_interval_seconds: u64,

    /// How long an expired link is kept before it is purged.
    #[arg(long, env = SWEEP_RETENTION_ENV, default_value_t = 7 * 24 * 60 * 60)]
    pub sweep_retention_seconds: u64,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}
