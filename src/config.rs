use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MIN_ACTIVE_UNLEARNED: usize = 10;
const DEFAULT_MASTERY_THRESHOLD: u32 = 3;
const DEFAULT_MAX_FETCH_ROUNDS: usize = 20;
const DEFAULT_EMPTY_FETCH_RETRIES: usize = 1;
const DEFAULT_SOURCE_TIMEOUT_MS: u64 = 90_000;
const DEFAULT_GRADING_TIMEOUT_MS: u64 = 90_000;
const DEFAULT_WORD_BATCH_SIZE: usize = 10;
const DEFAULT_SCHEMES_DIR: &str = "./schemes";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env_parse::<u16>("PORT").unwrap_or(DEFAULT_PORT);

        let host = env_parse::<IpAddr>("HOST").unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            host,
            port,
            log_level,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Tuning for the word pool and the LLM-backed collaborators.
#[derive(Debug, Clone)]
pub struct DrillConfig {
    /// Floor of active words below the mastery threshold, per language.
    pub min_active_unlearned: usize,
    /// Correct tries in a row after which a word leaves the pool.
    pub mastery_threshold: u32,
    /// Cap on source calls during a single pool refill.
    pub max_fetch_rounds: usize,
    /// Extra attempts after a batch that added nothing new.
    pub empty_fetch_retries: usize,
    pub source_timeout: Duration,
    pub grading_timeout: Duration,
    pub word_batch_size: usize,
    pub schemes_dir: PathBuf,
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            min_active_unlearned: DEFAULT_MIN_ACTIVE_UNLEARNED,
            mastery_threshold: DEFAULT_MASTERY_THRESHOLD,
            max_fetch_rounds: DEFAULT_MAX_FETCH_ROUNDS,
            empty_fetch_retries: DEFAULT_EMPTY_FETCH_RETRIES,
            source_timeout: Duration::from_millis(DEFAULT_SOURCE_TIMEOUT_MS),
            grading_timeout: Duration::from_millis(DEFAULT_GRADING_TIMEOUT_MS),
            word_batch_size: DEFAULT_WORD_BATCH_SIZE,
            schemes_dir: PathBuf::from(DEFAULT_SCHEMES_DIR),
        }
    }
}

impl DrillConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_active_unlearned: env_parse("MIN_ACTIVE_UNLEARNED")
                .unwrap_or(defaults.min_active_unlearned),
            mastery_threshold: env_parse("MASTERY_THRESHOLD").unwrap_or(defaults.mastery_threshold),
            max_fetch_rounds: env_parse::<usize>("MAX_FETCH_ROUNDS")
                .filter(|v| *v > 0)
                .unwrap_or(defaults.max_fetch_rounds),
            empty_fetch_retries: env_parse("EMPTY_FETCH_RETRIES")
                .unwrap_or(defaults.empty_fetch_retries),
            source_timeout: env_parse::<u64>("SOURCE_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.source_timeout),
            grading_timeout: env_parse::<u64>("GRADING_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.grading_timeout),
            word_batch_size: env_parse::<usize>("WORD_BATCH_SIZE")
                .filter(|v| *v > 0)
                .unwrap_or(defaults.word_batch_size),
            schemes_dir: std::env::var("SCHEMES_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.schemes_dir),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<T>().ok())
}
