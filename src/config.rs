use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use dotenvy::dotenv;

use crate::pipeline::summary::DEFAULT_TOP_N;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub api_prefix: String,
    pub output_dir: PathBuf,

    // Only this origin may call the API from a browser
    pub cors_origin: String,
    pub max_upload_bytes: usize,

    // Rate limiting
    pub rate_process_per_min: u32,
    pub rate_query_per_min: u32,

    pub log_dir: PathBuf,
    pub log_level: tracing::Level,

    /// Size of the ranking tables.
    pub top_n: usize,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var_or(key, default)
        .parse()
        .with_context(|| format!("{key} must be a valid value"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: var_or("SERVER_ADDR", "127.0.0.1:5000"),
            api_prefix: var_or("API_PREFIX", "/api"),
            output_dir: PathBuf::from(var_or("OUTPUT_DIR", "output")),

            cors_origin: var_or("CORS_ORIGIN", "http://localhost:3000"),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", "52428800")?, // 50 MiB

            rate_process_per_min: parse_var("RATE_PROCESS_PER_MIN", "10")?,
            rate_query_per_min: parse_var("RATE_QUERY_PER_MIN", "600")?,

            log_dir: PathBuf::from(var_or("LOG_DIR", "logs")),
            log_level: parse_var("LOG_LEVEL", "debug")?,

            top_n: parse_var("TOP_N", &DEFAULT_TOP_N.to_string())?,
        })
    }
}

#[cfg(test)]
impl Config {
    /// Defaults with output redirected, for handler tests.
    pub fn for_tests(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            server_addr: "127.0.0.1:0".to_string(),
            api_prefix: "/api".to_string(),
            output_dir: output_dir.into(),
            cors_origin: "http://localhost:3000".to_string(),
            max_upload_bytes: 1024 * 1024,
            rate_process_per_min: 1000,
            rate_query_per_min: 1000,
            log_dir: PathBuf::from("logs"),
            log_level: tracing::Level::DEBUG,
            top_n: DEFAULT_TOP_N,
        }
    }
}
