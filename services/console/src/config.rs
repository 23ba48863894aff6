use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::{bail, Context, Result};

#[derive(Clone, Debug)]
pub struct ConsoleConfig {
    pub api_url: String,
    pub bind_addr: String,
    pub http_timeout: Duration,
    pub dashboard_rows: NonZeroU32,
    pub history_rows: NonZeroU32,
}

impl ConsoleConfig {
    pub fn from_env() -> Result<Self> {
        let api_url = get("MONITOR_API_URL")?;
        let bind_addr = std::env::var("CONSOLE_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let timeout_secs: u64 = parse_or("CONSOLE_HTTP_TIMEOUT_SECS", 10)?;
        let dashboard_rows = rows("CONSOLE_DASHBOARD_ROWS", 50)?;
        let history_rows = rows("CONSOLE_HISTORY_ROWS", 100)?;

        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            bail!("MONITOR_API_URL must start with http:// or https://");
        }
        if timeout_secs == 0 {
            bail!("CONSOLE_HTTP_TIMEOUT_SECS must be positive");
        }

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            bind_addr,
            http_timeout: Duration::from_secs(timeout_secs),
            dashboard_rows,
            history_rows,
        })
    }
}

fn get(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Missing required env var: {key}"))
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => v.trim().parse().with_context(|| format!("Invalid value for {key}: {v:?}")),
        Err(_) => Ok(default),
    }
}

fn rows(key: &str, default: u32) -> Result<NonZeroU32> {
    let n: u32 = parse_or(key, default)?;
    NonZeroU32::new(n).with_context(|| format!("{key} must be positive"))
}

#[cfg(test)]
impl ConsoleConfig {
    pub fn for_tests(api_url: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            http_timeout: Duration::from_secs(5),
            dashboard_rows: NonZeroU32::new(50).unwrap(),
            history_rows: NonZeroU32::new(100).unwrap(),
        }
    }
}
