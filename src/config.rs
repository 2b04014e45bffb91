use anyhow::Context;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

/// Server settings, read from the environment (and a `.env` file, if present).
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub api_port: Option<u16>,
    pub lifetimes: Lifetimes,
    pub purge_interval: Duration,
    pub seed: Option<u64>,
}

/// How long games are kept around before being evicted.
#[derive(Clone, Copy, Debug)]
pub struct Lifetimes {
    /// Grace period for finished or aborted games.
    pub finished: Duration,
    /// Any game untouched for this long is evicted.
    pub idle: Duration,
}

impl Default for Lifetimes {
    fn default() -> Self {
        Self {
            finished: Duration::from_secs(300),
            idle: Duration::from_secs(3600),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Lifetimes::default();
        Ok(Self {
            bind_addr: var("BIND_ADDR")?.unwrap_or(IpAddr::from([127, 0, 0, 1])),
            port: var("PORT")?.context("PORT must be set")?,
            api_port: var("API_PORT")?,
            lifetimes: Lifetimes {
                finished: var("FINISHED_GAME_TTL_SECS")?
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.finished),
                idle: var("IDLE_GAME_TTL_SECS")?
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.idle),
            },
            purge_interval: Duration::from_secs(var("PURGE_INTERVAL_SECS")?.unwrap_or(60)),
            seed: var("GAME_SEED")?,
        })
    }
}

/// Reads and parses an optional environment variable.
fn var<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} is invalid: {value:?}")),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err).with_context(|| format!("{name} is not valid unicode")),
    }
}
