use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::session::DriverStrategy;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid value for {var}: '{value}'")]
    InvalidValue { var: &'static str, value: String },
    #[error("Invalid driver strategy list: {0}")]
    InvalidStrategy(String),
}

pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Browser flags handed to every session the factory builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOptions {
    pub headless: bool,
    pub no_sandbox: bool,
    pub disable_dev_shm: bool,
    pub window_size: (u32, u32),
    pub user_agent: String,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            headless: true,
            no_sandbox: true,
            disable_dev_shm: true,
            window_size: (1920, 1080),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// Fixed waits that give client-side rendering time to catch up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub page_settle: Duration,
    pub scroll_settle: Duration,
    pub detail_settle: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            page_settle: Duration::from_secs(5),
            scroll_settle: Duration::from_secs(3),
            detail_settle: Duration::from_secs(3),
        }
    }
}

impl Timings {
    pub fn zero() -> Self {
        Self {
            page_settle: Duration::ZERO,
            scroll_settle: Duration::ZERO,
            detail_settle: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScraperConfig {
    pub webdriver_url: String,
    pub strategies: Vec<DriverStrategy>,
    pub driver: DriverOptions,
    pub timings: Timings,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_owned(),
            strategies: vec![DriverStrategy::Stealth, DriverStrategy::Plain],
            driver: DriverOptions::default(),
            timings: Timings::default(),
        }
    }
}

impl ScraperConfig {
    /// Builds the config from process environment variables,
    /// keeping defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup("WEBDRIVER_URL") {
            config.webdriver_url = url;
        }
        if let Some(list) = lookup("SCRAPER_STRATEGIES") {
            config.strategies = parse_strategies(&list)?;
        }
        if let Some(value) = lookup("SCRAPER_HEADLESS") {
            config.driver.headless = parse_value("SCRAPER_HEADLESS", &value)?;
        }
        if let Some(agent) = lookup("SCRAPER_USER_AGENT") {
            config.driver.user_agent = agent;
        }
        if let Some(value) = lookup("SCRAPER_WINDOW_SIZE") {
            config.driver.window_size = parse_window_size(&value)?;
        }
        if let Some(value) = lookup("SCRAPER_PAGE_SETTLE_SECS") {
            config.timings.page_settle = parse_secs("SCRAPER_PAGE_SETTLE_SECS", &value)?;
        }
        if let Some(value) = lookup("SCRAPER_SCROLL_SETTLE_SECS") {
            config.timings.scroll_settle = parse_secs("SCRAPER_SCROLL_SETTLE_SECS", &value)?;
        }
        if let Some(value) = lookup("SCRAPER_DETAIL_SETTLE_SECS") {
            config.timings.detail_settle = parse_secs("SCRAPER_DETAIL_SETTLE_SECS", &value)?;
        }
        Ok(config)
    }
}

fn parse_value<T: FromStr>(var: &'static str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| Error::InvalidValue {
        var,
        value: value.to_owned(),
    })
}

fn parse_secs(var: &'static str, value: &str) -> Result<Duration> {
    parse_value::<f64>(var, value)
        .and_then(|secs| {
            Duration::try_from_secs_f64(secs).map_err(|_| Error::InvalidValue {
                var,
                value: value.to_owned(),
            })
        })
}

fn parse_window_size(value: &str) -> Result<(u32, u32)> {
    let invalid = || Error::InvalidValue {
        var: "SCRAPER_WINDOW_SIZE",
        value: value.to_owned(),
    };
    let (width, height) = value.split_once(',').ok_or_else(invalid)?;
    let width = width.trim().parse().map_err(|_| invalid())?;
    let height = height.trim().parse().map_err(|_| invalid())?;
    Ok((width, height))
}

fn parse_strategies(list: &str) -> Result<Vec<DriverStrategy>> {
    let strategies = list
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(DriverStrategy::from_str)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::InvalidStrategy)?;
    if strategies.is_empty() {
        return Err(Error::InvalidStrategy("empty list".to_owned()));
    }
    Ok(strategies)
}
