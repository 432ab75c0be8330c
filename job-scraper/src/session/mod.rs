//! Browser session capability used by the scrape pipeline.
//!
//! The pipeline only ever talks to a [`BrowserSession`]; which automation
//! backend sits behind it is decided by a [`SessionFactory`].

pub mod http;
pub mod webdriver;

#[cfg(test)]
pub(crate) mod mock;

use std::fmt::Display;
use std::str::FromStr;

use async_trait::async_trait;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No element matches selector: '{0}'")]
    NoSuchElement(String),
    #[error("Selector is not valid css: '{0}'")]
    InvalidSelector(String),
    #[error("Element handle is no longer valid: {0}")]
    StaleElement(usize),
    #[error("Failed to navigate to '{url}': {reason}")]
    Navigation { url: String, reason: String },
    #[error("Script returned unexpected value: '{0}'")]
    Script(String),
    #[error("WebDriver error: '{0}'")]
    Driver(#[from] thirtyfour::error::WebDriverError),
    #[error("Request error: '{0}'")]
    Http(#[from] reqwest::Error),
    #[error("Session already closed")]
    Closed,
}

impl Error {
    /// Missing elements are expected while pages render and never abort a scrape.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NoSuchElement(_) => true,
            Error::Driver(e) => matches!(e, thirtyfour::error::WebDriverError::NoSuchElement(..)),
            _ => false,
        }
    }
}

/// Raised when none of the configured strategies produced a session.
#[derive(Debug, Error)]
#[error("Could not open a browser session: {}", .failures.join("; "))]
pub struct SessionError {
    pub failures: Vec<String>,
}

/// How to find an element on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    Class(&'static str),
    Tag(&'static str),
    Css(&'static str),
}

impl Locator {
    pub fn to_css(&self) -> String {
        match self {
            Locator::Class(class) => format!(".{}", class),
            Locator::Tag(tag) => tag.to_string(),
            Locator::Css(css) => css.to_string(),
        }
    }
}

impl Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Handle to an element owned by the session that returned it.
/// Handles are invalidated by the next `navigate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub(crate) usize);

#[async_trait]
pub trait BrowserSession: Send {
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Current scrollable height of the document.
    async fn current_height(&mut self) -> Result<i64>;

    async fn scroll_to_bottom(&mut self) -> Result<()>;

    async fn find_all(&mut self, locator: Locator) -> Result<Vec<ElementHandle>>;

    /// First match inside `container`, or inside the whole document when `None`.
    async fn find_first(
        &mut self,
        container: Option<ElementHandle>,
        locator: Locator,
    ) -> Result<ElementHandle>;

    async fn attribute(&mut self, element: ElementHandle, name: &str) -> Result<Option<String>>;

    async fn text(&mut self, element: ElementHandle) -> Result<String>;

    /// Releases the underlying browser. Calling it twice is a no-op.
    async fn close(&mut self) -> Result<()>;
}

#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self) -> std::result::Result<Box<dyn BrowserSession>, SessionError>;
}

/// Ways of getting a session, tried in the configured order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStrategy {
    /// Chrome with automation fingerprints masked.
    Stealth,
    /// Chrome with the configured options only.
    Plain,
    /// Static HTML over plain HTTP, no JavaScript.
    Http,
}

impl FromStr for DriverStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stealth" => Ok(DriverStrategy::Stealth),
            "plain" => Ok(DriverStrategy::Plain),
            "http" => Ok(DriverStrategy::Http),
            other => Err(format!("unknown driver strategy '{}'", other)),
        }
    }
}

impl Display for DriverStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DriverStrategy::Stealth => "stealth",
            DriverStrategy::Plain => "plain",
            DriverStrategy::Http => "http",
        };
        f.write_str(name)
    }
}
