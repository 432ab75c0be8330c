use async_trait::async_trait;
use serde_json::json;
use thirtyfour::prelude::*;

use crate::config::{DriverOptions, ScraperConfig};
use crate::session::http::HttpSession;
use crate::session::{
    BrowserSession, DriverStrategy, ElementHandle, Error, Locator, Result, SessionError,
    SessionFactory,
};

const HEIGHT_SCRIPT: &str = "return document.body.scrollHeight";
const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight);";

fn to_by(locator: Locator) -> By {
    match locator {
        Locator::Class(class) => By::ClassName(class),
        Locator::Tag(tag) => By::Tag(tag),
        Locator::Css(css) => By::Css(css),
    }
}

/// Chrome driven over the WebDriver protocol.
pub struct ChromeSession {
    driver: Option<WebDriver>,
    elements: Vec<WebElement>,
}

impl ChromeSession {
    pub async fn connect(
        webdriver_url: &str,
        options: &DriverOptions,
        stealth: bool,
    ) -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        if options.headless {
            caps.add_chrome_arg("--headless=new")?;
        }
        if options.no_sandbox {
            caps.add_chrome_arg("--no-sandbox")?;
        }
        if options.disable_dev_shm {
            caps.add_chrome_arg("--disable-dev-shm-usage")?;
        }
        let (width, height) = options.window_size;
        caps.add_chrome_arg(&format!("--window-size={},{}", width, height))?;
        caps.add_chrome_arg(&format!("--user-agent={}", options.user_agent))?;
        if stealth {
            caps.add_chrome_arg("--disable-blink-features=AutomationControlled")?;
            caps.add_chrome_option("excludeSwitches", json!(["enable-automation"]))?;
            caps.add_chrome_option("useAutomationExtension", false)?;
        }
        log::debug!("connecting to webdriver at {}, stealth: {}", webdriver_url, stealth);
        let driver = WebDriver::new(webdriver_url, caps).await?;
        Ok(Self {
            driver: Some(driver),
            elements: Vec::new(),
        })
    }

    fn driver(&self) -> Result<&WebDriver> {
        self.driver.as_ref().ok_or(Error::Closed)
    }

    fn element(&self, handle: ElementHandle) -> Result<&WebElement> {
        self.elements
            .get(handle.0)
            .ok_or(Error::StaleElement(handle.0))
    }

    fn store(&mut self, element: WebElement) -> ElementHandle {
        self.elements.push(element);
        ElementHandle(self.elements.len() - 1)
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.elements.clear();
        self.driver()?
            .goto(url)
            .await
            .map_err(|e| Error::Navigation {
                url: url.to_owned(),
                reason: e.to_string(),
            })
    }

    async fn current_height(&mut self) -> Result<i64> {
        let ret = self.driver()?.execute(HEIGHT_SCRIPT, Vec::new()).await?;
        ret.json()
            .as_i64()
            .ok_or_else(|| Error::Script(ret.json().to_string()))
    }

    async fn scroll_to_bottom(&mut self) -> Result<()> {
        self.driver()?.execute(SCROLL_SCRIPT, Vec::new()).await?;
        Ok(())
    }

    async fn find_all(&mut self, locator: Locator) -> Result<Vec<ElementHandle>> {
        let found = self.driver()?.find_all(to_by(locator)).await?;
        Ok(found.into_iter().map(|el| self.store(el)).collect())
    }

    async fn find_first(
        &mut self,
        container: Option<ElementHandle>,
        locator: Locator,
    ) -> Result<ElementHandle> {
        let found = match container {
            Some(handle) => self.element(handle)?.find(to_by(locator)).await?,
            None => self.driver()?.find(to_by(locator)).await?,
        };
        Ok(self.store(found))
    }

    async fn attribute(&mut self, element: ElementHandle, name: &str) -> Result<Option<String>> {
        Ok(self.element(element)?.attr(name).await?)
    }

    async fn text(&mut self, element: ElementHandle) -> Result<String> {
        Ok(self.element(element)?.text().await?)
    }

    async fn close(&mut self) -> Result<()> {
        self.elements.clear();
        if let Some(driver) = self.driver.take() {
            driver.quit().await?;
            log::debug!("webdriver session closed");
        }
        Ok(())
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        if self.driver.is_some() {
            log::warn!("webdriver session dropped without being closed");
        }
    }
}

/// Opens sessions by walking the configured strategies in order.
pub struct WebDriverFactory {
    config: ScraperConfig,
}

impl WebDriverFactory {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }

    async fn open_strategy(&self, strategy: DriverStrategy) -> Result<Box<dyn BrowserSession>> {
        let session: Box<dyn BrowserSession> = match strategy {
            DriverStrategy::Stealth => Box::new(
                ChromeSession::connect(&self.config.webdriver_url, &self.config.driver, true)
                    .await?,
            ),
            DriverStrategy::Plain => Box::new(
                ChromeSession::connect(&self.config.webdriver_url, &self.config.driver, false)
                    .await?,
            ),
            DriverStrategy::Http => Box::new(HttpSession::new(&self.config.driver)?),
        };
        Ok(session)
    }
}

#[async_trait]
impl SessionFactory for WebDriverFactory {
    async fn open(&self) -> std::result::Result<Box<dyn BrowserSession>, SessionError> {
        let mut failures = Vec::with_capacity(self.config.strategies.len());
        for strategy in &self.config.strategies {
            match self.open_strategy(*strategy).await {
                Ok(session) => {
                    log::info!("browser session ready using {} strategy", strategy);
                    return Ok(session);
                }
                Err(e) => {
                    log::warn!("{} strategy failed to open a session: {}", strategy, e);
                    failures.push(format!("{}: {}", strategy, e));
                }
            }
        }
        Err(SessionError { failures })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_factory_reports_every_failed_strategy() {
        // Nothing listens on port 9, so both chrome strategies fail to connect.
        let config = ScraperConfig {
            webdriver_url: "http://127.0.0.1:9".to_owned(),
            ..ScraperConfig::default()
        };
        let factory = WebDriverFactory::new(config);
        let err = factory.open().await.err().expect("no session should open");
        assert_eq!(err.failures.len(), 2);
        assert!(err.failures[0].starts_with("stealth"));
        assert!(err.failures[1].starts_with("plain"));
    }

    #[tokio::test]
    async fn test_factory_falls_through_to_http() {
        let config = ScraperConfig {
            webdriver_url: "http://127.0.0.1:9".to_owned(),
            strategies: vec![DriverStrategy::Plain, DriverStrategy::Http],
            ..ScraperConfig::default()
        };
        let factory = WebDriverFactory::new(config);
        let mut session = factory.open().await.expect("http strategy needs no browser");
        session.close().await.unwrap();
    }
}
