use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::linkedin::{FLAVOR, ORG_NAME};
use crate::session::{BrowserSession, Locator, Result};
use crate::types::{JobRecord, ResultSet};

/// One step of the company-name fallback chain.
#[async_trait]
pub trait CompanyStrategy: Send + Sync {
    /// `Ok(None)` means "not on this page, try the next strategy".
    async fn attempt(&self, session: &mut dyn BrowserSession) -> Result<Option<String>>;
}

/// Reads the trimmed text of the first element matching a locator.
pub struct SelectorStrategy {
    locator: Locator,
}

impl SelectorStrategy {
    pub fn new(locator: Locator) -> Self {
        Self { locator }
    }
}

#[async_trait]
impl CompanyStrategy for SelectorStrategy {
    async fn attempt(&self, session: &mut dyn BrowserSession) -> Result<Option<String>> {
        let element = match session.find_first(None, self.locator).await {
            Ok(element) => element,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        let text = session.text(element).await?;
        Ok(Some(text.trim().to_owned()))
    }
}

/// Visits each job page and recovers the company name.
pub struct DetailExtractor {
    settle: Duration,
    chain: Vec<Box<dyn CompanyStrategy>>,
}

impl DetailExtractor {
    /// Organisation name link first, then the broader top card flavor text.
    pub fn new(settle: Duration) -> Self {
        Self::with_chain(
            settle,
            vec![
                Box::new(SelectorStrategy::new(ORG_NAME)),
                Box::new(SelectorStrategy::new(FLAVOR)),
            ],
        )
    }

    pub fn with_chain(settle: Duration, chain: Vec<Box<dyn CompanyStrategy>>) -> Self {
        Self { settle, chain }
    }

    /// Emits exactly one record per link, in traversal order. Failures
    /// never drop an item; they fall back to the placeholder company.
    pub async fn extract<I>(&self, session: &mut dyn BrowserSession, links: I) -> ResultSet
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send,
    {
        let mut records = Vec::new();
        for (idx, link) in links.into_iter().enumerate() {
            let record = match self.company_for(session, &link).await {
                Ok(Some(company)) => {
                    log::info!("[{}] {}", idx + 1, company);
                    JobRecord::new(company, link)
                }
                Ok(None) => {
                    log::warn!("[{}] no company element found at {}", idx + 1, link);
                    JobRecord::placeholder(link)
                }
                Err(e) => {
                    log::error!("[{}] error at {}: {}", idx + 1, link, e);
                    JobRecord::placeholder(link)
                }
            };
            records.push(record);
        }
        records
    }

    /// Navigation errors propagate. A strategy that errors is logged and the
    /// next one is tried; the last strategy error is returned only when no
    /// strategy found a company.
    async fn company_for(
        &self,
        session: &mut dyn BrowserSession,
        link: &str,
    ) -> Result<Option<String>> {
        session.navigate(link).await?;
        sleep(self.settle).await;
        let mut last_error = None;
        for strategy in &self.chain {
            match strategy.attempt(session).await {
                Ok(Some(company)) => return Ok(Some(company)),
                Ok(None) => {}
                Err(e) => {
                    log::debug!("company lookup failed at {}, trying next: {}", link, e);
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }
}
