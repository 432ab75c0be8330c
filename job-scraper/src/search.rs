use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use thiserror::Error;

use crate::config::{ScraperConfig, Timings};
use crate::fallback::fallback_jobs;
use crate::linkedin::{DetailExtractor, LinkCollector};
use crate::session::webdriver::WebDriverFactory;
use crate::session::{BrowserSession, SessionFactory};
use crate::types::{QueryError, ResultSet, SearchQuery};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid search query: {0}")]
    InvalidQuery(#[from] QueryError),
    #[error("Live scrape failed: {0}")]
    Pipeline(String),
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_owned()
    }
}

/// Runs the live pipeline and falls back to sample data whenever it cannot
/// finish. The caller always gets a result set back.
pub struct JobSearch<F> {
    factory: F,
    collector: LinkCollector,
    extractor: DetailExtractor,
}

impl<F: SessionFactory> JobSearch<F> {
    pub fn new(factory: F, timings: Timings) -> Self {
        Self {
            factory,
            collector: LinkCollector::new(timings.page_settle, timings.scroll_settle),
            extractor: DetailExtractor::new(timings.detail_settle),
        }
    }

    /// Validates raw inputs, then behaves like [`JobSearch::run`].
    pub async fn search(&self, title: &str, experience: &str, max_jobs: u32) -> Result<ResultSet> {
        let query = SearchQuery::new(title, experience, max_jobs)?;
        Ok(self.run(&query).await)
    }

    pub async fn run(&self, query: &SearchQuery) -> ResultSet {
        if query.max_results() == 0 {
            return ResultSet::new();
        }
        let mut session = match self.factory.open().await {
            Ok(session) => session,
            Err(e) => {
                log::error!("{}, serving sample data", e);
                return self.degraded(query);
            }
        };

        let outcome = AssertUnwindSafe(self.live(session.as_mut(), query))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(Error::Pipeline(panic_message(payload))));

        if let Err(e) = session.close().await {
            log::warn!("failed to close browser session: {}", e);
        }

        match outcome {
            Ok(records) => records,
            Err(e) => {
                log::error!("{}, serving sample data", e);
                self.degraded(query)
            }
        }
    }

    async fn live(&self, session: &mut dyn BrowserSession, query: &SearchQuery) -> Result<ResultSet> {
        let links = self
            .collector
            .collect(session, query)
            .await
            .map_err(|e| Error::Pipeline(e.to_string()))?;
        log::info!(
            "Collected {} job links. Now extracting company names...",
            links.len()
        );
        let mut records = self.extractor.extract(session, links).await;
        records.truncate(query.max_results());
        Ok(records)
    }

    fn degraded(&self, query: &SearchQuery) -> ResultSet {
        fallback_jobs(
            query.keyword(),
            query.experience_levels(),
            query.max_results(),
        )
    }
}

/// Entry point for callers: scrape `title` postings for the given experience
/// codes, using the WebDriver strategies from `config`.
pub async fn run_search(
    config: &ScraperConfig,
    title: &str,
    experience_codes: &str,
    max_jobs: u32,
) -> Result<ResultSet> {
    let search = JobSearch::new(WebDriverFactory::new(config.clone()), config.timings);
    search.search(title, experience_codes, max_jobs).await
}
