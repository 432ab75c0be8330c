use std::collections::HashSet;
use std::time::Duration;

use tokio::time::sleep;

use crate::linkedin::{search_url, CARD_ANCHOR, RESULT_CARD};
use crate::session::{BrowserSession, ElementHandle, Result};
use crate::types::SearchQuery;

/// Scrolls a search results page and harvests unique posting links.
pub struct LinkCollector {
    page_settle: Duration,
    scroll_settle: Duration,
}

impl LinkCollector {
    pub fn new(page_settle: Duration, scroll_settle: Duration) -> Self {
        Self {
            page_settle,
            scroll_settle,
        }
    }

    /// Collects up to `query.max_results()` links. Stops early once a scroll
    /// leaves the page height unchanged, so the result may be short.
    pub async fn collect(
        &self,
        session: &mut dyn BrowserSession,
        query: &SearchQuery,
    ) -> Result<HashSet<String>> {
        let target = query.max_results();
        let url = search_url(query);
        log::info!("navigating to search page: {}", url);
        session.navigate(&url).await?;
        sleep(self.page_settle).await;

        let mut links = HashSet::with_capacity(target);
        let mut last_height = session.current_height().await?;
        while links.len() < target {
            session.scroll_to_bottom().await?;
            sleep(self.scroll_settle).await;

            let cards = session.find_all(RESULT_CARD).await?;
            for card in cards {
                let Some(link) = read_card_link(session, card).await else {
                    continue;
                };
                if links.insert(link) && links.len() >= target {
                    break;
                }
            }

            let new_height = session.current_height().await?;
            if new_height == last_height {
                log::debug!("page height settled at {}, stopping scroll", new_height);
                break;
            }
            last_height = new_height;
        }
        log::info!("collected {} job links for '{}'", links.len(), query.keyword());
        Ok(links)
    }
}

async fn read_card_link(session: &mut dyn BrowserSession, card: ElementHandle) -> Option<String> {
    let href = match session.find_first(Some(card), CARD_ANCHOR).await {
        Ok(anchor) => session.attribute(anchor, "href").await,
        Err(e) => Err(e),
    };
    match href {
        Ok(Some(link)) if !link.is_empty() => Some(link),
        Ok(_) => None,
        Err(e) => {
            log::debug!("skipping result card: {}", e);
            None
        }
    }
}
