use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::config::DriverOptions;
use crate::session::{BrowserSession, ElementHandle, Error, Locator, Result};

/// Owned copy of a matched element, so nothing borrowed from the parsed
/// document has to live across an await point.
#[derive(Debug, Clone)]
struct Snapshot {
    html: String,
    attrs: HashMap<String, String>,
    text: String,
}

impl Snapshot {
    fn of(el: ElementRef) -> Self {
        Self {
            html: el.html(),
            attrs: el
                .value()
                .attrs()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
            text: el.text().collect(),
        }
    }
}

fn parse_selector(locator: Locator) -> Result<Selector> {
    Selector::parse(&locator.to_css()).map_err(|_| Error::InvalidSelector(locator.to_css()))
}

/// Parses `html` from scratch on every call, so each query costs a full
/// parse of the page (or of the container fragment).
fn select_all(html: &str, fragment: bool, locator: Locator) -> Result<Vec<Snapshot>> {
    let selector = parse_selector(locator)?;
    let doc = if fragment {
        Html::parse_fragment(html)
    } else {
        Html::parse_document(html)
    };
    Ok(doc.select(&selector).map(Snapshot::of).collect())
}

/// Session over plain HTTP: fetches the server-rendered HTML and queries it.
/// There is no JavaScript, so the page never grows when scrolled.
///
/// Only the raw body is kept between calls and every `find_all` /
/// `find_first` re-parses it. The collector therefore parses the page once
/// per result card, which is fine for the handful of cards a static page holds.
pub struct HttpSession {
    client: Option<Client>,
    page: Option<String>,
    elements: Vec<Snapshot>,
}

impl HttpSession {
    pub fn new(options: &DriverOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(options.user_agent.as_str())
            .build()?;
        Ok(Self {
            client: Some(client),
            page: None,
            elements: Vec::new(),
        })
    }

    fn page(&self) -> Result<&str> {
        if self.client.is_none() {
            return Err(Error::Closed);
        }
        self.page
            .as_deref()
            .ok_or_else(|| Error::Script("no page loaded".to_owned()))
    }

    fn element(&self, handle: ElementHandle) -> Result<&Snapshot> {
        self.elements
            .get(handle.0)
            .ok_or(Error::StaleElement(handle.0))
    }

    fn store(&mut self, snapshot: Snapshot) -> ElementHandle {
        self.elements.push(snapshot);
        ElementHandle(self.elements.len() - 1)
    }
}

#[async_trait]
impl BrowserSession for HttpSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let client = self.client.as_ref().ok_or(Error::Closed)?;
        self.elements.clear();
        self.page = None;
        log::debug!("GET {}", url);
        let navigation_error = |reason: String| Error::Navigation {
            url: url.to_owned(),
            reason,
        };
        let resp = client
            .get(url)
            .send()
            .await
            .map_err(|e| navigation_error(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(navigation_error(format!("status code {}", status)));
        }
        let body = resp
            .text()
            .await
            .map_err(|e| navigation_error(e.to_string()))?;
        self.page = Some(body);
        Ok(())
    }

    async fn current_height(&mut self) -> Result<i64> {
        Ok(self.page()?.len() as i64)
    }

    async fn scroll_to_bottom(&mut self) -> Result<()> {
        self.page().map(|_| ())
    }

    async fn find_all(&mut self, locator: Locator) -> Result<Vec<ElementHandle>> {
        let found = select_all(self.page()?, false, locator)?;
        Ok(found.into_iter().map(|s| self.store(s)).collect())
    }

    async fn find_first(
        &mut self,
        container: Option<ElementHandle>,
        locator: Locator,
    ) -> Result<ElementHandle> {
        let found = match container {
            Some(handle) => select_all(&self.element(handle)?.html, true, locator)?,
            None => select_all(self.page()?, false, locator)?,
        };
        let first = found
            .into_iter()
            .next()
            .ok_or_else(|| Error::NoSuchElement(locator.to_css()))?;
        Ok(self.store(first))
    }

    async fn attribute(&mut self, element: ElementHandle, name: &str) -> Result<Option<String>> {
        Ok(self.element(element)?.attrs.get(name).cloned())
    }

    async fn text(&mut self, element: ElementHandle) -> Result<String> {
        Ok(self.element(element)?.text.clone())
    }

    async fn close(&mut self) -> Result<()> {
        self.client = None;
        self.page = None;
        self.elements.clear();
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SEARCH_PAGE: &str = r#"
        <html><body>
          <ul>
            <li><div class="base-card"><a class="base-card__full-link" href="https://www.linkedin.com/jobs/view/1">Rust Engineer</a></div></li>
            <li><div class="base-card"><span>no anchor</span></div></li>
            <li><div class="base-card"><a href="https://www.linkedin.com/jobs/view/2">Backend</a></div></li>
          </ul>
          <div class="topcard__flavor">  Ferrous Systems  </div>
        </body></html>
    "#;

    fn loaded_session() -> HttpSession {
        let mut session = HttpSession::new(&DriverOptions::default()).unwrap();
        session.page = Some(SEARCH_PAGE.to_owned());
        session
    }

    #[tokio::test]
    async fn test_find_cards_and_anchors() {
        let mut session = loaded_session();
        let cards = session.find_all(Locator::Class("base-card")).await.unwrap();
        assert_eq!(cards.len(), 3);

        let anchor = session.find_first(Some(cards[0]), Locator::Tag("a")).await.unwrap();
        let href = session.attribute(anchor, "href").await.unwrap();
        assert_eq!(href.as_deref(), Some("https://www.linkedin.com/jobs/view/1"));

        let missing = session.find_first(Some(cards[1]), Locator::Tag("a")).await;
        assert!(missing.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_document_level_text() {
        let mut session = loaded_session();
        let el = session
            .find_first(None, Locator::Class("topcard__flavor"))
            .await
            .unwrap();
        assert_eq!(session.text(el).await.unwrap().trim(), "Ferrous Systems");
        assert!(session
            .find_first(None, Locator::Class("topcard__org-name-link"))
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_bad_selector_is_not_reported_as_missing() {
        let mut session = loaded_session();
        let err = session.find_all(Locator::Css("div[[")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidSelector(ref css) if css == "div[["));
        assert!(!err.is_not_found());

        let err = session
            .find_first(None, Locator::Css("div[["))
            .await
            .unwrap_err();
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_height_is_stable_and_close_invalidates() {
        let mut session = loaded_session();
        let before = session.current_height().await.unwrap();
        session.scroll_to_bottom().await.unwrap();
        assert_eq!(session.current_height().await.unwrap(), before);

        session.close().await.unwrap();
        assert!(matches!(session.current_height().await, Err(Error::Closed)));
        assert!(matches!(session.navigate("http://localhost").await, Err(Error::Closed)));
    }
}
