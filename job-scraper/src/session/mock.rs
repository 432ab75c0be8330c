//! Scripted in-memory session for pipeline tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::session::{
    BrowserSession, ElementHandle, Error, Locator, Result, SessionError, SessionFactory,
};

pub(crate) type CallLog = Arc<Mutex<Vec<String>>>;

#[derive(Debug, Clone, Default)]
pub(crate) struct MockPage {
    /// Heights returned by successive reads; the last one repeats.
    pub heights: Vec<i64>,
    /// Cards visible after the n-th scroll. `None` is a card without a readable anchor.
    pub batches: Vec<Vec<Option<String>>>,
    /// Document-level elements by css selector, with their text.
    pub texts: HashMap<String, String>,
    /// Document-level selectors whose lookup fails with a stale element.
    pub stale: Vec<String>,
    pub fail_navigation: bool,
    pub panic_on_height: bool,
}

impl MockPage {
    pub fn detail(selector: &str, text: &str) -> Self {
        let mut texts = HashMap::new();
        texts.insert(selector.to_owned(), text.to_owned());
        Self {
            texts,
            ..Self::default()
        }
    }

    pub fn broken() -> Self {
        Self {
            fail_navigation: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
enum MockElement {
    Card(Option<String>),
    Anchor(String),
    Text(String),
}

pub(crate) struct MockSession {
    pages: HashMap<String, MockPage>,
    current: Option<MockPage>,
    height_reads: usize,
    scrolls: usize,
    elements: Vec<MockElement>,
    log: CallLog,
}

impl MockSession {
    pub fn new(pages: HashMap<String, MockPage>) -> Self {
        Self::with_log(pages, CallLog::default())
    }

    pub fn with_log(pages: HashMap<String, MockPage>, log: CallLog) -> Self {
        Self {
            pages,
            current: None,
            height_reads: 0,
            scrolls: 0,
            elements: Vec::new(),
            log,
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.log.lock().unwrap().push(call);
    }

    fn page(&self) -> Result<&MockPage> {
        self.current
            .as_ref()
            .ok_or_else(|| Error::Script("no page loaded".to_owned()))
    }

    fn store(&mut self, element: MockElement) -> ElementHandle {
        self.elements.push(element);
        ElementHandle(self.elements.len() - 1)
    }

    fn element(&self, handle: ElementHandle) -> Result<&MockElement> {
        self.elements
            .get(handle.0)
            .ok_or(Error::StaleElement(handle.0))
    }
}

#[async_trait]
impl BrowserSession for MockSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.record(format!("navigate {}", url));
        self.elements.clear();
        self.height_reads = 0;
        self.scrolls = 0;
        self.current = None;
        match self.pages.get(url) {
            Some(page) if !page.fail_navigation => {
                self.current = Some(page.clone());
                Ok(())
            }
            _ => Err(Error::Navigation {
                url: url.to_owned(),
                reason: "timeout".to_owned(),
            }),
        }
    }

    async fn current_height(&mut self) -> Result<i64> {
        self.record("height".to_owned());
        let page = self.page()?;
        if page.panic_on_height {
            panic!("renderer crashed");
        }
        let height = page
            .heights
            .get(self.height_reads)
            .or_else(|| page.heights.last())
            .copied()
            .unwrap_or(0);
        self.height_reads += 1;
        Ok(height)
    }

    async fn scroll_to_bottom(&mut self) -> Result<()> {
        self.record("scroll".to_owned());
        self.page()?;
        self.scrolls += 1;
        Ok(())
    }

    async fn find_all(&mut self, locator: Locator) -> Result<Vec<ElementHandle>> {
        self.record(format!("find_all {}", locator));
        let page = self.page()?;
        let index = self.scrolls.saturating_sub(1);
        let cards = page
            .batches
            .get(index)
            .or_else(|| page.batches.last())
            .cloned()
            .unwrap_or_default();
        Ok(cards
            .into_iter()
            .map(|card| self.store(MockElement::Card(card)))
            .collect())
    }

    async fn find_first(
        &mut self,
        container: Option<ElementHandle>,
        locator: Locator,
    ) -> Result<ElementHandle> {
        self.record(format!("find_first {}", locator));
        let found = match container {
            Some(handle) => match self.element(handle)? {
                MockElement::Card(Some(href)) => MockElement::Anchor(href.clone()),
                _ => return Err(Error::NoSuchElement(locator.to_css())),
            },
            None if self.page()?.stale.contains(&locator.to_css()) => {
                return Err(Error::StaleElement(0));
            }
            None => match self.page()?.texts.get(&locator.to_css()) {
                Some(text) => MockElement::Text(text.clone()),
                None => return Err(Error::NoSuchElement(locator.to_css())),
            },
        };
        Ok(self.store(found))
    }

    async fn attribute(&mut self, element: ElementHandle, name: &str) -> Result<Option<String>> {
        match self.element(element)? {
            MockElement::Anchor(href) if name == "href" => Ok(Some(href.clone())),
            _ => Ok(None),
        }
    }

    async fn text(&mut self, element: ElementHandle) -> Result<String> {
        match self.element(element)? {
            MockElement::Text(text) | MockElement::Anchor(text) => Ok(text.clone()),
            MockElement::Card(_) => Ok(String::new()),
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.record("close".to_owned());
        Ok(())
    }
}

pub(crate) struct MockFactory {
    pub pages: HashMap<String, MockPage>,
    pub fail: bool,
    pub log: CallLog,
    pub opened: Arc<AtomicUsize>,
}

impl MockFactory {
    pub fn new(pages: HashMap<String, MockPage>) -> Self {
        Self {
            pages,
            fail: false,
            log: CallLog::default(),
            opened: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(HashMap::new())
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionFactory for MockFactory {
    async fn open(&self) -> std::result::Result<Box<dyn BrowserSession>, SessionError> {
        if self.fail {
            return Err(SessionError {
                failures: vec![
                    "stealth: connection refused".to_owned(),
                    "plain: connection refused".to_owned(),
                ],
            });
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession::with_log(
            self.pages.clone(),
            self.log.clone(),
        )))
    }
}
