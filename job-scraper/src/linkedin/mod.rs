pub mod collector;
pub mod extractor;

use crate::session::Locator;
use crate::types::SearchQuery;

pub use collector::LinkCollector;
pub use extractor::{CompanyStrategy, DetailExtractor, SelectorStrategy};

pub const SEARCH_LOCATION: &str = "India";

pub(crate) const RESULT_CARD: Locator = Locator::Class("base-card");
pub(crate) const CARD_ANCHOR: Locator = Locator::Tag("a");
pub(crate) const ORG_NAME: Locator = Locator::Class("topcard__org-name-link");
pub(crate) const FLAVOR: Locator = Locator::Class("topcard__flavor");

pub fn search_url(query: &SearchQuery) -> String {
    format!(
        "https://www.linkedin.com/jobs/search/?keywords={}&location={}&f_E={}",
        urlencoding::encode(query.keyword()),
        SEARCH_LOCATION,
        query.experience_levels()
    )
}
