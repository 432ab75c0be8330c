pub mod config;
pub mod fallback;
pub mod linkedin;
pub mod search;
pub mod session;
pub mod types;

pub use config::ScraperConfig;
pub use search::{run_search, JobSearch};
pub use types::{JobRecord, ResultSet, SearchQuery};
