use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Upper bound on the number of postings a single search may request.
pub const MAX_JOBS_CEILING: u32 = 30;
pub const DEFAULT_MAX_JOBS: u32 = 20;

/// Company value used whenever the detail page gives nothing back.
pub const PLACEHOLDER_COMPANY: &str = "Company";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Keyword must not be empty")]
    EmptyKeyword,
    #[error("Experience levels must not be empty")]
    EmptyExperience,
}

fn check_experience(experience: &str) -> Result<String, QueryError> {
    lazy_static! {
        static ref KNOWN_CODES: Regex = Regex::new(r"^[1-6](,[1-6])*$").unwrap();
    }
    let experience = experience.trim();
    if experience.is_empty() {
        return Err(QueryError::EmptyExperience);
    }
    let compact = experience
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>();
    if !KNOWN_CODES.is_match(&compact) {
        log::warn!(
            "experience levels '{}' are not comma separated codes 1-6, passing them through",
            experience
        );
    }
    Ok(experience.to_owned())
}

/// One search request. Built per invocation, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    keyword: String,
    experience_levels: String,
    max_results: u32,
}

impl SearchQuery {
    /// Rejects only an empty keyword or empty experience levels.
    /// `max_results` is clamped to [`MAX_JOBS_CEILING`]; zero asks for nothing.
    pub fn new(keyword: &str, experience_levels: &str, max_results: u32) -> Result<Self, QueryError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(QueryError::EmptyKeyword);
        }
        Ok(Self {
            keyword: keyword.to_owned(),
            experience_levels: check_experience(experience_levels)?,
            max_results: max_results.min(MAX_JOBS_CEILING),
        })
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn experience_levels(&self) -> &str {
        &self.experience_levels
    }

    pub fn max_results(&self) -> usize {
        self.max_results as usize
    }
}

/// A (company, link) pair as handed back to the caller.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    company: String,
    link: String,
}

impl JobRecord {
    pub fn new(company: String, link: String) -> Self {
        let company = if company.is_empty() {
            PLACEHOLDER_COMPANY.to_owned()
        } else {
            company
        };
        Self { company, link }
    }

    pub fn placeholder(link: String) -> Self {
        Self {
            company: PLACEHOLDER_COMPANY.to_owned(),
            link,
        }
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn link(&self) -> &str {
        &self.link
    }
}

pub type ResultSet = Vec<JobRecord>;
