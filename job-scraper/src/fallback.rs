//! Sample data served when live scraping is unavailable.

use lazy_static::lazy_static;

use crate::types::{JobRecord, ResultSet};

lazy_static! {
    static ref SAMPLE_JOBS: Vec<JobRecord> = [
        ("Tech Solutions Inc", "https://linkedin.com/jobs/view/123456"),
        ("Digital Innovations", "https://linkedin.com/jobs/view/123457"),
        ("Future Systems", "https://linkedin.com/jobs/view/123458"),
        ("Innovation Labs", "https://linkedin.com/jobs/view/123459"),
        ("Tech Pioneers", "https://linkedin.com/jobs/view/123460"),
        ("Digital Dynamics", "https://linkedin.com/jobs/view/123461"),
        ("Future Tech", "https://linkedin.com/jobs/view/123462"),
        ("Innovation Hub", "https://linkedin.com/jobs/view/123463"),
        ("Tech Masters", "https://linkedin.com/jobs/view/123464"),
        ("Digital Leaders", "https://linkedin.com/jobs/view/123465"),
    ]
    .into_iter()
    .map(|(company, link)| JobRecord::new(company.to_owned(), link.to_owned()))
    .collect();
}

pub fn sample_jobs() -> &'static [JobRecord] {
    &SAMPLE_JOBS
}

/// Sample records whose company contains any word of `keyword`
/// (case-insensitive), or the whole catalog when nothing matches.
/// Experience levels do not filter sample data.
pub fn fallback_jobs(keyword: &str, _experience: &str, max_results: usize) -> ResultSet {
    let keyword = keyword.to_lowercase();
    let words = keyword.split_whitespace().collect::<Vec<_>>();
    let matches = SAMPLE_JOBS
        .iter()
        .filter(|job| {
            let company = job.company().to_lowercase();
            words.iter().any(|word| company.contains(word))
        })
        .collect::<Vec<_>>();
    let selected = if matches.is_empty() {
        SAMPLE_JOBS.iter().collect()
    } else {
        matches
    };
    selected.into_iter().take(max_results).cloned().collect()
}
