use job_scraper::JobRecord;
use serde::Serialize;

#[derive(Serialize, Debug, PartialEq)]
pub struct JobView {
    company: String,
    link: String,
}

impl From<&JobRecord> for JobView {
    fn from(record: &JobRecord) -> Self {
        let link = if record.link().is_empty() {
            "#".to_owned()
        } else {
            record.link().to_owned()
        };
        Self {
            company: record.company().to_owned(),
            link,
        }
    }
}

/// Response body in the shape the web front end consumes.
#[derive(Serialize, Debug)]
pub struct SearchResponse {
    jobs: Vec<JobView>,
    title: String,
    experience: String,
}

impl SearchResponse {
    pub fn new(jobs: &[JobRecord], title: String, experience: String) -> Self {
        Self {
            jobs: jobs.iter().map(JobView::from).collect(),
            title,
            experience,
        }
    }
}
