mod output;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use job_scraper::fallback::fallback_jobs;
use job_scraper::types::{DEFAULT_MAX_JOBS, MAX_JOBS_CEILING};
use job_scraper::{run_search, ScraperConfig};

use crate::output::SearchResponse;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scrape postings through a live browser session
    Search {
        /// Job title or field, e.g. "Data Analyst"
        #[clap(long)]
        title: String,
        /// Experience codes separated by commas:
        /// 1 Internship, 2 Entry level, 3 Associate, 4 Mid-Senior, 5 Director, 6 Executive
        #[clap(long)]
        experience: String,
        #[clap(long, default_value_t = DEFAULT_MAX_JOBS)]
        max_jobs: u32,
    },
    /// Print the offline sample data for a keyword
    Sample {
        #[clap(long)]
        title: String,
        #[clap(long, default_value = "1,2")]
        experience: String,
        #[clap(long, default_value_t = DEFAULT_MAX_JOBS)]
        max_jobs: u32,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    let args = Cli::parse();
    let response = match args.command {
        Commands::Search {
            title,
            experience,
            max_jobs,
        } => {
            let config = match ScraperConfig::from_env() {
                Ok(config) => config,
                Err(e) => {
                    log::error!("Invalid configuration: {}", e);
                    std::process::exit(2);
                }
            };
            let max_jobs = max_jobs.min(MAX_JOBS_CEILING);
            match run_search(&config, &title, &experience, max_jobs).await {
                Ok(jobs) => SearchResponse::new(&jobs, title, experience),
                Err(e) => {
                    log::error!("{}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Sample {
            title,
            experience,
            max_jobs,
        } => {
            let max_jobs = max_jobs.min(MAX_JOBS_CEILING) as usize;
            let jobs = fallback_jobs(&title, &experience, max_jobs);
            SearchResponse::new(&jobs, title, experience)
        }
    };
    match serde_json::to_string_pretty(&response) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Failed to serialize response: {}", e);
            std::process::exit(1);
        }
    }
}
