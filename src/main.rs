use anyhow::{Context, Result};
use clap::Parser;
use fbref_scraper::{
    config::{
        season_tasks, Competition, ScraperConfig, SeasonTask, DEFAULT_COMP_ID,
        DEFAULT_COMP_SLUG, DEFAULT_END_YEAR, DEFAULT_OUTPUT_DIR, DEFAULT_START_YEAR,
        DEFAULT_USER_AGENT,
    },
    table::{ParseOptions, Strictness},
    SeasonRunner,
};
use std::{path::PathBuf, time::Duration};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Scrape fbref season stats tables into per-season CSV files"
)]
struct Args {
    /// First season start year (1990 → 1990-1991)
    #[arg(long, default_value_t = DEFAULT_START_YEAR)]
    start_year: i32,
    /// Last season start year, inclusive
    #[arg(long, default_value_t = DEFAULT_END_YEAR)]
    end_year: i32,
    /// fbref competition id
    #[arg(long, default_value_t = DEFAULT_COMP_ID)]
    comp_id: u32,
    /// Competition slug used in page URLs
    #[arg(long, default_value = DEFAULT_COMP_SLUG)]
    comp_slug: String,
    /// Scrape a single season label instead of the year range (needs --url)
    #[arg(long, requires = "url")]
    season: Option<String>,
    /// Page URL for --season
    #[arg(long, requires = "season")]
    url: Option<String>,
    #[arg(short, long, env = "FBREF_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,
    #[arg(long, env = "FBREF_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,
    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
    /// Fail a table on keyless header cells or unknown body keys
    #[arg(long)]
    strict: bool,
    /// Keep repeated header rows found inside table bodies
    #[arg(long)]
    keep_repeated_headers: bool,
    /// Also parse tables fbref ships inside HTML comments
    #[arg(long)]
    reveal_commented: bool,
}

impl Args {
    fn config(&self) -> ScraperConfig {
        ScraperConfig {
            output_dir: self.output.clone(),
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout),
            parse: ParseOptions {
                strictness: if self.strict {
                    Strictness::Strict
                } else {
                    Strictness::Lenient
                },
                skip_repeated_headers: !self.keep_repeated_headers,
            },
            reveal_commented: self.reveal_commented,
        }
    }

    fn tasks(&self) -> Result<Vec<SeasonTask>> {
        if let (Some(season), Some(url)) = (&self.season, &self.url) {
            let task = SeasonTask::new(season.as_str(), url.as_str())
                .context("invalid --season/--url override")?;
            return Ok(vec![task]);
        }
        let competition = Competition {
            id: self.comp_id,
            slug: self.comp_slug.clone(),
        };
        Ok(season_tasks(self.start_year, self.end_year, &competition))
    }
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();
    let tasks = args.tasks()?;
    if tasks.is_empty() {
        warn!(
            start = args.start_year,
            end = args.end_year,
            "empty season range, nothing to do"
        );
        return Ok(());
    }

    let runner = SeasonRunner::from_config(args.config()).context("building HTTP client")?;
    info!("Starting scraping process...");
    let report = runner.run(&tasks);

    for season in &report.seasons {
        match &season.error {
            Some(e) => error!(
                season = %season.season,
                state = season.state.as_str(),
                saved = season.saved,
                skipped = season.skipped,
                "{}",
                e
            ),
            None => info!(
                season = %season.season,
                saved = season.saved,
                skipped = season.skipped,
                "season summary"
            ),
        }
    }

    // per-season and per-table failures are logged, never turned into an exit code
    Ok(())
}
