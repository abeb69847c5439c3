// src/run.rs

use scraper::Html;
use std::{path::PathBuf, time::Instant};
use tracing::{debug, error, info, instrument, warn};

use crate::config::{ScraperConfig, SeasonTask};
use crate::fetch::{FetchError, HttpFetcher, PageFetcher};
use crate::table::{
    reveal_commented_tables, ParsedTable, StatsTableSource, TableOutcome, TableSource,
};
use crate::write::{write_metadata, write_table};

/// Where a season is in its fetch → parse → write pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeasonState {
    Pending,
    Fetching,
    Parsing,
    Writing,
    Done,
    /// The page could not be fetched; nothing was written.
    Failed,
}

impl SeasonState {
    pub fn as_str(&self) -> &str {
        match self {
            SeasonState::Pending => "pending",
            SeasonState::Fetching => "fetching",
            SeasonState::Parsing => "parsing",
            SeasonState::Writing => "writing",
            SeasonState::Done => "done",
            SeasonState::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeasonSummary {
    pub season: String,
    pub state: SeasonState,
    /// Non-empty tables written to CSV.
    pub saved: usize,
    /// Empty, malformed or unwritable tables.
    pub skipped: usize,
    pub metadata: Option<PathBuf>,
    pub error: Option<String>,
}

impl SeasonSummary {
    fn new(season: &str) -> Self {
        Self {
            season: season.to_string(),
            state: SeasonState::Pending,
            saved: 0,
            skipped: 0,
            metadata: None,
            error: None,
        }
    }

    fn advance(&mut self, next: SeasonState) {
        debug!(season = %self.season, from = self.state.as_str(), to = next.as_str(), "season state");
        self.state = next;
    }
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub seasons: Vec<SeasonSummary>,
}

impl RunReport {
    pub fn completed(&self) -> usize {
        self.seasons
            .iter()
            .filter(|s| s.state == SeasonState::Done)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.seasons
            .iter()
            .filter(|s| s.state == SeasonState::Failed)
            .count()
    }

    pub fn tables_saved(&self) -> usize {
        self.seasons.iter().map(|s| s.saved).sum()
    }
}

/// Runs seasons one after another; a failing season never stops the run.
pub struct SeasonRunner<F, S> {
    config: ScraperConfig,
    fetcher: F,
    source: S,
}

impl SeasonRunner<HttpFetcher, StatsTableSource> {
    /// Runner with the blocking HTTP fetcher and the `stats_table` parser.
    pub fn from_config(config: ScraperConfig) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(&config)?;
        let source = StatsTableSource::new(config.parse.clone());
        Ok(Self::new(config, fetcher, source))
    }
}

impl<F: PageFetcher, S: TableSource> SeasonRunner<F, S> {
    pub fn new(config: ScraperConfig, fetcher: F, source: S) -> Self {
        Self {
            config,
            fetcher,
            source,
        }
    }

    pub fn run(&self, tasks: &[SeasonTask]) -> RunReport {
        let start = Instant::now();
        info!(seasons = tasks.len(), out = %self.config.output_dir.display(), "starting scrape");

        let mut report = RunReport::default();
        for task in tasks {
            report.seasons.push(self.run_season(task));
        }

        info!(
            completed = report.completed(),
            failed = report.failed(),
            tables = report.tables_saved(),
            elapsed = ?start.elapsed(),
            "all seasons processed"
        );
        report
    }

    #[instrument(level = "info", skip(self, task), fields(season = %task.season))]
    pub fn run_season(&self, task: &SeasonTask) -> SeasonSummary {
        let mut summary = SeasonSummary::new(&task.season);
        info!("Processing season: {}", task.season);

        summary.advance(SeasonState::Fetching);
        let markup = match self.fetcher.fetch(&task.url) {
            Ok(m) => m,
            Err(e) => {
                error!(url = %task.url, error = %e, "fetch failed, skipping season");
                summary.error = Some(e.to_string());
                summary.advance(SeasonState::Failed);
                return summary;
            }
        };

        summary.advance(SeasonState::Parsing);
        let tables = self.parse_tables(&markup, &mut summary);

        summary.advance(SeasonState::Writing);
        for table in &tables {
            match write_table(table, &task.season, &self.config.output_dir) {
                Ok(Some(_)) => {
                    info!(
                        "Saved: {:<40} ({:<2} cols)({:<2} rows)",
                        table.name,
                        table.columns.len(),
                        table.rows.len()
                    );
                    summary.saved += 1;
                }
                Ok(None) => {
                    info!(
                        "Skipped: {:<40} (no data: {} cols, {} rows)",
                        table.name,
                        table.columns.len(),
                        table.rows.len()
                    );
                    summary.skipped += 1;
                }
                Err(e) => {
                    error!(table = %table.name, error = ?e, "writing table failed");
                    summary.skipped += 1;
                }
            }
        }

        match write_metadata(
            &task.season,
            summary.saved,
            &self.config.output_dir,
            &task.url,
        ) {
            Ok(path) => summary.metadata = Some(path),
            Err(e) => {
                error!(error = ?e, "writing metadata failed");
                summary.error = Some(format!("{:#}", e));
            }
        }

        summary.advance(SeasonState::Done);
        info!(
            saved = summary.saved,
            skipped = summary.skipped,
            "Scraping completed for season: {}",
            task.season
        );
        summary
    }

    /// Locate and parse every table. Malformed tables are logged and counted
    /// here; empty ones come back and are skipped by the writer.
    fn parse_tables(&self, markup: &str, summary: &mut SeasonSummary) -> Vec<ParsedTable> {
        let markup = if self.config.reveal_commented {
            reveal_commented_tables(markup)
        } else {
            markup.into()
        };
        let doc = Html::parse_document(&markup);

        let located = self.source.locate(&doc);
        if located.is_empty() {
            warn!("no stats tables found");
        }

        let mut tables = Vec::with_capacity(located.len());
        for table in &located {
            match self.source.parse(table) {
                Ok(TableOutcome::Parsed(parsed)) | Ok(TableOutcome::Empty(parsed)) => {
                    tables.push(parsed)
                }
                Err(e) => {
                    warn!(table = %table.id, error = %e, "Error processing table");
                    summary.skipped += 1;
                }
            }
        }
        tables
    }
}
