// src/config.rs

use anyhow::{bail, Context, Result};
use std::{path::PathBuf, time::Duration};
use url::Url;

use crate::table::ParseOptions;

/// Default output root, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "datasets/fbref";

/// Desktop browser user agent sent with every page request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

pub const DEFAULT_START_YEAR: i32 = 1990;
pub const DEFAULT_END_YEAR: i32 = 2023;
pub const DEFAULT_COMP_ID: u32 = 9;
pub const DEFAULT_COMP_SLUG: &str = "Premier-League";

/// Everything the season runner needs, passed in at construction.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub output_dir: PathBuf,
    pub user_agent: String,
    pub timeout: Duration,
    pub parse: ParseOptions,
    /// Un-comment `<!-- <table ...> -->` blocks before locating tables.
    pub reveal_commented: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            parse: ParseOptions::default(),
            reveal_commented: false,
        }
    }
}

/// A competition on fbref: numeric id plus the slug used in page URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Competition {
    pub id: u32,
    pub slug: String,
}

impl Default for Competition {
    fn default() -> Self {
        Self {
            id: DEFAULT_COMP_ID,
            slug: DEFAULT_COMP_SLUG.to_string(),
        }
    }
}

impl Competition {
    /// Stats page for one season, e.g.
    /// `https://fbref.com/en/comps/9/2020-2021/2020-2021-Premier-League-Stats`.
    pub fn season_url(&self, season: &str) -> String {
        format!(
            "https://fbref.com/en/comps/{}/{}/{}-{}-Stats",
            self.id, season, season, self.slug
        )
    }
}

/// One unit of work: a season label and the page that holds its tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonTask {
    pub season: String,
    pub url: String,
}

impl SeasonTask {
    /// Build a task from an explicit season/URL pair, validating both.
    ///
    /// The season becomes a directory under the output root, so it must be a
    /// single plain path component.
    pub fn new(season: impl Into<String>, url: impl Into<String>) -> Result<Self> {
        let season = season.into();
        let url = url.into();
        if season.trim().is_empty() {
            bail!("season label must not be empty");
        }
        if season.contains(['/', '\\']) || season == "." || season == ".." {
            bail!("season label {:?} must not contain path separators or be . / ..", season);
        }
        let parsed = Url::parse(&url).with_context(|| format!("parsing season URL {}", url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("season URL {} must be http(s)", url);
        }
        Ok(Self { season, url })
    }
}

/// Format the season label for the year a season starts in: 2020 → "2020-2021".
pub fn season_label(start_year: i32) -> String {
    format!("{}-{}", start_year, start_year + 1)
}

/// One task per season for `start_year..=end_year`, in ascending order.
pub fn season_tasks(start_year: i32, end_year: i32, competition: &Competition) -> Vec<SeasonTask> {
    (start_year..=end_year)
        .map(|year| {
            let season = season_label(year);
            let url = competition.season_url(&season);
            SeasonTask { season, url }
        })
        .collect()
}
