// src/lib.rs

pub mod config;
pub mod fetch;
pub mod run;
pub mod table;
pub mod write;

pub use config::{season_tasks, Competition, ScraperConfig, SeasonTask};
pub use fetch::{FetchError, HttpFetcher, PageFetcher};
pub use run::{RunReport, SeasonRunner, SeasonState, SeasonSummary};
pub use table::{ColumnKind, ColumnSpec, ParsedTable, Row, StatsTableSource, TableSource};
pub use write::{write_metadata, write_table, RunMetadata};
