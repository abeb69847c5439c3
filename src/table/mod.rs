// src/table/mod.rs

pub mod locate;
pub mod normalize;
pub mod parse;

use scraper::Html;
use std::collections::HashMap;
use thiserror::Error;

pub use locate::{locate_tables, reveal_commented_tables, LocatedTable};
pub use parse::{parse_table, ParseOptions, Strictness};

/// Whether a column names an entity (passed through verbatim) or holds a stat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Identifier,
    Metric,
}

impl ColumnKind {
    /// `_`-separated tokens of a `data-stat` key that mark a team/entity name column.
    const IDENTIFIER_MARKERS: &'static [&'static str] = &[
        "team",
        "squad",
        "player",
        "opponent",
        "nationality",
        "country",
        "keeper",
        "notes",
    ];

    pub fn for_key(key: &str) -> Self {
        let key = key.to_ascii_lowercase();
        if key
            .split('_')
            .any(|token| Self::IDENTIFIER_MARKERS.contains(&token))
        {
            ColumnKind::Identifier
        } else {
            ColumnKind::Metric
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnSpec {
    /// The `data-stat` attribute; unique within a table.
    pub key: String,
    pub display_name: String,
    pub kind: ColumnKind,
}

/// Column key → cell value. Missing keys are written as empty cells.
pub type Row = HashMap<String, String>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedTable {
    pub name: String,
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<Row>,
}

impl ParsedTable {
    /// A table without columns or without rows is never persisted.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }
}

/// Result of parsing one well-formed table.
#[derive(Debug, PartialEq)]
pub enum TableOutcome {
    Parsed(ParsedTable),
    /// Skippable: no columns or no rows survived extraction.
    Empty(ParsedTable),
}

/// A table whose structure could not be extracted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("element <{0}> is not a table")]
    NotATable(String),
    #[error("header cell #{position} has no data-stat attribute")]
    MissingColumnKey { position: usize },
    #[error("body row {row} references unknown column `{key}`")]
    UnknownColumn { row: usize, key: String },
}

/// The locate/parse capability pair the season runner drives.
pub trait TableSource {
    fn locate<'a>(&self, doc: &'a Html) -> Vec<LocatedTable<'a>>;
    fn parse(&self, table: &LocatedTable<'_>) -> Result<TableOutcome, TableError>;
}

/// `stats_table` locator with the data-stat driven parser.
#[derive(Clone, Debug, Default)]
pub struct StatsTableSource {
    pub options: ParseOptions,
}

impl StatsTableSource {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }
}

impl TableSource for StatsTableSource {
    fn locate<'a>(&self, doc: &'a Html) -> Vec<LocatedTable<'a>> {
        locate_tables(doc)
    }

    fn parse(&self, table: &LocatedTable<'_>) -> Result<TableOutcome, TableError> {
        parse_table(&table.id, table.element, &self.options)
    }
}
