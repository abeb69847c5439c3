// src/write.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::table::ParsedTable;

pub const METADATA_FILE: &str = "_metadata.json";

/// Per-season record written next to the CSV files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunMetadata {
    pub scrape_date: DateTime<Local>,
    pub source_url: String,
    pub tables_scraped: usize,
    pub season: String,
}

/// Keep alphanumerics, `_` and `-`; everything else becomes `_`.
pub fn safe_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `<base_dir>/<season>`, created if missing.
pub fn season_dir(base_dir: &Path, season: &str) -> Result<PathBuf> {
    let dir = base_dir.join(season);
    fs::create_dir_all(&dir).with_context(|| format!("creating {:?}", dir))?;
    Ok(dir)
}

/// Write `table` to `<base_dir>/<season>/<safe name>.csv`, replacing any
/// previous file. Header row holds display names; cells follow column order.
///
/// Returns `None` without touching the filesystem for an empty table.
pub fn write_table(table: &ParsedTable, season: &str, base_dir: &Path) -> Result<Option<PathBuf>> {
    if table.is_empty() {
        return Ok(None);
    }

    let dir = season_dir(base_dir, season)?;
    let path = dir.join(format!("{}.csv", safe_file_name(&table.name)));
    if path.exists() {
        debug!(path = %path.display(), "file exists, overwriting");
    }

    let mut wtr = csv::Writer::from_path(&path)
        .with_context(|| format!("creating {:?}", path))?;
    wtr.write_record(table.columns.iter().map(|c| c.display_name.as_str()))
        .with_context(|| format!("writing header to {:?}", path))?;
    for row in &table.rows {
        wtr.write_record(
            table
                .columns
                .iter()
                .map(|c| row.get(&c.key).map(String::as_str).unwrap_or("")),
        )
        .with_context(|| format!("writing row to {:?}", path))?;
    }
    wtr.flush().with_context(|| format!("flushing {:?}", path))?;

    Ok(Some(path))
}

/// Write `<base_dir>/<season>/_metadata.json` stamped with the current time.
pub fn write_metadata(
    season: &str,
    table_count: usize,
    base_dir: &Path,
    source_url: &str,
) -> Result<PathBuf> {
    let meta = RunMetadata {
        scrape_date: Local::now(),
        source_url: source_url.to_string(),
        tables_scraped: table_count,
        season: season.to_string(),
    };

    let dir = season_dir(base_dir, season)?;
    let path = dir.join(METADATA_FILE);

    // write to a temp file, then rename over the original
    let tmp_path = dir.join(format!(".{}.tmp", METADATA_FILE));
    let mut tmp =
        fs::File::create(&tmp_path).with_context(|| format!("creating {:?}", tmp_path))?;
    serde_json::to_writer_pretty(&mut tmp, &meta).context("serializing metadata")?;
    tmp.write_all(b"\n")?;
    drop(tmp);

    fs::rename(&tmp_path, &path)
        .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))?;
    Ok(path)
}

pub fn read_metadata(path: &Path) -> Result<RunMetadata> {
    let f = fs::File::open(path).with_context(|| format!("opening {:?}", path))?;
    serde_json::from_reader(f).with_context(|| format!("parsing {:?}", path))
}
