// src/table/locate.rs

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scraper::{ElementRef, Html, Selector};
use std::borrow::Cow;
use tracing::trace;

use super::normalize::collapse_ws;

static STATS_TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.stats_table").expect("stats table selector"));
static CAPTION: Lazy<Selector> = Lazy::new(|| Selector::parse("caption").expect("caption selector"));
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--(.*?)-->").expect("comment regex"));

/// A statistics table plus the identifier its output file is named after.
#[derive(Debug, Clone)]
pub struct LocatedTable<'a> {
    pub id: String,
    pub element: ElementRef<'a>,
}

/// All `table.stats_table` elements in document order.
///
/// Identifier: the `id` attribute, else the caption text, else `table_<n>`
/// with `n` the 1-based position among the located tables.
pub fn locate_tables(doc: &Html) -> Vec<LocatedTable<'_>> {
    doc.select(&STATS_TABLE)
        .enumerate()
        .map(|(i, element)| {
            let id = table_identifier(element, i + 1);
            trace!(table = %id, "located stats table");
            LocatedTable { id, element }
        })
        .collect()
}

fn table_identifier(element: ElementRef<'_>, position: usize) -> String {
    if let Some(id) = element.value().attr("id").map(str::trim) {
        if !id.is_empty() {
            return id.to_string();
        }
    }
    if let Some(caption) = element.select(&CAPTION).next() {
        let text = collapse_ws(&caption.text().collect::<String>());
        if !text.is_empty() {
            return text;
        }
    }
    format!("table_{}", position)
}

/// Strip the comment markers around commented-out tables so they parse as
/// regular markup. Comments without a `<table` are left alone.
pub fn reveal_commented_tables(markup: &str) -> Cow<'_, str> {
    COMMENT.replace_all(markup, |caps: &Captures| {
        let body = &caps[1];
        if body.contains("<table") {
            body.to_string()
        } else {
            caps[0].to_string()
        }
    })
}
