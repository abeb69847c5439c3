// src/table/parse.rs

use scraper::ElementRef;
use std::collections::HashMap;
use tracing::{debug, trace};

use super::normalize::{normalize_value, visible_text};
use super::{ColumnKind, ColumnSpec, ParsedTable, Row, TableError, TableOutcome};

/// Grouping row above the real header; carries no column keys of its own.
const OVER_HEADER_CLASS: &str = "over_header";
/// Header row repeated inside long bodies.
const REPEATED_HEADER_CLASS: &str = "thead";
const COLUMN_KEY_ATTR: &str = "data-stat";
const LABEL_ATTR: &str = "aria-label";

/// How to treat cells that carry no usable column key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strictness {
    /// Skip keyless header cells and body cells with unknown keys.
    #[default]
    Lenient,
    /// Reject the table on the first keyless header cell or unknown body key.
    Strict,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    pub strictness: Strictness,
    pub skip_repeated_headers: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strictness: Strictness::Lenient,
            skip_repeated_headers: true,
        }
    }
}

/// Direct element children whose tag is one of `tags`. A table nested inside
/// a cell never contributes rows or cells to the outer table.
fn children<'a>(
    el: ElementRef<'a>,
    tags: &'static [&'static str],
) -> impl Iterator<Item = ElementRef<'a>> {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(move |c| tags.contains(&c.value().name()))
}

fn section_rows<'a>(
    table: ElementRef<'a>,
    section: &'static [&'static str],
) -> impl Iterator<Item = ElementRef<'a>> {
    children(table, section).flat_map(|s| children(s, &["tr"]))
}

fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

fn column_key(el: ElementRef<'_>) -> Option<&str> {
    el.value()
        .attr(COLUMN_KEY_ATTR)
        .map(str::trim)
        .filter(|k| !k.is_empty())
}

/// Convert one `<table>` into columns + rows.
///
/// Columns come from `<thead>` (grouping rows excluded) in header order.
/// Rows come from `<tbody>`; a row with no keyed cell is dropped.
pub fn parse_table(
    name: &str,
    table: ElementRef<'_>,
    options: &ParseOptions,
) -> Result<TableOutcome, TableError> {
    let tag = table.value().name();
    if tag != "table" {
        return Err(TableError::NotATable(tag.to_string()));
    }

    let columns = extract_columns(table, options.strictness)?;
    if columns.is_empty() {
        debug!(table = name, "no keyed header cells");
        return Ok(TableOutcome::Empty(ParsedTable {
            name: name.to_string(),
            ..ParsedTable::default()
        }));
    }

    let kinds: HashMap<&str, ColumnKind> =
        columns.iter().map(|c| (c.key.as_str(), c.kind)).collect();
    let rows = extract_rows(table, &kinds, options)?;

    let parsed = ParsedTable {
        name: name.to_string(),
        columns,
        rows,
    };
    if parsed.is_empty() {
        return Ok(TableOutcome::Empty(parsed));
    }
    Ok(TableOutcome::Parsed(parsed))
}

fn extract_columns(
    table: ElementRef<'_>,
    strictness: Strictness,
) -> Result<Vec<ColumnSpec>, TableError> {
    let mut columns: Vec<ColumnSpec> = Vec::new();
    let mut position = 0;

    for row in section_rows(table, &["thead"]) {
        if has_class(row, OVER_HEADER_CLASS) {
            continue;
        }
        for cell in children(row, &["th"]) {
            position += 1;
            let key = match column_key(cell) {
                Some(k) => k,
                None if strictness == Strictness::Strict => {
                    return Err(TableError::MissingColumnKey { position });
                }
                None => continue,
            };
            if columns.iter().any(|c| c.key == key) {
                trace!(key, "duplicate header key, keeping first");
                continue;
            }

            let display_name = cell
                .value()
                .attr(LABEL_ATTR)
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| visible_text(cell));

            columns.push(ColumnSpec {
                key: key.to_string(),
                display_name,
                kind: ColumnKind::for_key(key),
            });
        }
    }
    Ok(columns)
}

fn extract_rows(
    table: ElementRef<'_>,
    kinds: &HashMap<&str, ColumnKind>,
    options: &ParseOptions,
) -> Result<Vec<Row>, TableError> {
    let mut rows = Vec::new();

    for (i, tr) in section_rows(table, &["tbody"]).enumerate() {
        if options.skip_repeated_headers && has_class(tr, REPEATED_HEADER_CLASS) {
            continue;
        }

        let mut row = Row::new();
        for cell in children(tr, &["th", "td"]) {
            let Some(key) = column_key(cell) else {
                continue;
            };
            let kind = match kinds.get(key) {
                Some(kind) => *kind,
                None if options.strictness == Strictness::Strict => {
                    return Err(TableError::UnknownColumn {
                        row: i + 1,
                        key: key.to_string(),
                    });
                }
                None => continue,
            };
            row.insert(key.to_string(), normalize_value(kind, visible_text(cell)));
        }

        if !row.is_empty() {
            rows.push(row);
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    const LEAGUE_TABLE: &str = r#"
<table class="stats_table" id="results_overall">
  <thead>
    <tr class="over_header">
      <th></th>
      <th data-stat="header_goals" colspan="2">Goals</th>
    </tr>
    <tr>
      <th data-stat="team" aria-label="Squad">Squad</th>
      <th data-stat="gf" aria-label="Goals For">GF</th>
      <th data-stat="ga">GA</th>
      <th class="decorative">&nbsp;</th>
      <th data-stat="attendance" aria-label="">Attendance</th>
    </tr>
  </thead>
  <tbody>
    <tr>
      <th data-stat="team"><a href="/en/squads/1">Wolverhampton, Wanderers</a></th>
      <td data-stat="gf">10,5</td>
      <td data-stat="ga">&minus;2</td>
      <td>junk</td>
      <td data-stat="attendance">41,234</td>
    </tr>
    <tr class="thead">
      <th data-stat="team">Squad</th><td data-stat="gf">GF</td>
    </tr>
    <tr class="spacer"><td colspan="4"></td></tr>
    <tr>
      <th data-stat="team">Brighton &amp; Hove-Albion</th>
      <td data-stat="gf">7</td>
    </tr>
  </tbody>
</table>"#;

    fn parse(markup: &str, options: &ParseOptions) -> Result<TableOutcome, TableError> {
        let doc = Html::parse_document(markup);
        let sel = Selector::parse("table").unwrap();
        let table = doc.select(&sel).next().expect("table in fixture");
        parse_table("fixture", table, options)
    }

    fn parsed(markup: &str) -> ParsedTable {
        match parse(markup, &ParseOptions::default()).unwrap() {
            TableOutcome::Parsed(t) => t,
            other => panic!("expected parsed table, got {:?}", other),
        }
    }

    #[test]
    fn test_columns_follow_header_order() {
        let t = parsed(LEAGUE_TABLE);
        let keys: Vec<_> = t.columns.iter().map(|c| c.key.as_str()).collect();
        // over_header's header_goals is excluded, the keyless cell skipped
        assert_eq!(keys, vec!["team", "gf", "ga", "attendance"]);

        let names: Vec<_> = t.columns.iter().map(|c| c.display_name.as_str()).collect();
        assert_eq!(names, vec!["Squad", "Goals For", "GA", "Attendance"]);

        assert_eq!(t.columns[0].kind, ColumnKind::Identifier);
        assert!(t.columns[1..].iter().all(|c| c.kind == ColumnKind::Metric));
    }

    #[test]
    fn test_rows_are_normalized_per_kind() {
        let t = parsed(LEAGUE_TABLE);
        // repeated header and spacer rows are gone
        assert_eq!(t.rows.len(), 2);

        let first = &t.rows[0];
        assert_eq!(first["team"], "Wolverhampton, Wanderers");
        assert_eq!(first["gf"], "10.5");
        assert_eq!(first["ga"], "-2");
        assert_eq!(first["attendance"], "41.234");

        let second = &t.rows[1];
        assert_eq!(second["team"], "Brighton & Hove-Albion");
        assert_eq!(second["gf"], "7");
        assert!(!second.contains_key("ga"));
    }

    #[test]
    fn test_repeated_header_kept_when_not_skipping() {
        let options = ParseOptions {
            skip_repeated_headers: false,
            ..ParseOptions::default()
        };
        match parse(LEAGUE_TABLE, &options).unwrap() {
            TableOutcome::Parsed(t) => {
                assert_eq!(t.rows.len(), 3);
                assert_eq!(t.rows[1]["gf"], "GF");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_header_without_keys_is_empty() {
        let markup = r#"<table class="stats_table">
            <thead><tr><th>Squad</th><th>GF</th></tr></thead>
            <tbody><tr><td data-stat="team">Arsenal</td></tr></tbody>
        </table>"#;
        assert_eq!(
            parse(markup, &ParseOptions::default()).unwrap(),
            TableOutcome::Empty(ParsedTable {
                name: "fixture".into(),
                ..ParsedTable::default()
            })
        );
    }

    #[test]
    fn test_header_without_body_is_empty() {
        let markup = r#"<table class="stats_table">
            <thead><tr><th data-stat="team">Squad</th></tr></thead>
            <tbody><tr><td>no key</td></tr></tbody>
        </table>"#;
        match parse(markup, &ParseOptions::default()).unwrap() {
            TableOutcome::Empty(t) => {
                assert_eq!(t.columns.len(), 1);
                assert!(t.rows.is_empty());
            }
            other => panic!("expected empty table, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_table_rows_stay_inside_their_cell() {
        let markup = r#"<table class="stats_table">
            <thead><tr>
              <th data-stat="team">Squad</th><th data-stat="gf">GF</th>
            </tr></thead>
            <tbody>
              <tr>
                <td data-stat="team">A<table><tbody>
                  <tr><td data-stat="gf">99</td></tr>
                </tbody></table></td>
                <td data-stat="gf">1</td>
              </tr>
            </tbody>
        </table>"#;
        let t = parsed(markup);
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.rows[0]["gf"], "1");
    }

    #[test]
    fn test_duplicate_header_key_keeps_first() {
        let markup = r#"<table>
            <thead><tr>
              <th data-stat="gf">GF</th><th data-stat="gf">GF again</th>
            </tr></thead>
            <tbody><tr><td data-stat="gf">3</td></tr></tbody>
        </table>"#;
        let t = parsed(markup);
        assert_eq!(t.columns.len(), 1);
        assert_eq!(t.columns[0].display_name, "GF");
    }

    #[test]
    fn test_strict_rejects_keyless_header() {
        let strict = ParseOptions {
            strictness: Strictness::Strict,
            ..ParseOptions::default()
        };
        assert_eq!(
            parse(LEAGUE_TABLE, &strict).unwrap_err(),
            TableError::MissingColumnKey { position: 4 }
        );
    }

    #[test]
    fn test_strict_rejects_unknown_body_key() {
        let strict = ParseOptions {
            strictness: Strictness::Strict,
            ..ParseOptions::default()
        };
        let markup = r#"<table>
            <thead><tr><th data-stat="team">Squad</th></tr></thead>
            <tbody>
              <tr><td data-stat="team">Arsenal</td></tr>
              <tr><td data-stat="team">Chelsea</td><td data-stat="xg">1,2</td></tr>
            </tbody>
        </table>"#;
        assert_eq!(
            parse(markup, &strict).unwrap_err(),
            TableError::UnknownColumn {
                row: 2,
                key: "xg".into()
            }
        );
        // lenient drops the unknown cell and keeps the row
        let t = parsed(markup);
        assert_eq!(t.rows.len(), 2);
        assert!(!t.rows[1].contains_key("xg"));
    }

    #[test]
    fn test_non_table_element_is_malformed() {
        let doc = Html::parse_document(r#"<div class="stats_table"></div>"#);
        let sel = Selector::parse("div").unwrap();
        let div = doc.select(&sel).next().unwrap();
        assert_eq!(
            parse_table("div", div, &ParseOptions::default()).unwrap_err(),
            TableError::NotATable("div".into())
        );
    }
}
