// src/table/normalize.rs

use scraper::ElementRef;

use super::ColumnKind;

/// U+2212, the typographic minus fbref uses for negative numbers.
const MINUS_SIGN: char = '\u{2212}';

/// Visible text of a cell: every text fragment trimmed, then concatenated.
pub fn visible_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).collect()
}

/// Collapse runs of whitespace to a single space and trim the ends.
pub fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `"1,234"` → `"1.234"`, `"−3"` → `"-3"`.
pub fn normalize_metric(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            ',' => '.',
            MINUS_SIGN => '-',
            other => other,
        })
        .collect()
}

/// Identifier values (club and player names) keep commas and dashes as-is.
pub fn normalize_value(kind: ColumnKind, raw: String) -> String {
    match kind {
        ColumnKind::Identifier => raw,
        ColumnKind::Metric => normalize_metric(&raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_metric_comma_becomes_point() {
        assert_eq!(normalize_metric("1,234"), "1.234");
        assert_eq!(normalize_metric("10,5"), "10.5");
    }

    #[test]
    fn test_metric_minus_glyph() {
        assert_eq!(normalize_metric("\u{2212}3"), "-3");
        assert_eq!(normalize_metric("\u{2212}1,5"), "-1.5");
        assert_eq!(normalize_metric("+7"), "+7");
    }

    #[test]
    fn test_identifier_untouched() {
        let club = "Brighton & Hove Albion, FC".to_string();
        assert_eq!(
            normalize_value(ColumnKind::Identifier, club.clone()),
            club
        );
        assert_eq!(
            normalize_value(ColumnKind::Identifier, "Mohamed Salah \u{2212} 32".into()),
            "Mohamed Salah \u{2212} 32"
        );
    }

    #[test]
    fn test_visible_text_strips_markup() {
        let doc = Html::parse_fragment(
            r#"<table><tr><td> <a href="/squads/x">Arsenal</a>
               <span> FC </span></td></tr></table>"#,
        );
        let sel = Selector::parse("td").unwrap();
        let td = doc.select(&sel).next().unwrap();
        assert_eq!(visible_text(td), "ArsenalFC");
    }

    #[test]
    fn test_collapse_ws() {
        assert_eq!(collapse_ws("  Regular \n season   table "), "Regular season table");
    }
}
