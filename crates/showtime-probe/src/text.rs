//! Text folding and pattern matching shared by every extraction strategy.

use regex::Regex;
use scraper::{Html, Node};
use serde_json::Value;
use std::sync::OnceLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// 24-hour clock time, hours 00-23 and minutes 00-59
const SHOWTIME_PATTERN: &str = r"(?:[01][0-9]|2[0-3]):[0-5][0-9]";

const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Fold text for matching: strip diacritics, map non-breaking spaces and
/// typographic apostrophes, lowercase, collapse whitespace.
pub fn normalize(input: &str) -> String {
    let folded: String = input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            '\u{00a0}' | '\u{202f}' | '\u{2007}' => ' ',
            '\u{2019}' | '\u{2018}' => '\'',
            other => other,
        })
        .collect();

    folded
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn showtime_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SHOWTIME_PATTERN).expect("showtime pattern is a valid regex"))
}

/// Every `HH:MM` in `text`, in order of appearance.
///
/// A match preceded by a digit, a colon or a sign, or followed by a digit,
/// is part of a longer number or a UTC offset and is skipped. A trailing
/// `:SS` is allowed, so ISO timestamps like `2025-12-17T14:30:00` yield
/// `14:30`. `T00:00:00` is how date-only values are serialized and never
/// counts.
pub fn find_showtimes(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    showtime_regex()
        .find_iter(text)
        .filter(|m| {
            let before = m.start().checked_sub(1).map(|i| bytes[i]);
            let before_ok = before.map_or(true, |b| !b.is_ascii_digit() && !matches!(b, b':' | b'+' | b'-'));
            let after_ok = bytes.get(m.end()).map_or(true, |b| !b.is_ascii_digit());
            before_ok && after_ok && !is_date_only_midnight(bytes, m.start(), m.end())
        })
        .map(|m| m.as_str().to_string())
        .collect()
}

fn is_date_only_midnight(bytes: &[u8], start: usize, end: usize) -> bool {
    start > 0
        && bytes[start - 1].eq_ignore_ascii_case(&b'T')
        && &bytes[start..end] == b"00:00"
        && bytes[end..].starts_with(b":00")
}

/// Text nodes of an HTML document, skipping scripts and styles.
/// Picks up content hidden from `innerText` (collapsed panels, inactive tabs).
pub fn markup_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut chunks = Vec::new();

    for node in document.tree.nodes() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map_or(false, |el| SKIPPED_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }
    }

    chunks.join("\n")
}

/// String values of a JSON body, one per line; the raw body if it isn't JSON.
/// Decoding first turns `é` escapes back into the characters they encode.
pub fn json_text(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => {
            let mut out = Vec::new();
            collect_strings(&value, &mut out);
            out.join("\n")
        }
        Err(_) => body.to_string(),
    }
}

fn collect_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => items.iter().for_each(|item| collect_strings(item, out)),
        Value::Object(map) => map.values().for_each(|item| collect_strings(item, out)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_diacritics_and_case() {
        assert_eq!(normalize("Réserver"), "reserver");
        assert_eq!(normalize("RÉSERVER"), "reserver");
        assert_eq!(normalize("Avatar : De feu et de cendres"), "avatar : de feu et de cendres");
        assert_eq!(normalize("Pathé  Brumath"), "pathe brumath");
    }

    #[test]
    fn test_normalize_non_breaking_spaces() {
        assert_eq!(normalize("Avatar\u{00a0}:\u{202f}De feu"), "avatar : de feu");
        assert_eq!(normalize("J\u{2019}accepte"), "j'accepte");
        assert_eq!(normalize("  \n\t "), "");
    }

    #[test]
    fn test_find_showtimes_accepts_valid_times() {
        assert_eq!(find_showtimes("Séances : 14:30, 17:45 et 20:00"), vec!["14:30", "17:45", "20:00"]);
        assert_eq!(find_showtimes("00:00 23:59"), vec!["00:00", "23:59"]);
    }

    #[test]
    fn test_find_showtimes_rejects_out_of_range() {
        assert!(find_showtimes("24:00 12:60 9:30 25:10").is_empty());
    }

    #[test]
    fn test_find_showtimes_rejects_longer_numbers() {
        assert!(find_showtimes("ref 114:30").is_empty());
        assert!(find_showtimes("14:305").is_empty());
        assert!(find_showtimes("1:14:30").is_empty());
    }

    #[test]
    fn test_find_showtimes_in_timestamps() {
        assert_eq!(find_showtimes("\"start\":\"2025-12-17T14:30:00Z\""), vec!["14:30"]);
        assert_eq!(find_showtimes("VF 20h / 20:15"), vec!["20:15"]);
    }

    #[test]
    fn test_find_showtimes_skips_utc_offsets() {
        assert_eq!(find_showtimes("2025-12-17T20:00:00+01:00"), vec!["20:00"]);
        assert_eq!(find_showtimes("2025-12-17T09:15:00-05:00"), vec!["09:15"]);
        assert!(find_showtimes("UTC+02:00").is_empty());
    }

    #[test]
    fn test_find_showtimes_skips_date_only_midnight() {
        assert!(find_showtimes("\"releaseAt\":\"2025-12-17T00:00:00+01:00\"").is_empty());
        assert!(find_showtimes("2025-12-17T00:00:00.000Z").is_empty());
    assert!(find_showtimes(&normalize("2025-12-17T00:00:00+01:00")).is_empty());
        assert_eq!(find_showtimes("2025-12-17T00:15:00"), vec!["00:15"]);
        assert_eq!(find_showtimes("Séance de minuit 00:00"), vec!["00:00"]);
    }

    #[test]
    fn test_markup_text_skips_scripts() {
        let html = r#"
            <html><head><style>.slot:after { content: "10:00" }</style></head>
            <body>
              <div class="sessions"><button>14:30</button><span hidden>VOST 21:15</span></div>
              <script>window.__BUILD__ = "08:45";</script>
              <noscript>Activez JavaScript 11:11</noscript>
            </body></html>
        "#;
        let text = markup_text(html);
        assert!(text.contains("14:30"));
        assert!(text.contains("VOST 21:15"));
        assert!(!text.contains("08:45"));
        assert!(!text.contains("10:00"));
        assert!(!text.contains("11:11"));
    }

    #[test]
    fn test_json_text_decodes_strings() {
        let body = r#"{"cinema":{"name":"Pathé Brumath"},"shows":[{"time":"18:10","id":42}]}"#;
        let text = json_text(body);
        assert!(text.contains("Pathé Brumath"));
        assert!(text.contains("18:10"));
        assert!(!text.contains("42"));
    }

    #[test]
    fn test_json_text_falls_back_to_raw_body() {
        assert_eq!(json_text("not json 12:00"), "not json 12:00");
    }
}
