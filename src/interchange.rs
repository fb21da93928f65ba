//! JSON export and import of quote collections.
//!
//! Export writes the collection as a pretty-printed array. Import is lenient:
//! anything that is not an object with a non-empty `text` and `category` is
//! dropped rather than failing the whole file.

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::QuoteError;
use crate::models::Quote;

/// Pretty-printed JSON array of the given quotes.
pub fn export_json(quotes: &[Quote]) -> Result<String, QuoteError> {
    serde_json::to_string_pretty(quotes)
        .map_err(|e| QuoteError::Parse(format!("Failed to serialize quotes: {}", e)))
}

/// `quotes_export_YYYY-MM-DD.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("quotes_export_{}.json", date.format("%Y-%m-%d"))
}

/// Parse an import file into candidate quotes.
///
/// Returned quotes have an empty `id` when the entry carried none; the store
/// decides the final id.
pub fn parse_import(json: &str) -> Result<Vec<Quote>, QuoteError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| QuoteError::Parse(format!("Invalid JSON file format: {}", e)))?;

    let Value::Array(entries) = value else {
        return Err(QuoteError::Parse(
            "JSON file content is not a valid array of quotes".to_string(),
        ));
    };

    let quotes = entries
        .iter()
        .filter_map(|entry| {
            let text = non_empty_str(entry, "text")?;
            let category = non_empty_str(entry, "category")?;
            let id = entry.get("id").and_then(Value::as_str).unwrap_or_default();
            Some(Quote::new(id, text, category))
        })
        .collect::<Vec<_>>();

    let dropped = entries.len() - quotes.len();
    if dropped > 0 {
        tracing::debug!("Discarded {} import entries without text or category", dropped);
    }

    Ok(quotes)
}

fn non_empty_str<'a>(entry: &'a Value, field: &str) -> Option<&'a str> {
    entry
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_is_pretty_printed_array() {
        let quotes = vec![Quote::new("local-1", "A", "Work")];
        let json = export_json(&quotes).unwrap();

        assert!(json.starts_with("[\n  {"));
        assert!(json.contains("\"category\": \"Work\""));
    }

    #[test]
    fn test_export_file_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_file_name(date), "quotes_export_2024-03-09.json");
    }

    #[test]
    fn test_import_drops_incomplete_entries() {
        let json = r#"[
            {"text": "Keep me", "category": "Life"},
            {"text": "", "category": "Life"},
            {"text": "No category"},
            {"category": "No text"},
            {"text": 42, "category": "Numbers"},
            "not an object",
            {"id": "local-9", "text": "With id", "category": "Work"}
        ]"#;

        let quotes = parse_import(json).unwrap();

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0], Quote::new("", "Keep me", "Life"));
        assert_eq!(quotes[1].id, "local-9");
    }

    #[test]
    fn test_import_rejects_non_array() {
        let err = parse_import(r#"{"text": "A", "category": "B"}"#).unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().contains("not a valid array"));
    }

    #[test]
    fn test_import_rejects_malformed_json() {
        let err = parse_import("[{").unwrap_err();
        assert!(err.to_string().starts_with("Invalid JSON file format"));
    }

    #[test]
    fn test_export_then_parse_keeps_entries() {
        let quotes = vec![
            Quote::new("local-1", "A", "Work"),
            Quote::new("server-2", "B.", "Server-A"),
        ];
        let parsed = parse_import(&export_json(&quotes).unwrap()).unwrap();
        assert_eq!(parsed, quotes);
    }
}
