use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One server-owned row of a collection
///
/// The backend is authoritative for the shape, so a record is kept as the raw
/// JSON object and read defensively: every accessor has a fallback instead of
/// assuming a field exists or has a particular type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Record(fields)
    }

    /// Build a record from any JSON value; non-objects become empty records.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Record(map),
            _ => Record::default(),
        }
    }

    /// Stable identity of the record, numbers and strings alike.
    pub fn id(&self) -> Option<String> {
        self.scalar("id")
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// String field, `None` when missing, null, empty, or not a string.
    pub fn str(&self, field: &str) -> Option<&str> {
        match self.0.get(field) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Any scalar field rendered as text (strings, numbers, booleans).
    pub fn scalar(&self, field: &str) -> Option<String> {
        self.0.get(field).and_then(scalar_text)
    }

    /// Scalar text with a fallback for missing values.
    pub fn text_or(&self, field: &str, fallback: &str) -> String {
        self.scalar(field)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn f64(&self, field: &str) -> Option<f64> {
        match self.0.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn bool(&self, field: &str) -> Option<bool> {
        match self.0.get(field)? {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Nested array of objects, empty when the field is absent or malformed.
    pub fn records(&self, field: &str) -> Vec<Record> {
        match self.0.get(field) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(Record(map.clone())),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Nested object, if present.
    pub fn object(&self, field: &str) -> Option<Record> {
        match self.0.get(field)? {
            Value::Object(map) => Some(Record(map.clone())),
            _ => None,
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Record(map)
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

const DISPLAY_DATE: &str = "%b %-d, %Y";

/// Parse the date shapes the backend and the rendered tables produce
///
/// Accepts RFC 3339 timestamps (with offset), naive ISO date-times with or
/// without fractional seconds, plain `YYYY-MM-DD` dates and the display form
/// `Jan 5, 2025`. Anything else, including bare numbers, is not a date.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    for format in ["%Y-%m-%d", "%b %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Human-readable date such as `Jan 5, 2025`
///
/// Missing values read `N/A`; unparseable values are shown as given.
pub fn format_date(raw: Option<&str>) -> String {
    match raw {
        None => "N/A".to_string(),
        Some(s) if s.trim().is_empty() => "N/A".to_string(),
        Some(s) => match parse_date(s) {
            Some(dt) => dt.format(DISPLAY_DATE).to_string(),
            None => s.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn group() -> Record {
        Record::from_value(json!({
            "id": 7,
            "group_name": "Team Alpha",
            "project_title": "",
            "is_active": true,
            "score": "12.5",
            "group_members": [
                {"member_name": "Ada Lovelace"},
                "not an object",
                {"member_name": "Alan Turing"}
            ],
            "stages": {"stage_1": true}
        }))
    }

    #[test]
    fn numeric_ids_read_as_text() {
        assert_eq!(group().id().as_deref(), Some("7"));
    }

    #[test]
    fn empty_strings_fall_back() {
        let g = group();
        assert_eq!(g.str("project_title"), None);
        assert_eq!(g.text_or("project_title", "N/A"), "N/A");
        assert_eq!(g.text_or("missing", "N/A"), "N/A");
        assert_eq!(g.text_or("group_name", "N/A"), "Team Alpha");
    }

    #[test]
    fn nested_records_skip_malformed_entries() {
        let members = group().records("group_members");
        assert_eq!(members.len(), 2);
        assert_eq!(members[1].str("member_name"), Some("Alan Turing"));
        assert!(group().records("group_name").is_empty());
        assert_eq!(group().object("stages").and_then(|s| s.bool("stage_1")), Some(true));
    }

    #[test]
    fn numbers_parse_from_strings() {
        assert_eq!(group().f64("score"), Some(12.5));
        assert_eq!(group().f64("group_name"), None);
    }

    #[test]
    fn non_objects_become_empty_records() {
        assert_eq!(Record::from_value(json!([1, 2])), Record::default());
    }

    #[test]
    fn parses_backend_and_display_dates() {
        assert!(parse_date("2025-01-05T10:00:00.123456+00:00").is_some());
        assert!(parse_date("2025-01-05T10:00:00").is_some());
        assert!(parse_date("2025-01-05").is_some());
        assert!(parse_date("Jan 5, 2025").is_some());
        assert!(parse_date("10").is_none());
        assert!(parse_date("Team Alpha").is_none());
    }

    #[test]
    fn formats_dates_for_display() {
        assert_eq!(format_date(Some("2025-01-05T10:00:00Z")), "Jan 5, 2025");
        assert_eq!(format_date(None), "N/A");
        assert_eq!(format_date(Some("someday")), "someday");
    }
}
