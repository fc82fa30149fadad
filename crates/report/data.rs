use serde::{Deserialize, Deserializer, Serialize};

fn deserialize_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = Deserialize::deserialize(deserializer)?;
    if let serde_json::Value::String(s) = value {
        Ok(s)
    } else if let serde_json::Value::Number(s) = value {
        Ok(s.to_string())
    } else {
        Err(serde::de::Error::custom("Expected string|number"))
    }
}

/// One point of an aggregate series. `label` may arrive as a JSON number
/// (month and weekday keys) or a string (everything else).
#[derive(Debug, Serialize, Deserialize)]
pub struct SeriesRow {
    #[serde(deserialize_with = "deserialize_string")]
    pub label: String,
    pub hours: f64,
    #[serde(default)]
    pub releases: Option<i64>,
}

/// One point of the month-by-content-type series.
#[derive(Debug, Serialize, Deserialize)]
pub struct TypedRow {
    #[serde(deserialize_with = "deserialize_string")]
    pub label: String,
    pub content_type: String,
    pub hours: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TitleRow {
    pub title: String,
    pub hours: f64,
    pub language: String,
    pub content_type: String,
    pub release_date: String,
}

/// Header figures shown above the chart grid.
#[derive(Debug, Clone, Copy)]
pub struct Totals {
    pub total_hours: f64,
    pub titles: i64,
    pub languages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_accepts_number_or_string() {
        let rows: Vec<SeriesRow> =
            serde_json::from_str(r#"[{"label":3,"hours":1.5},{"label":"Winter","hours":2.0}]"#)
                .unwrap();
        assert_eq!(rows[0].label, "3");
        assert_eq!(rows[0].releases, None);
        assert_eq!(rows[1].label, "Winter");
    }

    #[test]
    fn test_series_row_with_releases() {
        let rows: Vec<SeriesRow> =
            serde_json::from_str(r#"[{"label":1,"hours":10.0,"releases":4}]"#).unwrap();
        assert_eq!(rows[0].releases, Some(4));
    }
}
