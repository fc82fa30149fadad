//! Maps aggregate series onto plotly trace/layout payloads. Rendering is the
//! browser's job; everything here is plain JSON.

use crate::data::{SeriesRow, TypedRow};
use crate::palette;
use serde_json::{json, Value};
use std::collections::BTreeMap;

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];
pub const SEASON_ORDER: [&str; 4] = ["Winter", "Spring", "Summer", "Fall"];

#[derive(Debug)]
pub struct Chart {
    pub element_id: &'static str,
    pub traces: Vec<Value>,
    pub layout: Value,
}

/// Spread rows keyed by a 1-based numeric label over a fixed axis of `n`
/// slots, zero-filling the gaps.
fn indexed(rows: &[SeriesRow], n: usize) -> (Vec<f64>, Vec<i64>) {
    let mut hours = vec![0.0; n];
    let mut releases = vec![0i64; n];
    for row in rows {
        if let Ok(i) = row.label.parse::<usize>() {
            if (1..=n).contains(&i) {
                hours[i - 1] = row.hours;
                releases[i - 1] = row.releases.unwrap_or(0);
            }
        }
    }
    (hours, releases)
}

/// Reorder rows into a fixed label order, zero-filling missing labels.
fn reindex(rows: &[SeriesRow], order: &[&str]) -> Vec<f64> {
    order
        .iter()
        .map(|label| {
            rows.iter()
                .find(|r| r.label == *label)
                .map(|r| r.hours)
                .unwrap_or(0.0)
        })
        .collect()
}

fn base_layout(title: &str, height: u32) -> Value {
    json!({
        "title": {"text": title},
        "plot_bgcolor": palette::CARD,
        "paper_bgcolor": palette::CARD,
        "font": {"color": palette::TEXT},
        "height": height,
        "margin": {"l": 40, "r": 40, "t": 60, "b": 40},
        "xaxis": {"showgrid": true, "gridcolor": palette::GRID},
        "yaxis": {"showgrid": true, "gridcolor": palette::GRID},
    })
}

fn dual_axis_layout(title: &str, y1_title: &str, y2_title: &str) -> Value {
    let mut layout = base_layout(title, 340);
    layout["yaxis"] = json!({"title": {"text": y1_title}, "showgrid": false, "side": "left"});
    layout["yaxis2"] = json!({
        "title": {"text": y2_title},
        "overlaying": "y",
        "side": "right",
        "showgrid": false,
    });
    layout["legend"] = json!({
        "orientation": "h",
        "yanchor": "bottom",
        "y": 1.02,
        "xanchor": "right",
        "x": 1,
    });
    layout
}

pub fn content_type_bar(rows: &[SeriesRow]) -> Chart {
    let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
    let hours: Vec<f64> = rows.iter().map(|r| r.hours).collect();
    Chart {
        element_id: "chart-content-type",
        traces: vec![json!({
            "type": "bar",
            "x": labels,
            "y": hours,
            "marker": {"color": [palette::PRIMARY, palette::ACCENT_ORANGE]},
        })],
        layout: base_layout("Total Viewership Hours by Content Type", 320),
    }
}

/// Donut variant of the content-type split for the side panel.
pub fn content_type_donut(rows: &[SeriesRow]) -> Chart {
    let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
    let hours: Vec<f64> = rows.iter().map(|r| r.hours).collect();
    Chart {
        element_id: "chart-content-share",
        traces: vec![json!({
            "type": "pie",
            "labels": labels,
            "values": hours,
            "hole": 0.7,
            "marker": {"colors": [palette::PRIMARY, palette::ACCENT_ORANGE]},
        })],
        layout: base_layout("Content Distribution", 280),
    }
}

/// Languages heaviest-first, truncated to `top` entries.
pub fn language_bar(rows: &[SeriesRow], top: usize) -> Chart {
    let shown = &rows[..rows.len().min(top)];
    let labels: Vec<&str> = shown.iter().map(|r| r.label.as_str()).collect();
    let hours: Vec<f64> = shown.iter().map(|r| r.hours).collect();
    let mut layout = base_layout("Total Viewership Hours by Language", 320);
    layout["xaxis"]["tickangle"] = json!(45);
    Chart {
        element_id: "chart-language",
        traces: vec![json!({
            "type": "bar",
            "x": labels,
            "y": hours,
            "marker": {"color": palette::PRIMARY},
        })],
        layout,
    }
}

pub fn monthly_line(rows: &[SeriesRow]) -> Chart {
    let (hours, _) = indexed(rows, 12);
    Chart {
        element_id: "chart-monthly",
        traces: vec![json!({
            "type": "scatter",
            "mode": "lines+markers",
            "x": MONTH_NAMES,
            "y": hours,
            "fill": "tozeroy",
            "line": {"color": palette::PRIMARY, "width": 3},
            "name": "Monthly Views",
        })],
        layout: base_layout("Total Viewership Hours by Release Month", 340),
    }
}

/// One line per content type across the twelve months.
pub fn monthly_by_type_lines(rows: &[TypedRow]) -> Chart {
    let mut per_type: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for row in rows {
        let slots = per_type
            .entry(row.content_type.as_str())
            .or_insert_with(|| vec![0.0; 12]);
        if let Ok(i) = row.label.parse::<usize>() {
            if (1..=12).contains(&i) {
                slots[i - 1] = row.hours;
            }
        }
    }

    let traces = per_type
        .iter()
        .map(|(content_type, hours)| {
            json!({
                "type": "scatter",
                "mode": "lines+markers",
                "x": MONTH_NAMES,
                "y": hours,
                "name": content_type,
            })
        })
        .collect();

    let mut layout = base_layout("Viewership Trends by Content Type and Release Month", 340);
    layout["legend"] = json!({"title": {"text": "Content Type"}});
    Chart {
        element_id: "chart-month-by-type",
        traces,
        layout,
    }
}

pub fn season_bar(rows: &[SeriesRow]) -> Chart {
    let hours = reindex(rows, &SEASON_ORDER);
    Chart {
        element_id: "chart-season",
        traces: vec![json!({
            "type": "bar",
            "x": SEASON_ORDER,
            "y": hours,
            "marker": {"color": palette::ACCENT_ORANGE},
        })],
        layout: base_layout("Total Viewership Hours by Release Season", 320),
    }
}

pub fn monthly_pattern(rows: &[SeriesRow]) -> Chart {
    let (hours, releases) = indexed(rows, 12);
    Chart {
        element_id: "chart-monthly-pattern",
        traces: vec![
            json!({
                "type": "bar",
                "x": MONTH_NAMES,
                "y": releases,
                "name": "Number of Releases",
                "marker": {"color": palette::ACCENT_ORANGE},
                "opacity": 0.7,
                "yaxis": "y",
            }),
            json!({
                "type": "scatter",
                "mode": "lines+markers",
                "x": MONTH_NAMES,
                "y": hours,
                "name": "Viewership Hours",
                "line": {"color": palette::PRIMARY},
                "yaxis": "y2",
            }),
        ],
        layout: dual_axis_layout(
            "Monthly Release Patterns and Viewership Hours",
            "Number of Releases",
            "Total Hours Viewed",
        ),
    }
}

pub fn weekday_pattern(rows: &[SeriesRow]) -> Chart {
    let (hours, releases) = indexed(rows, 7);
    Chart {
        element_id: "chart-weekday-pattern",
        traces: vec![
            json!({
                "type": "bar",
                "x": WEEKDAY_NAMES,
                "y": releases,
                "name": "Number of Releases",
                "marker": {"color": palette::ACCENT_ORANGE},
                "opacity": 0.6,
                "yaxis": "y",
            }),
            json!({
                "type": "scatter",
                "mode": "lines+markers",
                "x": WEEKDAY_NAMES,
                "y": hours,
                "name": "Viewership Hours",
                "line": {"color": palette::ACCENT_GREEN, "width": 3},
                "yaxis": "y2",
            }),
        ],
        layout: dual_axis_layout(
            "Weekly Release Patterns and Viewership Hours",
            "Number of Releases",
            "Total Hours Viewed",
        ),
    }
}

pub fn holiday_bar(rows: &[SeriesRow]) -> Chart {
    let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
    let hours: Vec<f64> = rows.iter().map(|r| r.hours).collect();
    let mut layout = base_layout("Viewership Hours for Releases Near Holidays", 320);
    layout["xaxis"]["type"] = json!("category");
    layout["xaxis"]["tickangle"] = json!(45);
    Chart {
        element_id: "chart-holiday",
        traces: vec![json!({
            "type": "bar",
            "x": labels,
            "y": hours,
            "marker": {"color": palette::PRIMARY},
        })],
        layout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(label: &str, hours: f64, releases: Option<i64>) -> SeriesRow {
        SeriesRow {
            label: label.to_string(),
            hours,
            releases,
        }
    }

    #[test]
    fn test_indexed_zero_fills_missing_months() {
        let rows = vec![row("3", 10.0, Some(2)), row("12", 5.0, Some(1))];
        let (hours, releases) = indexed(&rows, 12);
        assert_eq!(hours.len(), 12);
        assert_eq!(hours[2], 10.0);
        assert_eq!(hours[11], 5.0);
        assert_eq!(hours[0], 0.0);
        assert_eq!(releases[2], 2);
        assert_eq!(releases[0], 0);
    }

    #[test]
    fn test_indexed_ignores_out_of_range_labels() {
        let rows = vec![row("0", 1.0, None), row("13", 2.0, None), row("x", 3.0, None)];
        let (hours, _) = indexed(&rows, 12);
        assert!(hours.iter().all(|h| *h == 0.0));
    }

    #[test]
    fn test_season_bar_fixed_order() {
        // deliberately shuffled and incomplete
        let rows = vec![row("Fall", 4.0, None), row("Winter", 1.0, None)];
        let chart = season_bar(&rows);
        assert_eq!(chart.traces[0]["x"], json!(SEASON_ORDER));
        assert_eq!(chart.traces[0]["y"], json!([1.0, 0.0, 0.0, 4.0]));
    }

    #[test]
    fn test_language_bar_truncates() {
        let rows: Vec<SeriesRow> = (0..8)
            .map(|i| row(&format!("lang{}", i), (8 - i) as f64, None))
            .collect();
        let chart = language_bar(&rows, 5);
        assert_eq!(chart.traces[0]["x"].as_array().unwrap().len(), 5);
        assert_eq!(chart.traces[0]["x"][0], json!("lang0"));
    }

    #[test]
    fn test_dual_axis_charts_have_second_axis() {
        let chart = monthly_pattern(&[row("1", 10.0, Some(3))]);
        assert_eq!(chart.traces.len(), 2);
        assert_eq!(chart.traces[1]["yaxis"], json!("y2"));
        assert_eq!(chart.layout["yaxis2"]["overlaying"], json!("y"));
    }

    #[test]
    fn test_monthly_by_type_one_trace_per_type() {
        let rows = vec![
            TypedRow {
                label: "1".to_string(),
                content_type: "Movie".to_string(),
                hours: 1.0,
            },
            TypedRow {
                label: "2".to_string(),
                content_type: "Show".to_string(),
                hours: 2.0,
            },
            TypedRow {
                label: "3".to_string(),
                content_type: "Movie".to_string(),
                hours: 3.0,
            },
        ];
        let chart = monthly_by_type_lines(&rows);
        assert_eq!(chart.traces.len(), 2);
        assert_eq!(chart.traces[0]["name"], json!("Movie"));
        assert_eq!(chart.traces[0]["y"][0], json!(1.0));
        assert_eq!(chart.traces[0]["y"][2], json!(3.0));
        assert_eq!(chart.traces[1]["name"], json!("Show"));
    }

    #[test]
    fn test_content_type_donut_hole() {
        let chart = content_type_donut(&[row("Movie", 1.0, None), row("Show", 2.0, None)]);
        assert_eq!(chart.traces[0]["hole"], json!(0.7));
        assert_eq!(chart.element_id, "chart-content-share");
    }
}
