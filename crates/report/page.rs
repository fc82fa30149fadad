//! Single-page dashboard assembly. The page is self-contained apart from the
//! plotly.js runtime pulled from the CDN; all chart data is embedded inline.

use crate::charts::Chart;
use crate::data::{TitleRow, Totals};
use crate::palette;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.32.0.min.js";

pub fn render_dashboard(totals: &Totals, top_titles: &[TitleRow], charts: &[Chart]) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Streaming Content Analytics</title>
    <style>{css}</style>
    <script src="{plotly}"></script>
</head>
<body>
    <div class="container">
        {header}
        <div class="grid">
            {charts}
            {titles_table}
        </div>
        {footer}
    </div>
    <script>
{scripts}    </script>
</body>
</html>"#,
        css = inline_css(),
        plotly = PLOTLY_CDN,
        header = render_header(totals),
        charts = render_chart_cards(charts),
        titles_table = render_titles_table(top_titles),
        footer = render_footer(),
        scripts = render_scripts(charts),
    )
}

/// 2400000000.0 -> "2.4B", 93800000.0 -> "93.8M"
pub fn format_hours(hours: f64) -> String {
    if hours >= 1e9 {
        format!("{:.1}B", hours / 1e9)
    } else if hours >= 1e6 {
        format!("{:.1}M", hours / 1e6)
    } else if hours >= 1e3 {
        format!("{:.1}K", hours / 1e3)
    } else {
        format!("{:.0}", hours)
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn render_header(totals: &Totals) -> String {
    format!(
        r#"<header class="card">
            <h1>STREAMING CONTENT ANALYTICS</h1>
            <div class="stats">
                <div class="stat"><h3 class="green">{hours}</h3><p>Hours Viewed</p></div>
                <div class="stat"><h3 class="orange">{titles}</h3><p>Titles</p></div>
                <div class="stat"><h3 class="red">{languages}</h3><p>Languages</p></div>
            </div>
        </header>"#,
        hours = format_hours(totals.total_hours),
        titles = totals.titles,
        languages = totals.languages,
    )
}

fn render_chart_cards(charts: &[Chart]) -> String {
    charts
        .iter()
        .map(|chart| {
            format!(
                r#"<div class="card"><div id="{id}"></div></div>"#,
                id = chart.element_id
            )
        })
        .collect::<Vec<_>>()
        .join("\n            ")
}

fn render_titles_table(top_titles: &[TitleRow]) -> String {
    let rows = top_titles
        .iter()
        .map(|row| {
            format!(
                r#"<tr><td>{title}</td><td>{content_type}</td><td>{language}</td><td>{date}</td><td class="num">{hours}</td></tr>"#,
                title = escape(&row.title),
                content_type = escape(&row.content_type),
                language = escape(&row.language),
                date = row.release_date,
                hours = format_hours(row.hours),
            )
        })
        .collect::<Vec<_>>()
        .join("\n                    ");

    format!(
        r#"<div class="card wide">
                <h3>Top Performing Titles</h3>
                <table>
                    <thead><tr><th>Title</th><th>Type</th><th>Language</th><th>Released</th><th class="num">Hours</th></tr></thead>
                    <tbody>
                    {rows}
                    </tbody>
                </table>
            </div>"#,
        rows = rows
    )
}

fn render_footer() -> String {
    r#"<footer><p>Static snapshot; reload has no effect on the data.</p></footer>"#.to_string()
}

fn render_scripts(charts: &[Chart]) -> String {
    charts
        .iter()
        .map(|chart| {
            format!(
                "        Plotly.newPlot({id:?}, {traces}, {layout}, {{\"displayModeBar\": false}});\n",
                id = chart.element_id,
                traces = serde_json::to_string(&chart.traces).unwrap_or_else(|_| "[]".to_string()),
                layout = serde_json::to_string(&chart.layout).unwrap_or_else(|_| "{}".to_string()),
            )
        })
        .collect()
}

fn inline_css() -> String {
    format!(
        r#"
* {{ box-sizing: border-box; margin: 0; padding: 0; }}
body {{
    font-family: Arial, sans-serif;
    background-color: {bg};
    color: {text};
    min-height: 100vh;
}}
.container {{ max-width: 1400px; margin: 0 auto; padding: 20px; }}
.card {{
    background-color: {card};
    border-radius: 10px;
    padding: 15px;
    margin-bottom: 20px;
}}
header h1 {{ color: {primary}; margin: 0; }}
.stats {{ display: flex; justify-content: space-around; margin-top: 20px; }}
.stat {{ text-align: center; }}
.stat h3 {{ margin: 0; font-size: 1.5rem; }}
.stat p {{ margin: 0; color: #aaaaaa; }}
.green {{ color: {green}; }}
.orange {{ color: {orange}; }}
.red {{ color: {primary}; }}
.grid {{
    display: grid;
    grid-template-columns: repeat(2, minmax(0, 1fr));
    gap: 20px;
}}
.grid .card {{ margin-bottom: 0; }}
.wide {{ grid-column: 1 / -1; }}
h3 {{ margin-bottom: 10px; }}
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ padding: 12px; border-bottom: 1px solid {grid}; text-align: left; }}
th {{ font-weight: bold; color: {primary}; }}
td.num, th.num {{ text-align: right; }}
footer {{ color: #666666; font-size: 0.8rem; margin-top: 20px; }}
"#,
        bg = palette::BG,
        card = palette::CARD,
        primary = palette::PRIMARY,
        text = palette::TEXT,
        green = palette::ACCENT_GREEN,
        orange = palette::ACCENT_ORANGE,
        grid = palette::GRID,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts;
    use crate::data::SeriesRow;

    fn sample_totals() -> Totals {
        Totals {
            total_hours: 2_400_000_000.0,
            titles: 1240,
            languages: 7,
        }
    }

    fn sample_charts() -> Vec<Chart> {
        vec![
            charts::content_type_donut(&[SeriesRow {
                label: "Show".to_string(),
                hours: 1.0,
                releases: None,
            }]),
            charts::monthly_line(&[SeriesRow {
                label: "3".to_string(),
                hours: 10.0,
                releases: None,
            }]),
        ]
    }

    #[test]
    fn test_page_embeds_every_chart_once() {
        let html = render_dashboard(&sample_totals(), &[], &sample_charts());
        assert_eq!(html.matches(r#"id="chart-content-share""#).count(), 1);
        assert_eq!(html.matches(r#"id="chart-monthly""#).count(), 1);
        assert_eq!(html.matches("Plotly.newPlot").count(), 2);
        assert!(html.contains(PLOTLY_CDN));
    }

    #[test]
    fn test_header_totals_formatted() {
        let html = render_dashboard(&sample_totals(), &[], &[]);
        assert!(html.contains("2.4B"));
        assert!(html.contains("1240"));
    }

    #[test]
    fn test_titles_table_escapes_html() {
        let rows = vec![TitleRow {
            title: "Ginny & Georgia <S2>".to_string(),
            hours: 665_100_000.0,
            language: "English".to_string(),
            content_type: "Show".to_string(),
            release_date: "2023-01-05".to_string(),
        }];
        let html = render_dashboard(&sample_totals(), &rows, &[]);
        assert!(html.contains("Ginny &amp; Georgia &lt;S2&gt;"));
        assert!(html.contains("665.1M"));
        assert!(!html.contains("<S2>"));
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(2_400_000_000.0), "2.4B");
        assert_eq!(format_hours(93_800_000.0), "93.8M");
        assert_eq!(format_hours(12_500.0), "12.5K");
        assert_eq!(format_hours(42.0), "42");
        assert_eq!(format_hours(0.0), "0");
    }
}
