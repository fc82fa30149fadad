use catalog::aggregate::{CatalogFrame, FilterOptions};
use catalog::dataset;
use report::charts::{self, Chart};
use report::data::{SeriesRow, TitleRow, Totals, TypedRow};
use report::page;

use axum::response::Html;
use axum::routing::get;
use axum::Router;
use chrono::NaiveDate;
use clap::builder::PossibleValuesParser;
use clap::Parser;
use csv::Writer;
use env_logger::Env;
use polars::prelude::*;
use std::error::Error;
use std::fs::File;
use std::net::SocketAddr;
use std::path::Path;

use log::{debug, error, info};

/// Write a flat csv file.
///
/// # Arguments
/// * `filename` - destination path
/// * `header` - csv header row
/// * `data` - csv data rows
pub fn write_csv<P: AsRef<Path>>(
    filename: P,
    header: Vec<String>,
    data: Vec<Vec<String>>,
) -> Result<(), Box<dyn Error>> {
    let file = File::create(&filename)?;
    let mut wtr = Writer::from_writer(file);

    wtr.write_record(header)?;

    for record in data {
        wtr.write_record(record)?;
    }
    wtr.flush()?;
    info!("CSV file written successfully: {:?}", filename.as_ref());

    Ok(())
}

/// Normalized detail table dump (polars csv writer).
fn write_detail(filename: &str, df: &DataFrame) -> Result<(), Box<dyn Error>> {
    let mut file = File::create(filename)?;
    let mut m_df = df.clone();
    CsvWriter::new(&mut file).finish(&mut m_df)?;
    info!("detail csv file written: {}", filename);
    Ok(())
}

/// Decode a DataFrame into serde rows through the polars json writer.
fn df_to_rows<T: serde::de::DeserializeOwned>(df: &DataFrame) -> Result<Vec<T>, Box<dyn Error>> {
    if df.height() == 0 {
        return Ok(vec![]);
    }
    let mut d = df.clone();
    let mut j = Vec::<u8>::new();
    JsonWriter::new(&mut j)
        .with_json_format(JsonFormat::Json)
        .finish(&mut d)?;
    let rows = serde_json::from_slice::<Vec<T>>(&j)?;
    Ok(rows)
}

enum OutputType {
    SERVE,
    HTML,
    CSV,
    POLAR,
}

impl OutputType {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "serve" => Some(OutputType::SERVE),
            "html" => Some(OutputType::HTML),
            "csv" => Some(OutputType::CSV),
            "polar" => Some(OutputType::POLAR),
            _ => None,
        }
    }
}

trait Output {
    fn output(&self) -> Result<(), Box<dyn Error>>;
}

struct PolarOutput {
    frames: Vec<(&'static str, DataFrame)>,
}

impl PolarOutput {
    fn new(frames: Vec<(&'static str, DataFrame)>) -> Self {
        PolarOutput { frames }
    }
}

impl Output for PolarOutput {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        for (name, df) in &self.frames {
            println!("-- {}", name);
            println!("{}", df);
        }
        Ok(())
    }
}

struct CsvOutput {
    filename: String,
    records: Vec<Vec<String>>,
}

impl CsvOutput {
    fn new(filename: String, records: Vec<Vec<String>>) -> Self {
        CsvOutput { filename, records }
    }
}

impl Output for CsvOutput {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        let header = ["chart", "label", "content_type", "hours", "releases"]
            .map(String::from)
            .to_vec();
        write_csv(&self.filename, header, self.records.clone())
    }
}

struct HtmlOutput {
    filename: String,
    page: String,
}

impl HtmlOutput {
    fn new(filename: String, page: String) -> Self {
        HtmlOutput { filename, page }
    }
}

impl Output for HtmlOutput {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        std::fs::write(&self.filename, &self.page)?;
        info!("dashboard written: {}", self.filename);
        Ok(())
    }
}

struct ServeOutput {
    addr: String,
    page: String,
}

impl ServeOutput {
    fn new(addr: String, page: String) -> Self {
        ServeOutput { addr, page }
    }
}

impl Output for ServeOutput {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        let addr: SocketAddr = self.addr.parse()?;
        // rendered once at startup, every request gets the same bytes
        let page = Html(self.page.clone());

        let rt = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        rt.block_on(async move {
            let app = Router::new().route(
                "/",
                get(move || {
                    let page = page.clone();
                    async move { page }
                }),
            );
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!("dashboard listening on http://{}", addr);
            axum::serve(listener, app).await?;
            Ok::<(), std::io::Error>(())
        })?;
        Ok(())
    }
}

#[derive(Parser, Debug, Clone)]
#[command(version, about = "streaming-content viewership dashboard", long_about = None)]
struct Args {
    #[arg(
        short = 'F',
        long = "format",
        value_parser = PossibleValuesParser::new(["serve", "html", "csv", "polar"]),
        default_value = "serve",
        help = "output format"
    )]
    format: String,

    #[arg(
        long = "config",
        default_value = ".view-stat.yml",
        help = "run configuration file"
    )]
    config: String,

    #[arg(long = "data", help = "dataset csv, overrides the configured path")]
    data: Option<String>,

    #[arg(
        long = "output",
        help = "destination file for html/csv formats, e.g. --output dashboard.html"
    )]
    output: Option<String>,

    #[arg(
        long = "detail",
        help = "keep detail csv file or not, e.g. --detail detail.csv"
    )]
    detail: Option<String>,

    #[arg(long = "no-detail", action=clap::ArgAction::SetTrue, help="do not keep detail csv file, ignore --detail if this is set")]
    no_detail: bool,

    /// since date
    #[arg(long = "since", value_parser = parse_cli_date, help = "earliest release date, 2023-01-01")]
    since: Option<NaiveDate>,

    /// until date
    #[arg(long = "until", value_parser = parse_cli_date, help = "latest release date, 2023-12-31")]
    until: Option<NaiveDate>,

    #[arg(
        long = "listen",
        help = "listen address for the serve format, overrides config"
    )]
    listen: Option<String>,
}

fn parse_cli_date(s: &str) -> Result<NaiveDate, std::io::Error> {
    match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(d) => Ok(d),
        Err(e) => {
            error!("parse date err: {}", e);
            Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "Invalid date format",
            ))
        }
    }
}

/// Everything the output backends need, computed once from the loaded table.
struct ReportBundle {
    totals: Totals,
    top_titles: Vec<TitleRow>,
    charts: Vec<Chart>,
    series_frames: Vec<(&'static str, DataFrame)>,
    top_frame: DataFrame,
}

impl ReportBundle {
    fn render_page(&self) -> String {
        page::render_dashboard(&self.totals, &self.top_titles, &self.charts)
    }
}

fn build_report(
    df: &DataFrame,
    filter_options: &FilterOptions,
    holidays: &[NaiveDate],
    window: i32,
) -> Result<ReportBundle, Box<dyn Error>> {
    let frame = CatalogFrame::new(df, filter_options);

    let content_type = frame.by_content_type()?;
    let language = frame.by_language()?;
    let monthly = frame.by_month()?;
    let month_by_type = frame.by_month_and_type()?;
    let season = frame.by_season()?;
    let monthly_pattern = frame.monthly_release_pattern()?;
    let weekday_pattern = frame.weekday_release_pattern()?;
    let holiday = frame.near_holidays(holidays, window)?;
    let top_frame = frame.top_titles(5)?;

    let agg_totals = frame.totals()?;
    let totals = Totals {
        total_hours: agg_totals.total_hours,
        titles: agg_totals.titles,
        languages: agg_totals.languages,
    };

    let charts = vec![
        charts::monthly_line(&df_to_rows::<SeriesRow>(&monthly)?),
        charts::content_type_donut(&df_to_rows::<SeriesRow>(&content_type)?),
        charts::weekday_pattern(&df_to_rows::<SeriesRow>(&weekday_pattern)?),
        charts::language_bar(&df_to_rows::<SeriesRow>(&language)?, 5),
        charts::monthly_pattern(&df_to_rows::<SeriesRow>(&monthly_pattern)?),
        charts::season_bar(&df_to_rows::<SeriesRow>(&season)?),
        charts::monthly_by_type_lines(&df_to_rows::<TypedRow>(&month_by_type)?),
        charts::content_type_bar(&df_to_rows::<SeriesRow>(&content_type)?),
        charts::holiday_bar(&df_to_rows::<SeriesRow>(&holiday)?),
    ];

    let top_titles = df_to_rows::<TitleRow>(&top_frame)?;

    Ok(ReportBundle {
        totals,
        top_titles,
        charts,
        series_frames: vec![
            ("content_type", content_type),
            ("language", language),
            ("monthly", monthly),
            ("month_by_type", month_by_type),
            ("season", season),
            ("monthly_pattern", monthly_pattern),
            ("weekday_pattern", weekday_pattern),
            ("holiday", holiday),
        ],
        top_frame,
    })
}

fn field_str(row: &serde_json::Map<String, serde_json::Value>, key: &str) -> String {
    match row.get(key) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Flatten every aggregate frame into one record list for the csv format.
fn csv_records(frames: &[(&'static str, DataFrame)]) -> Result<Vec<Vec<String>>, Box<dyn Error>> {
    let mut records = vec![];
    for (name, df) in frames {
        let rows: Vec<serde_json::Map<String, serde_json::Value>> = df_to_rows(df)?;
        for row in rows {
            records.push(vec![
                name.to_string(),
                field_str(&row, "label"),
                field_str(&row, "content_type"),
                field_str(&row, "hours"),
                field_str(&row, "releases"),
            ]);
        }
    }
    Ok(records)
}

fn get_output(
    output_type: OutputType,
    args: &Args,
    conf: &config::Config,
    bundle: ReportBundle,
) -> Result<Box<dyn Output>, Box<dyn Error>> {
    match output_type {
        OutputType::SERVE => {
            let addr = args.listen.clone().unwrap_or_else(|| conf.listen.clone());
            Ok(Box::new(ServeOutput::new(addr, bundle.render_page())))
        }
        OutputType::HTML => {
            let filename = args
                .output
                .clone()
                .unwrap_or_else(|| String::from("dashboard.html"));
            Ok(Box::new(HtmlOutput::new(filename, bundle.render_page())))
        }
        OutputType::CSV => {
            let filename = args
                .output
                .clone()
                .unwrap_or_else(|| String::from("report.csv"));
            let records = csv_records(&bundle.series_frames)?;
            Ok(Box::new(CsvOutput::new(filename, records)))
        }
        OutputType::POLAR => {
            let mut frames = bundle.series_frames;
            frames.push(("top_titles", bundle.top_frame));
            Ok(Box::new(PolarOutput::new(frames)))
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let conf = if Path::new(&args.config).exists() {
        config::Config::load(&args.config)?
    } else {
        debug!("config file {} not found, using defaults", args.config);
        config::Config::default()
    };

    let data_path = args.data.clone().unwrap_or_else(|| conf.data.clone());
    let df = dataset::load(&data_path)?;

    if !args.no_detail {
        let detail_file = args.detail.clone().unwrap_or("detail.csv".to_string());
        info!("detail csv file: {}", detail_file);
        write_detail(&detail_file, &df)?;
    }

    let filter_options = FilterOptions {
        since: args.since,
        until: args.until,
    };
    debug!("filter options: {:?}", filter_options);

    let holidays = conf.holiday_dates()?;
    let bundle = build_report(&df, &filter_options, &holidays, conf.holiday_window_days)?;

    let out_type = match OutputType::from_str(args.format.as_str()) {
        Some(t) => t,
        None => return Err("unknown output format".into()),
    };
    get_output(out_type, &args, &conf, bundle)?.output()
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}
