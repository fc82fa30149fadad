use chrono::NaiveDate;
use log::info;
use polars::io::mmap::MmapBytesReader;
use polars::prelude::*;
use std::error::Error;

/// Raw CSV headers as they appear in the export.
const RAW_TITLE: &str = "Title";
const RAW_RELEASE_DATE: &str = "Release Date";
const RAW_HOURS: &str = "Hours Viewed";
const RAW_LANGUAGE: &str = "Language Indicator";
const RAW_CONTENT_TYPE: &str = "Content Type";

/// Days since 1970-01-01, the physical representation of a polars Date.
pub fn epoch_days(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    (date - epoch).num_days() as i32
}

pub fn season_name(month: i32) -> &'static str {
    match month {
        12 | 1 | 2 => "Winter",
        3..=5 => "Spring",
        6..=8 => "Summer",
        _ => "Fall",
    }
}

fn season_expr() -> Expr {
    let to_season = |s: Series| -> Result<Option<Series>, PolarsError> {
        let named: Vec<&str> = s
            .i32()?
            .into_iter()
            .map(|m| season_name(m.unwrap_or(0)))
            .collect();
        Ok(Some(Series::new("release_season", named)))
    };
    col("release_month")
        .map(to_season, GetOutput::from_type(DataType::String))
        .alias("release_season")
}

/// Rename to working column names, clean the thousands-separated hours
/// figures, drop rows without a usable date or hour count, and derive the
/// date buckets every aggregate keys on.
fn normalize(lf: LazyFrame) -> LazyFrame {
    lf.select([
        col(RAW_TITLE).alias("title"),
        col(RAW_RELEASE_DATE).alias("release_date"),
        col(RAW_HOURS)
            .cast(DataType::String)
            .str()
            .replace_all(lit(","), lit(""), true)
            .cast(DataType::Float64)
            .alias("hours"),
        col(RAW_LANGUAGE).alias("language"),
        col(RAW_CONTENT_TYPE).alias("content_type"),
    ])
    .drop_nulls(Some(vec![col("hours"), col("release_date")]))
    .with_columns([
        col("release_date")
            .dt()
            .month()
            .cast(DataType::Int32)
            .alias("release_month"),
        col("release_date")
            .dt()
            .weekday()
            .cast(DataType::Int32)
            .alias("release_weekday"),
        col("release_date")
            .cast(DataType::Int32)
            .alias("release_epoch_days"),
    ])
    .with_column(season_expr())
}

pub fn load(path: &str) -> Result<DataFrame, Box<dyn Error>> {
    let lf = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_try_parse_dates(true)
        .finish()?;
    let df = normalize(lf).collect()?;
    info!("dataset loaded: {} rows from {}", df.height(), path);
    Ok(df)
}

/// Same normalization over an in-memory handle. Used by tests and by anything
/// that already holds the bytes.
pub fn read_from<R: MmapBytesReader + 'static>(handle: R) -> Result<DataFrame, Box<dyn Error>> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .map_parse_options(|s| s.with_try_parse_dates(true))
        .into_reader_with_file_handle(handle)
        .finish()?;
    Ok(normalize(df.lazy()).collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
Title,Available Globally?,Release Date,Hours Viewed,Language Indicator,Content Type
The Night Agent,Yes,2023-03-23,\"812,100,000\",English,Show
Ginny & Georgia,Yes,2023-01-05,\"665,100,000\",English,Show
King the Land,No,2023-06-17,\"630,200,000\",Korean,Show
Luther: The Fallen Sun,Yes,2023-03-10,\"209,700,000\",English,Movie
Broken Date,No,,\"3,400,000\",English,Movie
";

    #[test]
    fn test_normalize_columns_and_buckets() {
        let df = read_from(Cursor::new(SAMPLE.as_bytes())).unwrap();
        // row without a release date is dropped
        assert_eq!(df.height(), 4);

        let hours = df.column("hours").unwrap().f64().unwrap();
        assert_eq!(hours.get(0), Some(812_100_000.0));

        let months = df.column("release_month").unwrap().i32().unwrap();
        assert_eq!(months.get(0), Some(3));
        assert_eq!(months.get(2), Some(6));

        // 2023-03-23 was a Thursday
        let weekdays = df.column("release_weekday").unwrap().i32().unwrap();
        assert_eq!(weekdays.get(0), Some(4));

        let seasons = df.column("release_season").unwrap().str().unwrap();
        assert_eq!(seasons.get(0), Some("Spring"));
        assert_eq!(seasons.get(2), Some("Summer"));
    }

    #[test]
    fn test_season_name() {
        assert_eq!(season_name(12), "Winter");
        assert_eq!(season_name(1), "Winter");
        assert_eq!(season_name(2), "Winter");
        assert_eq!(season_name(3), "Spring");
        assert_eq!(season_name(5), "Spring");
        assert_eq!(season_name(6), "Summer");
        assert_eq!(season_name(8), "Summer");
        assert_eq!(season_name(9), "Fall");
        assert_eq!(season_name(11), "Fall");
    }

    #[test]
    fn test_epoch_days() {
        assert_eq!(epoch_days(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0);
        assert_eq!(
            epoch_days(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()),
            19358
        );
    }
}
