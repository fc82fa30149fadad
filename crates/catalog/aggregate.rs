use crate::dataset::epoch_days;
use chrono::NaiveDate;
use polars::prelude::*;

/// Release-date window applied before every aggregate.
#[derive(Debug, Default, Clone, Copy)]
pub struct FilterOptions {
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

/// Header figures for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub total_hours: f64,
    pub titles: i64,
    pub languages: i64,
}

/// Borrow-wrapper that turns the normalized table into the chart series.
/// Every method is a pure lazy query; no I/O happens here.
pub struct CatalogFrame<'a> {
    df: &'a DataFrame,
    filter_options: &'a FilterOptions,
}

impl<'a> CatalogFrame<'a> {
    pub fn new(df: &'a DataFrame, filter_options: &'a FilterOptions) -> Self {
        CatalogFrame { df, filter_options }
    }

    fn filtered(&self) -> LazyFrame {
        let mut filter_expr = lit(true);

        if let Some(since) = self.filter_options.since {
            filter_expr = filter_expr.and(col("release_epoch_days").gt_eq(lit(epoch_days(since))));
        };
        if let Some(until) = self.filter_options.until {
            filter_expr = filter_expr.and(col("release_epoch_days").lt_eq(lit(epoch_days(until))));
        };

        self.df.clone().lazy().filter(filter_expr)
    }

    /// Total hours per content type, labels sorted.
    pub fn by_content_type(&self) -> PolarsResult<DataFrame> {
        self.filtered()
            .group_by([col("content_type")])
            .agg([col("hours").sum()])
            .select([col("content_type").alias("label"), col("hours")])
            .sort(["label"], SortMultipleOptions::default())
            .collect()
    }

    /// Total hours per language, heaviest first.
    pub fn by_language(&self) -> PolarsResult<DataFrame> {
        self.filtered()
            .group_by([col("language")])
            .agg([col("hours").sum()])
            .select([col("language").alias("label"), col("hours")])
            .sort(
                ["hours"],
                SortMultipleOptions::default().with_order_descending(true),
            )
            .collect()
    }

    /// Total hours per release month (1-12). Months absent from the data are
    /// filled in at presentation time.
    pub fn by_month(&self) -> PolarsResult<DataFrame> {
        self.filtered()
            .group_by([col("release_month")])
            .agg([col("hours").sum()])
            .select([col("release_month").alias("label"), col("hours")])
            .sort(["label"], SortMultipleOptions::default())
            .collect()
    }

    /// Total hours per (release month, content type) pair.
    pub fn by_month_and_type(&self) -> PolarsResult<DataFrame> {
        self.filtered()
            .group_by([col("release_month"), col("content_type")])
            .agg([col("hours").sum()])
            .select([
                col("release_month").alias("label"),
                col("content_type"),
                col("hours"),
            ])
            .sort(["label", "content_type"], SortMultipleOptions::default())
            .collect()
    }

    /// Total hours per season. Seasonal display order is fixed downstream.
    pub fn by_season(&self) -> PolarsResult<DataFrame> {
        self.filtered()
            .group_by([col("release_season")])
            .agg([col("hours").sum()])
            .select([col("release_season").alias("label"), col("hours")])
            .sort(["label"], SortMultipleOptions::default())
            .collect()
    }

    /// Release count and total hours per month.
    pub fn monthly_release_pattern(&self) -> PolarsResult<DataFrame> {
        self.filtered()
            .group_by([col("release_month")])
            .agg([
                col("hours").sum(),
                col("title").count().cast(DataType::Int64).alias("releases"),
            ])
            .select([
                col("release_month").alias("label"),
                col("hours"),
                col("releases"),
            ])
            .sort(["label"], SortMultipleOptions::default())
            .collect()
    }

    /// Release count and total hours per weekday (1=Mon .. 7=Sun).
    pub fn weekday_release_pattern(&self) -> PolarsResult<DataFrame> {
        self.filtered()
            .group_by([col("release_weekday")])
            .agg([
                col("hours").sum(),
                col("title").count().cast(DataType::Int64).alias("releases"),
            ])
            .select([
                col("release_weekday").alias("label"),
                col("hours"),
                col("releases"),
            ])
            .sort(["label"], SortMultipleOptions::default())
            .collect()
    }

    /// Total hours per release date, restricted to dates within `window`
    /// days of any listed holiday.
    pub fn near_holidays(
        &self,
        holidays: &[NaiveDate],
        window: i32,
    ) -> PolarsResult<DataFrame> {
        let mut within = lit(false);
        for holiday in holidays {
            let day = epoch_days(*holiday);
            let lo = day - window;
            let hi = day + window;
            within = within.or(col("release_epoch_days")
                .gt_eq(lit(lo))
                .and(col("release_epoch_days").lt_eq(lit(hi))));
        }

        self.filtered()
            .filter(within)
            .group_by([col("release_date")])
            .agg([col("hours").sum()])
            .select([
                col("release_date").dt().strftime("%Y-%m-%d").alias("label"),
                col("hours"),
            ])
            // ISO labels sort chronologically
            .sort(["label"], SortMultipleOptions::default())
            .collect()
    }

    /// The `n` most-watched rows.
    pub fn top_titles(&self, n: u32) -> PolarsResult<DataFrame> {
        self.filtered()
            .select([
                col("title"),
                col("hours"),
                col("language"),
                col("content_type"),
                col("release_date").dt().strftime("%Y-%m-%d").alias("release_date"),
            ])
            .sort(
                ["hours"],
                SortMultipleOptions::default().with_order_descending(true),
            )
            .limit(n)
            .collect()
    }

    pub fn totals(&self) -> PolarsResult<Totals> {
        let df = self
            .filtered()
            .select([
                col("hours").sum().alias("total_hours"),
                col("title").count().cast(DataType::Int64).alias("titles"),
                col("language")
                    .n_unique()
                    .cast(DataType::Int64)
                    .alias("languages"),
            ])
            .collect()?;

        Ok(Totals {
            total_hours: df.column("total_hours")?.f64()?.get(0).unwrap_or(0.0),
            titles: df.column("titles")?.i64()?.get(0).unwrap_or(0),
            languages: df.column("languages")?.i64()?.get(0).unwrap_or(0),
        })
    }
}
