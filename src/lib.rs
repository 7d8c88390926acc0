//! # Monthly Summary Builder
//!
//! A library for turning flat collections of dated business records (sales,
//! fixed costs, contractor payments) into monthly summaries, profit figures and
//! period-over-period trends.
//!
//! ## Core Concepts
//!
//! - **Period**: a calendar month, keyed as `YYYY-MM`
//! - **Bucket**: the records whose date falls within one period
//! - **Summary**: per-period total, per-category breakdown and, when the records carry cost data, gross and operating profit
//! - **Trend**: absolute and percentage change between adjacent periods
//!
//! Every stage is a pure function over the records it is given. Nothing is
//! cached between calls; summaries are recomputed from the collection each time.
//!
//! ## Example
//!
//! ```rust
//! use monthly_summary_builder::*;
//! use chrono::NaiveDate;
//!
//! let records = vec![
//!     MonetaryRecord::new("1", NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(), 500000.0, "A"),
//!     MonetaryRecord::new("2", NaiveDate::from_ymd_opt(2023, 1, 20).unwrap(), 100000.0, "B"),
//!     MonetaryRecord::new("3", NaiveDate::from_ymd_opt(2023, 2, 1).unwrap(), 300000.0, "A"),
//! ];
//!
//! let periods = trailing_periods("2023-02".parse().unwrap(), 2).unwrap();
//! let summaries = build_summaries(&records, &periods).unwrap();
//! let trends = compute_trends(&summaries);
//!
//! assert_eq!(summaries[0].total, 600000.0);
//! assert_eq!(trends[0].change_percent, Some(-50.0));
//! ```

pub mod aggregation;
pub mod bucketing;
pub mod error;
pub mod ingestion;
pub mod kpi;
pub mod period;
pub mod report;
pub mod schema;
pub mod store;
pub mod summary;
pub mod trend;

pub use aggregation::{aggregate_by_category, total, total_of_categories};
pub use bucketing::{bucket_by_fiscal_year, bucket_by_period, Buckets};
pub use error::{Result, SummaryError};
pub use ingestion::{check_category, ingest_json, ingest_records, validate_raw_record, validate_record};
pub use kpi::{category_shares, evaluate_kpi, percent_of, KpiProgress, KpiTarget};
pub use period::*;
pub use report::SummaryReport;
pub use schema::*;
pub use store::RecordStore;
pub use summary::{
    build_annual_summaries, build_summaries, build_summary, AnnualSummary, PeriodSummary,
    ProfitBreakdown, SummaryBuilder,
};
pub use trend::{compute_trends, compute_year_over_year, percent_change, TrendEntry};

use log::{debug, info};

pub struct SummaryProcessor;

impl SummaryProcessor {
    /// Summarizes the `config.trailing_months` months ending at `end_period`.
    pub fn process(
        config: &SummaryConfig,
        records: &[MonetaryRecord],
        end_period: PeriodKey,
    ) -> Result<SummaryReport> {
        config.validate()?;

        info!(
            "Summarizing {} records for organization: {}",
            records.len(),
            config.organization_name
        );

        for record in records {
            check_category(record, config)?;
        }

        let periods = trailing_periods(end_period, config.trailing_months)?;
        debug!(
            "Reporting window {}..={} ({} months)",
            periods.first().map(ToString::to_string).unwrap_or_default(),
            end_period,
            periods.len()
        );

        let builder =
            SummaryBuilder::new(config.optional_fields).with_filter(config.filter.clone());

        let summaries = builder.build_summaries(records, &periods)?;
        let trends = compute_trends(&summaries);
        let year_over_year = Self::year_over_year(&builder, records, &periods)?;
        let annual = builder.build_annual_summaries(records, config.fiscal_year_end_month)?;

        debug!(
            "Built {} summaries, {} trends, {} year-over-year entries, {} fiscal years",
            summaries.len(),
            trends.len(),
            year_over_year.len(),
            annual.len()
        );

        Ok(SummaryReport {
            organization_name: config.organization_name.clone(),
            fiscal_year_end_month: config.fiscal_year_end_month,
            summaries,
            trends,
            year_over_year,
            annual,
        })
    }

    pub fn process_store(
        config: &SummaryConfig,
        store: &RecordStore,
        end_period: PeriodKey,
    ) -> Result<SummaryReport> {
        Self::process(config, store.records(), end_period)
    }

    /// Validates a persisted JSON array of raw records, then summarizes it.
    pub fn process_json(
        config: &SummaryConfig,
        json: &str,
        end_period: PeriodKey,
    ) -> Result<SummaryReport> {
        let records = ingest_json(json, config)?;
        Self::process(config, &records, end_period)
    }

    fn year_over_year(
        builder: &SummaryBuilder,
        records: &[MonetaryRecord],
        periods: &[PeriodKey],
    ) -> Result<Vec<TrendEntry>> {
        let mut comparison = periods.to_vec();
        comparison.extend(
            periods
                .iter()
                .filter_map(|p| same_period_last_year(*p).ok()),
        );

        let summaries = builder.build_summaries(records, &comparison)?;

        Ok(compute_year_over_year(&summaries)
            .into_iter()
            .filter(|t| periods.contains(&t.period))
            .collect())
    }
}

pub fn process_summary(
    config: &SummaryConfig,
    records: &[MonetaryRecord],
    end_period: PeriodKey,
) -> Result<SummaryReport> {
    SummaryProcessor::process(config, records, end_period)
}
