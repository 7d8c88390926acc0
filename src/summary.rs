use crate::aggregation::{aggregate_by_category, total_of_categories};
use crate::bucketing::{bucket_by_fiscal_year, bucket_by_period};
use crate::error::Result;
use crate::period::{validate_fiscal_year_end_month, PeriodKey};
use crate::schema::{MonetaryRecord, OptionalFieldPolicy, RecordFilter};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cost side of a period, present only when the records carry cost data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitBreakdown {
    pub cost: f64,
    pub expenses: f64,
    /// `total - cost`
    pub gross_profit: f64,
    /// `gross_profit - expenses`
    pub operating_profit: f64,
}

impl ProfitBreakdown {
    pub fn new(total: f64, cost: f64, expenses: f64) -> Self {
        let gross_profit = total - cost;
        Self {
            cost,
            expenses,
            gross_profit,
            operating_profit: gross_profit - expenses,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub period: PeriodKey,
    pub total: f64,
    pub by_category: BTreeMap<String, f64>,
    #[serde(flatten)]
    pub profit: Option<ProfitBreakdown>,
}

/// A fiscal year, labelled by the calendar year in which it ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualSummary {
    pub fiscal_year: i32,
    pub total: f64,
    pub by_category: BTreeMap<String, f64>,
    #[serde(flatten)]
    pub profit: Option<ProfitBreakdown>,
}

pub struct SummaryBuilder {
    policy: OptionalFieldPolicy,
    filter: Option<RecordFilter>,
}

impl Default for SummaryBuilder {
    fn default() -> Self {
        Self::new(OptionalFieldPolicy::Omit)
    }
}

impl SummaryBuilder {
    pub fn new(policy: OptionalFieldPolicy) -> Self {
        Self {
            policy,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: Option<RecordFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn build_summary(&self, period: PeriodKey, records: &[&MonetaryRecord]) -> PeriodSummary {
        let (total, by_category, profit) = self.summarize(&period.to_string(), records);
        PeriodSummary {
            period,
            total,
            by_category,
            profit,
        }
    }

    /// One summary per requested period, oldest first. Duplicate periods are
    /// collapsed and periods without records get an empty summary.
    pub fn build_summaries(
        &self,
        records: &[MonetaryRecord],
        periods: &[PeriodKey],
    ) -> Result<Vec<PeriodSummary>> {
        let buckets = bucket_by_period(records, self.filter.as_ref())?;
        debug!(
            "Bucketed {} records into {} periods",
            records.len(),
            buckets.len()
        );

        let mut periods = periods.to_vec();
        periods.sort();
        periods.dedup();

        let summaries = periods
            .into_iter()
            .map(|period| {
                let bucket = buckets.get(&period).map(Vec::as_slice).unwrap_or(&[]);
                self.build_summary(period, bucket)
            })
            .collect();

        Ok(summaries)
    }

    /// One summary per fiscal year that has at least one record, oldest first.
    pub fn build_annual_summaries(
        &self,
        records: &[MonetaryRecord],
        fiscal_year_end_month: u32,
    ) -> Result<Vec<AnnualSummary>> {
        validate_fiscal_year_end_month(fiscal_year_end_month)?;

        let years = bucket_by_fiscal_year(records, fiscal_year_end_month, self.filter.as_ref())?;

        Ok(years
            .into_iter()
            .map(|(fiscal_year, bucket)| {
                let (total, by_category, profit) =
                    self.summarize(&format!("FY{}", fiscal_year), &bucket);
                AnnualSummary {
                    fiscal_year,
                    total,
                    by_category,
                    profit,
                }
            })
            .collect())
    }

    fn summarize(
        &self,
        label: &str,
        records: &[&MonetaryRecord],
    ) -> (f64, BTreeMap<String, f64>, Option<ProfitBreakdown>) {
        let by_category = aggregate_by_category(records.iter().copied());
        let total = total_of_categories(&by_category);
        let profit = self.profit_for(label, total, records);
        (total, by_category, profit)
    }

    fn profit_for(
        &self,
        label: &str,
        total: f64,
        records: &[&MonetaryRecord],
    ) -> Option<ProfitBreakdown> {
        let carrying = records
            .iter()
            .filter(|r| r.cost.is_some() && r.expenses.is_some())
            .count();
        let touched = records
            .iter()
            .filter(|r| r.cost.is_some() || r.expenses.is_some())
            .count();

        match self.policy {
            OptionalFieldPolicy::Omit => {
                if records.is_empty() || carrying < records.len() {
                    if touched > 0 {
                        warn!(
                            "{}: only {} of {} records carry cost and expenses, profit fields omitted",
                            label,
                            carrying,
                            records.len()
                        );
                    }
                    return None;
                }
            }
            OptionalFieldPolicy::TreatMissingAsZero => {
                if touched == 0 {
                    return None;
                }
            }
        }

        let cost: f64 = records.iter().filter_map(|r| r.cost).sum();
        let expenses: f64 = records.iter().filter_map(|r| r.expenses).sum();
        Some(ProfitBreakdown::new(total, cost, expenses))
    }
}

pub fn build_summary(period: PeriodKey, records: &[&MonetaryRecord]) -> PeriodSummary {
    SummaryBuilder::default().build_summary(period, records)
}

pub fn build_summaries(records: &[MonetaryRecord], periods: &[PeriodKey]) -> Result<Vec<PeriodSummary>> {
    SummaryBuilder::default().build_summaries(records, periods)
}

pub fn build_annual_summaries(
    records: &[MonetaryRecord],
    fiscal_year_end_month: u32,
) -> Result<Vec<AnnualSummary>> {
    SummaryBuilder::default().build_annual_summaries(records, fiscal_year_end_month)
}
