use crate::error::{Result, SummaryError};
use crate::period::{parse_period_range, periods_between, PeriodKey};
use crate::summary::PeriodSummary;
use crate::trend::round1;
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// `part / whole * 100`, rounded to one decimal. `None` when `whole` is zero.
pub fn percent_of(part: f64, whole: f64) -> Option<f64> {
    if whole == 0.0 {
        return None;
    }
    Some(round1(part / whole * 100.0))
}

/// Share of each category in the period total. Empty when the total is zero.
pub fn category_shares(summary: &PeriodSummary) -> BTreeMap<String, f64> {
    summary
        .by_category
        .iter()
        .filter_map(|(category, amount)| {
            percent_of(*amount, summary.total).map(|share| (category.clone(), share))
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct KpiTarget {
    #[schemars(description = "Display name of the goal (e.g. 'Q1 consulting revenue')")]
    pub name: String,

    #[schemars(description = "'YYYY-MM' or 'YYYY-MM:YYYY-MM'. The months whose totals count towards the goal")]
    pub period: String,

    #[schemars(description = "Restrict the actual value to one category. Omit to use the period totals")]
    #[serde(default)]
    pub category: Option<String>,

    pub target: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiProgress {
    pub name: String,
    pub actual: f64,
    pub target: f64,
    /// `None` when the target is zero.
    pub progress_percent: Option<f64>,
    pub achieved: bool,
    /// Months of the goal period that had no summary. Empty when fully covered.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_periods: Vec<PeriodKey>,
}

/// Measures a goal against the summaries that fall inside its period.
///
/// Months of the goal period missing from `summaries` contribute nothing to
/// `actual`. They are listed in `missing_periods` and logged, so a partial
/// result is never mistaken for a complete one.
pub fn evaluate_kpi(target: &KpiTarget, summaries: &[PeriodSummary]) -> Result<KpiProgress> {
    if !target.target.is_finite() {
        return Err(SummaryError::ValidationError(format!(
            "KPI '{}' has a non-finite target",
            target.name
        )));
    }

    let (start, end) = parse_period_range(&target.period)?;

    let actual: f64 = summaries
        .iter()
        .filter(|s| s.period >= start && s.period <= end)
        .map(|s| match &target.category {
            Some(category) => s.by_category.get(category).copied().unwrap_or(0.0),
            None => s.total,
        })
        .sum();

    let covered: BTreeSet<PeriodKey> = summaries.iter().map(|s| s.period).collect();
    let missing_periods: Vec<PeriodKey> = periods_between(start, end)
        .into_iter()
        .filter(|p| !covered.contains(p))
        .collect();
    if !missing_periods.is_empty() {
        warn!(
            "KPI '{}': {} of the months in {} have no summary and count as zero",
            target.name,
            missing_periods.len(),
            target.period
        );
    }

    Ok(KpiProgress {
        name: target.name.clone(),
        actual,
        target: target.target,
        progress_percent: percent_of(actual, target.target),
        achieved: actual >= target.target,
        missing_periods,
    })
}
