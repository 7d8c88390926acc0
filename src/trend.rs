use crate::period::{same_period_last_year, PeriodKey};
use crate::summary::PeriodSummary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendEntry {
    pub period: PeriodKey,
    pub change: f64,
    /// `None` (JSON `null`) when the prior period's total is zero.
    pub change_percent: Option<f64>,
}

impl TrendEntry {
    pub fn between(prior: &PeriodSummary, current: &PeriodSummary) -> Self {
        let change = current.total - prior.total;
        Self {
            period: current.period,
            change,
            change_percent: percent_change(change, prior.total),
        }
    }
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `change / base * 100`, rounded to one decimal. `None` for a zero base.
pub fn percent_change(change: f64, base: f64) -> Option<f64> {
    if base == 0.0 {
        return None;
    }
    Some(round1(change / base * 100.0))
}

/// Month-over-month change across an ordered summary sequence. The first
/// summary has nothing to compare against, so the result is one shorter.
pub fn compute_trends(summaries: &[PeriodSummary]) -> Vec<TrendEntry> {
    summaries
        .windows(2)
        .map(|pair| TrendEntry::between(&pair[0], &pair[1]))
        .collect()
}

/// Change against the same month one year earlier, for every summary whose
/// prior-year month is also in the sequence.
pub fn compute_year_over_year(summaries: &[PeriodSummary]) -> Vec<TrendEntry> {
    let by_period: BTreeMap<PeriodKey, &PeriodSummary> =
        summaries.iter().map(|s| (s.period, s)).collect();

    summaries
        .iter()
        .filter_map(|current| {
            let prior_key = same_period_last_year(current.period).ok()?;
            let prior = by_period.get(&prior_key)?;
            Some(TrendEntry::between(prior, current))
        })
        .collect()
}
