use crate::period::PeriodKey;
use crate::summary::{AnnualSummary, PeriodSummary};
use crate::trend::TrendEntry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub organization_name: String,
    pub fiscal_year_end_month: u32,
    pub summaries: Vec<PeriodSummary>,
    pub trends: Vec<TrendEntry>,
    pub year_over_year: Vec<TrendEntry>,
    pub annual: Vec<AnnualSummary>,
}

impl SummaryReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Every category that appears in any monthly summary, sorted.
    pub fn categories(&self) -> Vec<String> {
        let set: BTreeSet<&String> = self
            .summaries
            .iter()
            .flat_map(|s| s.by_category.keys())
            .collect();
        set.into_iter().cloned().collect()
    }

    pub fn trend_for(&self, period: PeriodKey) -> Option<&TrendEntry> {
        self.trends.iter().find(|t| t.period == period)
    }

    /// One row per month: totals, a column per category, then the profit
    /// columns (left blank for months without cost data).
    ///
    /// Fields are quoted per RFC 4180: a value containing a comma, double
    /// quote, CR or LF is wrapped in double quotes, with embedded quotes doubled.
    pub fn to_csv(&self) -> String {
        let categories = self.categories();
        let mut output = String::new();

        output.push_str("Period,Total");
        for category in &categories {
            output.push_str(&format!(",{}", csv_field(category)));
        }
        output.push_str(",Cost,Expenses,Gross Profit,Operating Profit,Change,Change %\n");

        let trends: BTreeMap<PeriodKey, &TrendEntry> =
            self.trends.iter().map(|t| (t.period, t)).collect();

        for summary in &self.summaries {
            output.push_str(&format!("{},{:.2}", summary.period, summary.total));

            for category in &categories {
                let value = summary.by_category.get(category).copied().unwrap_or(0.0);
                output.push_str(&format!(",{:.2}", value));
            }

            match &summary.profit {
                Some(p) => output.push_str(&format!(
                    ",{:.2},{:.2},{:.2},{:.2}",
                    p.cost, p.expenses, p.gross_profit, p.operating_profit
                )),
                None => output.push_str(",,,,"),
            }

            match trends.get(&summary.period) {
                Some(t) => output.push_str(&format!(
                    ",{:.2},{}\n",
                    t.change,
                    format_percent(t.change_percent)
                )),
                None => output.push_str(",,\n"),
            }
        }

        output
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Monthly Summary - {}\n\n", self.organization_name));
        output.push_str(&format!(
            "**Fiscal Year End:** Month {}\n\n",
            self.fiscal_year_end_month
        ));

        output.push_str("## Monthly Totals\n\n");
        output.push_str("| Period | Total | Change | Change % |\n");
        output.push_str("|---|---:|---:|---:|\n");
        for summary in &self.summaries {
            let (change, percent) = match self.trend_for(summary.period) {
                Some(t) => (format!("{:.2}", t.change), format_percent(t.change_percent)),
                None => ("-".to_string(), "-".to_string()),
            };
            output.push_str(&format!(
                "| {} | {:.2} | {} | {} |\n",
                summary.period, summary.total, change, percent
            ));
        }
        output.push('\n');

        let with_profit: Vec<&PeriodSummary> =
            self.summaries.iter().filter(|s| s.profit.is_some()).collect();
        if !with_profit.is_empty() {
            output.push_str("## Profit\n\n");
            output.push_str("| Period | Cost | Expenses | Gross Profit | Operating Profit |\n");
            output.push_str("|---|---:|---:|---:|---:|\n");
            for summary in with_profit {
                if let Some(p) = &summary.profit {
                    output.push_str(&format!(
                        "| {} | {:.2} | {:.2} | {:.2} | {:.2} |\n",
                        summary.period, p.cost, p.expenses, p.gross_profit, p.operating_profit
                    ));
                }
            }
            output.push('\n');
        }

        if !self.year_over_year.is_empty() {
            output.push_str("## Year over Year\n\n");
            for entry in &self.year_over_year {
                output.push_str(&format!(
                    "- {}: {:.2} ({})\n",
                    entry.period,
                    entry.change,
                    format_percent(entry.change_percent)
                ));
            }
            output.push('\n');
        }

        output.push_str("## Fiscal Years\n\n");
        for year in &self.annual {
            output.push_str(&format!("### FY{}\n\n", year.fiscal_year));
            output.push_str(&format!("- Total: {:.2}\n", year.total));
            for (category, amount) in &year.by_category {
                output.push_str(&format!("- {}: {:.2}\n", category, amount));
            }
            output.push('\n');
        }

        output
    }
}

fn format_percent(percent: Option<f64>) -> String {
    match percent {
        Some(p) => format!("{:.1}%", p),
        None => "n/a".to_string(),
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
