use crate::error::{Result, SummaryError};
use crate::period::validate_fiscal_year_end_month;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A validated, dated monetary fact (a sale, a fixed cost, a contractor payment).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonetaryRecord {
    pub id: String,
    pub date: NaiveDate,
    pub amount: f64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expenses: Option<f64>,
}

impl MonetaryRecord {
    pub fn new(id: impl Into<String>, date: NaiveDate, amount: f64, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            date,
            amount,
            category: category.into(),
            employee_id: None,
            cost: None,
            expenses: None,
        }
    }

    pub fn with_employee(mut self, employee_id: impl Into<String>) -> Self {
        self.employee_id = Some(employee_id.into());
        self
    }

    pub fn with_cost_and_expenses(mut self, cost: f64, expenses: f64) -> Self {
        self.cost = Some(cost);
        self.expenses = Some(expenses);
        self
    }
}

/// A record exactly as found in a persisted collection, before validation.
/// Every field may be missing; `ingestion` decides what is acceptable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawRecord {
    #[schemars(description = "Unique identifier of the record within its collection")]
    #[serde(default)]
    pub id: Option<String>,

    #[schemars(description = "Calendar date in YYYY-MM-DD format, taken as local wall-clock date")]
    #[serde(default)]
    pub date: Option<String>,

    #[schemars(description = "Monetary amount. Sales revenue for transactions, the charge for costs and payments")]
    #[serde(default)]
    pub amount: Option<f64>,

    #[schemars(description = "Free-form label used for subtotals (e.g. 'Consulting', 'Rent')")]
    #[serde(default)]
    pub category: Option<String>,

    #[schemars(description = "Employee the record is attributed to, if any")]
    #[serde(default)]
    pub employee_id: Option<String>,

    #[schemars(description = "Cost of sales attached to this record. Must be present together with 'expenses'")]
    #[serde(default)]
    pub cost: Option<f64>,

    #[schemars(description = "Operating expenses attached to this record. Must be present together with 'cost'")]
    #[serde(default)]
    pub expenses: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OptionalFieldPolicy {
    #[schemars(
        description = "Profit fields are reported only when every record of the period carries both cost and expenses. Avoids silently understating costs."
    )]
    #[default]
    Omit,

    #[schemars(
        description = "Profit fields are reported when any record of the period carries cost or expenses; missing values count as zero."
    )]
    TreatMissingAsZero,
}

/// Restricts which records take part in a summary. Applied before bucketing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecordFilter {
    #[schemars(description = "Keep only records attributed to this employee")]
    #[serde(default)]
    pub employee_id: Option<String>,

    #[schemars(description = "Keep only records in one of these categories (exact match)")]
    #[serde(default)]
    pub categories: Option<BTreeSet<String>>,
}

impl RecordFilter {
    pub fn for_employee(employee_id: impl Into<String>) -> Self {
        Self {
            employee_id: Some(employee_id.into()),
            categories: None,
        }
    }

    pub fn matches(&self, record: &MonetaryRecord) -> bool {
        if let Some(employee_id) = &self.employee_id {
            if record.employee_id.as_deref() != Some(employee_id.as_str()) {
                return false;
            }
        }

        if let Some(categories) = &self.categories {
            if !categories.contains(&record.category) {
                return false;
            }
        }

        true
    }
}

fn default_fiscal_year_end_month() -> u32 {
    12
}

fn default_trailing_months() -> u32 {
    12
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SummaryConfig {
    #[schemars(description = "The name of the business the records belong to")]
    pub organization_name: String,

    #[schemars(
        description = "The month when the fiscal year ends (1 = January, 12 = December). For calendar year companies, use 12. For July-June fiscal year, use 6."
    )]
    #[serde(default = "default_fiscal_year_end_month")]
    pub fiscal_year_end_month: u32,

    #[schemars(description = "How many calendar months, ending at the reporting period, to summarize")]
    #[serde(default = "default_trailing_months")]
    pub trailing_months: u32,

    #[serde(default)]
    pub optional_fields: OptionalFieldPolicy,

    #[schemars(
        description = "Category labels the business expects. Empty disables the check. Unknown labels are logged, or rejected when 'strict_categories' is set."
    )]
    #[serde(default)]
    pub known_categories: Vec<String>,

    #[serde(default)]
    pub strict_categories: bool,

    #[serde(default)]
    pub filter: Option<RecordFilter>,
}

impl SummaryConfig {
    pub fn new(organization_name: impl Into<String>) -> Self {
        Self {
            organization_name: organization_name.into(),
            fiscal_year_end_month: default_fiscal_year_end_month(),
            trailing_months: default_trailing_months(),
            optional_fields: OptionalFieldPolicy::default(),
            known_categories: Vec::new(),
            strict_categories: false,
            filter: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_fiscal_year_end_month(self.fiscal_year_end_month)?;

        if self.trailing_months == 0 {
            return Err(SummaryError::ValidationError(
                "trailing_months must be at least 1".to_string(),
            ));
        }

        if self.strict_categories && self.known_categories.is_empty() {
            return Err(SummaryError::ValidationError(
                "strict_categories requires a non-empty known_categories list".to_string(),
            ));
        }

        if let Some(blank) = self.known_categories.iter().find(|c| c.trim().is_empty()) {
            return Err(SummaryError::ValidationError(format!(
                "known_categories contains a blank label: '{}'",
                blank
            )));
        }

        Ok(())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(SummaryConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

impl RawRecord {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(RawRecord)
    }
}
