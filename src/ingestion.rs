use crate::error::{Result, SummaryError};
use crate::period::period_key_of;
use crate::schema::{MonetaryRecord, RawRecord, SummaryConfig};
use chrono::NaiveDate;
use log::warn;

/// Turns a raw persisted record into a `MonetaryRecord`, rejecting anything the
/// aggregation core would otherwise have to guess about.
pub fn validate_raw_record(raw: &RawRecord) -> Result<MonetaryRecord> {
    let id = match raw.id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => return Err(missing_id()),
    };

    let invalid = |details: String| SummaryError::InvalidRecord {
        id: id.clone(),
        details,
    };

    let date_str = raw
        .date
        .as_deref()
        .ok_or_else(|| invalid("Missing date".to_string()))?;
    let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|_| {
        invalid(format!(
            "Invalid date format: '{}'. Expected YYYY-MM-DD",
            date_str
        ))
    })?;

    let amount = raw
        .amount
        .ok_or_else(|| invalid("Missing amount".to_string()))?;
    let category = raw
        .category
        .clone()
        .ok_or_else(|| invalid("Missing category".to_string()))?;

    let employee_id = raw
        .employee_id
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string);

    let record = MonetaryRecord {
        id,
        date,
        amount,
        category,
        employee_id,
        cost: raw.cost,
        expenses: raw.expenses,
    };
    validate_record(&record)?;
    Ok(record)
}

/// Checks the invariants every stored or summarized record must satisfy:
/// a non-blank id and category, a date inside the supported year range, a
/// finite amount, and non-negative finite cost and expenses when present.
pub fn validate_record(record: &MonetaryRecord) -> Result<()> {
    if record.id.trim().is_empty() {
        return Err(missing_id());
    }

    let invalid = |details: String| SummaryError::InvalidRecord {
        id: record.id.clone(),
        details,
    };

    period_key_of(record.date).map_err(|e| invalid(e.to_string()))?;

    if !record.amount.is_finite() {
        return Err(invalid(format!(
            "Amount {} is not a finite number",
            record.amount
        )));
    }

    if record.category.trim().is_empty() {
        return Err(invalid("Missing category".to_string()));
    }

    for (name, value) in [("cost", record.cost), ("expenses", record.expenses)] {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(invalid(format!(
                    "{} must be a non-negative finite number, got {}",
                    name, v
                )));
            }
        }
    }

    Ok(())
}

fn missing_id() -> SummaryError {
    SummaryError::InvalidRecord {
        id: "<missing>".to_string(),
        details: "Record has no id".to_string(),
    }
}

/// Checks a record's category against the configured known set.
/// Unknown labels are logged, or rejected in strict mode.
pub fn check_category(record: &MonetaryRecord, config: &SummaryConfig) -> Result<()> {
    if config.known_categories.is_empty()
        || config.known_categories.iter().any(|c| *c == record.category)
    {
        return Ok(());
    }

    if config.strict_categories {
        return Err(SummaryError::UnknownCategory {
            id: record.id.clone(),
            category: record.category.clone(),
        });
    }

    warn!(
        "Record '{}' uses category '{}' which is not in the known category list",
        record.id, record.category
    );
    Ok(())
}

/// Validates a whole raw collection. Fails on the first invalid record.
pub fn ingest_records(raw_records: &[RawRecord], config: &SummaryConfig) -> Result<Vec<MonetaryRecord>> {
    raw_records
        .iter()
        .map(|raw| {
            let record = validate_raw_record(raw)?;
            check_category(&record, config)?;
            Ok(record)
        })
        .collect()
}

/// Parses a persisted JSON array of records and validates each one.
pub fn ingest_json(json: &str, config: &SummaryConfig) -> Result<Vec<MonetaryRecord>> {
    let raw_records: Vec<RawRecord> = serde_json::from_str(json)?;
    ingest_records(&raw_records, config)
}
