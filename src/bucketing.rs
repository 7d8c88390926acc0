use crate::error::{Result, SummaryError};
use crate::period::{fiscal_year_of, period_key_of, PeriodKey};
use crate::schema::{MonetaryRecord, RecordFilter};
use std::collections::BTreeMap;

pub type Buckets<'a> = BTreeMap<PeriodKey, Vec<&'a MonetaryRecord>>;

/// Groups records by the month they fall in.
///
/// The filter runs before a record is assigned, so buckets only ever hold
/// matching records. Within a bucket records keep their input order. Periods
/// without records are absent from the map; callers that need a fixed window
/// enumerate it themselves (see `period::trailing_periods`).
pub fn bucket_by_period<'a>(
    records: &'a [MonetaryRecord],
    filter: Option<&RecordFilter>,
) -> Result<Buckets<'a>> {
    let mut buckets: Buckets<'a> = BTreeMap::new();

    for record in records {
        if let Some(filter) = filter {
            if !filter.matches(record) {
                continue;
            }
        }

        let key = period_key_of(record.date).map_err(|e| SummaryError::InvalidRecord {
            id: record.id.clone(),
            details: e.to_string(),
        })?;

        buckets.entry(key).or_default().push(record);
    }

    Ok(buckets)
}

/// Groups records by fiscal year, labelled by the calendar year the fiscal year ends in.
pub fn bucket_by_fiscal_year<'a>(
    records: &'a [MonetaryRecord],
    fiscal_year_end_month: u32,
    filter: Option<&RecordFilter>,
) -> Result<BTreeMap<i32, Vec<&'a MonetaryRecord>>> {
    let mut years: BTreeMap<i32, Vec<&'a MonetaryRecord>> = BTreeMap::new();

    for (period, bucket) in bucket_by_period(records, filter)? {
        years
            .entry(fiscal_year_of(period, fiscal_year_end_month))
            .or_default()
            .extend(bucket);
    }

    Ok(years)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: &str, y: i32, m: u32, d: u32, amount: f64) -> MonetaryRecord {
        MonetaryRecord::new(id, NaiveDate::from_ymd_opt(y, m, d).unwrap(), amount, "A")
    }

    #[test]
    fn test_empty_input_yields_empty_map() {
        let buckets = bucket_by_period(&[], None).unwrap();
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_bucketing_is_a_partition() {
        let records = vec![
            record("1", 2023, 1, 15, 1.0),
            record("2", 2023, 2, 1, 2.0),
            record("3", 2023, 1, 31, 3.0),
            record("4", 2022, 12, 31, 4.0),
            record("5", 2023, 1, 1, 5.0),
        ];

        let buckets = bucket_by_period(&records, None).unwrap();
        assert_eq!(buckets.len(), 3);

        let mut seen: Vec<&str> = buckets
            .values()
            .flat_map(|b| b.iter().map(|r| r.id.as_str()))
            .collect();
        seen.sort();
        assert_eq!(seen, vec!["1", "2", "3", "4", "5"]);

        // Input order is preserved inside a bucket
        let january: Vec<&str> = buckets[&"2023-01".parse::<PeriodKey>().unwrap()]
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(january, vec!["1", "3", "5"]);
    }

    #[test]
    fn test_filter_applies_before_bucketing() {
        let records = vec![
            record("1", 2023, 1, 15, 1.0).with_employee("e-1"),
            record("2", 2023, 1, 16, 2.0).with_employee("e-2"),
            record("3", 2023, 2, 16, 3.0).with_employee("e-2"),
        ];

        let filter = RecordFilter::for_employee("e-1");
        let buckets = bucket_by_period(&records, Some(&filter)).unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets.values().next().unwrap().len(), 1);
    }

    #[test]
    fn test_out_of_range_date_is_rejected() {
        let records = vec![record("far", 12000, 1, 1, 1.0)];
        let err = bucket_by_period(&records, None).unwrap_err();
        assert!(matches!(err, SummaryError::InvalidRecord { ref id, .. } if id == "far"));
    }

    #[test]
    fn test_bucket_by_fiscal_year() {
        let records = vec![
            record("1", 2022, 7, 1, 1.0),
            record("2", 2023, 6, 30, 1.0),
            record("3", 2023, 7, 1, 1.0),
        ];

        let years = bucket_by_fiscal_year(&records, 6, None).unwrap();
        assert_eq!(years[&2023].len(), 2);
        assert_eq!(years[&2024].len(), 1);
    }
}
