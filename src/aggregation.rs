use crate::schema::MonetaryRecord;
use std::collections::BTreeMap;

/// Sums `amount` per category. Labels are compared exactly (case-sensitive).
pub fn aggregate_by_category<'a, I>(records: I) -> BTreeMap<String, f64>
where
    I: IntoIterator<Item = &'a MonetaryRecord>,
{
    let mut by_category: BTreeMap<String, f64> = BTreeMap::new();

    for record in records {
        *by_category.entry(record.category.clone()).or_insert(0.0) += record.amount;
    }

    by_category
}

/// Grand total of a bucket.
///
/// Summed from the per-category subtotals in category order, so the result is
/// bit-for-bit equal to summing the values of `aggregate_by_category`.
pub fn total<'a, I>(records: I) -> f64
where
    I: IntoIterator<Item = &'a MonetaryRecord>,
{
    total_of_categories(&aggregate_by_category(records))
}

pub fn total_of_categories(by_category: &BTreeMap<String, f64>) -> f64 {
    by_category.values().sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(category: &str, amount: f64) -> MonetaryRecord {
        MonetaryRecord::new(
            "x",
            NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
            amount,
            category,
        )
    }

    #[test]
    fn test_empty_input() {
        let records: Vec<MonetaryRecord> = vec![];
        assert!(aggregate_by_category(&records).is_empty());
        assert_eq!(total(&records), 0.0);
    }

    #[test]
    fn test_categories_are_case_sensitive() {
        let records = vec![record("Rent", 100.0), record("rent", 50.0), record("Rent", 25.0)];
        let by_category = aggregate_by_category(&records);

        assert_eq!(by_category.len(), 2);
        assert_eq!(by_category["Rent"], 125.0);
        assert_eq!(by_category["rent"], 50.0);
    }

    #[test]
    fn test_total_matches_category_sum() {
        let records = vec![
            record("A", 500000.0),
            record("B", 100000.0),
            record("A", -2500.5),
            record("C", 0.25),
        ];

        let category_sum: f64 = aggregate_by_category(&records).values().sum();
        assert_eq!(total(&records), category_sum);
    }

    #[test]
    fn test_total_matches_category_sum_under_cancellation() {
        let records = vec![record("A", 1e16), record("B", 1.0), record("A", -1e16)];

        let by_category = aggregate_by_category(&records);
        assert_eq!(by_category["A"], 0.0);
        assert_eq!(by_category["B"], 1.0);

        let category_sum: f64 = by_category.values().sum();
        assert_eq!(total(&records), category_sum);
        assert_eq!(total(&records), 1.0);
    }

    #[test]
    fn test_accepts_bucket_references() {
        let records = vec![record("A", 1.0), record("B", 2.0)];
        let bucket: Vec<&MonetaryRecord> = records.iter().collect();

        assert_eq!(total(bucket.iter().copied()), 3.0);
        assert_eq!(aggregate_by_category(bucket.iter().copied()).len(), 2);
    }
}
