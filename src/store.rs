use crate::error::{Result, SummaryError};
use crate::ingestion::{validate_raw_record, validate_record};
use crate::schema::{MonetaryRecord, RawRecord};
use serde::Serialize;

/// An owned, explicitly passed record collection.
///
/// Records are immutable once stored: they change only by full replacement
/// under the same id, and leave only by removal. Insertion order is kept so
/// that summaries built from the store are reproducible. Every record passes
/// `validate_record` on the way in, whichever door it comes through.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RecordStore {
    records: Vec<MonetaryRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from existing records, rejecting invalid records and duplicate ids.
    pub fn from_records(records: Vec<MonetaryRecord>) -> Result<Self> {
        let mut store = Self::new();
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    /// Loads a persisted blob. Entries are read as raw records so that the
    /// same boundary checks as `ingestion` apply.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw_records: Vec<RawRecord> = serde_json::from_str(json)?;
        let records = raw_records
            .iter()
            .map(validate_raw_record)
            .collect::<Result<Vec<_>>>()?;
        Self::from_records(records)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }

    pub fn records(&self) -> &[MonetaryRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&MonetaryRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn insert(&mut self, record: MonetaryRecord) -> Result<()> {
        validate_record(&record)?;
        if self.get(&record.id).is_some() {
            return Err(SummaryError::DuplicateRecord(record.id));
        }
        self.records.push(record);
        Ok(())
    }

    /// Replaces the record with the same id, returning the previous version.
    pub fn replace(&mut self, record: MonetaryRecord) -> Result<MonetaryRecord> {
        validate_record(&record)?;
        let slot = self
            .records
            .iter_mut()
            .find(|r| r.id == record.id)
            .ok_or_else(|| SummaryError::RecordNotFound(record.id.clone()))?;
        Ok(std::mem::replace(slot, record))
    }

    pub fn remove(&mut self, id: &str) -> Result<MonetaryRecord> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| SummaryError::RecordNotFound(id.to_string()))?;
        Ok(self.records.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: &str, amount: f64) -> MonetaryRecord {
        MonetaryRecord::new(
            id,
            NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            amount,
            "Rent",
        )
    }

    #[test]
    fn test_insert_replace_remove() {
        let mut store = RecordStore::new();
        store.insert(record("a", 100.0)).unwrap();
        store.insert(record("b", 200.0)).unwrap();
        assert_eq!(store.len(), 2);

        assert!(matches!(
            store.insert(record("a", 1.0)),
            Err(SummaryError::DuplicateRecord(_))
        ));

        let old = store.replace(record("a", 150.0)).unwrap();
        assert_eq!(old.amount, 100.0);
        assert_eq!(store.get("a").unwrap().amount, 150.0);
        assert_eq!(store.records()[0].id, "a");

        assert!(matches!(
            store.replace(record("zzz", 1.0)),
            Err(SummaryError::RecordNotFound(_))
        ));

        let removed = store.remove("b").unwrap();
        assert_eq!(removed.amount, 200.0);
        assert!(store.get("b").is_none());
        assert!(store.remove("b").is_err());
    }

    #[test]
    fn test_json_blob() {
        let store = RecordStore::from_records(vec![record("a", 100.0), record("b", 50.5)]).unwrap();
        let json = store.to_json().unwrap();
        assert!(json.trim_start().starts_with('['));

        let restored = RecordStore::from_json(&json).unwrap();
        assert_eq!(restored, store);

        let duplicated = r#"[
            { "id": "a", "date": "2023-01-01", "amount": 1, "category": "A" },
            { "id": "a", "date": "2023-01-02", "amount": 2, "category": "A" }
        ]"#;
        assert!(RecordStore::from_json(duplicated).is_err());
    }

    #[test]
    fn test_invalid_blob_is_rejected() {
        let blank = r#"[{ "id": "", "date": "2023-01-01", "amount": 1, "category": "   ", "cost": -50, "expenses": 0 }]"#;
        assert!(matches!(
            RecordStore::from_json(blank),
            Err(SummaryError::InvalidRecord { .. })
        ));

        let negative_cost = r#"[{ "id": "a", "date": "2023-01-01", "amount": 1, "category": "Rent", "cost": -50, "expenses": 0 }]"#;
        assert!(RecordStore::from_json(negative_cost).is_err());

        let far_future = r#"[{ "id": "a", "date": "12000-01-01", "amount": 1, "category": "Rent" }]"#;
        assert!(RecordStore::from_json(far_future).is_err());
    }

    #[test]
    fn test_insert_and_replace_validate_records() {
        let mut store = RecordStore::new();
        assert!(store.insert(record(" ", 1.0)).is_err());
        assert!(store.is_empty());

        store.insert(record("a", 100.0)).unwrap();
        let mut broken = record("a", 100.0);
        broken.category = String::new();
        assert!(matches!(
            store.replace(broken),
            Err(SummaryError::InvalidRecord { .. })
        ));
        assert_eq!(store.get("a").unwrap().category, "Rent");

        assert!(RecordStore::from_records(vec![record("b", f64::NAN)]).is_err());
    }
}
