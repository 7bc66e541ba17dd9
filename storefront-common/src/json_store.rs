// storefront-common/src/json_store.rs
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::record_store::{
    compare_values, project, record_id, FetchParams, Record, RecordId, RecordOutcome, RecordStore,
    SortDirection, ID_FIELD,
};

/// A [`RecordStore`] that keeps each table as a JSON array on disk, at
/// `<root>/<table>/data.json`.
///
/// A table whose file does not exist yet reads as empty; the first write
/// creates it.
pub struct JsonFileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(table).join("data.json")
    }

    /// Load every record in a table
    fn load_table(&self, table: &str) -> Result<Vec<Record>, StoreError> {
        let path = self.table_path(table);
        if !path.exists() {
            info!("Table '{}' has no data file yet at {}", table, path.display());
            return Ok(Vec::new());
        }

        let data = fs::read_to_string(&path).map_err(|source| StoreError::Read {
            table: table.to_string(),
            path: path.clone(),
            source,
        })?;
        let parsed: Value = serde_json::from_str(&data).map_err(|source| StoreError::Malformed {
            table: table.to_string(),
            source,
        })?;

        match parsed {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(record) => Ok(record),
                    _ => Err(StoreError::NotATable(table.to_string())),
                })
                .collect(),
            _ => Err(StoreError::NotATable(table.to_string())),
        }
    }

    fn save_table(&self, table: &str, records: &[Record]) -> Result<(), StoreError> {
        let path = self.table_path(table);
        let write_err = |source| StoreError::Write {
            table: table.to_string(),
            path: path.clone(),
            source,
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(write_err)?;
        }
        let body = serde_json::to_string_pretty(records).map_err(|source| StoreError::Malformed {
            table: table.to_string(),
            source,
        })?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(write_err)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                warn!("Could not remove {}: {}", tmp.display(), cleanup);
            }
            return Err(write_err(e));
        }
        info!("Saved {} records to table '{}'", records.len(), table);
        Ok(())
    }

    /// Run a read-modify-write cycle on a table while holding the write lock.
    fn modify_table<F>(&self, table: &str, change: F) -> Result<Vec<RecordOutcome>, StoreError>
    where
        F: FnOnce(&mut Vec<Record>) -> Vec<RecordOutcome>,
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("write lock poisoned".to_string()))?;

        let mut records = self.load_table(table)?;
        let outcomes = change(&mut records);
        if outcomes.iter().any(|o| o.success) {
            self.save_table(table, &records)?;
        }
        Ok(outcomes)
    }

    fn expand_references(&self, records: &mut [Record], params: &FetchParams) -> Result<(), StoreError> {
        for reference in &params.references {
            let targets = self.load_table(&reference.table)?;
            for record in records.iter_mut() {
                let Some(target_id) = record.get(&reference.field).and_then(Value::as_i64) else {
                    continue;
                };
                let expanded = targets
                    .iter()
                    .find(|t| record_id(t) == Some(target_id))
                    .map(|t| Value::Object(project(t, &reference.fields)))
                    .unwrap_or(Value::Null);
                record.insert(reference.field.clone(), expanded);
            }
        }
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn fetch_records(&self, table: &str, params: &FetchParams) -> Result<Vec<Record>, StoreError> {
        let mut records: Vec<Record> = self
            .load_table(table)?
            .into_iter()
            .filter(|record| params.conditions.iter().all(|c| c.matches(record)))
            .collect();

        // Apply sort keys in reverse so the first key wins; sort_by is stable.
        for order in params.order_by.iter().rev() {
            records.sort_by(|a, b| {
                let left = a.get(&order.field).unwrap_or(&Value::Null);
                let right = b.get(&order.field).unwrap_or(&Value::Null);
                let ord = compare_values(left, right);
                match order.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }

        if let Some(paging) = params.paging {
            records = records.into_iter().skip(paging.offset).take(paging.limit).collect();
        }

        if !params.fields.is_empty() {
            let mut keep = params.fields.clone();
            keep.extend(params.references.iter().map(|r| r.field.clone()));
            records = records.iter().map(|r| project(r, &keep)).collect();
        }
        self.expand_references(&mut records, params)?;

        info!("Fetch on '{}' completed. Found {} records.", table, records.len());
        Ok(records)
    }

    fn get_record_by_id(
        &self,
        table: &str,
        id: RecordId,
        fields: &[String],
    ) -> Result<Option<Record>, StoreError> {
        let found = self
            .load_table(table)?
            .iter()
            .find(|record| record_id(record) == Some(id))
            .map(|record| project(record, fields));

        if found.is_none() {
            warn!("Record not found in '{}' with ID: {}", table, id);
        }
        Ok(found)
    }

    fn create_records(&self, table: &str, new_records: Vec<Record>) -> Result<Vec<RecordOutcome>, StoreError> {
        self.modify_table(table, |records| {
            let mut next_id = records.iter().filter_map(record_id).max().unwrap_or(0) + 1;
            new_records
                .into_iter()
                .map(|mut record| {
                    record.insert(ID_FIELD.to_string(), Value::from(next_id));
                    next_id += 1;
                    records.push(record.clone());
                    RecordOutcome::succeeded(record)
                })
                .collect()
        })
    }

    fn update_records(&self, table: &str, changes: Vec<Record>) -> Result<Vec<RecordOutcome>, StoreError> {
        if changes.iter().any(|c| record_id(c).is_none()) {
            return Err(StoreError::MissingId(table.to_string()));
        }

        self.modify_table(table, |records| {
            changes
                .into_iter()
                .map(|change| {
                    let id = record_id(&change);
                    match records.iter_mut().find(|r| record_id(r) == id) {
                        Some(existing) => {
                            existing.extend(change);
                            RecordOutcome::succeeded(existing.clone())
                        }
                        None => {
                            warn!("Update skipped, no record in '{}' with ID: {:?}", table, id);
                            RecordOutcome::failed(format!("Record {:?} not found", id))
                        }
                    }
                })
                .collect()
        })
    }

    fn delete_records(&self, table: &str, ids: &[RecordId]) -> Result<Vec<RecordOutcome>, StoreError> {
        self.modify_table(table, |records| {
            ids.iter()
                .map(|&id| match records.iter().position(|r| record_id(r) == Some(id)) {
                    Some(index) => RecordOutcome::succeeded(records.remove(index)),
                    None => {
                        warn!("Delete skipped, no record in '{}' with ID: {}", table, id);
                        RecordOutcome::failed(format!("Record {} not found", id))
                    }
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_store::{Condition, Operator};
    use serde_json::json;
    use tempfile::TempDir;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn seeded_store(temp_dir: &TempDir) -> JsonFileStore {
        let store = JsonFileStore::new(temp_dir.path());
        store
            .create_records(
                "product",
                vec![
                    record(json!({"Name": "Trail Runner", "brand": "Peak", "price": 120.0})),
                    record(json!({"Name": "City Loafer", "brand": "Urbane", "price": 80.0})),
                    record(json!({"Name": "Peak Hiker", "brand": "Peak", "price": 150.0})),
                ],
            )
            .unwrap();
        store
    }

    #[test]
    fn test_missing_table_reads_as_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path());
        assert!(store.fetch_records("review", &FetchParams::new()).unwrap().is_empty());
        assert_eq!(store.get_record_by_id("review", 1, &[]).unwrap(), None);
    }

    #[test]
    fn test_create_assigns_sequential_ids() {
        let temp_dir = TempDir::new().unwrap();
        let store = seeded_store(&temp_dir);

        let ids: Vec<_> = store
            .fetch_records("product", &FetchParams::new())
            .unwrap()
            .iter()
            .filter_map(record_id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);

        store.delete_records("product", &[3]).unwrap();
        let outcome = store
            .create_records("product", vec![record(json!({"Name": "Sandal"}))])
            .unwrap();
        assert_eq!(record_id(outcome[0].data.as_ref().unwrap()), Some(3));
        assert!(temp_dir.path().join("product").join("data.json").exists());
    }

    #[test]
    fn test_fetch_filters_orders_and_pages() {
        let temp_dir = TempDir::new().unwrap();
        let store = seeded_store(&temp_dir);

        let params = FetchParams::new()
            .fields(&["Name"])
            .filter(Condition::new("brand", Operator::ExactMatch, vec![json!("Peak")]))
            .order_by("price", SortDirection::Desc);
        let records = store.fetch_records("product", &params).unwrap();
        let names: Vec<_> = records.iter().map(|r| r["Name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Peak Hiker", "Trail Runner"]);
        assert!(records[0].get("price").is_none());

        let paged = store
            .fetch_records("product", &FetchParams::new().order_by("price", SortDirection::Asc).page(1, 1))
            .unwrap();
        assert_eq!(paged.len(), 1);
        assert_eq!(paged[0]["Name"], "Trail Runner");
    }

    #[test]
    fn test_fetch_expands_references() {
        let temp_dir = TempDir::new().unwrap();
        let store = seeded_store(&temp_dir);
        store
            .create_records(
                "cart_item",
                vec![
                    record(json!({"product": 2, "quantity": 1})),
                    record(json!({"product": 99, "quantity": 4})),
                ],
            )
            .unwrap();

        let params = FetchParams::new()
            .fields(&["quantity"])
            .expand("product", "product", &["Name", "price"]);
        let items = store.fetch_records("cart_item", &params).unwrap();

        assert_eq!(items[0]["product"], json!({"Id": 2, "Name": "City Loafer", "price": 80.0}));
        assert_eq!(items[1]["product"], Value::Null);
    }

    #[test]
    fn test_update_merges_and_reports_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = seeded_store(&temp_dir);

        let outcomes = store
            .update_records(
                "product",
                vec![record(json!({"Id": 2, "price": 70.0})), record(json!({"Id": 42, "price": 1.0}))],
            )
            .unwrap();
        assert!(outcomes[0].success);
        assert!(!outcomes[1].success);

        let updated = store.get_record_by_id("product", 2, &[]).unwrap().unwrap();
        assert_eq!(updated["price"], 70.0);
        assert_eq!(updated["Name"], "City Loafer");
    }

    #[test]
    fn test_update_without_id_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = seeded_store(&temp_dir);
        let err = store
            .update_records("product", vec![record(json!({"price": 1.0}))])
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingId(_)));
    }

    #[test]
    fn test_delete_reports_each_id() {
        let temp_dir = TempDir::new().unwrap();
        let store = seeded_store(&temp_dir);

        let outcomes = store.delete_records("product", &[1, 7]).unwrap();
        assert!(outcomes[0].success);
        assert!(!outcomes[1].success);
        assert_eq!(store.fetch_records("product", &FetchParams::new()).unwrap().len(), 2);
    }

    #[test]
    fn test_malformed_table_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("review");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("data.json"), "{ not json").unwrap();

        let store = JsonFileStore::new(temp_dir.path());
        let err = store.fetch_records("review", &FetchParams::new()).unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));

        fs::write(dir.join("data.json"), r#"{"Id": 1}"#).unwrap();
        let err = store.fetch_records("review", &FetchParams::new()).unwrap_err();
        assert!(matches!(err, StoreError::NotATable(_)));
    }

    #[test]
    fn test_failed_rename_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path());
        // A directory where the table file belongs makes the final rename fail.
        let blocked = temp_dir.path().join("cart_item").join("data.json");
        fs::create_dir_all(blocked.join("occupied")).unwrap();

        let err = store.save_table("cart_item", &[record(json!({"Id": 1}))]).unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
        assert!(!blocked.with_extension("json.tmp").exists());
        assert!(blocked.is_dir());
    }
}
