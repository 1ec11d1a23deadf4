use super::{Collection, PersistenceError, PersistenceResult, Stored};
use crate::record::{HealthExamRecord, flat_record_columns};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

#[derive(Serialize, Deserialize)]
struct RecordSnapshot {
    collection: String,
    records: Vec<Stored<HealthExamRecord>>,
}

pub fn save_records_to_json<P: AsRef<Path>>(
    records: &[Stored<HealthExamRecord>],
    path: P,
) -> PersistenceResult<()> {
    let snapshot = RecordSnapshot {
        collection: HealthExamRecord::NAME.to_string(),
        records: records.to_vec(),
    };
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    tracing::info!(
        path = %path.as_ref().display(),
        count = records.len(),
        "exported records to json"
    );
    Ok(())
}

pub fn load_records_from_json<P: AsRef<Path>>(
    path: P,
) -> PersistenceResult<Vec<Stored<HealthExamRecord>>> {
    let file = File::open(path)?;
    let snapshot: RecordSnapshot = serde_json::from_reader(file)?;
    if snapshot.collection != HealthExamRecord::NAME {
        return Err(PersistenceError::InvalidData(format!(
            "expected a '{}' snapshot, found '{}'",
            HealthExamRecord::NAME,
            snapshot.collection
        )));
    }
    for stored in &snapshot.records {
        stored.value.validate()?;
    }
    Ok(snapshot.records)
}

pub fn save_records_to_csv<P: AsRef<Path>>(
    records: &[Stored<HealthExamRecord>],
    path: P,
) -> PersistenceResult<()> {
    let columns = flat_record_columns();
    let mut writer = csv::Writer::from_path(path.as_ref())?;

    let mut header = vec!["id".to_string()];
    header.extend(columns.iter().cloned());
    writer.write_record(&header)?;

    for stored in records {
        let fields = stored.value.to_flat_record();
        let mut row = vec![stored.id.to_string()];
        row.extend(
            columns
                .iter()
                .map(|column| fields.get(column).cloned().unwrap_or_default()),
        );
        writer.write_record(&row)?;
    }
    writer.flush()?;
    tracing::info!(
        path = %path.as_ref().display(),
        count = records.len(),
        "exported records to csv"
    );
    Ok(())
}

pub fn load_records_from_csv<P: AsRef<Path>>(
    path: P,
) -> PersistenceResult<Vec<Stored<HealthExamRecord>>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let fields: BTreeMap<String, String> = headers
            .iter()
            .zip(row.iter())
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        let id_text = fields.get("id").map(String::as_str).unwrap_or("");
        let id = id_text.trim().parse::<i64>().map_err(|_| {
            PersistenceError::InvalidData(format!("invalid record id '{id_text}'"))
        })?;

        let value = HealthExamRecord::from_flat_record(&fields)?;
        value.validate()?;
        records.push(Stored { id, value });
    }
    Ok(records)
}
