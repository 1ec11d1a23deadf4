use chrono::NaiveDate;
use health_records::{
    ExamCategory, HealthExamRecord, PersistenceError, RecordDraft, Stored, load_records_from_csv,
    load_records_from_json, save_records_to_csv, save_records_to_json,
};
use std::fs;
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn sample_records() -> Vec<Stored<HealthExamRecord>> {
    let mut first = RecordDraft::new("Ali Demir");
    first.department = Some("Acil, Gece".to_string());
    first.notes = Some("Kontrol \"6 ay\" sonra".to_string());
    first.set_exam(ExamCategory::General, "2025-01-10", "Uygun");
    first.set_exam(ExamCategory::Audiometry, "2025-01-12", "Şartlı Uygun");

    let mut second = RecordDraft::new("Zeynep Ak");
    second.registration_no = Some("S-1042".to_string());
    second.set_exam(ExamCategory::ChestXray, "2024-02-29", "Uygun");

    vec![
        Stored {
            id: 3,
            value: HealthExamRecord::build(first, d(2025, 1, 15)).unwrap(),
        },
        Stored {
            id: 7,
            value: HealthExamRecord::build(second, d(2024, 3, 1)).unwrap(),
        },
    ]
}

#[test]
fn json_export_and_import_preserve_records() {
    let file = NamedTempFile::new().unwrap();
    let records = sample_records();
    save_records_to_json(&records, file.path()).unwrap();

    let loaded = load_records_from_json(file.path()).unwrap();
    assert_eq!(loaded, records);
    assert_eq!(loaded[1].value.summary.next_check_date, Some(d(2025, 2, 28)));
}

#[test]
fn csv_export_and_import_preserve_records() {
    let file = NamedTempFile::new().unwrap();
    let records = sample_records();
    save_records_to_csv(&records, file.path()).unwrap();

    let text = fs::read_to_string(file.path()).unwrap();
    let header = text.lines().next().unwrap();
    assert!(header.starts_with("id,personnel_name,registration_no,department,general_date"));
    assert!(header.contains("overall_status"));

    let loaded = load_records_from_csv(file.path()).unwrap();
    assert_eq!(loaded, records);
}

#[test]
fn json_import_rejects_other_collections() {
    let file = NamedTempFile::new().unwrap();
    fs::write(
        file.path(),
        r#"{"collection": "device_calibrations", "records": []}"#,
    )
    .unwrap();
    assert!(matches!(
        load_records_from_json(file.path()),
        Err(PersistenceError::InvalidData(_))
    ));
}

#[test]
fn json_import_rejects_entry_with_date_but_no_result() {
    let file = NamedTempFile::new().unwrap();
    save_records_to_json(&sample_records(), file.path()).unwrap();
    let text = fs::read_to_string(file.path()).unwrap();
    let mut snapshot: serde_json::Value = serde_json::from_str(&text).unwrap();
    snapshot["records"][0]["exams"][3]["result"] = serde_json::Value::Null;
    fs::write(file.path(), snapshot.to_string()).unwrap();

    assert!(matches!(
        load_records_from_json(file.path()),
        Err(PersistenceError::Serialization(_))
    ));
}

#[test]
fn csv_import_rejects_bad_ids() {
    let file = NamedTempFile::new().unwrap();
    let records = sample_records();
    save_records_to_csv(&records, file.path()).unwrap();
    let text = fs::read_to_string(file.path()).unwrap();
    let tampered = text.replacen("\n3,", "\nabc,", 1);
    fs::write(file.path(), tampered).unwrap();

    assert!(matches!(
        load_records_from_csv(file.path()),
        Err(PersistenceError::InvalidData(_))
    ));
}
