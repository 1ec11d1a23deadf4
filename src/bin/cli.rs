use health_records::{
    AppConfig, DeviceCalibration, ExamCategory, ExamResult, ExamSummaryRule, HealthExamRecord,
    RecordDraft, Repository, SqliteStore, Stored, calendar, load_records_from_csv,
    load_records_from_json, logging, persistence::import_into, refresh_statuses,
    save_records_to_csv, save_records_to_json,
};
use std::io::{self, Write};
use std::process::ExitCode;

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            if len > widths[ci] {
                widths[ci] = len;
            }
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&widths, headers.iter().copied()));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(&widths, row.iter().map(String::as_str)));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn render_row<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::from("|");
    for (ci, cell) in cells.enumerate() {
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(widths[ci].saturating_sub(cell.chars().count())));
        line.push_str(" |");
    }
    line
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  new <name...>                      Start a new exam form for a person\n  edit <id>                          Load a stored record into the form\n  reg <registration_no>              Set registration number\n  dept <text...>                     Set department\n  note <text...>                     Set notes\n  set <category> <date> <result...>  Record one exam (date YYYY-MM-DD or DD.MM.YYYY)\n  clear <category>                   Clear one exam\n  show                               Show the form and its summary preview\n  save                               Save the form as a record\n  list                               List stored records\n  get <id>                           Show a stored record\n  refresh                            Re-derive statuses as of today\n  export <json|csv> <path>           Write stored records to disk\n  import <json|csv> <path>           Insert records from disk\n  device add <months> <last|-> <name...>\n                                     Register a device calibration\n  device list                        List device calibrations\n  quit|exit                          Exit\n\nCategories: general, chest_xray, blood_count, audiometry\nResults   : Uygun, Şartlı Uygun, Uygun Değil (or fit, conditional, unfit)"
    );
}

fn rest_of_line<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.collect::<Vec<_>>().join(" ")
}

fn optional_date(date: Option<chrono::NaiveDate>) -> String {
    calendar::format_date(date)
}

fn print_draft(draft: &RecordDraft, editing: Option<i64>) {
    match editing {
        Some(id) => println!("Editing record {id}"),
        None => println!("New record"),
    }
    println!("Personnel        : {}", draft.personnel_name);
    println!(
        "Registration no  : {}",
        draft.registration_no.as_deref().unwrap_or("")
    );
    println!(
        "Department       : {}",
        draft.department.as_deref().unwrap_or("")
    );
    println!("Notes            : {}", draft.notes.as_deref().unwrap_or(""));

    let rows: Vec<Vec<String>> = draft
        .exams
        .iter()
        .map(|entry| {
            vec![
                entry.category().key().to_string(),
                entry.category().label().to_string(),
                optional_date(entry.date()),
                entry.result().map(|r| r.to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    print!(
        "{}",
        render_text_table(&["category", "exam", "date", "result"], &rows)
    );

    let summary = ExamSummaryRule::summarize_today(&draft.exams);
    println!("Latest exam date : {}", optional_date(summary.latest_date));
    println!("Next check date  : {}", optional_date(summary.next_check_date));
    println!(
        "Overall result   : {}",
        summary
            .overall_result
            .map(|r| r.to_string())
            .unwrap_or_default()
    );
    println!("Overall status   : {}", summary.overall_status);
}

fn print_records(records: &[Stored<HealthExamRecord>]) {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|stored| {
            let record = &stored.value;
            vec![
                stored.id.to_string(),
                record.personnel_name.clone(),
                record.department.clone().unwrap_or_default(),
                optional_date(record.summary.latest_date),
                optional_date(record.summary.next_check_date),
                record
                    .summary
                    .overall_result
                    .map(|r| r.to_string())
                    .unwrap_or_default(),
                record.summary.overall_status.to_string(),
            ]
        })
        .collect();
    print!(
        "{}",
        render_text_table(
            &[
                "id",
                "personnel",
                "department",
                "latest",
                "next_check",
                "result",
                "status"
            ],
            &rows
        )
    );
}

fn print_devices(store: &SqliteStore) {
    let devices: Vec<Stored<DeviceCalibration>> = match store.get_all() {
        Ok(devices) => devices,
        Err(e) => {
            println!("Error loading devices: {e}");
            return;
        }
    };
    let today = calendar::today();
    let rows: Vec<Vec<String>> = devices
        .iter()
        .map(|stored| {
            let device = &stored.value;
            vec![
                stored.id.to_string(),
                device.device_name.clone(),
                device.serial_no.clone().unwrap_or_default(),
                optional_date(device.last_calibrated),
                device.interval_months.to_string(),
                optional_date(device.next_due()),
                device.status_as_of(today).to_string(),
            ]
        })
        .collect();
    print!(
        "{}",
        render_text_table(
            &[
                "id", "device", "serial", "last", "months", "next_due", "status"
            ],
            &rows
        )
    );
}

fn load_records(
    format: &str,
    path: &str,
) -> Result<Vec<Stored<HealthExamRecord>>, Box<dyn std::error::Error>> {
    match format {
        "json" => Ok(load_records_from_json(path)?),
        "csv" => Ok(load_records_from_csv(path)?),
        other => Err(format!("unknown format '{other}' (use json or csv)").into()),
    }
}

fn save_records(
    format: &str,
    path: &str,
    records: &[Stored<HealthExamRecord>],
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        "json" => Ok(save_records_to_json(records, path)?),
        "csv" => Ok(save_records_to_csv(records, path)?),
        other => Err(format!("unknown format '{other}' (use json or csv)").into()),
    }
}

fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = logging::init(&config.log_level) {
        eprintln!("{e}");
    }
    let store = match SqliteStore::new(&config.database_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Could not open {}: {e}", config.database_path.display());
            return ExitCode::FAILURE;
        }
    };

    println!("Health Records (CLI) - type 'help' for commands\n");

    let mut draft: Option<RecordDraft> = None;
    let mut editing: Option<i64> = None;

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "new" => {
                let name = rest_of_line(parts);
                if name.is_empty() {
                    println!("Usage: new <name...>");
                    continue;
                }
                println!("Started form for {name}.");
                draft = Some(RecordDraft::new(name));
                editing = None;
            }
            "edit" => match parts.next().map(str::parse::<i64>) {
                Some(Ok(id)) => match Repository::<HealthExamRecord>::get_by_id(&store, id) {
                    Ok(Some(record)) => {
                        draft = Some(RecordDraft::from(&record));
                        editing = Some(id);
                        println!("Editing record {id}.");
                    }
                    Ok(None) => println!("Record {id} not found."),
                    Err(e) => println!("Error loading record: {e}"),
                },
                Some(Err(_)) => println!("Invalid id"),
                None => println!("Usage: edit <id>"),
            },
            "reg" | "dept" | "note" => {
                let Some(form) = draft.as_mut() else {
                    println!("No open form. Use 'new <name>' first.");
                    continue;
                };
                let value = Some(rest_of_line(parts));
                match cmd {
                    "reg" => form.registration_no = value,
                    "dept" => form.department = value,
                    _ => form.notes = value,
                }
            }
            "set" => {
                let Some(form) = draft.as_mut() else {
                    println!("No open form. Use 'new <name>' first.");
                    continue;
                };
                let (Some(category), Some(date)) = (parts.next(), parts.next()) else {
                    println!("Usage: set <category> <date> <result...>");
                    continue;
                };
                let Some(category) = ExamCategory::parse(category) else {
                    println!("Unknown category '{category}'.");
                    continue;
                };
                let result = rest_of_line(parts);
                form.set_exam(category, date, &result);
                if form.exams.get(category).is_recorded() {
                    println!("Recorded {}.", category.key());
                } else if ExamResult::parse_label(&result).is_none() {
                    println!("Unknown result '{result}'; {} left empty.", category.key());
                } else {
                    println!("Unreadable date '{date}'; {} left empty.", category.key());
                }
            }
            "clear" => {
                let Some(form) = draft.as_mut() else {
                    println!("No open form. Use 'new <name>' first.");
                    continue;
                };
                match parts.next().and_then(ExamCategory::parse) {
                    Some(category) => {
                        form.exams.clear(category);
                        println!("Cleared {}.", category.key());
                    }
                    None => println!("Usage: clear <category>"),
                }
            }
            "show" => match draft.as_ref() {
                Some(form) => print_draft(form, editing),
                None => println!("No open form. Use 'new <name>' first."),
            },
            "save" => {
                let Some(form) = draft.clone() else {
                    println!("No open form. Use 'new <name>' first.");
                    continue;
                };
                let record = match HealthExamRecord::build(form, calendar::today()) {
                    Ok(record) => record,
                    Err(e) => {
                        println!("Error: {e}");
                        continue;
                    }
                };
                let outcome = match editing {
                    Some(id) => store.update(id, &record).map(|_| format!("Updated record {id}.")),
                    None => store.insert(&record).map(|id| format!("Saved record {id}.")),
                };
                match outcome {
                    Ok(message) => {
                        println!("{message}");
                        println!(
                            "Overall result: {} / status: {}",
                            record
                                .summary
                                .overall_result
                                .map(|r| r.to_string())
                                .unwrap_or_default(),
                            record.summary.overall_status
                        );
                        draft = None;
                        editing = None;
                    }
                    Err(e) => println!("Error saving record: {e}"),
                }
            }
            "list" => match Repository::<HealthExamRecord>::get_all(&store) {
                Ok(records) => print_records(&records),
                Err(e) => println!("Error loading records: {e}"),
            },
            "get" => match parts.next().map(str::parse::<i64>) {
                Some(Ok(id)) => match Repository::<HealthExamRecord>::get_by_id(&store, id) {
                    Ok(Some(record)) => {
                        for (field, value) in record.to_flat_record() {
                            println!("{field:<22} {value}");
                        }
                    }
                    Ok(None) => println!("Record {id} not found."),
                    Err(e) => println!("Error loading record: {e}"),
                },
                Some(Err(_)) => println!("Invalid id"),
                None => println!("Usage: get <id>"),
            },
            "refresh" => match Repository::<HealthExamRecord>::get_all(&store) {
                Ok(records) => {
                    let report = refresh_statuses(&records, calendar::today());
                    println!("Refreshed: {}", report.summary.to_cli_summary());
                    for status in report.statuses.iter().filter(|s| s.drifted()) {
                        println!(
                            "  record {} ({}): {} -> {}",
                            status.id,
                            status.personnel_name,
                            status.stored_status,
                            status.current_status
                        );
                    }
                }
                Err(e) => println!("Error loading records: {e}"),
            },
            "export" => {
                let (Some(format), Some(path)) = (parts.next(), parts.next()) else {
                    println!("Usage: export <json|csv> <path>");
                    continue;
                };
                let result = Repository::<HealthExamRecord>::get_all(&store)
                    .map_err(Into::into)
                    .and_then(|records| {
                        save_records(format, path, &records).map(|_| records.len())
                    });
                match result {
                    Ok(count) => println!("Exported {count} records to {path}"),
                    Err(e) => println!("Error exporting records: {e}"),
                }
            }
            "import" => {
                let (Some(format), Some(path)) = (parts.next(), parts.next()) else {
                    println!("Usage: import <json|csv> <path>");
                    continue;
                };
                let result = load_records(format, path).and_then(|records| {
                    let values: Vec<HealthExamRecord> =
                        records.into_iter().map(|stored| stored.value).collect();
                    Ok(import_into(&store, values.as_slice())?)
                });
                match result {
                    Ok(ids) => println!("Imported {} records from {path}", ids.len()),
                    Err(e) => println!("Error importing records: {e}"),
                }
            }
            "device" => match parts.next() {
                Some("add") => {
                    let (Some(months), Some(last)) = (parts.next(), parts.next()) else {
                        println!("Usage: device add <months> <last|-> <name...>");
                        continue;
                    };
                    let Ok(months) = months.parse::<u32>() else {
                        println!("Invalid interval '{months}'");
                        continue;
                    };
                    let last_calibrated = calendar::parse_date(last);
                    let name = rest_of_line(parts);
                    let saved = DeviceCalibration::new(name, None, last_calibrated, months)
                        .map_err(Into::into)
                        .and_then(|device| store.insert(&device));
                    match saved {
                        Ok(id) => println!("Saved device {id}."),
                        Err(e) => println!("Error: {e}"),
                    }
                }
                Some("list") => print_devices(&store),
                _ => println!("Usage: device <add|list> ..."),
            },
            other => {
                println!("Unknown command '{other}'. Type 'help'.");
            }
        }
    }

    ExitCode::SUCCESS
}
