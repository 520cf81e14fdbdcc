//! CSV rendering of entries

use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::{DomainError, DomainResult, Entry};

const HEADER: [&str; 8] = [
    "Record ID",
    "Entry Type",
    "Checkpoint ID",
    "Logging User ID",
    "Created At",
    "Client Timestamp",
    "Status",
    "Payload",
];

/// Attachment name for an export taken at `at`.
pub fn export_filename(at: DateTime<Utc>) -> String {
    format!("gatekeeper_entries_{}.csv", at.format("%Y-%m-%d_%H-%M-%S"))
}

/// One header row plus one row per entry, payload as compact JSON.
pub fn entries_to_csv(entries: &[Entry]) -> DomainResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER).map_err(csv_err)?;

    for entry in entries {
        let payload = serde_json::to_string(&entry.payload)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        let created_at = entry.created_at.to_rfc3339_opts(SecondsFormat::Secs, true);
        let client_timestamp = entry
            .client_timestamp
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        writer
            .write_record([
                entry.record_id.as_str(),
                entry.entry_type.as_str(),
                entry.checkpoint_id.as_str(),
                entry.logging_user_id.as_str(),
                created_at.as_str(),
                client_timestamp.as_str(),
                entry.status.as_str(),
                payload.as_str(),
            ])
            .map_err(csv_err)?;
    }

    writer
        .into_inner()
        .map_err(|e| DomainError::Internal(format!("CSV flush failed: {}", e)))
}

fn csv_err(e: csv::Error) -> DomainError {
    DomainError::Internal(format!("CSV write failed: {}", e))
}
