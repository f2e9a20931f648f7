use futures::StreamExt;
use slagate_common::{RawRecord, Result, SlaGateError};
use std::path::Path;
use tracing::{debug, warn};

/// Columns the engine reads. Anything else in the header is ignored.
pub const REQUIRED_COLUMNS: [&str; 4] = ["label", "success", "elapsed", "timeStamp"];

pub struct ReadOutcome {
    pub records: Vec<RawRecord>,
    /// Rows the CSV layer could not decode at all. They are left out of every aggregate.
    pub skipped_rows: usize,
}

/// Read a CSV-format JTL file.
///
/// The header row drives column lookup, rows may be ragged, and undecodable rows are
/// skipped with a warning. Failing to open or read the file is an error.
pub async fn read_records(path: &Path) -> Result<ReadOutcome> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| SlaGateError::Io(format!("{}: {e}", path.display())))?;

    let mut reader = csv_async::AsyncReaderBuilder::new()
        .flexible(true)
        .trim(csv_async::Trim::Headers)
        .create_deserializer(file);

    let headers = reader
        .headers()
        .await
        .map_err(|e| SlaGateError::Csv(e.to_string()))?;
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            warn!(column, path = %path.display(), "result log header is missing a column");
        }
    }

    let mut records = Vec::new();
    let mut skipped_rows = 0;
    let mut data_row = 0;
    let mut rows = reader.deserialize::<RawRecord>();
    while let Some(row) = rows.next().await {
        data_row += 1;
        match row {
            Ok(mut record) => {
                record.row = Some(data_row);
                records.push(record);
            }
            Err(e) if e.is_io_error() => {
                return Err(SlaGateError::Io(format!("{}: {e}", path.display())));
            }
            Err(e) => {
                debug!(row = data_row, error = %e, "skipping undecodable row");
                skipped_rows += 1;
            }
        }
    }

    if skipped_rows > 0 {
        warn!(skipped_rows, path = %path.display(), "skipped undecodable rows");
    }
    debug!(rows = records.len(), path = %path.display(), "read result log");
    Ok(ReadOutcome { records, skipped_rows })
}
