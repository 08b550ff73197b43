//! CSV request files: the pending-request export and the batch input format.
//!
//! ```text
//! id,amount,customer_score,urgency
//! REQ-1000,1520,7,2
//! REQ-1001,310,3,5
//! ```

use std::collections::HashSet;
use std::fs::{self, File};
use std::path::Path;

use tracing::debug;

use crate::error::{ApprovalError, Result};

use super::request::{format_value, Features, Request};

/// Write requests to a CSV file, creating parent directories as needed.
///
/// Every request must carry the same feature names, in the same order.
pub fn write_requests(path: impl AsRef<Path>, requests: &[Request]) -> Result<()> {
    let path = path.as_ref();

    let Some(first) = requests.first() else {
        return Err(ApprovalError::InvalidBatch(
            "No requests to write".to_string(),
        ));
    };
    let columns: Vec<&String> = first.features.keys().collect();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| ApprovalError::io(parent, e))?;
        }
    }

    let file = File::create(path).map_err(|e| ApprovalError::io(path, e))?;
    let mut writer = csv::Writer::from_writer(file);

    let mut header = vec!["id".to_string()];
    header.extend(columns.iter().map(|c| c.to_string()));
    writer.write_record(&header)?;

    for request in requests {
        if !request.features.keys().eq(columns.iter().copied()) {
            return Err(ApprovalError::InvalidBatch(format!(
                "Request '{}' has a different feature set than '{}'",
                request.id, first.id
            )));
        }

        let mut record = vec![request.id.clone()];
        record.extend(request.features.values().map(|v| format_value(*v)));
        writer.write_record(&record)?;
    }

    writer.flush().map_err(|e| ApprovalError::io(path, e))?;
    debug!(path = %path.display(), rows = requests.len(), "wrote request file");
    Ok(())
}

/// Read requests from a CSV file.
///
/// The first column holds the request id, the remaining columns are numeric
/// features named by the header.
pub fn read_requests(path: impl AsRef<Path>) -> Result<Vec<Request>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ApprovalError::io(path, e))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
    if headers.len() < 2 {
        return Err(ApprovalError::InvalidBatch(format!(
            "'{}' needs an id column and at least one feature column",
            path.display()
        )));
    }

    // Row 0 is the header.
    let mut columns = HashSet::with_capacity(headers.len());
    for (col_idx, name) in headers.iter().enumerate() {
        if !columns.insert(name.as_str()) {
            return Err(ApprovalError::Parse {
                row: 0,
                column: col_idx + 1,
                message: format!("duplicate column '{}'", name),
            });
        }
    }

    let mut requests = Vec::new();
    let mut seen = HashSet::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result?;
        let row = row_idx + 1;

        let id = record.get(0).unwrap_or_default().to_string();
        if id.is_empty() {
            return Err(ApprovalError::Parse {
                row,
                column: 1,
                message: "missing request id".to_string(),
            });
        }
        if !seen.insert(id.clone()) {
            return Err(ApprovalError::InvalidBatch(format!(
                "Duplicate request id '{}' at row {}",
                id, row
            )));
        }

        let mut features = Features::new();
        for (col_idx, name) in headers.iter().enumerate().skip(1) {
            let raw = record.get(col_idx).unwrap_or_default();
            let value: f64 = raw.parse().map_err(|_| ApprovalError::Parse {
                row,
                column: col_idx + 1,
                message: format!("'{}' is not a number for feature '{}'", raw, name),
            })?;
            features.insert(name.clone(), value);
        }

        requests.push(Request::new(id, features));
    }

    if requests.is_empty() {
        return Err(ApprovalError::InvalidBatch(format!(
            "No requests found in '{}'",
            path.display()
        )));
    }

    debug!(path = %path.display(), rows = requests.len(), "read request file");
    Ok(requests)
}
