//! CSV output.
//!
//! One row per school, one column per label seen anywhere in the run. The
//! header is the sorted union of every record's labels; schools missing a
//! label get an empty cell.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::record::SchoolRecord;

pub fn write_csv(records: &[SchoolRecord], path: &Path) -> Result<()> {
    let labels: BTreeSet<&String> = records
        .iter()
        .flat_map(|r| r.fields().keys())
        .collect();

    let mut writer = csv::Writer::from_path(path)?;
    let mut header = Vec::with_capacity(labels.len() + 1);
    header.push("School ID");
    header.extend(labels.iter().map(|l| l.as_str()));
    writer.write_record(&header)?;

    for record in records {
        let mut row = Vec::with_capacity(header.len());
        row.push(record.id().to_string());
        for label in &labels {
            let cell = record
                .get(label.as_str())
                .map(ToString::to_string)
                .unwrap_or_default();
            row.push(cell);
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = records.len(), columns = labels.len(), "wrote csv");
    Ok(())
}
