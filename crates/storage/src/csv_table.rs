use adspend_reporting::{SourceTable, Tabular};
use anyhow::Context;
use std::path::Path;
use tracing::debug;

/// Read a headed CSV file into an untyped [`SourceTable`]. Headers are
/// trimmed; cells are kept verbatim for the normalizer to parse.
pub fn read_source_table(path: &Path, name: &str) -> anyhow::Result<SourceTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let columns = reader
        .headers()
        .with_context(|| format!("failed to read header of {}", path.display()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut table = SourceTable::new(name, columns);
    for record in reader.records() {
        let record = record.with_context(|| format!("malformed record in {}", path.display()))?;
        table.rows.push(record.iter().map(str::to_string).collect());
    }

    debug!(path = %path.display(), table = name, rows = table.len(), "Source table loaded");
    Ok(table)
}

/// Write `rows` as CSV with `T`'s header row.
pub fn write_table<T: Tabular>(path: &Path, rows: &[T]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    writer.write_record(T::headers())?;
    for row in rows {
        writer.write_record(row.cells())?;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = rows.len(), "Table written");
    Ok(())
}
