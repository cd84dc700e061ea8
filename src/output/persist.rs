//! Metadata persistence.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::OutputError;
use crate::metadata::MetadataRecord;

/// Write the record as pretty-printed JSON with sorted keys.
///
/// An existing file is overwritten without confirmation.
pub fn write_metadata(path: &Path, record: &MetadataRecord) -> Result<(), OutputError> {
    let file = File::create(path).map_err(|e| OutputError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, record).map_err(|source| {
        OutputError::Serialize {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.flush().map_err(|e| OutputError::io(path, e))?;

    info!(file = %path.display(), keys = record.len(), "Wrote metadata");
    Ok(())
}
