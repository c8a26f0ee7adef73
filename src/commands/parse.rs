use lagoon_sync_core::{parser, translate, SkipExport, Snapshot};

use crate::error::Result;

/// Convert the raw JSON of a project query into document YAML.
pub fn run(raw: &[u8]) -> Result<String> {
    let text = std::str::from_utf8(raw).map_err(|e| {
        lagoon_sync_core::ImportError::MalformedSnapshot(format!("input is not UTF-8: {e}"))
    })?;
    let snapshot = Snapshot::from_json(text)?;
    let document = translate(&snapshot, &SkipExport::default())?;
    Ok(parser::serialize(&document)?)
}
