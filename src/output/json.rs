//! JSON output

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::error::{Error, Result};

use super::ncdu::ExportDocument;

/// Render the document to a JSON string, compact unless `pretty` is set.
pub fn render_json(document: &ExportDocument, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(document)?
    } else {
        serde_json::to_string(document)?
    };
    Ok(json)
}

/// Write rendered JSON to `destination`, or to stdout when it is `None` or `-`.
pub fn write_json(json: &str, destination: Option<&Path>) -> Result<()> {
    match destination {
        Some(path) if path != Path::new("-") => {
            fs::write(path, format!("{}\n", json)).map_err(|e| Error::io(path, e))
        }
        _ => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", json)
                .and_then(|_| stdout.flush())
                .map_err(|e| Error::io("<stdout>", e))
        }
    }
}
