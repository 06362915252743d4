//! JSON export implementation.
//!
//! Writes the analysis rows as a pretty-printed JSON array.

use super::{ExportData, Exporter};
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, &data.rows)?;
        writeln!(writer)?;
        Ok(())
    }
}
