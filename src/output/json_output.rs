//! JSON export with reviews kept as nested arrays

use crate::model::ProductRecord;
use crate::output::traits::{OutputHandler, OutputResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes product records as a single pretty-printed JSON array
///
/// Records are buffered until `finalize`, which writes the whole array.
pub struct JsonOutputHandler<W: Write> {
    writer: W,
    records: Vec<ProductRecord>,
}

impl JsonOutputHandler<BufWriter<File>> {
    /// Creates (or truncates) a JSON file at `path`
    pub fn create(path: &Path) -> OutputResult<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> JsonOutputHandler<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            records: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputHandler for JsonOutputHandler<W> {
    fn write_records(&mut self, records: &[ProductRecord]) -> OutputResult<()> {
        self.records.extend_from_slice(records);
        Ok(())
    }

    fn finalize(&mut self) -> OutputResult<()> {
        serde_json::to_writer_pretty(&mut self.writer, &self.records)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
