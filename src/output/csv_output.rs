//! CSV export
//!
//! One row per product. Reviews do not fit a flat row, so the whole review
//! list is serialized into a single JSON column.

use crate::model::ProductRecord;
use crate::output::traits::{OutputError, OutputHandler, OutputResult};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Flat row written for each product
#[derive(Debug, Serialize)]
struct ProductRow<'a> {
    title: Option<&'a str>,
    rating_text: Option<&'a str>,
    num_ratings: u64,
    price_text: Option<&'a str>,
    image_url: Option<&'a str>,
    description: Option<&'a str>,
    reviews: String,
    source_url: &'a str,
}

impl<'a> ProductRow<'a> {
    fn from_record(record: &'a ProductRecord) -> OutputResult<Self> {
        Ok(Self {
            title: record.title.as_deref(),
            rating_text: record.rating_text.as_deref(),
            num_ratings: record.num_ratings,
            price_text: record.price_text.as_deref(),
            image_url: record.image_url.as_deref(),
            description: record.description.as_deref(),
            reviews: serde_json::to_string(&record.reviews)?,
            source_url: &record.source_url,
        })
    }
}

/// Writes product records as CSV
pub struct CsvOutputHandler<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvOutputHandler<File> {
    /// Creates (or truncates) a CSV file at `path`
    pub fn create(path: &Path) -> OutputResult<Self> {
        Ok(Self {
            writer: csv::Writer::from_path(path)?,
        })
    }
}

impl<W: Write> CsvOutputHandler<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
        }
    }

    /// Flushes and returns the underlying writer
    pub fn into_inner(self) -> OutputResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| OutputError::Write(e.to_string()))
    }
}

impl<W: Write> OutputHandler for CsvOutputHandler<W> {
    fn write_records(&mut self, records: &[ProductRecord]) -> OutputResult<()> {
        for record in records {
            self.writer.serialize(ProductRow::from_record(record)?)?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> OutputResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}
