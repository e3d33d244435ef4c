//! Output module for exporting crawl results
//!
//! This module handles:
//! - Ordering records for display
//! - Exporting records as CSV (flat) or JSON (nested reviews)
//! - Summarizing a crawl for the console

mod csv_output;
mod json_output;
pub mod stats;
mod traits;

pub use csv_output::CsvOutputHandler;
pub use json_output::JsonOutputHandler;
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{OutputError, OutputHandler, OutputResult};

use crate::config::OutputFormat;
use crate::model::ProductRecord;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Orders records by review count, then rating, both descending
///
/// Records without a parsable rating sort after rated ones with the same
/// count. The sort is stable, so ties keep their arrival order.
pub fn sort_by_popularity(records: &mut [ProductRecord]) {
    records.sort_by(|a, b| {
        b.num_ratings
            .cmp(&a.num_ratings)
            .then_with(|| match (a.rating_value(), b.rating_value()) {
                (Some(x), Some(y)) => y.total_cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    });
}

/// File name for an export of `keyword`
///
/// ```
/// use product_harvester::config::OutputFormat;
/// use product_harvester::output::export_filename;
///
/// assert_eq!(export_filename("dyson vacuum", OutputFormat::Csv), "dyson_vacuum_products.csv");
/// ```
pub fn export_filename(keyword: &str, format: OutputFormat) -> String {
    let stem: String = keyword
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}_products.{}", stem, format.extension())
}

/// Writes `records` to `directory` in the given format
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(OutputError)` - The file could not be created or written
pub fn write_export(
    records: &[ProductRecord],
    directory: &Path,
    keyword: &str,
    format: OutputFormat,
) -> OutputResult<PathBuf> {
    std::fs::create_dir_all(directory)?;
    let path = directory.join(export_filename(keyword, format));

    let mut handler: Box<dyn OutputHandler> = match format {
        OutputFormat::Csv => Box::new(CsvOutputHandler::create(&path)?),
        OutputFormat::Json => Box::new(JsonOutputHandler::create(&path)?),
    };
    handler.write_records(records)?;
    handler.finalize()?;

    tracing::info!("Exported {} record(s) to {}", records.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, num_ratings: u64, rating: Option<&str>) -> ProductRecord {
        ProductRecord {
            title: None,
            rating_text: rating.map(str::to_string),
            num_ratings,
            price_text: None,
            image_url: None,
            description: None,
            reviews: Vec::new(),
            source_url: url.to_string(),
        }
    }

    fn urls(records: &[ProductRecord]) -> Vec<&str> {
        records.iter().map(|r| r.source_url.as_str()).collect()
    }

    #[test]
    fn test_sort_by_popularity() {
        let mut records = vec![
            record("a", 10, Some("4.0")),
            record("b", 500, Some("3.1")),
            record("c", 10, Some("4.8")),
            record("d", 10, None),
            record("e", 0, Some("5.0")),
        ];

        sort_by_popularity(&mut records);

        assert_eq!(urls(&records), vec!["b", "c", "a", "d", "e"]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let mut records = vec![record("x", 1, None), record("y", 1, None)];
        sort_by_popularity(&mut records);
        assert_eq!(urls(&records), vec!["x", "y"]);
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(
            export_filename(" usb-c hub/dock ", OutputFormat::Json),
            "usb-c_hub_dock_products.json"
        );
    }

    #[test]
    fn test_write_export_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("exports");

        let path = write_export(
            &[record("https://shop.example/dp/1", 3, Some("4.0"))],
            &target,
            "desk lamp",
            OutputFormat::Csv,
        )
        .unwrap();

        assert_eq!(path, target.join("desk_lamp_products.csv"));
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("https://shop.example/dp/1"));
    }
}
