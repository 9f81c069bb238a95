//! # Sink Module
//!
//! Destinations for reported near-duplicate pairs.
//!
//! - `CsvSink` - `filePath1,filePath2,similarity` rows, flushed one by one
//!   so an interrupted run keeps what it found
//! - `MemorySink` - collects results, for tests and JSON output

use crate::core::comparator::ComparisonResult;
use crate::error::SinkError;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Column names of the CSV report
pub const CSV_HEADER: [&str; 3] = ["filePath1", "filePath2", "similarity"];

/// Receives results as they are reported
pub trait ResultSink {
    /// Append one result
    fn record(&mut self, result: &ComparisonResult) -> Result<(), SinkError>;

    /// Called once after the last result
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Appends results to a CSV stream
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl CsvSink<File> {
    /// Create (or truncate) a CSV file and write the header
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path).map_err(|source| SinkError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_writer(file)
    }
}

impl<W: Write> CsvSink<W> {
    /// Write the header to any writer
    pub fn from_writer(writer: W) -> Result<Self, SinkError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(CSV_HEADER)?;
        writer.flush()?;
        Ok(Self { writer, rows: 0 })
    }

    /// Rows written so far, header excluded
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|e| SinkError::Flush(e.into_error()))
    }
}

/// Similarity as the report shows it: whole percent with a `%` suffix
pub fn format_similarity(percent: f64) -> String {
    format!("{}%", percent.round() as i64)
}

impl<W: Write> ResultSink for CsvSink<W> {
    fn record(&mut self, result: &ComparisonResult) -> Result<(), SinkError> {
        let path_a = result.path_a.to_string_lossy();
        let path_b = result.path_b.to_string_lossy();
        let similarity = format_similarity(result.similarity_percent);
        self.writer
            .write_record([&*path_a, &*path_b, similarity.as_str()])?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps every result in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    results: Vec<ComparisonResult>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results(&self) -> &[ComparisonResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<ComparisonResult> {
        self.results
    }
}

impl ResultSink for MemorySink {
    fn record(&mut self, result: &ComparisonResult) -> Result<(), SinkError> {
        self.results.push(result.clone());
        Ok(())
    }
}
