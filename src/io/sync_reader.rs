//! Synchronous ops-file reader with iterator interface
//!
//! Streams typed replay operations from a CSV file, one row at a time.
//! CSV format concerns are delegated to the `csv_format` module.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual row problems are yielded as `Err` items with the line number
//!   so the replay loop can log and continue
//!
//! # Memory Efficiency
//!
//! Rows are read and converted one at a time; memory usage does not grow
//! with the file size.

use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::io::csv_format::{convert_op_record, OpRecord, ReplayOp};

/// Streaming reader over the replay ops file
#[derive(Debug)]
pub struct OpReader {
    reader: csv::Reader<File>,
    line_num: usize,
}

impl OpReader {
    /// Open an ops CSV file for streaming iteration
    ///
    /// The reader trims whitespace from all fields and tolerates rows with
    /// trailing columns omitted, since most columns are operation-specific.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 1, // header
        })
    }
}

impl Iterator for OpReader {
    type Item = Result<ReplayOp, String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.line_num += 1;
        let line = self.line_num;

        let record: OpRecord = match self.reader.deserialize().next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(format!("Line {}: {}", line, e))),
        };

        Some(convert_op_record(record).map_err(|e| format!("Line {}: {}", line, e)))
    }
}
