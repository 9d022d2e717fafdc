//! I/O handling for the replay tool
//!
//! - `csv_format` - row structures, typed-op conversion, summary output
//! - `sync_reader` - streaming iterator over the ops file
//! - `async_reader` - batch reader over the provider-events file

pub mod async_reader;
pub mod csv_format;
pub mod sync_reader;

pub use async_reader::EventReader;
pub use csv_format::{convert_op_record, write_summaries_csv, EventRecord, OpRecord, ReplayOp};
pub use sync_reader::OpReader;
