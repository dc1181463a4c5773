pub(crate) mod common;
pub(crate) mod core;
pub(crate) mod export;
pub(crate) mod records;

pub use crate::common::error::RowsetError;
pub use crate::core::types::Value;
pub use crate::export::{CsvOptions, Dataset, ExportFormat};
pub use crate::records::{
    collection::{RecordCollection, Records},
    record::Record,
    source::{EmptySource, IterSource, RowSource},
};
