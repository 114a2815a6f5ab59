pub mod columns;
pub mod deserializers;
pub mod pipeline;
pub mod types;

pub use pipeline::{
    load_dataset, parse_csv, parse_csv_reader, parse_workbook, parse_workbook_reader,
};
pub use types::{
    Capabilities, Column, ColumnRole, Dataset, Dimension, GroupKey, LoadOutput, Measure,
    ParseWarning, Record,
};
