//! File adapter for the pipeline: CSV source tables in, CSV/JSON artifacts out.

pub mod csv_table;
pub mod writer;

pub use csv_table::{read_source_table, write_table};
pub use writer::OutputWriter;
