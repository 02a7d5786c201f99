//! Data module - CSV loading and long-to-wide reshaping

mod loader;
mod processor;
mod table;

pub use loader::{read_variable, read_variable_with, DataLoader, LoaderError};
pub use processor::{parse_timestamp, DataProcessor, ProcessorError};
pub use table::{SiteTable, TableError};
