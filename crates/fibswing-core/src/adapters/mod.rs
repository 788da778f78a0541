//! Price history source adapters.

mod csv_file;
mod in_memory;

pub use csv_file::CsvPriceSource;
pub use in_memory::InMemoryPriceSource;
