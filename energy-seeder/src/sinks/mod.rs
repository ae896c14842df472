pub mod csv_file;
pub mod memory;
pub mod postgres;

pub use csv_file::CsvFileSink;
pub use memory::MemorySink;
pub use postgres::PgEnergySink;
