pub mod error;
pub mod loader;
pub mod writer;

pub use loader::{load_csv, DEFAULT_TIMESTAMP_FORMAT};
pub use writer::{write_csv, write_parquet};
