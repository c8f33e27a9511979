use crate::data::error::DataError;
use log::info;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Writes `df` as a CSV file with a header row.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<(), DataError> {
    let file = File::create(path).map_err(|e| DataError::CsvWriteIo(path.to_path_buf(), e))?;
    CsvWriter::new(file)
        .include_header(true)
        .finish(df)
        .map_err(|e| DataError::CsvWritePolars(path.to_path_buf(), e))?;
    info!("Wrote {} rows to {:?}", df.height(), path);
    Ok(())
}

/// Writes `df` as a Snappy-compressed parquet file.
pub fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<(), DataError> {
    let file = File::create(path).map_err(|e| DataError::ParquetWriteIo(path.to_path_buf(), e))?;
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Snappy)
        .finish(df)
        .map_err(|e| DataError::ParquetWritePolars(path.to_path_buf(), e))?;
    info!("Wrote {} rows to {:?}", df.height(), path);
    Ok(())
}
