use crate::data::error::DataError;
use crate::frames::observation_frame::ObservationFrame;
use crate::types::columns::{ELEVATION, LATITUDE, LONGITUDE, STATION_ID, TIMESTAMP};
use crate::types::observation::Indicator;
use log::info;
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;

/// Timestamp layout of the station files, e.g. `20160101 00:06`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y%m%d %H:%M";

/// Scans delimited observation files into one [`ObservationFrame`].
///
/// Files are stacked in the given order; rows are never merged across files. Each file
/// must carry a header with the observation columns. Station ids are read as strings,
/// coordinates and indicators as floats, and `timestamp` is parsed with
/// `timestamp_format`.
///
/// The scan is lazy: unparseable timestamps or missing columns surface when the frame is
/// collected.
pub fn load_csv<P: AsRef<Path>>(
    paths: &[P],
    timestamp_format: &str,
) -> Result<ObservationFrame, DataError> {
    if paths.is_empty() {
        return Err(DataError::NoInputFiles);
    }

    let overrides = station_id_as_string();
    let frames = paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            LazyCsvReader::new(path)
                .with_has_header(true)
                .with_dtype_overwrite(Some(overrides.clone()))
                .finish()
                .map(|frame| normalize(frame, timestamp_format))
                .map_err(|e| DataError::CsvScan(path.to_path_buf(), e))
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!("Scanning {} observation files", frames.len());
    let frame = concat(frames, UnionArgs::default())?;
    Ok(ObservationFrame::new(frame))
}

/// Station ids are read verbatim, so `01014002` and `1014002` stay distinct.
fn station_id_as_string() -> SchemaRef {
    let mut schema = Schema::default();
    schema.with_column(STATION_ID.into(), DataType::String);
    Arc::new(schema)
}

fn normalize(frame: LazyFrame, timestamp_format: &str) -> LazyFrame {
    let mut columns = vec![
        col(STATION_ID).cast(DataType::String),
        col(LATITUDE).cast(DataType::Float64),
        col(LONGITUDE).cast(DataType::Float64),
        col(ELEVATION).cast(DataType::Float64),
        col(TIMESTAMP).cast(DataType::String).str().to_datetime(
            Some(TimeUnit::Milliseconds),
            None,
            StrptimeOptions {
                format: Some(timestamp_format.into()),
                ..Default::default()
            },
            lit("raise"),
        ),
    ];
    columns.extend(
        Indicator::ALL
            .iter()
            .map(|indicator| col(indicator.column()).cast(DataType::Float64)),
    );
    frame.select(columns)
}
