//! Column names shared by every frame in the pipeline.
//!
//! Stages address columns by these names only, so a frame produced by one stage can be
//! consumed by the next without any renaming.

pub const STATION_ID: &str = "station_id";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const ELEVATION: &str = "elevation";
pub const TIMESTAMP: &str = "timestamp";

pub const CELL_ID: &str = "cell_id";
pub const HOUR: &str = "hour";
pub const DATE: &str = "date";

pub const HIGH_SEASON: &str = "high_season";

/// Name of the `slot`-th neighbor identifier column (`neighbor_0`, `neighbor_1`, ...).
pub fn neighbor_column(slot: usize) -> String {
    format!("neighbor_{slot}")
}

/// Name of the precipitation observed in the `slot`-th neighbor cell.
pub fn neighbor_precip_column(slot: usize) -> String {
    format!("neighbor_{slot}_precip")
}

/// Name of an aggregated column, e.g. `precipitation_mean`.
pub fn aggregated_column(column: &str, suffix: &str) -> String {
    format!("{column}_{suffix}")
}

/// Name of the `k`-th lag of `column`, e.g. `precipitation_mean_lag_2`.
pub fn lag_column(column: &str, k: usize) -> String {
    format!("{column}_lag_{k}")
}

/// One-hot month indicator name, `month_1` through `month_12`.
pub fn month_column(month: u32) -> String {
    format!("month_{month}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_names() {
        assert_eq!(neighbor_column(2), "neighbor_2");
        assert_eq!(neighbor_precip_column(0), "neighbor_0_precip");
        assert_eq!(aggregated_column("precipitation", "max"), "precipitation_max");
        assert_eq!(lag_column("precipitation_mean", 3), "precipitation_mean_lag_3");
        assert_eq!(month_column(12), "month_12");
    }
}
