pub mod cell_hourly_frame;
pub mod daily_feature_frame;
pub mod observation_frame;
