pub mod dataset;
pub mod error;
pub mod out_of_sample;
