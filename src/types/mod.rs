pub mod aggregation;
pub mod cell;
pub mod columns;
pub mod observation;
pub mod station;
