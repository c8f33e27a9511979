pub mod error;
pub mod nominatim;
pub mod reverse;

pub use nominatim::NominatimGeocoder;
pub use reverse::{label_cells, ReverseGeocoder};
