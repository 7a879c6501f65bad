//! Grid arrangement: shapes, sizing parameters and the arranger.

mod arranger;
mod params;
mod shape;

pub use arranger::{Arrangement, GridArranger};
pub use params::{GridParameters, default_parameters};
pub use shape::{GridShape, all_choices, dimensions_for, display_label, parse};
