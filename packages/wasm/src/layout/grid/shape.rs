//! Grid shapes and their row/column constraints.
//!
//! [`GridShape`] is a plain closed enum. Labels, constraints and parsing live
//! in the lookup table below so that presentation order and behavior are
//! defined in one place.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported grid layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GridShape {
    /// Roughly as many columns as rows.
    #[default]
    Square,
    /// A single row.
    HorizontalLine,
    /// A single column.
    VerticalLine,
    TwoRows,
    ThreeRows,
    FourRows,
    TwoColumns,
    ThreeColumns,
    FourColumns,
}

/// One entry of the shape table: the shape, its label, and its
/// `(forced columns, forced rows)` pair where `0` leaves the count free.
struct ShapeEntry {
    shape: GridShape,
    label: &'static str,
    dimensions: (usize, usize),
}

/// Rows are in presentation order; pickers list shapes in exactly this order.
static SHAPES: [ShapeEntry; 9] = [
    ShapeEntry {
        shape: GridShape::Square,
        label: "Square",
        dimensions: (0, 0),
    },
    ShapeEntry {
        shape: GridShape::HorizontalLine,
        label: "Horizontal line",
        dimensions: (0, 1),
    },
    ShapeEntry {
        shape: GridShape::VerticalLine,
        label: "Vertical line",
        dimensions: (1, 0),
    },
    ShapeEntry {
        shape: GridShape::TwoColumns,
        label: "Two columns",
        dimensions: (2, 0),
    },
    ShapeEntry {
        shape: GridShape::TwoRows,
        label: "Two rows",
        dimensions: (0, 2),
    },
    ShapeEntry {
        shape: GridShape::ThreeColumns,
        label: "Three columns",
        dimensions: (3, 0),
    },
    ShapeEntry {
        shape: GridShape::ThreeRows,
        label: "Three rows",
        dimensions: (0, 3),
    },
    ShapeEntry {
        shape: GridShape::FourColumns,
        label: "Four columns",
        dimensions: (4, 0),
    },
    ShapeEntry {
        shape: GridShape::FourRows,
        label: "Four rows",
        dimensions: (0, 4),
    },
];

fn entry(shape: GridShape) -> &'static ShapeEntry {
    // Every variant has a row; Square is the first row.
    SHAPES
        .iter()
        .find(|e| e.shape == shape)
        .unwrap_or(&SHAPES[0])
}

/// The `(forced columns, forced rows)` pair for `shape`.
///
/// `0` means the count is derived from the number of nodes; `(0, 0)` asks for
/// a square-ish grid.
pub fn dimensions_for(shape: GridShape) -> (usize, usize) {
    entry(shape).dimensions
}

/// Human-readable label for `shape`.
pub fn display_label(shape: GridShape) -> &'static str {
    entry(shape).label
}

/// Parse a shape from its label, ignoring case and surrounding whitespace.
///
/// Anything unrecognised falls back to [`GridShape::Square`].
pub fn parse(name: &str) -> GridShape {
    let name = name.trim();
    SHAPES
        .iter()
        .find(|e| e.label.eq_ignore_ascii_case(name))
        .map_or(GridShape::Square, |e| e.shape)
}

/// Labels of every shape in presentation order.
pub fn all_choices() -> Vec<&'static str> {
    SHAPES.iter().map(|e| e.label).collect()
}

impl GridShape {
    /// Every shape in presentation order.
    pub fn all() -> impl Iterator<Item = GridShape> {
        SHAPES.iter().map(|e| e.shape)
    }

    /// See [`display_label`].
    pub fn label(self) -> &'static str {
        display_label(self)
    }

    /// See [`dimensions_for`].
    pub fn dimensions(self) -> (usize, usize) {
        dimensions_for(self)
    }
}

impl fmt::Display for GridShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(display_label(*self))
    }
}

impl FromStr for GridShape {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse(s))
    }
}

impl From<String> for GridShape {
    fn from(name: String) -> Self {
        parse(&name)
    }
}

impl From<GridShape> for String {
    fn from(shape: GridShape) -> Self {
        display_label(shape).to_owned()
    }
}
