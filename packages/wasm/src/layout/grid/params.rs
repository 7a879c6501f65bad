//! Grid sizing parameters.

use serde::{Deserialize, Serialize};

use super::shape::GridShape;
use crate::error::{Error, Result};

/// Configuration for grid arrangement.
///
/// Treated as a value: derive variants with the `with_*` methods instead of
/// sharing and mutating one instance between arrangers.
///
/// `size_gain` must be positive and the gaps non-negative. The arranger does
/// not check this; run [`GridParameters::validate`] where parameters enter
/// the program.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridParameters {
    /// Grid shape (default: Square).
    pub shape: GridShape,
    /// Multiplier applied to node diameters to size cells (default: 1.25).
    pub size_gain: f32,
    /// Gap between neighbouring columns (default: 1).
    pub horizontal_gap: i32,
    /// Gap between neighbouring rows (default: 1).
    pub vertical_gap: i32,
    /// Nudge even columns up by half their row height (default: false).
    pub row_offsets: bool,
}

impl Default for GridParameters {
    fn default() -> Self {
        Self {
            shape: GridShape::Square,
            size_gain: 1.25,
            horizontal_gap: 1,
            vertical_gap: 1,
            row_offsets: false,
        }
    }
}

/// The parameters every grid command starts from.
pub fn default_parameters() -> GridParameters {
    GridParameters::default()
}

impl GridParameters {
    pub fn with_shape(self, shape: GridShape) -> Self {
        Self { shape, ..self }
    }

    pub fn with_size_gain(self, size_gain: f32) -> Self {
        Self { size_gain, ..self }
    }

    pub fn with_gaps(self, horizontal_gap: i32, vertical_gap: i32) -> Self {
        Self {
            horizontal_gap,
            vertical_gap,
            ..self
        }
    }

    pub fn with_row_offsets(self, row_offsets: bool) -> Self {
        Self { row_offsets, ..self }
    }

    /// Check the preconditions the arranger relies on.
    pub fn validate(&self) -> Result<()> {
        if !self.size_gain.is_finite() || self.size_gain <= 0.0 {
            return Err(Error::InvalidParameters {
                reason: format!("size gain must be positive, got {}", self.size_gain),
            });
        }
        if self.horizontal_gap < 0 {
            return Err(Error::InvalidParameters {
                reason: format!(
                    "horizontal gap must not be negative, got {}",
                    self.horizontal_gap
                ),
            });
        }
        if self.vertical_gap < 0 {
            return Err(Error::InvalidParameters {
                reason: format!(
                    "vertical gap must not be negative, got {}",
                    self.vertical_gap
                ),
            });
        }
        Ok(())
    }
}
