// ================================
// src/lidar.rs - range sector analysis
// ================================
use crate::config::{MoveSpecs, SectorRange};
use crate::error::{NavError, Result};

/// Minimum reading in the closed index interval `[low, high]`.
///
/// A sector reaching past the end of the scan is a misconfiguration and is
/// reported instead of clamped. NaN readings never become the minimum.
pub fn min_in_range(ranges: &[f32], sector: SectorRange) -> Result<f64> {
    let SectorRange { low, high } = sector;
    if low > high {
        return Err(NavError::InvalidSector { low, high });
    }
    let window = ranges
        .get(low..=high)
        .ok_or(NavError::SectorOutOfBounds {
            low,
            high,
            len: ranges.len(),
        })?;

    let min = window.iter().copied().fold(f32::INFINITY, f32::min);
    Ok(f64::from(min))
}

/// Single reading at `index`.
pub fn sample(ranges: &[f32], index: usize) -> Result<f64> {
    ranges
        .get(index)
        .map(|&range| f64::from(range))
        .ok_or(NavError::SampleOutOfBounds {
            index,
            len: ranges.len(),
        })
}

/// Per-scan minima of the three named sectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorMinima {
    pub right: f64,
    pub left: f64,
    pub center: f64,
}

impl SectorMinima {
    pub fn from_scan(ranges: &[f32], specs: &MoveSpecs) -> Result<Self> {
        Ok(Self {
            right: min_in_range(ranges, specs.right_range)?,
            left: min_in_range(ranges, specs.left_range)?,
            center: min_in_range(ranges, specs.center_range)?,
        })
    }

    pub fn overall(&self) -> f64 {
        self.right.min(self.left).min(self.center)
    }
}
