//! Quantize scale: a continuous domain split into equal-width buckets, one color each.
//!
//! Bucket semantics match d3's `scaleQuantize`:
//!
//! - for `n` colors over `[lo, hi]`, thresholds are `lo + (i + 1) * (hi - lo) / n`
//! - a value's bucket is the number of thresholds `<= value`, so buckets are
//!   half-open `[t_i, t_{i+1})` and a value exactly on a threshold goes up
//! - values outside the domain clamp to the first/last bucket
//! - NaN compares false against every threshold and lands in the first bucket

use crate::error::{AppError, ErrorKind};
use crate::scale::palette::{GREENS_7, Rgb};

/// Observed min/max of `bachelorsOrHigher`; domain of the map fill scale.
pub const MAP_DOMAIN: (f64, f64) = (3.0, 66.0);
/// Legend swatch indices 0..=6.
pub const LEGEND_DOMAIN: (f64, f64) = (0.0, 6.0);

#[derive(Debug, Clone, PartialEq)]
pub struct QuantizeScale {
    lo: f64,
    hi: f64,
    colors: Vec<Rgb>,
    thresholds: Vec<f64>,
}

impl QuantizeScale {
    pub fn new(lo: f64, hi: f64, colors: &[Rgb]) -> Result<Self, AppError> {
        if colors.is_empty() {
            return Err(AppError::new(ErrorKind::Usage, "Quantize scale needs at least one color."));
        }
        if !(lo.is_finite() && hi.is_finite() && hi > lo) {
            return Err(AppError::new(
                ErrorKind::Usage,
                format!("Invalid quantize domain [{lo}, {hi}]."),
            ));
        }

        Ok(Self {
            lo,
            hi,
            colors: colors.to_vec(),
            thresholds: thresholds(lo, hi, colors.len()),
        })
    }

    /// Map fill scale: `[3, 66]` → Greens.
    pub fn map_fill() -> Self {
        Self::from_constants(MAP_DOMAIN, &GREENS_7)
    }

    /// Legend swatch scale: `[0, 6]` → Greens (index `i` → color `i`).
    pub fn legend_swatch() -> Self {
        Self::from_constants(LEGEND_DOMAIN, &GREENS_7)
    }

    fn from_constants(domain: (f64, f64), colors: &[Rgb; 7]) -> Self {
        let (lo, hi) = domain;
        Self {
            lo,
            hi,
            colors: colors.to_vec(),
            thresholds: thresholds(lo, hi, colors.len()),
        }
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.lo, self.hi)
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn bucket_count(&self) -> usize {
        self.colors.len()
    }

    pub fn bucket(&self, value: f64) -> usize {
        self.thresholds.partition_point(|t| *t <= value)
    }

    pub fn color(&self, value: f64) -> Rgb {
        self.colors[self.bucket(value)]
    }

    /// Domain interval covered by bucket `i`: `[start, end)` (last bucket closed at `hi`).
    pub fn bucket_extent(&self, i: usize) -> Option<(f64, f64)> {
        if i >= self.colors.len() {
            return None;
        }
        let start = if i == 0 { self.lo } else { self.thresholds[i - 1] };
        let end = self.thresholds.get(i).copied().unwrap_or(self.hi);
        Some((start, end))
    }
}

/// `n_colors - 1` inner thresholds. Same arithmetic as d3 so integer-friendly
/// domains give exact values.
fn thresholds(lo: f64, hi: f64, n_colors: usize) -> Vec<f64> {
    let n = n_colors.saturating_sub(1);
    (0..n)
        .map(|i| ((i as f64 + 1.0) * hi - (i as f64 - n as f64) * lo) / (n as f64 + 1.0))
        .collect()
}
