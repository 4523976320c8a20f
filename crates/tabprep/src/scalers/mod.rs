//! Numeric scaling module.
//!
//! Fits min-max or standard-score parameters on a column and rescales it.
//! Fitting and applying are separate so recorded [`ScalingStats`] can be
//! reapplied to other data with the same layout.

use crate::config::NormalizationMethod;
use crate::error::Result;
use crate::types::ScalingStats;
use crate::utils::{numeric_values, sample_std};
use polars::prelude::*;

/// Fits and applies numeric scaling.
pub struct NumericScaler;

impl NumericScaler {
    /// Compute scaling parameters from the present values of `series`.
    ///
    /// A column without present values gets NaN parameters. Float NaN cells
    /// are expected to be nulls already, as [`Preprocessor`] leaves them.
    ///
    /// [`Preprocessor`]: crate::Preprocessor
    pub fn fit(series: &Series, method: NormalizationMethod) -> Result<ScalingStats> {
        let floats = series.cast(&DataType::Float64)?;

        let stats = match method {
            NormalizationMethod::MinMax => ScalingStats::MinMax {
                min: floats.min::<f64>()?.unwrap_or(f64::NAN),
                max: floats.max::<f64>()?.unwrap_or(f64::NAN),
            },
            NormalizationMethod::Standard => match floats.mean() {
                Some(mean) => ScalingStats::Standard {
                    mean,
                    std: sample_std(&floats, mean)?,
                },
                None => ScalingStats::Standard {
                    mean: f64::NAN,
                    std: f64::NAN,
                },
            },
        };
        Ok(stats)
    }

    /// Rescale `series` with previously fitted parameters.
    ///
    /// Degenerate parameters (constant column) map every cell to 0.0,
    /// otherwise missing cells stay missing. The result is Float64.
    pub fn transform(series: &Series, stats: &ScalingStats) -> Result<Series> {
        let values = numeric_values(series)?;

        let scaled: Vec<Option<f64>> = if stats.is_degenerate() {
            vec![Some(0.0); values.len()]
        } else {
            values
                .into_iter()
                .map(|v| v.map(|x| scale_value(stats, x)))
                .collect()
        };

        Ok(Series::new(series.name().clone(), scaled))
    }

    /// Fit on `series` and rescale it in one step.
    pub fn fit_transform(
        series: &Series,
        method: NormalizationMethod,
    ) -> Result<(Series, ScalingStats)> {
        let stats = Self::fit(series, method)?;
        let scaled = Self::transform(series, &stats)?;
        Ok((scaled, stats))
    }
}

fn scale_value(stats: &ScalingStats, x: f64) -> f64 {
    match *stats {
        ScalingStats::MinMax { min, max } => (x - min) / (max - min),
        ScalingStats::Standard { mean, std } => (x - mean) / std,
    }
}
