use anyhow::{Context, Result};
use dicom::object::open_file;
use ndarray::ArrayD;
use std::path::Path;

use crate::error::ViewerError;
use crate::models::{IntensityHistogram, Statistics};
use crate::pixels;

/// Descriptive statistics over calibrated samples.
///
/// The standard deviation uses the population form (N denominator) and the
/// percentiles interpolate linearly between closest ranks.
pub fn compute(samples: &ArrayD<f32>) -> Result<Statistics, ViewerError> {
    if samples.is_empty() {
        return Err(ViewerError::EmptyImage);
    }

    let min = samples.iter().fold(f32::INFINITY, |a, &b| a.min(b));
    let max = samples.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let count = samples.len();
    let mean = samples.iter().map(|&v| v as f64).sum::<f64>() / count as f64;
    let variance = samples
        .iter()
        .map(|&v| {
            let diff = v as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / count as f64;

    let mut sorted: Vec<f32> = samples.iter().copied().collect();
    sorted.sort_unstable_by(f32::total_cmp);

    Ok(Statistics {
        min,
        max,
        mean: mean as f32,
        std_dev: variance.sqrt() as f32,
        p10: percentile_of_sorted(&sorted, 10.0),
        p50: percentile_of_sorted(&sorted, 50.0),
        p90: percentile_of_sorted(&sorted, 90.0),
        total_pixels: count,
        shape: samples.shape().to_vec(),
    })
}

/// Percentile `q` (0..=100) of an ascending slice, interpolating between ranks.
pub(crate) fn percentile_of_sorted(sorted: &[f32], q: f32) -> f32 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = q / 100.0 * (sorted.len() - 1) as f32;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = rank - lo as f32;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Fixed-width histogram over an 8-bit raster.
///
/// Bin edges divide the occupied range `[min, max]` evenly; `bins` is
/// floored at 1.
pub fn intensity_histogram(
    raster: &ArrayD<u8>,
    bins: usize,
) -> Result<IntensityHistogram, ViewerError> {
    if raster.is_empty() {
        return Err(ViewerError::EmptyImage);
    }

    let bins = bins.max(1);
    let min = raster.iter().fold(u8::MAX, |a, &b| a.min(b));
    let max = raster.iter().fold(u8::MIN, |a, &b| a.max(b));
    let range = (max - min) as usize + 1;
    let mut counts = vec![0u64; bins];
    for &v in raster.iter() {
        counts[(v - min) as usize * bins / range] += 1;
    }
    Ok(IntensityHistogram {
        bins: counts,
        min,
        max,
    })
}

/// Open a DICOM file and compute statistics over its calibrated samples.
pub fn statistics_for_file(input: &Path) -> Result<Statistics> {
    let obj = open_file(input).context("Failed to open DICOM file")?;
    let samples = pixels::extract_samples(&obj)?;
    Ok(compute(&samples)?)
}
