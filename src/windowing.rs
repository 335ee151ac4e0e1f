//
// windowing.rs
// Dicom-Viewer-rs
//
// Maps calibrated pixel values onto the 8-bit display range under a window center/width, with inversion and equalization modifiers.
//
// Thales Matheus Mendonça Santos - February 2026

use dicom::dictionary_std::tags;
use ndarray::{ArrayD, IxDyn};
use rayon::prelude::*;
use serde::Serialize;
use tracing::warn;

use crate::dicom_access::ElementAccess;
use crate::error::ViewerError;
use crate::models::WindowBounds;
use crate::stats;

/// Smallest accepted window width; anything narrower collapses the mapping domain.
pub const MIN_WINDOW_WIDTH: f32 = 1.0;

/// Window center/width pair describing the visible intensity band
/// `[center - width/2, center + width/2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowParams {
    center: f32,
    width: f32,
}

impl WindowParams {
    /// Build a window, flooring the width at [`MIN_WINDOW_WIDTH`].
    pub fn new(center: f32, width: f32) -> Self {
        Self {
            center,
            width: width.max(MIN_WINDOW_WIDTH),
        }
    }

    pub fn center(&self) -> f32 {
        self.center
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// Lower edge of the mapping domain.
    pub fn lower(&self) -> f32 {
        self.center - self.width / 2.0
    }

    /// Upper edge of the mapping domain.
    pub fn upper(&self) -> f32 {
        self.center + self.width / 2.0
    }
}

/// Resolve the window shown on first display.
///
/// Explicit WindowCenter/WindowWidth metadata wins, taking the first value
/// of multi-valued presets. Files without one fall back to a p1/p99
/// percentile window over the samples.
pub fn resolve_default<T: ElementAccess>(obj: &T, samples: &ArrayD<f32>) -> WindowParams {
    let center = obj.element_f32(tags::WINDOW_CENTER);
    let width = obj.element_f32(tags::WINDOW_WIDTH);
    if let (Some(center), Some(width)) = (center, width) {
        return WindowParams::new(center, width);
    }
    percentile_window(samples)
}

fn percentile_window(samples: &ArrayD<f32>) -> WindowParams {
    if samples.is_empty() {
        return WindowParams::new(0.0, MIN_WINDOW_WIDTH);
    }
    let mut sorted: Vec<f32> = samples.iter().copied().collect();
    sorted.sort_unstable_by(f32::total_cmp);
    let p1 = stats::percentile_of_sorted(&sorted, 1.0);
    let p99 = stats::percentile_of_sorted(&sorted, 99.0);
    WindowParams::new((p99 + p1) / 2.0, p99 - p1)
}

/// Slider limits for interactive adjustment: the center spans the sample
/// range, the width goes up to the full dynamic range plus one.
pub fn slider_bounds(samples: &ArrayD<f32>) -> WindowBounds {
    if samples.is_empty() {
        return WindowBounds {
            center_min: 0.0,
            center_max: 0.0,
            width_min: MIN_WINDOW_WIDTH,
            width_max: MIN_WINDOW_WIDTH,
        };
    }
    let min = samples.iter().fold(f32::INFINITY, |a, &b| a.min(b));
    let max = samples.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    WindowBounds {
        center_min: min,
        center_max: max,
        width_min: MIN_WINDOW_WIDTH,
        width_max: max - min + 1.0,
    }
}

/// Render calibrated samples to an 8-bit raster.
///
/// Each sample is clamped to the window, normalized to [0, 1] and scaled to
/// 0..=255 with `f32::round` (half away from zero, which on this
/// non-negative range is plain half-up). `invert` flips intensities after
/// scaling; `equalize` then applies a global histogram equalization over
/// single-channel rasters and leaves anything else unchanged.
pub fn apply(
    samples: &ArrayD<f32>,
    params: WindowParams,
    invert: bool,
    equalize: bool,
) -> Result<ArrayD<u8>, ViewerError> {
    if samples.is_empty() {
        return Err(ViewerError::EmptyImage);
    }

    let lower = params.lower();
    let upper = params.upper();
    let span = upper - lower;

    // The mapping is elementwise, so a chunked parallel pass stays
    // bit-identical to the sequential one.
    let shape = samples.shape().to_vec();
    let values: Vec<f32> = samples.iter().copied().collect();
    let mapped: Vec<u8> = values
        .par_chunks(4096)
        .flat_map_iter(|chunk| {
            chunk.iter().map(|&v| {
                let norm = (v.clamp(lower, upper) - lower) / span;
                (norm * 255.0).round() as u8
            })
        })
        .collect();

    let mut raster =
        ArrayD::from_shape_vec(IxDyn(&shape), mapped).expect("mapped buffer matches sample shape");

    if invert {
        raster.mapv_inplace(|v| 255 - v);
    }
    if equalize {
        equalize_raster(&mut raster);
    }
    Ok(raster)
}

/// Global histogram equalization over a single-channel 8-bit raster.
///
/// The remap is the classic monotonic CDF lookup; degenerate histograms and
/// multi-channel rasters are left untouched.
fn equalize_raster(raster: &mut ArrayD<u8>) {
    if raster.ndim() != 2 {
        warn!(
            ndim = raster.ndim(),
            "equalization skipped: unsupported channel layout"
        );
        return;
    }

    let total = raster.len() as u64;
    let mut cdf = [0u64; 256];
    for &v in raster.iter() {
        cdf[v as usize] += 1;
    }
    let mut running = 0u64;
    for count in cdf.iter_mut() {
        running += *count;
        *count = running;
    }

    let cdf_min = cdf.iter().copied().find(|&c| c > 0).unwrap_or(0);
    if cdf_min == total {
        // Single occupied level: nothing to spread.
        return;
    }

    let mut lut = [0u8; 256];
    let den = (total - cdf_min) as f64;
    for (level, entry) in lut.iter_mut().enumerate() {
        let num = cdf[level].saturating_sub(cdf_min) as f64;
        *entry = ((num / den) * 255.0).round() as u8;
    }
    raster.mapv_inplace(|v| lut[v as usize]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicom::core::{DataElement, PrimitiveValue, VR};
    use dicom::dictionary_std::StandardDataDictionary;
    use dicom::object::InMemDicomObject;
    use ndarray::Array;

    fn samples_2d(rows: usize, cols: usize, values: Vec<f32>) -> ArrayD<f32> {
        Array::from_shape_vec(IxDyn(&[rows, cols]), values).expect("shape")
    }

    fn empty_object() -> InMemDicomObject<StandardDataDictionary> {
        InMemDicomObject::new_empty_with_dict(StandardDataDictionary)
    }

    #[test]
    fn width_is_floored_at_one() {
        let params = WindowParams::new(10.0, 0.0);
        assert_eq!(params.width(), MIN_WINDOW_WIDTH);
        assert_eq!(params.lower(), 9.5);
        assert_eq!(params.upper(), 10.5);
    }

    #[test]
    fn soft_tissue_window_maps_reference_points() {
        let samples = samples_2d(1, 3, vec![0.0, 40.0, 80.0]);
        let raster = apply(&samples, WindowParams::new(40.0, 80.0), false, false).expect("apply");
        assert_eq!(raster.as_slice().unwrap(), &[0, 128, 255]);
    }

    #[test]
    fn apply_is_deterministic() {
        let samples = samples_2d(2, 2, vec![-10.0, 0.5, 3.25, 99.0]);
        let params = WindowParams::new(5.0, 30.0);
        let first = apply(&samples, params, true, true).expect("first");
        let second = apply(&samples, params, true, true).expect("second");
        assert_eq!(first, second);
    }

    #[test]
    fn invert_is_an_involution_of_the_plain_mapping() {
        let samples = samples_2d(2, 3, vec![-50.0, 0.0, 25.0, 50.0, 75.0, 200.0]);
        let params = WindowParams::new(40.0, 100.0);
        let plain = apply(&samples, params, false, false).expect("plain");
        let inverted = apply(&samples, params, true, false).expect("inverted");
        for (a, b) in plain.iter().zip(inverted.iter()) {
            assert_eq!(*a, 255 - *b);
        }
    }

    #[test]
    fn raising_a_sample_never_darkens_it() {
        let params = WindowParams::new(0.0, 10.0);
        let low = apply(&samples_2d(1, 1, vec![-1.0]), params, false, false).expect("low");
        let high = apply(&samples_2d(1, 1, vec![1.0]), params, false, false).expect("high");
        assert!(high[[0, 0]] >= low[[0, 0]]);
    }

    #[test]
    fn flat_image_resolves_to_unit_width_and_renders_mid_gray() {
        let samples = samples_2d(2, 2, vec![7.0; 4]);
        let params = resolve_default(&empty_object(), &samples);
        assert_eq!(params.center(), 7.0);
        assert_eq!(params.width(), MIN_WINDOW_WIDTH);

        let raster = apply(&samples, params, false, false).expect("apply");
        assert!(raster.iter().all(|&v| v == 128));
    }

    #[test]
    fn percentile_fallback_matches_linear_interpolation() {
        let values: Vec<f32> = (0..100).map(|v| v as f32).collect();
        let samples = samples_2d(10, 10, values);
        let params = resolve_default(&empty_object(), &samples);
        assert!((params.center() - 49.5).abs() < 1e-3);
        assert!((params.width() - 97.02).abs() < 1e-3);

        let raster = apply(&samples, params, false, false).expect("apply");
        assert_eq!(raster[[0, 0]], 0);
        assert_eq!(raster[[9, 9]], 255);
    }

    #[test]
    fn metadata_window_takes_precedence_over_percentiles() {
        let mut obj = empty_object();
        obj.put(DataElement::new(
            tags::WINDOW_CENTER,
            VR::DS,
            PrimitiveValue::from("300"),
        ));
        obj.put(DataElement::new(
            tags::WINDOW_WIDTH,
            VR::DS,
            PrimitiveValue::from("600"),
        ));
        let samples = samples_2d(1, 2, vec![0.0, 1.0]);
        let params = resolve_default(&obj, &samples);
        assert_eq!(params.center(), 300.0);
        assert_eq!(params.width(), 600.0);
    }

    #[test]
    fn center_without_width_falls_back_to_percentiles() {
        let mut obj = empty_object();
        obj.put(DataElement::new(
            tags::WINDOW_CENTER,
            VR::DS,
            PrimitiveValue::from("300"),
        ));
        let samples = samples_2d(1, 2, vec![10.0, 20.0]);
        let params = resolve_default(&obj, &samples);
        assert!((params.center() - 15.0).abs() < 1e-3);
        assert!((params.width() - 9.8).abs() < 1e-3);
    }

    #[test]
    fn empty_samples_are_rejected() {
        let samples = Array::from_shape_vec(IxDyn(&[0, 0]), Vec::new()).expect("shape");
        let err = apply(&samples, WindowParams::new(0.0, 1.0), false, false).unwrap_err();
        assert!(matches!(err, ViewerError::EmptyImage));
    }

    #[test]
    fn slider_bounds_cover_the_sample_range() {
        let samples = samples_2d(1, 4, vec![-100.0, 0.0, 50.0, 200.0]);
        let bounds = slider_bounds(&samples);
        assert_eq!(bounds.center_min, -100.0);
        assert_eq!(bounds.center_max, 200.0);
        assert_eq!(bounds.width_min, MIN_WINDOW_WIDTH);
        assert_eq!(bounds.width_max, 301.0);
    }

    #[test]
    fn equalization_spreads_occupied_levels() {
        let mut raster =
            Array::from_shape_vec(IxDyn(&[2, 2]), vec![10u8, 10, 20, 30]).expect("shape");
        equalize_raster(&mut raster);
        assert_eq!(raster.as_slice().unwrap(), &[0, 0, 128, 255]);
    }

    #[test]
    fn equalization_keeps_multichannel_rasters_unchanged() {
        let samples =
            Array::from_shape_vec(IxDyn(&[1, 2, 3]), vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0])
                .expect("shape");
        let params = WindowParams::new(25.0, 50.0);
        let plain = apply(&samples, params, false, false).expect("plain");
        let equalized = apply(&samples, params, false, true).expect("equalized");
        assert_eq!(plain, equalized);
    }

    #[test]
    fn equalization_runs_after_inversion() {
        let samples = samples_2d(2, 2, vec![0.0, 0.0, 30.0, 60.0]);
        let params = WindowParams::new(30.0, 60.0);
        let manual = {
            let mut raster = apply(&samples, params, true, false).expect("inverted");
            equalize_raster(&mut raster);
            raster
        };
        let combined = apply(&samples, params, true, true).expect("combined");
        assert_eq!(manual, combined);
    }
}
