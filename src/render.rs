//
// render.rs
// Dicom-Viewer-rs
//
// Drives the display pipeline from DICOM file to 8-bit image, including encoding and file export.
//
// Thales Matheus Mendonça Santos - February 2026

use anyhow::{Context, Result};
use dicom::dictionary_std::tags;
use dicom::object::open_file;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use ndarray::{ArrayD, Axis};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::dicom_access::ElementAccess;
use crate::error::ViewerError;
use crate::export;
use crate::models::{IntensityHistogram, WindowBounds};
use crate::pixels;
use crate::stats;
use crate::windowing::{self, WindowParams};

/// Options controlling how samples are mapped to the output image.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Window override; `None` resolves the file's default window.
    pub window: Option<WindowParams>,
    pub invert: bool,
    pub equalize: bool,
}

/// Render a DICOM file to an image on disk and return the path written.
///
/// Without an explicit output path the file lands in the working directory
/// under the suggested export name, with its extension switched to `format`.
pub fn render_file(
    input: &Path,
    output: Option<PathBuf>,
    format: &str,
    options: &RenderOptions,
) -> Result<PathBuf> {
    let obj = open_file(input).context("Failed to open DICOM file")?;
    let samples = pixels::extract_samples(&obj)?;
    let params = options
        .window
        .unwrap_or_else(|| windowing::resolve_default(&obj, &samples));
    let raster = windowing::apply(&samples, params, options.invert, options.equalize)?;
    let image = raster_to_image(&raster)?;

    let output = output.unwrap_or_else(|| {
        let patient_id = obj.element_str(tags::PATIENT_ID);
        let mut path = PathBuf::from(export::suggested_filename(patient_id.as_deref()));
        path.set_extension(format);
        path
    });
    image
        .save(&output)
        .with_context(|| format!("Failed to save image to {:?}", output))?;
    println!("Image saved to: {:?}", output);
    Ok(output)
}

/// Render a DICOM file to in-memory PNG bytes.
pub fn render_png_bytes(input: &Path, options: &RenderOptions) -> Result<Vec<u8>> {
    let obj = open_file(input)?;
    let samples = pixels::extract_samples(&obj)?;
    let params = options
        .window
        .unwrap_or_else(|| windowing::resolve_default(&obj, &samples));
    let raster = windowing::apply(&samples, params, options.invert, options.equalize)?;
    Ok(encode_raster(&raster, ImageFormat::Png)?)
}

/// Encode an 8-bit raster into `format` in memory.
pub fn encode_raster(raster: &ArrayD<u8>, format: ImageFormat) -> Result<Vec<u8>, ViewerError> {
    let image = raster_to_image(raster)?;
    encode_image(&image, format)
}

/// Histogram of the rendered raster under the file's default window.
pub fn histogram_for_file(input: &Path, bins: usize) -> Result<IntensityHistogram> {
    let obj = open_file(input).context("Failed to open DICOM file")?;
    let samples = pixels::extract_samples(&obj)?;
    let params = windowing::resolve_default(&obj, &samples);
    let raster = windowing::apply(&samples, params, false, false)?;
    Ok(stats::intensity_histogram(&raster, bins)?)
}

/// Resolve the default window and the slider bounds for a file.
pub fn window_for_file(input: &Path) -> Result<(WindowParams, WindowBounds)> {
    let obj = open_file(input).context("Failed to open DICOM file")?;
    let samples = pixels::extract_samples(&obj)?;
    let params = windowing::resolve_default(&obj, &samples);
    let bounds = windowing::slider_bounds(&samples);
    Ok((params, bounds))
}

/// Wrap an 8-bit raster into an image buffer.
///
/// `[rows, cols]` becomes grayscale and `[rows, cols, 3]` becomes RGB. Any
/// other layout is squeezed down to its first plane and rendered grayscale.
pub fn raster_to_image(raster: &ArrayD<u8>) -> Result<DynamicImage, ViewerError> {
    let shape = raster.shape().to_vec();
    match shape.as_slice() {
        &[rows, cols] => gray_image(rows, cols, raster.iter().copied().collect(), shape),
        &[rows, cols, 3] => {
            let data: Vec<u8> = raster.iter().copied().collect();
            let image = RgbImage::from_raw(cols as u32, rows as u32, data)
                .ok_or(ViewerError::UnsupportedShape { shape })?;
            Ok(DynamicImage::ImageRgb8(image))
        }
        _ => {
            warn!(?shape, "unsupported raster layout, rendering first plane");
            let plane = squeeze_to_plane(raster);
            let plane_shape = plane.shape().to_vec();
            gray_image(
                plane_shape[0],
                plane_shape[1],
                plane.iter().copied().collect(),
                plane_shape,
            )
        }
    }
}

fn gray_image(
    rows: usize,
    cols: usize,
    data: Vec<u8>,
    shape: Vec<usize>,
) -> Result<DynamicImage, ViewerError> {
    let image = GrayImage::from_raw(cols as u32, rows as u32, data)
        .ok_or(ViewerError::UnsupportedShape { shape })?;
    Ok(DynamicImage::ImageLuma8(image))
}

/// Reduce an arbitrary raster to a 2-D plane by dropping size-1 axes first
/// and taking index 0 of the trailing axis otherwise.
fn squeeze_to_plane(raster: &ArrayD<u8>) -> ArrayD<u8> {
    let mut plane = raster.clone();
    while plane.ndim() > 2 {
        if let Some(axis) = (0..plane.ndim()).find(|&i| plane.shape()[i] == 1) {
            plane = plane.index_axis_move(Axis(axis), 0);
        } else {
            let last = plane.ndim() - 1;
            plane = plane.index_axis_move(Axis(last), 0);
        }
    }
    if plane.ndim() == 1 {
        plane.insert_axis(Axis(0))
    } else {
        plane
    }
}

fn encode_image(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, ViewerError> {
    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), format)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, IxDyn};

    #[test]
    fn gray_raster_round_trips_through_png() {
        let raster =
            Array::from_shape_vec(IxDyn(&[2, 2]), vec![0u8, 85, 170, 255]).expect("shape");
        let png = encode_raster(&raster, ImageFormat::Png).expect("encode");
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));

        let decoded = image::load_from_memory(&png).expect("decode").to_luma8();
        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.get_pixel(0, 0).0, [0]);
        assert_eq!(decoded.get_pixel(1, 0).0, [85]);
        assert_eq!(decoded.get_pixel(0, 1).0, [170]);
        assert_eq!(decoded.get_pixel(1, 1).0, [255]);
    }

    #[test]
    fn three_channel_raster_becomes_rgb() {
        let raster =
            Array::from_shape_vec(IxDyn(&[1, 2, 3]), vec![0u8, 1, 2, 3, 4, 5]).expect("shape");
        let image = raster_to_image(&raster).expect("image");
        let rgb = image.to_rgb8();
        assert_eq!(rgb.dimensions(), (2, 1));
        assert_eq!(rgb.get_pixel(0, 0).0, [0, 1, 2]);
        assert_eq!(rgb.get_pixel(1, 0).0, [3, 4, 5]);
    }

    #[test]
    fn four_channel_raster_falls_back_to_first_plane() {
        let raster =
            Array::from_shape_vec(IxDyn(&[2, 2, 4]), (0u8..16).collect::<Vec<_>>())
                .expect("shape");
        let image = raster_to_image(&raster).expect("image");
        let gray = image.to_luma8();
        assert_eq!(gray.dimensions(), (2, 2));
        assert_eq!(gray.get_pixel(0, 0).0, [0]);
        assert_eq!(gray.get_pixel(1, 0).0, [4]);
        assert_eq!(gray.get_pixel(0, 1).0, [8]);
        assert_eq!(gray.get_pixel(1, 1).0, [12]);
    }

    #[test]
    fn single_row_raster_is_widened_to_a_plane() {
        let raster = Array::from_shape_vec(IxDyn(&[4]), vec![9u8, 9, 9, 9]).expect("shape");
        let plane = squeeze_to_plane(&raster);
        assert_eq!(plane.shape(), &[1, 4]);
    }
}
