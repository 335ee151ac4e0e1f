use dicom::dictionary_std::tags;
use dicom::object::DefaultDicomObject;
use dicom::pixeldata::PixelDecoder;
use dicom_pixeldata::PixelRepresentation;
use ndarray::{ArrayD, Axis};
use tracing::debug;

use crate::dicom_access::ElementAccess;
use crate::error::ViewerError;

/// Decode the stored pixel array and apply rescale calibration.
///
/// The samples come back as f32, shaped `[rows, cols]` for monochrome data
/// or `[rows, cols, samples]` otherwise. Only frame 0 of a multi-frame file
/// is kept. Rescale slope/intercept default to 1.0/0.0 when absent; when
/// multi-valued, the first value is used.
pub fn extract_samples(obj: &DefaultDicomObject) -> Result<ArrayD<f32>, ViewerError> {
    let decoded = obj.decode_pixel_data().map_err(ViewerError::decode)?;

    let bits_allocated = decoded.bits_allocated();
    let pixel_representation = decoded.pixel_representation();

    // Convert through the native integer type so every sample is exact in
    // f32 before any arithmetic happens.
    let raw: ArrayD<f32> = if pixel_representation == PixelRepresentation::Unsigned {
        if bits_allocated <= 8 {
            decoded
                .to_ndarray::<u8>()
                .map_err(ViewerError::decode)?
                .mapv(|v| v as f32)
                .into_dyn()
        } else if bits_allocated <= 16 {
            decoded
                .to_ndarray::<u16>()
                .map_err(ViewerError::decode)?
                .mapv(|v| v as f32)
                .into_dyn()
        } else {
            decoded
                .to_ndarray::<u32>()
                .map_err(ViewerError::decode)?
                .mapv(|v| v as f32)
                .into_dyn()
        }
    } else if bits_allocated <= 8 {
        decoded
            .to_ndarray::<i8>()
            .map_err(ViewerError::decode)?
            .mapv(|v| v as f32)
            .into_dyn()
    } else if bits_allocated <= 16 {
        decoded
            .to_ndarray::<i16>()
            .map_err(ViewerError::decode)?
            .mapv(|v| v as f32)
            .into_dyn()
    } else {
        decoded
            .to_ndarray::<i32>()
            .map_err(ViewerError::decode)?
            .mapv(|v| v as f32)
            .into_dyn()
    };

    // Decoded arrays are shaped [frames, rows, cols, samples]. This viewer
    // shows a single slice, so keep frame 0 and drop a trailing
    // single-sample axis.
    let mut samples = raw;
    if samples.ndim() == 4 {
        samples = samples.index_axis_move(Axis(0), 0);
    }
    if samples.ndim() == 3 && samples.shape()[2] == 1 {
        samples = samples.index_axis_move(Axis(2), 0);
    }

    let slope = obj.element_f32(tags::RESCALE_SLOPE).unwrap_or(1.0);
    let intercept = obj.element_f32(tags::RESCALE_INTERCEPT).unwrap_or(0.0);
    if slope == 1.0 && intercept == 0.0 {
        debug!("no rescale attributes, using identity calibration");
    }
    samples.mapv_inplace(|v| v * slope + intercept);

    Ok(samples)
}
