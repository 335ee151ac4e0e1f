use thiserror::Error;

/// Failures of the render pipeline. Missing metadata is never an error:
/// every metadata read substitutes a documented default instead.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// The dataset could not be parsed, or its pixel data could not be decoded.
    #[error("failed to decode DICOM data")]
    Decode {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The pixel array has zero elements.
    #[error("pixel data contains no samples")]
    EmptyImage,
    /// The raster layout is neither single-channel nor RGB.
    #[error("unsupported raster shape {shape:?}")]
    UnsupportedShape { shape: Vec<usize> },
    #[error("failed to encode image")]
    Encode(#[from] image::ImageError),
}

impl ViewerError {
    pub(crate) fn decode(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ViewerError::Decode {
            source: source.into(),
        }
    }
}
