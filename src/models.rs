//
// models.rs
// Dicom-Viewer-rs
//
// Defines serializable data structures for summaries, statistics, histograms, and window bounds.
//
// Thales Matheus Mendonça Santos - February 2026

use serde::{Deserialize, Serialize};

/// Aggregate statistics over calibrated samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statistics {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub std_dev: f32,
    pub p10: f32,
    pub p50: f32,
    pub p90: f32,
    pub total_pixels: usize,
    pub shape: Vec<usize>,
}

/// Histogram buckets over a rendered raster, alongside the observed range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntensityHistogram {
    pub bins: Vec<u64>,
    pub min: u8,
    pub max: u8,
}

/// Slider limits for interactive window adjustment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindowBounds {
    pub center_min: f32,
    pub center_max: f32,
    pub width_min: f32,
    pub width_max: f32,
}

/// Patient and study fields shown in the viewer's summary panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudySummary {
    pub patient_name: Option<String>,
    pub patient_id: Option<String>,
    pub patient_age: Option<String>,
    pub patient_sex: Option<String>,
    pub study_datetime: Option<String>,
    pub modality: Option<String>,
    pub institution: Option<String>,
}

/// Acquisition and encoding details for the technical panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalSummary {
    pub rows: Option<u16>,
    pub columns: Option<u16>,
    pub bits_allocated: Option<u16>,
    pub bits_stored: Option<u16>,
    pub samples_per_pixel: Option<u16>,
    pub photometric_interpretation: Option<String>,
    pub pixel_spacing: Option<String>,
    pub transfer_syntax: Option<String>,
}
