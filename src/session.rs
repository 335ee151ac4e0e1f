//
// session.rs
// Dicom-Viewer-rs
//
// Caches the decoded study for a viewing session, keyed by a content fingerprint of the file bytes.
//
// Thales Matheus Mendonça Santos - February 2026

use dicom::object::{file::ReadPreamble, DefaultDicomObject, OpenFileOptions};
use ndarray::ArrayD;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::ViewerError;
use crate::pixels;

/// A parsed study held for the duration of a viewing session.
pub struct LoadedStudy {
    pub fingerprint: String,
    pub object: DefaultDicomObject,
    pub samples: ArrayD<f32>,
}

/// Single-slot cache: reloading the same bytes reuses the decoded study
/// instead of parsing and decoding again.
#[derive(Default)]
pub struct SessionCache {
    current: Option<LoadedStudy>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and decode `bytes`, or return the cached study when the
    /// fingerprint matches the one already loaded.
    pub fn load(&mut self, bytes: &[u8]) -> Result<&LoadedStudy, ViewerError> {
        let fingerprint = fingerprint(bytes);
        let hit = self
            .current
            .as_ref()
            .is_some_and(|study| study.fingerprint == fingerprint);
        if hit {
            debug!(%fingerprint, "session cache hit");
        } else {
            let object = read_object(bytes)?;
            let samples = pixels::extract_samples(&object)?;
            debug!(%fingerprint, shape = ?samples.shape(), "study decoded into session cache");
            self.current = Some(LoadedStudy {
                fingerprint,
                object,
                samples,
            });
        }
        Ok(self.current.as_ref().expect("study cached above"))
    }

    pub fn current(&self) -> Option<&LoadedStudy> {
        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

/// Hex SHA-256 of the raw file bytes.
pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Parse a DICOM object from an in-memory file image.
///
/// A strict read is tried first; when it fails, the read is retried with a
/// forced 128-byte preamble, which covers whole-file buffers whose
/// preamble the strict path does not skip.
pub fn read_object(bytes: &[u8]) -> Result<DefaultDicomObject, ViewerError> {
    match dicom::object::from_reader(bytes) {
        Ok(object) => Ok(object),
        Err(_) => OpenFileOptions::new()
            .read_preamble(ReadPreamble::Always)
            .from_reader(bytes)
            .map_err(ViewerError::decode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_matches_reference_digest() {
        assert_eq!(
            fingerprint(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn fingerprint_distinguishes_different_bytes() {
        assert_ne!(fingerprint(b"abc"), fingerprint(b"abd"));
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let mut cache = SessionCache::new();
        let err = cache.load(b"not a dicom file").unwrap_err();
        assert!(matches!(err, ViewerError::Decode { .. }));
        assert!(cache.current().is_none());
    }
}
