//
// export.rs
// Dicom-Viewer-rs
//
// Builds sanitized export file names stamped with the patient ID and the export time.
//
// Thales Matheus Mendonça Santos - February 2026

use chrono::{DateTime, Local};

/// Prefix of every suggested export name.
pub const EXPORT_PREFIX: &str = "dicom-viewer";

/// Suggested name for an export at the current time.
pub fn suggested_filename(patient_id: Option<&str>) -> String {
    filename_at(patient_id, Local::now())
}

/// Deterministic variant of [`suggested_filename`] for a fixed timestamp.
pub fn filename_at(patient_id: Option<&str>, when: DateTime<Local>) -> String {
    let id = patient_id
        .map(sanitize_component)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "anonymous".to_string());
    format!(
        "{}_{}_{}.png",
        EXPORT_PREFIX,
        id,
        when.format("%Y%m%d_%H%M%S")
    )
}

fn sanitize_component(input: &str) -> String {
    // Keep only ASCII word characters and a few safe separators to avoid filesystem surprises.
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn filename_embeds_id_and_timestamp() {
        let when = Local.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).unwrap();
        assert_eq!(
            filename_at(Some("PAT123"), when),
            "dicom-viewer_PAT123_20260203_040506.png"
        );
    }

    #[test]
    fn unsafe_characters_are_stripped_from_the_id() {
        let when = Local.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).unwrap();
        assert_eq!(
            filename_at(Some("../PAT 12^3"), when),
            "dicom-viewer_PAT123_20260203_040506.png"
        );
    }

    #[test]
    fn missing_or_empty_id_becomes_anonymous() {
        let when = Local.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).unwrap();
        assert_eq!(
            filename_at(None, when),
            "dicom-viewer_anonymous_20260203_040506.png"
        );
        assert_eq!(
            filename_at(Some(" ^ "), when),
            "dicom-viewer_anonymous_20260203_040506.png"
        );
    }
}
