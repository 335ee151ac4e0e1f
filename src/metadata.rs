use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use dicom::dictionary_std::tags;
use dicom::object::{open_file, DefaultDicomObject};

use crate::dicom_access::ElementAccess;
use crate::models::{StudySummary, TechnicalSummary};

/// Display stand-in for absent attributes.
pub const PLACEHOLDER: &str = "—";

pub fn study_summary<T: ElementAccess>(obj: &T) -> StudySummary {
    let study_datetime = format_study_datetime(
        obj.element_str(tags::STUDY_DATE).as_deref(),
        obj.element_str(tags::STUDY_TIME).as_deref(),
    );

    StudySummary {
        patient_name: obj.element_str(tags::PATIENT_NAME),
        patient_id: obj.element_str(tags::PATIENT_ID),
        patient_age: obj.element_str(tags::PATIENT_AGE),
        patient_sex: obj.element_str(tags::PATIENT_SEX),
        study_datetime,
        modality: obj.element_str(tags::MODALITY),
        institution: obj.element_str(tags::INSTITUTION_NAME),
    }
}

pub fn technical_summary<T: ElementAccess>(obj: &T) -> TechnicalSummary {
    TechnicalSummary {
        rows: obj.element_u16(tags::ROWS),
        columns: obj.element_u16(tags::COLUMNS),
        bits_allocated: obj.element_u16(tags::BITS_ALLOCATED),
        bits_stored: obj.element_u16(tags::BITS_STORED),
        samples_per_pixel: obj.element_u16(tags::SAMPLES_PER_PIXEL),
        photometric_interpretation: obj.element_str(tags::PHOTOMETRIC_INTERPRETATION),
        pixel_spacing: obj.element_str(tags::PIXEL_SPACING),
        transfer_syntax: obj.transfer_syntax(),
    }
}

/// Ordered label/value pairs for the identifier panel; absent attributes
/// show the placeholder.
pub fn identifier_listing<T: ElementAccess>(obj: &T) -> Vec<(String, String)> {
    let entries = [
        ("Study Description", tags::STUDY_DESCRIPTION),
        ("Series Description", tags::SERIES_DESCRIPTION),
        ("Manufacturer", tags::MANUFACTURER),
        ("Institution Name", tags::INSTITUTION_NAME),
        ("Protocol Name", tags::PROTOCOL_NAME),
        ("Study Instance UID", tags::STUDY_INSTANCE_UID),
        ("Series Instance UID", tags::SERIES_INSTANCE_UID),
        ("SOP Instance UID", tags::SOP_INSTANCE_UID),
    ];

    entries
        .into_iter()
        .map(|(label, tag)| {
            let value = obj
                .element_str(tag)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| PLACEHOLDER.to_string());
            (label.to_string(), value)
        })
        .collect()
}

/// Combine StudyDate and StudyTime into one display string. `None` only
/// when the date is absent.
pub fn format_study_datetime(date: Option<&str>, time: Option<&str>) -> Option<String> {
    let date = format_da(date?);
    match time {
        Some(time) => Some(format!("{} {}", date, format_tm(time))),
        None => Some(date),
    }
}

/// DICOM DA value (`YYYYMMDD`) as `YYYY-MM-DD`. Unparseable input passes
/// through unchanged.
pub fn format_da(raw: &str) -> String {
    NaiveDate::parse_from_str(raw.trim(), "%Y%m%d")
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// DICOM TM value (`HHMMSS[.frac]`, `HHMM` accepted) as `HH:MM:SS`.
/// Unparseable input passes through unchanged.
pub fn format_tm(raw: &str) -> String {
    let trimmed = raw.trim();
    let base = match trimmed.split_once('.') {
        Some((base, _fraction)) => base,
        None => trimmed,
    };
    NaiveTime::parse_from_str(base, "%H%M%S")
        .or_else(|_| NaiveTime::parse_from_str(base, "%H%M"))
        .map(|time| time.format("%H:%M:%S").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

pub fn read_summaries(path: &Path) -> Result<(StudySummary, TechnicalSummary)> {
    let obj: DefaultDicomObject = open_file(path).context("Falha ao abrir arquivo DICOM")?;
    Ok((study_summary(&obj), technical_summary(&obj)))
}

pub fn print_info(path: &Path, verbose: bool) -> Result<()> {
    let obj: DefaultDicomObject = open_file(path).context("Falha ao abrir arquivo DICOM")?;
    let study = study_summary(&obj);
    let technical = technical_summary(&obj);

    let text = |value: &Option<String>| -> String {
        value.clone().unwrap_or_else(|| PLACEHOLDER.to_string())
    };
    let num = |value: Option<u16>| -> String {
        value
            .map(|v| v.to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string())
    };

    println!("{}", "=".repeat(80));
    println!("DICOM File Information: {:?}", path.file_name().unwrap());
    println!("{}", "=".repeat(80));

    println!("PATIENT");
    println!("  Name: {}", text(&study.patient_name));
    println!("  ID:   {}", text(&study.patient_id));
    println!("  Age:  {}", text(&study.patient_age));
    println!("  Sex:  {}", text(&study.patient_sex));

    println!("\nSTUDY");
    println!("  Date/Time:   {}", text(&study.study_datetime));
    println!("  Modality:    {}", text(&study.modality));
    println!("  Institution: {}", text(&study.institution));

    println!("\nIMAGE");
    println!(
        "  Size: {} x {}",
        num(technical.rows),
        num(technical.columns)
    );
    println!(
        "  Bits: {} allocated / {} stored",
        num(technical.bits_allocated),
        num(technical.bits_stored)
    );
    println!(
        "  Samples per Pixel: {}",
        num(technical.samples_per_pixel)
    );
    println!(
        "  Photometric: {}",
        text(&technical.photometric_interpretation)
    );
    println!("  Pixel Spacing: {}", text(&technical.pixel_spacing));
    println!("  Transfer Syntax: {}", text(&technical.transfer_syntax));

    if verbose {
        println!("\nIDENTIFIERS");
        for (label, value) in identifier_listing(&obj) {
            println!("  {}: {}", label, value);
        }
    }

    Ok(())
}
