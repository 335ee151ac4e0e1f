use dicom::core::Tag;
use dicom::dictionary_std::StandardDataDictionary;
use dicom::object::{DefaultDicomObject, InMemDicomObject};

/// Small helper trait to pull typed values from different DICOM object shapes.
///
/// Every reader returns `Option`: absent or unreadable attributes are not
/// errors, the call site substitutes its documented default. Numeric reads
/// take the first value of multi-valued attributes.
pub trait ElementAccess {
    fn element_str(&self, tag: Tag) -> Option<String>;
    fn element_f32(&self, tag: Tag) -> Option<f32>;
    fn element_u16(&self, tag: Tag) -> Option<u16>;
    fn has_element(&self, tag: Tag) -> bool;
    fn transfer_syntax(&self) -> Option<String>;
}

impl ElementAccess for DefaultDicomObject {
    fn element_str(&self, tag: Tag) -> Option<String> {
        self.element(tag)
            .ok()
            .and_then(|e| e.to_str().ok())
            .map(|s| s.trim().to_string())
    }

    fn element_f32(&self, tag: Tag) -> Option<f32> {
        self.element(tag)
            .ok()
            .and_then(|e| e.to_multi_float64().ok())
            .and_then(|values| values.first().copied())
            .map(|v| v as f32)
    }

    fn element_u16(&self, tag: Tag) -> Option<u16> {
        self.element(tag).ok().and_then(|e| e.to_int::<u16>().ok())
    }

    fn has_element(&self, tag: Tag) -> bool {
        self.element(tag).is_ok()
    }

    fn transfer_syntax(&self) -> Option<String> {
        Some(self.meta().transfer_syntax().to_string())
    }
}

impl ElementAccess for InMemDicomObject<StandardDataDictionary> {
    fn element_str(&self, tag: Tag) -> Option<String> {
        self.element(tag)
            .ok()
            .and_then(|e| e.to_str().ok())
            .map(|s| s.trim().to_string())
    }

    fn element_f32(&self, tag: Tag) -> Option<f32> {
        self.element(tag)
            .ok()
            .and_then(|e| e.to_multi_float64().ok())
            .and_then(|values| values.first().copied())
            .map(|v| v as f32)
    }

    fn element_u16(&self, tag: Tag) -> Option<u16> {
        self.element(tag).ok().and_then(|e| e.to_int::<u16>().ok())
    }

    fn has_element(&self, tag: Tag) -> bool {
        self.element(tag).is_ok()
    }

    fn transfer_syntax(&self) -> Option<String> {
        None
    }
}
