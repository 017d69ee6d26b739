pub mod cascade;
pub mod names;
pub mod phone;
pub mod sections;
pub mod sports;

use tracing::info;

use crate::document::DocumentText;
pub use cascade::{ContactRecord, Extraction};

/// Run the full extraction pipeline over one document: area-code detection,
/// then the three-pass cascade with post-processing.
pub fn process_document(doc: &DocumentText) -> Extraction {
    let full_text = doc.lines.join("\n");
    let area_code = phone::detect_area_code(&full_text);
    if let Some(area) = &area_code {
        info!(source = %doc.source, area_code = %area, "detected default area code");
    }
    cascade::extract_records(&doc.lines, area_code.as_deref())
}
