pub mod dicom;
pub mod keywords;
pub mod side;
pub mod view;

pub use dicom::{dicom_hints, enrich_with_dicom_hints, is_dicom_bytes};
pub use side::{detect_side, parse_side_string, EXPECTED_SIDE_KEY};
pub use view::{classify, view_from_filename, view_from_text};
