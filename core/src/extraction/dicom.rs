use crate::error::Result;
use crate::types::{ImageAsset, Metadata};
use dicom_core::Tag;
use dicom_object::InMemDicomObject;
use log::debug;
use serde_json::Value;

use super::side::parse_side_string;
use super::view::view_from_text;

pub const VIEW_POSITION: Tag = Tag(0x0018, 0x5101);
pub const BODY_PART_EXAMINED: Tag = Tag(0x0018, 0x0015);
pub const LATERALITY: Tag = Tag(0x0020, 0x0060);
pub const IMAGE_LATERALITY: Tag = Tag(0x0020, 0x0062);
pub const FRAME_LATERALITY: Tag = Tag(0x0020, 0x9072);
pub const FRAME_ANATOMY_SEQUENCE: Tag = Tag(0x0020, 0x9071);
pub const SHARED_FUNCTIONAL_GROUPS_SEQUENCE: Tag = Tag(0x5200, 0x9229);

const PREAMBLE_LEN: usize = 128;
const MAGIC: &[u8; 4] = b"DICM";

/// Checks for the DICOM Part-10 header
///
/// DICOM files carry a 128-byte preamble followed by the 4-byte "DICM"
/// magic string.
pub fn is_dicom_bytes(bytes: &[u8]) -> bool {
    bytes.len() >= PREAMBLE_LEN + MAGIC.len()
        && &bytes[PREAMBLE_LEN..PREAMBLE_LEN + MAGIC.len()] == MAGIC
}

/// Reads view/side/body-part hints from DICOM bytes
///
/// Returns `Ok(None)` for non-DICOM input.
pub fn dicom_hints(bytes: &[u8]) -> Result<Option<Metadata>> {
    if !is_dicom_bytes(bytes) {
        return Ok(None);
    }
    let obj = dicom_object::from_reader(&bytes[PREAMBLE_LEN..])?;
    Ok(Some(hints_from_object(&obj)))
}

/// Maps DICOM tags onto the metadata keys the pipeline understands
pub fn hints_from_object(dcm: &InMemDicomObject) -> Metadata {
    let mut hints = Metadata::new();

    if let Some(vp) = get_string_value(dcm, VIEW_POSITION) {
        // LL/RL are the DICOM codes for left/right lateral projections
        let view = match vp.to_uppercase().as_str() {
            "LL" | "RL" => Some(crate::types::ViewCode::Lateral),
            _ => view_from_text(&vp),
        };
        if let Some(view) = view {
            hints.insert("view".to_string(), Value::from(view.simple_name()));
        }
    }

    let side = extract_laterality(dcm);
    if !side.is_unknown() {
        hints.insert("side".to_string(), Value::from(side.simple_name()));
    }

    if let Some(part) = get_string_value(dcm, BODY_PART_EXAMINED).filter(|s| !s.is_empty()) {
        hints.insert("bodyPart".to_string(), Value::from(part));
    }

    hints
}

/// Fills in DICOM-derived metadata that the client did not supply
///
/// Explicit client metadata always wins. Unreadable DICOM is logged and
/// the asset returned unchanged.
pub fn enrich_with_dicom_hints(mut asset: ImageAsset) -> ImageAsset {
    match dicom_hints(&asset.bytes) {
        Ok(Some(hints)) => {
            debug!("DICOM hints for {}: {:?}", asset.name, hints);
            for (key, value) in hints {
                asset.metadata.entry(key).or_insert(value);
            }
        }
        Ok(None) => {}
        Err(e) => debug!("Ignoring unreadable DICOM header on {}: {}", asset.name, e),
    }
    asset
}

/// ImageLaterality → Laterality → SharedFunctionalGroupsSequence FrameLaterality
fn extract_laterality(dcm: &InMemDicomObject) -> crate::types::Side {
    [IMAGE_LATERALITY, LATERALITY]
        .into_iter()
        .filter_map(|tag| get_string_value(dcm, tag))
        .chain(extract_frame_laterality(dcm))
        .map(|s| parse_side_string(&s))
        .find(|side| !side.is_unknown())
        .unwrap_or_default()
}

/// SharedFunctionalGroupsSequence[0] → FrameAnatomySequence[0] → FrameLaterality
fn extract_frame_laterality(dcm: &InMemDicomObject) -> Option<String> {
    dcm.element(SHARED_FUNCTIONAL_GROUPS_SEQUENCE)
        .ok()
        .and_then(|shared_seq| shared_seq.items())
        .and_then(|items| items.first())
        .and_then(|first_item| first_item.element(FRAME_ANATOMY_SEQUENCE).ok())
        .and_then(|frame_anatomy_seq| frame_anatomy_seq.items())
        .and_then(|items| items.first())
        .and_then(|first_item| get_string_value(first_item, FRAME_LATERALITY))
}

/// Helper to get string value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to string
pub fn get_string_value(dcm: &InMemDicomObject, tag: Tag) -> Option<String> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_str().ok())
        .map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Side, ViewCode};
    use dicom_core::value::{DataSetSequence, PrimitiveValue};
    use dicom_core::{DataElement, VR};

    fn dicom_with(elements: Vec<(Tag, &str)>) -> InMemDicomObject {
        InMemDicomObject::from_element_iter(
            elements
                .into_iter()
                .map(|(tag, v)| DataElement::new(tag, VR::CS, PrimitiveValue::from(v))),
        )
    }

    #[test]
    fn test_is_dicom_bytes() {
        let mut bytes = vec![0u8; 128];
        bytes.extend_from_slice(b"DICM");
        assert!(is_dicom_bytes(&bytes));
        assert!(!is_dicom_bytes(b"\x89PNG\r\n\x1a\n"));
        assert!(!is_dicom_bytes(&[0u8; 200]));
    }

    #[test]
    fn test_dicom_hints_non_dicom_is_none() {
        assert!(dicom_hints(b"not a dicom file").unwrap().is_none());
    }

    #[test]
    fn test_dicom_hints_corrupt_header_is_error() {
        let mut bytes = vec![0u8; 128];
        bytes.extend_from_slice(b"DICM");
        bytes.extend_from_slice(b"garbage");
        assert!(dicom_hints(&bytes).is_err());
    }

    #[test]
    fn test_hints_from_object() {
        let dcm = dicom_with(vec![
            (VIEW_POSITION, "LL"),
            (IMAGE_LATERALITY, "R"),
            (BODY_PART_EXAMINED, "HAND"),
        ]);
        let hints = hints_from_object(&dcm);
        assert_eq!(hints["view"], ViewCode::Lateral.simple_name());
        assert_eq!(hints["side"], Side::Right.simple_name());
        assert_eq!(hints["bodyPart"], "HAND");
    }

    #[test]
    fn test_laterality_priority() {
        let dcm = dicom_with(vec![(IMAGE_LATERALITY, "L"), (LATERALITY, "R")]);
        assert_eq!(extract_laterality(&dcm), Side::Left);
    }

    #[test]
    fn test_laterality_falls_back_to_frame_laterality() {
        let frame_anatomy_item = dicom_with(vec![(FRAME_LATERALITY, "R")]);
        let frame_anatomy_seq = DataElement::new(
            FRAME_ANATOMY_SEQUENCE,
            VR::SQ,
            DataSetSequence::from(vec![frame_anatomy_item]),
        );
        let shared_groups_item = InMemDicomObject::from_element_iter([frame_anatomy_seq]);
        let shared_groups_seq = DataElement::new(
            SHARED_FUNCTIONAL_GROUPS_SEQUENCE,
            VR::SQ,
            DataSetSequence::from(vec![shared_groups_item]),
        );

        let mut dcm = InMemDicomObject::new_empty();
        dcm.put(shared_groups_seq);

        assert_eq!(extract_laterality(&dcm), Side::Right);
    }

    #[test]
    fn test_enrich_keeps_client_metadata_for_non_dicom() {
        let asset = ImageAsset::new("a.png", b"png".to_vec(), "image/png");
        let enriched = enrich_with_dicom_hints(asset.clone());
        assert_eq!(enriched, asset);
    }
}
