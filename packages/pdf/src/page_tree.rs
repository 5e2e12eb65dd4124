//! Page tree lookups shared by the backend and the renderer

use std::collections::HashSet;

use folio_editor::Rotation;
use lopdf::{Document, Object, ObjectId};

use crate::PdfError;

/// Page attributes a page may inherit from its `/Pages` ancestors
pub(crate) const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

const BOX_KEYS: [&[u8]; 2] = [b"CropBox", b"MediaBox"];

/// Look `key` up on the page, then on each ancestor via `/Parent`.
pub(crate) fn resolve_inherited<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, PdfError> {
    let mut current = page_id;
    let mut visited = HashSet::new();

    while visited.insert(current) {
        let dict = doc.get_object(current)?.as_dict()?;
        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }
        match dict.get(b"Parent") {
            Ok(parent) => current = parent.as_reference()?,
            Err(_) => return Ok(None),
        }
    }

    tracing::warn!(?page_id, "Cycle in page tree while resolving inherited attribute");
    Ok(None)
}

/// Follow a single indirect reference.
pub(crate) fn deref<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Object, PdfError> {
    match obj {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

/// Whether `id` is a `/Page` or `/Pages` node
pub(crate) fn is_page_tree_node(doc: &Document, id: ObjectId) -> bool {
    doc.get_object(id)
        .and_then(|obj| obj.as_dict())
        .and_then(|dict| dict.get(b"Type"))
        .and_then(|ty| ty.as_name())
        .is_ok_and(|name| matches!(name, b"Page" | b"Pages"))
}

/// Rotation from a `/Rotate` value; missing means upright.
pub(crate) fn rotation_of(doc: &Document, value: Option<&Object>) -> Result<Rotation, PdfError> {
    let degrees = match value {
        Some(obj) => deref(doc, obj)?.as_i64()?,
        None => 0,
    };
    Rotation::from_degrees(degrees).map_err(|e| PdfError::InvalidRotation(e.0))
}

/// Visible page box `[x0, y0, x1, y1]`, preferring `/CropBox` over `/MediaBox`.
pub(crate) fn page_box(doc: &Document, page_id: ObjectId) -> Result<Option<[f32; 4]>, PdfError> {
    for key in BOX_KEYS {
        let Some(value) = resolve_inherited(doc, page_id, key)? else {
            continue;
        };
        let coords = deref(doc, value)?
            .as_array()?
            .iter()
            .map(|n| -> Result<f32, PdfError> { Ok(deref(doc, n)?.as_float()?) })
            .collect::<Result<Vec<f32>, PdfError>>()?;

        if let [x0, y0, x1, y1] = coords[..] {
            return Ok(Some([x0, y0, x1, y1]));
        }
    }
    Ok(None)
}
