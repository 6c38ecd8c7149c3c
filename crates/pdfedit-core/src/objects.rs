//! Small helpers for walking lopdf object graphs

use lopdf::{Dictionary, Document, Object, ObjectId};

/// Depth limit for reference chains and page-tree walks
const MAX_DEPTH: usize = 32;

/// Follow references until a direct object is reached
pub(crate) fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object, String> {
    let mut current = object;
    for _ in 0..MAX_DEPTH {
        match current {
            Object::Reference(id) => {
                current = doc
                    .get_object(*id)
                    .map_err(|e| format!("broken reference {} {} R: {}", id.0, id.1, e))?;
            }
            other => return Ok(other),
        }
    }
    Err("reference chain too deep".to_string())
}

/// Numeric value of an Integer or Real object
pub(crate) fn as_number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Look up a page attribute, walking up the `/Parent` chain for inheritable keys
pub(crate) fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, String> {
    let mut dict = page_dictionary(doc, page_id)?;
    for _ in 0..MAX_DEPTH {
        if let Ok(value) = dict.get(key) {
            return resolve(doc, value).map(Some);
        }
        let parent = match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(id) => id,
            Err(_) => return Ok(None),
        };
        dict = doc
            .get_object(parent)
            .and_then(Object::as_dict)
            .map_err(|e| format!("page tree node {} {} R: {}", parent.0, parent.1, e))?;
    }
    Err("page tree too deep".to_string())
}

pub(crate) fn page_dictionary(doc: &Document, page_id: ObjectId) -> Result<&Dictionary, String> {
    doc.get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(|e| format!("page object {} {} R: {}", page_id.0, page_id.1, e))
}

pub(crate) fn page_dictionary_mut(
    doc: &mut Document,
    page_id: ObjectId,
) -> Result<&mut Dictionary, String> {
    doc.get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| format!("page object {} {} R: {}", page_id.0, page_id.1, e))
}
