//! Output assembly
//!
//! The working copy already holds every page in its original order. Rebuilding
//! checks that pages outside the edited set still draw exactly what the source
//! drew, serializes the result and parses it back before handing it out.

use std::collections::BTreeSet;

use lopdf::Document;

use crate::error::EditError;

/// Serialize the edited working copy into the new version's bytes
pub fn rebuild(
    source: &Document,
    working: &mut Document,
    edited_pages: &BTreeSet<u32>,
) -> Result<Vec<u8>, EditError> {
    let source_pages = source.get_pages();
    let working_pages = working.get_pages();
    let expected = source_pages.len() as u32;
    if working_pages.len() as u32 != expected {
        return Err(EditError::PageCountMismatch {
            expected,
            actual: working_pages.len() as u32,
        });
    }

    for page in 1..=expected {
        let working_id = *working_pages.get(&page).ok_or_else(|| EditError::Consistency {
            page,
            reason: "missing from the working copy".to_string(),
        })?;
        let content = working
            .get_page_content(working_id)
            .map_err(|e| EditError::Consistency {
                page,
                reason: format!("content is unreadable: {}", e),
            })?;

        if edited_pages.contains(&page) {
            continue;
        }

        let source_id = *source_pages.get(&page).ok_or_else(|| EditError::Consistency {
            page,
            reason: "missing from the source".to_string(),
        })?;
        let original = source
            .get_page_content(source_id)
            .map_err(|e| EditError::Consistency {
                page,
                reason: format!("source content is unreadable: {}", e),
            })?;
        if content != original {
            return Err(EditError::Consistency {
                page,
                reason: "content of an unedited page changed".to_string(),
            });
        }
    }

    let mut output = Vec::new();
    working
        .save_to(&mut output)
        .map_err(|e| EditError::Serialization(e.to_string()))?;

    let reparsed =
        Document::load_mem(&output).map_err(|e| EditError::Serialization(e.to_string()))?;
    let actual = reparsed.get_pages().len() as u32;
    if actual != expected {
        return Err(EditError::PageCountMismatch { expected, actual });
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::blank_pdf;
    use crate::page_editor::append_content;
    use lopdf::Object;

    #[test]
    fn test_untouched_copy_rebuilds() {
        let source = Document::load_mem(&blank_pdf(3)).unwrap();
        let mut working = source.clone();
        let bytes = rebuild(&source, &mut working, &BTreeSet::new()).unwrap();
        assert_eq!(Document::load_mem(&bytes).unwrap().get_pages().len(), 3);
    }

    #[test]
    fn test_edited_page_may_change() {
        let source = Document::load_mem(&blank_pdf(2)).unwrap();
        let mut working = source.clone();
        let page1 = working.get_pages()[&1];
        append_content(&mut working, page1, b"q Q".to_vec()).unwrap();

        let bytes = rebuild(&source, &mut working, &BTreeSet::from([1])).unwrap();
        let output = Document::load_mem(&bytes).unwrap();
        let content = output.get_page_content(output.get_pages()[&1]).unwrap();
        assert!(content.ends_with(b"q Q"));
    }

    #[test]
    fn test_changed_unedited_page_aborts() {
        let source = Document::load_mem(&blank_pdf(2)).unwrap();
        let mut working = source.clone();
        let page2 = working.get_pages()[&2];
        append_content(&mut working, page2, b"0 0 m 10 10 l S".to_vec()).unwrap();

        let err = rebuild(&source, &mut working, &BTreeSet::from([1])).unwrap_err();
        match err {
            EditError::Consistency { page, .. } => assert_eq!(page, 2),
            other => panic!("expected consistency error, got {:?}", other),
        }
    }

    #[test]
    fn test_dropped_page_aborts() {
        let source = Document::load_mem(&blank_pdf(3)).unwrap();
        let mut working = source.clone();
        working.delete_pages(&[3]);

        let err = rebuild(&source, &mut working, &BTreeSet::new()).unwrap_err();
        assert!(matches!(
            err,
            EditError::PageCountMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_broken_content_reference_on_unedited_page_aborts() {
        let source = Document::load_mem(&blank_pdf(2)).unwrap();
        let mut working = source.clone();
        let page2 = working.get_pages()[&2];
        working
            .get_object_mut(page2)
            .and_then(Object::as_dict_mut)
            .unwrap()
            .set("Contents", Object::Reference((9999, 0)));

        let err = rebuild(&source, &mut working, &BTreeSet::new()).unwrap_err();
        assert!(matches!(err, EditError::Consistency { page: 2, .. }));
    }
}
