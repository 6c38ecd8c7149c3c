//! Applies single instructions to pages of a working document

use std::collections::BTreeSet;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

use crate::compose::{compose_image, compose_text};
use crate::coords::{image_anchor, text_anchor};
use crate::error::InstructionError;
use crate::images::{resolve_image_bytes, ImageSource};
use crate::instruction::EditInstruction;
use crate::metadata::page_box;
use crate::objects::{page_dictionary, page_dictionary_mut, resolve};
use crate::resources::{PageRef, ResourceRegistry};

/// Edits pages of one in-memory working document.
///
/// Holds the session's [`ResourceRegistry`] so fonts and images registered by
/// one instruction are reused by later ones.
pub struct PageEditor<'a> {
    doc: &'a mut Document,
    images: &'a dyn ImageSource,
    registry: ResourceRegistry,
    edited: BTreeSet<u32>,
}

impl<'a> PageEditor<'a> {
    pub fn new(doc: &'a mut Document, images: &'a dyn ImageSource) -> Self {
        Self {
            doc,
            images,
            registry: ResourceRegistry::new(),
            edited: BTreeSet::new(),
        }
    }

    /// Draw one instruction on top of its page's existing content
    pub fn apply_instruction(&mut self, instruction: &EditInstruction) -> Result<(), InstructionError> {
        let pages = self.doc.get_pages();
        let number = instruction.page();
        let id = *pages
            .get(&number)
            .ok_or(InstructionError::PageOutOfRange {
                page: number,
                page_count: pages.len() as u32,
            })?;
        let page = PageRef { number, id };

        let media = page_box(self.doc, id).map_err(|reason| InstructionError::MalformedPage {
            page: number,
            reason,
        })?;

        let fragment = match instruction {
            EditInstruction::Text(text) => {
                let font = self.registry.ensure_font(self.doc, page)?;
                let (x, y) = text_anchor(media.height, text.x, text.y);
                compose_text(media.x + x, media.y + y, &text.text, &font, text.font_size)
            }
            EditInstruction::Image(image) => {
                let bytes = resolve_image_bytes(&image.source, self.images)?;
                let name = self.registry.ensure_image(self.doc, page, &bytes)?;
                let (x, y) = image_anchor(media.height, image.x, image.y, image.height);
                compose_image(media.x + x, media.y + y, image.width, image.height, &name)
            }
        }
        .map_err(|reason| InstructionError::MalformedPage {
            page: number,
            reason,
        })?;

        append_content(self.doc, id, fragment).map_err(|reason| InstructionError::MalformedPage {
            page: number,
            reason,
        })?;
        self.edited.insert(number);

        debug!(
            page = number,
            kind = %instruction.kind(),
            "Applied edit instruction"
        );
        Ok(())
    }

    /// Pages touched so far, ascending
    pub fn edited_pages(&self) -> &BTreeSet<u32> {
        &self.edited
    }

    pub fn into_edited_pages(self) -> BTreeSet<u32> {
        self.edited
    }
}

/// Append a content stream after the page's existing ones.
///
/// `/Contents` may be absent, a single stream reference, an inline array or a
/// referenced array. Existing streams are never rewritten, and a referenced
/// array is copied onto the page rather than modified.
pub(crate) fn append_content(
    doc: &mut Document,
    page_id: ObjectId,
    content: Vec<u8>,
) -> Result<(), String> {
    let mut streams = existing_content_refs(doc, page_id)?;
    let stream_id = doc.add_object(Stream::new(Dictionary::new(), content));
    streams.push(Object::Reference(stream_id));

    let contents = if streams.len() == 1 {
        Object::Reference(stream_id)
    } else {
        Object::Array(streams)
    };
    page_dictionary_mut(doc, page_id)?.set("Contents", contents);
    Ok(())
}

fn existing_content_refs(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>, String> {
    let contents = match page_dictionary(doc, page_id)?.get(b"Contents") {
        Ok(contents) => contents,
        Err(_) => return Ok(Vec::new()),
    };

    match contents {
        Object::Reference(id) => match resolve(doc, contents)? {
            Object::Stream(_) => Ok(vec![Object::Reference(*id)]),
            Object::Array(items) => Ok(items.clone()),
            _ => Err("/Contents reference is neither a stream nor an array".to_string()),
        },
        Object::Array(items) => Ok(items.clone()),
        _ => Err("/Contents is neither a stream reference nor an array".to_string()),
    }
}
