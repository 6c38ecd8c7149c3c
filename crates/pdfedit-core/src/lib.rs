//! PDF edit engine
//!
//! Applies an ordered list of text and image placements to an existing PDF and
//! produces the bytes of a new document, leaving every page that was not
//! targeted exactly as it was.
//!
//! The engine works on an in-memory working copy and never touches storage:
//! - [`EditPipeline`] validates and applies instructions in order, all or nothing
//! - [`PageEditor`] appends one drawing to one page
//! - [`rebuild`] checks untouched pages and serializes the result
//! - [`coords`] converts client (top-left, y down) anchors to PDF space

pub mod compose;
pub mod coords;
pub mod error;
pub mod images;
pub mod instruction;
pub mod metadata;
mod objects;
pub mod page_editor;
pub mod pipeline;
pub mod rebuild;
pub mod resources;

#[cfg(test)]
mod fixtures;

pub use error::{EditError, ErrorKind, InstructionError};
pub use images::{ImageSource, NoImageSource};
pub use instruction::{
    decode_instructions, EditInstruction, EditInstructionRequest, InstructionKind,
    DEFAULT_FONT_SIZE,
};
pub use metadata::{extract_pages, extract_pages_from_bytes, load_pdf, validate_pdf, PageBox};
pub use page_editor::PageEditor;
pub use pipeline::{EditOutcome, EditPipeline, PipelineStage};
pub use rebuild::rebuild;
pub use resources::{ResourceRegistry, DEFAULT_FONT};

/// Parse PDF bytes and return page count
pub fn get_page_count(bytes: &[u8]) -> Result<u32, EditError> {
    let doc = load_pdf(bytes)?;
    Ok(metadata::page_count(&doc))
}
