//! Sequential application of an instruction list to one document
//!
//! The pipeline owns a private working copy. Instructions are validated and
//! applied strictly in order; the first failure aborts the whole run and the
//! working copy is dropped. Nothing is written anywhere: persisting the result
//! is the caller's job.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::error::EditError;
use crate::images::ImageSource;
use crate::instruction::EditInstructionRequest;
use crate::metadata::load_pdf;
use crate::page_editor::PageEditor;
use crate::rebuild::rebuild;

/// Where a pipeline run currently is
///
/// A run ends at `Finalizing` or `Aborted`. `Committed` is reported by the
/// caller once the edited bytes become the document's next version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Validating,
    Applying,
    Finalizing,
    Committed,
    Aborted,
}

/// Bytes of the fully edited document, ready to be committed
#[derive(Debug, Clone)]
pub struct EditOutcome {
    pub bytes: Vec<u8>,
    pub page_count: u32,
    pub edited_pages: BTreeSet<u32>,
    pub instructions_applied: usize,
}

pub struct EditPipeline<'a> {
    images: &'a dyn ImageSource,
}

impl<'a> EditPipeline<'a> {
    pub fn new(images: &'a dyn ImageSource) -> Self {
        Self { images }
    }

    /// Apply every instruction to a copy of `source_bytes`, all or nothing
    pub fn run(
        &self,
        source_bytes: &[u8],
        instructions: &[EditInstructionRequest],
    ) -> Result<EditOutcome, EditError> {
        self.execute(source_bytes, instructions).map_err(|e| {
            warn!(
                stage = ?PipelineStage::Aborted,
                instruction = e.instruction_index(),
                error = %e,
                "Edit pipeline aborted"
            );
            e
        })
    }

    fn execute(
        &self,
        source_bytes: &[u8],
        instructions: &[EditInstructionRequest],
    ) -> Result<EditOutcome, EditError> {
        debug!(stage = ?PipelineStage::Validating, instructions = instructions.len());
        if instructions.is_empty() {
            return Err(EditError::NoInstructions);
        }
        let source = load_pdf(source_bytes)?;
        let page_count = source.get_pages().len() as u32;

        debug!(stage = ?PipelineStage::Applying, page_count);
        let mut working = source.clone();
        let mut editor = PageEditor::new(&mut working, self.images);
        for (i, request) in instructions.iter().enumerate() {
            let index = i + 1;
            let instruction = request
                .validate()
                .map_err(|source| EditError::Instruction { index, source })?;
            editor
                .apply_instruction(&instruction)
                .map_err(|source| EditError::Instruction { index, source })?;
        }
        let edited_pages = editor.into_edited_pages();

        debug!(stage = ?PipelineStage::Finalizing, edited = edited_pages.len());
        let bytes = rebuild(&source, &mut working, &edited_pages)?;

        Ok(EditOutcome {
            bytes,
            page_count,
            edited_pages,
            instructions_applied: instructions.len(),
        })
    }
}
