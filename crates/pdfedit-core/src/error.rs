use thiserror::Error;

use crate::instruction::InstructionKind;

/// Coarse classification of failures, used by callers to pick a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Resource,
    NotFound,
    Conflict,
    Consistency,
    Internal,
}

/// Why a single instruction could not be applied
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InstructionError {
    #[error("malformed instruction: {0}")]
    Malformed(String),

    #[error("unknown instruction type '{0}'")]
    UnknownType(String),

    #[error("instruction type '{0}' is not implemented")]
    Unsupported(InstructionKind),

    #[error("text content must not be empty")]
    EmptyText,

    #[error("image source must not be empty")]
    EmptyImageSource,

    #[error("image {0} is required")]
    MissingDimension(&'static str),

    #[error("image {0} must be greater than zero")]
    NonPositiveDimension(&'static str),

    #[error("font size must be greater than zero, got {0}")]
    NonPositiveFontSize(f64),

    #[error("coordinate {0} must be a finite number")]
    NonFiniteCoordinate(&'static str),

    #[error("page must be >= 1, got {0}")]
    InvalidPage(i64),

    #[error("page {page}, document has {page_count} pages")]
    PageOutOfRange { page: u32, page_count: u32 },

    #[error("image source '{reference}' is unavailable: {reason}")]
    ImageUnavailable { reference: String, reason: String },

    #[error("image could not be decoded: {0}")]
    ImageDecode(String),

    #[error("page {page} has a malformed structure: {reason}")]
    MalformedPage { page: u32, reason: String },
}

impl InstructionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InstructionError::ImageUnavailable { .. } => ErrorKind::Resource,
            InstructionError::MalformedPage { .. } => ErrorKind::Consistency,
            _ => ErrorKind::Validation,
        }
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    #[error("At least one edit instruction is required")]
    NoInstructions,

    #[error("Instruction {index}: {source}")]
    Instruction {
        /// 1-based position in the submitted list
        index: usize,
        #[source]
        source: InstructionError,
    },

    #[error("Page {page} could not be copied: {reason}")]
    Consistency { page: u32, reason: String },

    #[error("Output has {actual} pages, expected {expected}")]
    PageCountMismatch { expected: u32, actual: u32 },

    #[error("Failed to serialize PDF: {0}")]
    Serialization(String),
}

impl EditError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EditError::InvalidPdf(_) | EditError::NoInstructions => ErrorKind::Validation,
            EditError::Instruction { source, .. } => source.kind(),
            EditError::Consistency { .. } | EditError::PageCountMismatch { .. } => {
                ErrorKind::Consistency
            }
            EditError::Serialization(_) => ErrorKind::Resource,
        }
    }

    /// 1-based index of the offending instruction, if the failure is tied to one
    pub fn instruction_index(&self) -> Option<usize> {
        match self {
            EditError::Instruction { index, .. } => Some(*index),
            _ => None,
        }
    }
}
