//! Edit instructions
//!
//! Clients send [`EditInstructionRequest`]s with a string `type` tag. Each one
//! is turned into a typed [`EditInstruction`] at its turn in the pipeline, so
//! unknown or reserved tags are rejected with the instruction's position.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{EditError, InstructionError};

/// Font size used when a text instruction does not specify one
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Closed set of instruction tags understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionKind {
    Text,
    Image,
    /// Reserved for freehand drawing; always rejected
    Drawing,
}

impl InstructionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstructionKind::Text => "text",
            InstructionKind::Image => "image",
            InstructionKind::Drawing => "drawing",
        }
    }
}

impl std::fmt::Display for InstructionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstructionKind {
    type Err = InstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(InstructionKind::Text),
            "image" => Ok(InstructionKind::Image),
            "drawing" => Ok(InstructionKind::Drawing),
            other => Err(InstructionError::UnknownType(other.to_string())),
        }
    }
}

/// Wire form of one edit instruction.
///
/// Coordinates are client space: origin top-left, y grows downward, in PDF points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditInstructionRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Literal text for `text`, image reference for `image`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Text drawn with its baseline starting at the anchor
#[derive(Debug, Clone, PartialEq)]
pub struct TextPlacement {
    pub page: u32,
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub font_size: f64,
}

/// Image scaled into a box whose top-left corner is the anchor
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    pub page: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub source: String,
}

/// A validated instruction, ready to be applied to a page
#[derive(Debug, Clone, PartialEq)]
pub enum EditInstruction {
    Text(TextPlacement),
    Image(ImagePlacement),
}

impl EditInstruction {
    pub fn page(&self) -> u32 {
        match self {
            EditInstruction::Text(t) => t.page,
            EditInstruction::Image(i) => i.page,
        }
    }

    pub fn kind(&self) -> InstructionKind {
        match self {
            EditInstruction::Text(_) => InstructionKind::Text,
            EditInstruction::Image(_) => InstructionKind::Image,
        }
    }
}

impl EditInstructionRequest {
    /// A text instruction with the default font size
    pub fn text(page: i64, x: f64, y: f64, content: impl Into<String>) -> Self {
        Self {
            kind: InstructionKind::Text.as_str().to_string(),
            page,
            x,
            y,
            width: None,
            height: None,
            content: Some(content.into()),
            font_size: None,
            metadata: None,
        }
    }

    pub fn image(
        page: i64,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        source: impl Into<String>,
    ) -> Self {
        Self {
            kind: InstructionKind::Image.as_str().to_string(),
            page,
            x,
            y,
            width: Some(width),
            height: Some(height),
            content: Some(source.into()),
            font_size: None,
            metadata: None,
        }
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = Some(font_size);
        self
    }

    /// Check the instruction's shape and convert it to its typed form.
    ///
    /// The page's upper bound is not checked here; it depends on the working
    /// document at the time the instruction is applied.
    pub fn validate(&self) -> Result<EditInstruction, InstructionError> {
        let kind: InstructionKind = self.kind.parse()?;
        if kind == InstructionKind::Drawing {
            return Err(InstructionError::Unsupported(kind));
        }

        let page = u32::try_from(self.page)
            .ok()
            .filter(|p| *p >= 1)
            .ok_or(InstructionError::InvalidPage(self.page))?;

        if !self.x.is_finite() {
            return Err(InstructionError::NonFiniteCoordinate("x"));
        }
        if !self.y.is_finite() {
            return Err(InstructionError::NonFiniteCoordinate("y"));
        }

        let content = self.content.as_deref().unwrap_or("");

        match kind {
            InstructionKind::Text => {
                if content.is_empty() {
                    return Err(InstructionError::EmptyText);
                }
                let font_size = match self.font_size {
                    None => DEFAULT_FONT_SIZE,
                    Some(size) if size.is_finite() && size > 0.0 => size,
                    Some(size) => return Err(InstructionError::NonPositiveFontSize(size)),
                };
                Ok(EditInstruction::Text(TextPlacement {
                    page,
                    x: self.x,
                    y: self.y,
                    text: content.to_string(),
                    font_size,
                }))
            }
            InstructionKind::Image => {
                if content.is_empty() {
                    return Err(InstructionError::EmptyImageSource);
                }
                let width = positive_dimension(self.width, "width")?;
                let height = positive_dimension(self.height, "height")?;
                Ok(EditInstruction::Image(ImagePlacement {
                    page,
                    x: self.x,
                    y: self.y,
                    width,
                    height,
                    source: content.to_string(),
                }))
            }
            InstructionKind::Drawing => Err(InstructionError::Unsupported(kind)),
        }
    }
}

/// Decode a batch of JSON instructions in order.
///
/// The first value that does not fit the instruction shape is reported with
/// its 1-based position, unless an earlier instruction already fails its own
/// shape check.
pub fn decode_instructions(
    values: Vec<serde_json::Value>,
) -> Result<Vec<EditInstructionRequest>, EditError> {
    let mut decoded = Vec::with_capacity(values.len());
    for (i, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<EditInstructionRequest>(value) {
            Ok(request) => decoded.push(request),
            Err(e) => {
                for (j, earlier) in decoded.iter().enumerate() {
                    earlier
                        .validate()
                        .map_err(|source| EditError::Instruction { index: j + 1, source })?;
                }
                return Err(EditError::Instruction {
                    index: i + 1,
                    source: InstructionError::Malformed(e.to_string()),
                });
            }
        }
    }
    Ok(decoded)
}

fn positive_dimension(value: Option<f64>, name: &'static str) -> Result<f64, InstructionError> {
    match value {
        None => Err(InstructionError::MissingDimension(name)),
        Some(v) if v.is_finite() && v > 0.0 => Ok(v),
        Some(_) => Err(InstructionError::NonPositiveDimension(name)),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn positive_font_sizes_are_kept(size in 0.01f64..500.0) {
            let instruction = EditInstructionRequest::text(1, 0.0, 0.0, "x")
                .with_font_size(size)
                .validate()
                .unwrap();
            match instruction {
                EditInstruction::Text(t) => prop_assert_eq!(t.font_size, size),
                _ => prop_assert!(false, "expected text"),
            }
        }

        #[test]
        fn unknown_tags_never_validate(tag in "[a-z]{1,12}") {
            prop_assume!(tag != "text" && tag != "image" && tag != "drawing");
            let mut req = EditInstructionRequest::text(1, 0.0, 0.0, "x");
            req.kind = tag.clone();
            prop_assert_eq!(req.validate(), Err(InstructionError::UnknownType(tag)));
        }

        #[test]
        fn validated_page_matches_request(page in 1i64..10_000) {
            let instruction = EditInstructionRequest::image(page, 1.0, 2.0, 3.0, 4.0, "a.png")
                .validate()
                .unwrap();
            prop_assert_eq!(instruction.page() as i64, page);
        }
    }
}
