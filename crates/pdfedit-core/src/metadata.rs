//! Document validation and page metadata extraction

use lopdf::{Document, ObjectId};
use shared_types::Page;

use crate::error::EditError;
use crate::objects::{as_number, inherited_attribute, resolve};

const PDF_MAGIC: &[u8] = b"%PDF";
const MIN_PDF_LEN: usize = 8;

/// US Letter, used when no MediaBox is present anywhere in the page tree
pub const DEFAULT_MEDIA_BOX: PageBox = PageBox {
    x: 0.0,
    y: 0.0,
    width: 612.0,
    height: 792.0,
};

/// A page's MediaBox as lower-left corner plus size, in PDF points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Parse PDF bytes, rejecting anything that is not an unencrypted PDF
pub fn load_pdf(bytes: &[u8]) -> Result<Document, EditError> {
    if bytes.len() < MIN_PDF_LEN {
        return Err(EditError::InvalidPdf("file is too small".into()));
    }
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(EditError::InvalidPdf("missing %PDF header".into()));
    }

    let doc = Document::load_mem(bytes).map_err(|e| EditError::InvalidPdf(e.to_string()))?;
    if doc.trailer.has(b"Encrypt") {
        return Err(EditError::InvalidPdf(
            "encrypted documents are not supported".into(),
        ));
    }
    Ok(doc)
}

/// Check that bytes are a PDF the engine can open
pub fn validate_pdf(bytes: &[u8]) -> Result<(), EditError> {
    load_pdf(bytes).map(|_| ())
}

/// Page numbers and sizes of every page, in page-tree order
pub fn extract_pages(doc: &Document) -> Result<Vec<Page>, EditError> {
    doc.get_pages()
        .into_iter()
        .map(|(number, page_id)| {
            let media = page_box(doc, page_id)
                .map_err(|reason| EditError::Consistency { page: number, reason })?;
            Ok(Page {
                number,
                width: media.width,
                height: media.height,
            })
        })
        .collect()
}

/// Parse bytes and extract their page metadata
pub fn extract_pages_from_bytes(bytes: &[u8]) -> Result<Vec<Page>, EditError> {
    let doc = load_pdf(bytes)?;
    extract_pages(&doc)
}

/// Resolve the effective MediaBox of a page, following inheritance
pub(crate) fn page_box(doc: &Document, page_id: ObjectId) -> Result<PageBox, String> {
    let media_box = match inherited_attribute(doc, page_id, b"MediaBox")? {
        Some(object) => object,
        None => return Ok(DEFAULT_MEDIA_BOX),
    };

    let values = media_box
        .as_array()
        .map_err(|_| "MediaBox is not an array".to_string())?;
    if values.len() != 4 {
        return Err(format!("MediaBox has {} entries, expected 4", values.len()));
    }

    let mut coords = [0.0f64; 4];
    for (slot, value) in coords.iter_mut().zip(values) {
        *slot = resolve(doc, value)
            .ok()
            .and_then(as_number)
            .ok_or_else(|| "MediaBox entry is not a number".to_string())?;
    }

    // Corners may be given in any order
    let [x1, y1, x2, y2] = coords;
    let page = PageBox {
        x: x1.min(x2),
        y: y1.min(y2),
        width: (x2 - x1).abs(),
        height: (y2 - y1).abs(),
    };
    if page.width == 0.0 || page.height == 0.0 {
        return Err("MediaBox has zero area".to_string());
    }
    Ok(page)
}

/// Number of pages in a parsed document
pub fn page_count(doc: &Document) -> u32 {
    doc.get_pages().len() as u32
}
