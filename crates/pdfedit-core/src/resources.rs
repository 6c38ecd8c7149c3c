//! Resource registration for one edit session
//!
//! Fonts and images are added to a page's `/Resources` lazily, the first time
//! an instruction on that page needs them, and reused after that. The page's
//! resource dictionary is always rewritten as a private inline copy, so an
//! inherited or shared dictionary is never modified in place and no other page
//! changes.

use std::collections::HashMap;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use sha2::{Digest, Sha256};

use crate::error::InstructionError;
use crate::images::{decode_image, embed_image};
use crate::objects::{inherited_attribute, page_dictionary_mut, resolve};

/// Resource name of the default text font
pub const DEFAULT_FONT: &str = "FHelv";
const DEFAULT_BASE_FONT: &str = "Helvetica";
const DEFAULT_ENCODING: &str = "WinAnsiEncoding";
const IMAGE_PREFIX: &str = "Im";

type ContentDigest = [u8; 32];

/// A page addressed both by its 1-based number and its object id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRef {
    pub number: u32,
    pub id: ObjectId,
}

/// Tracks resources created during one edit session
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    /// Font dictionary shared by every page that gets the default font
    font: Option<ObjectId>,
    /// Embedded images by content digest, shared across pages
    images: HashMap<ContentDigest, ObjectId>,
    /// Name each image was registered under, per page
    page_images: HashMap<(ObjectId, ContentDigest), String>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure the page can draw with the default font and return its name.
    ///
    /// An existing `/FHelv` entry is reused only when it is WinAnsi Helvetica;
    /// otherwise the font is registered under a fresh `FHelv{n}` name.
    pub fn ensure_font(
        &mut self,
        doc: &mut Document,
        page: PageRef,
    ) -> Result<String, InstructionError> {
        let mut resources = owned_resources(doc, page.id).map_err(|r| malformed(page, r))?;
        let mut fonts = owned_category(doc, &resources, b"Font").map_err(|r| malformed(page, r))?;
        if let Some(name) = self.usable_font_name(doc, &fonts) {
            return Ok(name);
        }

        let font_id = *self.font.get_or_insert_with(|| {
            doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => DEFAULT_BASE_FONT,
                "Encoding" => DEFAULT_ENCODING,
            })
        });
        let name = if fonts.has(DEFAULT_FONT.as_bytes()) {
            fresh_name(&fonts, DEFAULT_FONT)
        } else {
            DEFAULT_FONT.to_string()
        };
        fonts.set(name.clone(), Object::Reference(font_id));
        resources.set("Font", Object::Dictionary(fonts));
        store_resources(doc, page.id, resources).map_err(|r| malformed(page, r))?;

        Ok(name)
    }

    /// Name under which the page already reaches a usable default font
    fn usable_font_name(&self, doc: &Document, fonts: &Dictionary) -> Option<String> {
        if let Some(font_id) = self.font {
            let registered = fonts
                .iter()
                .find(|(_, entry)| matches!(entry, Object::Reference(id) if *id == font_id));
            if let Some((name, _)) = registered {
                return Some(String::from_utf8_lossy(name).into_owned());
            }
        }
        let entry = fonts.get(DEFAULT_FONT.as_bytes()).ok()?;
        is_default_font(doc, entry).then(|| DEFAULT_FONT.to_string())
    }

    /// Make sure the page has an Image XObject for these bytes and return its name
    pub fn ensure_image(
        &mut self,
        doc: &mut Document,
        page: PageRef,
        bytes: &[u8],
    ) -> Result<String, InstructionError> {
        let digest: ContentDigest = Sha256::digest(bytes).into();

        let mut resources = owned_resources(doc, page.id).map_err(|r| malformed(page, r))?;
        let mut xobjects =
            owned_category(doc, &resources, b"XObject").map_err(|r| malformed(page, r))?;
        if let Some(name) = self.page_images.get(&(page.id, digest)) {
            if xobjects.has(name.as_bytes()) {
                return Ok(name.clone());
            }
        }

        let image_id = match self.images.get(&digest) {
            Some(id) => *id,
            None => {
                let decoded = decode_image(bytes)?;
                let id = embed_image(doc, &decoded).map_err(|r| malformed(page, r))?;
                self.images.insert(digest, id);
                id
            }
        };

        let name = fresh_name(&xobjects, IMAGE_PREFIX);
        xobjects.set(name.clone(), Object::Reference(image_id));
        resources.set("XObject", Object::Dictionary(xobjects));
        store_resources(doc, page.id, resources).map_err(|r| malformed(page, r))?;

        self.page_images.insert((page.id, digest), name.clone());
        Ok(name)
    }
}

fn malformed(page: PageRef, reason: String) -> InstructionError {
    InstructionError::MalformedPage {
        page: page.number,
        reason,
    }
}

fn is_default_font(doc: &Document, entry: &Object) -> bool {
    let Ok(Object::Dictionary(font)) = resolve(doc, entry) else {
        return false;
    };
    let is_name = |key: &[u8], expected: &str| {
        matches!(font.get(key), Ok(Object::Name(name)) if name == expected.as_bytes())
    };
    is_name(b"BaseFont", DEFAULT_BASE_FONT) && is_name(b"Encoding", DEFAULT_ENCODING)
}

/// Effective resources of a page as a private copy
fn owned_resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary, String> {
    match inherited_attribute(doc, page_id, b"Resources")? {
        Some(Object::Dictionary(dict)) => Ok(dict.clone()),
        Some(_) => Err("Resources is not a dictionary".to_string()),
        None => Ok(Dictionary::new()),
    }
}

/// One category (`/Font`, `/XObject`) of a resource dictionary as a private copy
fn owned_category(doc: &Document, resources: &Dictionary, key: &[u8]) -> Result<Dictionary, String> {
    let entry = match resources.get(key) {
        Ok(entry) => entry,
        Err(_) => return Ok(Dictionary::new()),
    };
    match resolve(doc, entry)? {
        Object::Dictionary(dict) => Ok(dict.clone()),
        _ => Err(format!(
            "/{} resources are not a dictionary",
            String::from_utf8_lossy(key)
        )),
    }
}

fn store_resources(doc: &mut Document, page_id: ObjectId, resources: Dictionary) -> Result<(), String> {
    page_dictionary_mut(doc, page_id)?.set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// First `{prefix}{n}` name, n >= 1, not already in the dictionary
fn fresh_name(dict: &Dictionary, prefix: &str) -> String {
    let mut n = 1u32;
    loop {
        let name = format!("{}{}", prefix, n);
        if !dict.has(name.as_bytes()) {
            return name;
        }
        n += 1;
    }
}
