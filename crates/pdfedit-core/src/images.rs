//! Image sources and Image XObject embedding
//!
//! An image instruction names its bytes either inline, as a `data:` URL with a
//! base64 payload, or by reference, resolved through an [`ImageSource`].
//! Decoded pixels are stored as 8-bit DeviceRGB with an optional DeviceGray
//! soft mask, both Flate-compressed.

use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Document, ObjectId, Stream};

use crate::error::InstructionError;

/// Resolves an image reference (a storage path, a name) to encoded image bytes
pub trait ImageSource {
    fn load(&self, reference: &str) -> Result<Vec<u8>, String>;
}

impl<F> ImageSource for F
where
    F: Fn(&str) -> Result<Vec<u8>, String>,
{
    fn load(&self, reference: &str) -> Result<Vec<u8>, String> {
        self(reference)
    }
}

/// Source that resolves nothing; only inline `data:` URLs can be used with it
#[derive(Debug, Default, Clone, Copy)]
pub struct NoImageSource;

impl ImageSource for NoImageSource {
    fn load(&self, _reference: &str) -> Result<Vec<u8>, String> {
        Err("no image source is configured".to_string())
    }
}

/// Fetch the encoded bytes an image instruction points at
pub fn resolve_image_bytes(
    reference: &str,
    source: &dyn ImageSource,
) -> Result<Vec<u8>, InstructionError> {
    let unavailable = |reason: String| InstructionError::ImageUnavailable {
        reference: display_reference(reference),
        reason,
    };

    if let Some(rest) = reference.strip_prefix("data:") {
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| unavailable("data URL has no payload".to_string()))?;
        if !header.ends_with(";base64") {
            return Err(unavailable("data URL is not base64 encoded".to_string()));
        }
        return STANDARD
            .decode(payload.trim())
            .map_err(|e| unavailable(format!("invalid base64: {}", e)));
    }

    let bytes = source.load(reference).map_err(unavailable)?;
    if bytes.is_empty() {
        return Err(unavailable("image is empty".to_string()));
    }
    Ok(bytes)
}

// Data URLs can be megabytes long; keep error messages readable
fn display_reference(reference: &str) -> String {
    const MAX: usize = 48;
    if reference.len() <= MAX {
        return reference.to_string();
    }
    let cut = (0..=MAX)
        .rev()
        .find(|i| reference.is_char_boundary(*i))
        .unwrap_or(0);
    format!("{}...", &reference[..cut])
}

/// Pixels of a decoded image, ready to embed
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Interleaved 8-bit RGB samples
    pub rgb: Vec<u8>,
    /// 8-bit alpha samples, present only when some pixel is not fully opaque
    pub alpha: Option<Vec<u8>>,
}

/// Decode PNG or JPEG bytes into RGB samples plus an optional alpha plane
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, InstructionError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| InstructionError::ImageDecode(e.to_string()))?;
    let has_alpha = decoded.color().has_alpha();
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(InstructionError::ImageDecode("image has no pixels".to_string()));
    }

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha = Vec::with_capacity((width * height) as usize);
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel[3]);
    }
    let alpha = (has_alpha && alpha.iter().any(|a| *a != u8::MAX)).then_some(alpha);

    Ok(DecodedImage {
        width,
        height,
        rgb,
        alpha,
    })
}

/// Add an Image XObject (and its soft mask) to the document
pub(crate) fn embed_image(doc: &mut Document, image: &DecodedImage) -> Result<ObjectId, String> {
    let smask_id = match &image.alpha {
        Some(alpha) => {
            let stream = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => image.width as i64,
                    "Height" => image.height as i64,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                    "Filter" => "FlateDecode",
                },
                deflate(alpha)?,
            );
            Some(doc.add_object(stream))
        }
        None => None,
    };

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => image.width as i64,
        "Height" => image.height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };
    if let Some(id) = smask_id {
        dict.set("SMask", id);
    }
    Ok(doc.add_object(Stream::new(dict, deflate(&image.rgb)?)))
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, String> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| format!("compression failed: {}", e))?;
    encoder
        .finish()
        .map_err(|e| format!("compression failed: {}", e))
}
