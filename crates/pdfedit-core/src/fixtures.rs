//! In-memory PDFs and images for unit tests

use std::io::Cursor;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

const LETTER: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

fn media_box(rect: [f32; 4]) -> Object {
    Object::Array(rect.iter().map(|v| Object::Real(*v)).collect())
}

fn label_stream(doc: &mut Document, label: &str) -> ObjectId {
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
            Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
            Operation::new(
                "Tj",
                vec![Object::String(
                    label.as_bytes().to_vec(),
                    lopdf::StringFormat::Literal,
                )],
            ),
            Operation::new("ET", vec![]),
        ],
    };
    doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()))
}

fn helvetica(doc: &mut Document) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    })
}

fn font_resources(font_id: ObjectId) -> Dictionary {
    dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    }
}

/// Attach the page tree and catalog, then serialize
fn finish(mut doc: Document, pages_id: ObjectId, page_ids: &[ObjectId], mut pages: Dictionary) -> Vec<u8> {
    pages.set("Type", "Pages");
    pages.set("Count", page_ids.len() as i64);
    pages.set(
        "Kids",
        Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
    );
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// One page per MediaBox, each with a label and its own inline resources
pub(crate) fn pdf_with_pages(boxes: &[[f32; 4]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = helvetica(&mut doc);

    let mut page_ids = Vec::new();
    for (i, rect) in boxes.iter().enumerate() {
        let content_id = label_stream(&mut doc, &format!("Page {}", i + 1));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box(*rect),
            "Resources" => font_resources(font_id),
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }
    finish(doc, pages_id, &page_ids, Dictionary::new())
}

/// US Letter pages with a text label on each
pub(crate) fn blank_pdf(num_pages: u32) -> Vec<u8> {
    pdf_with_pages(&vec![LETTER; num_pages as usize])
}

/// One page whose MediaBox and Resources live on the page tree root
pub(crate) fn pdf_with_inherited_media_box(rect: [f32; 4]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = helvetica(&mut doc);
    let content_id = label_stream(&mut doc, "Inherited");
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    finish(
        doc,
        pages_id,
        &[page_id],
        dictionary! {
            "MediaBox" => media_box(rect),
            "Resources" => font_resources(font_id),
        },
    )
}

/// Letter pages that all point at one indirect Resources dictionary
/// holding `/F1` and an image `/Im1`
pub(crate) fn pdf_with_shared_resources(num_pages: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = helvetica(&mut doc);
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 1,
            "Height" => 1,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        vec![0],
    ));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
        "XObject" => dictionary! { "Im1" => image_id },
    });

    let mut page_ids = Vec::new();
    for i in 0..num_pages {
        let content_id = label_stream(&mut doc, &format!("Shared {}", i + 1));
        page_ids.push(doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box(LETTER),
            "Resources" => resources_id,
            "Contents" => content_id,
        }));
    }
    finish(doc, pages_id, &page_ids, Dictionary::new())
}

/// One Letter page whose `/Contents` is an inline array of two streams
pub(crate) fn pdf_with_content_array() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = helvetica(&mut doc);
    let first = label_stream(&mut doc, "First");
    let second = label_stream(&mut doc, "Second");
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => media_box(LETTER),
        "Resources" => font_resources(font_id),
        "Contents" => vec![Object::Reference(first), Object::Reference(second)],
    });
    finish(doc, pages_id, &[page_id], Dictionary::new())
}

/// One Letter page with no `/Contents` and no `/Resources`
pub(crate) fn pdf_without_contents() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => media_box(LETTER),
    });
    finish(doc, pages_id, &[page_id], Dictionary::new())
}

/// PNG-encoded solid image; translucent images get alpha 128
pub(crate) fn png_bytes(width: u32, height: u32, translucent: bool) -> Vec<u8> {
    let alpha = if translucent { 128 } else { 255 };
    let pixels = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 30, 30, alpha]));
    let mut buffer = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(pixels)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}
