//! Shared fixtures for docedit-core integration tests

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use base64::Engine;
use docedit_core::{
    AuditStore, DocumentService, LocalBlobStore, MemoryAuditStore, MemoryDocumentStore,
};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};
use pdfedit_core::EditInstructionRequest;
use tempfile::TempDir;

pub struct Harness {
    pub dir: TempDir,
    pub blobs: Arc<LocalBlobStore>,
    pub documents: Arc<MemoryDocumentStore>,
    pub service: DocumentService,
}

impl Harness {
    /// Names of every file in the blob directory, sorted
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.blobs.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }
}

pub fn harness() -> Harness {
    harness_with_audit(Arc::new(MemoryAuditStore::new()))
}

pub fn harness_with_audit(audit: Arc<dyn AuditStore>) -> Harness {
    let dir = TempDir::new().unwrap();
    let blobs = Arc::new(
        LocalBlobStore::new(dir.path().join("storage"), "http://localhost:8080/files").unwrap(),
    );
    let documents = Arc::new(MemoryDocumentStore::new());
    let service = DocumentService::new(blobs.clone(), documents.clone(), audit);
    Harness {
        dir,
        blobs,
        documents,
        service,
    }
}

// Helper to create a simple PDF with N letter-size pages
pub fn create_test_pdf(num_pages: u32) -> Vec<u8> {
    create_pdf_with_media_box(num_pages, &[0, 0, 612, 792])
}

/// PDF whose pages all carry the given MediaBox entries, valid or not
pub fn create_pdf_with_media_box(num_pages: u32, media_box: &[i64]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut page_ids = Vec::new();
    for i in 0..num_pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
                Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
                Operation::new(
                    "Tj",
                    vec![Object::String(
                        format!("Page {}", i + 1).into_bytes(),
                        lopdf::StringFormat::Literal,
                    )],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(media_box.iter().map(|v| Object::Integer(*v)).collect()),
            ),
            ("Contents", Object::Reference(content_id)),
        ]);
        page_ids.push(doc.add_object(page));
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(num_pages as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// Decompressed content of one page
pub fn page_content(pdf: &[u8], page: u32) -> Vec<u8> {
    let doc = Document::load_mem(pdf).unwrap();
    let page_id = doc.get_pages()[&page];
    doc.get_page_content(page_id).unwrap()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let pixels = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 90, 200, 255]));
    let mut buffer = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(pixels)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

pub fn png_data_url(width: u32, height: u32) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png_bytes(width, height))
    )
}

pub fn text(page: i64, x: f64, y: f64, content: &str) -> EditInstructionRequest {
    EditInstructionRequest::text(page, x, y, content)
}

pub fn image(page: i64, x: f64, y: f64, width: f64, height: f64, source: &str) -> EditInstructionRequest {
    EditInstructionRequest::image(page, x, y, width, height, source)
}

pub fn drawing(page: i64) -> EditInstructionRequest {
    serde_json::from_value(serde_json::json!({"type": "drawing", "page": page})).unwrap()
}
