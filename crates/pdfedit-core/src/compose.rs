//! Content stream fragments for placed text and images
//!
//! Every fragment is wrapped in `q`/`Q` so it cannot leak graphics state into
//! whatever is drawn after it.

use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};

/// Line spacing for multi-line text, as a multiple of the font size
const LINE_HEIGHT: f64 = 1.2;

/// Draw `text` with its first baseline starting at `(x, y)` in PDF space.
///
/// Line breaks in `text` start a new line below the previous one. Carriage
/// returns are dropped wherever they appear.
pub fn compose_text(
    x: f64,
    y: f64,
    text: &str,
    font_resource: &str,
    font_size: f64,
) -> Result<Vec<u8>, String> {
    let mut operations = vec![
        Operation::new("q", vec![]),
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![Object::Name(font_resource.as_bytes().to_vec()), real(font_size)],
        ),
        Operation::new("Td", vec![real(x), real(y)]),
    ];

    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            operations.push(Operation::new(
                "Td",
                vec![real(0.0), real(-font_size * LINE_HEIGHT)],
            ));
        }
        let line: String = line.chars().filter(|c| *c != '\r').collect();
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(&line), StringFormat::Literal)],
        ));
    }

    operations.push(Operation::new("ET", vec![]));
    operations.push(Operation::new("Q", vec![]));

    Content { operations }
        .encode()
        .map_err(|e| format!("failed to encode text content: {}", e))
}

/// Draw an image XObject scaled into the box with bottom-left corner `(x, y)`
pub fn compose_image(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    image_resource: &str,
) -> Result<Vec<u8>, String> {
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![real(width), real(0.0), real(0.0), real(height), real(x), real(y)],
            ),
            Operation::new("Do", vec![Object::Name(image_resource.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    content
        .encode()
        .map_err(|e| format!("failed to encode image content: {}", e))
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

/// Encode text for a standard font with WinAnsiEncoding.
///
/// Latin-1 maps directly; the typographic characters WinAnsi places in
/// 0x80..0x9F are mapped explicitly; anything else becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' => b' ',
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '•' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            _ => b'?',
        })
        .collect()
}
