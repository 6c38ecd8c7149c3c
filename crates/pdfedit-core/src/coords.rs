//! Coordinate transformation between client space and PDF space
//!
//! Client space has its origin at the top-left of the page with y growing
//! downward. PDF space has its origin at the bottom-left with y growing upward.
//! Both use PDF points.
//!
//! Text is anchored by its baseline insertion point, so it carries no height.
//! Images are anchored by the top-left corner of their box on the client side
//! but by the bottom-left corner in PDF, so the box height is subtracted.
//! Out-of-page coordinates are passed through unchanged.

/// Convert a client-space anchor to PDF space
pub fn to_pdf_space(page_height: f64, x: f64, y_top: f64, element_height: f64) -> (f64, f64) {
    (x, page_height - y_top - element_height)
}

/// Convert a PDF-space anchor back to client space
pub fn to_client_space(
    page_height: f64,
    x_pdf: f64,
    y_pdf: f64,
    element_height: f64,
) -> (f64, f64) {
    (x_pdf, page_height - y_pdf - element_height)
}

/// PDF insertion point for text whose baseline starts at `(x, y_top)`
pub fn text_anchor(page_height: f64, x: f64, y_top: f64) -> (f64, f64) {
    to_pdf_space(page_height, x, y_top, 0.0)
}

/// PDF bottom-left corner for an image box whose top-left is `(x, y_top)`
pub fn image_anchor(page_height: f64, x: f64, y_top: f64, height: f64) -> (f64, f64) {
    to_pdf_space(page_height, x, y_top, height)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn dimension() -> impl Strategy<Value = f64> {
        1.0f64..2000.0
    }

    proptest! {
        /// Property: client→PDF→client returns the original anchor
        #[test]
        fn roundtrip_client_pdf_client(
            page_h in dimension(),
            x in -500.0f64..2500.0,
            y in -500.0f64..2500.0,
            h in 0.0f64..1000.0,
        ) {
            let (px, py) = to_pdf_space(page_h, x, y, h);
            let (bx, by) = to_client_space(page_h, px, py, h);

            let tolerance = 1e-9;
            prop_assert!((bx - x).abs() < tolerance, "X: {} vs {}", bx, x);
            prop_assert!((by - y).abs() < tolerance, "Y: {} vs {}", by, y);
        }

        /// Property: x never changes between spaces
        #[test]
        fn x_is_preserved(page_h in dimension(), x in -1000.0f64..1000.0, y in 0.0f64..1000.0) {
            let (px, _) = text_anchor(page_h, x, y);
            prop_assert_eq!(px, x);
        }

        /// Property: the client top edge maps to the page height for text
        #[test]
        fn top_edge_maps_to_page_height(page_h in dimension()) {
            let (_, py) = text_anchor(page_h, 0.0, 0.0);
            prop_assert!((py - page_h).abs() < 1e-9);
        }

        /// Property: moving down in client space moves down in PDF space
        #[test]
        fn y_axis_is_flipped(page_h in dimension(), y1 in 0.0f64..500.0, dy in 0.1f64..500.0) {
            let (_, a) = text_anchor(page_h, 0.0, y1);
            let (_, b) = text_anchor(page_h, 0.0, y1 + dy);
            prop_assert!(b < a);
        }
    }
}
