//! Document Export
//!
//! Lays a priced document out on fixed-size pages and writes it as PDF.
//!
//! # Pipeline
//!
//! ```text
//! DocumentState ──► DocumentPricing ──► LayoutEngine ──► Canvas
//!                                                        ├─ PdfCanvas (printpdf)
//!                                                        └─ RecordingCanvas (preview, tests)
//! ```
//!
//! Images that fail to decode never abort an export: they are left out and
//! reported in [`RenderSummary::warnings`].
//!
//! # Example
//!
//! ```rust,ignore
//! use export_pdf::export_pdf;
//!
//! let bytes = export_pdf(&document, &company, &registry)?;
//! std::fs::write("quote.pdf", bytes)?;
//! ```

pub mod canvas;
pub mod docx;
pub mod error;
pub mod geometry;
pub mod images;
pub mod layout;
pub mod measure;
pub mod numbering;
pub mod pdf;
pub mod receipt;
pub mod table;

use tracing::info;

use domain_document::{ColumnRegistry, Company, DocumentState};

pub use canvas::{Canvas, DrawOp, RecordingCanvas, Rgb};
pub use docx::export_docx;
pub use error::{ExportError, ImageError};
pub use geometry::PageGeometry;
pub use images::{decode_data_url, fit, DecodedImage};
pub use layout::{format_date, BlockKind, LayoutEngine, PlacedBlock, RenderSummary, IMAGE_LOAD_FAILED};
pub use measure::{line_height, text_width, wrap_text, FontStyle};
pub use numbering::{footer_text, format_page_number, to_roman, FooterText};
pub use pdf::PdfCanvas;
pub use receipt::{receipt_lines, RECEIPT_WIDTH};
pub use table::{column_slots, fixed_ratio, ColumnSlot};

/// Lays the document out on any canvas
pub fn render_document<C: Canvas>(
    canvas: &mut C,
    document: &DocumentState,
    company: &Company,
    registry: &ColumnRegistry,
) -> RenderSummary {
    LayoutEngine::new(canvas, document, company, registry).render()
}

/// Renders the document to PDF bytes
pub fn export_pdf(
    document: &DocumentState,
    company: &Company,
    registry: &ColumnRegistry,
) -> Result<Vec<u8>, ExportError> {
    let geometry = PageGeometry::letter();
    let title = format!("{} {}", document.doc_type.label(), document.doc_number);
    let mut canvas = PdfCanvas::new(&title, &geometry)?;
    let summary = render_document(&mut canvas, document, company, registry);
    let bytes = canvas.finish()?;

    info!(
        document_id = %document.id,
        doc_number = %document.doc_number,
        pages = summary.pages,
        warnings = summary.warnings.len(),
        bytes = bytes.len(),
        "PDF exported"
    );
    Ok(bytes)
}

/// Page assignment of every block without producing a PDF
pub fn layout_preview(
    document: &DocumentState,
    company: &Company,
    registry: &ColumnRegistry,
) -> RenderSummary {
    let geometry = PageGeometry::letter();
    let mut canvas = RecordingCanvas::new(geometry.width, geometry.height);
    render_document(&mut canvas, document, company, registry)
}
