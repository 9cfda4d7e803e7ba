//! Export errors
//!
//! Only backend failures abort an export. Image problems are reported as
//! `ImageError`, logged, and the image is left out.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    /// The PDF backend failed to build or serialize the document
    #[error("PDF generation failed: {0}")]
    Pdf(String),

    /// A builtin font could not be registered
    #[error("Font unavailable: {0}")]
    Font(String),

    /// The requested format is not implemented
    #[error("{0} export is not supported")]
    Unsupported(&'static str),
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Not a base64 data URL")]
    InvalidDataUrl,

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Image could not be decoded: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image has no pixels")]
    Empty,
}
