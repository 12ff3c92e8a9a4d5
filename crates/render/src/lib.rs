//! Layout Inspector Render Library
//!
//! Thin wrapper around PDFium: the core never parses PDF bytes itself,
//! it only consumes page counts, page sizes, and rendered rasters from
//! this crate.

pub mod pdf;

pub use pdf::{render_pixel_size, PdfDocument, PdfError, PdfResult, RenderedPage};
