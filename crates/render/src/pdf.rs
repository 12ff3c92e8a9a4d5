//! PDF document abstraction layer
//!
//! Provides the narrow rasterization contract the overlay compositor
//! depends on: total page count, per-page dimensions, and rendering a
//! page to RGBA pixels at a given scale. Rendering reports the actual
//! pixel dimensions produced, which is what relative-coordinate blocks
//! resolve against.

use log::debug;
use pdfium_render::prelude::*;
use std::path::Path;

/// Errors that can occur during PDF operations
#[derive(Debug)]
pub enum PdfError {
    /// Failed to initialize the PDFium library
    Initialization(String),

    /// Failed to load the PDF document
    Load(String),

    /// Invalid page index
    InvalidPageIndex(u16),

    /// Rasterization failure
    Render(String),
}

impl std::fmt::Display for PdfError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PdfError::Initialization(msg) => write!(f, "PDFium initialization error: {}", msg),
            PdfError::Load(msg) => write!(f, "PDF load error: {}", msg),
            PdfError::InvalidPageIndex(idx) => write!(f, "Invalid page index: {}", idx),
            PdfError::Render(msg) => write!(f, "PDF render error: {}", msg),
        }
    }
}

impl std::error::Error for PdfError {}

/// Result type for PDF operations
pub type PdfResult<T> = Result<T, PdfError>;

/// One rendered page raster.
///
/// `base_width`/`base_height` are the page's dimensions in points, i.e.
/// the raster size the renderer would produce at scale 1.0 — the unit
/// system absolute-coordinate annotations live in.
pub struct RenderedPage {
    pub rgba: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
    pub base_width: f32,
    pub base_height: f32,
}

/// Pixel dimensions for rendering a page of `width x height` points at
/// `scale`, with `pixels_per_point` display scaling. Clamped to at least
/// one pixel per axis so degenerate pages never produce an empty raster.
pub fn render_pixel_size(
    width: f32,
    height: f32,
    scale: f32,
    pixels_per_point: f32,
) -> (u32, u32) {
    let w = (width * scale * pixels_per_point).round().max(1.0) as u32;
    let h = (height * scale * pixels_per_point).round().max(1.0) as u32;
    (w, h)
}

/// PDF document handle
///
/// Wraps a PDFium document. Dropping the handle releases every per-load
/// resource, so replacing a loaded document is a plain assignment.
pub struct PdfDocument {
    document: pdfium_render::prelude::PdfDocument<'static>,
}

impl PdfDocument {
    /// Initialize the PDFium library.
    ///
    /// Search order:
    /// 1. Executable's directory (for app bundles)
    /// 2. Current working directory
    /// 3. System library paths
    fn init_pdfium() -> PdfResult<Pdfium> {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()));

        if let Some(ref dir) = exe_dir {
            if let Ok(bindings) =
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            {
                return Ok(Pdfium::new(bindings));
            }
        }

        Ok(Pdfium::new(
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library())
                .map_err(|e| PdfError::Initialization(e.to_string()))?,
        ))
    }

    /// Load a PDF document from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> PdfResult<Self> {
        let pdfium = Box::leak(Box::new(Self::init_pdfium()?));

        let document = pdfium
            .load_pdf_from_file(path.as_ref(), None)
            .map_err(|e| PdfError::Load(e.to_string()))?;

        debug!(
            "opened {} ({} pages)",
            path.as_ref().display(),
            document.pages().len()
        );

        Ok(Self { document })
    }

    /// Load a PDF document from byte data (owned)
    pub fn from_bytes(data: Vec<u8>) -> PdfResult<Self> {
        let pdfium = Box::leak(Box::new(Self::init_pdfium()?));
        let data_static: &'static [u8] = Box::leak(data.into_boxed_slice());

        let document = pdfium
            .load_pdf_from_byte_slice(data_static, None)
            .map_err(|e| PdfError::Load(e.to_string()))?;

        Ok(Self { document })
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> u16 {
        self.document.pages().len()
    }

    /// Page `[width, height]` in points (0-based index)
    pub fn page_size(&self, index: u16) -> PdfResult<(f32, f32)> {
        let page = self.get_page(index)?;
        Ok((page.width().value, page.height().value))
    }

    fn get_page(&self, index: u16) -> PdfResult<PdfPage<'_>> {
        self.document
            .pages()
            .get(index)
            .map_err(|_| PdfError::InvalidPageIndex(index))
    }

    /// Render a page to RGBA pixel data at explicit pixel dimensions
    pub fn render_page_rgba(&self, index: u16, width: u32, height: u32) -> PdfResult<Vec<u8>> {
        let page = self.get_page(index)?;

        let config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_target_height(height as i32);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| PdfError::Render(e.to_string()))?;

        Ok(bitmap.as_rgba_bytes().to_vec())
    }

    /// Render a page at a zoom scale, reporting the raster produced.
    ///
    /// `pixels_per_point` accounts for display scaling so the raster is
    /// crisp on high-DPI screens; the logical on-screen size is still
    /// `base size x scale`.
    pub fn render_page_at_scale(
        &self,
        index: u16,
        scale: f32,
        pixels_per_point: f32,
    ) -> PdfResult<RenderedPage> {
        let (base_width, base_height) = self.page_size(index)?;
        let (width_px, height_px) =
            render_pixel_size(base_width, base_height, scale, pixels_per_point);

        let rgba = self.render_page_rgba(index, width_px, height_px)?;

        Ok(RenderedPage {
            rgba,
            width_px,
            height_px,
            base_width,
            base_height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_pixel_size_scales_both_axes() {
        assert_eq!(render_pixel_size(612.0, 792.0, 1.0, 1.0), (612, 792));
        assert_eq!(render_pixel_size(612.0, 792.0, 2.0, 1.0), (1224, 1584));
        assert_eq!(render_pixel_size(600.0, 800.0, 1.5, 2.0), (1800, 2400));
    }

    #[test]
    fn test_render_pixel_size_never_degenerates() {
        assert_eq!(render_pixel_size(0.0, 0.0, 1.0, 1.0), (1, 1));
        assert_eq!(render_pixel_size(0.1, 0.1, 0.5, 1.0), (1, 1));
    }

    #[test]
    fn test_error_display() {
        let err = PdfError::InvalidPageIndex(5);
        assert_eq!(err.to_string(), "Invalid page index: 5");

        let err = PdfError::Load("file not found".to_string());
        assert!(err.to_string().contains("file not found"));

        let err = PdfError::Initialization("init failed".to_string());
        assert!(err.to_string().contains("init failed"));

        let err = PdfError::Render("render failed".to_string());
        assert!(err.to_string().contains("render failed"));
    }
}
