//! PDF processing module.

mod embedded;
mod poppler;
mod text_layer;

pub use embedded::EmbeddedImageRasterizer;
pub use poppler::PopplerRasterizer;
pub use text_layer::text_layer;

use std::path::Path;

use image::DynamicImage;

use crate::error::PdfError;
use crate::models::config::{PdfConfig, RasterizerKind};

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for turning PDF pages into images, in page order.
pub trait PdfRasterizer: Send + Sync {
    /// Rasterizer name used in logs.
    fn name(&self) -> &'static str;

    /// Render every page (up to the configured limit) as an image.
    fn rasterize(&self, path: &Path) -> Result<Vec<DynamicImage>>;
}

/// Create the rasterizer selected by the configuration.
pub fn rasterizer_from_config(config: &PdfConfig) -> Box<dyn PdfRasterizer> {
    match config.rasterizer {
        RasterizerKind::Poppler => Box::new(PopplerRasterizer::from_config(config)),
        RasterizerKind::Embedded => Box::new(EmbeddedImageRasterizer::from_config(config)),
    }
}

/// Keep the first `max_pages` items; zero keeps everything.
pub(crate) fn limit_pages<T>(mut pages: Vec<T>, max_pages: usize) -> Vec<T> {
    if max_pages > 0 {
        pages.truncate(max_pages);
    }
    pages
}
