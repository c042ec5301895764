//! Page rendering through poppler's `pdftoppm`.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use tracing::{debug, info};

use super::{limit_pages, PdfRasterizer, Result};
use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// Renders each page to PNG with `pdftoppm`, then loads the images.
pub struct PopplerRasterizer {
    command: PathBuf,
    dpi: u32,
    max_pages: usize,
}

impl PopplerRasterizer {
    pub fn new(command: impl Into<PathBuf>, dpi: u32, max_pages: usize) -> Self {
        Self {
            command: command.into(),
            dpi,
            max_pages,
        }
    }

    /// Create a rasterizer from PDF configuration.
    pub fn from_config(config: &PdfConfig) -> Self {
        Self::new(config.pdftoppm_cmd.clone(), config.render_dpi, config.max_pages)
    }
}

impl PdfRasterizer for PopplerRasterizer {
    fn name(&self) -> &'static str {
        "poppler"
    }

    fn rasterize(&self, path: &Path) -> Result<Vec<DynamicImage>> {
        let temp_dir = tempfile::tempdir()?;
        let output_prefix = temp_dir.path().join("page");

        let mut command = Command::new(&self.command);
        command.arg("-png").arg("-r").arg(self.dpi.to_string());
        if self.max_pages > 0 {
            command.arg("-l").arg(self.max_pages.to_string());
        }
        command.arg(path).arg(&output_prefix);

        debug!("Rendering {} at {} DPI", path.display(), self.dpi);

        let output = command.output().map_err(|e| {
            PdfError::Rasterize(format!("failed to run {}: {}", self.command.display(), e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PdfError::Rasterize(format!(
                "pdftoppm failed: {}",
                stderr.trim()
            )));
        }

        // pdftoppm zero-pads page numbers, so path order is page order.
        let mut image_files: Vec<PathBuf> = std::fs::read_dir(temp_dir.path())?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|ext| ext == "png").unwrap_or(false))
            .collect();
        image_files.sort();

        if image_files.is_empty() {
            return Err(PdfError::NoPages);
        }

        let pages = limit_pages(image_files, self.max_pages)
            .iter()
            .map(|p| {
                image::open(p).map_err(|e| {
                    PdfError::Rasterize(format!("failed to load {}: {}", p.display(), e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        info!("Rendered {} pages from {}", pages.len(), path.display());

        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary() {
        let rasterizer = PopplerRasterizer::new("/nonexistent/pdftoppm", 200, 0);
        let err = rasterizer.rasterize(Path::new("receipt.pdf")).unwrap_err();
        assert!(matches!(err, PdfError::Rasterize(_)));
    }

    #[test]
    fn test_from_config() {
        let rasterizer = PopplerRasterizer::from_config(&PdfConfig::default());
        assert_eq!(rasterizer.dpi, 200);
        assert_eq!(rasterizer.max_pages, 0);
    }
}
