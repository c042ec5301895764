//! Page images taken from the PDF's own image XObjects using lopdf.
//!
//! Scanned receipts are usually one image per page, so no renderer is
//! needed. Pages without a decodable image are skipped.

use std::path::Path;

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info, trace, warn};

use super::{limit_pages, PdfRasterizer, Result};
use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// Rasterizer that extracts the first embedded image of each page.
pub struct EmbeddedImageRasterizer {
    max_pages: usize,
}

impl EmbeddedImageRasterizer {
    pub fn new(max_pages: usize) -> Self {
        Self { max_pages }
    }

    /// Create a rasterizer from PDF configuration.
    pub fn from_config(config: &PdfConfig) -> Self {
        Self::new(config.max_pages)
    }
}

impl PdfRasterizer for EmbeddedImageRasterizer {
    fn name(&self) -> &'static str {
        "embedded"
    }

    fn rasterize(&self, path: &Path) -> Result<Vec<DynamicImage>> {
        let mut doc = Document::load(path).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(PdfError::NoPages);
        }

        let page_ids: Vec<(u32, ObjectId)> = pages.into_iter().collect();
        let mut images = Vec::new();

        for (number, page_id) in limit_pages(page_ids, self.max_pages) {
            match first_page_image(&doc, page_id) {
                Some(image) => images.push(image),
                None => warn!("No decodable image on page {}", number),
            }
        }

        if images.is_empty() {
            return Err(PdfError::Rasterize(
                "no embedded page images found".to_string(),
            ));
        }

        info!("Extracted {} page images from {}", images.len(), path.display());

        Ok(images)
    }
}

fn first_page_image(doc: &Document, page_id: ObjectId) -> Option<DynamicImage> {
    let resources = page_resources(doc, page_id)?;
    let xobjects = resources.get(b"XObject").ok()?;
    let (_, Object::Dictionary(xobjects)) = doc.dereference(xobjects).ok()? else {
        return None;
    };

    xobjects.iter().find_map(|(_, obj_ref)| {
        let (_, obj) = doc.dereference(obj_ref).ok()?;
        decode_image(doc, obj)
    })
}

/// Resources dictionary for a page, following `Parent` inheritance.
fn page_resources(doc: &Document, node_id: ObjectId) -> Option<Dictionary> {
    let Object::Dictionary(dict) = doc.get_object(node_id).ok()? else {
        return None;
    };

    if let Ok(resources) = dict.get(b"Resources") {
        if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
            return Some(res_dict.clone());
        }
    }

    match dict.get(b"Parent") {
        Ok(Object::Reference(parent_id)) => page_resources(doc, *parent_id),
        _ => None,
    }
}

fn decode_image(doc: &Document, obj: &Object) -> Option<DynamicImage> {
    let Object::Stream(stream) = obj else {
        return None;
    };
    let dict = &stream.dict;

    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
    let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;

    trace!("Found image object: {}x{}", width, height);

    if let Ok(filter) = dict.get(b"Filter") {
        let filter_name = match filter {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            _ => None,
        };

        match filter_name {
            Some(b"DCTDecode") => {
                return image::load_from_memory_with_format(
                    &stream.content,
                    image::ImageFormat::Jpeg,
                )
                .ok();
            }
            Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                trace!("Unsupported image filter {:?}", filter_name);
                return None;
            }
            _ => {}
        }
    }

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| match o {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
            _ => None,
        })
        .unwrap_or(b"DeviceRGB");

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);

    if bits != 8 {
        trace!("Unsupported bits per component: {}", bits);
        return None;
    }

    from_raw(data, width, height, color_space)
}

fn from_raw(mut data: Vec<u8>, width: u32, height: u32, color_space: &[u8]) -> Option<DynamicImage> {
    let pixels = width as usize * height as usize;

    match color_space {
        b"DeviceRGB" | b"RGB" if data.len() >= pixels * 3 => {
            data.truncate(pixels * 3);
            RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8)
        }
        b"DeviceGray" | b"G" if data.len() >= pixels => {
            data.truncate(pixels);
            GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8)
        }
        _ => {
            trace!(
                "Could not decode {:?} image: {} bytes for {}x{}",
                String::from_utf8_lossy(color_space),
                data.len(),
                width,
                height
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;
    use lopdf::{dictionary, Stream};

    /// Build a PDF whose pages each carry one 2x3 grayscale image, or none.
    fn build_pdf(pages_with_image: &[bool]) -> tempfile::NamedTempFile {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let kids: Vec<Object> = pages_with_image
            .iter()
            .map(|&with_image| {
                let resources = if with_image {
                    let image = Stream::new(
                        dictionary! {
                            "Type" => "XObject",
                            "Subtype" => "Image",
                            "Width" => 2,
                            "Height" => 3,
                            "ColorSpace" => "DeviceGray",
                            "BitsPerComponent" => 8,
                        },
                        vec![0, 255, 10, 20, 30, 40],
                    );
                    let image_id = doc.add_object(image);
                    dictionary! { "XObject" => dictionary! { "Im0" => image_id } }
                } else {
                    Dictionary::new()
                };

                let page_id = doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Resources" => resources,
                    "MediaBox" => vec![0.into(), 0.into(), 100.into(), 100.into()],
                });
                page_id.into()
            })
            .collect();

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        doc.save_to(file.as_file_mut()).unwrap();
        file
    }

    #[test]
    fn test_extracts_page_image() {
        let pdf = build_pdf(&[true]);
        let images = EmbeddedImageRasterizer::new(0).rasterize(pdf.path()).unwrap();

        assert_eq!(images.len(), 1);
        assert_eq!(images[0].dimensions(), (2, 3));
    }

    #[test]
    fn test_max_pages() {
        let pdf = build_pdf(&[true, true, true]);
        let images = EmbeddedImageRasterizer::new(2).rasterize(pdf.path()).unwrap();
        assert_eq!(images.len(), 2);
    }

    #[test]
    fn test_skips_pages_without_images() {
        let pdf = build_pdf(&[false, true]);
        let images = EmbeddedImageRasterizer::new(0).rasterize(pdf.path()).unwrap();
        assert_eq!(images.len(), 1);
    }

    #[test]
    fn test_no_images_is_error() {
        let pdf = build_pdf(&[false]);
        let err = EmbeddedImageRasterizer::new(0).rasterize(pdf.path()).unwrap_err();
        assert!(matches!(err, PdfError::Rasterize(_)));
    }

    #[test]
    fn test_from_raw_rejects_short_data() {
        assert!(from_raw(vec![0; 5], 2, 3, b"DeviceGray").is_none());
        assert!(from_raw(vec![0; 18], 2, 3, b"DeviceRGB").is_some());
        assert!(from_raw(vec![0; 18], 2, 3, b"DeviceCMYK").is_none());
    }
}
