use folio_editor::{PageRenderer, Preview, PreviewSize, Rotation};
use lopdf::Document;
use serde::Serialize;

use crate::page_tree::{page_box, resolve_inherited, rotation_of};
use crate::PdfError;

/// Geometry of one source page, in PDF points
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageInfo {
    pub index: usize,
    pub width: f32,
    pub height: f32,
    /// Rotation embedded in the source page
    pub rotation: Rotation,
}

impl PageInfo {
    /// Size as displayed, with the embedded rotation applied
    pub fn display_size(&self) -> PreviewSize {
        PreviewSize::new(self.width, self.height).rotated(self.rotation)
    }
}

/// Page geometry for every page of a PDF, in reading order.
pub fn inspect(bytes: &[u8]) -> Result<Vec<PageInfo>, PdfError> {
    let doc = Document::load_mem(bytes)?;

    doc.get_pages()
        .into_values()
        .enumerate()
        .map(|(index, page_id)| -> Result<PageInfo, PdfError> {
            let [x0, y0, x1, y1] =
                page_box(&doc, page_id)?.ok_or(PdfError::MissingMediaBox { index })?;
            let rotation = rotation_of(&doc, resolve_inherited(&doc, page_id, b"Rotate")?)?;
            Ok(PageInfo {
                index,
                width: (x1 - x0).abs(),
                height: (y1 - y0).abs(),
                rotation,
            })
        })
        .collect()
}

/// Size-only previews for front ends that rasterize elsewhere.
///
/// Every preview is a placeholder whose size is the page box scaled by
/// `scale`, turned by the page's embedded rotation.
#[derive(Debug, Clone)]
pub struct LopdfRenderer {
    pub scale: f32,
}

impl Default for LopdfRenderer {
    fn default() -> Self {
        // 72 dpi points down to an 18 dpi thumbnail
        Self { scale: 0.25 }
    }
}

impl LopdfRenderer {
    pub fn new(scale: f32) -> Self {
        Self { scale }
    }
}

impl PageRenderer for LopdfRenderer {
    type Error = PdfError;

    fn render(&self, source: &[u8]) -> Result<Vec<Preview>, Self::Error> {
        let previews: Vec<Preview> = inspect(source)?
            .iter()
            .map(|info| {
                let size = info.display_size();
                Preview::placeholder(PreviewSize::new(
                    size.width * self.scale,
                    size.height * self.scale,
                ))
            })
            .collect();

        tracing::debug!(pages = previews.len(), scale = self.scale, "Rendered previews");
        Ok(previews)
    }
}
