use std::collections::HashMap;

use folio_editor::{DocumentBackend, Rotation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};

use crate::copier::ObjectCopier;
use crate::page_tree::{resolve_inherited, rotation_of, INHERITABLE_KEYS};
use crate::PdfError;

/// A parsed source document with its pages in reading order
#[derive(Debug, Clone)]
pub struct SourcePdf {
    doc: Document,
    pages: Vec<ObjectId>,
}

impl SourcePdf {
    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Output document under construction.
///
/// The page tree is only written at serialization; until then copied pages
/// are collected in `kids`.
#[derive(Debug)]
pub struct OutputPdf {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
    id_map: HashMap<ObjectId, ObjectId>,
}

impl OutputPdf {
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }
}

/// [`DocumentBackend`] on top of lopdf
#[derive(Debug, Clone, Default)]
pub struct LopdfBackend {
    /// Compress streams before writing
    pub compress: bool,
}

impl LopdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compressed() -> Self {
        Self { compress: true }
    }
}

impl DocumentBackend for LopdfBackend {
    type Source = SourcePdf;
    type Output = OutputPdf;
    type Page = ObjectId;
    type Error = PdfError;

    fn open(&self, bytes: &[u8]) -> Result<Self::Source, Self::Error> {
        let doc = Document::load_mem(bytes)?;
        // get_pages is keyed by 1-based page number
        let pages = doc.get_pages().into_values().collect();
        Ok(SourcePdf { doc, pages })
    }

    fn page_count(&self, source: &Self::Source) -> usize {
        source.page_count()
    }

    fn create_document(&self) -> Result<Self::Output, Self::Error> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        doc.objects.insert(
            pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0i64,
            }
            .into(),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Ok(OutputPdf {
            doc,
            pages_id,
            kids: Vec::new(),
            id_map: HashMap::new(),
        })
    }

    fn copy_page(
        &self,
        source: &Self::Source,
        dest: &mut Self::Output,
        original_index: usize,
    ) -> Result<Self::Page, Self::Error> {
        let page_id = *source
            .pages
            .get(original_index)
            .ok_or(PdfError::PageOutOfRange {
                index: original_index,
                count: source.pages.len(),
            })?;

        let page = detach_page(&source.doc, page_id)?;
        let new_id = ObjectCopier::new(&source.doc, &mut dest.doc, &mut dest.id_map).copy_page(page)?;
        dest.doc
            .get_object_mut(new_id)?
            .as_dict_mut()?
            .set("Parent", dest.pages_id);

        tracing::trace!(original_index, ?new_id, "Copied page");
        Ok(new_id)
    }

    fn rotation(&self, dest: &Self::Output, page: &Self::Page) -> Result<Rotation, Self::Error> {
        let dict = dest.doc.get_dictionary(*page)?;
        rotation_of(&dest.doc, dict.get(b"Rotate").ok())
    }

    fn set_rotation(
        &self,
        dest: &mut Self::Output,
        page: &Self::Page,
        rotation: Rotation,
    ) -> Result<(), Self::Error> {
        dest.doc
            .get_object_mut(*page)?
            .as_dict_mut()?
            .set("Rotate", i64::from(rotation.degrees()));
        Ok(())
    }

    fn append_page(&self, dest: &mut Self::Output, page: Self::Page) -> Result<(), Self::Error> {
        dest.kids.push(page);
        Ok(())
    }

    fn serialize(&self, mut dest: Self::Output) -> Result<Vec<u8>, Self::Error> {
        let kids: Vec<Object> = dest.kids.iter().map(|&id| Object::Reference(id)).collect();
        let count = kids.len() as i64;
        dest.doc.objects.insert(
            dest.pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }
            .into(),
        );

        if self.compress {
            dest.doc.compress();
        }

        let mut bytes = Vec::new();
        dest.doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

/// Clone a page dictionary with inherited attributes made explicit and its
/// `/Parent` link dropped.
fn detach_page(doc: &Document, page_id: ObjectId) -> Result<Dictionary, PdfError> {
    let mut page = doc.get_dictionary(page_id)?.clone();
    for key in INHERITABLE_KEYS {
        if page.has(key) {
            continue;
        }
        if let Some(value) = resolve_inherited(doc, page_id, key)? {
            page.set(key.to_vec(), value.clone());
        }
    }
    page.remove(b"Parent");
    Ok(page)
}
