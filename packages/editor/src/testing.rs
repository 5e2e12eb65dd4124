//! In-memory collaborators for tests.
//!
//! Source "documents" are byte strings with one byte per page; the byte is the
//! page's embedded rotation in quarter turns. Output documents serialize to
//! JSON `[[original_index, degrees], ...]`.

use std::cell::Cell;

use crate::backend::{DocumentBackend, PageRenderer, SaveOutcome, SaveTarget};
use crate::errors::SaveError;
use crate::page::Rotation;
use crate::session::SessionToken;
use crate::thumbnails::{Preview, PreviewSize, ThumbnailCache};
use crate::PageCollection;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("fake backend failure: {0}")]
pub struct FakeError(pub String);

/// Collection of `count` fresh pages
pub fn collection_of(count: usize) -> PageCollection {
    let previews = (0..count).map(|_| Preview::placeholder(PreviewSize::new(60.0, 84.0)));
    PageCollection::create(ThumbnailCache::populate(SessionToken::from_raw(0), previews).refs())
}

/// Source bytes for `count` unrotated pages
pub fn source_bytes(count: usize) -> Vec<u8> {
    vec![0; count]
}

/// Step at which a [`RecordingBackend`] fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Open,
    Create,
    Copy(usize),
    Rotate(usize),
    Append(usize),
    Serialize,
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    fail: Option<FailAt>,
    copies: Cell<usize>,
}

#[derive(Debug, Default)]
pub struct RecordingOutput {
    staged: Vec<(usize, Rotation)>,
    pages: Vec<(usize, Rotation)>,
}

impl RecordingBackend {
    pub fn failing(at: FailAt) -> Self {
        Self {
            fail: Some(at),
            copies: Cell::new(0),
        }
    }

    pub fn source_with_rotations(&self, rotations: &[Rotation]) -> Vec<Rotation> {
        rotations.to_vec()
    }

    /// Number of `copy_page` calls made so far
    pub fn copies(&self) -> usize {
        self.copies.get()
    }

    /// Pages of a serialized output, in order
    pub fn decode(bytes: &[u8]) -> Vec<(usize, Rotation)> {
        let raw: Vec<(usize, i64)> = serde_json::from_slice(bytes).unwrap_or_default();
        raw.into_iter()
            .filter_map(|(index, degrees)| Rotation::from_degrees(degrees).ok().map(|r| (index, r)))
            .collect()
    }

    fn check(&self, step: FailAt) -> Result<(), FakeError> {
        if self.fail == Some(step) {
            Err(FakeError(format!("{:?}", step)))
        } else {
            Ok(())
        }
    }
}

impl DocumentBackend for RecordingBackend {
    type Source = Vec<Rotation>;
    type Output = RecordingOutput;
    type Page = usize;
    type Error = FakeError;

    fn open(&self, bytes: &[u8]) -> Result<Self::Source, Self::Error> {
        self.check(FailAt::Open)?;
        Ok(bytes
            .iter()
            .map(|&turns| Rotation::ALL[turns as usize % 4])
            .collect())
    }

    fn page_count(&self, source: &Self::Source) -> usize {
        source.len()
    }

    fn create_document(&self) -> Result<Self::Output, Self::Error> {
        self.check(FailAt::Create)?;
        Ok(RecordingOutput::default())
    }

    fn copy_page(
        &self,
        source: &Self::Source,
        dest: &mut Self::Output,
        original_index: usize,
    ) -> Result<Self::Page, Self::Error> {
        self.check(FailAt::Copy(original_index))?;
        let rotation = source
            .get(original_index)
            .copied()
            .ok_or_else(|| FakeError(format!("no page {}", original_index)))?;
        self.copies.set(self.copies.get() + 1);
        dest.staged.push((original_index, rotation));
        Ok(dest.staged.len() - 1)
    }

    fn rotation(&self, dest: &Self::Output, page: &Self::Page) -> Result<Rotation, Self::Error> {
        dest.staged
            .get(*page)
            .map(|(_, rotation)| *rotation)
            .ok_or_else(|| FakeError("unknown page handle".to_string()))
    }

    fn set_rotation(
        &self,
        dest: &mut Self::Output,
        page: &Self::Page,
        rotation: Rotation,
    ) -> Result<(), Self::Error> {
        let staged = dest
            .staged
            .get_mut(*page)
            .ok_or_else(|| FakeError("unknown page handle".to_string()))?;
        self.check(FailAt::Rotate(staged.0))?;
        staged.1 = rotation;
        Ok(())
    }

    fn append_page(&self, dest: &mut Self::Output, page: Self::Page) -> Result<(), Self::Error> {
        let staged = *dest
            .staged
            .get(page)
            .ok_or_else(|| FakeError("unknown page handle".to_string()))?;
        self.check(FailAt::Append(staged.0))?;
        dest.pages.push(staged);
        Ok(())
    }

    fn serialize(&self, dest: Self::Output) -> Result<Vec<u8>, Self::Error> {
        self.check(FailAt::Serialize)?;
        let raw: Vec<(usize, u16)> = dest
            .pages
            .iter()
            .map(|(index, rotation)| (*index, rotation.degrees()))
            .collect();
        serde_json::to_vec(&raw).map_err(|e| FakeError(e.to_string()))
    }
}

/// One placeholder preview per source byte
#[derive(Debug, Default)]
pub struct VecRenderer {
    pub fail: bool,
}

impl PageRenderer for VecRenderer {
    type Error = FakeError;

    fn render(&self, source: &[u8]) -> Result<Vec<Preview>, Self::Error> {
        if self.fail {
            return Err(FakeError("cannot render".to_string()));
        }
        Ok(source
            .iter()
            .map(|_| Preview::new(PreviewSize::new(60.0, 84.0), vec![0xFF]))
            .collect())
    }
}

/// Save target that keeps everything in memory
#[derive(Debug, Default)]
pub struct MemorySaveTarget {
    pub saved: Vec<(String, Vec<u8>)>,
    pub cancel: bool,
}

impl SaveTarget for MemorySaveTarget {
    fn save(&mut self, bytes: &[u8], suggested_name: &str) -> Result<SaveOutcome, SaveError> {
        if self.cancel {
            return Ok(SaveOutcome::Cancelled);
        }
        self.saved.push((suggested_name.to_string(), bytes.to_vec()));
        Ok(SaveOutcome::Persisted(suggested_name.into()))
    }
}
