//! # Collaborator Interfaces
//!
//! The editor never touches document bytes itself. Parsing, page copying,
//! serialization, rasterization and persistence are delegated to the traits
//! below so that any document library can sit behind them.

use std::path::PathBuf;

use crate::errors::SaveError;
use crate::page::Rotation;
use crate::thumbnails::Preview;

/// Rasterizes a source document into one preview per page.
pub trait PageRenderer {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Previews in source page order. The returned sequence is consumed once.
    fn render(&self, source: &[u8]) -> Result<Vec<Preview>, Self::Error>;
}

/// Document library used by the reconstruction pipeline.
///
/// Every call may fail; a failure aborts the whole reconstruction.
pub trait DocumentBackend {
    /// Parsed, read-only source document
    type Source;
    /// Destination document under construction
    type Output;
    /// Handle to a page copied into an output document
    type Page;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Parse source bytes.
    fn open(&self, bytes: &[u8]) -> Result<Self::Source, Self::Error>;

    /// Number of pages in a parsed source
    fn page_count(&self, source: &Self::Source) -> usize;

    /// Empty destination document.
    fn create_document(&self) -> Result<Self::Output, Self::Error>;

    /// Copy source page `original_index` into `dest` without appending it yet.
    fn copy_page(
        &self,
        source: &Self::Source,
        dest: &mut Self::Output,
        original_index: usize,
    ) -> Result<Self::Page, Self::Error>;

    /// Rotation the copied page already carries (from the source).
    fn rotation(&self, dest: &Self::Output, page: &Self::Page) -> Result<Rotation, Self::Error>;

    fn set_rotation(
        &self,
        dest: &mut Self::Output,
        page: &Self::Page,
        rotation: Rotation,
    ) -> Result<(), Self::Error>;

    fn append_page(&self, dest: &mut Self::Output, page: Self::Page) -> Result<(), Self::Error>;

    fn serialize(&self, dest: Self::Output) -> Result<Vec<u8>, Self::Error>;
}

/// Result of handing output bytes to a [`SaveTarget`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Persisted(PathBuf),
    Cancelled,
}

/// Persists reconstructed bytes (file dialog, file system, upload...).
pub trait SaveTarget {
    fn save(&mut self, bytes: &[u8], suggested_name: &str) -> Result<SaveOutcome, SaveError>;
}
