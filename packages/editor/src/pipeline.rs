//! # Reconstruction Pipeline
//!
//! Replays the current page state against the untouched source document:
//!
//! ```text
//! PageCollection → ReconstructionPlan → DocumentBackend → bytes → SaveTarget
//!                  (snapshot)           create/copy/rotate/append/serialize
//! ```
//!
//! The plan is a plain snapshot, so it can be executed off the UI thread while
//! the collection stays locked. Rotation is additive: each emitted page gets
//! `source rotation + descriptor rotation`.

use serde::Serialize;

use crate::backend::DocumentBackend;
use crate::collection::PageCollection;
use crate::errors::{MissingSourcePage, ReconstructionError, ReconstructionStage};
use crate::page::{PageId, Rotation};

/// One page to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub page: PageId,
    pub original_index: usize,
    pub rotation: Rotation,
}

/// Frozen description of the output document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconstructionPlan {
    entries: Vec<PlanEntry>,
    suggested_name: String,
}

/// Output of a successful reconstruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub suggested_name: String,
}

impl ReconstructionPlan {
    /// Kept pages in display order; deleted pages are left out entirely.
    pub fn from_collection(pages: &PageCollection, suggested_name: impl Into<String>) -> Self {
        let entries = pages
            .iter()
            .filter(|page| !page.is_deleted())
            .map(|page| PlanEntry {
                page: page.id(),
                original_index: page.original_index(),
                rotation: page.rotation(),
            })
            .collect();

        Self {
            entries,
            suggested_name: suggested_name.into(),
        }
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn suggested_name(&self) -> &str {
        &self.suggested_name
    }

    /// Build the output document.
    ///
    /// Nothing is returned unless every step succeeds. An empty plan yields a
    /// valid zero-page document.
    pub fn execute<B: DocumentBackend>(
        &self,
        backend: &B,
        source: &B::Source,
    ) -> Result<ReconstructedDocument, ReconstructionError> {
        use ReconstructionStage as Stage;

        let mut dest = backend
            .create_document()
            .map_err(ReconstructionError::at(Stage::CreateDocument))?;
        let count = backend.page_count(source);

        for entry in &self.entries {
            let original_index = entry.original_index;
            if original_index >= count {
                return Err(ReconstructionError::at(Stage::CopyPage { original_index })(
                    MissingSourcePage {
                        index: original_index,
                        count,
                    },
                ));
            }

            let page = backend
                .copy_page(source, &mut dest, original_index)
                .map_err(ReconstructionError::at(Stage::CopyPage { original_index }))?;

            let intrinsic = backend
                .rotation(&dest, &page)
                .map_err(ReconstructionError::at(Stage::ReadRotation { original_index }))?;

            backend
                .set_rotation(&mut dest, &page, intrinsic.compose(entry.rotation))
                .map_err(ReconstructionError::at(Stage::SetRotation { original_index }))?;

            backend
                .append_page(&mut dest, page)
                .map_err(ReconstructionError::at(Stage::AppendPage { original_index }))?;
        }

        let bytes = backend
            .serialize(dest)
            .map_err(ReconstructionError::at(Stage::Serialize))?;

        tracing::debug!(pages = self.entries.len(), bytes = bytes.len(), "Reconstructed document");

        Ok(ReconstructedDocument {
            bytes,
            page_count: self.entries.len(),
            suggested_name: self.suggested_name.clone(),
        })
    }
}

/// Snapshot `pages` and execute the plan in one go.
pub fn reconstruct<B: DocumentBackend>(
    backend: &B,
    source: &B::Source,
    pages: &PageCollection,
    suggested_name: impl Into<String>,
) -> Result<ReconstructedDocument, ReconstructionError> {
    ReconstructionPlan::from_collection(pages, suggested_name).execute(backend, source)
}
