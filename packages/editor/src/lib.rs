//! # Folio Editor
//!
//! Page-transformation state engine for a PDF page editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ renderer: source bytes → one preview/page   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: session lifecycle + page edits      │
//! │  - Rotate / delete / move / reorder pages   │
//! │  - Drag gestures resolved to reorders       │
//! │  - Save lock and stale-result rejection     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ pipeline: pages → new document via backend  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The source is read-only**: edits only touch page descriptors
//! 2. **Deletion is soft**: deleted pages keep their slot until save
//! 3. **Previews are rendered once**: rotation is a display transform
//! 4. **Saves are all or nothing**: a failed save changes nothing
//!
//! ## Usage
//!
//! ```rust,ignore
//! use folio_editor::{Editor, PageMutation};
//!
//! let mut editor = Editor::default();
//! let session = editor.load(&renderer, "report.pdf", bytes)?;
//!
//! let first = session.list()[0].page.id();
//! session.apply(PageMutation::Rotate { page: first })?;
//!
//! editor.save_with(&backend, &mut target)?;
//! ```

mod backend;
mod collection;
mod drag;
mod errors;
mod mutations;
mod options;
mod page;
mod pipeline;
mod session;
mod thumbnails;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use backend::{DocumentBackend, PageRenderer, SaveOutcome, SaveTarget};
pub use collection::{Direction, DropSide, EditOutcome, PageCollection, PageView};
pub use drag::{
    DragConfigError, DragController, DragEffect, DragEvent, DragInput, DragNoopReason, DragProxy,
    DragState, DragTransition, Point, PointerSurface, Rect, Slot, SlotLayout,
    DEFAULT_DRAG_THRESHOLD,
};
pub use errors::{
    BoxError, EditorError, LoadError, MissingSourcePage, MutationError, ReconstructionError,
    ReconstructionStage, SaveError, SessionError,
};
pub use mutations::{MutationResult, PageMutation};
pub use options::{EditorOptions, DEFAULT_NAME_PREFIX};
pub use page::{InvalidRotation, PageDescriptor, PageId, Rotation};
pub use pipeline::{reconstruct, PlanEntry, ReconstructedDocument, ReconstructionPlan};
pub use session::{EditSession, Editor, SaveCompletion, SaveTicket, SessionToken, SourceDocument};
pub use thumbnails::{Preview, PreviewRef, PreviewSize, Thumbnail, ThumbnailCache};
