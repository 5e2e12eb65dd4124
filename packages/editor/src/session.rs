//! # Edit Session Management
//!
//! An [`EditSession`] is everything that exists while one source document is
//! loaded: its page collection, thumbnail cache and drag controller. The
//! [`Editor`] owns at most one session and guards saves:
//!
//! - loading a document replaces the session wholesale
//! - while a save is in flight every mutation entry point is locked
//! - a second save request is rejected, not queued
//! - results arriving for a discarded or replaced session are dropped
//!
//! Saving is split into [`Editor::begin_save`] (snapshot + lock) and
//! [`Editor::finish_save`] (unlock), so the reconstruction itself can run on
//! any executor in between.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::backend::{DocumentBackend, PageRenderer, SaveOutcome, SaveTarget};
use crate::collection::{Direction, EditOutcome, PageCollection, PageView};
use crate::drag::{DragController, DragEffect, DragEvent, DragTransition, SlotLayout};
use crate::errors::{
    EditorError, LoadError, MutationError, ReconstructionError, ReconstructionStage, SessionError,
};
use crate::mutations::{MutationResult, PageMutation};
use crate::options::EditorOptions;
use crate::page::{PageId, Rotation};
use crate::pipeline::{ReconstructedDocument, ReconstructionPlan};
use crate::thumbnails::{Thumbnail, ThumbnailCache};

/// Monotonic identity of a loaded session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(u64);

impl SessionToken {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// The loaded source document. Never modified, only read and copied from.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

/// Editing state for one loaded document
#[derive(Debug)]
pub struct EditSession {
    token: SessionToken,
    source: SourceDocument,
    pages: PageCollection,
    thumbnails: ThumbnailCache,
    drag: DragController,

    /// Increments on each applied mutation
    version: u64,

    /// A reconstruction is in flight
    saving: bool,
}

impl EditSession {
    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn source(&self) -> &SourceDocument {
        &self.source
    }

    pub fn pages(&self) -> &PageCollection {
        &self.pages
    }

    pub fn thumbnails(&self) -> &ThumbnailCache {
        &self.thumbnails
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn list(&self) -> Vec<PageView> {
        self.pages.list()
    }

    pub fn thumbnail(&self, id: PageId) -> Option<Thumbnail<'_>> {
        self.pages
            .get(id)
            .and_then(|page| self.thumbnails.thumbnail(page))
    }

    /// Apply a mutation unless a save holds the lock.
    pub fn apply(&mut self, mutation: PageMutation) -> Result<MutationResult, MutationError> {
        if self.saving {
            tracing::debug!(mutation = mutation.name(), "Mutation rejected during save");
            return Err(MutationError::Locked);
        }

        let outcome = mutation.apply(&mut self.pages)?;
        if outcome.is_applied() {
            self.version += 1;
        }
        Ok(MutationResult {
            version: self.version,
            outcome,
        })
    }

    pub fn rotate(&mut self, page: PageId) -> Result<Rotation, MutationError> {
        self.apply(PageMutation::Rotate { page })?;
        self.pages
            .get(page)
            .map(|p| p.rotation())
            .ok_or(MutationError::UnknownPage(page))
    }

    pub fn toggle_deleted(&mut self, page: PageId) -> Result<bool, MutationError> {
        self.apply(PageMutation::ToggleDeleted { page })?;
        self.pages
            .get(page)
            .map(|p| p.is_deleted())
            .ok_or(MutationError::UnknownPage(page))
    }

    pub fn move_page(&mut self, index: usize, direction: Direction) -> Result<EditOutcome, MutationError> {
        Ok(self.apply(PageMutation::Move { index, direction })?.outcome)
    }

    pub fn reorder(&mut self, source: PageId, target: PageId) -> Result<EditOutcome, MutationError> {
        Ok(self
            .apply(PageMutation::Reorder {
                source,
                target,
                side: None,
            })?
            .outcome)
    }

    /// Grid geometry for drop-target resolution
    pub fn set_layout(&mut self, layout: SlotLayout) {
        self.drag.set_layout(layout);
    }

    /// Feed one gesture event to the drag controller.
    ///
    /// While a save is in flight any active drag is cancelled and the event
    /// is rejected.
    pub fn drag_event(&mut self, event: DragEvent) -> Result<DragTransition, MutationError> {
        if self.saving {
            self.drag.cancel(&self.pages);
            return Err(MutationError::Locked);
        }

        let transition = self.drag.handle(event, &mut self.pages);
        if let DragEffect::Committed {
            outcome: EditOutcome::Applied,
            ..
        } = transition.effect
        {
            self.version += 1;
        }
        Ok(transition)
    }
}

/// Everything needed to run one reconstruction away from the editor
#[derive(Debug, Clone)]
pub struct SaveTicket {
    pub token: SessionToken,
    pub plan: ReconstructionPlan,
    pub source: Arc<[u8]>,
}

impl SaveTicket {
    /// Open the source and execute the plan against it.
    pub fn run<B: DocumentBackend>(
        &self,
        backend: &B,
    ) -> Result<ReconstructedDocument, ReconstructionError> {
        let source = backend
            .open(&self.source)
            .map_err(ReconstructionError::at(ReconstructionStage::OpenSource))?;
        self.plan.execute(backend, &source)
    }
}

/// How [`Editor::finish_save`] disposed of a result
#[derive(Debug)]
pub enum SaveCompletion {
    Completed(ReconstructedDocument),
    /// Collection unchanged, the save can be retried
    Failed(ReconstructionError),
    /// The session that asked for this save is gone; result dropped
    Stale { token: SessionToken },
}

/// Owner of the (single) live session
#[derive(Debug)]
pub struct Editor {
    options: EditorOptions,
    next_token: u64,
    session: Option<EditSession>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorOptions::default())
    }
}

impl Editor {
    pub fn new(options: EditorOptions) -> Self {
        Self {
            options,
            next_token: 0,
            session: None,
        }
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut EditSession> {
        self.session.as_mut()
    }

    /// Render `bytes` into previews and start a new session over them.
    ///
    /// Any previous session is discarded first, even if rendering fails.
    pub fn load<R: PageRenderer>(
        &mut self,
        renderer: &R,
        name: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<&mut EditSession, EditorError> {
        let name = name.into();
        let bytes = bytes.into();

        self.discard();
        self.next_token += 1;
        let token = SessionToken(self.next_token);

        let previews = renderer.render(&bytes).map_err(|e| LoadError::Render {
            name: name.clone(),
            source: Box::new(e),
        })?;

        let thumbnails = ThumbnailCache::populate(token, previews);
        let pages = PageCollection::create(thumbnails.refs());
        let drag = DragController::new(self.options.drag_threshold).unwrap_or_else(|e| {
            tracing::warn!("{}, using default", e);
            DragController::default()
        });

        tracing::info!(%token, name = %name, pages = pages.len(), "Loaded document");

        Ok(self.session.insert(EditSession {
            token,
            source: SourceDocument { name, bytes },
            pages,
            thumbnails,
            drag,
            version: 0,
            saving: false,
        }))
    }

    /// Drop the live session, its pages and its thumbnails.
    pub fn discard(&mut self) -> Option<SessionToken> {
        let session = self.session.take()?;
        tracing::debug!(token = %session.token, "Discarded session");
        Some(session.token)
    }

    /// Output file name for the live session
    pub fn suggested_name(&self) -> Option<String> {
        self.session
            .as_ref()
            .map(|s| self.options.suggested_name(&s.source.name))
    }

    /// Snapshot the pages and lock the session until [`Editor::finish_save`].
    pub fn begin_save(&mut self) -> Result<SaveTicket, SessionError> {
        let name = self.suggested_name().ok_or(SessionError::NoSession)?;
        let session = self.session.as_mut().ok_or(SessionError::NoSession)?;

        if session.saving {
            tracing::debug!(token = %session.token, "Save rejected, one is already running");
            return Err(SessionError::SaveInProgress);
        }
        session.drag.cancel(&session.pages);
        session.saving = true;

        let plan = ReconstructionPlan::from_collection(&session.pages, name);
        tracing::info!(token = %session.token, pages = plan.entries().len(), "Save started");

        Ok(SaveTicket {
            token: session.token,
            plan,
            source: Arc::clone(&session.source.bytes),
        })
    }

    /// Unlock the session that issued `token` and hand back the result.
    pub fn finish_save(
        &mut self,
        token: SessionToken,
        result: Result<ReconstructedDocument, ReconstructionError>,
    ) -> SaveCompletion {
        let Some(session) = self.session.as_mut().filter(|s| s.token == token) else {
            tracing::warn!(%token, "Dropping save result for a discarded session");
            return SaveCompletion::Stale { token };
        };
        session.saving = false;

        match result {
            Ok(document) => {
                tracing::info!(%token, pages = document.page_count, bytes = document.bytes.len(), "Save finished");
                SaveCompletion::Completed(document)
            }
            Err(e) => {
                tracing::warn!(%token, "Save failed: {}", e);
                SaveCompletion::Failed(e)
            }
        }
    }

    /// Reconstruct synchronously and pass the bytes to `target`.
    pub fn save_with<B: DocumentBackend, S: SaveTarget>(
        &mut self,
        backend: &B,
        target: &mut S,
    ) -> Result<SaveOutcome, EditorError> {
        let ticket = self.begin_save()?;
        let result = ticket.run(backend);

        match self.finish_save(ticket.token, result) {
            SaveCompletion::Completed(document) => {
                Ok(target.save(&document.bytes, &document.suggested_name)?)
            }
            SaveCompletion::Failed(e) => Err(e.into()),
            SaveCompletion::Stale { .. } => Err(SessionError::NoSession.into()),
        }
    }
}
