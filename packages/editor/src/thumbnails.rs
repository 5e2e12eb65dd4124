//! # Thumbnail Cache
//!
//! Holds the previews produced by the rendering collaborator at load time.
//! Previews are rendered once per session and never regenerated: rotating a
//! page only changes the display transform returned by [`ThumbnailCache::thumbnail`].

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::page::{PageDescriptor, Rotation};
use crate::session::SessionToken;

/// Intrinsic size of a rendered preview, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewSize {
    pub width: f32,
    pub height: f32,
}

impl PreviewSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Size after applying a display rotation
    pub fn rotated(self, rotation: Rotation) -> Self {
        if rotation.is_sideways() {
            Self::new(self.height, self.width)
        } else {
            self
        }
    }
}

/// One rendered page preview, as delivered by a [`crate::PageRenderer`]
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub size: PreviewSize,

    /// Encoded bitmap (format is up to the renderer); empty for placeholders
    pub image: Arc<[u8]>,
}

impl Preview {
    pub fn new(size: PreviewSize, image: impl Into<Arc<[u8]>>) -> Self {
        Self {
            size,
            image: image.into(),
        }
    }

    /// Size-only preview with no bitmap
    pub fn placeholder(size: PreviewSize) -> Self {
        Self {
            size,
            image: Arc::from(Vec::new()),
        }
    }

    pub fn has_image(&self) -> bool {
        !self.image.is_empty()
    }
}

/// Handle into a [`ThumbnailCache`]
///
/// Only meaningful for the cache (and session) that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreviewRef {
    session: SessionToken,
    slot: u32,
}

/// What a UI needs to draw one page: the cached bitmap plus the CSS-style
/// rotation to apply on top of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail<'a> {
    pub preview: &'a Preview,
    pub rotation: Rotation,
    pub deleted: bool,
}

impl Thumbnail<'_> {
    /// Bounding box of the preview once rotated for display
    pub fn display_size(&self) -> PreviewSize {
        self.preview.size.rotated(self.rotation)
    }
}

/// Previews for the live session, keyed by page identity
#[derive(Debug)]
pub struct ThumbnailCache {
    session: SessionToken,
    previews: Vec<Preview>,
}

impl ThumbnailCache {
    /// Take ownership of every preview the renderer produced, in source order.
    pub fn populate(session: SessionToken, previews: impl IntoIterator<Item = Preview>) -> Self {
        Self {
            session,
            previews: previews.into_iter().collect(),
        }
    }

    /// Handles for all cached previews, in source page order.
    ///
    /// The collection is created from these, so descriptor `n` refers to the
    /// `n`-th preview.
    pub fn refs(&self) -> Vec<PreviewRef> {
        (0..self.previews.len() as u32)
            .map(|slot| PreviewRef {
                session: self.session,
                slot,
            })
            .collect()
    }

    pub fn session(&self) -> SessionToken {
        self.session
    }

    pub fn len(&self) -> usize {
        self.previews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.previews.is_empty()
    }

    /// Resolve a handle. Handles issued by another session resolve to `None`.
    pub fn get(&self, preview: PreviewRef) -> Option<&Preview> {
        if preview.session != self.session {
            return None;
        }
        self.previews.get(preview.slot as usize)
    }

    /// Cached bitmap plus display transform for a descriptor
    pub fn thumbnail(&self, page: &PageDescriptor) -> Option<Thumbnail<'_>> {
        self.get(page.preview()).map(|preview| Thumbnail {
            preview,
            rotation: page.rotation(),
            deleted: page.is_deleted(),
        })
    }
}
