//! # Page Collection Engine
//!
//! Owns every [`PageDescriptor`] of the loaded document and the display order
//! over them.
//!
//! ## Invariants
//!
//! - `order` is always a permutation of the ids created at load time
//! - descriptors live in an arena indexed by id; `original_index` never changes
//! - deletion is a flag, never a removal from `order`
//!
//! ## Ignored operations
//!
//! `move_page` and `reorder` absorb out-of-range or unknown targets and report
//! [`EditOutcome::Ignored`]. UIs are expected to disable those controls already,
//! so this is not an error.

use serde::{Deserialize, Serialize};

use crate::page::{PageDescriptor, PageId, Rotation};
use crate::thumbnails::PreviewRef;
use crate::MutationError;

/// Step direction for [`PageCollection::move_page`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Towards the start (-1)
    Backward,
    /// Towards the end (+1)
    Forward,
}

impl Direction {
    fn target(self, index: usize) -> Option<usize> {
        match self {
            Direction::Backward => index.checked_sub(1),
            Direction::Forward => index.checked_add(1),
        }
    }
}

/// Where a reordered page lands relative to its drop target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropSide {
    Before,
    After,
}

/// Whether an engine call changed anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    Ignored,
}

impl EditOutcome {
    pub fn is_applied(self) -> bool {
        self == EditOutcome::Applied
    }
}

/// Read-only row of [`PageCollection::list`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub display_index: usize,
    pub page: PageDescriptor,
    pub can_move_backward: bool,
    pub can_move_forward: bool,
}

/// Ordered, editable view over the pages of one source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCollection {
    /// Arena; `pages[id]` is the descriptor with that id
    pages: Vec<PageDescriptor>,

    /// Current display order
    order: Vec<PageId>,
}

impl PageCollection {
    /// One descriptor per preview; ids and original indices follow preview order.
    pub fn create(previews: impl IntoIterator<Item = PreviewRef>) -> Self {
        let pages: Vec<PageDescriptor> = previews
            .into_iter()
            .enumerate()
            .map(|(index, preview)| PageDescriptor::new(PageId::new(index as u32), index, preview))
            .collect();
        let order = pages.iter().map(PageDescriptor::id).collect();

        Self { pages, order }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: PageId) -> bool {
        id.slot() < self.pages.len()
    }

    pub fn get(&self, id: PageId) -> Option<&PageDescriptor> {
        self.pages.get(id.slot())
    }

    fn get_mut(&mut self, id: PageId) -> Result<&mut PageDescriptor, MutationError> {
        self.pages
            .get_mut(id.slot())
            .ok_or(MutationError::UnknownPage(id))
    }

    /// Current display order
    pub fn ids(&self) -> &[PageId] {
        &self.order
    }

    /// Current display position of a page
    pub fn position(&self, id: PageId) -> Option<usize> {
        self.order.iter().position(|&p| p == id)
    }

    /// Descriptor currently shown at `index`
    pub fn at(&self, index: usize) -> Option<&PageDescriptor> {
        self.order.get(index).and_then(|&id| self.get(id))
    }

    /// Rotate a page a quarter turn clockwise and return the new rotation.
    pub fn rotate(&mut self, id: PageId) -> Result<Rotation, MutationError> {
        let page = self.get_mut(id)?;
        page.rotation = page.rotation.rotated_clockwise();
        Ok(page.rotation)
    }

    /// Flip the soft-delete flag and return the new value.
    pub fn toggle_deleted(&mut self, id: PageId) -> Result<bool, MutationError> {
        let page = self.get_mut(id)?;
        page.deleted = !page.deleted;
        Ok(page.deleted)
    }

    /// Swap the page at `index` with its neighbour in `direction`.
    pub fn move_page(&mut self, index: usize, direction: Direction) -> EditOutcome {
        let target = direction.target(index).filter(|&t| t < self.order.len());

        match target {
            Some(target) if index < self.order.len() => {
                self.order.swap(index, target);
                EditOutcome::Applied
            }
            _ => {
                tracing::debug!(index, ?direction, len = self.order.len(), "Move out of range ignored");
                EditOutcome::Ignored
            }
        }
    }

    /// Move `source` next to `target`.
    ///
    /// The side follows the drag direction: a page dragged towards the end
    /// lands after the target, one dragged towards the start lands before it.
    /// The source thereby takes over the target's display index.
    pub fn reorder(&mut self, source: PageId, target: PageId) -> EditOutcome {
        let (Some(from), Some(to)) = (self.position(source), self.position(target)) else {
            tracing::debug!(%source, %target, "Reorder with unknown page ignored");
            return EditOutcome::Ignored;
        };

        let side = if from < to { DropSide::After } else { DropSide::Before };
        self.reorder_to(source, target, side)
    }

    /// Move `source` immediately before or after `target`.
    pub fn reorder_to(&mut self, source: PageId, target: PageId, side: DropSide) -> EditOutcome {
        if source == target {
            return EditOutcome::Ignored;
        }
        let (Some(from), Some(_)) = (self.position(source), self.position(target)) else {
            tracing::debug!(%source, %target, "Reorder with unknown page ignored");
            return EditOutcome::Ignored;
        };

        let before = self.order.clone();
        self.order.remove(from);

        // Target position after the source was taken out
        let anchor = self
            .order
            .iter()
            .position(|&p| p == target)
            .unwrap_or(self.order.len());
        let insert_at = match side {
            DropSide::Before => anchor,
            DropSide::After => anchor + 1,
        };
        self.order.insert(insert_at, source);

        debug_assert!(self.is_permutation());
        if self.order == before {
            EditOutcome::Ignored
        } else {
            EditOutcome::Applied
        }
    }

    /// Recomputed view for rendering, in display order.
    pub fn list(&self) -> Vec<PageView> {
        let last = self.order.len().saturating_sub(1);
        self.order
            .iter()
            .enumerate()
            .filter_map(|(display_index, &id)| {
                self.get(id).map(|page| PageView {
                    display_index,
                    page: *page,
                    can_move_backward: display_index > 0,
                    can_move_forward: display_index < last,
                })
            })
            .collect()
    }

    /// Descriptors in display order
    pub fn iter(&self) -> impl Iterator<Item = &PageDescriptor> + '_ {
        self.order.iter().filter_map(move |&id| self.get(id))
    }

    /// Pages that would be emitted on save
    pub fn kept_count(&self) -> usize {
        self.pages.iter().filter(|p| !p.is_deleted()).count()
    }

    /// No page has been rotated, deleted or moved
    pub fn is_pristine(&self) -> bool {
        self.pages.iter().all(PageDescriptor::is_pristine)
            && self.order.iter().enumerate().all(|(i, id)| id.slot() == i)
    }

    /// `order` contains every arena id exactly once.
    pub fn is_permutation(&self) -> bool {
        if self.order.len() != self.pages.len() {
            return false;
        }
        let mut seen = vec![false; self.pages.len()];
        for id in &self.order {
            match seen.get_mut(id.slot()) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }
}
