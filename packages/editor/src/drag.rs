//! # Drag-Reorder Controller
//!
//! Turns pointer and keyboard gestures into [`PageCollection::reorder`] calls.
//!
//! ```text
//! Idle -> Armed -> Dragging -> Idle [+ reorder]   (released over the grid)
//!           \          \-----> Idle [no mutation] (released outside / cancelled)
//!            \--------------> Idle               (click, threshold never crossed)
//! ```
//!
//! The controller never reorders the collection while a drag is in flight.
//! [`DragController::speculative_order`] and [`DragController::proxy`] give the
//! UI everything it needs to draw the lifted page detached from the grid.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collection::{EditOutcome, PageCollection};
use crate::page::{PageDescriptor, PageId};

/// Pointer travel (px) before a press becomes a drag
pub const DEFAULT_DRAG_THRESHOLD: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Rect::new(x, y, right - x, bottom - y)
    }
}

/// On-screen slot of one page in the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub page: PageId,
    pub rect: Rect,
}

/// Current grid geometry, supplied by the UI after each layout pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotLayout {
    bounds: Option<Rect>,
    slots: Vec<Slot>,
}

impl SlotLayout {
    /// Grid bounds are the union of all slots.
    pub fn new(slots: Vec<Slot>) -> Self {
        let bounds = slots
            .iter()
            .map(|s| s.rect)
            .reduce(|acc, rect| acc.union(&rect));
        Self { bounds, slots }
    }

    /// Explicit grid bounds (e.g. including gutters and padding)
    pub fn with_bounds(bounds: Rect, slots: Vec<Slot>) -> Self {
        Self {
            bounds: Some(bounds),
            slots,
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, page: PageId) -> Option<&Slot> {
        self.slots.iter().find(|s| s.page == page)
    }

    /// Whether `point` is a valid place to drop
    pub fn contains(&self, point: Point) -> bool {
        self.bounds.is_some_and(|b| b.contains(point))
    }

    /// Slot whose center is nearest to `point`; ties go to the earlier slot.
    pub fn closest_center(&self, point: Point) -> Option<PageId> {
        self.slots
            .iter()
            .map(|slot| (slot.page, slot.rect.center().distance(point)))
            .fold(None, |best: Option<(PageId, f32)>, (page, dist)| match best {
                Some((_, best_dist)) if best_dist <= dist => best,
                _ => Some((page, dist)),
            })
            .map(|(page, _)| page)
    }

    /// Drop target for a pointer position, `None` outside the grid
    fn drop_target(&self, point: Point) -> Option<PageId> {
        if self.contains(point) {
            self.closest_center(point)
        } else {
            None
        }
    }
}

/// Element the pointer went down on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerSurface {
    /// The page card itself (draggable)
    Page,
    /// A per-page button; never starts a drag
    Control,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DragEvent {
    PointerDown {
        page: PageId,
        position: Point,
        surface: PointerSurface,
    },
    PointerMove {
        position: Point,
    },
    PointerUp {
        position: Point,
    },
    PointerCancel,
    /// Keyboard pick-up of the focused page
    KeyPickUp {
        page: PageId,
    },
    /// Move the prospective drop target through display order
    KeyStep {
        offset: isize,
    },
    KeyDrop,
    KeyCancel,
}

/// Which sensor drives the active drag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragInput {
    Pointer,
    Keyboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DragState {
    #[default]
    Idle,
    Armed {
        page: PageId,
        origin: Point,
    },
    Dragging {
        active: PageId,
        input: DragInput,
        origin: Point,
        current: Point,
        over: Option<PageId>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragNoopReason {
    IdleWithoutActiveDrag,
    ControlSurface,
    UnknownPage,
    DragAlreadyInProgress,
    ThresholdNotReached,
    WrongInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEffect {
    Armed {
        page: PageId,
    },
    /// Armed press released or cancelled before it became a drag
    Disarmed {
        page: PageId,
    },
    DragStarted {
        active: PageId,
        over: Option<PageId>,
    },
    DragUpdated {
        active: PageId,
        over: Option<PageId>,
    },
    /// Dropped over a page; the collection was asked to reorder
    Committed {
        source: PageId,
        target: PageId,
        outcome: EditOutcome,
    },
    /// No valid target; the proxy returns to its confirmed slot
    Returned {
        active: PageId,
        display_index: Option<usize>,
    },
    Noop {
        reason: DragNoopReason,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragTransition {
    pub from: DragState,
    pub to: DragState,
    pub effect: DragEffect,
}

/// Detached visual for the lifted page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragProxy {
    pub page: PageDescriptor,
    /// Last confirmed display position of the page
    pub home_index: usize,
    pub position: Point,
    pub over: Option<PageId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DragConfigError {
    #[error("Drag threshold must be a finite, non-negative distance, got {0}")]
    InvalidThreshold(f32),
}

#[derive(Debug, Clone)]
pub struct DragController {
    state: DragState,
    threshold: f32,
    layout: SlotLayout,
}

impl Default for DragController {
    fn default() -> Self {
        Self {
            state: DragState::Idle,
            threshold: DEFAULT_DRAG_THRESHOLD,
            layout: SlotLayout::default(),
        }
    }
}

impl DragController {
    pub fn new(threshold: f32) -> Result<Self, DragConfigError> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(DragConfigError::InvalidThreshold(threshold));
        }
        Ok(Self {
            threshold,
            ..Self::default()
        })
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Page being dragged, if any
    pub fn active(&self) -> Option<PageId> {
        match self.state {
            DragState::Dragging { active, .. } => Some(active),
            _ => None,
        }
    }

    pub fn layout(&self) -> &SlotLayout {
        &self.layout
    }

    pub fn set_layout(&mut self, layout: SlotLayout) {
        self.layout = layout;
    }

    /// Proxy to draw above the grid while dragging
    pub fn proxy(&self, pages: &PageCollection) -> Option<DragProxy> {
        let DragState::Dragging {
            active,
            current,
            over,
            ..
        } = self.state
        else {
            return None;
        };

        Some(DragProxy {
            page: *pages.get(active)?,
            home_index: pages.position(active)?,
            position: current,
            over,
        })
    }

    /// Display order as it would look if the page were dropped now.
    ///
    /// Not authoritative; the collection itself is untouched until the drop.
    pub fn speculative_order(&self, pages: &PageCollection) -> Vec<PageId> {
        match self.state {
            DragState::Dragging {
                active,
                over: Some(over),
                ..
            } => {
                let mut preview = pages.clone();
                preview.reorder(active, over);
                preview.ids().to_vec()
            }
            _ => pages.ids().to_vec(),
        }
    }

    /// Abandon any press or drag without touching the collection.
    pub fn cancel(&mut self, pages: &PageCollection) -> DragTransition {
        self.release(pages)
    }

    pub fn handle(&mut self, event: DragEvent, pages: &mut PageCollection) -> DragTransition {
        let from = self.state;

        let effect = match (self.state, event) {
            // Idle
            (DragState::Idle, DragEvent::PointerDown { surface: PointerSurface::Control, .. }) => {
                noop(DragNoopReason::ControlSurface)
            }
            (DragState::Idle, DragEvent::PointerDown { page, position, .. }) => {
                if !pages.contains(page) {
                    noop(DragNoopReason::UnknownPage)
                } else {
                    self.state = DragState::Armed {
                        page,
                        origin: position,
                    };
                    DragEffect::Armed { page }
                }
            }
            (DragState::Idle, DragEvent::KeyPickUp { page }) => {
                if !pages.contains(page) {
                    noop(DragNoopReason::UnknownPage)
                } else {
                    let position = self.slot_center(page);
                    self.state = DragState::Dragging {
                        active: page,
                        input: DragInput::Keyboard,
                        origin: position,
                        current: position,
                        over: Some(page),
                    };
                    DragEffect::DragStarted {
                        active: page,
                        over: Some(page),
                    }
                }
            }
            (DragState::Idle, _) => noop(DragNoopReason::IdleWithoutActiveDrag),

            // Armed
            (DragState::Armed { page, origin }, DragEvent::PointerMove { position }) => {
                if origin.distance(position) > self.threshold {
                    let over = self.layout.drop_target(position);
                    self.state = DragState::Dragging {
                        active: page,
                        input: DragInput::Pointer,
                        origin,
                        current: position,
                        over,
                    };
                    DragEffect::DragStarted { active: page, over }
                } else {
                    noop(DragNoopReason::ThresholdNotReached)
                }
            }
            (
                DragState::Armed { page, .. },
                DragEvent::PointerUp { .. } | DragEvent::PointerCancel | DragEvent::KeyCancel,
            ) => {
                self.state = DragState::Idle;
                DragEffect::Disarmed { page }
            }
            (DragState::Armed { .. }, DragEvent::PointerDown { .. } | DragEvent::KeyPickUp { .. }) => {
                noop(DragNoopReason::DragAlreadyInProgress)
            }
            (DragState::Armed { .. }, _) => noop(DragNoopReason::WrongInput),

            // Dragging
            (DragState::Dragging { .. }, DragEvent::PointerDown { .. } | DragEvent::KeyPickUp { .. }) => {
                noop(DragNoopReason::DragAlreadyInProgress)
            }
            (DragState::Dragging { .. }, DragEvent::PointerCancel | DragEvent::KeyCancel) => {
                return self.release(pages);
            }
            (
                DragState::Dragging {
                    active,
                    input: DragInput::Pointer,
                    origin,
                    ..
                },
                DragEvent::PointerMove { position },
            ) => {
                let over = self.layout.drop_target(position);
                self.state = DragState::Dragging {
                    active,
                    input: DragInput::Pointer,
                    origin,
                    current: position,
                    over,
                };
                DragEffect::DragUpdated { active, over }
            }
            (
                DragState::Dragging {
                    active,
                    input: DragInput::Pointer,
                    ..
                },
                DragEvent::PointerUp { position },
            ) => match self.layout.drop_target(position) {
                Some(target) => self.commit(active, target, pages),
                None => return self.release(pages),
            },
            (
                DragState::Dragging {
                    active,
                    input: DragInput::Keyboard,
                    origin,
                    over,
                    ..
                },
                DragEvent::KeyStep { offset },
            ) => {
                let over = self.step_target(pages, over.unwrap_or(active), offset);
                let current = over.map(|p| self.slot_center(p)).unwrap_or(origin);
                self.state = DragState::Dragging {
                    active,
                    input: DragInput::Keyboard,
                    origin,
                    current,
                    over,
                };
                DragEffect::DragUpdated { active, over }
            }
            (
                DragState::Dragging {
                    active,
                    input: DragInput::Keyboard,
                    over,
                    ..
                },
                DragEvent::KeyDrop,
            ) => match over {
                Some(target) => self.commit(active, target, pages),
                None => return self.release(pages),
            },
            (DragState::Dragging { .. }, _) => noop(DragNoopReason::WrongInput),
        };

        DragTransition {
            from,
            to: self.state,
            effect,
        }
    }

    fn commit(&mut self, source: PageId, target: PageId, pages: &mut PageCollection) -> DragEffect {
        self.state = DragState::Idle;
        let outcome = pages.reorder(source, target);
        tracing::debug!(%source, %target, ?outcome, "Drag committed");
        DragEffect::Committed {
            source,
            target,
            outcome,
        }
    }

    fn release(&mut self, pages: &PageCollection) -> DragTransition {
        let from = self.state;
        self.state = DragState::Idle;

        let effect = match from {
            DragState::Idle => noop(DragNoopReason::IdleWithoutActiveDrag),
            DragState::Armed { page, .. } => DragEffect::Disarmed { page },
            DragState::Dragging { active, .. } => DragEffect::Returned {
                active,
                display_index: pages.position(active),
            },
        };

        DragTransition {
            from,
            to: self.state,
            effect,
        }
    }

    fn step_target(&self, pages: &PageCollection, from: PageId, offset: isize) -> Option<PageId> {
        let ids = pages.ids();
        let last = ids.len().checked_sub(1)?;
        let index = pages.position(from)? as isize;
        let next = index.saturating_add(offset).clamp(0, last as isize) as usize;
        ids.get(next).copied()
    }

    fn slot_center(&self, page: PageId) -> Point {
        self.layout
            .slot(page)
            .map(|s| s.rect.center())
            .unwrap_or_default()
    }
}

fn noop(reason: DragNoopReason) -> DragEffect {
    DragEffect::Noop { reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::collection_of;

    /// One row of 100x140 slots with a 20px gap, in display order
    fn row_layout(pages: &PageCollection) -> SlotLayout {
        let slots = pages
            .ids()
            .iter()
            .enumerate()
            .map(|(i, &page)| Slot {
                page,
                rect: Rect::new(i as f32 * 120.0, 0.0, 100.0, 140.0),
            })
            .collect();
        SlotLayout::new(slots)
    }

    #[test]
    fn test_closest_center() {
        let pages = collection_of(3);
        let layout = row_layout(&pages);
        assert_eq!(layout.closest_center(Point::new(5.0, 70.0)), Some(PageId::from(0)));
        assert_eq!(layout.closest_center(Point::new(250.0, 70.0)), Some(PageId::from(2)));
        // Outside the grid there is still a closest slot, but no drop target
        assert_eq!(layout.closest_center(Point::new(900.0, 900.0)), Some(PageId::from(2)));
        assert_eq!(layout.drop_target(Point::new(900.0, 900.0)), None);
    }

    #[test]
    fn test_closest_center_tie_prefers_first_slot() {
        let pages = collection_of(2);
        let layout = row_layout(&pages);
        // Exactly between the centers at x=50 and x=170
        assert_eq!(layout.closest_center(Point::new(110.0, 70.0)), Some(PageId::from(0)));
    }

    #[test]
    fn test_empty_layout_has_no_target() {
        let layout = SlotLayout::default();
        assert_eq!(layout.closest_center(Point::new(0.0, 0.0)), None);
        assert!(!layout.contains(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_rejects_invalid_threshold() {
        assert!(DragController::new(-1.0).is_err());
        assert!(DragController::new(f32::NAN).is_err());
        assert_eq!(DragController::new(0.0).unwrap().threshold(), 0.0);
    }

    #[test]
    fn test_press_below_threshold_is_a_click() {
        let mut pages = collection_of(3);
        let mut drag = DragController::default();
        drag.set_layout(row_layout(&pages));

        drag.handle(
            DragEvent::PointerDown {
                page: PageId::from(0),
                position: Point::new(50.0, 70.0),
                surface: PointerSurface::Page,
            },
            &mut pages,
        );
        let moved = drag.handle(
            DragEvent::PointerMove {
                position: Point::new(55.0, 72.0),
            },
            &mut pages,
        );
        assert_eq!(
            moved.effect,
            DragEffect::Noop {
                reason: DragNoopReason::ThresholdNotReached
            }
        );

        let up = drag.handle(
            DragEvent::PointerUp {
                position: Point::new(55.0, 72.0),
            },
            &mut pages,
        );
        assert_eq!(up.effect, DragEffect::Disarmed { page: PageId::from(0) });
        assert_eq!(drag.state(), DragState::Idle);
        assert!(pages.is_pristine());
    }

    #[test]
    fn test_control_surface_never_arms() {
        let mut pages = collection_of(2);
        let mut drag = DragController::default();
        let t = drag.handle(
            DragEvent::PointerDown {
                page: PageId::from(0),
                position: Point::new(0.0, 0.0),
                surface: PointerSurface::Control,
            },
            &mut pages,
        );
        assert_eq!(
            t.effect,
            DragEffect::Noop {
                reason: DragNoopReason::ControlSurface
            }
        );
        assert_eq!(drag.state(), DragState::Idle);
    }

    #[test]
    fn test_speculative_order_leaves_collection_alone() {
        let mut pages = collection_of(3);
        let mut drag = DragController::default();
        drag.set_layout(row_layout(&pages));

        drag.handle(
            DragEvent::PointerDown {
                page: PageId::from(0),
                position: Point::new(50.0, 70.0),
                surface: PointerSurface::Page,
            },
            &mut pages,
        );
        drag.handle(
            DragEvent::PointerMove {
                position: Point::new(290.0, 70.0),
            },
            &mut pages,
        );

        let ids: Vec<u32> = drag.speculative_order(&pages).iter().map(|p| p.raw()).collect();
        assert_eq!(ids, vec![1, 2, 0]);
        assert!(pages.is_pristine());

        let proxy = drag.proxy(&pages).unwrap();
        assert_eq!(proxy.page.id(), PageId::from(0));
        assert_eq!(proxy.home_index, 0);
        assert_eq!(proxy.over, Some(PageId::from(2)));
    }

    fn lift(drag: &mut DragController, pages: &mut PageCollection, page: u32, at: Point) {
        drag.handle(
            DragEvent::PointerDown {
                page: PageId::from(page),
                position: at,
                surface: PointerSurface::Page,
            },
            pages,
        );
        drag.handle(
            DragEvent::PointerMove {
                position: Point::new(at.x + 40.0, at.y),
            },
            pages,
        );
    }

    #[test]
    fn test_key_step_clamps_extreme_offsets() {
        let mut pages = collection_of(3);
        let mut drag = DragController::default();
        drag.handle(DragEvent::KeyPickUp { page: PageId::from(2) }, &mut pages);

        let t = drag.handle(DragEvent::KeyStep { offset: isize::MAX }, &mut pages);
        assert_eq!(
            t.effect,
            DragEffect::DragUpdated {
                active: PageId::from(2),
                over: Some(PageId::from(2))
            }
        );

        let t = drag.handle(DragEvent::KeyStep { offset: isize::MIN }, &mut pages);
        assert_eq!(
            t.effect,
            DragEffect::DragUpdated {
                active: PageId::from(2),
                over: Some(PageId::from(0))
            }
        );
        assert!(pages.is_pristine());
    }

    #[test]
    fn test_cancel_while_dragging_returns_page() {
        for cancel in [DragEvent::PointerCancel, DragEvent::KeyCancel] {
            let mut pages = collection_of(3);
            let mut drag = DragController::default();
            drag.set_layout(row_layout(&pages));
            lift(&mut drag, &mut pages, 1, Point::new(170.0, 70.0));
            assert!(drag.is_dragging());

            let t = drag.handle(cancel, &mut pages);
            assert_eq!(
                t.effect,
                DragEffect::Returned {
                    active: PageId::from(1),
                    display_index: Some(1)
                }
            );
            assert_eq!(drag.state(), DragState::Idle);
            assert!(pages.is_pristine());
        }
    }

    #[test]
    fn test_cancel_while_armed_disarms() {
        for cancel in [DragEvent::PointerCancel, DragEvent::KeyCancel] {
            let mut pages = collection_of(2);
            let mut drag = DragController::default();
            drag.handle(
                DragEvent::PointerDown {
                    page: PageId::from(0),
                    position: Point::new(50.0, 70.0),
                    surface: PointerSurface::Page,
                },
                &mut pages,
            );

            let t = drag.handle(cancel, &mut pages);
            assert_eq!(t.effect, DragEffect::Disarmed { page: PageId::from(0) });
            assert_eq!(drag.state(), DragState::Idle);
        }
    }

    #[test]
    fn test_second_press_during_drag_is_ignored() {
        let mut pages = collection_of(3);
        let mut drag = DragController::default();
        drag.set_layout(row_layout(&pages));
        lift(&mut drag, &mut pages, 0, Point::new(50.0, 70.0));
        let before = drag.state();

        let t = drag.handle(
            DragEvent::PointerDown {
                page: PageId::from(2),
                position: Point::new(290.0, 70.0),
                surface: PointerSurface::Page,
            },
            &mut pages,
        );
        assert_eq!(
            t.effect,
            DragEffect::Noop {
                reason: DragNoopReason::DragAlreadyInProgress
            }
        );
        assert_eq!(drag.state(), before);
        assert_eq!(drag.active(), Some(PageId::from(0)));
    }

    #[test]
    fn test_pointer_move_during_keyboard_drag_is_rejected() {
        let mut pages = collection_of(3);
        let mut drag = DragController::default();
        drag.set_layout(row_layout(&pages));
        drag.handle(DragEvent::KeyPickUp { page: PageId::from(1) }, &mut pages);
        let before = drag.state();

        let t = drag.handle(
            DragEvent::PointerMove {
                position: Point::new(290.0, 70.0),
            },
            &mut pages,
        );
        assert_eq!(
            t.effect,
            DragEffect::Noop {
                reason: DragNoopReason::WrongInput
            }
        );
        assert_eq!(drag.state(), before);
    }
}
