//! # Page Descriptors
//!
//! The atomic unit of editable state. One descriptor exists per page of the
//! loaded source document; descriptors are never created or destroyed after
//! load, only mutated through the collection.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::thumbnails::PreviewRef;

/// Opaque page identity, assigned sequentially at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(u32);

impl PageId {
    pub(crate) fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Arena slot of this id
    pub(crate) fn slot(self) -> usize {
        self.0 as usize
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for PageId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page-{}", self.0)
    }
}

/// Quarter-turn rotation, clockwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "i64")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

/// Rotation angle that is not a multiple of 90 degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Rotation must be a multiple of 90 degrees, got {0}")]
pub struct InvalidRotation(pub i64);

impl Rotation {
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    /// Normalize any multiple of 90 (negative included) into `0..360`.
    pub fn from_degrees(degrees: i64) -> Result<Self, InvalidRotation> {
        if degrees % 90 != 0 {
            return Err(InvalidRotation(degrees));
        }
        Ok(Self::from_quarter_turns(degrees.div_euclid(90)))
    }

    fn from_quarter_turns(turns: i64) -> Self {
        Self::ALL[turns.rem_euclid(4) as usize]
    }

    fn quarter_turns(self) -> i64 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }

    pub fn degrees(self) -> u16 {
        self.quarter_turns() as u16 * 90
    }

    /// One quarter turn clockwise: `(r + 90) mod 360`.
    #[must_use]
    pub fn rotated_clockwise(self) -> Self {
        self.compose(Rotation::Deg90)
    }

    /// Additive composition, `(self + other) mod 360`.
    #[must_use]
    pub fn compose(self, other: Rotation) -> Self {
        Self::from_quarter_turns(self.quarter_turns() + other.quarter_turns())
    }

    /// Whether width and height swap when displayed.
    pub fn is_sideways(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl TryFrom<i64> for Rotation {
    type Error = InvalidRotation;

    fn try_from(degrees: i64) -> Result<Self, Self::Error> {
        Rotation::from_degrees(degrees)
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Editable record for one original page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescriptor {
    id: PageId,
    original_index: usize,
    pub(crate) rotation: Rotation,
    pub(crate) deleted: bool,
    preview: PreviewRef,
}

impl PageDescriptor {
    pub(crate) fn new(id: PageId, original_index: usize, preview: PreviewRef) -> Self {
        Self {
            id,
            original_index,
            rotation: Rotation::Deg0,
            deleted: false,
            preview,
        }
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    /// 0-based position of this page in the source document
    pub fn original_index(&self) -> usize {
        self.original_index
    }

    /// Rotation added on top of whatever the source page already carries
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn preview(&self) -> PreviewRef {
        self.preview
    }

    /// Untouched since load
    pub fn is_pristine(&self) -> bool {
        self.rotation == Rotation::Deg0 && !self.deleted
    }
}
