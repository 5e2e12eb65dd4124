//! # Page Mutations
//!
//! Serializable form of the engine operations, used for scripted edits and
//! for routing UI gestures through a single entry point.
//!
//! ## Mutation Semantics
//!
//! ### Rotate / ToggleDeleted
//! - Address a page by identity
//! - Unknown ids are rejected with [`MutationError::UnknownPage`]
//!
//! ### Move / Reorder
//! - Address positions or drop targets that the UI may have gotten wrong
//! - Out-of-range or unknown targets are absorbed as [`EditOutcome::Ignored`]

use serde::{Deserialize, Serialize};

use crate::collection::{Direction, DropSide, EditOutcome, PageCollection};
use crate::page::PageId;
use crate::MutationError;

/// Intent-preserving page operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PageMutation {
    /// Quarter turn clockwise
    Rotate { page: PageId },

    /// Soft-delete or restore
    ToggleDeleted { page: PageId },

    /// Swap with the neighbour at `index + direction`
    Move { index: usize, direction: Direction },

    /// Drop `source` next to `target`
    Reorder {
        source: PageId,
        target: PageId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        side: Option<DropSide>,
    },
}

impl PageMutation {
    /// Validate without applying
    pub fn validate(&self, pages: &PageCollection) -> Result<(), MutationError> {
        match self {
            PageMutation::Rotate { page } | PageMutation::ToggleDeleted { page } => {
                if pages.contains(*page) {
                    Ok(())
                } else {
                    Err(MutationError::UnknownPage(*page))
                }
            }
            // Invalid targets are absorbed, not rejected
            PageMutation::Move { .. } | PageMutation::Reorder { .. } => Ok(()),
        }
    }

    /// Apply to the collection with validation
    pub fn apply(&self, pages: &mut PageCollection) -> Result<EditOutcome, MutationError> {
        self.validate(pages)?;

        let outcome = match *self {
            PageMutation::Rotate { page } => {
                pages.rotate(page)?;
                EditOutcome::Applied
            }
            PageMutation::ToggleDeleted { page } => {
                pages.toggle_deleted(page)?;
                EditOutcome::Applied
            }
            PageMutation::Move { index, direction } => pages.move_page(index, direction),
            PageMutation::Reorder {
                source,
                target,
                side: None,
            } => pages.reorder(source, target),
            PageMutation::Reorder {
                source,
                target,
                side: Some(side),
            } => pages.reorder_to(source, target, side),
        };

        Ok(outcome)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PageMutation::Rotate { .. } => "rotate",
            PageMutation::ToggleDeleted { .. } => "toggle_deleted",
            PageMutation::Move { .. } => "move",
            PageMutation::Reorder { .. } => "reorder",
        }
    }
}

/// Result of applying a mutation through a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationResult {
    /// Session version after the call (unchanged when ignored)
    pub version: u64,
    pub outcome: EditOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::collection_of;

    #[test]
    fn test_mutation_serialization() {
        let mutation = PageMutation::Reorder {
            source: PageId::from(2),
            target: PageId::from(0),
            side: None,
        };

        let json = serde_json::to_string(&mutation).unwrap();
        assert_eq!(json, r#"{"op":"reorder","source":2,"target":0}"#);

        let deserialized: PageMutation = serde_json::from_str(&json).unwrap();
        assert_eq!(mutation, deserialized);
    }

    #[test]
    fn test_script_parses() {
        let script = r#"[
            {"op": "rotate", "page": 1},
            {"op": "toggle_deleted", "page": 0},
            {"op": "move", "index": 2, "direction": "backward"},
            {"op": "reorder", "source": 2, "target": 1, "side": "after"}
        ]"#;

        let mutations: Vec<PageMutation> = serde_json::from_str(script).unwrap();
        assert_eq!(mutations.len(), 4);
        assert_eq!(
            mutations[3],
            PageMutation::Reorder {
                source: PageId::from(2),
                target: PageId::from(1),
                side: Some(DropSide::After),
            }
        );
    }

    #[test]
    fn test_validation_rejects_unknown_pages() {
        let pages = collection_of(2);
        let mutation = PageMutation::Rotate {
            page: PageId::from(5),
        };
        assert_eq!(
            mutation.validate(&pages),
            Err(MutationError::UnknownPage(PageId::from(5)))
        );
    }

    #[test]
    fn test_absorbed_operations_report_ignored() {
        let mut pages = collection_of(2);
        let outcome = PageMutation::Move {
            index: 1,
            direction: Direction::Forward,
        }
        .apply(&mut pages)
        .unwrap();
        assert_eq!(outcome, EditOutcome::Ignored);
    }
}
