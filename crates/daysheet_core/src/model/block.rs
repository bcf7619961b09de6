//! Block domain model.
//!
//! # Responsibility
//! - Define one labelled time interval of the schedule.
//! - Track whether the label came from the user or from the auto labeler.
//!
//! # Invariants
//! - `id` is unique per constructed block and never reused.
//! - `start < end` once the owning window model has settled an edit.
//! - A `UserSet` label is never replaced by an automatic rewrite.

use crate::model::time::TimeOfDay;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a block inside one schedule.
pub type BlockId = Uuid;

/// Label state of a block.
///
/// The automatic labeler is inert: an `Auto` label always reads as the empty
/// string. Keeping it as a distinct state still matters, since it is what
/// allows later automatic rewrites; `UserSet` locks the label for the
/// lifetime of the block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum BlockLabel {
    #[default]
    Auto,
    UserSet(String),
}

impl BlockLabel {
    pub fn text(&self) -> &str {
        match self {
            Self::Auto => "",
            Self::UserSet(text) => text.as_str(),
        }
    }

    pub fn is_user_set(&self) -> bool {
        matches!(self, Self::UserSet(_))
    }

    /// Blank or whitespace-only label; never part of a summary run.
    pub fn is_blank(&self) -> bool {
        self.text().trim().is_empty()
    }
}

/// One contiguous time interval with a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub label: BlockLabel,
}

impl Block {
    /// Creates an auto-labelled block with a fresh id.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            label: BlockLabel::Auto,
        }
    }

    /// Creates a block whose label was explicitly provided.
    pub fn with_label(start: TimeOfDay, end: TimeOfDay, text: impl Into<String>) -> Self {
        Self {
            label: BlockLabel::UserSet(text.into()),
            ..Self::new(start, end)
        }
    }

    pub fn text(&self) -> &str {
        self.label.text()
    }

    /// Applies a user label edit.
    ///
    /// Returns `false` when the effective text is unchanged; in that case
    /// the label state is left alone, so an `Auto` block stays `Auto`.
    pub fn set_user_label(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if self.text() == text {
            return false;
        }
        self.label = BlockLabel::UserSet(text);
        true
    }

    /// Width of the block in minutes, zero when inverted.
    pub fn duration_minutes(&self) -> u32 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }

    pub fn is_settled(&self) -> bool {
        self.start < self.end
    }
}
