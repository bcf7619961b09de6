//! Window model: the ordered block sequence over `[window_start, window_end)`.
//!
//! # Responsibility
//! - Rebuild the sequence into step-wide slots when the window changes.
//! - Normalize a block after one of its boundaries was edited, following the
//!   configured `ReflowPolicy`.
//! - Insert explicit blocks and replace the sequence wholesale for decode.
//!
//! # Invariants
//! - After `rebuild`, blocks tile the window at step width with no gaps or
//!   overlaps; a trailing partial slot is dropped.
//! - The sequence is kept in ascending start order by reflow, never sorted.
//! - `window_start + step <= window_end` for every window produced by the
//!   public setters.
//!
//! Raw `assign_*` setters only write the field. Callers that represent user
//! edits must follow them with `normalize_boundary`.

use crate::config::{ReflowPolicy, ScheduleConfig};
use crate::model::block::{Block, BlockId};
use crate::model::time::TimeOfDay;
use crate::schedule::snap::Snapper;
use log::debug;

/// Fixed width used by `insert_after` when the requested range is empty.
pub const INSERT_FALLBACK_MINUTES: u32 = 30;

/// Which boundary of a block was edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryField {
    Start,
    End,
}

/// Follow-up work produced by normalizing a boundary edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundaryOutcome {
    /// `AlignNext` only: the next block must start at this time.
    pub align_next: Option<(usize, TimeOfDay)>,
    /// `Cascade` only: blocks from this index onward were re-tiled.
    pub reflowed_from: Option<usize>,
}

/// Owner of the block sequence and the schedule window.
#[derive(Debug, Clone)]
pub struct WindowModel {
    window_start: TimeOfDay,
    window_end: TimeOfDay,
    snapper: Snapper,
    policy: ReflowPolicy,
    blocks: Vec<Block>,
}

impl WindowModel {
    /// Creates a model and tiles the configured window.
    ///
    /// The config is expected to be validated; bounds are still snapped and
    /// clamped so an unchecked config cannot produce an inverted window.
    pub fn new(config: &ScheduleConfig) -> Self {
        let snapper = Snapper::new(config.step_minutes);
        let mut model = Self {
            window_start: TimeOfDay::MIDNIGHT,
            window_end: TimeOfDay::MIDNIGHT,
            snapper,
            policy: config.reflow_policy,
            blocks: Vec::new(),
        };
        let start = snapper
            .snap(config.window_start)
            .min(TimeOfDay::END_OF_DAY - snapper.step_minutes());
        let end = snapper
            .snap(config.window_end)
            .max(start + snapper.step_minutes());
        model.window_start = start;
        model.window_end = end;
        model.rebuild();
        model
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn window_start(&self) -> TimeOfDay {
        self.window_start
    }

    pub fn window_end(&self) -> TimeOfDay {
        self.window_end
    }

    pub fn step_minutes(&self) -> u32 {
        self.snapper.step_minutes()
    }

    pub fn snapper(&self) -> &Snapper {
        &self.snapper
    }

    pub fn policy(&self) -> ReflowPolicy {
        self.policy
    }

    pub fn position(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| block.id == id)
    }

    /// Moves the window start, keeping at least one step before the end.
    ///
    /// Returns `true` when the bound changed and the sequence was rebuilt.
    pub fn set_window_start(&mut self, start: TimeOfDay) -> bool {
        let latest = self.window_end - self.step_minutes();
        let start = self.snapper.snap(start).min(latest);
        self.set_window(start, self.window_end)
    }

    /// Moves the window end, keeping at least one step after the start.
    pub fn set_window_end(&mut self, end: TimeOfDay) -> bool {
        let earliest = self.window_start + self.step_minutes();
        let end = self.snapper.snap(end).max(earliest);
        self.set_window(self.window_start, end)
    }

    /// Replaces both bounds; rebuilds when either changed.
    ///
    /// Bounds are snapped. An inverted pair keeps `start` and moves `end`
    /// one step past it.
    pub fn set_window(&mut self, start: TimeOfDay, end: TimeOfDay) -> bool {
        let start = self.snapper.snap(start);
        let end = self.snapper.snap(end).max(start + self.step_minutes());
        if start == self.window_start && end == self.window_end {
            return false;
        }
        self.window_start = start;
        self.window_end = end;
        self.rebuild();
        true
    }

    /// Discards every block and tiles the current window at step width.
    pub fn rebuild(&mut self) {
        self.blocks.clear();
        self.fill_from(self.window_start);
        debug!(
            "event=window_rebuild module=schedule status=ok window={}-{} blocks={}",
            self.window_start,
            self.window_end,
            self.blocks.len()
        );
    }

    /// Re-tiles blocks from `index` onward starting at `anchor_start`.
    ///
    /// Existing blocks keep their identity and labels; only their bounds are
    /// rewritten. Blocks that no longer fit before `window_end` are removed,
    /// and missing slots are appended.
    pub fn reflow_from(&mut self, index: usize, anchor_start: TimeOfDay) {
        let step = self.step_minutes();
        let mut slot_start = anchor_start;
        for position in index..self.blocks.len() {
            let slot_end = slot_start + step;
            if slot_end > self.window_end {
                let removed = self.blocks.len() - position;
                self.blocks.truncate(position);
                debug!(
                    "event=reflow_truncate module=schedule status=ok from={} removed={}",
                    position, removed
                );
                return;
            }
            let block = &mut self.blocks[position];
            block.start = slot_start;
            block.end = slot_end;
            slot_start = slot_end;
        }
        self.fill_from(slot_start);
    }

    /// Writes a block start without normalization.
    ///
    /// Returns `false` for an unknown index or an unchanged value.
    pub fn assign_start(&mut self, index: usize, start: TimeOfDay) -> bool {
        match self.blocks.get_mut(index) {
            Some(block) if block.start != start => {
                block.start = start;
                true
            }
            _ => false,
        }
    }

    /// Writes a block end without normalization.
    pub fn assign_end(&mut self, index: usize, end: TimeOfDay) -> bool {
        match self.blocks.get_mut(index) {
            Some(block) if block.end != end => {
                block.end = end;
                true
            }
            _ => false,
        }
    }

    /// Applies a user label to a block.
    pub fn assign_label(&mut self, index: usize, text: &str) -> bool {
        self.blocks
            .get_mut(index)
            .is_some_and(|block| block.set_user_label(text))
    }

    /// Snaps and settles a block after one of its boundaries was edited.
    pub fn normalize_boundary(&mut self, index: usize, field: BoundaryField) -> BoundaryOutcome {
        if index >= self.blocks.len() {
            return BoundaryOutcome::default();
        }
        match self.policy {
            ReflowPolicy::Cascade => self.normalize_cascade(index, field),
            ReflowPolicy::AlignNext => self.normalize_align_next(index, field),
        }
    }

    fn normalize_cascade(&mut self, index: usize, field: BoundaryField) -> BoundaryOutcome {
        let step = self.step_minutes();
        let latest_start = self.window_end - step;
        let snapped_start = self.snapper.snap(self.blocks[index].start);
        let snapped_end = self.snapper.snap(self.blocks[index].end);

        let (start, end) = match field {
            BoundaryField::Start => {
                let start = snapped_start.min(latest_start);
                (start, self.fallback_end(start))
            }
            BoundaryField::End => {
                let start = self.blocks[index].start;
                let end = if snapped_end <= start {
                    self.fallback_end(start)
                } else {
                    snapped_end
                };
                (start, end)
            }
        };

        let block = &mut self.blocks[index];
        block.start = start;
        block.end = end;
        self.reflow_from(index + 1, end);

        BoundaryOutcome {
            align_next: None,
            reflowed_from: Some(index + 1),
        }
    }

    fn normalize_align_next(&mut self, index: usize, field: BoundaryField) -> BoundaryOutcome {
        let step = self.step_minutes();
        let block = &mut self.blocks[index];
        match field {
            BoundaryField::Start => {
                block.start = self.snapper.snap(block.start);
                if block.end <= block.start {
                    (block.start, block.end) = span_within_day(block.start, step);
                }
                BoundaryOutcome::default()
            }
            BoundaryField::End => {
                block.end = self.snapper.snap(block.end);
                if block.end <= block.start {
                    (block.start, block.end) = span_within_day(block.start, step);
                }
                let new_end = block.end;
                let align_next = (index + 1 < self.blocks.len()).then_some((index + 1, new_end));
                BoundaryOutcome {
                    align_next,
                    reflowed_from: None,
                }
            }
        }
    }

    /// Pushes the end of a block moved by `AlignNext` forward by one step
    /// when its new start left it empty. A block that would pass 24:00 is
    /// pulled back to end there.
    ///
    /// Returns `true` when the end moved.
    pub fn settle_aligned(&mut self, index: usize) -> bool {
        let step = self.step_minutes();
        match self.blocks.get_mut(index) {
            Some(block) if block.end <= block.start => {
                (block.start, block.end) = span_within_day(block.start, step);
                true
            }
            _ => false,
        }
    }

    /// Inserts a block right after the anchor without touching neighbours.
    ///
    /// An unknown anchor appends at the end. An empty range gets a fixed
    /// 30 minute width, shifted back to end at 24:00 if it would pass it. A blank label leaves the block auto-labelled.
    /// Returns the index of the inserted block.
    pub fn insert_after(
        &mut self,
        anchor: Option<BlockId>,
        start: TimeOfDay,
        end: TimeOfDay,
        label: &str,
    ) -> usize {
        let mut start = self.snapper.snap(start);
        let mut end = self.snapper.snap(end);
        if end <= start {
            (start, end) = span_within_day(start, INSERT_FALLBACK_MINUTES);
        }

        let index = anchor
            .and_then(|id| self.position(id))
            .map_or(self.blocks.len(), |position| position + 1);
        let block = if label.trim().is_empty() {
            Block::new(start, end)
        } else {
            Block::with_label(start, end, label)
        };
        self.blocks.insert(index, block);
        index
    }

    /// Replaces the whole sequence; used when decoding summary text.
    pub fn replace_blocks(&mut self, blocks: Vec<Block>) {
        self.blocks = blocks;
    }

    fn fill_from(&mut self, mut slot_start: TimeOfDay) {
        let step = self.step_minutes();
        loop {
            let slot_end = slot_start + step;
            if slot_end > self.window_end {
                break;
            }
            self.blocks.push(Block::new(slot_start, slot_end));
            slot_start = slot_end;
        }
    }

    fn fallback_end(&self, start: TimeOfDay) -> TimeOfDay {
        let step = self.step_minutes();
        let capped = (start + step).min(self.window_end);
        if capped > start {
            capped
        } else {
            start + step
        }
    }
}


/// `width` minutes from `start`, moved back so the span ends by 24:00.
fn span_within_day(start: TimeOfDay, width: u32) -> (TimeOfDay, TimeOfDay) {
    let start = start.min(TimeOfDay::END_OF_DAY - width);
    (start, start + width)
}
