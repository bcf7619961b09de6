//! Schedule synchronization service.
//!
//! # Responsibility
//! - Expose the public edit operations of one schedule.
//! - Keep the block sequence, the summary text and the compressed view in
//!   sync after every edit.
//! - Notify subscribed observers about every tracked property change.
//!
//! # Invariants
//! - Block edits end with exactly one encode.
//! - Text assigned while encoding never triggers a decode.
//! - Block edits induced by `AlignNext` never re-enter the block handler.
//! - Guards are per instance; two schedules never share them.
//!
//! # See also
//! - `schedule::window` for reflow semantics.
//! - `schedule::codec` for the summary format.

use crate::config::{ConfigError, ReflowPolicy, ScheduleConfig};
use crate::model::block::{Block, BlockId};
use crate::model::time::TimeOfDay;
use crate::schedule::codec::{self, DecodeReport, Run};
use crate::schedule::window::{BoundaryField, WindowModel};
use crate::service::observer::{ObserverId, ObserverRegistry, ScheduleObserver, ScheduleProperty};
use log::debug;

/// Field touched by a block edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockField {
    Start,
    End,
    Label,
}

impl BlockField {
    fn boundary(self) -> Option<BoundaryField> {
        match self {
            Self::Start => Some(BoundaryField::Start),
            Self::End => Some(BoundaryField::End),
            Self::Label => None,
        }
    }

    fn property(self, index: usize) -> ScheduleProperty {
        match self {
            Self::Start => ScheduleProperty::BlockStart(index),
            Self::End => ScheduleProperty::BlockEnd(index),
            Self::Label => ScheduleProperty::BlockLabel(index),
        }
    }
}

/// Re-entrancy guards breaking the edit -> encode -> decode cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SyncGuards {
    /// Blocks -> text is running.
    encoding: bool,
    /// The model is editing a block on its own behalf.
    internal_edit: bool,
}

/// Running counters of synchronization work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub encodes: u64,
    pub decodes: u64,
    pub discarded_lines: u64,
}

/// One schedule: window model, summary text and compressed view.
#[derive(Debug)]
pub struct ScheduleController {
    model: WindowModel,
    summary_text: String,
    is_summary_empty: bool,
    compressed: Vec<Block>,
    time_options: Vec<TimeOfDay>,
    observers: ObserverRegistry,
    guards: SyncGuards,
    stats: SyncStats,
    last_decode: Option<DecodeReport>,
}

impl ScheduleController {
    /// Creates a schedule tiled over the configured window.
    ///
    /// The config should already be validated; see `try_new`.
    pub fn new(config: &ScheduleConfig) -> Self {
        let model = WindowModel::new(config);
        let time_options = model.snapper().time_options();
        let mut controller = Self {
            model,
            summary_text: String::new(),
            is_summary_empty: true,
            compressed: Vec::new(),
            time_options,
            observers: ObserverRegistry::new(),
            guards: SyncGuards::default(),
            stats: SyncStats::default(),
            last_decode: None,
        };
        controller.encode_summary();
        debug!(
            "event=schedule_init module=service status=ok window={}-{} step={} policy={:?}",
            controller.window_start(),
            controller.window_end(),
            controller.step_minutes(),
            controller.policy()
        );
        controller
    }

    /// Validates the config, then creates the schedule.
    ///
    /// # Errors
    /// - Returns `ConfigError::Invalid` when the config breaks a step or
    ///   window rule.
    pub fn try_new(config: &ScheduleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn blocks(&self) -> &[Block] {
        self.model.blocks()
    }

    pub fn compressed_blocks(&self) -> &[Block] {
        &self.compressed
    }

    pub fn summary_text(&self) -> &str {
        &self.summary_text
    }

    /// `true` iff the summary text is blank or whitespace only.
    pub fn is_summary_empty(&self) -> bool {
        self.is_summary_empty
    }

    pub fn time_options(&self) -> &[TimeOfDay] {
        &self.time_options
    }

    pub fn window_start(&self) -> TimeOfDay {
        self.model.window_start()
    }

    pub fn window_end(&self) -> TimeOfDay {
        self.model.window_end()
    }

    pub fn step_minutes(&self) -> u32 {
        self.model.step_minutes()
    }

    pub fn policy(&self) -> ReflowPolicy {
        self.model.policy()
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Counts from the most recent decode, if any ran.
    pub fn last_decode(&self) -> Option<DecodeReport> {
        self.last_decode
    }

    pub fn subscribe(&mut self, observer: Box<dyn ScheduleObserver>) -> ObserverId {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Moves the window start and rebuilds the default tiling.
    ///
    /// The value is snapped and kept at least one step before the end.
    pub fn set_window_start(&mut self, start: TimeOfDay) {
        let previous = self.window_bounds();
        if self.model.set_window_start(start) {
            self.after_window_rebuild(previous);
        }
    }

    /// Moves the window end and rebuilds the default tiling.
    ///
    /// The value is snapped and kept at least one step after the start.
    pub fn set_window_end(&mut self, end: TimeOfDay) {
        let previous = self.window_bounds();
        if self.model.set_window_end(end) {
            self.after_window_rebuild(previous);
        }
    }

    /// Edits one block start. Unknown indices are ignored.
    pub fn set_block_start(&mut self, index: usize, start: TimeOfDay) {
        let changed = self.model.assign_start(index, start);
        self.after_block_assign(index, BlockField::Start, changed);
    }

    /// Edits one block end. Unknown indices are ignored.
    pub fn set_block_end(&mut self, index: usize, end: TimeOfDay) {
        let changed = self.model.assign_end(index, end);
        self.after_block_assign(index, BlockField::End, changed);
    }

    /// Sets a user label on one block. Unknown indices are ignored.
    pub fn set_block_label(&mut self, index: usize, text: &str) {
        let changed = self.model.assign_label(index, text);
        self.after_block_assign(index, BlockField::Label, changed);
    }

    /// Replaces the summary text and rebuilds the blocks from it.
    ///
    /// Assigning the current text again is a no-op.
    pub fn set_summary_text(&mut self, text: impl Into<String>) {
        self.assign_summary(text.into());
    }

    /// Inserts a block after the block at `anchor_index`.
    ///
    /// An out-of-range anchor appends at the end. Returns the index of the
    /// new block.
    pub fn insert_block_after(
        &mut self,
        anchor_index: usize,
        start: TimeOfDay,
        end: TimeOfDay,
        label: &str,
    ) -> usize {
        let anchor = self.model.blocks().get(anchor_index).map(|block| block.id);
        self.insert_after_id(anchor, start, end, label)
    }

    /// Inserts a block after the block with id `anchor`.
    ///
    /// A missing or stale anchor appends at the end.
    pub fn insert_after_id(
        &mut self,
        anchor: Option<BlockId>,
        start: TimeOfDay,
        end: TimeOfDay,
        label: &str,
    ) -> usize {
        if anchor.is_some_and(|id| self.model.position(id).is_none()) {
            debug!("event=insert_anchor_fallback module=service status=ok reason=stale_anchor");
        }
        let index = self.model.insert_after(anchor, start, end, label);
        self.observers.notify(ScheduleProperty::Blocks);
        self.encode_summary();
        index
    }

    fn window_bounds(&self) -> (TimeOfDay, TimeOfDay) {
        (self.model.window_start(), self.model.window_end())
    }

    fn notify_window_change(&mut self, previous: (TimeOfDay, TimeOfDay)) {
        let (start, end) = self.window_bounds();
        if start != previous.0 {
            self.observers.notify(ScheduleProperty::WindowStart);
        }
        if end != previous.1 {
            self.observers.notify(ScheduleProperty::WindowEnd);
        }
        self.observers.notify(ScheduleProperty::Blocks);
    }

    fn after_window_rebuild(&mut self, previous: (TimeOfDay, TimeOfDay)) {
        self.notify_window_change(previous);
        self.encode_summary();
    }

    fn after_block_assign(&mut self, index: usize, field: BlockField, changed: bool) {
        if !changed {
            if index >= self.model.len() {
                debug!(
                    "event=block_edit_ignored module=service status=skipped index={} len={}",
                    index,
                    self.model.len()
                );
            }
            return;
        }
        self.observers.notify(field.property(index));
        self.on_block_changed(index, field);
    }

    /// Handler for every observed block change.
    fn on_block_changed(&mut self, index: usize, field: BlockField) {
        if self.guards.internal_edit {
            return;
        }

        if let Some(boundary) = field.boundary() {
            let before = self.bounds_at(index);
            let outcome = self.model.normalize_boundary(index, boundary);
            self.notify_bounds_change(index, before);

            if outcome.reflowed_from.is_some() {
                self.observers.notify(ScheduleProperty::Blocks);
            }
            if let Some((next, start)) = outcome.align_next {
                self.align_next(next, start);
            }
        }

        self.encode_summary();
    }

    /// Moves the next block's start as an internal edit.
    fn align_next(&mut self, index: usize, start: TimeOfDay) {
        let previous = std::mem::replace(&mut self.guards.internal_edit, true);
        self.set_block_start(index, start);
        let before = self.bounds_at(index);
        if self.model.settle_aligned(index) {
            self.notify_bounds_change(index, before);
        }
        self.guards.internal_edit = previous;
    }

    fn bounds_at(&self, index: usize) -> Option<(TimeOfDay, TimeOfDay)> {
        self.model
            .blocks()
            .get(index)
            .map(|block| (block.start, block.end))
    }

    fn notify_bounds_change(&mut self, index: usize, before: Option<(TimeOfDay, TimeOfDay)>) {
        let (Some((start, end)), Some((after_start, after_end))) = (before, self.bounds_at(index))
        else {
            return;
        };
        if start != after_start {
            self.observers.notify(ScheduleProperty::BlockStart(index));
        }
        if end != after_end {
            self.observers.notify(ScheduleProperty::BlockEnd(index));
        }
    }

    /// Blocks -> summary text and compressed view.
    fn encode_summary(&mut self) {
        let previous = std::mem::replace(&mut self.guards.encoding, true);

        let runs = codec::compress(self.model.blocks());
        let text = codec::render_runs(&runs);
        self.stats.encodes += 1;
        self.assign_summary(text);
        self.refresh_compressed(&runs);

        self.guards.encoding = previous;
    }

    fn refresh_compressed(&mut self, runs: &[Run]) {
        let unchanged = self.compressed.len() == runs.len()
            && self
                .compressed
                .iter()
                .zip(runs)
                .all(|(block, run)| {
                    block.start == run.start && block.end == run.end && block.text() == run.label
                });
        if unchanged {
            return;
        }
        self.compressed = codec::compressed_view(runs);
        self.observers.notify(ScheduleProperty::CompressedBlocks);
    }

    fn assign_summary(&mut self, text: String) {
        if self.summary_text == text {
            return;
        }
        self.summary_text = text;
        self.observers.notify(ScheduleProperty::SummaryText);

        let is_empty = self.summary_text.trim().is_empty();
        if is_empty != self.is_summary_empty {
            self.is_summary_empty = is_empty;
            self.observers.notify(ScheduleProperty::IsSummaryEmpty);
        }

        if !self.guards.encoding {
            self.decode_summary();
        }
    }

    /// Summary text -> blocks, followed by a canonical re-encode.
    fn decode_summary(&mut self) {
        let parsed = codec::parse_summary(&self.summary_text, self.model.snapper());
        let report = parsed.report();
        self.stats.decodes += 1;
        self.stats.discarded_lines += report.discarded as u64;
        self.last_decode = Some(report);
        debug!(
            "event=summary_decode module=service status=ok accepted={} discarded={}",
            report.accepted, report.discarded
        );

        let previous = self.window_bounds();
        match parsed.bounds() {
            None => {
                self.model.rebuild();
                self.observers.notify(ScheduleProperty::Blocks);
            }
            Some((min_start, max_end)) => {
                let start = previous.0.min(min_start);
                let end = previous.1.max(max_end);
                if self.model.set_window(start, end) {
                    self.notify_window_change(previous);
                }
                self.model.replace_blocks(parsed.into_blocks());
                self.observers.notify(ScheduleProperty::Blocks);
            }
        }

        self.encode_summary();
    }
}

#[cfg(test)]
mod tests {
    use super::ScheduleController;
    use crate::config::{ReflowPolicy, ScheduleConfig};
    use crate::model::time::TimeOfDay;

    fn hm(hours: u32, minutes: u32) -> TimeOfDay {
        TimeOfDay::from_hm(hours, minutes)
    }

    #[test]
    fn new_schedule_encodes_once_and_is_empty() {
        let schedule = ScheduleController::new(&ScheduleConfig::default());
        assert_eq!(schedule.blocks().len(), 22);
        assert_eq!(schedule.summary_text(), "");
        assert!(schedule.is_summary_empty());
        assert_eq!(schedule.stats().encodes, 1);
        assert_eq!(schedule.stats().decodes, 0);
    }

    #[test]
    fn encoded_text_is_not_decoded_again() {
        let mut schedule = ScheduleController::new(&ScheduleConfig::default());
        schedule.set_block_label(0, "Email");
        assert_eq!(schedule.summary_text(), "08:00-08:30 Email");
        assert_eq!(schedule.stats().decodes, 0);
        assert!(!schedule.guards.encoding);
        assert!(!schedule.guards.internal_edit);
    }

    #[test]
    fn align_next_edit_leaves_guards_clear() {
        let config = ScheduleConfig::default().with_policy(ReflowPolicy::AlignNext);
        let mut schedule = ScheduleController::new(&config);
        schedule.set_block_end(0, hm(9, 0));
        assert!(!schedule.guards.internal_edit);
        assert_eq!(schedule.blocks()[1].start, hm(9, 0));
    }

    #[test]
    fn try_new_rejects_invalid_config() {
        let config = ScheduleConfig::default().with_step(0);
        assert!(ScheduleController::try_new(&config).is_err());
    }
}
