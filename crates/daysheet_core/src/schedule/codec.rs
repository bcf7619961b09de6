//! Summary text codec.
//!
//! # Responsibility
//! - Compress the block sequence into runs and render them as
//!   `HH:MM-HH:MM label` lines.
//! - Parse summary text back into snapped, labelled line records.
//!
//! # Invariants
//! - A run only grows across blocks with the same non-blank label whose
//!   start equals the previous end.
//! - Blank-labelled blocks never produce output.
//! - Parsing never fails: unusable lines are counted and dropped.

use crate::model::block::Block;
use crate::model::time::TimeOfDay;
use crate::schedule::snap::Snapper;
use once_cell::sync::Lazy;
use regex::Regex;

/// Separator between rendered summary lines.
pub const LINE_SEPARATOR: &str = "\n";

static SUMMARY_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d{1,2}):(\d{2})\s*-\s*(\d{1,2}):(\d{2})\s*(.*)$")
        .expect("valid summary line regex")
});

/// Maximal contiguous stretch of blocks sharing one non-blank label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub label: String,
}

impl Run {
    /// Renders the run as one summary line.
    pub fn to_line(&self) -> String {
        format!("{}-{} {}", self.start, self.end, self.label)
    }

    /// Builds an independent block for the compressed view.
    pub fn to_block(&self) -> Block {
        Block::with_label(self.start, self.end, self.label.clone())
    }
}

/// Collapses the sequence into runs in one left-to-right pass.
pub fn compress(blocks: &[Block]) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut open: Option<Run> = None;

    for block in blocks {
        if block.label.is_blank() {
            runs.extend(open.take());
            continue;
        }

        let text = block.text();
        let extends = open
            .as_ref()
            .is_some_and(|run| run.label == text && run.end == block.start);
        if extends {
            if let Some(run) = open.as_mut() {
                run.end = block.end;
            }
            continue;
        }

        runs.extend(open.take());
        open = Some(Run {
            start: block.start,
            end: block.end,
            label: text.to_string(),
        });
    }
    runs.extend(open);
    runs
}

/// Joins run lines into summary text.
pub fn render_runs(runs: &[Run]) -> String {
    runs.iter()
        .map(Run::to_line)
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}

/// Renders the block sequence as compressed summary text.
pub fn encode(blocks: &[Block]) -> String {
    render_runs(&compress(blocks))
}

/// Compressed view of the sequence, one synthetic block per run.
pub fn compressed_view(runs: &[Run]) -> Vec<Block> {
    runs.iter().map(Run::to_block).collect()
}

/// One accepted summary line after snapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub label: String,
}

/// Outcome counts of one decode, exposed as a diagnostic side channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeReport {
    pub accepted: usize,
    pub discarded: usize,
}

impl DecodeReport {
    /// No line survived parsing; the schedule is reset to its default tiling.
    pub fn is_clear(&self) -> bool {
        self.accepted == 0
    }
}

/// Parsed summary text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedSummary {
    /// Accepted lines, in source order.
    pub lines: Vec<ParsedLine>,
    /// Non-blank lines that did not match or were empty after snapping.
    pub discarded: usize,
}

impl ParsedSummary {
    /// Earliest start and latest end over accepted lines.
    pub fn bounds(&self) -> Option<(TimeOfDay, TimeOfDay)> {
        let min_start = self.lines.iter().map(|line| line.start).min()?;
        let max_end = self.lines.iter().map(|line| line.end).max()?;
        Some((min_start, max_end))
    }

    pub fn report(&self) -> DecodeReport {
        DecodeReport {
            accepted: self.lines.len(),
            discarded: self.discarded,
        }
    }

    /// One user-labelled block per accepted line.
    pub fn into_blocks(self) -> Vec<Block> {
        self.lines
            .into_iter()
            .map(|line| Block::with_label(line.start, line.end, line.label))
            .collect()
    }
}

/// Parses summary text line by line.
///
/// Accepts `\n` and `\r\n` line breaks. Blank lines are skipped without
/// being counted as discarded.
pub fn parse_summary(text: &str, snapper: &Snapper) -> ParsedSummary {
    let mut parsed = ParsedSummary::default();
    for line in text.split(LINE_SEPARATOR) {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line, snapper) {
            Some(record) => parsed.lines.push(record),
            None => parsed.discarded += 1,
        }
    }
    parsed
}

fn parse_line(line: &str, snapper: &Snapper) -> Option<ParsedLine> {
    let caps = SUMMARY_LINE_RE.captures(line)?;
    let number = |group: usize| -> Option<u32> { caps.get(group)?.as_str().parse().ok() };

    let start = snapper.snap(TimeOfDay::from_hm(number(1)?, number(2)?));
    let end = snapper.snap(TimeOfDay::from_hm(number(3)?, number(4)?));
    if end <= start {
        return None;
    }

    let label = caps
        .get(5)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    Some(ParsedLine { start, end, label })
}

#[cfg(test)]
mod tests {
    use super::{compress, encode, parse_summary};
    use crate::model::block::Block;
    use crate::model::time::TimeOfDay;
    use crate::schedule::snap::Snapper;

    fn hm(hours: u32, minutes: u32) -> TimeOfDay {
        TimeOfDay::from_hm(hours, minutes)
    }

    #[test]
    fn blank_label_closes_run() {
        let blocks = vec![
            Block::with_label(hm(8, 0), hm(8, 30), "A"),
            Block::with_label(hm(8, 30), hm(9, 0), "  "),
            Block::with_label(hm(9, 0), hm(9, 30), "A"),
        ];
        assert_eq!(encode(&blocks), "08:00-08:30 A\n09:00-09:30 A");
    }

    #[test]
    fn run_extends_across_auto_free_contiguous_blocks() {
        let blocks = vec![
            Block::with_label(hm(8, 0), hm(8, 30), "Deep work"),
            Block::with_label(hm(8, 30), hm(9, 0), "Deep work"),
            Block::with_label(hm(9, 0), hm(10, 0), "Deep work"),
            Block::new(hm(10, 0), hm(10, 30)),
        ];
        let runs = compress(&blocks);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].start, hm(8, 0));
        assert_eq!(runs[0].end, hm(10, 0));
    }

    #[test]
    fn labels_are_compared_exactly() {
        let blocks = vec![
            Block::with_label(hm(8, 0), hm(8, 30), "a"),
            Block::with_label(hm(8, 30), hm(9, 0), "A"),
        ];
        assert_eq!(compress(&blocks).len(), 2);
    }

    #[test]
    fn parse_counts_discarded_lines_but_not_blank_ones() {
        let text = "08:00-09:00 Lunch\r\n\r\nnot a line\n10:00-09:00 backwards\n";
        let parsed = parse_summary(text, &Snapper::new(30));
        assert_eq!(parsed.lines.len(), 1);
        assert_eq!(parsed.discarded, 2);
        assert_eq!(parsed.lines[0].label, "Lunch");
    }

    #[test]
    fn parse_is_lenient_about_spacing_and_snaps() {
        let parsed = parse_summary("  8:10 -  9:20   Gym  ", &Snapper::new(30));
        assert_eq!(parsed.lines.len(), 1);
        let line = &parsed.lines[0];
        assert_eq!(line.start, hm(8, 0));
        assert_eq!(line.end, hm(9, 30));
        assert_eq!(line.label, "Gym");
    }

    #[test]
    fn parse_drops_lines_that_collapse_after_snapping() {
        let parsed = parse_summary("08:05-08:10 blip", &Snapper::new(30));
        assert!(parsed.lines.is_empty());
        assert_eq!(parsed.report().discarded, 1);
        assert!(parsed.report().is_clear());
    }

    #[test]
    fn end_of_day_survives_round_trip() {
        let blocks = vec![Block::with_label(hm(23, 30), TimeOfDay::END_OF_DAY, "Sleep")];
        let text = encode(&blocks);
        assert_eq!(text, "23:30-24:00 Sleep");
        let parsed = parse_summary(&text, &Snapper::new(30));
        assert_eq!(parsed.lines.len(), 1);
    }
}
