//! Timestamp Offset & Merger (C8): shifts per-segment cue sequences into
//! source-relative time, concatenates them, and enforces monotonicity and
//! the non-overlap / max-cue-duration policies (spec.md §4.7).

use subgen_models::{Cue, Segment};
use tracing::warn;

/// Segment-local times beyond a segment's nominal duration, but within this
/// margin, are clipped rather than rejected outright.
pub const TOLERANCE_S: f64 = 0.05;

/// Overlaps at or below this width are resolved by nudging the later cue
/// forward; larger overlaps truncate the earlier cue instead.
const OVERLAP_TIE_BREAK_S: f64 = 0.2;

/// Gap left between a truncated cue's new end and the next cue's start, so
/// the two remain strictly non-overlapping.
const TRUNCATE_EPSILON_S: f64 = 0.001;

/// Shift every cue parsed from one segment's cue text into source-relative
/// time, clipping (or dropping) cues that run past the segment's nominal
/// duration.
pub fn offset_cues(cues: &[Cue], segment: &Segment) -> Vec<Cue> {
    let mut out = Vec::with_capacity(cues.len());
    for cue in cues {
        let mut local_start = cue.start.max(0.0);
        let mut local_end = cue.end;

        if local_end > segment.duration + TOLERANCE_S {
            local_end = segment.duration;
        }
        if local_start > segment.duration + TOLERANCE_S {
            local_start = segment.duration;
        }
        if local_end <= local_start {
            continue;
        }

        out.push(Cue {
            index: 0,
            start: local_start + segment.start,
            end: local_end + segment.start,
            text: cue.text.clone(),
        });
    }
    out
}

/// Evenly split a cue longer than `max_duration` into the minimum number of
/// pieces that each respect the bound; every piece but the last runs exactly
/// `max_duration` and all pieces share the original text verbatim.
fn split_cue(cue: &Cue, max_duration: f64) -> Vec<Cue> {
    if cue.duration() <= max_duration {
        return vec![cue.clone()];
    }

    let mut pieces = Vec::new();
    let mut start = cue.start;
    while cue.end - start > max_duration {
        pieces.push(Cue { index: 0, start, end: start + max_duration, text: cue.text.clone() });
        start += max_duration;
    }
    pieces.push(Cue { index: 0, start, end: cue.end, text: cue.text.clone() });
    pieces
}

/// Merge per-segment parsed cue sequences into one source-relative,
/// non-overlapping, duration-bounded sequence, with `index` reassigned from
/// 1. Deterministic given the same inputs.
///
/// `segments` and `per_segment_cues` must be the same length and aligned by
/// position (segment order, per the job record's `segments` invariant).
pub fn merge_segments(segments: &[Segment], per_segment_cues: &[Vec<Cue>], max_cue_duration: f64) -> Vec<Cue> {
    let mut merged: Vec<Cue> = Vec::new();
    for (segment, cues) in segments.iter().zip(per_segment_cues.iter()) {
        merged.extend(offset_cues(cues, segment));
    }
    merged.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(std::cmp::Ordering::Equal));

    for i in 1..merged.len() {
        let (left, right) = merged.split_at_mut(i);
        let prev = left.last_mut().expect("split_at_mut(i) with i >= 1 yields a non-empty left half");
        let cur = &mut right[0];
        if cur.start < prev.end {
            let overlap = prev.end - cur.start;
            if overlap <= OVERLAP_TIE_BREAK_S {
                cur.start = prev.end;
            } else {
                warn!(
                    prev_end = prev.end,
                    cur_start = cur.start,
                    overlap_s = overlap,
                    "cue overlap exceeds tie-break window, truncating preceding cue"
                );
                prev.end = cur.start - TRUNCATE_EPSILON_S;
            }
        }
    }
    merged.retain(|c| !c.is_degenerate());

    let mut split: Vec<Cue> = Vec::with_capacity(merged.len());
    for cue in &merged {
        split.extend(split_cue(cue, max_cue_duration));
    }

    for (i, cue) in split.iter_mut().enumerate() {
        cue.index = i + 1;
    }
    split
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn segment(index: usize, start: f64, duration: f64) -> Segment {
        Segment {
            index,
            start,
            duration,
            local_path: PathBuf::from(format!("/tmp/seg-{index}.mp4")),
            blob_key: None,
            checksum: "hash".to_string(),
            size_bytes: 1,
        }
    }

    fn cue(start: f64, end: f64, text: &str) -> Cue {
        Cue { index: 0, start, end, text: text.to_string() }
    }

    #[test]
    fn offset_cues_shifts_into_source_relative_time() {
        let seg = segment(1, 60.0, 60.0);
        let cues = vec![cue(1.0, 3.0, "hi")];
        let offset = offset_cues(&cues, &seg);
        assert_eq!(offset[0].start, 61.0);
        assert_eq!(offset[0].end, 63.0);
    }

    #[test]
    fn offset_cues_clips_overrun_within_tolerance() {
        let seg = segment(0, 0.0, 10.0);
        let cues = vec![cue(9.0, 10.03, "hi")];
        let offset = offset_cues(&cues, &seg);
        assert_eq!(offset.len(), 1);
        assert_eq!(offset[0].end, 10.0);
    }

    #[test]
    fn offset_cues_drops_cue_made_degenerate_by_clipping() {
        let seg = segment(0, 0.0, 10.0);
        let cues = vec![cue(10.01, 10.04, "past the end")];
        let offset = offset_cues(&cues, &seg);
        assert!(offset.is_empty());
    }

    #[test]
    fn merge_concatenates_and_reindexes_from_one() {
        let segments = vec![segment(0, 0.0, 60.0), segment(1, 60.0, 60.0)];
        let per_segment = vec![vec![cue(0.0, 1.0, "a")], vec![cue(0.0, 1.0, "b")]];
        let merged = merge_segments(&segments, &per_segment, 10.0);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].index, 1);
        assert_eq!(merged[1].index, 2);
        assert_eq!(merged[1].start, 60.0);
    }

    #[test]
    fn small_overlap_snaps_next_cue_start() {
        let segments = vec![segment(0, 0.0, 10.0)];
        let per_segment = vec![vec![cue(0.0, 2.0, "a"), cue(1.9, 3.0, "b")]];
        let merged = merge_segments(&segments, &per_segment, 10.0);
        assert_eq!(merged[0].end, 2.0);
        assert_eq!(merged[1].start, 2.0);
    }

    #[test]
    fn large_overlap_truncates_preceding_cue() {
        let segments = vec![segment(0, 0.0, 10.0)];
        let per_segment = vec![vec![cue(0.0, 2.0, "a"), cue(1.0, 3.0, "b")]];
        let merged = merge_segments(&segments, &per_segment, 10.0);
        assert_eq!(merged.len(), 2);
        assert!((merged[0].end - 0.999).abs() < 1e-9);
        assert_eq!(merged[1].start, 1.0);
    }

    #[test]
    fn long_cue_is_split_into_bounded_pieces() {
        let segments = vec![segment(0, 0.0, 30.0)];
        let per_segment = vec![vec![cue(0.0, 25.0, "long")]];
        let merged = merge_segments(&segments, &per_segment, 10.0);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].start, 0.0);
        assert_eq!(merged[0].end, 10.0);
        assert_eq!(merged[1].end, 20.0);
        assert_eq!(merged[2].end, 25.0);
        for c in &merged {
            assert_eq!(c.text, "long");
        }
    }

    #[test]
    fn merge_is_deterministic() {
        let segments = vec![segment(0, 0.0, 60.0), segment(1, 60.0, 60.0)];
        let per_segment = vec![vec![cue(0.0, 1.0, "a")], vec![cue(0.0, 1.0, "b")]];
        let first = merge_segments(&segments, &per_segment, 10.0);
        let second = merge_segments(&segments, &per_segment, 10.0);
        assert_eq!(first, second);
    }
}
