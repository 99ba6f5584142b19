//! Fixed-interval segmentation of admitted media (C4, spec.md §4.3).

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use subgen_models::{MediaInfo, Segment, SubgenConfig};
use tracing::{info, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// `[start, duration)` work item; `start` in seconds from the top of the
/// source. A range is re-queued with half the duration when its extracted
/// file exceeds `max_segment_bytes`.
type Range = (f64, f64);

/// Produce `ceil(media.duration_s / chunk_duration_s)` segments for
/// `source_path`, writing clip files under `scratch_dir`. `existing` is the
/// job's previously recorded segments (if any); a range whose file already
/// exists on disk with the recorded checksum is reused rather than
/// re-extracted, making the operation resumable after a crash.
pub async fn segment_media(
    source_path: impl AsRef<Path>,
    media: &MediaInfo,
    scratch_dir: impl AsRef<Path>,
    config: &SubgenConfig,
    existing: &[Segment],
) -> MediaResult<Vec<Segment>> {
    let source_path = source_path.as_ref();
    let scratch_dir = scratch_dir.as_ref();
    std::fs::create_dir_all(scratch_dir).map_err(|e| {
        MediaError::DiskExhausted(format!("cannot create scratch dir {}: {e}", scratch_dir.display()))
    })?;

    let mut work: VecDeque<Range> = initial_ranges(media.duration_s, config.chunk_duration_s).into();
    let mut finished: Vec<(Range, String, u64, PathBuf)> = Vec::new();

    while let Some((start, duration)) = work.pop_front() {
        let out_path = scratch_path(scratch_dir, start);

        if let Some(reused) = reuse_existing(existing, start, duration) {
            finished.push(reused);
            continue;
        }

        extract_range(source_path, start, duration, &out_path).await?;
        let size_bytes = std::fs::metadata(&out_path)?.len();

        if size_bytes > config.max_segment_bytes && duration > 1.0 {
            warn!(
                start,
                duration,
                size_bytes,
                limit = config.max_segment_bytes,
                "segment exceeds MAX_SEGMENT_BYTES, halving duration and re-extracting"
            );
            let _ = std::fs::remove_file(&out_path);
            let half = duration / 2.0;
            work.push_front((start + half, duration - half));
            work.push_front((start, half));
            continue;
        }

        let checksum = checksum_file(&out_path)?;
        finished.push(((start, duration), checksum, size_bytes, out_path));
    }

    finished.sort_by(|a, b| a.0 .0.partial_cmp(&b.0 .0).unwrap());

    Ok(finished
        .into_iter()
        .enumerate()
        .map(|(index, ((start, duration), checksum, size_bytes, local_path))| Segment {
            index,
            start,
            duration,
            local_path,
            blob_key: None,
            checksum,
            size_bytes,
        })
        .collect())
}

/// The nominal ranges before any chunk-size adaptation: `start = i *
/// chunk_duration`, `duration = min(chunk_duration, remaining)`.
fn initial_ranges(total_duration: f64, chunk_duration: f64) -> Vec<Range> {
    if total_duration <= 0.0 || chunk_duration <= 0.0 {
        return Vec::new();
    }
    let count = (total_duration / chunk_duration).ceil() as u64;
    (0..count)
        .map(|i| {
            let start = i as f64 * chunk_duration;
            let duration = (total_duration - start).min(chunk_duration);
            (start, duration)
        })
        .collect()
}

fn scratch_path(scratch_dir: &Path, start: f64) -> PathBuf {
    // Name by start offset in milliseconds so re-splitting a range produces
    // stable, collision-free filenames across attempts.
    scratch_dir.join(format!("segment_{:012}.mp4", (start * 1000.0).round() as u64))
}

/// Reuse a previously extracted clip if `existing` has a segment over the
/// same `[start, duration)` range, its file is still on disk, and the
/// on-disk checksum still matches the recorded one. Returns the recorded
/// checksum/size rather than recomputing, to keep a successful resume cheap.
fn reuse_existing(existing: &[Segment], start: f64, duration: f64) -> Option<(Range, String, u64, PathBuf)> {
    const EPSILON: f64 = 0.001;
    let prior = existing.iter().find(|s| {
        (s.start - start).abs() < EPSILON && (s.duration - duration).abs() < EPSILON
    })?;
    if !prior.local_path.exists() {
        return None;
    }
    let on_disk = checksum_file(&prior.local_path).ok()?;
    if on_disk != prior.checksum {
        info!(path = %prior.local_path.display(), "stale segment checksum mismatch, re-extracting");
        let _ = std::fs::remove_file(&prior.local_path);
        return None;
    }
    Some(((start, duration), prior.checksum.clone(), prior.size_bytes, prior.local_path.clone()))
}

async fn extract_range(source_path: &Path, start: f64, duration: f64, out_path: &Path) -> MediaResult<()> {
    let cmd = FfmpegCommand::new(source_path, out_path)
        .seek(start)
        .duration(duration)
        .video_codec("copy")
        .audio_codec("copy");
    FfmpegRunner::new().run(&cmd).await
}

fn checksum_file(path: &Path) -> MediaResult<String> {
    let bytes = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_multiple_produces_even_ranges() {
        let ranges = initial_ranges(120.0, 60.0);
        assert_eq!(ranges, vec![(0.0, 60.0), (60.0, 60.0)]);
    }

    #[test]
    fn remainder_produces_short_final_range() {
        let ranges = initial_ranges(125.0, 60.0);
        assert_eq!(ranges, vec![(0.0, 60.0), (60.0, 60.0), (120.0, 5.0)]);
    }

    #[test]
    fn shorter_than_chunk_produces_one_range() {
        let ranges = initial_ranges(30.0, 60.0);
        assert_eq!(ranges, vec![(0.0, 30.0)]);
    }

    #[test]
    fn scratch_path_is_stable_for_same_start() {
        let dir = Path::new("/tmp/subgen-test-scratch");
        assert_eq!(scratch_path(dir, 60.0), scratch_path(dir, 60.0));
        assert_ne!(scratch_path(dir, 60.0), scratch_path(dir, 61.0));
    }

    #[test]
    fn checksum_file_is_stable_for_same_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.bin");
        std::fs::write(&path, b"hello world").unwrap();
        let a = checksum_file(&path).unwrap();
        let b = checksum_file(&path).unwrap();
        assert_eq!(a, b);
    }
}
