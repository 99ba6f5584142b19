//! Input admission policy (C3, spec.md §4.2).

use std::path::Path;

use subgen_models::{MediaInfo, SubgenConfig};

use crate::error::{MediaError, MediaResult};
use crate::probe::probe_media;

/// Probe `source_path` and admit or reject it per the configured policy.
///
/// Admits if: the file exists and is readable; a video stream and an audio
/// stream are present (audio is required, generation has no fallback);
/// `duration > 0` and `<= max_duration_s`; `size_bytes <= max_video_size_bytes`;
/// the codec is in `admitted_codecs`. Rejects otherwise with `InvalidInput`
/// and a precise reason.
pub async fn admit(source_path: impl AsRef<Path>, config: &SubgenConfig) -> MediaResult<MediaInfo> {
    let path = source_path.as_ref();
    if !path.exists() {
        return Err(MediaError::invalid_input(format!(
            "source file does not exist: {}",
            path.display()
        )));
    }

    let media = probe_media(path).await?;
    check(&media, config)?;
    Ok(media)
}

/// Re-check an already-probed `MediaInfo` against the admission policy
/// without re-invoking `ffprobe`.
pub fn check(media: &MediaInfo, config: &SubgenConfig) -> MediaResult<()> {
    if !media.has_audio {
        return Err(MediaError::invalid_input(
            "no audio stream present; generation has no fallback for silent input",
        ));
    }
    if media.duration_s <= 0.0 {
        return Err(MediaError::invalid_input(format!(
            "duration must be positive, got {:.3}s",
            media.duration_s
        )));
    }
    if media.duration_s > config.max_duration_s {
        return Err(MediaError::invalid_input(format!(
            "duration {:.3}s exceeds ceiling {:.3}s",
            media.duration_s, config.max_duration_s
        )));
    }
    if media.size_bytes > config.max_video_size_bytes {
        return Err(MediaError::invalid_input(format!(
            "size {} bytes exceeds ceiling {} bytes",
            media.size_bytes, config.max_video_size_bytes
        )));
    }
    if !config.admitted_codecs.is_empty()
        && !config
            .admitted_codecs
            .iter()
            .any(|c| c.eq_ignore_ascii_case(&media.codec))
    {
        return Err(MediaError::invalid_input(format!(
            "codec {:?} is not in the admitted set {:?}",
            media.codec, config.admitted_codecs
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(overrides: impl FnOnce(&mut MediaInfo)) -> MediaInfo {
        let mut m = MediaInfo {
            duration_s: 125.0,
            width: 1920,
            height: 1080,
            frame_rate: 30.0,
            has_audio: true,
            codec: "h264".to_string(),
            size_bytes: 1024,
        };
        overrides(&mut m);
        m
    }

    #[test]
    fn admits_well_formed_media() {
        let cfg = SubgenConfig::default();
        assert!(check(&media(|_| {}), &cfg).is_ok());
    }

    #[test]
    fn rejects_missing_audio() {
        let cfg = SubgenConfig::default();
        let m = media(|m| m.has_audio = false);
        let err = check(&m, &cfg).unwrap_err();
        assert!(matches!(err, MediaError::InvalidInput(_)));
    }

    #[test]
    fn rejects_zero_duration() {
        let cfg = SubgenConfig::default();
        let m = media(|m| m.duration_s = 0.0);
        assert!(check(&m, &cfg).is_err());
    }

    #[test]
    fn rejects_duration_over_ceiling() {
        let cfg = SubgenConfig::default();
        let m = media(|m| m.duration_s = cfg.max_duration_s + 1.0);
        assert!(check(&m, &cfg).is_err());
    }

    #[test]
    fn rejects_size_over_ceiling() {
        let cfg = SubgenConfig::default();
        let m = media(|m| m.size_bytes = cfg.max_video_size_bytes + 1);
        assert!(check(&m, &cfg).is_err());
    }

    #[test]
    fn rejects_unadmitted_codec() {
        let cfg = SubgenConfig::default();
        let m = media(|m| m.codec = "mpeg2".to_string());
        assert!(check(&m, &cfg).is_err());
    }

    #[test]
    fn empty_admitted_set_permits_any_codec() {
        let mut cfg = SubgenConfig::default();
        cfg.admitted_codecs.clear();
        let m = media(|m| m.codec = "mpeg2".to_string());
        assert!(check(&m, &cfg).is_ok());
    }
}
