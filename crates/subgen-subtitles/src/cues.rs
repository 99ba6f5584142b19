//! Cue Parser & Emitter (C7): parses the line-oriented cue-list text the
//! Model Adapter returns, and renders an in-memory [`Cue`] sequence back
//! into `.srt` / `.vtt` text (spec.md §4.6).
//!
//! Grounded on `vclip-media/src/clip.rs`'s `parse_timestamp` idiom, extended
//! to tolerate both `,` and `.` millisecond separators and an optional
//! leading index line.

use subgen_models::Cue;

use crate::error::{ParseError, ParseResult};

/// Parse a block-structured cue-list text: blocks separated by blank lines,
/// each an optional numeric index line, a timing line
/// `HH:MM:SS,mmm --> HH:MM:SS,mmm`, and one or more text lines.
///
/// Tolerant of a missing index line, mixed `,`/`.` separators, and trailing
/// blank lines. Rejects malformed timing syntax, `end <= start`, and
/// negative times, returning the 1-based line number of the failure.
pub fn parse_cue_text(text: &str) -> ParseResult<Vec<Cue>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<&str> = text.lines().collect();
    let mut cues = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        while i < lines.len() && lines[i].trim().is_empty() {
            i += 1;
        }
        if i >= lines.len() {
            break;
        }

        let block_start_line = i + 1;
        if lines[i].trim().parse::<u64>().is_ok() {
            i += 1;
        }
        if i >= lines.len() {
            return Err(ParseError::new(block_start_line, "expected a timing line, found end of input"));
        }

        let timing_line_no = i + 1;
        let (start, end) = parse_timing_line(lines[i], timing_line_no)?;
        i += 1;

        let mut text_lines = Vec::new();
        while i < lines.len() && !lines[i].trim().is_empty() {
            text_lines.push(lines[i]);
            i += 1;
        }
        if text_lines.is_empty() {
            return Err(ParseError::new(timing_line_no, "cue has no text lines"));
        }

        if start < 0.0 || end < 0.0 {
            return Err(ParseError::new(timing_line_no, "negative timestamp"));
        }
        if end <= start {
            return Err(ParseError::new(timing_line_no, format!("end ({end}) must be after start ({start})")));
        }

        cues.push(Cue { index: cues.len() + 1, start, end, text: text_lines.join("\n") });
    }

    Ok(cues)
}

fn parse_timing_line(line: &str, line_no: usize) -> ParseResult<(f64, f64)> {
    let (start_str, end_str) = line
        .split_once("-->")
        .ok_or_else(|| ParseError::new(line_no, format!("malformed timing line: {line:?}")))?;
    let start = parse_timestamp(start_str, line_no)?;
    let end = parse_timestamp(end_str, line_no)?;
    Ok((start, end))
}

/// Parse `HH:MM:SS,mmm` or `HH:MM:SS.mmm` to seconds.
fn parse_timestamp(ts: &str, line_no: usize) -> ParseResult<f64> {
    let ts = ts.trim();
    let (negative, rest) = match ts.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, ts),
    };
    let normalized = rest.replacen(',', ".", 1);
    let parts: Vec<&str> = normalized.split(':').collect();
    if parts.len() != 3 {
        return Err(ParseError::new(line_no, format!("malformed timestamp: {ts:?}")));
    }
    let malformed = || ParseError::new(line_no, format!("malformed timestamp: {ts:?}"));
    let hours: f64 = parts[0].parse().map_err(|_| malformed())?;
    let minutes: f64 = parts[1].parse().map_err(|_| malformed())?;
    let seconds: f64 = parts[2].parse().map_err(|_| malformed())?;
    let value = hours * 3600.0 + minutes * 60.0 + seconds;
    Ok(if negative { -value } else { value })
}

fn format_timestamp(seconds: f64, separator: char) -> String {
    let total_ms = ((seconds * 1000.0).round() as i64).max(0);
    let ms = total_ms % 1000;
    let total_s = total_ms / 1000;
    let s = total_s % 60;
    let total_m = total_s / 60;
    let m = total_m % 60;
    let h = total_m / 60;
    format!("{h:02}:{m:02}:{s:02}{separator}{ms:03}")
}

fn render_blocks(cues: &[Cue], separator: char, numbered: bool) -> String {
    let blocks: Vec<String> = cues
        .iter()
        .enumerate()
        .map(|(i, cue)| {
            let timing = format!("{} --> {}", format_timestamp(cue.start, separator), format_timestamp(cue.end, separator));
            if numbered {
                format!("{}\n{timing}\n{}", i + 1, cue.text)
            } else {
                format!("{timing}\n{}", cue.text)
            }
        })
        .collect();
    let mut body = blocks.join("\n\n");
    body.push('\n');
    body
}

/// Render as `.srt`: blocks numbered from 1, `,` millisecond separator,
/// UTF-8 with a leading byte-order mark.
pub fn emit_srt(cues: &[Cue]) -> String {
    let mut out = String::from('\u{feff}');
    out.push_str(&render_blocks(cues, ',', true));
    out
}

/// Render as `.vtt`: leading `WEBVTT` line, a blank line, then unnumbered
/// blocks with `.` millisecond separator. No byte-order mark.
pub fn emit_vtt(cues: &[Cue]) -> String {
    let mut out = String::from("WEBVTT\n\n");
    out.push_str(&render_blocks(cues, '.', false));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_block_with_index() {
        let text = "1\n00:00:01,000 --> 00:00:03,500\nHello there\n";
        let cues = parse_cue_text(text).unwrap();
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].start, 1.0);
        assert_eq!(cues[0].end, 3.5);
        assert_eq!(cues[0].text, "Hello there");
    }

    #[test]
    fn tolerates_missing_index_line() {
        let text = "00:00:00,000 --> 00:00:01,000\nHi\n";
        let cues = parse_cue_text(text).unwrap();
        assert_eq!(cues.len(), 1);
    }

    #[test]
    fn tolerates_dot_separator_and_mixed_blocks() {
        let text = "1\n00:00:00.000 --> 00:00:01.000\nHi\n\n2\n00:00:01,000 --> 00:00:02,000\nThere\n";
        let cues = parse_cue_text(text).unwrap();
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[1].start, 1.0);
    }

    #[test]
    fn tolerates_trailing_blank_lines() {
        let text = "00:00:00,000 --> 00:00:01,000\nHi\n\n\n\n";
        let cues = parse_cue_text(text).unwrap();
        assert_eq!(cues.len(), 1);
    }

    #[test]
    fn multi_line_cue_text_is_preserved() {
        let text = "00:00:00,000 --> 00:00:01,000\nLine one\nLine two\n";
        let cues = parse_cue_text(text).unwrap();
        assert_eq!(cues[0].text, "Line one\nLine two");
    }

    #[test]
    fn rejects_malformed_timing_syntax() {
        let text = "00:00:00,000 XX 00:00:01,000\nHi\n";
        let err = parse_cue_text(text).unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn rejects_end_not_after_start() {
        let text = "00:00:05,000 --> 00:00:05,000\nHi\n";
        let err = parse_cue_text(text).unwrap_err();
        assert!(err.message.contains("must be after"));
    }

    #[test]
    fn rejects_negative_timestamps() {
        let text = "-00:00:01,000 --> 00:00:02,000\nHi\n";
        let err = parse_cue_text(text).unwrap_err();
        assert!(err.message.contains("negative"));
    }

    #[test]
    fn reports_line_number_of_second_block_failure() {
        let text = "00:00:00,000 --> 00:00:01,000\nHi\n\n00:00:03,000 --> 00:00:02,000\nBad\n";
        let err = parse_cue_text(text).unwrap_err();
        assert_eq!(err.line, 4);
    }

    #[test]
    fn strips_leading_byte_order_mark() {
        let text = "\u{feff}00:00:00,000 --> 00:00:01,000\nHi\n";
        let cues = parse_cue_text(text).unwrap();
        assert_eq!(cues.len(), 1);
    }

    #[test]
    fn emit_srt_has_bom_comma_separator_and_trailing_newline() {
        let cues = vec![Cue { index: 1, start: 1.0, end: 2.5, text: "Hi".to_string() }];
        let out = emit_srt(&cues);
        assert!(out.starts_with('\u{feff}'));
        assert!(out.contains("00:00:01,000 --> 00:00:02,500"));
        assert!(out.ends_with('\n'));
        assert!(!out.ends_with("\n\n"));
    }

    #[test]
    fn emit_vtt_has_webvtt_header_dot_separator_no_numbering() {
        let cues = vec![Cue { index: 1, start: 1.0, end: 2.5, text: "Hi".to_string() }];
        let out = emit_vtt(&cues);
        assert!(out.starts_with("WEBVTT\n\n"));
        assert!(out.contains("00:00:01.000 --> 00:00:02.500"));
        assert!(!out.contains('\u{feff}'));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn emit_srt_round_trips_through_parse() {
        let cues = vec![
            Cue { index: 1, start: 0.0, end: 1.2, text: "First".to_string() },
            Cue { index: 2, start: 1.5, end: 3.0, text: "Second line\nwrapped".to_string() },
        ];
        let rendered = emit_srt(&cues);
        let reparsed = parse_cue_text(&rendered).unwrap();
        assert_eq!(reparsed.len(), 2);
        assert_eq!(reparsed[1].text, "Second line\nwrapped");
    }
}
