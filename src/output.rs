use crate::transcribe::Segment;
use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;

// Absorbs binary representation error so 59.999 reads as 999ms, not 998.
const MILLIS_EPSILON: f64 = 1e-6;

/// Formats seconds as an SRT timestamp, `HH:MM:SS,mmm`.
///
/// Milliseconds are truncated, never rounded: 1.9995 becomes `00:00:01,999`.
/// Hours do not wrap at 24. Negative and NaN inputs are treated as zero.
pub fn format_time(seconds: f64) -> String {
    let seconds = if seconds.is_nan() { 0.0 } else { seconds.max(0.0) };

    let whole = seconds.trunc();
    let millis = ((seconds - whole) * 1000.0 + MILLIS_EPSILON)
        .trunc()
        .min(999.0) as u64;

    let seconds_int = whole as u64;
    let minutes = seconds_int / 60;
    let hours = minutes / 60;

    format!(
        "{:02}:{:02}:{:02},{:03}",
        hours,
        minutes % 60,
        seconds_int % 60,
        millis
    )
}

/// Renders segments as an SRT document.
///
/// Blocks are numbered from 1 in input order and separated by a blank line;
/// the document ends with one. No sorting, merging or clipping happens here.
pub fn format_srt(segments: &[Segment]) -> String {
    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            format!(
                "{}\n{} --> {}\n{}\n\n",
                i + 1,
                format_time(segment.start),
                format_time(segment.end),
                segment.text
            )
        })
        .collect()
}

pub fn save_srt(path: &Path, subtitles: &str) -> Result<()> {
    std::fs::write(path, subtitles)
        .with_context(|| format!("Failed to write subtitles to {:?}", path))
}

pub fn save_transcript_json(path: &Path, segments: &[Segment]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create transcript {:?}", path))?;
    serde_json::to_writer_pretty(file, segments)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn seg(start: f64, end: f64, text: &str) -> Segment {
        Segment {
            start,
            end,
            text: text.to_string(),
        }
    }

    #[test]
    fn formats_known_timestamps() {
        assert_eq!(format_time(0.0), "00:00:00,000");
        assert_eq!(format_time(3661.5), "01:01:01,500");
        assert_eq!(format_time(4.5), "00:00:04,500");
        assert_eq!(format_time(12.345), "00:00:12,345");
        assert_eq!(format_time(1.001), "00:00:01,001");
    }

    #[test]
    fn truncates_milliseconds() {
        assert_eq!(format_time(59.999), "00:00:59,999");
        assert_eq!(format_time(1.9995), "00:00:01,999");
        assert_eq!(format_time(0.0009), "00:00:00,000");
    }

    #[test]
    fn hours_do_not_wrap() {
        assert_eq!(format_time(90_000.25), "25:00:00,250");
        assert_eq!(format_time(360_000.0), "100:00:00,000");
    }

    #[test]
    fn negative_and_nan_clamp_to_zero() {
        assert_eq!(format_time(-3.0), "00:00:00,000");
        assert_eq!(format_time(f64::NAN), "00:00:00,000");
    }

    #[test]
    fn empty_input_gives_empty_document() {
        assert_eq!(format_srt(&[]), "");
    }

    #[test]
    fn two_segments() {
        let srt = format_srt(&[seg(0.0, 2.0, "Hello"), seg(2.0, 4.5, "World")]);
        assert_eq!(
            srt,
            "1\n00:00:00,000 --> 00:00:02,000\nHello\n\n\
             2\n00:00:02,000 --> 00:00:04,500\nWorld\n\n"
        );
    }

    #[test]
    fn keeps_input_order_and_empty_text() {
        let srt = format_srt(&[
            seg(10.0, 12.0, "later"),
            seg(1.0, 3.5, ""),
            seg(5.0, 6.0, " Grüße, 世界"),
        ]);
        assert_eq!(
            srt,
            "1\n00:00:10,000 --> 00:00:12,000\nlater\n\n\
             2\n00:00:01,000 --> 00:00:03,500\n\n\n\
             3\n00:00:05,000 --> 00:00:06,000\n Grüße, 世界\n\n"
        );
    }

    #[test]
    fn multiline_text_is_written_verbatim() {
        let srt = format_srt(&[seg(7.25, 9.0, "first line\nsecond line")]);
        assert_eq!(
            srt,
            "1\n00:00:07,250 --> 00:00:09,000\nfirst line\nsecond line\n\n"
        );
    }

    #[test]
    fn saves_utf8_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talk_subtitles.srt");
        let srt = format_srt(&[seg(0.0, 1.0, "Ça va?")]);

        save_srt(&path, &srt).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), srt);
    }

    #[test]
    fn save_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.srt");
        assert!(save_srt(&path, "1\n").is_err());
    }

    #[test]
    fn transcript_json_keeps_seconds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talk.transcript.json");
        save_transcript_json(&path, &[seg(0.5, 1.25, "hi")]).unwrap();

        let parsed: Vec<Segment> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed, vec![seg(0.5, 1.25, "hi")]);
    }

    proptest! {
        #[test]
        fn timestamp_shape(t in 0.0f64..1_000_000.0) {
            let s = format_time(t);
            let (hms, millis) = s.split_once(',').unwrap();
            let parts: Vec<&str> = hms.split(':').collect();
            prop_assert_eq!(parts.len(), 3);
            prop_assert!(parts[0].len() >= 2);
            prop_assert_eq!(parts[1].len(), 2);
            prop_assert_eq!(parts[2].len(), 2);
            prop_assert!(parts[1].parse::<u32>().unwrap() < 60);
            prop_assert!(parts[2].parse::<u32>().unwrap() < 60);
            prop_assert_eq!(millis.len(), 3);
            prop_assert!(millis.parse::<u32>().unwrap() <= 999);
        }

        #[test]
        fn one_block_per_segment(texts in proptest::collection::vec("[a-z][a-z ]{0,11}", 0..20)) {
            let segments: Vec<Segment> = texts
                .iter()
                .enumerate()
                .map(|(i, t)| seg(i as f64, i as f64 + 0.5, t))
                .collect();
            let srt = format_srt(&segments);
            let indices: Vec<String> = srt
                .split("\n\n")
                .filter(|b| !b.is_empty())
                .map(|b| b.lines().next().unwrap().to_string())
                .collect();
            let expected: Vec<String> = (1..=segments.len()).map(|i| i.to_string()).collect();
            prop_assert_eq!(indices, expected);
        }
    }
}
