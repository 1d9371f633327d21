//! Script encoding and decoding.
//!
//! A script is UTF-8 text with one segment per line:
//!
//! ```text
//! # <comment lines>
//! <start_ms> <duration_ms> <bandwidth> <delay> <loss> <description...>
//! ```
//!
//! The description is the rest of the line. It is neither quoted nor
//! escaped, so it must stay the last field.

mod bucket;
pub mod export;

use std::fmt::Write as _;
use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::{ParsedRecord, Timeline};

pub use bucket::{BucketMode, PhaseBuckets};

/// Number of whitespace-separated tokens a data line needs at minimum.
pub const MIN_FIELDS: usize = 6;

const INTEGER_FIELDS: [&str; 5] = ["start_ms", "duration_ms", "bandwidth", "delay", "loss"];

/// Render a timeline as script text.
pub fn encode(timeline: &Timeline, scenario_name: &str) -> String {
    let total_ms = timeline.total_duration_ms();
    // A line break in the name would turn the rest of it into a data line.
    let name = scenario_name.replace(['\r', '\n'], " ");

    let mut out = String::with_capacity(64 * (timeline.len() + 4));
    // Writing into a String cannot fail.
    let _ = writeln!(out, "# 网络仿真脚本 - {name}");
    let _ = writeln!(out, "# 总时长: {}秒 ({total_ms}ms)", total_ms as f64 / 1000.0);
    let _ = writeln!(out, "# 格式: 开始时间(ms) 持续时间(ms) 带宽(Mbps) 延迟(ms) 丢包率(‰) 描述");
    let _ = writeln!(out, "#");

    for seg in timeline.segments() {
        let _ = writeln!(
            out,
            "{} {} {} {} {} {}",
            seg.start_ms, seg.duration_ms, seg.bandwidth, seg.delay, seg.loss, seg.description
        );
    }

    out
}

/// Encode a timeline and write it to `path` in one go.
pub fn write_script<P: AsRef<Path>>(path: P, timeline: &Timeline, scenario_name: &str) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, encode(timeline, scenario_name))?;
    info!(
        path = %path.display(),
        scenario = scenario_name,
        segments = timeline.len(),
        "script written"
    );
    Ok(())
}

/// Parse script text into records.
///
/// Blank lines and `#` comments are skipped, as are lines with fewer than
/// [`MIN_FIELDS`] tokens. A line with enough tokens whose first five are not
/// all integers fails the whole decode.
pub fn decode(source: &str, buckets: &PhaseBuckets) -> Result<Vec<ParsedRecord>> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let mut records = Vec::new();

    for (idx, line) in source.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if tokens.len() < MIN_FIELDS {
            debug!(line = idx + 1, tokens = tokens.len(), "skipping short line");
            continue;
        }

        let mut values = [0_i64; 5];
        for ((value, token), field) in values.iter_mut().zip(&tokens).zip(INTEGER_FIELDS) {
            *value = token.parse().map_err(|source| Error::MalformedRecord {
                line: idx + 1,
                field,
                source,
            })?;
        }
        let [start_ms, duration_ms, bandwidth, delay, loss] = values;

        records.push(ParsedRecord {
            start_ms,
            duration_ms,
            mid_time_s: start_ms as f64 / 1000.0 + duration_ms as f64 / 2000.0,
            bandwidth,
            delay,
            loss,
            description: tokens[MIN_FIELDS - 1..].join(" "),
            phase_bucket: buckets.classify(start_ms),
        });
    }

    Ok(records)
}

/// Read and decode a script file.
///
/// A missing file is reported as [`Error::SourceNotFound`].
pub fn read_script<P: AsRef<Path>>(path: P, buckets: &PhaseBuckets) -> Result<Vec<ParsedRecord>> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::SourceNotFound(path.to_path_buf()),
        _ => Error::Io(e),
    })?;
    decode(&source, buckets)
}

/// Like [`read_script`], but a missing file yields `Ok(None)` so batch
/// readers can move on to the next input.
pub fn try_read_script<P: AsRef<Path>>(
    path: P,
    buckets: &PhaseBuckets,
) -> Result<Option<Vec<ParsedRecord>>> {
    match read_script(path, buckets) {
        Ok(records) => Ok(Some(records)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::CongestionLevel;
    use crate::types::{Phase, Segment};

    fn sample_timeline() -> Timeline {
        let phases = vec![Phase {
            index: 1,
            level: CongestionLevel::Low,
            start_ms: 0,
            duration_ms: 20_000,
        }];
        let segments = vec![
            Segment {
                start_ms: 0,
                duration_ms: 10_000,
                bandwidth: 95,
                delay: 150,
                loss: 3,
                description: "阶段1: 低拥塞-时间段1".into(),
            },
            Segment {
                start_ms: 10_000,
                duration_ms: 10_000,
                bandwidth: 97,
                delay: 142,
                loss: 4,
                description: "阶段1: 低拥塞-时间段2".into(),
            },
        ];
        Timeline::new(1_200_000, phases, segments)
    }

    #[test]
    fn test_encode_layout() {
        let text = encode(&sample_timeline(), "低-中-低拥塞场景");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "# 网络仿真脚本 - 低-中-低拥塞场景");
        assert_eq!(lines[1], "# 总时长: 1200秒 (1200000ms)");
        assert!(lines[2].starts_with("# 格式:"));
        assert_eq!(lines[3], "#");
        assert_eq!(lines[4], "0 10000 95 150 3 阶段1: 低拥塞-时间段1");
        assert_eq!(lines[5], "10000 10000 97 142 4 阶段1: 低拥塞-时间段2");
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_encode_sanitizes_header_name() {
        let text = encode(&sample_timeline(), "two\nlines");
        assert!(text.starts_with("# 网络仿真脚本 - two lines\n"));
        assert_eq!(decode(&text, &PhaseBuckets::fixed()).unwrap().len(), 2);
    }

    #[test]
    fn test_decode_roundtrip() {
        let timeline = sample_timeline();
        let records = decode(&encode(&timeline, "x"), &PhaseBuckets::fixed()).unwrap();

        assert_eq!(records.len(), timeline.len());
        for (rec, seg) in records.iter().zip(timeline.segments()) {
            assert_eq!(
                (rec.start_ms, rec.duration_ms, rec.bandwidth, rec.delay, rec.loss),
                (seg.start_ms, seg.duration_ms, seg.bandwidth, seg.delay, seg.loss)
            );
            assert_eq!(rec.description, seg.description);
        }
        assert_eq!(records[0].mid_time_s, 5.0);
        assert_eq!(records[1].mid_time_s, 15.0);
    }

    #[test]
    fn test_decode_comments_only() {
        let text = "# header\n\n   \n  # indented comment\n#\n";
        assert!(decode(text, &PhaseBuckets::fixed()).unwrap().is_empty());
        assert!(decode("", &PhaseBuckets::fixed()).unwrap().is_empty());
    }

    #[test]
    fn test_decode_skips_short_lines() {
        let text = "100 200 50\n0 10000 90 120 2 ok\n1 2 3 4 5\n";
        let records = decode(text, &PhaseBuckets::fixed()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "ok");
    }

    #[test]
    fn test_decode_rejects_non_integer() {
        let err = decode("abc 200 50 1 2 desc", &PhaseBuckets::fixed()).unwrap_err();
        match err {
            Error::MalformedRecord { line, field, .. } => {
                assert_eq!(line, 1);
                assert_eq!(field, "start_ms");
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }

        let text = "# c\n0 10000 90 120 2 ok\n10000 10000 90 1.5 2 bad\n";
        match decode(text, &PhaseBuckets::fixed()) {
            Err(Error::MalformedRecord { line: 3, field: "delay", .. }) => {}
            other => panic!("expected MalformedRecord on line 3, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_normalizes_description_whitespace() {
        let text = "  5000\t10000  90 120 2   phase   one\ttail  \r\n";
        let records = decode(text, &PhaseBuckets::fixed()).unwrap();
        assert_eq!(records[0].description, "phase one tail");
        assert_eq!(records[0].mid_time_s, 10.0);
    }

    #[test]
    fn test_decode_buckets() {
        let text = "399000 10000 90 120 2 a\n400000 10000 90 120 2 b\n800000 10000 90 120 2 c\n";
        let fixed: Vec<u8> = decode(text, &PhaseBuckets::fixed())
            .unwrap()
            .iter()
            .map(|r| r.phase_bucket)
            .collect();
        assert_eq!(fixed, vec![1, 2, 3]);

        let scaled: Vec<u8> = decode(text, &PhaseBuckets::scaled(600_000))
            .unwrap()
            .iter()
            .map(|r| r.phase_bucket)
            .collect();
        assert_eq!(scaled, vec![2, 3, 3]);
    }

    #[test]
    fn test_decode_strips_bom() {
        let text = "\u{feff}0 10000 90 120 2 first\n";
        assert_eq!(decode(text, &PhaseBuckets::fixed()).unwrap().len(), 1);
    }
}
