// Sample ingest from the capture collaborator.
// Flat record files hold one value per line, repeating x, y, timestamp_ms.

use log::debug;

use crate::error::{AnalysisError, Result};
use crate::types::{GazeSample, Timestamp};

const LINES_PER_RECORD: usize = 3;

/// Parse a flat record list. Trailing blank lines are ignored; anything else that
/// does not form a complete `x`, `y`, `timestamp_ms` triple aborts with `MalformedInput`.
pub fn parse_flat_records(text: &str) -> Result<Vec<GazeSample>> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let used = lines
        .iter()
        .rposition(|line| !line.is_empty())
        .map_or(0, |last| last + 1);
    let lines = &lines[..used];

    if lines.len() % LINES_PER_RECORD != 0 {
        return Err(AnalysisError::MalformedInput {
            line: lines.len(),
            message: format!(
                "incomplete record: {} trailing line(s), expected groups of {}",
                lines.len() % LINES_PER_RECORD,
                LINES_PER_RECORD
            ),
        });
    }

    let mut samples = Vec::with_capacity(lines.len() / LINES_PER_RECORD);
    for (record, chunk) in lines.chunks(LINES_PER_RECORD).enumerate() {
        let first_line = record * LINES_PER_RECORD + 1;
        let x = parse_coordinate(chunk[0], first_line)?;
        let y = parse_coordinate(chunk[1], first_line + 1)?;
        let timestamp = parse_timestamp(chunk[2], first_line + 2)?;
        samples.push(GazeSample { x, y, timestamp });
    }

    debug!("parsed {} gaze samples from flat records", samples.len());
    Ok(samples)
}

/// Parse a JSON array of `{ "x", "y", "timestamp_ms" }` records, the same shape
/// the raw table exports.
pub fn parse_json_samples(json: &str) -> Result<Vec<GazeSample>> {
    let samples: Vec<GazeSample> =
        serde_json::from_str(json).map_err(|e| AnalysisError::MalformedInput {
            line: e.line(),
            message: e.to_string(),
        })?;

    if let Some(i) = samples
        .iter()
        .position(|s| !s.x.is_finite() || !s.y.is_finite())
    {
        return Err(AnalysisError::MalformedInput {
            line: i + 1,
            message: format!("non-finite coordinate in record {}", i),
        });
    }
    Ok(samples)
}

/// Parse a JSON array of region start timestamps (milliseconds).
pub fn parse_region_starts(json: &str) -> Result<Vec<Timestamp>> {
    let starts: Vec<u64> =
        serde_json::from_str(json).map_err(|e| AnalysisError::MalformedInput {
            line: e.line(),
            message: e.to_string(),
        })?;
    Ok(starts.into_iter().map(Timestamp::from_millis).collect())
}

fn parse_coordinate(raw: &str, line: usize) -> Result<f64> {
    let value: f64 = raw.parse().map_err(|_| AnalysisError::MalformedInput {
        line,
        message: format!("expected a coordinate, got {:?}", raw),
    })?;
    if !value.is_finite() {
        return Err(AnalysisError::MalformedInput {
            line,
            message: format!("coordinate is not finite: {:?}", raw),
        });
    }
    Ok(value)
}

fn parse_timestamp(raw: &str, line: usize) -> Result<Timestamp> {
    raw.parse::<u64>()
        .map(Timestamp::from_millis)
        .map_err(|_| AnalysisError::MalformedInput {
            line,
            message: format!("expected an integer timestamp in ms, got {:?}", raw),
        })
}
