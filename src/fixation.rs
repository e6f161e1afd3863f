// Dispersion-based fixation detection over a time-ordered gaze stream.
// Single forward pass; the window's dispersion is tracked incrementally because
// adding a point can only raise the maximum pairwise distance.

use log::{debug, warn};

use crate::config::{DurationFilter, FixationSettings};
use crate::error::{AnalysisError, Result};
use crate::types::*;

/// Streaming fixation detector. Feed samples in timestamp order with [`push`],
/// then call [`finish`] to close the trailing window.
///
/// [`push`]: FixationDetector::push
/// [`finish`]: FixationDetector::finish
pub struct FixationDetector {
    settings: FixationSettings,
    window: Vec<GazeSample>,
    dispersion: f64,
    rejected_short: usize,
}

impl FixationDetector {
    pub fn new(settings: FixationSettings) -> Self {
        FixationDetector {
            settings,
            window: Vec::new(),
            dispersion: 0.0,
            rejected_short: 0,
        }
    }

    /// Add the next sample. Returns a fixation when this sample breaks the current
    /// window and the closed window qualifies.
    pub fn push(&mut self, sample: GazeSample) -> Option<Fixation> {
        if self.window.is_empty() {
            self.window.push(sample);
            return None;
        }

        let position = sample.position();
        let farthest = self
            .window
            .iter()
            .map(|member| member.position().distance_to(&position))
            .fold(0.0_f64, f64::max);
        let candidate = self.dispersion.max(farthest);

        if candidate <= self.settings.dispersion_threshold_px {
            self.window.push(sample);
            self.dispersion = candidate;
            return None;
        }

        let closed = self.close_window(false);
        self.window.push(sample);
        self.dispersion = 0.0;
        closed
    }

    /// Close the window open at stream end.
    pub fn finish(&mut self) -> Option<Fixation> {
        let closed = self.close_window(true);
        self.dispersion = 0.0;
        if self.rejected_short > 0 {
            debug!(
                "{} candidate window(s) shorter than {}ms were dropped",
                self.rejected_short, self.settings.min_duration_ms
            );
        }
        closed
    }

    /// Candidate windows dropped by the duration filter so far.
    pub fn rejected_short(&self) -> usize {
        self.rejected_short
    }

    fn close_window(&mut self, trailing: bool) -> Option<Fixation> {
        let members = std::mem::take(&mut self.window);
        if members.len() < 2 {
            return None;
        }

        let start = members[0].timestamp;
        let end = members[members.len() - 1].timestamp;
        let duration_ms = end.millis_since(start);

        let checked = match self.settings.duration_filter {
            DurationFilter::AllWindows => true,
            DurationFilter::TrailingWindowOnly => trailing,
        };
        if checked && duration_ms < self.settings.min_duration_ms {
            self.rejected_short += 1;
            return None;
        }

        let count = members.len() as f64;
        let (sum_x, sum_y) = members
            .iter()
            .fold((0.0, 0.0), |(sx, sy), s| (sx + s.x, sy + s.y));

        Some(Fixation {
            x: sum_x / count,
            y: sum_y / count,
            duration_ms,
            start,
            end,
            sample_count: members.len(),
        })
    }
}

/// Detect fixations in a complete, timestamp-ordered session.
pub fn detect_fixations(samples: &[GazeSample], settings: &FixationSettings) -> Result<Vec<Fixation>> {
    if samples.len() < 2 {
        return Err(AnalysisError::InsufficientData {
            found: samples.len(),
        });
    }

    let mut detector = FixationDetector::new(settings.clone());
    let mut fixations: Vec<Fixation> = samples
        .iter()
        .filter_map(|sample| detector.push(*sample))
        .collect();
    fixations.extend(detector.finish());

    if fixations.is_empty() {
        warn!(
            "no fixations found in {} samples ({}px / {}ms)",
            samples.len(),
            settings.dispersion_threshold_px,
            settings.min_duration_ms
        );
    } else {
        debug!(
            "detected {} fixations in {} samples",
            fixations.len(),
            samples.len()
        );
    }

    Ok(fixations)
}
