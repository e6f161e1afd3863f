// Session pipeline: samples → fixations, samples → region tags → visits,
// aggregates → relevant data → summary. Either the whole report or an error.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::aggregate::{build_aggregates, tag_fixations, tag_samples, RegionAggregate};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::features::{extract_relevant_data, RelevantData};
use crate::fixation::detect_fixations;
use crate::region::{Region, RegionLayout, SpatialLayout, TemporalLayout};
use crate::summary::SessionSummary;
use crate::types::*;

/// Which region policy a run uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum AnalysisMode {
    /// Phase one: card rectangles from the grid geometry.
    Spatial,
    /// Phase two: one start timestamp per card, in passing order.
    Temporal { region_starts: Vec<Timestamp> },
}

impl AnalysisMode {
    pub fn build_layout(&self, config: &AnalysisConfig) -> Result<RegionLayout> {
        match self {
            AnalysisMode::Spatial => Ok(RegionLayout::Spatial(SpatialLayout::from_geometry(
                &config.geometry,
            ))),
            AnalysisMode::Temporal { region_starts } => Ok(RegionLayout::Temporal(
                TemporalLayout::new(region_starts.clone(), config.geometry.region_count())?,
            )),
        }
    }
}

/// Complete result of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionAnalysis {
    pub regions: Vec<Region>,
    pub raw_samples: Vec<TaggedSample>,
    pub fixations: Vec<TaggedFixation>,
    pub aggregates: Vec<RegionAggregate>,
    pub relevant: RelevantData,
    pub summary: SessionSummary,
}

/// Run the full analysis over a captured, timestamp-ordered session.
pub fn analyze_session(
    samples: &[GazeSample],
    mode: &AnalysisMode,
    config: &AnalysisConfig,
) -> Result<SessionAnalysis> {
    config.validate()?;
    let layout = mode.build_layout(config)?;
    let fixations = detect_fixations(samples, &config.fixation)?;

    let raw_samples = tag_samples(&layout, samples);
    let fixations = tag_fixations(&layout, &fixations);

    let unmapped = raw_samples.iter().filter(|t| t.region.is_none()).count();
    if unmapped == raw_samples.len() {
        warn!("none of {} samples fell inside a region", raw_samples.len());
    } else if unmapped > 0 {
        debug!("{} of {} samples are unmapped", unmapped, raw_samples.len());
    }

    let aggregates = build_aggregates(&layout, &raw_samples, &fixations);
    let relevant = extract_relevant_data(&aggregates);
    let regions = layout.regions();
    let summary = SessionSummary::build(&regions, &aggregates, &relevant);

    info!(
        "analyzed {} samples: {} fixations over {} regions",
        raw_samples.len(),
        fixations.len(),
        regions.len()
    );

    Ok(SessionAnalysis {
        regions,
        raw_samples,
        fixations,
        aggregates,
        relevant,
        summary,
    })
}
