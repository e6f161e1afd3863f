// gaze_core: eye-tracking session analysis for the card search experiment.
// Batch pipeline over a captured gaze stream: fixations, card regions, visits, summary.

mod aggregate;
mod config;
mod error;
mod features;
mod fixation;
mod ingest;
mod pipeline;
mod region;
mod summary;
mod types;
mod visits;

use wasm_bindgen::prelude::*;

pub use aggregate::{build_aggregates, tag_fixations, tag_samples, RegionAggregate};
pub use config::{AnalysisConfig, DurationFilter, FixationSettings, GridGeometry, MAX_CARDS};
pub use error::AnalysisError;
pub use features::{
    extract_relevant_data, RegionFixation, RegionVisit, RegionVisitCount, RelevantData, TieMax,
};
pub use fixation::{detect_fixations, FixationDetector};
pub use ingest::{parse_flat_records, parse_json_samples, parse_region_starts};
pub use pipeline::{analyze_session, AnalysisMode, SessionAnalysis};
pub use region::{Region, RegionLayout, RegionMap, SpatialLayout, TemporalLayout};
pub use summary::{CardCoords, SessionSummary};
pub use types::*;
pub use visits::aggregate_visits;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Analyzer interface exposed to JavaScript.
/// One call per session: samples in as JSON or flat records, full report out as JSON.
#[wasm_bindgen]
pub struct GazeAnalyzer {
    config: AnalysisConfig,
}

impl GazeAnalyzer {
    pub fn with_config(config: AnalysisConfig) -> error::Result<GazeAnalyzer> {
        config.validate()?;
        Ok(GazeAnalyzer { config })
    }

    pub fn analyze(
        &self,
        samples: &[GazeSample],
        mode: &AnalysisMode,
    ) -> error::Result<SessionAnalysis> {
        analyze_session(samples, mode, &self.config)
    }

    fn report_json(&self, samples: &[GazeSample], mode: &AnalysisMode) -> error::Result<String> {
        let analysis = self.analyze(samples, mode)?;
        Ok(serde_json::to_string(&analysis)?)
    }

    fn mode_from_starts(region_starts_json: Option<&str>) -> error::Result<AnalysisMode> {
        match region_starts_json {
            None => Ok(AnalysisMode::Spatial),
            Some(json) => Ok(AnalysisMode::Temporal {
                region_starts: parse_region_starts(json)?,
            }),
        }
    }

    /// Parse, analyze and serialize in one step. Without region starts the run is spatial.
    pub fn analyze_records_json(
        &self,
        records: &str,
        region_starts_json: Option<&str>,
    ) -> error::Result<String> {
        let samples = parse_flat_records(records)?;
        let mode = Self::mode_from_starts(region_starts_json)?;
        self.report_json(&samples, &mode)
    }

    pub fn analyze_samples_json(
        &self,
        samples_json: &str,
        region_starts_json: Option<&str>,
    ) -> error::Result<String> {
        let samples = parse_json_samples(samples_json)?;
        let mode = Self::mode_from_starts(region_starts_json)?;
        self.report_json(&samples, &mode)
    }
}

fn to_js(err: AnalysisError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
impl GazeAnalyzer {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<GazeAnalyzer, JsValue> {
        let config = AnalysisConfig::from_json(config_json).map_err(to_js)?;
        Ok(GazeAnalyzer { config })
    }

    /// Phase one: samples JSON `[{x, y, timestamp_ms}]`, card regions from the grid.
    pub fn analyze_spatial(&self, samples_json: &str) -> Result<String, JsValue> {
        self.analyze_samples_json(samples_json, None).map_err(to_js)
    }

    /// Phase two: samples JSON plus a JSON array of card start timestamps.
    pub fn analyze_temporal(
        &self,
        samples_json: &str,
        region_starts_json: &str,
    ) -> Result<String, JsValue> {
        self.analyze_samples_json(samples_json, Some(region_starts_json))
            .map_err(to_js)
    }

    /// Flat record file contents (x, y, timestamp_ms per line). Pass region starts
    /// for phase two, omit them for phase one.
    pub fn analyze_flat_records(
        &self,
        records: &str,
        region_starts_json: Option<String>,
    ) -> Result<String, JsValue> {
        self.analyze_records_json(records, region_starts_json.as_deref())
            .map_err(to_js)
    }
}
