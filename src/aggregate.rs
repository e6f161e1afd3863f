// Per-region aggregation: region columns for the raw and fixation tables, and the
// per-card sample, fixation and visit lists built from them.

use serde::{Deserialize, Serialize};

use crate::region::{RegionLayout, RegionMap};
use crate::types::*;
use crate::visits::aggregate_visits;

/// Everything that landed in one region during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionAggregate {
    pub region: RegionId,
    pub samples: Vec<GazeSample>,
    pub fixations: Vec<Fixation>,
    /// Visit episodes; `None` under the temporal policy.
    pub visits: Option<Vec<VisitEpisode>>,
}

impl RegionAggregate {
    fn empty(region: RegionId, spatial: bool) -> Self {
        RegionAggregate {
            region,
            samples: Vec::new(),
            fixations: Vec::new(),
            visits: spatial.then(Vec::new),
        }
    }

    pub fn visit_count(&self) -> usize {
        self.visits.as_ref().map_or(0, Vec::len)
    }

    pub fn longest_visit_ms(&self) -> u64 {
        self.visits
            .iter()
            .flatten()
            .map(|v| v.duration_ms)
            .max()
            .unwrap_or(0)
    }

    pub fn longest_fixation_ms(&self) -> u64 {
        self.fixations
            .iter()
            .map(|f| f.duration_ms)
            .max()
            .unwrap_or(0)
    }
}

pub fn tag_samples(layout: &RegionLayout, samples: &[GazeSample]) -> Vec<TaggedSample> {
    samples
        .iter()
        .map(|sample| TaggedSample {
            sample: *sample,
            region: layout.map_sample(sample),
        })
        .collect()
}

pub fn tag_fixations(layout: &RegionLayout, fixations: &[Fixation]) -> Vec<TaggedFixation> {
    fixations
        .iter()
        .map(|fixation| TaggedFixation {
            fixation: *fixation,
            region: layout.map_fixation(fixation),
        })
        .collect()
}

/// One aggregate per region, in enumeration order. Unmapped entries are dropped here
/// but stay in the tagged tables.
pub fn build_aggregates(
    layout: &RegionLayout,
    samples: &[TaggedSample],
    fixations: &[TaggedFixation],
) -> Vec<RegionAggregate> {
    let spatial = layout.is_spatial();
    let mut aggregates: Vec<RegionAggregate> = (0..layout.region_count())
        .map(|i| RegionAggregate::empty(RegionId::from_index(i), spatial))
        .collect();

    for tagged in samples {
        if let Some(region) = tagged.region {
            if let Some(aggregate) = aggregates.get_mut(region.index()) {
                aggregate.samples.push(tagged.sample);
            }
        }
    }

    for tagged in fixations {
        if let Some(region) = tagged.region {
            if let Some(aggregate) = aggregates.get_mut(region.index()) {
                aggregate.fixations.push(tagged.fixation);
            }
        }
    }

    if spatial {
        for (region, visits) in aggregate_visits(samples, layout.region_count()) {
            if let Some(aggregate) = aggregates.get_mut(region.index()) {
                aggregate.visits = Some(visits);
            }
        }
    }

    aggregates
}
