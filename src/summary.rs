// Per-card summary record handed to the export collaborator.
// Field names are the export contract; every card appears, with 0 when it has no data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aggregate::RegionAggregate;
use crate::features::RelevantData;
use crate::region::Region;
use crate::types::RegionId;

/// Top-left corner of a card on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardCoords {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SessionSummary {
    /// Empty under the temporal policy.
    pub coords: BTreeMap<RegionId, CardCoords>,
    pub number_visits: BTreeMap<RegionId, u64>,
    pub longest_visits: BTreeMap<RegionId, u64>,
    pub longest_fixations: BTreeMap<RegionId, u64>,
    pub card_with_more_visits: Option<RegionId>,
    pub card_with_longest_visit: Option<RegionId>,
    pub card_with_longest_fixation: Option<RegionId>,
}

impl SessionSummary {
    /// Winners are the first tied entry, i.e. the lowest card in enumeration order.
    pub fn build(
        regions: &[Region],
        aggregates: &[RegionAggregate],
        relevant: &RelevantData,
    ) -> Self {
        let coords = regions
            .iter()
            .filter_map(|region| match region {
                Region::Spatial { id, bounds } => Some((
                    *id,
                    CardCoords {
                        x: bounds.top_left.x,
                        y: bounds.top_left.y,
                    },
                )),
                Region::Temporal { .. } => None,
            })
            .collect();

        let mut summary = SessionSummary {
            coords,
            card_with_more_visits: relevant.most_visited_regions.first().map(|r| r.region),
            card_with_longest_visit: relevant.longest_visits.first().map(|v| v.region),
            card_with_longest_fixation: relevant.longest_fixations.first().map(|f| f.region),
            ..Default::default()
        };

        for aggregate in aggregates {
            let id = aggregate.region;
            summary
                .number_visits
                .insert(id, aggregate.visit_count() as u64);
            summary
                .longest_visits
                .insert(id, aggregate.longest_visit_ms());
            summary
                .longest_fixations
                .insert(id, aggregate.longest_fixation_ms());
        }

        summary
    }
}
