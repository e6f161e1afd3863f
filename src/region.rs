// Region assignment. Phase one maps positions onto card rectangles; phase two maps
// timestamps onto the windows during which each card was passing.

use serde::{Deserialize, Serialize};

use crate::config::GridGeometry;
use crate::error::{AnalysisError, Result};
use crate::types::*;

/// Shared contract of both region policies. Every sample and fixation maps to
/// exactly one region or to `None` (unmapped).
pub trait RegionMap {
    fn region_count(&self) -> usize;

    fn map_sample(&self, sample: &GazeSample) -> Option<RegionId>;

    fn map_fixation(&self, fixation: &Fixation) -> Option<RegionId>;
}

/// A region descriptor for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Region {
    Spatial { id: RegionId, bounds: ScreenRect },
    /// Half-open `[start, end)`; the last window has no end.
    Temporal {
        id: RegionId,
        start: Timestamp,
        end: Option<Timestamp>,
    },
}

impl Region {
    pub fn id(&self) -> RegionId {
        match self {
            Region::Spatial { id, .. } | Region::Temporal { id, .. } => *id,
        }
    }
}

/// Card rectangles in enumeration order.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialLayout {
    rects: Vec<ScreenRect>,
}

impl SpatialLayout {
    pub fn new(rects: Vec<ScreenRect>) -> Self {
        SpatialLayout { rects }
    }

    pub fn from_geometry(geometry: &GridGeometry) -> Self {
        SpatialLayout::new(geometry.card_rects())
    }

    /// First rectangle containing the point. Enumeration order settles overlaps.
    pub fn map_point(&self, point: &ScreenPoint) -> Option<RegionId> {
        self.rects
            .iter()
            .position(|rect| rect.contains(point))
            .map(RegionId::from_index)
    }

    pub fn rects(&self) -> &[ScreenRect] {
        &self.rects
    }
}

impl RegionMap for SpatialLayout {
    fn region_count(&self) -> usize {
        self.rects.len()
    }

    fn map_sample(&self, sample: &GazeSample) -> Option<RegionId> {
        self.map_point(&sample.position())
    }

    fn map_fixation(&self, fixation: &Fixation) -> Option<RegionId> {
        self.map_point(&fixation.position())
    }
}

/// Card-appearance timestamps, one per card, non-decreasing.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalLayout {
    starts: Vec<Timestamp>,
}

impl TemporalLayout {
    /// Fails fast when the number of starts differs from the expected card count.
    pub fn new(starts: Vec<Timestamp>, expected_regions: usize) -> Result<Self> {
        if starts.len() != expected_regions {
            return Err(AnalysisError::RegionCountMismatch {
                expected: expected_regions,
                found: starts.len(),
            });
        }
        if let Some(i) = starts.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(AnalysisError::InvalidConfig(format!(
                "region starts must be non-decreasing: {}ms follows {}ms",
                starts[i + 1].as_millis(),
                starts[i].as_millis()
            )));
        }
        Ok(TemporalLayout { starts })
    }

    /// Window whose start is the greatest start not after `timestamp`. Timestamps
    /// before the first start are unmapped; the last window never ends.
    pub fn map_timestamp(&self, timestamp: Timestamp) -> Option<RegionId> {
        match self.starts.partition_point(|start| *start <= timestamp) {
            0 => None,
            n => Some(RegionId::from_index(n - 1)),
        }
    }

    pub fn starts(&self) -> &[Timestamp] {
        &self.starts
    }
}

impl RegionMap for TemporalLayout {
    fn region_count(&self) -> usize {
        self.starts.len()
    }

    fn map_sample(&self, sample: &GazeSample) -> Option<RegionId> {
        self.map_timestamp(sample.timestamp)
    }

    /// Fixations belong to the window in which they began.
    fn map_fixation(&self, fixation: &Fixation) -> Option<RegionId> {
        self.map_timestamp(fixation.start)
    }
}

/// The region policy chosen for a run.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionLayout {
    Spatial(SpatialLayout),
    Temporal(TemporalLayout),
}

impl RegionLayout {
    pub fn is_spatial(&self) -> bool {
        matches!(self, RegionLayout::Spatial(_))
    }

    /// Region descriptors in enumeration order.
    pub fn regions(&self) -> Vec<Region> {
        match self {
            RegionLayout::Spatial(layout) => layout
                .rects
                .iter()
                .enumerate()
                .map(|(i, rect)| Region::Spatial {
                    id: RegionId::from_index(i),
                    bounds: *rect,
                })
                .collect(),
            RegionLayout::Temporal(layout) => layout
                .starts
                .iter()
                .enumerate()
                .map(|(i, start)| Region::Temporal {
                    id: RegionId::from_index(i),
                    start: *start,
                    end: layout.starts.get(i + 1).copied(),
                })
                .collect(),
        }
    }

    fn inner(&self) -> &dyn RegionMap {
        match self {
            RegionLayout::Spatial(layout) => layout,
            RegionLayout::Temporal(layout) => layout,
        }
    }
}

impl RegionMap for RegionLayout {
    fn region_count(&self) -> usize {
        self.inner().region_count()
    }

    fn map_sample(&self, sample: &GazeSample) -> Option<RegionId> {
        self.inner().map_sample(sample)
    }

    fn map_fixation(&self, fixation: &Fixation) -> Option<RegionId> {
        self.inner().map_fixation(fixation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn square(x: f64, y: f64, size: f64) -> ScreenRect {
        ScreenRect::new(ScreenPoint::new(x, y), size, size)
    }

    fn starts(ms: &[u64]) -> Vec<Timestamp> {
        ms.iter().copied().map(Timestamp::from_millis).collect()
    }

    #[test]
    fn spatial_maps_inside_and_edges() {
        let layout = SpatialLayout::new(vec![square(0.0, 0.0, 10.0), square(20.0, 0.0, 10.0)]);
        assert_eq!(layout.map_point(&ScreenPoint::new(5.0, 5.0)), Some(RegionId::new(1)));
        assert_eq!(layout.map_point(&ScreenPoint::new(20.0, 10.0)), Some(RegionId::new(2)));
        assert_eq!(layout.map_point(&ScreenPoint::new(15.0, 5.0)), None);
    }

    #[test]
    fn overlapping_rects_pick_first() {
        let layout = SpatialLayout::new(vec![square(0.0, 0.0, 10.0), square(5.0, 5.0, 10.0)]);
        assert_eq!(layout.map_point(&ScreenPoint::new(7.0, 7.0)), Some(RegionId::new(1)));
        assert_eq!(layout.map_point(&ScreenPoint::new(12.0, 12.0)), Some(RegionId::new(2)));
    }

    #[test]
    fn spatial_fixation_uses_mean_position() {
        let layout = SpatialLayout::new(vec![square(0.0, 0.0, 10.0)]);
        let fixation = Fixation {
            x: 9.0,
            y: 9.0,
            duration_ms: 100,
            start: Timestamp::from_millis(0),
            end: Timestamp::from_millis(100),
            sample_count: 2,
        };
        assert_eq!(layout.map_fixation(&fixation), Some(RegionId::new(1)));
    }

    #[test]
    fn default_geometry_maps_card_centers() {
        let geometry = GridGeometry::default();
        let layout = SpatialLayout::from_geometry(&geometry);
        assert_eq!(layout.region_count(), 21);
        for (i, rect) in layout.rects().iter().enumerate() {
            let center = ScreenPoint::new(
                rect.top_left.x + rect.width / 2.0,
                rect.top_left.y + rect.height / 2.0,
            );
            assert_eq!(layout.map_point(&center), Some(RegionId::from_index(i)));
        }
        // Spacing between cards belongs to no card.
        let first = layout.rects()[0];
        let gap = ScreenPoint::new(first.top_left.x + first.width + 5.0, first.top_left.y + 1.0);
        assert_eq!(layout.map_point(&gap), None);
    }

    #[test]
    fn temporal_windows_are_half_open() {
        let layout = TemporalLayout::new(starts(&[100, 200, 300]), 3).unwrap();
        assert_eq!(layout.map_timestamp(Timestamp::from_millis(99)), None);
        assert_eq!(layout.map_timestamp(Timestamp::from_millis(100)), Some(RegionId::new(1)));
        assert_eq!(layout.map_timestamp(Timestamp::from_millis(199)), Some(RegionId::new(1)));
        assert_eq!(layout.map_timestamp(Timestamp::from_millis(200)), Some(RegionId::new(2)));
        assert_eq!(layout.map_timestamp(Timestamp::from_millis(300)), Some(RegionId::new(3)));
        assert_eq!(
            layout.map_timestamp(Timestamp::from_millis(1_000_000)),
            Some(RegionId::new(3))
        );
    }

    #[test]
    fn equal_starts_leave_earlier_window_empty() {
        let layout = TemporalLayout::new(starts(&[100, 100, 300]), 3).unwrap();
        assert_eq!(layout.map_timestamp(Timestamp::from_millis(99)), None);
        assert_eq!(layout.map_timestamp(Timestamp::from_millis(100)), Some(RegionId::new(2)));
        assert_eq!(layout.map_timestamp(Timestamp::from_millis(299)), Some(RegionId::new(2)));
        assert_eq!(layout.map_timestamp(Timestamp::from_millis(300)), Some(RegionId::new(3)));
    }

    #[test]
    fn temporal_fixation_uses_start() {
        let layout = TemporalLayout::new(starts(&[0, 200]), 2).unwrap();
        let fixation = Fixation {
            x: 0.0,
            y: 0.0,
            duration_ms: 150,
            start: Timestamp::from_millis(150),
            end: Timestamp::from_millis(300),
            sample_count: 4,
        };
        assert_eq!(layout.map_fixation(&fixation), Some(RegionId::new(1)));
    }

    #[test]
    fn temporal_count_mismatch_fails_fast() {
        let err = TemporalLayout::new(starts(&[0, 100]), 3).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::RegionCountMismatch {
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn temporal_rejects_decreasing_starts() {
        let err = TemporalLayout::new(starts(&[0, 300, 200]), 3).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));
    }

    #[test]
    fn layout_describes_regions() {
        let layout = RegionLayout::Temporal(TemporalLayout::new(starts(&[10, 20]), 2).unwrap());
        let regions = layout.regions();
        assert_eq!(
            regions[0],
            Region::Temporal {
                id: RegionId::new(1),
                start: Timestamp::from_millis(10),
                end: Some(Timestamp::from_millis(20)),
            }
        );
        assert_eq!(regions[1].id(), RegionId::new(2));
        assert!(matches!(regions[1], Region::Temporal { end: None, .. }));
        assert!(!layout.is_spatial());
    }

    proptest! {
        #[test]
        fn temporal_mapping_is_total_and_consistent(
            mut raw in prop::collection::vec(0u64..10_000, 1..20),
            t in 0u64..12_000,
        ) {
            raw.sort_unstable();
            let count = raw.len();
            let layout = TemporalLayout::new(starts(&raw), count).unwrap();
            let ts = Timestamp::from_millis(t);
            match layout.map_timestamp(ts) {
                None => prop_assert!(ts < layout.starts()[0]),
                Some(id) => {
                    let i = id.index();
                    prop_assert!(layout.starts()[i] <= ts);
                    if let Some(next) = layout.starts().get(i + 1) {
                        prop_assert!(ts < *next);
                    }
                }
            }
        }

        #[test]
        fn spatial_mapping_returns_containing_rect(x in -50.0f64..150.0, y in -50.0f64..150.0) {
            let layout = SpatialLayout::new(vec![
                square(0.0, 0.0, 40.0),
                square(50.0, 0.0, 40.0),
                square(0.0, 50.0, 40.0),
            ]);
            let point = ScreenPoint::new(x, y);
            match layout.map_point(&point) {
                Some(id) => prop_assert!(layout.rects()[id.index()].contains(&point)),
                None => prop_assert!(layout.rects().iter().all(|r| !r.contains(&point))),
            }
        }
    }
}
