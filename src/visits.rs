// Visit episodes for the spatial policy. A visit is a spatially and temporally
// contiguous run: leaving every card ends it even if gaze returns to the same card.

use std::collections::BTreeMap;

use crate::types::*;

/// Group region-tagged samples into visit episodes per region. Every region in
/// `1..=region_count` appears in the result, possibly with no episodes.
pub fn aggregate_visits(
    tagged: &[TaggedSample],
    region_count: usize,
) -> BTreeMap<RegionId, Vec<VisitEpisode>> {
    let mut visits: BTreeMap<RegionId, Vec<VisitEpisode>> = (0..region_count)
        .map(|i| (RegionId::from_index(i), Vec::new()))
        .collect();

    let mut current: Option<RegionId> = None;
    for entry in tagged {
        let timestamp = entry.sample.timestamp;
        match entry.region {
            Some(region) if current == Some(region) => {
                if let Some(open) = visits.get_mut(&region).and_then(|list| list.last_mut()) {
                    open.extend_to(timestamp);
                }
            }
            Some(region) => {
                visits
                    .entry(region)
                    .or_default()
                    .push(VisitEpisode::starting_at(timestamp));
                current = Some(region);
            }
            None => current = None,
        }
    }

    visits
}
