// Session-level relevant data: longest visits, longest fixations, last fixation and
// most visited cards. Ties at the maximum are kept, in region enumeration order.

use serde::{Deserialize, Serialize};

use crate::aggregate::RegionAggregate;
use crate::types::*;

/// Running maximum that keeps every item tied at the current maximum.
#[derive(Debug, Clone)]
pub struct TieMax<V, T> {
    best: Option<V>,
    tied: Vec<T>,
}

impl<V: PartialOrd + Copy, T> TieMax<V, T> {
    pub fn new() -> Self {
        TieMax {
            best: None,
            tied: Vec::new(),
        }
    }

    /// A strictly greater value replaces the tied set; an equal value joins it.
    pub fn offer(&mut self, value: V, item: T) {
        match self.best {
            Some(best) if value < best => {}
            Some(best) if value == best => self.tied.push(item),
            _ => {
                self.best = Some(value);
                self.tied.clear();
                self.tied.push(item);
            }
        }
    }

    pub fn best(&self) -> Option<V> {
        self.best
    }

    pub fn into_tied(self) -> Vec<T> {
        self.tied
    }
}

impl<V: PartialOrd + Copy, T> Default for TieMax<V, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A visit episode and the card it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionVisit {
    pub region: RegionId,
    pub visit: VisitEpisode,
}

/// A fixation and the card it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionFixation {
    pub region: RegionId,
    pub fixation: Fixation,
}

/// Visit count of one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionVisitCount {
    pub region: RegionId,
    pub visit_count: usize,
}

/// Extremal statistics of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RelevantData {
    pub longest_visits: Vec<RegionVisit>,
    pub longest_fixations: Vec<RegionFixation>,
    pub last_fixation: Option<RegionFixation>,
    pub most_visited_regions: Vec<RegionVisitCount>,
}

/// Scan per-region aggregates in enumeration order. Regions without visits or
/// fixations take no part in the corresponding scan.
pub fn extract_relevant_data(aggregates: &[RegionAggregate]) -> RelevantData {
    let mut longest_visits = TieMax::new();
    let mut longest_fixations = TieMax::new();
    let mut most_visits = TieMax::new();
    let mut last_fixation: Option<RegionFixation> = None;

    for aggregate in aggregates {
        let region = aggregate.region;

        if let Some(visits) = &aggregate.visits {
            for visit in visits {
                longest_visits.offer(visit.duration_ms, RegionVisit { region, visit: *visit });
            }
            if !visits.is_empty() {
                most_visits.offer(
                    visits.len(),
                    RegionVisitCount {
                        region,
                        visit_count: visits.len(),
                    },
                );
            }
        }

        for fixation in &aggregate.fixations {
            longest_fixations.offer(
                fixation.duration_ms,
                RegionFixation {
                    region,
                    fixation: *fixation,
                },
            );
        }

        // Strictly later wins, so equal end times keep the lowest region id.
        if let Some(fixation) = aggregate.fixations.last() {
            let later = last_fixation.map_or(true, |current| fixation.end > current.fixation.end);
            if later {
                last_fixation = Some(RegionFixation {
                    region,
                    fixation: *fixation,
                });
            }
        }
    }

    RelevantData {
        longest_visits: longest_visits.into_tied(),
        longest_fixations: longest_fixations.into_tied(),
        last_fixation,
        most_visited_regions: most_visits.into_tied(),
    }
}
