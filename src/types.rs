// Strong typing over raw numbers. Newtypes for timestamps and region ids, plain structs for samples.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Timestamp in milliseconds, as stamped by the capture process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_millis(ms: u64) -> Self {
        Timestamp(ms)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed from `earlier` to `self`, zero if `earlier` is later.
    pub fn millis_since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// 1-based card number. Serialized as `CARD_<n>` so it can key JSON objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegionId(u32);

impl RegionId {
    const PREFIX: &'static str = "CARD_";

    pub fn new(number: u32) -> Self {
        RegionId(number)
    }

    /// Region id for a 0-based enumeration index.
    pub fn from_index(index: usize) -> Self {
        RegionId(index as u32 + 1)
    }

    pub fn number(&self) -> u32 {
        self.0
    }

    /// 0-based position in the region enumeration.
    pub fn index(&self) -> usize {
        self.0.saturating_sub(1) as usize
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}

impl FromStr for RegionId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = s
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| format!("region id must start with {}: {}", Self::PREFIX, s))?;
        let number: u32 = number
            .parse()
            .map_err(|e| format!("bad region number in {}: {}", s, e))?;
        if number == 0 {
            return Err(format!("region numbers start at 1: {}", s));
        }
        Ok(RegionId(number))
    }
}

impl Serialize for RegionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RegionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Screen position in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        ScreenPoint { x, y }
    }

    pub fn distance_to(&self, other: &ScreenPoint) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned screen rectangle, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ScreenRect {
    pub top_left: ScreenPoint,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    pub fn new(top_left: ScreenPoint, width: f64, height: f64) -> Self {
        ScreenRect {
            top_left,
            width,
            height,
        }
    }

    /// Inclusive on all four edges.
    pub fn contains(&self, point: &ScreenPoint) -> bool {
        point.x >= self.top_left.x
            && point.x <= self.top_left.x + self.width
            && point.y >= self.top_left.y
            && point.y <= self.top_left.y + self.height
    }
}

/// One gaze sample from the eye tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeSample {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "timestamp_ms")]
    pub timestamp: Timestamp,
}

impl GazeSample {
    pub fn new(x: f64, y: f64, timestamp_ms: u64) -> Self {
        GazeSample {
            x,
            y,
            timestamp: Timestamp::from_millis(timestamp_ms),
        }
    }

    pub fn position(&self) -> ScreenPoint {
        ScreenPoint::new(self.x, self.y)
    }
}

/// A cluster of consecutive samples within the dispersion threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fixation {
    /// Mean x of the member samples.
    pub x: f64,
    /// Mean y of the member samples.
    pub y: f64,
    pub duration_ms: u64,
    #[serde(rename = "start_ms")]
    pub start: Timestamp,
    #[serde(rename = "end_ms")]
    pub end: Timestamp,
    pub sample_count: usize,
}

impl Fixation {
    pub fn position(&self) -> ScreenPoint {
        ScreenPoint::new(self.x, self.y)
    }
}

/// A maximal run of consecutive raw samples inside one spatial region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitEpisode {
    #[serde(rename = "start_ms")]
    pub start: Timestamp,
    #[serde(rename = "end_ms")]
    pub end: Timestamp,
    pub duration_ms: u64,
}

impl VisitEpisode {
    pub fn starting_at(timestamp: Timestamp) -> Self {
        VisitEpisode {
            start: timestamp,
            end: timestamp,
            duration_ms: 0,
        }
    }

    pub fn extend_to(&mut self, timestamp: Timestamp) {
        self.end = timestamp;
        self.duration_ms = self.end.millis_since(self.start);
    }
}

/// Raw sample with its region column. `None` means the sample fell outside every region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaggedSample {
    #[serde(flatten)]
    pub sample: GazeSample,
    pub region: Option<RegionId>,
}

/// Fixation with its region column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaggedFixation {
    #[serde(flatten)]
    pub fixation: Fixation,
    pub region: Option<RegionId>,
}
