use indexmap::IndexMap;
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parameter key carrying the power target (fraction of FTP).
pub const POWER_TARGET_KEY: &str = "ftp";
/// Parameter key carrying the cadence target.
pub const CADENCE_TARGET_KEY: &str = "rpm";

/// Top level of a workout's `triggers` value.
pub type IntervalTree = Vec<Interval>;

// The tree is hand-edited upstream and its shape drifts. Every level decodes
// leniently: null or mistyped members become empty, so one odd object never
// costs the segments around it.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Interval {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Track {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub objects: Vec<IntervalObject>,
}

/// One timed event on a track: a power block, a text cue, a video marker...
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntervalObject {
    /// Any JSON number; absent when missing or not numeric.
    #[serde(rename = "size", default, deserialize_with = "lenient_number")]
    pub size_milliseconds: Option<f64>,
    /// Raw parameter entries, normally `{"value": ...}`.
    #[serde(default, deserialize_with = "lenient_map")]
    pub parameters: IndexMap<String, Value>,
}

/// A fixed-duration, fixed-intensity block of the rendered workout.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub duration_seconds: u64,
    pub target_power: f64,
    pub target_cadence: Option<f64>,
}

/// Decodes a sequence, dropping members that don't fit `T`. Anything but an
/// array decodes as empty.
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                debug!("Ignoring malformed interval tree member: {e}");
                None
            }
        })
        .collect())
}

fn lenient_map<'de, D>(deserializer: D) -> Result<IndexMap<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(map) = Value::deserialize(deserializer)? else {
        return Ok(IndexMap::new());
    };
    Ok(map.into_iter().collect())
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_f64())
}

/// Builds the tree from a decoded `triggers` value.
///
/// Returns `None` when the value is not an array; malformed members inside it
/// are dropped.
pub fn tree_from_value(value: Value) -> Option<IntervalTree> {
    lenient_seq(value).ok()
}

impl IntervalObject {
    fn numeric_parameter(&self, key: &str) -> Option<f64> {
        self.parameters
            .get(key)
            .and_then(|p| p.get("value"))
            .and_then(Value::as_f64)
    }

    /// The segment this object renders to, if it carries a power target and a
    /// non-negative size.
    pub fn to_segment(&self) -> Option<Segment> {
        let target_power = self.numeric_parameter(POWER_TARGET_KEY)?;
        let size = self.size_milliseconds.filter(|ms| ms.is_finite() && *ms >= 0.0)?;

        Some(Segment {
            duration_seconds: (size / 1000.0).trunc() as u64,
            target_power,
            target_cadence: self.numeric_parameter(CADENCE_TARGET_KEY),
        })
    }
}

/// Flattens the interval tree into segments.
///
/// Traversal is depth-first over intervals, tracks and objects in source order,
/// which is the workout's timeline; nothing is re-sorted. Objects without a
/// numeric power target are skipped.
pub fn extract(tree: &[Interval]) -> Vec<Segment> {
    tree.iter()
        .flat_map(|interval| &interval.tracks)
        .flat_map(|track| &track.objects)
        .filter_map(IntervalObject::to_segment)
        .collect()
}
