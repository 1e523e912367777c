//! Progress-bar marker clustering

use crate::MARKER_PIXEL_MARGIN;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A point-in-time marker on the progress bar
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    /// Milliseconds from stream start
    pub offset: f64,
    #[serde(default)]
    pub seek_offset: Option<f64>,
    #[serde(default)]
    pub time: f64,
    #[serde(default)]
    pub color: String,
}

/// One rendered marker, possibly standing in for several close ones
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusteredMarker {
    /// Key of the last marker in the group
    pub key: String,
    /// Earliest offset in the group
    pub offset: f64,
    /// Seek target of the earliest-offset marker
    pub seek_offset: Option<f64>,
    /// Earliest `time` in the group
    pub time: f64,
    /// Shared color, `None` when the group mixes colors
    pub color: Option<String>,
    /// Horizontal position as a percentage of the bar
    pub position: f64,
}

/// Groups markers that would render within [`MARKER_PIXEL_MARGIN`] of each other
pub fn cluster_markers(markers: &[Marker], duration_secs: f64, bar_width_px: f64) -> Vec<ClusteredMarker> {
    cluster_markers_with_margin(markers, duration_secs, bar_width_px, MARKER_PIXEL_MARGIN)
}

/// Groups markers by snapping their pixel position to multiples of `margin_px`.
///
/// Returns one marker per non-empty bucket, left to right. Markers landing
/// at position 0 are not rendered.
pub fn cluster_markers_with_margin(
    markers: &[Marker],
    duration_secs: f64,
    bar_width_px: f64,
    margin_px: f64,
) -> Vec<ClusteredMarker> {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if !valid(duration_secs) || !valid(bar_width_px) || !valid(margin_px) {
        return Vec::new();
    }

    let mut buckets: BTreeMap<i64, Vec<&Marker>> = BTreeMap::new();
    for marker in markers {
        let pixel = position_percent(marker.offset, duration_secs) * bar_width_px / 100.0;
        let bucket = (pixel / margin_px + 0.5).floor() as i64;
        buckets.entry(bucket).or_default().push(marker);
    }

    buckets
        .values()
        .filter_map(|group| merge_group(group, duration_secs))
        .filter(|marker| marker.position.is_finite() && marker.position != 0.0)
        .collect()
}

fn position_percent(offset_ms: f64, duration_secs: f64) -> f64 {
    let percent = offset_ms * 100.0 / (duration_secs * 1000.0);
    if percent.is_finite() {
        percent
    } else {
        0.0
    }
}

fn merge_group(group: &[&Marker], duration_secs: f64) -> Option<ClusteredMarker> {
    let last = group.last()?;
    let earliest = group
        .iter()
        .min_by(|a, b| a.offset.total_cmp(&b.offset))?;

    let first_color = &group[0].color;
    let color = if !first_color.is_empty() && group.iter().all(|m| &m.color == first_color) {
        Some(first_color.clone())
    } else {
        None
    };

    let time = group.iter().map(|m| m.time).fold(f64::INFINITY, f64::min);

    Some(ClusteredMarker {
        key: last.key.clone(),
        offset: earliest.offset,
        seek_offset: earliest.seek_offset,
        time,
        color,
        position: position_percent(earliest.offset, duration_secs),
    })
}
