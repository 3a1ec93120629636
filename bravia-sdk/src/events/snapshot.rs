//! Device state snapshots and the events that separate two of them

use std::collections::BTreeMap;
use std::fmt;

/// What changed between two samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Power,
    Source,
    Media,
    Channel,
    Mute,
    Volume,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Power => "power",
            EventKind::Source => "source",
            EventKind::Media => "media",
            EventKind::Channel => "channel",
            EventKind::Mute => "mute",
            EventKind::Volume => "volume",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlPointState {
    pub volume: i32,
    pub muted: bool,
}

/// One sample of the observed device state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSnapshot {
    pub power: bool,
    pub source: String,
    pub media_title: String,
    pub channel: String,
    /// Keyed by target name, ordered so diffs are deterministic
    pub volume_by_target: BTreeMap<String, ControlPointState>,
}

/// Events that lead from `previous` to `next`, in delivery order
///
/// Power, source, media and channel come first. Control points are compared
/// only when present in both samples; any number of changed points yields at
/// most one `Mute` followed by at most one `Volume`.
pub fn diff(previous: &DeviceSnapshot, next: &DeviceSnapshot) -> Vec<EventKind> {
    let mut events = Vec::new();

    if previous.power != next.power {
        events.push(EventKind::Power);
    }
    if previous.source != next.source {
        events.push(EventKind::Source);
    }
    if previous.media_title != next.media_title {
        events.push(EventKind::Media);
    }
    if previous.channel != next.channel {
        events.push(EventKind::Channel);
    }

    let mut mute_changed = false;
    let mut volume_changed = false;
    for (target, before) in &previous.volume_by_target {
        if let Some(after) = next.volume_by_target.get(target) {
            mute_changed |= before.muted != after.muted;
            volume_changed |= before.volume != after.volume;
        }
    }
    if mute_changed {
        events.push(EventKind::Mute);
    }
    if volume_changed {
        events.push(EventKind::Volume);
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(points: &[(&str, i32, bool)]) -> DeviceSnapshot {
        DeviceSnapshot {
            power: true,
            source: "extInput:hdmi".to_string(),
            media_title: "HDMI 1".to_string(),
            channel: String::new(),
            volume_by_target: points
                .iter()
                .map(|(t, v, m)| (t.to_string(), ControlPointState { volume: *v, muted: *m }))
                .collect(),
        }
    }

    #[test]
    fn test_identical_snapshots_produce_nothing() {
        let a = snapshot(&[("speaker", 10, false)]);
        assert!(diff(&a, &a.clone()).is_empty());
    }

    #[test]
    fn test_power_only() {
        let a = snapshot(&[]);
        let b = DeviceSnapshot { power: false, ..a.clone() };
        assert_eq!(diff(&a, &b), vec![EventKind::Power]);
    }

    #[test]
    fn test_mute_and_volume_on_different_points() {
        let a = snapshot(&[("speaker", 10, false), ("headphone", 5, false)]);
        let b = snapshot(&[("speaker", 10, true), ("headphone", 6, false)]);
        assert_eq!(diff(&a, &b), vec![EventKind::Mute, EventKind::Volume]);
    }

    #[test]
    fn test_several_volume_changes_collapse() {
        let a = snapshot(&[("speaker", 10, false), ("headphone", 5, false)]);
        let b = snapshot(&[("speaker", 11, false), ("headphone", 6, false)]);
        assert_eq!(diff(&a, &b), vec![EventKind::Volume]);
    }

    #[test]
    fn test_points_missing_on_one_side_are_ignored() {
        let a = snapshot(&[("speaker", 10, false)]);
        let b = snapshot(&[("headphone", 3, true)]);
        assert!(diff(&a, &b).is_empty());
    }

    #[test]
    fn test_event_order() {
        let a = snapshot(&[("speaker", 10, false)]);
        let b = DeviceSnapshot {
            power: false,
            source: "tv:dvbt".to_string(),
            media_title: "BBC ONE".to_string(),
            channel: "001".to_string(),
            volume_by_target: snapshot(&[("speaker", 12, true)]).volume_by_target,
        };
        assert_eq!(
            diff(&a, &b),
            vec![
                EventKind::Power,
                EventKind::Source,
                EventKind::Media,
                EventKind::Channel,
                EventKind::Mute,
                EventKind::Volume,
            ]
        );
    }
}
