//! `audio` service operations

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::define_operation;
use crate::error::ApiError;

/// Mute flag as reported by the device
///
/// TVs report a boolean, receivers report `"on"`/`"off"`. Writes are sent
/// back in the same form that was read.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MuteState {
    Flag(bool),
    Text(String),
}

impl MuteState {
    pub fn is_muted(&self) -> bool {
        match self {
            MuteState::Flag(flag) => *flag,
            MuteState::Text(text) => text.eq_ignore_ascii_case("on"),
        }
    }

    /// Encode `muted` in the same representation as `self`
    pub fn encode(&self, muted: bool) -> Value {
        match self {
            MuteState::Flag(_) => Value::Bool(muted),
            MuteState::Text(_) => Value::String(if muted { "on" } else { "off" }.to_string()),
        }
    }
}

impl Default for MuteState {
    fn default() -> Self {
        MuteState::Flag(false)
    }
}

/// One volume control point (`speaker`, `headphone`...)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInformation {
    pub target: String,
    pub volume: i32,
    #[serde(default)]
    pub mute: MuteState,
    #[serde(default)]
    pub min_volume: i32,
    #[serde(default = "default_max_volume")]
    pub max_volume: i32,
}

fn default_max_volume() -> i32 {
    100
}

impl VolumeInformation {
    pub fn clamp(&self, volume: i32) -> i32 {
        volume.clamp(self.min_volume, self.max_volume.max(self.min_volume))
    }
}

define_operation! {
    operation: GetVolumeInformation,
    service: Audio,
    method: "getVolumeInformation",
    request: {},
    response: Vec<VolumeInformation>,
}

define_operation! {
    operation: SetAudioVolume,
    service: Audio,
    method: "setAudioVolume",
    request: { target: String, volume: String },
    response: (),
}

define_operation! {
    operation: SetAudioMute,
    service: Audio,
    method: "setAudioMute",
    request: { status: Value },
    response: (),
}

/// A named setting with its availability
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingEntry {
    pub target: String,
    #[serde(default)]
    pub current_value: String,
    #[serde(default = "available_by_default")]
    pub is_available: bool,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub candidate: Vec<Value>,
}

fn available_by_default() -> bool {
    true
}

impl SettingEntry {
    /// The current value, or `Unsupported` when the device marks it unavailable
    pub fn available_value(&self) -> Result<&str, ApiError> {
        if self.is_available {
            Ok(&self.current_value)
        } else {
            Err(ApiError::Unsupported(self.target.clone()))
        }
    }
}

/// Find `target` in a settings list and return its value
pub fn setting_value(entries: &[SettingEntry], target: &str) -> Result<String, ApiError> {
    entries
        .iter()
        .find(|entry| entry.target == target)
        .ok_or_else(|| ApiError::Unsupported(target.to_string()))?
        .available_value()
        .map(str::to_string)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingValue {
    pub target: String,
    pub value: String,
}

impl SettingValue {
    pub fn new(target: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            value: value.into(),
        }
    }
}

define_operation! {
    operation: GetSpeakerSettings,
    service: Audio,
    method: "getSpeakerSettings",
    request: { target: String },
    response: Vec<SettingEntry>,
}

define_operation! {
    operation: SetSpeakerSettings,
    service: Audio,
    method: "setSpeakerSettings",
    request: { settings: Vec<SettingValue> },
    response: (),
}

define_operation! {
    operation: GetSoundSettings,
    service: Audio,
    method: "getSoundSettings",
    version: "1.1",
    request: { target: String },
    response: Vec<SettingEntry>,
}

define_operation! {
    operation: SetSoundSettings,
    service: Audio,
    method: "setSoundSettings",
    version: "1.1",
    request: { settings: Vec<SettingValue> },
    response: (),
}

define_operation! {
    operation: GetCustomEqualizerSettings,
    service: Audio,
    method: "getCustomEqualizerSettings",
    request: { target: String },
    response: Vec<SettingEntry>,
}

define_operation! {
    operation: SetCustomEqualizerSettings,
    service: Audio,
    method: "setCustomEqualizerSettings",
    request: { settings: Vec<SettingValue> },
    response: (),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Operation;
    use serde_json::json;

    #[test]
    fn test_volume_information_with_bool_mute() {
        let info = GetVolumeInformationOperation::parse_response(vec![json!([
            {"target": "speaker", "volume": 25, "mute": false, "maxVolume": 100, "minVolume": 0},
            {"target": "headphone", "volume": 10, "mute": true, "maxVolume": 50, "minVolume": 0}
        ])])
        .unwrap();

        assert_eq!(info.len(), 2);
        assert_eq!(info[0].target, "speaker");
        assert!(!info[0].mute.is_muted());
        assert!(info[1].mute.is_muted());
        assert_eq!(info[1].clamp(80), 50);
        assert_eq!(info[1].clamp(-3), 0);
    }

    #[test]
    fn test_volume_information_with_text_mute() {
        let info = GetVolumeInformationOperation::parse_response(vec![json!([
            {"target": "", "volume": 12, "mute": "on", "maxVolume": 50, "minVolume": 0}
        ])])
        .unwrap();

        assert!(info[0].mute.is_muted());
        assert_eq!(info[0].mute.encode(false), json!("off"));
        assert_eq!(MuteState::Flag(true).encode(false), json!(false));
    }

    #[test]
    fn test_set_audio_volume_sends_string() {
        let params = SetAudioVolumeOperation::params(&set_audio_volume(
            "speaker".to_string(),
            "30".to_string(),
        ))
        .unwrap();
        assert_eq!(params.get("volume"), Some(&json!("30")));
        assert_eq!(params.get("target"), Some(&json!("speaker")));
    }

    #[test]
    fn test_unavailable_setting_is_unsupported() {
        let entries = GetSpeakerSettingsOperation::parse_response(vec![json!([
            {"target": "subwooferLevel", "currentValue": "2", "isAvailable": false},
            {"target": "centerLevel", "currentValue": "-1.5", "isAvailable": true}
        ])])
        .unwrap();

        assert!(matches!(
            setting_value(&entries, "subwooferLevel"),
            Err(ApiError::Unsupported(_))
        ));
        assert_eq!(setting_value(&entries, "centerLevel").unwrap(), "-1.5");
        assert!(matches!(
            setting_value(&entries, "missing"),
            Err(ApiError::Unsupported(_))
        ));
    }

    #[test]
    fn test_set_speaker_settings_params() {
        let request = set_speaker_settings(vec![SettingValue::new("centerLevel", "1.0")]);
        let params = SetSpeakerSettingsOperation::params(&request).unwrap();
        assert_eq!(
            params.get("settings"),
            Some(&json!([{"target": "centerLevel", "value": "1.0"}]))
        );
    }

    #[test]
    fn test_sound_settings_version() {
        assert_eq!(GetSoundSettingsOperation::VERSION, "1.1");
        assert_eq!(GetSpeakerSettingsOperation::VERSION, "1.0");
    }
}
