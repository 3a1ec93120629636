//! `avContent` service operations

use serde::Deserialize;

use crate::define_operation;

/// What the device is currently showing
///
/// Fields the device omits (for example channel data while an HDMI input is
/// selected) are left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayingContent {
    pub uri: String,
    pub source: String,
    pub title: String,
    pub disp_num: String,
    pub program_title: String,
    pub start_date_time: String,
    pub duration_sec: i64,
    pub media_type: String,
    pub program_media_type: String,
    pub triplet_str: String,
}

define_operation! {
    operation: GetPlayingContentInfo,
    service: AvContent,
    method: "getPlayingContentInfo",
    request: {},
    response: PlayingContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Scheme {
    pub scheme: String,
}

define_operation! {
    operation: GetSchemeList,
    service: AvContent,
    method: "getSchemeList",
    request: {},
    response: Vec<Scheme>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceItem {
    pub source: String,
}

define_operation! {
    operation: GetSourceList,
    service: AvContent,
    method: "getSourceList",
    request: { scheme: String },
    response: Vec<SourceItem>,
}

/// An HDMI/composite/component input and its connection state
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExternalInput {
    pub uri: String,
    pub title: String,
    pub connection: bool,
    pub label: String,
    pub icon: String,
    pub status: String,
}

impl ExternalInput {
    /// Match by exact title, exact URI, or case-insensitive URI fragment
    pub fn matches(&self, name: &str) -> bool {
        self.title == name
            || self.uri == name
            || self.uri.to_lowercase().contains(&name.to_lowercase())
    }
}

define_operation! {
    operation: GetCurrentExternalInputsStatus,
    service: AvContent,
    method: "getCurrentExternalInputsStatus",
    request: {},
    response: Vec<ExternalInput>,
}

define_operation! {
    operation: SetPlayContent,
    service: AvContent,
    method: "setPlayContent",
    request: { uri: String },
    response: (),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ContentCount {
    pub count: u32,
}

define_operation! {
    operation: GetContentCount,
    service: AvContent,
    method: "getContentCount",
    request: { source: String },
    response: ContentCount,
}

/// One entry of a source's content list (channels, recordings...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentItem {
    pub uri: String,
    pub title: String,
    pub index: u32,
    pub disp_num: String,
    pub program_media_type: String,
    pub triplet_str: String,
}

define_operation! {
    operation: GetContentList,
    service: AvContent,
    method: "getContentList",
    request: { source: String, st_idx: u32, cnt: u32 },
    response: Vec<ContentItem>,
}
