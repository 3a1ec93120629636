//! `recording` service operations

use serde::{Deserialize, Serialize};

use crate::define_operation;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecordingStatus {
    pub status: String,
}

define_operation! {
    operation: GetRecordingStatus,
    service: Recording,
    method: "getRecordingStatus",
    request: {},
    response: RecordingStatus,
}

/// A scheduled recording
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleItem {
    pub id: String,
    pub title: String,
    pub uri: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub recording_status: String,
    pub quality: String,
    pub duration_sec: i64,
    pub overlap_status: String,
    pub start_date_time: String,
    pub repeat_type: String,
    pub channel_name: String,
}

impl ScheduleItem {
    /// Whether this schedule collides with another one
    pub fn is_conflicting(&self) -> bool {
        !self.overlap_status.is_empty() && self.overlap_status != "notOverlapped"
    }
}

define_operation! {
    operation: GetScheduleList,
    service: Recording,
    method: "getScheduleList",
    request: {},
    response: Vec<ScheduleItem>,
}

/// A finished recording
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryItem {
    pub title: String,
    pub uri: String,
    pub recording_status: String,
    pub quality: String,
    pub duration_sec: i64,
    pub start_date_time: String,
    pub channel_name: String,
    pub error_status: String,
}

define_operation! {
    operation: GetHistoryList,
    service: Recording,
    method: "getHistoryList",
    request: {},
    response: Vec<HistoryItem>,
}

define_operation! {
    operation: DeleteSchedule,
    service: Recording,
    method: "deleteSchedule",
    request: {
        id: String,
        title: String,
        uri: String,
        duration_sec: i64,
        start_date_time: String,
        r#type: String,
    },
    response: (),
}

impl From<&ScheduleItem> for DeleteScheduleRequest {
    fn from(item: &ScheduleItem) -> Self {
        delete_schedule(
            item.id.clone(),
            item.title.clone(),
            item.uri.clone(),
            item.duration_sec,
            item.start_date_time.clone(),
            item.kind.clone(),
        )
    }
}
