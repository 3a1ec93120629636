//! `appControl` service operations

use serde::Deserialize;

use crate::define_operation;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Application {
    pub title: String,
    pub uri: String,
    pub icon: String,
    pub data: Option<String>,
}

define_operation! {
    operation: GetApplicationList,
    service: AppControl,
    method: "getApplicationList",
    request: {},
    response: Vec<Application>,
}

define_operation! {
    operation: SetActiveApp,
    service: AppControl,
    method: "setActiveApp",
    request: { uri: String },
    response: (),
}

define_operation! {
    operation: TerminateApps,
    service: AppControl,
    method: "terminateApps",
    request: {},
    response: (),
}

/// Status of a system application such as the text form or web browser
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApplicationStatus {
    pub name: String,
    pub status: String,
}

impl ApplicationStatus {
    pub fn is_on(&self) -> bool {
        self.status == "on"
    }
}

define_operation! {
    operation: GetApplicationStatusList,
    service: AppControl,
    method: "getApplicationStatusList",
    request: {},
    response: Vec<ApplicationStatus>,
}
