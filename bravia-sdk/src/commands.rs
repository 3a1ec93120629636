//! Remote-controller command table
//!
//! The device publishes its button names and IRCC codes through
//! `getRemoteControllerInfo`. [`CommandTable`] is that list keyed by name;
//! [`RemoteAction`] binds one entry to a client so it can be invoked
//! without arguments.

use std::collections::HashMap;

use bravia_api::operations::system::{
    get_power_status, GetPowerStatusOperation, RemoteCommand,
};
use bravia_api::BraviaClient;

use crate::error::{Result, SdkError};

/// Button names mapped to IRCC codes, in the order the device listed them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandTable {
    names: Vec<String>,
    codes: HashMap<String, String>,
}

impl CommandTable {
    pub fn new(commands: Vec<RemoteCommand>) -> Self {
        let mut table = Self::default();
        for command in commands {
            // A repeated name keeps its first position but takes the later code.
            if table.codes.insert(command.name.clone(), command.value).is_none() {
                table.names.push(command.name);
            }
        }
        table
    }

    pub fn code(&self, name: &str) -> Option<&str> {
        self.codes.get(name).map(String::as_str)
    }

    /// Code for `name` or a `Command` error naming it
    pub fn resolve(&self, name: &str) -> Result<&str> {
        self.code(name)
            .ok_or_else(|| SdkError::Command(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.codes.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A remote button bound to a device
///
/// Invoking it does nothing while the device is off.
#[derive(Debug, Clone)]
pub struct RemoteAction {
    name: String,
    code: String,
    client: BraviaClient,
}

impl RemoteAction {
    pub(crate) fn new(name: &str, code: &str, client: BraviaClient) -> Self {
        Self {
            name: name.to_string(),
            code: code.to_string(),
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Press the button; returns whether it was sent
    pub fn invoke(&self) -> Result<bool> {
        let power = self
            .client
            .execute::<GetPowerStatusOperation>(&get_power_status())?;
        if !power.is_active() {
            tracing::debug!(command = %self.name, "device is off, not sending");
            return Ok(false);
        }

        self.client.ircc().send(&self.code)?;
        Ok(true)
    }
}
