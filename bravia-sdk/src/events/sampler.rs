//! Sampling device state for the polling loop

use std::sync::Arc;

use bravia_api::operations::audio::{get_volume_information, GetVolumeInformationOperation};
use bravia_api::operations::av_content::{
    get_playing_content_info, GetPlayingContentInfoOperation, PlayingContent,
};
use bravia_api::operations::system::{get_power_status, GetPowerStatusOperation};
use bravia_api::{ApiError, BraviaClient, DeviceErrorKind};
use parking_lot::RwLock;

use super::snapshot::{ControlPointState, DeviceSnapshot};
use crate::error::{Result, SdkError};

/// Produces one snapshot of the device per call
///
/// Any error aborts the whole sample.
pub trait StateSampler: Send + Sync {
    fn sample(&self) -> Result<DeviceSnapshot>;
}

/// Samples a device over JSON-RPC
///
/// Shares the device's client slot, so it follows re-registration.
pub struct RpcSampler {
    client: Arc<RwLock<Option<BraviaClient>>>,
}

impl RpcSampler {
    pub fn new(client: Arc<RwLock<Option<BraviaClient>>>) -> Self {
        Self { client }
    }
}

/// What is playing, or empty content when nothing is
pub(crate) fn playing_content(client: &BraviaClient) -> Result<PlayingContent> {
    match client.execute::<GetPlayingContentInfoOperation>(&get_playing_content_info()) {
        Ok(content) => Ok(content),
        // Home screen or display off.
        Err(ApiError::Device(error))
            if error.is(DeviceErrorKind::IllegalState)
                || error.is(DeviceErrorKind::DisplayIsOff) =>
        {
            Ok(PlayingContent::default())
        }
        Err(other) => Err(other.into()),
    }
}

impl StateSampler for RpcSampler {
    fn sample(&self) -> Result<DeviceSnapshot> {
        let client = self.client.read().clone().ok_or(SdkError::NotRegistered)?;

        let power = client
            .execute::<GetPowerStatusOperation>(&get_power_status())?
            .is_active();
        if !power {
            return Ok(DeviceSnapshot::default());
        }

        let content = playing_content(&client)?;
        let volume_by_target = client
            .execute::<GetVolumeInformationOperation>(&get_volume_information())?
            .into_iter()
            .map(|info| {
                let state = ControlPointState {
                    volume: info.volume,
                    muted: info.mute.is_muted(),
                };
                (info.target, state)
            })
            .collect();

        Ok(DeviceSnapshot {
            power,
            source: content.source,
            media_title: content.title,
            channel: content.disp_num,
            volume_by_target,
        })
    }
}
