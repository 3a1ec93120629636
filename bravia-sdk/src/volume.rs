//! Volume control points
//!
//! A TV usually exposes `speaker` and `headphone`, a receiver exposes one
//! unnamed target per zone. Each [`VolumeControl`] reads the current state
//! on every call; nothing is cached.

use bravia_api::operations::audio::{
    get_volume_information, set_audio_mute, set_audio_volume, GetVolumeInformationOperation,
    SetAudioMuteOperation, SetAudioVolumeOperation, VolumeInformation,
};
use bravia_api::BraviaClient;

use crate::error::{Result, SdkError};

#[derive(Debug, Clone)]
pub struct VolumeControl {
    target: String,
    client: BraviaClient,
}

impl VolumeControl {
    pub(crate) fn new(target: impl Into<String>, client: BraviaClient) -> Self {
        Self {
            target: target.into(),
            client,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Current state of this control point
    pub fn info(&self) -> Result<VolumeInformation> {
        self.client
            .execute::<GetVolumeInformationOperation>(&get_volume_information())?
            .into_iter()
            .find(|info| info.target == self.target)
            .ok_or_else(|| SdkError::VolumeDevice(self.target.clone()))
    }

    pub fn volume(&self) -> Result<i32> {
        Ok(self.info()?.volume)
    }

    pub fn is_muted(&self) -> Result<bool> {
        Ok(self.info()?.mute.is_muted())
    }

    /// Set the volume, clamped to the range the device reports
    pub fn set_volume(&self, volume: i32) -> Result<i32> {
        let info = self.info()?;
        let volume = info.clamp(volume);
        self.client.execute::<SetAudioVolumeOperation>(&set_audio_volume(
            self.target.clone(),
            volume.to_string(),
        ))?;
        Ok(volume)
    }

    pub fn volume_up(&self) -> Result<i32> {
        let current = self.volume()?;
        self.set_volume(current.saturating_add(1))
    }

    pub fn volume_down(&self) -> Result<i32> {
        let current = self.volume()?;
        self.set_volume(current.saturating_sub(1))
    }

    /// Mute or unmute using the representation the device reported
    pub fn set_mute(&self, muted: bool) -> Result<()> {
        let info = self.info()?;
        self.client
            .execute::<SetAudioMuteOperation>(&set_audio_mute(info.mute.encode(muted)))?;
        Ok(())
    }

    /// Flip the mute state and return the new one
    pub fn toggle_mute(&self) -> Result<bool> {
        let muted = !self.is_muted()?;
        self.set_mute(muted)?;
        Ok(muted)
    }
}
