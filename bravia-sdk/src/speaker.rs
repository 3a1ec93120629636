//! Speaker position capabilities for AV receivers
//!
//! Each speaker position is a marker type. Which settings a position has is
//! expressed with capability traits: individual channels have a level and a
//! distance ([`LevelDistance`]), position groups have a custom equalizer
//! ([`BassTreble`]). The center channel has both.
//!
//! ```rust,no_run
//! use bravia_sdk::speaker::{Center, LevelDistance, BassTreble};
//! # fn demo(device: &bravia_sdk::BraviaDevice) -> Result<(), bravia_sdk::SdkError> {
//! let center = device.speaker::<Center>()?;
//! center.set_level(-1.5)?;
//! println!("center bass: {}", center.bass()?);
//! # Ok(())
//! # }
//! ```

use std::marker::PhantomData;

use bravia_api::operations::audio::{
    get_custom_equalizer_settings, get_speaker_settings, set_custom_equalizer_settings,
    set_speaker_settings, setting_value, GetCustomEqualizerSettingsOperation,
    GetSpeakerSettingsOperation, SetCustomEqualizerSettingsOperation,
    SetSpeakerSettingsOperation, SettingValue,
};
use bravia_api::BraviaClient;

use crate::error::{Result, SdkError};

/// A speaker position, named by its setting-target prefix
pub trait SpeakerPosition {
    /// Prefix of the device setting targets, e.g. `frontL` in `frontLLevel`
    const KEY: &'static str;
}

/// Positions with their own level and distance
pub trait ChannelPosition: SpeakerPosition {}

/// Positions with a custom bass/treble equalizer
pub trait EqualizerPosition: SpeakerPosition {}

macro_rules! position {
    ($name:ident, $key:literal $(, $capability:ident)*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name;

        impl SpeakerPosition for $name {
            const KEY: &'static str = $key;
        }

        $(impl $capability for $name {})*
    };
}

position!(FrontLeft, "frontL", ChannelPosition);
position!(FrontRight, "frontR", ChannelPosition);
position!(Center, "center", ChannelPosition, EqualizerPosition);
position!(SurroundLeft, "surroundL", ChannelPosition);
position!(SurroundRight, "surroundR", ChannelPosition);
position!(Subwoofer, "subwoofer", ChannelPosition);
position!(Front, "front", EqualizerPosition);
position!(Surround, "surround", EqualizerPosition);

/// Settings handle for one speaker position
#[derive(Debug, Clone)]
pub struct Speaker<P: SpeakerPosition> {
    client: BraviaClient,
    _position: PhantomData<P>,
}

impl<P: SpeakerPosition> Speaker<P> {
    pub(crate) fn new(client: BraviaClient) -> Self {
        Self {
            client,
            _position: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        P::KEY
    }

    fn speaker_setting(&self, suffix: &str) -> Result<String> {
        let target = format!("{}{}", P::KEY, suffix);
        let entries = self
            .client
            .execute::<GetSpeakerSettingsOperation>(&get_speaker_settings(target.clone()))?;
        Ok(setting_value(&entries, &target)?)
    }

    // The device rejects writes to unavailable settings with a generic error,
    // so availability is checked first.
    fn set_speaker_setting(&self, suffix: &str, value: String) -> Result<()> {
        self.speaker_setting(suffix)?;
        let target = format!("{}{}", P::KEY, suffix);
        self.client
            .execute::<SetSpeakerSettingsOperation>(&set_speaker_settings(vec![
                SettingValue::new(target, value),
            ]))?;
        Ok(())
    }

    fn equalizer_setting(&self, suffix: &str) -> Result<i32> {
        let target = format!("{}{}", P::KEY, suffix);
        let entries = self.client.execute::<GetCustomEqualizerSettingsOperation>(
            &get_custom_equalizer_settings(target.clone()),
        )?;
        let value = setting_value(&entries, &target)?;
        parse_number(&target, &value).map(|v| v.round() as i32)
    }

    fn set_equalizer_setting(&self, suffix: &str, value: i32) -> Result<()> {
        let target = format!("{}{}", P::KEY, suffix);
        self.client
            .execute::<SetCustomEqualizerSettingsOperation>(&set_custom_equalizer_settings(
                vec![SettingValue::new(target, value.to_string())],
            ))?;
        Ok(())
    }
}

fn parse_number(target: &str, value: &str) -> Result<f64> {
    value.trim().parse::<f64>().map_err(|_| {
        SdkError::Api(bravia_api::ApiError::UnexpectedResult(format!(
            "{} has non-numeric value {:?}",
            target, value
        )))
    })
}

/// Channel level (dB, -10.0..=10.0 in 0.5 steps) and distance (mm)
pub trait LevelDistance {
    fn level(&self) -> Result<f64>;
    fn set_level(&self, db: f64) -> Result<()>;
    fn distance(&self) -> Result<u32>;
    fn set_distance(&self, millimetres: u32) -> Result<()>;
}

impl<P: ChannelPosition> LevelDistance for Speaker<P> {
    fn level(&self) -> Result<f64> {
        let value = self.speaker_setting("Level")?;
        parse_number(&format!("{}Level", P::KEY), &value)
    }

    fn set_level(&self, db: f64) -> Result<()> {
        self.set_speaker_setting("Level", format!("{:.1}", db))
    }

    fn distance(&self) -> Result<u32> {
        let value = self.speaker_setting("DistanceMM")?;
        parse_number(&format!("{}DistanceMM", P::KEY), &value).map(|v| v.max(0.0) as u32)
    }

    fn set_distance(&self, millimetres: u32) -> Result<()> {
        self.set_speaker_setting("DistanceMM", millimetres.to_string())
    }
}

/// Custom equalizer bass and treble, -10..=10
pub trait BassTreble {
    fn bass(&self) -> Result<i32>;
    fn set_bass(&self, level: i32) -> Result<()>;
    fn treble(&self) -> Result<i32>;
    fn set_treble(&self, level: i32) -> Result<()>;
}

impl<P: EqualizerPosition> BassTreble for Speaker<P> {
    fn bass(&self) -> Result<i32> {
        self.equalizer_setting("BassLevel")
    }

    fn set_bass(&self, level: i32) -> Result<()> {
        self.set_equalizer_setting("BassLevel", level)
    }

    fn treble(&self) -> Result<i32> {
        self.equalizer_setting("TrebleLevel")
    }

    fn set_treble(&self, level: i32) -> Result<()> {
        self.set_equalizer_setting("TrebleLevel", level)
    }
}
