//! Bravia API operations organized by service
//!
//! Each module holds the typed operations of one JSON-RPC service.

pub mod app_control;
pub mod audio;
pub mod av_content;
pub mod guide;
pub mod recording;
pub mod system;

// Re-export commonly used operations
pub use audio::{GetVolumeInformationOperation, SetAudioMuteOperation, SetAudioVolumeOperation};
pub use av_content::{GetPlayingContentInfoOperation, SetPlayContentOperation};
pub use system::{GetPowerStatusOperation, GetRemoteControllerInfoOperation, SetPowerStatusOperation};
