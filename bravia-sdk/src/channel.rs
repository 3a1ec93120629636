//! Channel entry as a sequence of remote buttons

use crate::error::{Result, SdkError};

/// Button used for the separator in sub-channels such as `5.1`
pub const DECIMAL_COMMAND: &str = "DOT";

const DIGIT_COMMANDS: [&str; 10] = [
    "Num0", "Num1", "Num2", "Num3", "Num4", "Num5", "Num6", "Num7", "Num8", "Num9",
];

/// Button names that key in `channel`
///
/// Digits map to `Num0`..`Num9`, a `.` or `-` to the decimal point button.
/// Anything else is rejected before a single button is pressed.
pub fn channel_commands(channel: &str) -> Result<Vec<&'static str>> {
    let channel = channel.trim();
    if channel.is_empty() {
        return Err(SdkError::Command("empty channel number".to_string()));
    }

    channel
        .chars()
        .map(|c| match c {
            '0'..='9' => Ok(DIGIT_COMMANDS[(c as u8 - b'0') as usize]),
            '.' | '-' => Ok(DECIMAL_COMMAND),
            other => Err(SdkError::Command(format!(
                "{:?} is not valid in a channel number",
                other
            ))),
        })
        .collect()
}
