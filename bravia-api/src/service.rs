/// The JSON-RPC services exposed by Bravia devices
///
/// Each service is a separate endpoint under `/sony/` and groups a family of
/// methods (power and remote codes under `system`, volume under `audio`...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Power, remote-controller codes, device information, network settings
    System,
    /// Volume, mute, speaker and sound settings
    Audio,
    /// Inputs, sources, playing content, content lists
    AvContent,
    /// Installed applications
    AppControl,
    /// Recording schedules and history
    Recording,
    /// Reboot and program guide
    Guide,
    /// Client registration
    AccessControl,
}

impl Service {
    /// The path segment of this service under `/sony/`
    pub fn name(&self) -> &'static str {
        match self {
            Service::System => "system",
            Service::Audio => "audio",
            Service::AvContent => "avContent",
            Service::AppControl => "appControl",
            Service::Recording => "recording",
            Service::Guide => "guide",
            Service::AccessControl => "accessControl",
        }
    }

    /// Full endpoint URL on a device
    pub fn url(&self, base_address: &str) -> String {
        format!("http://{}/sony/{}", base_address, self.name())
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_urls() {
        assert_eq!(Service::System.url("10.0.0.5"), "http://10.0.0.5/sony/system");
        assert_eq!(
            Service::AvContent.url("10.0.0.5:8080"),
            "http://10.0.0.5:8080/sony/avContent"
        );
        assert_eq!(
            Service::AccessControl.url("tv.local"),
            "http://tv.local/sony/accessControl"
        );
    }

    #[test]
    fn test_display_matches_name() {
        assert_eq!(Service::AppControl.to_string(), "appControl");
    }
}
