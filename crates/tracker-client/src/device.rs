//! Device collaborators consumed by the tracker

/// Stable per-install identifier (vendor-scoped on iOS)
pub trait DeviceIdentity: Send + Sync {
    fn install_identifier(&self) -> String;
}

/// Network interfaces as `(interface name, address)` pairs
pub trait NetworkAddresses: Send + Sync {
    fn interfaces(&self) -> Vec<(String, String)>;
}

/// Application and OS metadata
pub trait AppMetadata: Send + Sync {
    /// Display name recorded as the attribution source
    fn app_name(&self) -> String;

    /// OS name and version, e.g. `iOS 17.0`; fingerprinted as the user agent
    fn os_version(&self) -> String;
}

/// Everything the tracker needs to know about the device
pub trait DeviceInfo: DeviceIdentity + NetworkAddresses + AppMetadata {}

impl<T: DeviceIdentity + NetworkAddresses + AppMetadata> DeviceInfo for T {}

/// Device described by fixed values
#[derive(Debug, Clone, Default)]
pub struct StaticDevice {
    install_identifier: String,
    app_name: String,
    os_version: String,
    interfaces: Vec<(String, String)>,
}

impl StaticDevice {
    pub fn new(install_identifier: impl Into<String>) -> Self {
        Self {
            install_identifier: install_identifier.into(),
            ..Self::default()
        }
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    pub fn with_os_version(mut self, os: impl Into<String>) -> Self {
        self.os_version = os.into();
        self
    }

    pub fn with_interface(mut self, name: impl Into<String>, address: impl Into<String>) -> Self {
        self.interfaces.push((name.into(), address.into()));
        self
    }
}

impl DeviceIdentity for StaticDevice {
    fn install_identifier(&self) -> String {
        self.install_identifier.clone()
    }
}

impl NetworkAddresses for StaticDevice {
    fn interfaces(&self) -> Vec<(String, String)> {
        self.interfaces.clone()
    }
}

impl AppMetadata for StaticDevice {
    fn app_name(&self) -> String {
        self.app_name.clone()
    }

    fn os_version(&self) -> String {
        self.os_version.clone()
    }
}
