use serde::Deserialize;

use crate::types::{ConfigError, Palette, PaletteIndex, PanelGeometry};

/// 抖动强度默认值，越大颗粒感越强
pub const DEFAULT_DITHER_FACTOR: i32 = 32;

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct FrameConfig {
    pub credentials: DeviceCredentials,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub driver: DriverConfig,
    #[serde(default)]
    pub cycle: CycleConfig,
}

impl FrameConfig {
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_slice(bytes)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.credentials.validate()?;
        self.render.validate()?;
        self.driver.validate()
    }
}

/// 对应设备上的 credentials.json
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct DeviceCredentials {
    pub wifi_ssid: heapless::String<32>,
    pub wifi_password: heapless::String<64>,
    pub url: heapless::String<256>,
}

impl DeviceCredentials {
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        let credentials: Self = serde_json::from_slice(bytes)?;
        credentials.validate()?;
        Ok(credentials)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::Invalid("url must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub geometry: PanelGeometry,
    pub palette: Palette,
    pub dither_factor: i32,
}

impl RenderConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0..=255).contains(&self.dither_factor) {
            return Err(ConfigError::Invalid("dither_factor must be within 0..=255"));
        }
        if self.geometry.width == 0 || self.geometry.height == 0 {
            return Err(ConfigError::Invalid("panel geometry must be non-empty"));
        }
        Ok(())
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            geometry: PanelGeometry::EPD_3IN0G,
            palette: Palette::EPD_3IN0G,
            dither_factor: DEFAULT_DITHER_FACTOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub busy_poll_interval_ms: u32,
    pub busy_timeout_ms: u32,
}

impl DriverConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.busy_poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("busy_poll_interval_ms must be positive"));
        }
        Ok(())
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            busy_poll_interval_ms: 5,
            busy_timeout_ms: 60_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    pub connect_timeout_s: u8,
    pub settle_before_sleep_ms: u32,
    pub wake_interval_ms: u32,
    pub clear_color: u8,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            connect_timeout_s: 10,
            settle_before_sleep_ms: 10_000,
            wake_interval_ms: 300_000,
            clear_color: PaletteIndex::White.fill_byte(),
        }
    }
}
