use thiserror::Error;

use crate::types::{DeviceState, PanelGeometry};

pub type FrameResult<T> = core::result::Result<T, FrameError>;

pub type DisplayResult<T> = core::result::Result<T, DisplayError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    #[error("bitmap format error: {0}")]
    Format(#[from] FormatError),

    #[error("stream truncated: expected {expected} bytes, received {received}")]
    TruncatedStream { expected: usize, received: usize },

    #[error("display error: {0}")]
    Device(#[from] DisplayError),

    #[error("failed to allocate {requested} bytes")]
    Allocation { requested: usize },

    #[error("byte source error: {0}")]
    Source(#[from] SourceError),

    #[error("image request failed with HTTP status {0}")]
    HttpStatus(u16),

    #[error("image fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

impl FrameError {
    /// 超时错误需要整屏复位重新初始化
    pub fn is_device_timeout(&self) -> bool {
        matches!(self, Self::Device(DisplayError::Timeout { .. }))
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FormatError {
    #[error("not a BMP file (signature {found:02x?})")]
    BadSignature { found: [u8; 2] },

    #[error("image is {width}x{height}, panel expects {expected_width}x{expected_height}")]
    DimensionMismatch {
        width: i32,
        height: i32,
        expected_width: u32,
        expected_height: u32,
    },

    #[error("unsupported bit depth {0}, only 24-bit BMP is supported")]
    UnsupportedBitDepth(u16),

    #[error("unsupported compression method {0}")]
    UnsupportedCompression(u32),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    #[error("busy line not released after {waited_ms} ms")]
    Timeout { waited_ms: u32 },

    #[error("SPI transfer failed: {0}")]
    Spi(embedded_hal::spi::ErrorKind),

    #[error("GPIO operation failed: {0}")]
    Pin(embedded_hal::digital::ErrorKind),

    #[error("cannot {operation} while panel is {state}")]
    InvalidState {
        operation: &'static str,
        state: DeviceState,
    },

    #[error(
        "framebuffer is {}x{}, panel is {}x{}",
        .actual.width, .actual.height, .expected.width, .expected.height
    )]
    GeometryMismatch {
        expected: PanelGeometry,
        actual: PanelGeometry,
    },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SourceError {
    #[error("read failed")]
    Io,

    #[error("read timed out")]
    Timeout,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchError {
    #[error("unsupported url")]
    UnsupportedUrl,

    #[error("connection failed")]
    ConnectionFailed,

    #[error("request failed")]
    RequestFailed,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkError {
    #[error("not connected")]
    NotConnected,

    #[error("connection timed out")]
    Timeout,

    #[error("authentication failed")]
    AuthenticationFailed,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    #[error("malformed JSON at line {line}, column {column}")]
    Parse { line: usize, column: usize },

    #[error("invalid value: {0}")]
    Invalid(&'static str),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse {
            line: e.line(),
            column: e.column(),
        }
    }
}
