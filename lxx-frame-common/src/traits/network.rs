use crate::traits::ByteSource;
use crate::types::{DeviceCredentials, FetchError, NetworkError};

pub const HTTP_OK: u16 = 200;

/// 无线网络连接，连接与重试策略由平台实现
pub trait NetworkLink {
    /// 连接网络，最多等待 `timeout_s` 秒
    fn connect(&mut self, credentials: &DeviceCredentials, timeout_s: u8) -> Result<(), NetworkError>;

    fn is_connected(&self) -> bool;

    fn disconnect(&mut self);
}

/// 图像请求的响应：状态码加上按需读取的响应体
pub struct ImageResponse<S> {
    pub status: u16,
    pub body: S,
}

impl<S> ImageResponse<S> {
    pub fn new(status: u16, body: S) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        self.status == HTTP_OK
    }
}

pub trait ImageFetcher {
    type Body: ByteSource;

    fn fetch(&mut self, url: &str) -> Result<ImageResponse<Self::Body>, FetchError>;
}
