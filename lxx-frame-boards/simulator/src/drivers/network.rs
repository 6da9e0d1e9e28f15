use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;

use lxx_frame_common::*;

/// 本机回环“网络”，可配置为始终连接失败
pub struct LoopbackLink {
    available: bool,
    connected: bool,
}

impl LoopbackLink {
    pub fn new(available: bool) -> Self {
        Self {
            available,
            connected: false,
        }
    }
}

impl NetworkLink for LoopbackLink {
    fn connect(&mut self, credentials: &DeviceCredentials, timeout_s: u8) -> Result<(), NetworkError> {
        info!(
            "[Simulator Network] Connecting to {} (timeout {}s)",
            credentials.wifi_ssid.as_str(),
            timeout_s
        );
        if !self.available {
            warn!("[Simulator Network] Offline mode, connection refused");
            return Err(NetworkError::Timeout);
        }
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn disconnect(&mut self) {
        info!("[Simulator Network] Disconnected");
        self.connected = false;
    }
}

/// 从本地文件读取图像，支持 `file://` 地址和普通路径
pub struct FileFetcher;

/// 文件不存在时响应体为空
pub struct FileBody(Option<BufReader<File>>);

impl ByteSource for FileBody {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        let Some(reader) = self.0.as_mut() else {
            return Ok(0);
        };
        loop {
            match reader.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    error!("[Simulator Fetcher] Read failed: {}", e);
                    return Err(SourceError::Io);
                }
            }
        }
    }
}

impl FileFetcher {
    fn resolve(url: &str) -> Result<PathBuf, FetchError> {
        if let Some(path) = url.strip_prefix("file://") {
            return Ok(PathBuf::from(path));
        }
        if url.contains("://") {
            error!("[Simulator Fetcher] Only local files are supported: {}", url);
            return Err(FetchError::UnsupportedUrl);
        }
        Ok(PathBuf::from(url))
    }
}

impl ImageFetcher for FileFetcher {
    type Body = FileBody;

    fn fetch(&mut self, url: &str) -> Result<ImageResponse<FileBody>, FetchError> {
        let path = Self::resolve(url)?;
        match File::open(&path) {
            Ok(file) => {
                debug!("[Simulator Fetcher] Serving {}", path.display());
                Ok(ImageResponse::new(HTTP_OK, FileBody(Some(BufReader::new(file)))))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("[Simulator Fetcher] {} not found", path.display());
                Ok(ImageResponse::new(404, FileBody(None)))
            }
            Err(e) => {
                error!("[Simulator Fetcher] Cannot open {}: {}", path.display(), e);
                Err(FetchError::RequestFailed)
            }
        }
    }
}
