//! 顺序字节源
//!
//! 图像数据来自单向传输（HTTP 响应体、套接字等），只能按顺序读取，
//! 不支持 seek。读到 0 字节且无错误即视为流结束。

use crate::types::SourceError;

/// 单次读取的默认上限，与像素行解码、头部跳过共用
pub const DEFAULT_READ_CHUNK: usize = 256;

pub trait ByteSource {
    /// 读取最多 `buf.len()` 字节，返回实际读取的字节数；`Ok(0)` 表示流结束
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        (**self).read(buf)
    }
}

/// 一次有界读取的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReadOutcome {
    pub bytes_read: usize,
    pub is_complete: bool,
}

impl ReadOutcome {
    pub const fn new(bytes_read: usize, requested: usize) -> Self {
        Self {
            bytes_read,
            is_complete: bytes_read >= requested,
        }
    }
}

pub trait ByteSourceExt: ByteSource {
    /// 按不超过 `max_chunk` 的块反复读取，直到填满 `buf` 或遇到流结束
    fn read_chunked(&mut self, buf: &mut [u8], max_chunk: usize) -> Result<ReadOutcome, SourceError> {
        let max_chunk = max_chunk.max(1);
        let mut filled = 0;
        while filled < buf.len() {
            let end = buf.len().min(filled + max_chunk);
            let requested = end - filled;
            let n = self.read(&mut buf[filled..end])?;
            if n == 0 {
                break;
            }
            filled += n.min(requested);
        }
        Ok(ReadOutcome::new(filled, buf.len()))
    }

    /// 通过读取丢弃 `count` 字节
    fn skip(&mut self, count: usize, max_chunk: usize) -> Result<ReadOutcome, SourceError> {
        let mut scratch = [0u8; DEFAULT_READ_CHUNK];
        let max_chunk = max_chunk.clamp(1, scratch.len());
        let mut skipped = 0;
        while skipped < count {
            let requested = (count - skipped).min(max_chunk);
            let n = self.read(&mut scratch[..requested])?;
            if n == 0 {
                break;
            }
            skipped += n.min(requested);
        }
        Ok(ReadOutcome::new(skipped, count))
    }
}

impl<S: ByteSource + ?Sized> ByteSourceExt for S {}

/// 适配任意 `embedded_io::Read`
pub struct IoSource<R> {
    inner: R,
}

impl<R> IoSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: embedded_io::Read> ByteSource for IoSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        self.inner.read(buf).map_err(|_| SourceError::Io)
    }
}

/// 空数据源，立即返回流结束
pub struct NoSource;

impl ByteSource for NoSource {
    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, SourceError> {
        Ok(0)
    }
}
